//! Logging utilities shared by the MACI components.

use slog::Logger;

/// Extension trait for `slog::Logger`
pub trait LoggerExtensions {
    /// Create a child logger with a `src` key set to the name of the given component type.
    fn new_with_component_name<T>(&self) -> Self;

    /// Create a child logger with a `src` key set to the given name.
    fn new_with_name(&self, name: &str) -> Self;
}

impl LoggerExtensions for Logger {
    fn new_with_component_name<T>(&self) -> Self {
        self.new_with_name(component_name::<T>())
    }

    fn new_with_name(&self, name: &str) -> Self {
        self.new(slog::o!("src" => name.to_owned()))
    }
}

/// Short name of a type: no module path, no generic parameters.
fn component_name<T>() -> &'static str {
    let complete_name = std::any::type_name::<T>();
    let without_generic = complete_name.split('<').next().unwrap_or(complete_name);
    without_generic
        .rsplit("::")
        .next()
        .unwrap_or(without_generic)
}
