use config::ConfigBuilder;
use config::builder::DefaultState;
use slog::Logger;
use std::collections::HashMap;

use maci_common::StdResult;

use crate::configuration::ConfigParameters;

/// Context for the command execution
pub struct CommandContext {
    config_builder: ConfigBuilder<DefaultState>,
    logger: Logger,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config_builder: ConfigBuilder<DefaultState>, logger: Logger) -> Self {
        Self {
            config_builder,
            logger,
        }
    }

    /// Get the configured parameters
    pub fn config_parameters(&self) -> StdResult<ConfigParameters> {
        let config = self.config_builder.clone().build()?;
        let config_hash_map = config.try_deserialize::<HashMap<String, String>>()?;
        Ok(ConfigParameters::new(config_hash_map))
    }

    /// Get the shared logger
    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parameters_are_read_as_strings() {
        let config_builder = config::Config::builder()
            .set_default("blocks_per_request", 25)
            .unwrap()
            .set_override("rpc_url", "http://localhost:8545")
            .unwrap();
        let context = CommandContext::new(config_builder, Logger::root(slog::Discard, slog::o!()));

        let params = context.config_parameters().unwrap();

        assert_eq!(Some("25".to_string()), params.get("blocks_per_request"));
        assert_eq!(
            Some("http://localhost:8545".to_string()),
            params.get("rpc_url")
        );
    }
}
