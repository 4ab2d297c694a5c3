//! Test utilities: fake data builders, temp directories and loggers.

pub mod fake_data;
mod temp_dir;
#[cfg(test)]
mod test_logger;

pub use temp_dir::TempDir;
#[cfg(test)]
pub use test_logger::TestLogger;
