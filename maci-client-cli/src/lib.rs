#![warn(missing_docs)]

//! Library part of the `maci-client` command line: its commands and their configuration.

mod command_context;
pub mod commands;
pub mod configuration;

pub use command_context::CommandContext;
