//! Commands for joining a poll
mod inputs;
mod status;

pub use inputs::*;
pub use status::*;

use clap::Subcommand;

use maci_common::StdResult;

use crate::CommandContext;

/// Poll joining (alias: pj)
#[derive(Subcommand, Debug, Clone)]
pub enum PollJoiningCommands {
    /// Derive the inputs of the poll joining circuit of a user
    #[clap(arg_required_else_help = true)]
    Inputs(PollJoiningInputsCommand),

    /// Tell whether a poll public key has joined a poll
    #[clap(arg_required_else_help = true)]
    Status(PollJoiningStatusCommand),
}

impl PollJoiningCommands {
    /// Execute poll joining command
    pub async fn execute(&self, context: CommandContext) -> StdResult<()> {
        match self {
            Self::Inputs(cmd) => cmd.execute(context).await,
            Self::Status(cmd) => cmd.execute(context).await,
        }
    }
}
