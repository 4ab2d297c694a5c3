//! Commands for the local copy of the sign-up state
mod generate;

pub use generate::*;

use clap::Subcommand;

use maci_common::StdResult;

use crate::CommandContext;

/// Local sign-up state management (alias: ls)
#[derive(Subcommand, Debug, Clone)]
pub enum LocalStateCommands {
    /// Replay the logs of the MACI contract into a local state file
    #[clap(arg_required_else_help = true)]
    Generate(LocalStateGenerateCommand),
}

impl LocalStateCommands {
    /// Execute local state command
    pub async fn execute(&self, context: CommandContext) -> StdResult<()> {
        match self {
            Self::Generate(cmd) => cmd.execute(context).await,
        }
    }
}
