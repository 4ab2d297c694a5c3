use clap::Parser;
use slog::info;
use std::path::PathBuf;

use maci_common::StdResult;
use maci_common::entities::{BlockNumber, FieldElement, PollId, PublicKey, StateIndex};
use maci_common::poll_joining::{PollJoiningPipeline, PollJoiningRequest, StateSource};

use crate::CommandContext;
use crate::commands::{FetcherArgs, fetcher_config, log_source, write_json};
use crate::configuration::ConfigParameters;

/// Clap command to derive the poll joining circuit inputs of a user
#[derive(Parser, Debug, Clone)]
pub struct PollJoiningInputsCommand {
    #[clap(flatten)]
    fetcher_args: FetcherArgs,

    /// Public key the user signed up with, as `x,y`.
    #[clap(long)]
    public_key: PublicKey,

    /// Circuit encoded private key of the user.
    #[clap(long, env = "MACI_PRIVATE_KEY", hide_env_values = true)]
    private_key: FieldElement,

    /// Public key the user votes with in the poll, as `x,y`.
    #[clap(long)]
    poll_public_key: PublicKey,

    /// The poll to join.
    #[clap(long, allow_negative_numbers = true)]
    poll_id: PollId,

    /// State index of the user, looked up from its public key if not set.
    #[clap(long)]
    state_index: Option<StateIndex>,

    /// Read the sign-up state from a file written by `local-state generate` instead of the chain.
    #[clap(long, conflicts_with_all = ["end_block", "stop_at_sign_up", "check_state_root"])]
    state_file: Option<PathBuf>,

    /// First block to read, usually the deployment block of the MACI contract.
    #[clap(long, default_value_t = 0)]
    start_block: BlockNumber,

    /// Last block to read, the chain head if not set.
    #[clap(long)]
    end_block: Option<BlockNumber>,

    /// Stop reading the logs once the sign-up of the user is found.
    #[clap(long)]
    stop_at_sign_up: bool,

    /// Compare the rebuilt state root with the one stored by the contract.
    ///
    /// Ignored when stopping at the sign-up of the user.
    #[clap(long)]
    check_state_root: bool,

    /// Path of the written circuit inputs, printed on the standard output if not set.
    #[clap(long)]
    output: Option<PathBuf>,
}

impl PollJoiningInputsCommand {
    fn poll_joining_request(&self) -> PollJoiningRequest {
        PollJoiningRequest {
            user_public_key: self.public_key,
            private_key: self.private_key,
            poll_public_key: self.poll_public_key,
            poll_id: self.poll_id,
            state_index: self.state_index,
        }
    }

    fn state_source(
        &self,
        params: &ConfigParameters,
        context: &CommandContext,
    ) -> StdResult<StateSource> {
        let source = match &self.state_file {
            Some(path) => StateSource::StateFile(path.clone()),
            None => StateSource::Chain {
                log_source: log_source(params, context.logger())?,
                from_block: self.start_block,
                end_block: self.end_block,
                stop_at_user_sign_up: self.stop_at_sign_up,
                check_state_root: self.check_state_root,
            },
        };

        Ok(source)
    }

    /// Main command execution
    pub async fn execute(&self, context: CommandContext) -> StdResult<()> {
        let params = context.config_parameters()?.add_source(&self.fetcher_args)?;
        let pipeline =
            PollJoiningPipeline::new(fetcher_config(&params)?, context.logger().clone());

        let witness = pipeline
            .derive_inputs(
                &self.poll_joining_request(),
                self.state_source(&params, &context)?,
            )
            .await?;
        info!(
            context.logger(), "Poll joining inputs derived";
            "poll_id" => %self.poll_id, "state_root" => %witness.state_root
        );

        write_json(&witness, self.output.as_deref())
    }
}
