use clap::Parser;
use slog::{debug, info};
use std::path::PathBuf;

use maci_common::StdResult;
use maci_common::entities::{BlockNumber, PollId};
use maci_common::local_state::{LocalStateGenerator, LocalStateRequest};

use crate::CommandContext;
use crate::commands::{FetcherArgs, fetcher_config, log_source};

/// Clap command to replay the logs of a MACI contract into a local state file
#[derive(Parser, Debug, Clone)]
pub struct LocalStateGenerateCommand {
    #[clap(flatten)]
    fetcher_args: FetcherArgs,

    /// Poll whose joins are replayed.
    #[clap(long, allow_negative_numbers = true)]
    poll_id: PollId,

    /// First block to read, usually the deployment block of the MACI contract.
    #[clap(long, default_value_t = 0)]
    start_block: BlockNumber,

    /// Last block to read, the chain head if not set.
    #[clap(long)]
    end_block: Option<BlockNumber>,

    /// Path of the written local state.
    #[clap(long, default_value = "local-state.json")]
    output: PathBuf,

    /// Also write the replayed events to this file.
    #[clap(long)]
    logs_output: Option<PathBuf>,

    /// Compare the rebuilt state root with the one stored by the contract.
    #[clap(long)]
    check_state_root: bool,
}

impl LocalStateGenerateCommand {
    fn local_state_request(&self) -> LocalStateRequest {
        LocalStateRequest {
            poll_id: self.poll_id,
            from_block: self.start_block,
            end_block: self.end_block,
            check_state_root: self.check_state_root,
        }
    }

    /// Main command execution
    pub async fn execute(&self, context: CommandContext) -> StdResult<()> {
        let params = context.config_parameters()?.add_source(&self.fetcher_args)?;
        let logger = context.logger();
        let maci_address = params.require("maci_address")?;
        debug!(
            logger, "Generating local state";
            "maci_address" => &maci_address, "poll_id" => %self.poll_id
        );

        let generator = LocalStateGenerator::new(
            log_source(&params, logger)?,
            fetcher_config(&params)?,
            logger.clone(),
        );
        let generated = generator.generate(&self.local_state_request()).await?;

        generated.state.save(&self.output)?;
        info!(logger, "Local state written"; "path" => %self.output.display());
        if let Some(logs_output) = &self.logs_output {
            generated.report(&maci_address).save(logs_output)?;
            info!(logger, "Event log report written"; "path" => %logs_output.display());
        }

        println!(
            "Local state of {} sign-ups written to '{}'",
            generated.state.public_keys.len() - 1,
            self.output.display()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_the_request_from_the_arguments() {
        let command = LocalStateGenerateCommand::try_parse_from([
            "generate",
            "--poll-id",
            "3",
            "--start-block",
            "120",
            "--check-state-root",
        ])
        .unwrap();

        assert_eq!(
            LocalStateRequest {
                poll_id: PollId::new(3),
                from_block: 120,
                end_block: None,
                check_state_root: true,
            },
            command.local_state_request()
        );
        assert_eq!(PathBuf::from("local-state.json"), command.output);
    }

    #[test]
    fn reject_a_negative_poll_id() {
        let error = LocalStateGenerateCommand::try_parse_from(["generate", "--poll-id", "-1"])
            .expect_err("a poll id can not be negative");

        assert!(error.to_string().contains("can not be negative"));
    }

    #[tokio::test]
    async fn fail_without_a_maci_contract_address() {
        let command =
            LocalStateGenerateCommand::try_parse_from(["generate", "--poll-id", "0"]).unwrap();
        let context = CommandContext::new(
            config::Config::builder(),
            slog::Logger::root(slog::Discard, slog::o!()),
        );

        let error = command
            .execute(context)
            .await
            .expect_err("maci_address is not configured");

        assert!(error.to_string().contains("maci_address"));
    }
}
