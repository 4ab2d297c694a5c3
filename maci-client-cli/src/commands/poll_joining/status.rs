use clap::Parser;
use serde::Serialize;
use slog::info;
use std::path::PathBuf;

use maci_common::StdResult;
use maci_common::entities::{BlockNumber, PollId, PollJoinedEvent, PublicKey};
use maci_common::event_fetcher::{EventBatchFetcher, FetchRequest};

use crate::CommandContext;
use crate::commands::{FetcherArgs, fetcher_config, log_source, write_json};

/// Whether a poll public key has joined a poll, with its join record if so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollJoiningStatus {
    /// The looked up poll
    pub poll_id: PollId,

    /// The looked up poll public key
    pub poll_public_key: PublicKey,

    /// `true` if a `PollJoined` log of the key was found
    pub joined: bool,

    /// The found `PollJoined` log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_event: Option<PollJoinedEvent>,
}

/// Clap command to look up the join of a poll public key in the logs of a poll
#[derive(Parser, Debug, Clone)]
pub struct PollJoiningStatusCommand {
    #[clap(flatten)]
    fetcher_args: FetcherArgs,

    /// The looked up poll.
    #[clap(long, allow_negative_numbers = true)]
    poll_id: PollId,

    /// Public key used to join the poll, as `x,y`.
    #[clap(long)]
    poll_public_key: PublicKey,

    /// First block to read, usually the deployment block of the poll.
    #[clap(long, default_value_t = 0)]
    start_block: BlockNumber,

    /// Last block to read, the chain head if not set.
    #[clap(long)]
    end_block: Option<BlockNumber>,

    /// Path of the written status, printed on the standard output if not set.
    #[clap(long)]
    output: Option<PathBuf>,
}

impl PollJoiningStatusCommand {
    fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            from_block: self.start_block,
            end_block: self.end_block,
        }
    }

    async fn status(&self, fetcher: &EventBatchFetcher) -> StdResult<PollJoiningStatus> {
        let joined_event = fetcher
            .find_poll_joined(self.poll_id, self.fetch_request(), &self.poll_public_key)
            .await?;

        Ok(PollJoiningStatus {
            poll_id: self.poll_id,
            poll_public_key: self.poll_public_key,
            joined: joined_event.is_some(),
            joined_event,
        })
    }

    /// Main command execution
    pub async fn execute(&self, context: CommandContext) -> StdResult<()> {
        let params = context.config_parameters()?.add_source(&self.fetcher_args)?;
        let logger = context.logger();
        let fetcher = EventBatchFetcher::new(
            log_source(&params, logger)?,
            fetcher_config(&params)?,
            logger.clone(),
        );

        let status = self.status(&fetcher).await?;
        info!(
            logger, "Poll joining status read";
            "poll_id" => %self.poll_id, "joined" => status.joined
        );

        write_json(&status, self.output.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use maci_common::entities::FieldElement;
    use maci_common::event_fetcher::EventFetcherConfig;
    use maci_common::log_source::FakeMaciLogSource;
    use maci_common::test_utils::fake_data;
    use slog::Logger;

    use super::*;

    fn discard_logger() -> Logger {
        Logger::root(slog::Discard, slog::o!())
    }

    fn status_command(
        poll_public_key: &PublicKey,
        extra_args: &[&str],
    ) -> PollJoiningStatusCommand {
        let poll_public_key = poll_public_key.to_string();
        let mut args = vec![
            "status",
            "--poll-id",
            "1",
            "--poll-public-key",
            poll_public_key.as_str(),
        ];
        args.extend_from_slice(extra_args);

        PollJoiningStatusCommand::try_parse_from(args).unwrap()
    }

    fn fetcher_with_joins() -> EventBatchFetcher {
        let log_source = FakeMaciLogSource::new(200, 10).with_poll_joined_events(
            PollId::new(1),
            vec![
                fake_data::poll_joined_event(
                    fake_data::public_key(101),
                    FieldElement::from(11),
                    1,
                    40,
                ),
                fake_data::poll_joined_event(
                    fake_data::public_key(102),
                    FieldElement::from(12),
                    2,
                    150,
                ),
            ],
        );

        EventBatchFetcher::new(
            Arc::new(log_source),
            EventFetcherConfig::default(),
            discard_logger(),
        )
    }

    #[test]
    fn build_the_fetch_request_from_the_arguments() {
        let command = status_command(
            &fake_data::public_key(101),
            &["--start-block", "30", "--end-block", "90"],
        );

        assert_eq!(
            FetchRequest {
                from_block: 30,
                end_block: Some(90),
            },
            command.fetch_request()
        );
    }

    #[tokio::test]
    async fn report_the_join_of_a_poll_public_key() {
        let command = status_command(&fake_data::public_key(102), &[]);

        let status = command.status(&fetcher_with_joins()).await.unwrap();

        assert!(status.joined);
        let joined_event = status.joined_event.unwrap();
        assert_eq!(2, joined_event.poll_state_index);
        assert_eq!(150, joined_event.block_number);
    }

    #[tokio::test]
    async fn report_a_join_after_the_end_block_as_not_joined() {
        let command = status_command(&fake_data::public_key(102), &["--end-block", "100"]);

        let status = command.status(&fetcher_with_joins()).await.unwrap();

        assert_eq!(
            PollJoiningStatus {
                poll_id: PollId::new(1),
                poll_public_key: fake_data::public_key(102),
                joined: false,
                joined_event: None,
            },
            status
        );
    }

    #[test]
    fn a_missing_join_is_serialized_without_event() {
        let status = PollJoiningStatus {
            poll_id: PollId::new(1),
            poll_public_key: fake_data::public_key(7),
            joined: false,
            joined_event: None,
        };

        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(Some(&serde_json::Value::Bool(false)), json.get("joined"));
        assert!(json.get("joined_event").is_none());
    }

    #[tokio::test]
    async fn reading_the_chain_requires_a_configured_endpoint() {
        let command = status_command(&fake_data::public_key(101), &[]);

        let error = command
            .execute(CommandContext::new(config::Config::builder(), discard_logger()))
            .await
            .expect_err("rpc_url is not configured");

        assert!(error.to_string().contains("rpc_url"));
    }
}
