use std::sync::Arc;

use chrono::Utc;
use slog::{Logger, info};

use crate::StdResult;
use crate::entities::{BlockNumber, PollId};
use crate::event_fetcher::{EventBatchFetcher, EventFetcherConfig, FetchRequest};
use crate::local_state::{
    EventLogReport, LocalMaciState, PollJoinedRecord, PollState, ReplayedAction,
};
use crate::log_source::MaciLogSource;
use crate::logging::LoggerExtensions;
use crate::state_builder::{SignUpTreeBuilder, SignUpTreeBuilderConfig};

/// Parameters of a local state generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStateRequest {
    /// Poll which joins are replayed
    pub poll_id: PollId,

    /// First block to read, usually the MACI deployment block
    pub from_block: BlockNumber,

    /// Last block to read, the chain head if not set
    pub end_block: Option<BlockNumber>,

    /// Compare the rebuilt root with the one stored by the contract at the last read block.
    ///
    /// Only meaningful when the range starts before the first sign-up.
    pub check_state_root: bool,
}

/// A generated [LocalMaciState] and the events it was replayed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLocalState {
    /// The replayed state
    pub state: LocalMaciState,

    /// Replayed events in chain order
    pub actions: Vec<ReplayedAction>,
}

impl GeneratedLocalState {
    /// Audit report of the generation, dated now
    pub fn report(&self, maci_address: &str) -> EventLogReport {
        EventLogReport {
            maci_address: maci_address.to_string(),
            poll_id: self
                .state
                .polls
                .first()
                .map(|poll| poll.poll_id)
                .unwrap_or(PollId::new(0)),
            from_block: self.state.block_range.start,
            to_block: self.state.block_range.end,
            timestamp: Utc::now(),
            actions: self.actions.clone(),
        }
    }
}

/// Replay the logs of a MACI contract into a [LocalMaciState].
pub struct LocalStateGenerator {
    log_source: Arc<dyn MaciLogSource>,
    fetcher: EventBatchFetcher,
    logger: Logger,
}

impl LocalStateGenerator {
    /// LocalStateGenerator factory
    pub fn new(
        log_source: Arc<dyn MaciLogSource>,
        fetcher_config: EventFetcherConfig,
        logger: Logger,
    ) -> Self {
        Self {
            fetcher: EventBatchFetcher::new(log_source.clone(), fetcher_config, logger.clone()),
            log_source,
            logger: logger.new_with_component_name::<Self>(),
        }
    }

    /// Fetch and replay the sign-ups and the joins of the requested poll
    pub async fn generate(&self, request: &LocalStateRequest) -> StdResult<GeneratedLocalState> {
        let signups = self
            .fetcher
            .fetch_signups(FetchRequest {
                from_block: request.from_block,
                end_block: request.end_block,
            })
            .await?;
        let block_range = signups.fetched_range;
        let joins = self
            .fetcher
            .fetch_poll_joined(
                request.poll_id,
                FetchRequest::from_block(block_range.start).up_to(block_range.end),
            )
            .await?;

        let expected_root = if request.check_state_root {
            Some(self.log_source.get_state_tree_root(block_range.end).await?)
        } else {
            None
        };
        let builder_config = SignUpTreeBuilderConfig {
            target_key: None,
            expected_root,
        };
        let signup_tree =
            SignUpTreeBuilder::new(builder_config, self.logger.clone()).build(&signups.events)?;
        let state_tree_depth = self.log_source.get_state_tree_depth().await?;

        let state = LocalMaciState {
            state_tree_depth,
            public_keys: signup_tree.public_keys().to_vec(),
            polls: vec![PollState {
                poll_id: request.poll_id,
                joined: joins.events.iter().map(PollJoinedRecord::from).collect(),
            }],
            block_range,
        };
        let mut actions: Vec<ReplayedAction> = signups
            .events
            .into_iter()
            .map(ReplayedAction::SignUp)
            .chain(joins.events.into_iter().map(ReplayedAction::PollJoined))
            .collect();
        actions.sort_by_key(ReplayedAction::chain_order);

        info!(
            self.logger, "Local state generated";
            "block_range" => %block_range, "signups" => state.public_keys.len() - 1,
            "poll_id" => %request.poll_id, "joins" => state.polls[0].joined.len()
        );

        Ok(GeneratedLocalState { state, actions })
    }
}
