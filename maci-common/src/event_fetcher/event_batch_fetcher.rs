use std::future::Future;
use std::sync::Arc;

use slog::{Logger, debug, info};
use thiserror::Error;

use crate::entities::{BlockNumber, BlockRange, PollId, PollJoinedEvent, PublicKey, SignUpEvent};
use crate::event_fetcher::EventFetcherConfig;
use crate::log_source::MaciLogSource;
use crate::logging::LoggerExtensions;
use crate::{StdError, StdResult};

/// [EventBatchFetcher] related errors.
#[derive(Error, Debug)]
pub enum EventFetcherError {
    /// A window must hold at least one block.
    #[error("blocks per request must be strictly positive")]
    InvalidBlocksPerRequest,

    /// The requested range is inverted.
    #[error("from block {from_block} is after end block {end_block}")]
    InvalidRange {
        /// First requested block
        from_block: BlockNumber,
        /// Last requested block
        end_block: BlockNumber,
    },

    /// The chain head could not be read to resolve a missing end block.
    #[error("could not read the current block number of the log source")]
    CurrentBlockUnavailable(#[source] StdError),

    /// The log source failed on a window, every previous window was fetched.
    #[error("fetching window {window} failed, resume from block {resume_from_block}")]
    WindowFetchFailed {
        /// The failing window
        window: BlockRange,
        /// First block not fetched yet
        resume_from_block: BlockNumber,
        /// Log source error
        #[source]
        error: StdError,
    },
}

/// Block range to fetch, `end_block` defaults to the chain head at call time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// First block to fetch
    pub from_block: BlockNumber,

    /// Last block to fetch, included
    pub end_block: Option<BlockNumber>,
}

impl FetchRequest {
    /// Fetch from `from_block` up to the chain head
    pub fn from_block(from_block: BlockNumber) -> Self {
        Self {
            from_block,
            end_block: None,
        }
    }

    /// Stop the fetch at `end_block`, included
    pub fn up_to(mut self, end_block: BlockNumber) -> Self {
        self.end_block = Some(end_block);
        self
    }
}

/// Events read by an [EventBatchFetcher], in chain order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedEvents<E> {
    /// Events of every fetched window
    pub events: Vec<E>,

    /// The requested range, with its end block resolved
    pub fetched_range: BlockRange,

    /// Last block of the last fetched window
    pub last_fetched_block: BlockNumber,

    /// `true` if the fetch stopped before the end of the range because the target was found
    pub stopped_early: bool,
}

/// Read events from a [MaciLogSource] in consecutive windows of `blocks_per_request` blocks.
///
/// Windows are fetched one after the other, with a pause between two of them when
/// `sleep_amount` is set. Nothing is retried: on failure the error tells from which block
/// the caller can resume.
pub struct EventBatchFetcher {
    log_source: Arc<dyn MaciLogSource>,
    config: EventFetcherConfig,
    logger: Logger,
}

impl EventBatchFetcher {
    /// EventBatchFetcher factory
    pub fn new(
        log_source: Arc<dyn MaciLogSource>,
        config: EventFetcherConfig,
        logger: Logger,
    ) -> Self {
        Self {
            log_source,
            config,
            logger: logger.new_with_component_name::<Self>(),
        }
    }

    /// Fetch every `SignUp` event of the requested range
    pub async fn fetch_signups(
        &self,
        request: FetchRequest,
    ) -> StdResult<FetchedEvents<SignUpEvent>> {
        self.fetch_windows(
            "SignUp",
            request,
            |window| self.log_source.get_signup_events(window),
            |_| false,
        )
        .await
    }

    /// Fetch `SignUp` events until the window holding the sign-up of `target_key`
    pub async fn fetch_signups_until(
        &self,
        request: FetchRequest,
        target_key: &PublicKey,
    ) -> StdResult<FetchedEvents<SignUpEvent>> {
        self.fetch_windows(
            "SignUp",
            request,
            |window| self.log_source.get_signup_events(window),
            |event: &SignUpEvent| event.public_key == *target_key,
        )
        .await
    }

    /// Fetch every `PollJoined` event of a poll in the requested range
    pub async fn fetch_poll_joined(
        &self,
        poll_id: PollId,
        request: FetchRequest,
    ) -> StdResult<FetchedEvents<PollJoinedEvent>> {
        self.fetch_windows(
            "PollJoined",
            request,
            |window| self.log_source.get_poll_joined_events(poll_id, window),
            |_| false,
        )
        .await
    }

    /// Find the `PollJoined` event of a poll public key, stop at the first window holding it
    pub async fn find_poll_joined(
        &self,
        poll_id: PollId,
        request: FetchRequest,
        poll_public_key: &PublicKey,
    ) -> StdResult<Option<PollJoinedEvent>> {
        let fetched = self
            .fetch_windows(
                "PollJoined",
                request,
                |window| self.log_source.get_poll_joined_events(poll_id, window),
                |event: &PollJoinedEvent| event.poll_public_key == *poll_public_key,
            )
            .await?;

        Ok(fetched
            .events
            .into_iter()
            .find(|event| event.poll_public_key == *poll_public_key))
    }

    async fn resolve_range(&self, request: FetchRequest) -> Result<BlockRange, EventFetcherError> {
        if self.config.blocks_per_request == 0 {
            return Err(EventFetcherError::InvalidBlocksPerRequest);
        }

        let end_block = match request.end_block {
            Some(end_block) => end_block,
            None => self
                .log_source
                .get_current_block_number()
                .await
                .map_err(EventFetcherError::CurrentBlockUnavailable)?,
        };
        if request.from_block > end_block {
            return Err(EventFetcherError::InvalidRange {
                from_block: request.from_block,
                end_block,
            });
        }

        Ok(BlockRange {
            start: request.from_block,
            end: end_block,
        })
    }

    async fn fetch_windows<E, F, Fut, S>(
        &self,
        event_name: &str,
        request: FetchRequest,
        fetch_window: F,
        is_target: S,
    ) -> StdResult<FetchedEvents<E>>
    where
        F: Fn(BlockRange) -> Fut,
        Fut: Future<Output = StdResult<Vec<E>>>,
        S: Fn(&E) -> bool,
    {
        let range = self.resolve_range(request).await?;
        let sleep_duration = self.config.sleep_duration();
        info!(
            self.logger, "Fetching '{event_name}' events";
            "range" => %range, "blocks_per_request" => self.config.blocks_per_request
        );

        let mut events = vec![];
        let mut last_fetched_block = range.start;
        let mut stopped_early = false;
        let mut windows = range.windows(self.config.blocks_per_request)?.peekable();
        while let Some(window) = windows.next() {
            debug!(self.logger, "Fetching '{event_name}' events of window {window}");
            let window_events =
                fetch_window(window)
                    .await
                    .map_err(|error| EventFetcherError::WindowFetchFailed {
                        window,
                        resume_from_block: window.start,
                        error,
                    })?;
            let target_found = window_events.iter().any(&is_target);
            events.extend(window_events);
            last_fetched_block = window.end;

            if target_found {
                stopped_early = windows.peek().is_some();
                debug!(self.logger, "Target '{event_name}' event found in window {window}");
                break;
            }
            if windows.peek().is_some() && !sleep_duration.is_zero() {
                tokio::time::sleep(sleep_duration).await;
            }
        }

        debug!(
            self.logger, "Fetched {} '{event_name}' events", events.len();
            "last_fetched_block" => last_fetched_block
        );

        Ok(FetchedEvents {
            events,
            fetched_range: range,
            last_fetched_block,
            stopped_early,
        })
    }
}
