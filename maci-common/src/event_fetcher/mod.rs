//! Read the event logs of a block range window by window.

mod config;
mod event_batch_fetcher;

pub use config::EventFetcherConfig;
pub use event_batch_fetcher::{EventBatchFetcher, EventFetcherError, FetchRequest, FetchedEvents};
