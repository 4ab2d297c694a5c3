use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_BLOCKS_PER_REQUEST;

/// Throttling of the requests sent to the log source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFetcherConfig {
    /// Number of blocks read by one request
    pub blocks_per_request: u64,

    /// Pause between two requests, in milliseconds
    pub sleep_amount: u64,
}

impl EventFetcherConfig {
    /// Pause between two requests
    pub fn sleep_duration(&self) -> Duration {
        Duration::from_millis(self.sleep_amount)
    }
}

impl Default for EventFetcherConfig {
    fn default() -> Self {
        Self {
            blocks_per_request: DEFAULT_BLOCKS_PER_REQUEST,
            sleep_amount: 0,
        }
    }
}
