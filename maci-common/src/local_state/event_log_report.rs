use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::StdResult;
use crate::entities::{BlockNumber, LogIndex, PollId, PollJoinedEvent, SignUpEvent};

/// An event replayed into a local state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReplayedAction {
    /// A registration to the MACI contract
    SignUp(SignUpEvent),

    /// A join of the replayed poll
    PollJoined(PollJoinedEvent),
}

impl ReplayedAction {
    /// Position of the underlying log in the chain
    pub fn chain_order(&self) -> (BlockNumber, LogIndex) {
        match self {
            ReplayedAction::SignUp(event) => event.chain_order(),
            ReplayedAction::PollJoined(event) => event.chain_order(),
        }
    }
}

/// Audit trail of a local state generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLogReport {
    /// Address of the MACI contract the logs come from
    pub maci_address: String,

    /// The replayed poll
    pub poll_id: PollId,

    /// First read block
    pub from_block: BlockNumber,

    /// Last read block
    pub to_block: BlockNumber,

    /// Generation date
    pub timestamp: DateTime<Utc>,

    /// Replayed events, in chain order
    pub actions: Vec<ReplayedAction>,
}

impl EventLogReport {
    /// Write the report as pretty JSON
    pub fn save(&self, path: &Path) -> StdResult<()> {
        let json = serde_json::to_string_pretty(self)
            .with_context(|| "Could not serialize the event log report")?;
        std::fs::write(path, json).with_context(|| {
            format!("Could not write the event log report to {}", path.display())
        })
    }
}
