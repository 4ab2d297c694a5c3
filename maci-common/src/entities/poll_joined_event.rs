use serde::{Deserialize, Serialize};

use crate::entities::{BlockNumber, FieldElement, LogIndex, PublicKey, StateIndex, Timestamp};

/// A `PollJoined` log emitted by a poll contract when a user joins it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollJoinedEvent {
    /// Public key the user will vote with in this poll
    pub poll_public_key: PublicKey,

    /// Voice credits granted to the user for this poll
    pub voice_credit_balance: FieldElement,

    /// Block timestamp of the join
    pub timestamp: Timestamp,

    /// Nullifier proving the join without revealing the state index
    pub nullifier: FieldElement,

    /// Index of the user in the poll state tree
    pub poll_state_index: StateIndex,

    /// Block in which the log was emitted
    pub block_number: BlockNumber,

    /// Position of the log in its block
    pub log_index: LogIndex,
}

impl PollJoinedEvent {
    /// Key used to replay logs in their emission order
    pub fn chain_order(&self) -> (BlockNumber, LogIndex) {
        (self.block_number, self.log_index)
    }
}
