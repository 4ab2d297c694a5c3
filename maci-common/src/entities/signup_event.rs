use serde::{Deserialize, Serialize};

use crate::entities::{BlockNumber, LogIndex, PublicKey, StateIndex, Timestamp};

/// A `SignUp` log emitted by the MACI contract when a user registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpEvent {
    /// Public key of the registered user
    pub public_key: PublicKey,

    /// State index assigned by the contract
    pub state_index: StateIndex,

    /// Block timestamp of the registration
    pub timestamp: Timestamp,

    /// Block in which the log was emitted
    pub block_number: BlockNumber,

    /// Position of the log in its block
    pub log_index: LogIndex,
}

impl SignUpEvent {
    /// SignUpEvent factory
    pub fn new(
        public_key: PublicKey,
        state_index: StateIndex,
        timestamp: Timestamp,
        block_number: BlockNumber,
        log_index: LogIndex,
    ) -> Self {
        Self {
            public_key,
            state_index,
            timestamp,
            block_number,
            log_index,
        }
    }

    /// Key used to replay logs in their emission order
    pub fn chain_order(&self) -> (BlockNumber, LogIndex) {
        (self.block_number, self.log_index)
    }
}
