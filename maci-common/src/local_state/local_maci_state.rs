use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::StdResult;
use crate::entities::{
    BlockRange, FieldElement, PollId, PollJoinedEvent, PublicKey, StateIndex, TreeDepth,
};
use crate::state_builder::SignUpTree;

/// A user that joined a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollJoinedRecord {
    /// Nullifier of the join
    pub nullifier: FieldElement,

    /// Key the user votes with in the poll
    pub poll_public_key: PublicKey,

    /// Voice credits of the user in the poll
    pub voice_credit_balance: FieldElement,

    /// Index of the user in the poll state tree
    pub poll_state_index: StateIndex,
}

impl From<&PollJoinedEvent> for PollJoinedRecord {
    fn from(event: &PollJoinedEvent) -> Self {
        Self {
            nullifier: event.nullifier,
            poll_public_key: event.poll_public_key,
            voice_credit_balance: event.voice_credit_balance,
            poll_state_index: event.poll_state_index,
        }
    }
}

/// Users that joined a poll, in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollState {
    /// The poll
    pub poll_id: PollId,

    /// Joins in chain order
    pub joined: Vec<PollJoinedRecord>,
}

/// Sign-up state of a MACI contract as replayed from its logs, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMaciState {
    /// Depth of the state tree in the circuits
    pub state_tree_depth: TreeDepth,

    /// Signed up keys in state index order, the pad key first
    pub public_keys: Vec<PublicKey>,

    /// Replayed polls
    pub polls: Vec<PollState>,

    /// Blocks the logs were read from
    pub block_range: BlockRange,
}

impl LocalMaciState {
    /// Rebuild the state tree from the stored public keys
    pub fn signup_tree(&self) -> StdResult<SignUpTree> {
        SignUpTree::from_public_keys(&self.public_keys)
            .with_context(|| "Could not rebuild the state tree of the local state")
    }

    /// Replayed state of a poll
    pub fn poll(&self, poll_id: PollId) -> Option<&PollState> {
        self.polls.iter().find(|poll| poll.poll_id == poll_id)
    }

    /// Check if a join with this nullifier was replayed for the poll
    pub fn has_joined(&self, poll_id: PollId, nullifier: &FieldElement) -> bool {
        self.poll(poll_id).is_some_and(|poll| {
            poll.joined
                .iter()
                .any(|record| record.nullifier == *nullifier)
        })
    }

    /// Write the state as pretty JSON
    pub fn save(&self, path: &Path) -> StdResult<()> {
        let json = serde_json::to_string_pretty(self)
            .with_context(|| "Could not serialize the local MACI state")?;
        std::fs::write(path, json).with_context(|| {
            format!("Could not write the local MACI state to {}", path.display())
        })
    }

    /// Read a state written by [LocalMaciState::save]
    pub fn load(path: &Path) -> StdResult<Self> {
        let json = std::fs::read_to_string(path).with_context(|| {
            format!("Could not read the local MACI state at {}", path.display())
        })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Invalid local MACI state file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use crate::crypto_helper::pad_key;
    use crate::test_utils::{TempDir, fake_data};

    use super::*;

    fn state_with_signups(seeds: &[u64]) -> LocalMaciState {
        let mut public_keys = vec![pad_key().unwrap()];
        public_keys.extend(seeds.iter().map(|seed| fake_data::public_key(*seed)));

        LocalMaciState {
            state_tree_depth: 10,
            public_keys,
            polls: vec![PollState {
                poll_id: PollId::new(1),
                joined: vec![PollJoinedRecord::from(&fake_data::poll_joined_event(
                    fake_data::public_key(50),
                    FieldElement::from(777),
                    1,
                    30,
                ))],
            }],
            block_range: BlockRange::try_new(0, 100).unwrap(),
        }
    }

    #[test]
    fn save_then_load_gives_back_the_same_state_and_tree() {
        let path = TempDir::create("local_maci_state", "save_then_load").join("state.json");
        let state = state_with_signups(&[1, 2, 3]);

        state.save(&path).unwrap();
        let loaded = LocalMaciState::load(&path).unwrap();

        assert_eq!(state, loaded);
        assert_eq!(
            state.signup_tree().unwrap().root(),
            loaded.signup_tree().unwrap().root()
        );
    }

    #[test]
    fn load_a_missing_file_fails() {
        let path = TempDir::create("local_maci_state", "load_a_missing_file").join("none.json");

        LocalMaciState::load(&path).expect_err("missing file should not be loaded");
    }

    #[test]
    fn has_joined_looks_for_the_nullifier_in_the_given_poll_only() {
        let state = state_with_signups(&[1]);

        assert!(state.has_joined(PollId::new(1), &FieldElement::from(777)));
        assert!(!state.has_joined(PollId::new(1), &FieldElement::from(778)));
        assert!(!state.has_joined(PollId::new(2), &FieldElement::from(777)));
    }
}
