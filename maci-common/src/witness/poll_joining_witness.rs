use serde::{Deserialize, Serialize};
use slog::{Logger, debug};
use thiserror::Error;

use crate::StdResult;
use crate::crypto_helper::{IncrementalMerkleTree, poseidon};
use crate::entities::{FieldElement, PollId, PublicKey, StateIndex, TreeDepth};
use crate::logging::LoggerExtensions;
use crate::witness::circuit_encoding::{decimal, decimal_list, nested_siblings};

/// [PollJoiningWitnessDeriver] related errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WitnessError {
    /// Index `0` is the pad key, other indexes must point to a leaf of the tree.
    #[error(
        "invalid state index {state_index}: index 0 is reserved and the tree holds {total_leaves} leaves"
    )]
    InvalidStateIndex {
        /// The rejected index
        state_index: StateIndex,
        /// Number of leaves of the tree, pad key included
        total_leaves: usize,
    },

    /// The tree outgrew the depth of the circuit.
    #[error("circuit state tree depth {circuit_depth} is lower than the tree depth {actual_depth}")]
    CircuitDepthTooSmall {
        /// Depth expected by the circuit
        circuit_depth: TreeDepth,
        /// Depth of the rebuilt tree
        actual_depth: TreeDepth,
    },
}

/// What a user provides to join a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollJoiningWitnessRequest {
    /// Depth of the state tree in the circuit
    pub state_tree_depth: TreeDepth,

    /// Leaf of the user in the state tree
    pub state_index: StateIndex,

    /// Circuit encoded private key of the user
    pub private_key: FieldElement,

    /// Key the user will vote with in the poll
    pub poll_public_key: PublicKey,

    /// The poll to join
    pub poll_id: PollId,
}

/// Inputs of the poll joining circuit, serialized the way the prover reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollJoiningWitness {
    /// Circuit encoded private key
    #[serde(rename = "privKey")]
    pub private_key: FieldElement,

    /// Poll public key coordinates
    #[serde(rename = "pollPubKey")]
    pub poll_public_key: [FieldElement; 2],

    /// One sibling per circuit level, zero beyond the actual depth
    #[serde(with = "nested_siblings")]
    pub siblings: Vec<FieldElement>,

    /// Bit `i` of the state index for each circuit level `i`
    #[serde(with = "decimal_list")]
    pub indices: Vec<u8>,

    /// `poseidon([private_key, poll_id])`
    pub nullifier: FieldElement,

    /// Root of the state tree the path leads to
    #[serde(rename = "stateRoot")]
    pub state_root: FieldElement,

    /// Number of real siblings
    #[serde(rename = "actualStateTreeDepth", with = "decimal")]
    pub actual_state_tree_depth: TreeDepth,

    /// The joined poll
    #[serde(rename = "pollId", with = "decimal")]
    pub poll_id: PollId,
}

/// Nullifier of a private key in a poll.
///
/// The same key gets another nullifier in every poll, so a poll can refuse a second join
/// without learning who joined.
pub fn compute_nullifier(private_key: &FieldElement, poll_id: PollId) -> StdResult<FieldElement> {
    poseidon::hash_n(&[*private_key, poll_id.to_field_element()])
}

/// Build [PollJoiningWitness] from a state tree.
pub struct PollJoiningWitnessDeriver {
    logger: Logger,
}

impl PollJoiningWitnessDeriver {
    /// PollJoiningWitnessDeriver factory
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.new_with_component_name::<Self>(),
        }
    }

    /// Derive the circuit inputs of `request` against `tree`
    pub fn derive(
        &self,
        tree: &IncrementalMerkleTree,
        request: &PollJoiningWitnessRequest,
    ) -> StdResult<PollJoiningWitness> {
        let state_index = request.state_index;
        if state_index < 1 || state_index >= tree.total_leaves() as StateIndex {
            return Err(WitnessError::InvalidStateIndex {
                state_index,
                total_leaves: tree.total_leaves(),
            }
            .into());
        }
        let actual_depth = tree.depth();
        if request.state_tree_depth < actual_depth {
            return Err(WitnessError::CircuitDepthTooSmall {
                circuit_depth: request.state_tree_depth,
                actual_depth,
            }
            .into());
        }

        let proof = tree.compute_proof(state_index)?;
        let mut siblings = proof.siblings;
        siblings.resize(request.state_tree_depth as usize, FieldElement::zero());
        let indices = (0..request.state_tree_depth as u32)
            .map(|level| (state_index.checked_shr(level).unwrap_or(0) & 1) as u8)
            .collect();
        let nullifier = compute_nullifier(&request.private_key, request.poll_id)?;

        debug!(
            self.logger, "Poll joining witness derived";
            "state_index" => state_index, "poll_id" => %request.poll_id,
            "actual_state_tree_depth" => actual_depth
        );

        Ok(PollJoiningWitness {
            private_key: request.private_key,
            poll_public_key: request.poll_public_key.as_array(),
            siblings,
            indices,
            nullifier,
            state_root: proof.root,
            actual_state_tree_depth: actual_depth,
            poll_id: request.poll_id,
        })
    }
}
