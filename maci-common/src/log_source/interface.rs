use async_trait::async_trait;

use crate::StdResult;
use crate::entities::{
    BlockNumber, BlockRange, FieldElement, PollId, PollJoinedEvent, SignUpEvent, TreeDepth,
};

/// Read only access to the logs and views of a MACI contract and its polls.
///
/// Events returned for a window are sorted by `(block_number, log_index)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaciLogSource: Send + Sync {
    /// Number of the latest block known by the ledger
    async fn get_current_block_number(&self) -> StdResult<BlockNumber>;

    /// `SignUp` events emitted by the MACI contract in the given window
    async fn get_signup_events(&self, range: BlockRange) -> StdResult<Vec<SignUpEvent>>;

    /// `PollJoined` events emitted by the given poll in the given window
    async fn get_poll_joined_events(
        &self,
        poll_id: PollId,
        range: BlockRange,
    ) -> StdResult<Vec<PollJoinedEvent>>;

    /// Depth of the state tree expected by the circuits
    async fn get_state_tree_depth(&self) -> StdResult<TreeDepth>;

    /// Root of the state tree stored by the MACI contract once the given block is applied
    async fn get_state_tree_root(&self, block_number: BlockNumber) -> StdResult<FieldElement>;
}
