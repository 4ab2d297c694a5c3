use std::collections::BTreeMap;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::StdResult;
use crate::crypto_helper::{IncrementalMerkleTree, pad_key_hash};
use crate::entities::{
    BlockNumber, BlockRange, FieldElement, PollId, PollJoinedEvent, SignUpEvent, TreeDepth,
};
use crate::log_source::MaciLogSource;

/// In memory [MaciLogSource], for tests and demos.
///
/// Unless set explicitly, the state tree root at a block is computed from the sign-ups emitted
/// up to that block, capped to the current block, the way the MACI contract maintains it.
pub struct FakeMaciLogSource {
    current_block_number: BlockNumber,
    state_tree_depth: TreeDepth,
    state_tree_root: Option<FieldElement>,
    signup_events: Vec<SignUpEvent>,
    poll_joined_events: BTreeMap<PollId, Vec<PollJoinedEvent>>,
    unreachable_blocks: Vec<BlockNumber>,
}

impl FakeMaciLogSource {
    /// FakeMaciLogSource factory, without events
    pub fn new(current_block_number: BlockNumber, state_tree_depth: TreeDepth) -> Self {
        Self {
            current_block_number,
            state_tree_depth,
            state_tree_root: None,
            signup_events: vec![],
            poll_joined_events: BTreeMap::new(),
            unreachable_blocks: vec![],
        }
    }

    /// Add sign-up events, in any order
    pub fn with_signup_events(mut self, events: Vec<SignUpEvent>) -> Self {
        self.signup_events.extend(events);
        self.signup_events.sort_by_key(SignUpEvent::chain_order);
        self
    }

    /// Add poll joined events of a poll, in any order
    pub fn with_poll_joined_events(
        mut self,
        poll_id: PollId,
        events: Vec<PollJoinedEvent>,
    ) -> Self {
        let poll_events = self.poll_joined_events.entry(poll_id).or_default();
        poll_events.extend(events);
        poll_events.sort_by_key(PollJoinedEvent::chain_order);
        self
    }

    /// Force the state tree root returned by the fake
    pub fn with_state_tree_root(mut self, root: FieldElement) -> Self {
        self.state_tree_root = Some(root);
        self
    }

    /// Make every request touching one of these blocks fail
    pub fn with_unreachable_blocks(mut self, blocks: Vec<BlockNumber>) -> Self {
        self.unreachable_blocks = blocks;
        self
    }

    fn check_reachable(&self, range: BlockRange) -> StdResult<()> {
        match self.unreachable_blocks.iter().find(|b| range.contains(**b)) {
            Some(block) => Err(anyhow!(
                "Log source unreachable while reading block {block} of window {range}"
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MaciLogSource for FakeMaciLogSource {
    async fn get_current_block_number(&self) -> StdResult<BlockNumber> {
        Ok(self.current_block_number)
    }

    async fn get_signup_events(&self, range: BlockRange) -> StdResult<Vec<SignUpEvent>> {
        self.check_reachable(range)?;

        Ok(self
            .signup_events
            .iter()
            .filter(|e| range.contains(e.block_number))
            .cloned()
            .collect())
    }

    async fn get_poll_joined_events(
        &self,
        poll_id: PollId,
        range: BlockRange,
    ) -> StdResult<Vec<PollJoinedEvent>> {
        self.check_reachable(range)?;

        Ok(self
            .poll_joined_events
            .get(&poll_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| range.contains(e.block_number))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_state_tree_depth(&self) -> StdResult<TreeDepth> {
        Ok(self.state_tree_depth)
    }

    async fn get_state_tree_root(&self, block_number: BlockNumber) -> StdResult<FieldElement> {
        if let Some(root) = self.state_tree_root {
            return Ok(root);
        }

        let last_block = block_number.min(self.current_block_number);
        let mut tree = IncrementalMerkleTree::new()?;
        tree.insert(pad_key_hash()?)?;
        for event in self
            .signup_events
            .iter()
            .filter(|e| e.block_number <= last_block)
        {
            tree.insert(event.public_key.hash()?)?;
        }

        Ok(tree.root())
    }
}
