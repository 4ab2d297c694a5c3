//! Fake data builders for testing.

use crate::entities::{
    BlockNumber, FieldElement, LogIndex, PollJoinedEvent, PublicKey, SignUpEvent, StateIndex,
};

/// Fake PublicKey, distinct for each seed
pub fn public_key(seed: u64) -> PublicKey {
    PublicKey::new(
        FieldElement::from(1_000 + seed),
        FieldElement::from(2_000 + seed),
    )
}

/// Fake private key, as the circuit encoded scalar
pub fn private_key(seed: u64) -> FieldElement {
    FieldElement::from(9_000_000 + seed)
}

/// Fake SignUpEvent
pub fn signup_event(
    public_key: PublicKey,
    state_index: StateIndex,
    block_number: BlockNumber,
) -> SignUpEvent {
    SignUpEvent::new(
        public_key,
        state_index,
        1_700_000_000 + block_number,
        block_number,
        0,
    )
}

/// Fake SignUpEvents: one per key, at the given blocks, with consecutive state indexes
/// starting at `1` and one log index per event of the same block.
pub fn signup_events(blocks: &[BlockNumber]) -> Vec<SignUpEvent> {
    let mut events: Vec<SignUpEvent> = vec![];
    for (position, block_number) in blocks.iter().enumerate() {
        let log_index = events
            .iter()
            .filter(|e| e.block_number == *block_number)
            .count() as LogIndex;
        let state_index = position as StateIndex + 1;
        events.push(SignUpEvent {
            log_index,
            ..signup_event(public_key(state_index), state_index, *block_number)
        });
    }

    events
}

/// Fake PollJoinedEvent
pub fn poll_joined_event(
    poll_public_key: PublicKey,
    nullifier: FieldElement,
    poll_state_index: StateIndex,
    block_number: BlockNumber,
) -> PollJoinedEvent {
    PollJoinedEvent {
        poll_public_key,
        voice_credit_balance: FieldElement::from(100),
        timestamp: 1_700_000_000 + block_number,
        nullifier,
        poll_state_index,
        block_number,
        log_index: 0,
    }
}
