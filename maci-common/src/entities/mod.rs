//! The entities used by, and exchanged between, the log sources, the state builder and the prover.

mod block_range;
mod field_element;
mod poll_id;
mod poll_joined_event;
mod public_key;
mod signup_event;
mod type_alias;

pub use block_range::{BlockRange, BlockRangeWindows};
pub use field_element::{FieldElement, FieldElementError};
pub use poll_id::{PollId, PollIdError};
pub use poll_joined_event::PollJoinedEvent;
pub use public_key::{PublicKey, PublicKeyParseError};
pub use signup_event::SignUpEvent;
pub use type_alias::*;
