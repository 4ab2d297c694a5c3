use std::str::FromStr;

use crate::StdResult;
use crate::entities::{FieldElement, PublicKey};

/// First coordinate of the pad key.
///
/// The pad key is the first Pedersen base point of circomlib: it comes from a hash to curve,
/// nobody knows its private key.
pub const PAD_KEY_X: &str =
    "10457101036533406547632367118273992217979173478358440826365724437999023779287";

/// Second coordinate of the pad key.
pub const PAD_KEY_Y: &str =
    "19824078218392094440610104313265183977899662750282163392862422243483260492317";

/// The public key occupying the index `0` of the state tree.
pub fn pad_key() -> StdResult<PublicKey> {
    Ok(PublicKey::new(
        FieldElement::from_str(PAD_KEY_X)?,
        FieldElement::from_str(PAD_KEY_Y)?,
    ))
}

/// The leaf inserted first in every state tree.
pub fn pad_key_hash() -> StdResult<FieldElement> {
    pad_key()?.hash()
}
