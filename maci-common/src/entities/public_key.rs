use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::StdResult;
use crate::crypto_helper::poseidon;
use crate::entities::{FieldElement, FieldElementError};

/// [PublicKey] parsing errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PublicKeyParseError {
    /// The value is not made of two comma separated coordinates.
    #[error("Invalid public key '{0}': expected two comma separated decimal coordinates")]
    NotAPair(String),

    /// A coordinate is not a field element.
    #[error("Invalid public key coordinate")]
    Coordinate(#[from] FieldElementError),
}

/// A MACI public key: a point of the Baby Jubjub curve given by its two coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    /// First coordinate
    pub x: FieldElement,

    /// Second coordinate
    pub y: FieldElement,
}

impl PublicKey {
    /// PublicKey factory
    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y }
    }

    /// Leaf commitment of the key in the state tree: `poseidon(x, y)`.
    pub fn hash(&self) -> StdResult<FieldElement> {
        poseidon::hash_left_right(&self.x, &self.y)
    }

    /// Coordinates as the two elements array used by circuits and contracts.
    pub fn as_array(&self) -> [FieldElement; 2] {
        [self.x, self.y]
    }
}

impl From<[FieldElement; 2]> for PublicKey {
    fn from(value: [FieldElement; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

/// Parse `x,y`, optionally wrapped in brackets the way [PublicKey] is displayed.
impl FromStr for PublicKey {
    type Err = PublicKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(trimmed);

        match inner.split(',').collect::<Vec<_>>().as_slice() {
            [x, y] => Ok(Self::new(x.parse()?, y.parse()?)),
            _ => Err(PublicKeyParseError::NotAPair(s.to_string())),
        }
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
