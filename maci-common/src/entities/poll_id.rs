use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::FieldElement;

/// [PollId] related errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PollIdError {
    /// Poll ids are never negative.
    #[error("Invalid poll id '{0}': a poll id can not be negative")]
    Negative(i128),

    /// The value does not fit in 64 bits.
    #[error("Invalid poll id '{0}': a poll id must fit in 64 bits")]
    TooLarge(String),

    /// The value is not an integer.
    #[error("Invalid poll id '{0}': not an integer")]
    NotAnInteger(String),
}

/// Identifier of a poll deployed by a MACI contract.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PollId(u64);

impl PollId {
    /// PollId factory
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The poll id as a field element, the way it enters the nullifier
    pub fn to_field_element(&self) -> FieldElement {
        FieldElement::from(self.0)
    }
}

impl TryFrom<i64> for PollId {
    type Error = PollIdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(PollId)
            .map_err(|_| PollIdError::Negative(value.into()))
    }
}

impl FromStr for PollId {
    type Err = PollIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i128>()
            .map_err(|_| PollIdError::NotAnInteger(s.to_string()))?;
        if value < 0 {
            return Err(PollIdError::Negative(value));
        }

        u64::try_from(value)
            .map(PollId)
            .map_err(|_| PollIdError::TooLarge(s.to_string()))
    }
}

impl From<PollId> for u64 {
    fn from(value: PollId) -> Self {
        value.0
    }
}

impl Display for PollId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_poll_id_is_rejected() {
        assert_eq!(Err(PollIdError::Negative(-1)), PollId::try_from(-1_i64));
        assert_eq!(Err(PollIdError::Negative(-1)), PollId::from_str("-1"));
    }

    #[test]
    fn parse_poll_ids_up_to_the_largest_64_bits_value() {
        assert_eq!(Ok(PollId::new(u64::MAX)), PollId::from_str(&u64::MAX.to_string()));
        assert_eq!(
            Err(PollIdError::TooLarge("18446744073709551616".to_string())),
            PollId::from_str("18446744073709551616")
        );
    }

    #[test]
    fn parse_poll_id() {
        assert_eq!(Ok(PollId::new(0)), PollId::from_str("0"));
        assert_eq!(Ok(PollId::new(12)), PollId::from_str(" 12 "));
        assert!(matches!(
            PollId::from_str("twelve"),
            Err(PollIdError::NotAnInteger(_))
        ));
    }
}
