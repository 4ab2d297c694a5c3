use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// [FieldElement] parsing errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldElementError {
    /// The value is not a decimal integer.
    #[error("'{0}' is not a decimal integer")]
    NotDecimal(String),

    /// The value does not fit in the snark scalar field.
    #[error("'{0}' is not lower than the snark scalar field modulus")]
    OutOfField(String),
}

/// An element of the BN254 scalar field, the native field of the MACI circuits.
///
/// Always (de)serialized as a decimal string, which is the encoding the prover expects.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldElement(Fr);

impl FieldElement {
    /// The zero element, used to pad trees and circuit inputs
    pub fn zero() -> Self {
        Self(Fr::zero())
    }

    /// Check if this is the zero element
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Build an element from big endian bytes, rejecting values outside of the field
    pub fn try_from_be_bytes(bytes: &[u8]) -> Result<Self, FieldElementError> {
        let value = BigUint::from_bytes_be(bytes);
        Self::try_from_biguint(value)
    }

    /// Big endian 32 bytes representation
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        let be = self.0.into_bigint().to_bytes_be();
        bytes[32 - be.len()..].copy_from_slice(&be);
        bytes
    }

    /// Access the inner arkworks value
    pub fn inner(&self) -> Fr {
        self.0
    }

    fn try_from_biguint(value: BigUint) -> Result<Self, FieldElementError> {
        if value >= modulus() {
            return Err(FieldElementError::OutOfField(value.to_string()));
        }

        Ok(Self(Fr::from_le_bytes_mod_order(&value.to_bytes_le())))
    }

    fn to_biguint(self) -> BigUint {
        BigUint::from_bytes_le(&self.0.into_bigint().to_bytes_le())
    }
}

fn modulus() -> BigUint {
    BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le())
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self(Fr::from(value))
    }
}

impl From<Fr> for FieldElement {
    fn from(value: Fr) -> Self {
        Self(value)
    }
}

impl From<FieldElement> for Fr {
    fn from(value: FieldElement) -> Self {
        value.0
    }
}

impl FromStr for FieldElement {
    type Err = FieldElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FieldElementError::NotDecimal(s.to_string()));
        }
        let value = BigUint::parse_bytes(trimmed.as_bytes(), 10)
            .ok_or_else(|| FieldElementError::NotDecimal(s.to_string()))?;

        Self::try_from_biguint(value)
    }
}

impl Display for FieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_biguint())
    }
}

impl Serialize for FieldElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        FieldElement::from_str(&value).map_err(serde::de::Error::custom)
    }
}
