//! Serde helpers for the circuit inputs: every number travels as a decimal string.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serializer};

use crate::entities::FieldElement;

/// A number as a decimal string.
pub mod decimal {
    use super::*;

    pub fn serialize<T: Display, S: Serializer>(
        value: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// A list of numbers as decimal strings.
pub mod decimal_list {
    use super::*;

    pub fn serialize<T: Display, S: Serializer>(
        values: &[T],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.to_string()))
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|value| value.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Siblings as one element arrays, the shape of the circuit `siblings[depth][1]` signal.
pub mod nested_siblings {
    use super::*;

    pub fn serialize<S: Serializer>(
        siblings: &[FieldElement],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(siblings.iter().map(|sibling| [sibling]))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<FieldElement>, D::Error> {
        let nested = Vec::<[FieldElement; 1]>::deserialize(deserializer)?;
        Ok(nested.into_iter().map(|[sibling]| sibling).collect())
    }
}
