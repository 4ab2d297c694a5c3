//! Circom compatible Poseidon hash over the BN254 scalar field.
//!
//! Same parameters as circomlib and the `PoseidonT3`..`PoseidonT6` Solidity contracts, so
//! the values computed here match what the contracts store and what the circuits recompute.

use anyhow::Context;
use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonHasher};

use crate::StdResult;
use crate::entities::FieldElement;

/// Poseidon hash of an arbitrary number of inputs (1 to 12).
pub fn hash_n(inputs: &[FieldElement]) -> StdResult<FieldElement> {
    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())
        .with_context(|| format!("Can not build a Poseidon hasher for {} inputs", inputs.len()))?;
    let inputs: Vec<Fr> = inputs.iter().map(FieldElement::inner).collect();
    let hash = hasher.hash(&inputs).with_context(|| "Poseidon hash failed")?;

    Ok(hash.into())
}

/// Poseidon hash of two inputs, used for the tree nodes and the public key commitments.
pub fn hash_left_right(left: &FieldElement, right: &FieldElement) -> StdResult<FieldElement> {
    hash_n(&[*left, *right])
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn golden_hash_of_one_and_two() {
        let hash = hash_left_right(&FieldElement::from(1), &FieldElement::from(2)).unwrap();

        assert_eq!(
            FieldElement::from_str(
                "7853200120776062878684798364095072458815029376092732009249414926327459813530"
            )
            .unwrap(),
            hash
        );
    }

    #[test]
    fn hash_left_right_is_hash_n_with_two_inputs() {
        let left = FieldElement::from(17);
        let right = FieldElement::from(42);

        assert_eq!(
            hash_n(&[left, right]).unwrap(),
            hash_left_right(&left, &right).unwrap()
        );
    }

    #[test]
    fn hash_without_inputs_fails() {
        hash_n(&[]).expect_err("Poseidon needs at least one input");
    }
}
