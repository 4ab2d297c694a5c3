use anyhow::anyhow;
use thiserror::Error;

use crate::StdResult;
use crate::crypto_helper::{IncrementalMerkleTree, pad_key};
use crate::entities::{FieldElement, PublicKey, StateIndex};

/// Sign-up state related errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateBuilderError {
    /// The rebuilt tree does not commit to the expected state.
    #[error("state tree root mismatch: expected {expected}, rebuilt {actual}")]
    RootMismatch {
        /// Root the tree was checked against
        expected: FieldElement,
        /// Root of the rebuilt tree
        actual: FieldElement,
    },

    /// No sign-up of the public key, index `0` is the pad key and never a match.
    #[error("public key {0} has not signed up")]
    PublicKeyNotFound(PublicKey),
}

/// The state tree of a MACI contract and the public key behind each of its leaves.
///
/// `public_keys[i]` is the key committed by leaf `i`; index `0` holds the pad key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpTree {
    tree: IncrementalMerkleTree,
    public_keys: Vec<PublicKey>,
}

impl SignUpTree {
    /// A tree holding only the pad key leaf
    pub fn new() -> StdResult<Self> {
        let mut signup_tree = Self {
            tree: IncrementalMerkleTree::new()?,
            public_keys: vec![],
        };
        signup_tree.sign_up(pad_key()?)?;

        Ok(signup_tree)
    }

    /// Rebuild a tree from its public keys, the first one must be the pad key
    pub fn from_public_keys(public_keys: &[PublicKey]) -> StdResult<Self> {
        match public_keys.split_first() {
            Some((first, signups)) if *first == pad_key()? => {
                let mut signup_tree = Self::new()?;
                for public_key in signups {
                    signup_tree.sign_up(*public_key)?;
                }
                Ok(signup_tree)
            }
            _ => Err(anyhow!(
                "The public keys of a state tree must start with the pad key"
            )),
        }
    }

    /// Append the leaf of a public key and return its state index
    pub fn sign_up(&mut self, public_key: PublicKey) -> StdResult<StateIndex> {
        let state_index = self.tree.insert(public_key.hash()?)?;
        self.public_keys.push(public_key);

        Ok(state_index)
    }

    /// State index of the first sign-up of `public_key`
    pub fn state_index_of(&self, public_key: &PublicKey) -> Result<StateIndex, StateBuilderError> {
        self.public_keys
            .iter()
            .skip(1)
            .position(|key| key == public_key)
            .map(|position| position as StateIndex + 1)
            .ok_or(StateBuilderError::PublicKeyNotFound(*public_key))
    }

    /// Fail with [StateBuilderError::RootMismatch] if the root differs from `expected_root`
    pub fn check_root(&self, expected_root: &FieldElement) -> Result<(), StateBuilderError> {
        let actual = self.root();
        if actual != *expected_root {
            return Err(StateBuilderError::RootMismatch {
                expected: *expected_root,
                actual,
            });
        }

        Ok(())
    }

    /// The underlying Merkle tree
    pub fn tree(&self) -> &IncrementalMerkleTree {
        &self.tree
    }

    /// Public keys in state index order
    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    /// Current root
    pub fn root(&self) -> FieldElement {
        self.tree.root()
    }

    /// Number of leaves, pad key included
    pub fn total_leaves(&self) -> usize {
        self.tree.total_leaves()
    }
}
