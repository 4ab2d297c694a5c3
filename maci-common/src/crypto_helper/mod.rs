//! Cryptographic helpers: Poseidon hashing, the sign-up state Merkle tree and the MACI pad key.

mod merkle_tree;
mod pad_key;
pub mod poseidon;

pub use merkle_tree::{IncrementalMerkleTree, MerkleProof, MerkleTreeError};
pub use pad_key::{PAD_KEY_X, PAD_KEY_Y, pad_key, pad_key_hash};
