use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::StdResult;
use crate::crypto_helper::poseidon::hash_left_right;
use crate::entities::{FieldElement, StateIndex, TreeDepth};

/// [IncrementalMerkleTree] related errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MerkleTreeError {
    /// No leaf at the given index.
    #[error("leaf index {index} is out of range: the tree contains {total_leaves} leaves")]
    LeafIndexOutOfRange {
        /// Requested index
        index: StateIndex,
        /// Number of leaves in the tree
        total_leaves: usize,
    },
}

/// Inclusion proof of a leaf of an [IncrementalMerkleTree].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// The proven leaf
    pub leaf: FieldElement,

    /// Index of the proven leaf
    pub leaf_index: StateIndex,

    /// One sibling per level, from the leaves up to the root
    pub siblings: Vec<FieldElement>,

    /// One bit per level: `0` when the path goes through the left child, `1` otherwise
    pub path_indices: Vec<u8>,

    /// Root of the tree the proof was computed against
    pub root: FieldElement,
}

impl MerkleProof {
    /// Recompute the root from the leaf and its path
    pub fn compute_root(&self) -> StdResult<FieldElement> {
        self.siblings.iter().zip(&self.path_indices).try_fold(
            self.leaf,
            |node, (sibling, path_index)| match path_index {
                0 => hash_left_right(&node, sibling),
                _ => hash_left_right(sibling, &node),
            },
        )
    }

    /// Check that the leaf and its path lead to the root
    pub fn verify(&self) -> StdResult<()> {
        let computed_root = self.compute_root()?;
        if computed_root != self.root {
            return Err(anyhow!(
                "Merkle proof of leaf {} is invalid: computed root {computed_root}, expected {}",
                self.leaf_index,
                self.root
            ));
        }

        Ok(())
    }
}

/// Append only binary Poseidon tree which depth grows with its number of leaves.
///
/// Missing leaves are the zero element, so with `n` leaves the root commits to the leaves
/// padded with zeros up to `2^depth` where `depth = max(1, ceil(log2(n)))`.
/// Only the nodes of the rightmost path are recomputed on each insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalMerkleTree {
    /// `nodes[0]` holds the leaves, `nodes[level]` the known nodes of that level
    nodes: Vec<Vec<FieldElement>>,

    /// `zeros[level]` is the root of an empty subtree of height `level`
    zeros: Vec<FieldElement>,

    depth: TreeDepth,
}

impl IncrementalMerkleTree {
    /// Create an empty tree of depth `1`
    pub fn new() -> StdResult<Self> {
        let mut tree = Self {
            nodes: vec![vec![]],
            zeros: vec![FieldElement::zero()],
            depth: 1,
        };
        tree.ensure_levels(1)?;

        Ok(tree)
    }

    /// Create a tree and insert the given leaves in order
    pub fn from_leaves(leaves: &[FieldElement]) -> StdResult<Self> {
        let mut tree = Self::new()?;
        for leaf in leaves {
            tree.insert(*leaf)?;
        }

        Ok(tree)
    }

    /// Append a leaf and return its index
    pub fn insert(&mut self, leaf: FieldElement) -> StdResult<StateIndex> {
        let index = self.nodes[0].len();
        let depth = depth_for(index + 1);
        self.ensure_levels(depth)?;
        self.nodes[0].push(leaf);
        self.depth = depth;

        let mut position = index;
        for level in 0..depth as usize {
            let parent = position / 2;
            let left = self.node_or_zero(level, parent * 2);
            let right = self.node_or_zero(level, parent * 2 + 1);
            let hash = hash_left_right(&left, &right)?;

            let parents = &mut self.nodes[level + 1];
            if parent < parents.len() {
                parents[parent] = hash;
            } else {
                parents.push(hash);
            }
            position = parent;
        }

        Ok(index as StateIndex)
    }

    /// Current root
    pub fn root(&self) -> FieldElement {
        let depth = self.depth as usize;
        self.nodes[depth]
            .first()
            .copied()
            .unwrap_or(self.zeros[depth])
    }

    /// Current depth
    pub fn depth(&self) -> TreeDepth {
        self.depth
    }

    /// Leaves in insertion order
    pub fn leaves(&self) -> &[FieldElement] {
        &self.nodes[0]
    }

    /// Number of inserted leaves
    pub fn total_leaves(&self) -> usize {
        self.nodes[0].len()
    }

    /// Check if no leaf was inserted
    pub fn is_empty(&self) -> bool {
        self.nodes[0].is_empty()
    }

    /// Compute the inclusion proof of the leaf at the given index
    pub fn compute_proof(&self, leaf_index: StateIndex) -> Result<MerkleProof, MerkleTreeError> {
        let leaf = usize::try_from(leaf_index)
            .ok()
            .and_then(|index| self.nodes[0].get(index).copied())
            .ok_or(MerkleTreeError::LeafIndexOutOfRange {
                index: leaf_index,
                total_leaves: self.total_leaves(),
            })?;

        let depth = self.depth as usize;
        let mut siblings = Vec::with_capacity(depth);
        let mut path_indices = Vec::with_capacity(depth);
        let mut position = leaf_index as usize;
        for level in 0..depth {
            siblings.push(self.node_or_zero(level, position ^ 1));
            path_indices.push((position & 1) as u8);
            position >>= 1;
        }

        Ok(MerkleProof {
            leaf,
            leaf_index,
            siblings,
            path_indices,
            root: self.root(),
        })
    }

    fn node_or_zero(&self, level: usize, position: usize) -> FieldElement {
        self.nodes[level]
            .get(position)
            .copied()
            .unwrap_or(self.zeros[level])
    }

    fn ensure_levels(&mut self, depth: TreeDepth) -> StdResult<()> {
        let depth = depth as usize;
        while self.zeros.len() <= depth {
            let zero = self.zeros[self.zeros.len() - 1];
            self.zeros.push(hash_left_right(&zero, &zero)?);
        }
        while self.nodes.len() <= depth {
            self.nodes.push(vec![]);
        }

        Ok(())
    }
}

fn depth_for(total_leaves: usize) -> TreeDepth {
    let depth = total_leaves.next_power_of_two().trailing_zeros();
    depth.max(1) as TreeDepth
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(count: u64) -> Vec<FieldElement> {
        (1..=count).map(FieldElement::from).collect()
    }

    fn h(left: FieldElement, right: FieldElement) -> FieldElement {
        hash_left_right(&left, &right).unwrap()
    }

    #[test]
    fn depth_grows_with_the_number_of_leaves() {
        assert_eq!(1, depth_for(0));
        assert_eq!(1, depth_for(1));
        assert_eq!(1, depth_for(2));
        assert_eq!(2, depth_for(3));
        assert_eq!(2, depth_for(4));
        assert_eq!(3, depth_for(5));
        assert_eq!(4, depth_for(9));
    }

    #[test]
    fn empty_tree_root_is_the_hash_of_two_zeros() {
        let tree = IncrementalMerkleTree::new().unwrap();
        let zero = FieldElement::zero();

        assert!(tree.is_empty());
        assert_eq!(1, tree.depth());
        assert_eq!(h(zero, zero), tree.root());
    }

    #[test]
    fn single_leaf_root_is_padded_with_the_zero_leaf() {
        let leaf = FieldElement::from(7);

        let tree = IncrementalMerkleTree::from_leaves(&[leaf]).unwrap();

        assert_eq!(h(leaf, FieldElement::zero()), tree.root());
    }

    #[test]
    fn root_matches_a_naive_computation_of_the_padded_tree() {
        let zero = FieldElement::zero();
        let [l0, l1, l2, l3, l4] = leaves(5).try_into().unwrap();

        let tree = IncrementalMerkleTree::from_leaves(&[l0, l1, l2, l3, l4]).unwrap();

        let expected = h(
            h(h(l0, l1), h(l2, l3)),
            h(h(l4, zero), h(zero, zero)),
        );
        assert_eq!(3, tree.depth());
        assert_eq!(expected, tree.root());
    }

    #[test]
    fn insert_returns_consecutive_indexes() {
        let mut tree = IncrementalMerkleTree::new().unwrap();

        let indexes: Vec<StateIndex> = leaves(4)
            .into_iter()
            .map(|leaf| tree.insert(leaf).unwrap())
            .collect();

        assert_eq!(vec![0, 1, 2, 3], indexes);
        assert_eq!(leaves(4), tree.leaves());
    }

    #[test]
    fn building_twice_yields_the_same_tree() {
        let first = IncrementalMerkleTree::from_leaves(&leaves(11)).unwrap();
        let second = IncrementalMerkleTree::from_leaves(&leaves(11)).unwrap();

        assert_eq!(first.root(), second.root());
        assert_eq!(first.leaves(), second.leaves());
    }

    #[test]
    fn insertion_order_changes_the_root() {
        let mut reversed = leaves(6);
        reversed.reverse();

        let tree = IncrementalMerkleTree::from_leaves(&leaves(6)).unwrap();
        let reversed_tree = IncrementalMerkleTree::from_leaves(&reversed).unwrap();

        assert_ne!(tree.root(), reversed_tree.root());
    }

    #[test]
    fn proof_of_every_leaf_recomputes_the_root() {
        for total_leaves in [1, 2, 3, 7, 8, 13] {
            let tree = IncrementalMerkleTree::from_leaves(&leaves(total_leaves)).unwrap();

            for index in 0..total_leaves {
                let proof = tree.compute_proof(index).unwrap();

                assert_eq!(tree.depth() as usize, proof.siblings.len());
                proof.verify().unwrap_or_else(|e| {
                    panic!("proof of leaf {index} in a tree of {total_leaves} leaves: {e}")
                });
            }
        }
    }

    #[test]
    fn proof_path_indices_are_the_bits_of_the_leaf_index() {
        let tree = IncrementalMerkleTree::from_leaves(&leaves(8)).unwrap();

        let proof = tree.compute_proof(6).unwrap();

        assert_eq!(vec![0, 1, 1], proof.path_indices);
    }

    #[test]
    fn tampered_proof_is_rejected() {
        let tree = IncrementalMerkleTree::from_leaves(&leaves(4)).unwrap();
        let mut proof = tree.compute_proof(1).unwrap();
        proof.leaf = FieldElement::from(1000);

        proof.verify().expect_err("proof of a tampered leaf must fail");
    }

    #[test]
    fn proof_of_a_missing_leaf_fails() {
        let tree = IncrementalMerkleTree::from_leaves(&leaves(3)).unwrap();

        let error = tree.compute_proof(3).expect_err("no leaf at index 3");

        assert_eq!(
            MerkleTreeError::LeafIndexOutOfRange {
                index: 3,
                total_leaves: 3
            },
            error
        );
    }
}
