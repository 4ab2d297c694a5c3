//! Fold the ordered sign-up events into the state tree of a MACI contract.

mod signup_tree;
mod signup_tree_builder;

pub use signup_tree::{SignUpTree, StateBuilderError};
pub use signup_tree_builder::{SignUpTreeBuilder, SignUpTreeBuilderConfig};
