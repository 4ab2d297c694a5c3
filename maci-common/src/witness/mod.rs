//! Derive the inputs of the poll joining circuit from a rebuilt state tree.

mod circuit_encoding;
mod poll_joining_witness;

pub use poll_joining_witness::{
    PollJoiningWitness, PollJoiningWitnessDeriver, PollJoiningWitnessRequest, WitnessError,
    compute_nullifier,
};
