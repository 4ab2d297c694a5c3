//! End to end derivation of the poll joining circuit inputs of a user.

mod poll_joining_pipeline;

pub use poll_joining_pipeline::{
    PollJoiningError, PollJoiningPipeline, PollJoiningRequest, StateSource,
};
