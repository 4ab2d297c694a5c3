#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Shared datatypes and services used by MACI clients to rebuild the sign-up state
//! of a MACI contract from its event logs and to derive poll joining circuit inputs.
//!
//! Provide:
//! - The [entities] read from the chain and exchanged with the prover.
//! - A [Poseidon][crypto_helper::poseidon] hash and an
//!   [incremental Merkle tree][crypto_helper::IncrementalMerkleTree] with the MACI conventions.
//! - A [log source][log_source] port over the ledger, with an Ethereum JSON-RPC adapter.
//! - An [event batch fetcher][event_fetcher] reading logs window by window.
//! - A [sign-up state builder][state_builder] folding sign-ups into the state tree.
//! - A [poll joining witness deriver][witness].
//! - A [local state][local_state] that can be generated from the chain and persisted as JSON.

pub mod crypto_helper;
pub mod entities;
pub mod event_fetcher;
pub mod local_state;
pub mod log_source;
pub mod logging;
pub mod poll_joining;
pub mod state_builder;
pub mod witness;

#[cfg(any(test, feature = "test_tools"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test_tools")))]
pub mod test_utils;

/// Generic error type
pub type StdError = anyhow::Error;

/// Generic result type
pub type StdResult<T> = anyhow::Result<T, StdError>;

/// Default number of blocks requested to the log source in one call.
pub const DEFAULT_BLOCKS_PER_REQUEST: u64 = 50;
