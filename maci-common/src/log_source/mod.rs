//! Port over the ledger logs of a MACI deployment, and its adapters.

#[cfg(feature = "ethereum")]
mod ethereum_log_source;
mod fake_log_source;
mod interface;

#[cfg(feature = "ethereum")]
#[cfg_attr(docsrs, doc(cfg(feature = "ethereum")))]
pub use ethereum_log_source::EthereumMaciLogSource;
pub use fake_log_source::FakeMaciLogSource;
pub use interface::*;
