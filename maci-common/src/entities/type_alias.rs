/// BlockNumber is the number of a block of the ledger
pub type BlockNumber = u64;

/// LogIndex is the position of a log inside its block
pub type LogIndex = u64;

/// StateIndex is the position of a sign-up in the state tree, `0` being the pad leaf
pub type StateIndex = u64;

/// Depth of a Merkle tree, either the actual one or the one fixed by a circuit
pub type TreeDepth = u8;

/// Unix timestamp in seconds, as emitted by the contracts
pub type Timestamp = u64;
