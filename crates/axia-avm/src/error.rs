/// Error types for AVM operations.
///
/// Every variant carrying a `String` renders that string verbatim; the
/// string names the failing operation, e.g.
/// `UTXOSet.buildBaseTx: Failed Goose Egg Check`.
#[derive(Debug, thiserror::Error)]
pub enum AvmError {
    /// An address failed strict validation (wrong chain prefix or length).
    #[error("{0}")]
    Address(String),
    /// A source or destination chain ID is missing or not 32 bytes.
    #[error("{0}")]
    ChainId(String),
    /// An import found no atomic UTXOs for the given owners.
    #[error("{0}")]
    NoAtomicUtxos(String),
    /// An asset symbol exceeds the protocol cap.
    #[error("{0}")]
    Symbol(String),
    /// An asset name exceeds the protocol cap.
    #[error("{0}")]
    Name(String),
    /// The built transaction burns an implausibly large fee.
    #[error("{0}")]
    GooseEggCheck(String),
    /// The requested threshold exceeds the number of owners.
    #[error("{0}")]
    Threshold(String),
    /// The requested amount is zero.
    #[error("{0}")]
    InvalidAmount(String),
    /// The spendable UTXOs do not cover the requested amounts plus fees.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Total required, amount plus burn, for the first unfinished asset.
        needed: u64,
        /// Amount that could be gathered for that asset.
        available: u64,
    },
    /// A spender address is not listed in the output it signs for.
    #[error("{0}")]
    AddressIndex(String),
    /// A referenced UTXO is missing or holds the wrong output kind.
    #[error("{0}")]
    Utxo(String),
    /// An unknown UTXO set merge rule.
    #[error("{0}")]
    MergeRule(String),
    /// The keychain lacks a key needed to sign an input or operation.
    #[error("{0}")]
    Signing(String),
    /// Binary decoding failed or the type ID is unknown.
    #[error("{0}")]
    Serialization(String),
    /// Persisted UTXO cache could not be encoded or decoded.
    #[error("persisted cache error: {0}")]
    Persistence(#[from] serde_json::Error),
    /// An underlying primitives error (forwarded from `axia-primitives`).
    #[error("{0}")]
    Primitives(#[from] axia_primitives::PrimitivesError),
    /// An underlying payload error (forwarded from `axia-payload`).
    #[error("{0}")]
    Payload(#[from] axia_payload::PayloadError),
}
