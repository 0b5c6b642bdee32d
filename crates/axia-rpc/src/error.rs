//! Error types for RPC operations.

use axia_avm::AvmError;
use axia_primitives::PrimitivesError;

/// Errors from the JSON-RPC transport and the AVM API wrapper.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The node answered with a non-success HTTP status.
    #[error("server error (HTTP {status_code}): {message}")]
    ServerError {
        /// HTTP status code.
        status_code: u16,
        /// Response body.
        message: String,
    },

    /// The node answered with a JSON-RPC error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The response carried neither `result` nor `error`.
    #[error("JSON-RPC response for {0} has no result")]
    MissingResult(String),

    /// The caller's cancellation token fired before the call completed.
    #[error("request cancelled")]
    Cancelled,

    /// The value passed to `issueTx` is not a decodable transaction.
    #[error("{0}")]
    Transaction(String),

    /// A transaction-level error (address, chain ID, goose egg, ...).
    #[error("{0}")]
    Avm(#[from] AvmError),

    /// An encoding error from the primitives crate.
    #[error("{0}")]
    Primitives(#[from] PrimitivesError),
}
