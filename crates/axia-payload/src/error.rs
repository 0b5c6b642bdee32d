//! Error types for payload operations.

use axia_primitives::PrimitivesError;

/// Errors produced while building or decoding payloads.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The type ID is not one of the 31 registered payload types.
    #[error("{0}")]
    TypeId(String),

    /// A hex payload was given a `0x` prefix or non-hex characters.
    #[error("{0}")]
    Hex(String),

    /// The supplied value cannot be held by the selected payload type.
    #[error("{0}")]
    Content(String),

    /// Underlying codec failure (base-58, cb58, bech32, truncated input).
    #[error("{0}")]
    Primitives(#[from] PrimitivesError),
}
