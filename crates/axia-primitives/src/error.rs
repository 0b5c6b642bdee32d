/// Unified error type for all primitives operations.
///
/// The codec variants carry an operation-qualified message which is
/// also their `Display` output, e.g. `BinTools.cb58Decode: invalid checksum`.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// A cb58 payload's trailing 4 bytes do not match the recomputed checksum.
    #[error("{0}")]
    Checksum(String),

    /// A hex string (or `0x` ETH-style address) is malformed.
    #[error("{0}")]
    Hex(String),

    /// A bech32 chain address is malformed or carries an unknown HRP.
    #[error("{0}")]
    Bech32(String),

    /// A base-58 string contains characters outside the alphabet.
    #[error("{0}")]
    Base58(String),

    /// A value does not fit its length prefix.
    #[error("{0}")]
    Length(String),

    /// A value could not be converted between serialized types.
    #[error("{0}")]
    UnknownType(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::Hex(format!("invalid hex: {}", e))
    }
}

impl From<k256::ecdsa::Error> for PrimitivesError {
    fn from(e: k256::ecdsa::Error) -> Self {
        PrimitivesError::InvalidPublicKey(e.to_string())
    }
}
