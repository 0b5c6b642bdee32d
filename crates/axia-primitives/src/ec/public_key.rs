//! secp256k1 public key.
//!
//! Supports compressed/uncompressed serialization, the cb58 text form and
//! the 20-byte address derivation `RIPEMD160(SHA256(compressed))`.

use k256::ecdsa::VerifyingKey;

use crate::bintools::{cb58_decode, cb58_encode};
use crate::ec::signature::RecoverableSignature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes.
const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes.
const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from SEC1 encoded bytes (compressed or uncompressed).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey bytes are empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)?;
        Ok(PublicKey { inner: vk })
    }

    /// Parse a cb58-encoded compressed key.
    pub fn from_cb58(s: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&cb58_decode(s)?)
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }

    /// Serialize in compressed SEC1 format (33 bytes).
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in uncompressed SEC1 format (65 bytes).
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// cb58 of the compressed key.
    pub fn to_cb58(&self) -> String {
        cb58_encode(&self.to_compressed())
    }

    /// Derive the 20-byte address: Hash160 of the compressed key.
    pub fn to_address(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify a recoverable signature against a 32-byte digest.
    pub fn verify(&self, digest: &[u8], sig: &RecoverableSignature) -> bool {
        sig.verify(digest, self)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}
