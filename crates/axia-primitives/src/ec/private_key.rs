//! secp256k1 private key.
//!
//! Wraps a k256 signing key and adds the `PrivateKey-<cb58>` text form and
//! recoverable signing over 32-byte message digests.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::bintools::{cb58_decode, cb58_encode};
use crate::ec::public_key::PublicKey;
use crate::ec::signature::RecoverableSignature;
use crate::serialization::PRIVATE_KEY_PREFIX;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key for signing.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes are a valid non-zero scalar on secp256k1.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Parse the textual form `PrivateKey-<cb58>`.
    ///
    /// The prefix is optional; anything after the first `-` is decoded as cb58.
    pub fn from_string(s: &str) -> Result<Self, PrimitivesError> {
        let encoded = match s.split_once('-') {
            Some((_, rest)) => rest,
            None => s,
        };
        let bytes = cb58_decode(encoded)?;
        Self::from_bytes(&bytes)
    }

    /// Render as `PrivateKey-<cb58>`.
    pub fn to_string_cb58(&self) -> String {
        format!("{}{}", PRIVATE_KEY_PREFIX, cb58_encode(&self.to_bytes()))
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest, producing a 65-byte recoverable signature.
    ///
    /// # Arguments
    /// * `digest` - The message digest; must be exactly 32 bytes.
    ///
    /// # Returns
    /// A low-S `RecoverableSignature`, or an error if the digest is malformed.
    pub fn sign(&self, digest: &[u8]) -> Result<RecoverableSignature, PrimitivesError> {
        RecoverableSignature::sign(digest, self)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn test_bytes_roundtrip() {
        let pk = PrivateKey::new();
        let restored = PrivateKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(pk, restored);
    }

    #[test]
    fn test_string_roundtrip() {
        let pk = PrivateKey::new();
        let s = pk.to_string_cb58();
        assert!(s.starts_with("PrivateKey-"));
        assert_eq!(PrivateKey::from_string(&s).unwrap(), pk);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(matches!(
            PrivateKey::from_string("PrivateKey-H1eQiQra9Xyg7mBTVkM28AegfB"),
            Err(PrimitivesError::Checksum(_))
        ));
    }

    #[test]
    fn test_sign_and_recover() {
        let pk = PrivateKey::new();
        let digest = sha256(b"axia");
        let sig = pk.sign(&digest).unwrap();
        let recovered = sig.recover_public_key(&digest).unwrap();
        assert_eq!(recovered, pk.pub_key());
        assert!(pk.pub_key().verify(&digest, &sig));
    }
}
