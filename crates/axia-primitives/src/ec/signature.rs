//! 65-byte recoverable ECDSA signatures.
//!
//! Layout is `r[32] ‖ s[32] ‖ recovery_id[1]`, which is what transaction
//! credentials carry on the wire. Signing uses RFC6979 nonces and low-S
//! normalization (k256 normalizes and adjusts the recovery id).

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, RecoveryId, VerifyingKey};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Serialized length of a recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

/// Required digest length.
const DIGEST_LEN: usize = 32;

/// An ECDSA signature with its recovery id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    bytes: [u8; SIGNATURE_LEN],
}

impl RecoverableSignature {
    /// Sign a 32-byte digest.
    ///
    /// # Arguments
    /// * `digest` - The message digest (SHA-256 of the unsigned bytes).
    /// * `priv_key` - The signing key.
    ///
    /// # Returns
    /// The signature, or `InvalidSignature` if the digest is not 32 bytes.
    pub fn sign(digest: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        check_digest(digest)?;
        let (sig, recid) = priv_key
            .signing_key()
            .sign_prehash_recoverable(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..64].copy_from_slice(&sig.to_bytes());
        bytes[64] = recid.to_byte();
        Ok(RecoverableSignature { bytes })
    }

    /// Parse the 65-byte wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; SIGNATURE_LEN] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidSignature(format!(
                "expected {} signature bytes, got {}",
                SIGNATURE_LEN,
                bytes.len()
            ))
        })?;
        Ok(RecoverableSignature { bytes: arr })
    }

    /// The 65-byte wire form.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.bytes
    }

    /// The recovery id byte (0..=3).
    pub fn recovery_id(&self) -> u8 {
        self.bytes[64]
    }

    fn parts(&self) -> Result<(ecdsa::Signature, RecoveryId), PrimitivesError> {
        let sig = ecdsa::Signature::from_slice(&self.bytes[..64])
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let recid = RecoveryId::from_byte(self.bytes[64])
            .ok_or_else(|| PrimitivesError::InvalidSignature("invalid recovery id".to_string()))?;
        Ok((sig, recid))
    }

    /// Recover the signer's public key from this signature and the digest.
    pub fn recover_public_key(&self, digest: &[u8]) -> Result<PublicKey, PrimitivesError> {
        check_digest(digest)?;
        let (sig, recid) = self.parts()?;
        let vk = VerifyingKey::recover_from_prehash(digest, &sig, recid)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(PublicKey::from_k256_verifying_key(&vk))
    }

    /// Verify against a known public key, ignoring the recovery id.
    pub fn verify(&self, digest: &[u8], pub_key: &PublicKey) -> bool {
        if digest.len() != DIGEST_LEN {
            return false;
        }
        match self.parts() {
            Ok((sig, _)) => pub_key.verifying_key().verify_prehash(digest, &sig).is_ok(),
            Err(_) => false,
        }
    }
}

fn check_digest(digest: &[u8]) -> Result<(), PrimitivesError> {
    if digest.len() != DIGEST_LEN {
        return Err(PrimitivesError::InvalidSignature(format!(
            "digest must be {} bytes, got {}",
            DIGEST_LEN,
            digest.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn test_signature_layout() {
        let pk = PrivateKey::new();
        let sig = pk.sign(&sha256(b"layout")).unwrap();
        let bytes = sig.to_bytes();
        assert_eq!(bytes.len(), 65);
        assert!(bytes[64] <= 3);
        assert_eq!(RecoverableSignature::from_bytes(&bytes).unwrap(), sig);
    }

    #[test]
    fn test_deterministic_nonce() {
        let pk = PrivateKey::new();
        let digest = sha256(b"same message");
        assert_eq!(pk.sign(&digest).unwrap(), pk.sign(&digest).unwrap());
    }

    #[test]
    fn test_verify_wrong_key_or_digest() {
        let pk = PrivateKey::new();
        let other = PrivateKey::new();
        let digest = sha256(b"msg");
        let sig = pk.sign(&digest).unwrap();
        assert!(!other.pub_key().verify(&digest, &sig));
        assert!(!pk.pub_key().verify(&sha256(b"other"), &sig));
        assert_ne!(sig.recover_public_key(&sha256(b"other")).ok(), Some(pk.pub_key()));
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let pk = PrivateKey::new();
        assert!(pk.sign(&[0u8; 10]).is_err());
        assert!(RecoverableSignature::from_bytes(&[0u8; 64]).is_err());
    }
}
