//! Key pairs bound to a chain, and keychains that hold them by address.
//!
//! A key pair knows the HRP and chain alias it renders addresses for, so
//! `X-axc1...` strings come straight out of the key.

use std::collections::BTreeMap;

use axia_primitives::bintools::address_to_string;
use axia_primitives::ec::{PrivateKey, PublicKey, RecoverableSignature};

use crate::{Address, AvmError};

/// The HRP and chain alias addresses are rendered with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainBinding {
    /// Bech32 human-readable part, e.g. `axc`.
    pub hrp: String,
    /// Chain alias or ID placed before the `-`, e.g. `X`.
    pub chain_id: String,
}

impl ChainBinding {
    /// Bind to `hrp` and `chain_id`.
    pub fn new(hrp: &str, chain_id: &str) -> Self {
        ChainBinding {
            hrp: hrp.to_string(),
            chain_id: chain_id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// A secp256k1 key pair that renders chain addresses.
#[derive(Clone, Debug)]
pub struct KeyPair {
    private_key: PrivateKey,
    binding: ChainBinding,
}

impl KeyPair {
    /// Generate a fresh random key.
    pub fn generate(binding: ChainBinding) -> Self {
        KeyPair {
            private_key: PrivateKey::new(),
            binding,
        }
    }

    /// Wrap an existing private key.
    pub fn from_private_key(private_key: PrivateKey, binding: ChainBinding) -> Self {
        KeyPair {
            private_key,
            binding,
        }
    }

    /// Parse `PrivateKey-<cb58>` (the prefix is optional).
    pub fn from_string(s: &str, binding: ChainBinding) -> Result<Self, AvmError> {
        Ok(Self::from_private_key(PrivateKey::from_string(s)?, binding))
    }

    /// The chain binding.
    pub fn binding(&self) -> &ChainBinding {
        &self.binding
    }

    /// The private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// The public key.
    pub fn public_key(&self) -> PublicKey {
        self.private_key.pub_key()
    }

    /// The 20-byte address.
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// The address as `<chain>-<bech32>`.
    pub fn address_string(&self) -> Result<String, AvmError> {
        Ok(address_to_string(
            &self.binding.hrp,
            &self.binding.chain_id,
            &self.address(),
        )?)
    }

    /// The private key as `PrivateKey-<cb58>`.
    pub fn private_key_string(&self) -> String {
        self.private_key.to_string_cb58()
    }

    /// The compressed public key in cb58.
    pub fn public_key_string(&self) -> String {
        self.public_key().to_cb58()
    }

    /// Sign a 32-byte digest.
    pub fn sign(&self, digest: &[u8]) -> Result<RecoverableSignature, AvmError> {
        Ok(self.private_key.sign(digest)?)
    }

    /// Verify a signature over `digest` against this key.
    pub fn verify(&self, digest: &[u8], signature: &RecoverableSignature) -> bool {
        signature.verify(digest, &self.public_key())
    }

    /// Recover the signer's public key from a signature.
    pub fn recover(digest: &[u8], signature: &RecoverableSignature) -> Result<PublicKey, AvmError> {
        Ok(signature.recover_public_key(digest)?)
    }
}

// ---------------------------------------------------------------------------
// KeyChain
// ---------------------------------------------------------------------------

/// Key pairs indexed by address, all bound to the same chain.
#[derive(Clone, Debug)]
pub struct KeyChain {
    binding: ChainBinding,
    keys: BTreeMap<Address, KeyPair>,
}

impl KeyChain {
    /// An empty keychain for `hrp` and `chain_id`.
    pub fn new(hrp: &str, chain_id: &str) -> Self {
        KeyChain {
            binding: ChainBinding::new(hrp, chain_id),
            keys: BTreeMap::new(),
        }
    }

    /// The chain binding new keys receive.
    pub fn binding(&self) -> &ChainBinding {
        &self.binding
    }

    /// Generate, store and return a new key.
    pub fn make_key(&mut self) -> KeyPair {
        let kp = KeyPair::generate(self.binding.clone());
        self.keys.insert(kp.address(), kp.clone());
        kp
    }

    /// Import a key from its `PrivateKey-<cb58>` text form.
    pub fn import_key_str(&mut self, s: &str) -> Result<KeyPair, AvmError> {
        let kp = KeyPair::from_string(s, self.binding.clone())?;
        Ok(self.add_key(kp))
    }

    /// Import a raw 32-byte private key. Importing a key twice keeps one copy.
    pub fn import_key_bytes(&mut self, bytes: &[u8]) -> Result<KeyPair, AvmError> {
        let kp = KeyPair::from_private_key(PrivateKey::from_bytes(bytes)?, self.binding.clone());
        Ok(self.add_key(kp))
    }

    /// Store a key pair, rebinding it to this keychain's chain.
    pub fn add_key(&mut self, kp: KeyPair) -> KeyPair {
        let kp = KeyPair::from_private_key(kp.private_key, self.binding.clone());
        self.keys.insert(kp.address(), kp.clone());
        kp
    }

    /// Remove the key for `address`, returning whether one was present.
    pub fn remove_key(&mut self, address: &Address) -> bool {
        self.keys.remove(address).is_some()
    }

    /// True if a key for `address` is held.
    pub fn has_key(&self, address: &Address) -> bool {
        self.keys.contains_key(address)
    }

    /// The key for `address`.
    pub fn get_key(&self, address: &Address) -> Option<&KeyPair> {
        self.keys.get(address)
    }

    /// All held addresses, sorted.
    pub fn get_addresses(&self) -> Vec<Address> {
        self.keys.keys().copied().collect()
    }

    /// All held addresses as chain address strings.
    pub fn get_address_strings(&self) -> Result<Vec<String>, AvmError> {
        self.keys.values().map(KeyPair::address_string).collect()
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no keys are held.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A new keychain holding the keys of both.
    pub fn union(&self, other: &KeyChain) -> KeyChain {
        let mut out = self.clone();
        for kp in other.keys.values() {
            out.add_key(kp.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_is_idempotent() {
        let mut kc = KeyChain::new("axc", "X");
        let kp = kc.make_key();
        let s = kp.private_key_string();
        assert!(s.starts_with("PrivateKey-"));
        let again = kc.import_key_str(&s).unwrap();
        assert_eq!(again.address(), kp.address());
        assert_eq!(kc.len(), 1);
        kc.import_key_bytes(&kp.private_key().to_bytes()).unwrap();
        assert_eq!(kc.len(), 1);
    }

    #[test]
    fn test_address_string_uses_binding() {
        let mut kc = KeyChain::new("fuji", "X");
        let kp = kc.make_key();
        let s = kp.address_string().unwrap();
        assert!(s.starts_with("X-fuji1"));
        assert_eq!(kc.get_address_strings().unwrap(), vec![s]);
    }

    #[test]
    fn test_remove_and_union() {
        let mut a = KeyChain::new("axc", "X");
        let mut b = KeyChain::new("axc", "X");
        let ka = a.make_key();
        let kb = b.make_key();
        let u = a.union(&b);
        assert!(u.has_key(&ka.address()) && u.has_key(&kb.address()));
        assert!(a.remove_key(&ka.address()));
        assert!(!a.remove_key(&ka.address()));
        assert!(u.has_key(&ka.address()));
    }

    #[test]
    fn test_sign_verify_recover() {
        let kp = KeyPair::generate(ChainBinding::new("axc", "X"));
        let digest = [7u8; 32];
        let sig = kp.sign(&digest).unwrap();
        assert!(kp.verify(&digest, &sig));
        let recovered = KeyPair::recover(&digest, &sig).unwrap();
        assert_eq!(recovered.to_address(), kp.address());
    }
}
