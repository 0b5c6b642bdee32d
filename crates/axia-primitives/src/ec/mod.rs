/// Elliptic curve cryptography on secp256k1.
///
/// Provides private keys, public keys and 65-byte recoverable ECDSA
/// signatures as used by transaction credentials.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::RecoverableSignature;
