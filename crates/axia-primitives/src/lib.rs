/// Axia SDK - Binary codec, hashing, serialization and secp256k1 keys.
///
/// This crate provides the foundational building blocks for the Axia SDK:
/// - Hash functions (SHA-256, RIPEMD-160, Keccak-256)
/// - `bintools`: cb58, base-58, bech32 chain addresses, ETH-style hex
///   addresses and buffer/bignum conversions
/// - `serialization`: type-directed encoding between wire bytes and
///   display strings
/// - Big-endian binary readers and writers for the AVM codec
/// - Elliptic curve cryptography (secp256k1 keys and recoverable signatures)

pub mod hash;
pub mod util;
pub mod bintools;
pub mod serialization;
pub mod ec;

mod error;
pub use error::PrimitivesError;
