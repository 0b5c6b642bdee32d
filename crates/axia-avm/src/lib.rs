/// Axia SDK - AVM transaction building, signing, and serialization.
///
/// Provides the UTXO ownership model (`Utxo`, `UtxoSet`), the transaction
/// wire types (`UnsignedTx`, `Tx` and their bodies), keychains for signing,
/// per-network defaults, and the transaction builders with their fee
/// sanity check.

pub mod asset_amount;
pub mod builder;
pub mod constants;
pub mod credentials;
pub mod defaults;
pub mod inputs;
pub mod keychain;
pub mod operations;
pub mod outputs;
pub mod tx;
pub mod unsigned_tx;
pub mod utxo;
pub mod utxo_set;

mod error;
pub use error::AvmError;
pub use keychain::{KeyChain, KeyPair};
pub use unsigned_tx::{Tx, UnsignedTx};
pub use utxo::Utxo;
pub use utxo_set::{MergeRule, UtxoSet};

/// A 20-byte address (Hash160 of a compressed public key).
pub type Address = [u8; 20];

/// A 32-byte identifier (transaction, asset or blockchain ID).
pub type Id = [u8; 32];
