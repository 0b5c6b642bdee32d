#![deny(missing_docs)]

//! Axia SDK - JSON-RPC client for the exchange (X) chain.
//!
//! [`HttpTransport`] posts JSON-RPC 2.0 envelopes to a node. [`AvmApi`]
//! marshals the `avm.*` methods on top of any [`JsonRpcTransport`], caches
//! the native asset ID and fee schedule, and wraps the pure transaction
//! builders from `axia-avm` with address parsing and UTXO fetching.
//! Every network call takes a `CancellationToken`.

pub mod api;
pub mod cache;
pub mod error;
pub mod transport;
pub mod types;

pub use api::{AvmApi, IssueTx, Participants, UtxoPage};
pub use error::RpcError;
pub use transport::{HttpTransport, JsonRpcTransport};
pub use types::RpcConfig;

#[cfg(test)]
mod tests;
