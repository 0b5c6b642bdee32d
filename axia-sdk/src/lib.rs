#![deny(missing_docs)]

//! Axia SDK - Complete SDK.
//!
//! Re-exports all Axia SDK components for convenient single-crate usage.

pub use axia_avm as avm;
pub use axia_payload as payload;
pub use axia_primitives as primitives;
pub use axia_rpc as rpc;
