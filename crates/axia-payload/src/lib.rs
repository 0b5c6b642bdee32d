#![deny(missing_docs)]

//! Axia SDK - typed payloads.
//!
//! A payload is an arbitrary blob tagged with one of 31 fixed type IDs,
//! encoded as `[u32 length][u8 type ID][content]` where the length counts
//! the type byte plus the content. Payloads are typically embedded in a
//! transaction memo or an NFT transfer output.

pub mod error;
pub mod payload;
pub mod types;

pub use error::PayloadError;
pub use payload::{Payload, PayloadValue};
pub use types::PayloadType;

#[cfg(test)]
mod tests;
