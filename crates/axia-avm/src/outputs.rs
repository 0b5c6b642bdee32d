//! Transaction outputs: ownership conditions, the four output kinds and
//! the asset-tagged `TransferableOutput` wrapper.

use std::cmp::Ordering;

use axia_primitives::util::{ByteReader, ByteWriter};

use crate::constants::{
    NFT_MINT_OUTPUT_ID, NFT_XFER_OUTPUT_ID, SECP_MINT_OUTPUT_ID, SECP_XFER_OUTPUT_ID,
};
use crate::{Address, AvmError, Id};

// ---------------------------------------------------------------------------
// OutputOwners
// ---------------------------------------------------------------------------

/// Who may spend an output, and from when.
///
/// # Wire format
///
/// | Field     | Size            |
/// |-----------|-----------------|
/// | locktime  | 8 bytes (BE)    |
/// | threshold | 4 bytes (BE)    |
/// | count     | 4 bytes (BE)    |
/// | addresses | 20 bytes each   |
///
/// Addresses are kept sorted ascending so equal owner sets serialize
/// identically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct OutputOwners {
    locktime: u64,
    threshold: u32,
    addresses: Vec<Address>,
}

impl OutputOwners {
    /// Create owners, sorting the addresses.
    pub fn new(mut addresses: Vec<Address>, locktime: u64, threshold: u32) -> Self {
        addresses.sort();
        OutputOwners {
            locktime,
            threshold,
            addresses,
        }
    }

    /// Unix time before which the output cannot be spent.
    pub fn locktime(&self) -> u64 {
        self.locktime
    }

    /// Number of owner signatures required.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// The owner addresses, sorted ascending.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Position of `address` among the owners; this is the signature index.
    pub fn address_idx(&self, address: &Address) -> Option<u32> {
        self.addresses
            .iter()
            .position(|a| a == address)
            .map(|i| i as u32)
    }

    /// The owners among `addresses` that would sign a spend at `as_of`.
    ///
    /// Walks the owner list in order and stops once `threshold` signers
    /// are found. Returns nothing while the output is still locked.
    pub fn spenders(&self, addresses: &[Address], as_of: u64) -> Vec<Address> {
        if self.locktime > as_of {
            return Vec::new();
        }
        self.addresses
            .iter()
            .filter(|a| addresses.contains(a))
            .take(self.threshold as usize)
            .copied()
            .collect()
    }

    /// True if `addresses` alone can spend this output at `as_of`.
    pub fn meets_threshold(&self, addresses: &[Address], as_of: u64) -> bool {
        self.locktime <= as_of && self.spenders(addresses, as_of).len() >= self.threshold as usize
    }

    /// Deserialize from a reader positioned at the locktime.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let locktime = reader.read_u64()?;
        let threshold = reader.read_u32()?;
        let count = reader.read_u32()?;
        let mut addresses = Vec::with_capacity((count as usize).min(reader.remaining() / 20));
        for _ in 0..count {
            addresses.push(reader.read_array::<20>().map_err(|e| {
                AvmError::Serialization(format!("OutputOwners.fromBuffer: reading address: {}", e))
            })?);
        }
        Ok(OutputOwners::new(addresses, locktime, threshold))
    }

    /// Serialize into a writer.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64(self.locktime);
        writer.write_u32(self.threshold);
        writer.write_u32(self.addresses.len() as u32);
        for a in &self.addresses {
            writer.write_bytes(a);
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The output kinds an AVM UTXO can hold.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Output {
    /// A fungible amount (type 7).
    SecpTransfer {
        /// Amount of the asset.
        amount: u64,
        /// Spending conditions.
        owners: OutputOwners,
    },
    /// The right to mint more of a fungible asset (type 6).
    SecpMint {
        /// Who may mint.
        owners: OutputOwners,
    },
    /// The right to mint NFTs of one group (type 10).
    NftMint {
        /// The NFT group this right covers.
        group_id: u32,
        /// Who may mint.
        owners: OutputOwners,
    },
    /// One NFT (type 11).
    NftTransfer {
        /// The NFT group.
        group_id: u32,
        /// Opaque NFT content.
        payload: Vec<u8>,
        /// Spending conditions.
        owners: OutputOwners,
    },
}

impl Output {
    /// Convenience constructor for a SECP transfer output.
    pub fn secp_transfer(amount: u64, addresses: Vec<Address>, locktime: u64, threshold: u32) -> Self {
        Output::SecpTransfer {
            amount,
            owners: OutputOwners::new(addresses, locktime, threshold),
        }
    }

    /// The wire type ID.
    pub fn type_id(&self) -> u32 {
        match self {
            Output::SecpTransfer { .. } => SECP_XFER_OUTPUT_ID,
            Output::SecpMint { .. } => SECP_MINT_OUTPUT_ID,
            Output::NftMint { .. } => NFT_MINT_OUTPUT_ID,
            Output::NftTransfer { .. } => NFT_XFER_OUTPUT_ID,
        }
    }

    /// The spending conditions.
    pub fn owners(&self) -> &OutputOwners {
        match self {
            Output::SecpTransfer { owners, .. }
            | Output::SecpMint { owners }
            | Output::NftMint { owners, .. }
            | Output::NftTransfer { owners, .. } => owners,
        }
    }

    /// The amount, for fungible outputs.
    pub fn amount(&self) -> Option<u64> {
        match self {
            Output::SecpTransfer { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    /// Deserialize the body of an output whose type ID was already read.
    pub fn read_body(reader: &mut ByteReader, type_id: u32) -> Result<Self, AvmError> {
        let output = match type_id {
            SECP_XFER_OUTPUT_ID => {
                let amount = reader.read_u64()?;
                Output::SecpTransfer {
                    amount,
                    owners: OutputOwners::read_from(reader)?,
                }
            }
            SECP_MINT_OUTPUT_ID => Output::SecpMint {
                owners: OutputOwners::read_from(reader)?,
            },
            NFT_MINT_OUTPUT_ID => {
                let group_id = reader.read_u32()?;
                Output::NftMint {
                    group_id,
                    owners: OutputOwners::read_from(reader)?,
                }
            }
            NFT_XFER_OUTPUT_ID => {
                let group_id = reader.read_u32()?;
                let payload = reader.read_sized_bytes()?.to_vec();
                Output::NftTransfer {
                    group_id,
                    payload,
                    owners: OutputOwners::read_from(reader)?,
                }
            }
            other => {
                return Err(AvmError::Serialization(format!(
                    "Output.fromBuffer: unknown output type id {}",
                    other
                )))
            }
        };
        Ok(output)
    }

    /// Deserialize a type ID followed by the output body.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let type_id = reader.read_u32()?;
        Self::read_body(reader, type_id)
    }

    /// Serialize the body without its type ID.
    pub fn write_body(&self, writer: &mut ByteWriter) {
        match self {
            Output::SecpTransfer { amount, owners } => {
                writer.write_u64(*amount);
                owners.write_to(writer);
            }
            Output::SecpMint { owners } => owners.write_to(writer),
            Output::NftMint { group_id, owners } => {
                writer.write_u32(*group_id);
                owners.write_to(writer);
            }
            Output::NftTransfer {
                group_id,
                payload,
                owners,
            } => {
                writer.write_u32(*group_id);
                writer.write_sized_bytes(payload);
                owners.write_to(writer);
            }
        }
    }

    /// Serialize the type ID followed by the body.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.type_id());
        self.write_body(writer);
    }

    /// Type ID plus body as bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        self.write_to(&mut w);
        w.into_bytes()
    }
}

// ---------------------------------------------------------------------------
// TransferableOutput
// ---------------------------------------------------------------------------

/// An output tagged with the asset it holds.
///
/// Orders by serialized bytes, which is the canonical order of outputs
/// in a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransferableOutput {
    /// The asset held by the output.
    pub asset_id: Id,
    /// The output itself.
    pub output: Output,
}

impl TransferableOutput {
    /// Wrap an output with its asset ID.
    pub fn new(asset_id: Id, output: Output) -> Self {
        TransferableOutput { asset_id, output }
    }

    /// Deserialize `assetID | typeID | output`.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let asset_id = reader.read_array::<32>()?;
        let output = Output::read_from(reader)?;
        Ok(TransferableOutput { asset_id, output })
    }

    /// Serialize `assetID | typeID | output`.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.asset_id);
        self.output.write_to(writer);
    }

    /// Serialized bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        self.write_to(&mut w);
        w.into_bytes()
    }
}

impl Ord for TransferableOutput {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl PartialOrd for TransferableOutput {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
