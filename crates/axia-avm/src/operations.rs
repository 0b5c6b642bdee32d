//! Operations: spending mint rights and NFTs inside an `OperationTx`.

use std::cmp::Ordering;

use axia_primitives::util::{ByteReader, ByteWriter};

use crate::constants::{NFT_MINT_OP_ID, NFT_XFER_OP_ID, SECP_MINT_OP_ID};
use crate::credentials::CredentialKind;
use crate::inputs::{read_sig_idxs, write_sig_idxs, SigIdx};
use crate::outputs::OutputOwners;
use crate::{Address, AvmError, Id};

/// A UTXO reference: the creating transaction and output index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtxoRef {
    /// ID of the creating transaction.
    pub tx_id: Id,
    /// Output index within it.
    pub output_idx: u32,
}

/// The operation kinds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Spend a SECP mint output: recreate the mint right and mint an amount (type 8).
    SecpMint {
        /// Signers of the spent mint output.
        sig_idxs: Vec<SigIdx>,
        /// Owners of the recreated mint right.
        mint_owners: OutputOwners,
        /// Amount minted.
        transfer_amount: u64,
        /// Owners of the minted amount.
        transfer_owners: OutputOwners,
    },
    /// Spend an NFT mint output to create NFTs of its group (type 12).
    NftMint {
        /// Signers of the spent mint output.
        sig_idxs: Vec<SigIdx>,
        /// Group being minted.
        group_id: u32,
        /// NFT content.
        payload: Vec<u8>,
        /// One owner set per minted NFT.
        outputs: Vec<OutputOwners>,
    },
    /// Move an NFT to new owners (type 13).
    NftTransfer {
        /// Signers of the spent NFT.
        sig_idxs: Vec<SigIdx>,
        /// Group of the NFT.
        group_id: u32,
        /// NFT content, carried over unchanged.
        payload: Vec<u8>,
        /// New owners.
        owners: OutputOwners,
    },
}

impl Operation {
    /// The wire type ID.
    pub fn type_id(&self) -> u32 {
        match self {
            Operation::SecpMint { .. } => SECP_MINT_OP_ID,
            Operation::NftMint { .. } => NFT_MINT_OP_ID,
            Operation::NftTransfer { .. } => NFT_XFER_OP_ID,
        }
    }

    /// The credential kind that authorizes this operation.
    pub fn credential_kind(&self) -> CredentialKind {
        match self {
            Operation::SecpMint { .. } => CredentialKind::Secp,
            Operation::NftMint { .. } | Operation::NftTransfer { .. } => CredentialKind::Nft,
        }
    }

    /// Required signatures.
    pub fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Operation::SecpMint { sig_idxs, .. }
            | Operation::NftMint { sig_idxs, .. }
            | Operation::NftTransfer { sig_idxs, .. } => sig_idxs,
        }
    }

    /// Record that `source`, at `index` in the spent output, must sign.
    pub fn add_signature_idx(&mut self, index: u32, source: Address) {
        let sig_idxs = match self {
            Operation::SecpMint { sig_idxs, .. }
            | Operation::NftMint { sig_idxs, .. }
            | Operation::NftTransfer { sig_idxs, .. } => sig_idxs,
        };
        sig_idxs.push(SigIdx { index, source });
    }

    /// Deserialize a type ID followed by the operation body.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let type_id = reader.read_u32()?;
        let sig_idxs = read_sig_idxs(reader)?;
        let op = match type_id {
            SECP_MINT_OP_ID => {
                let mint_owners = OutputOwners::read_from(reader)?;
                let transfer_amount = reader.read_u64()?;
                let transfer_owners = OutputOwners::read_from(reader)?;
                Operation::SecpMint {
                    sig_idxs,
                    mint_owners,
                    transfer_amount,
                    transfer_owners,
                }
            }
            NFT_MINT_OP_ID => {
                let group_id = reader.read_u32()?;
                let payload = reader.read_sized_bytes()?.to_vec();
                let count = reader.read_u32()?;
                let mut outputs = Vec::new();
                for _ in 0..count {
                    outputs.push(OutputOwners::read_from(reader)?);
                }
                Operation::NftMint {
                    sig_idxs,
                    group_id,
                    payload,
                    outputs,
                }
            }
            NFT_XFER_OP_ID => {
                let group_id = reader.read_u32()?;
                let payload = reader.read_sized_bytes()?.to_vec();
                let owners = OutputOwners::read_from(reader)?;
                Operation::NftTransfer {
                    sig_idxs,
                    group_id,
                    payload,
                    owners,
                }
            }
            other => {
                return Err(AvmError::Serialization(format!(
                    "Operation.fromBuffer: unknown operation type id {}",
                    other
                )))
            }
        };
        Ok(op)
    }

    /// Serialize the type ID followed by the body.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.type_id());
        write_sig_idxs(self.sig_idxs(), writer);
        match self {
            Operation::SecpMint {
                mint_owners,
                transfer_amount,
                transfer_owners,
                ..
            } => {
                mint_owners.write_to(writer);
                writer.write_u64(*transfer_amount);
                transfer_owners.write_to(writer);
            }
            Operation::NftMint {
                group_id,
                payload,
                outputs,
                ..
            } => {
                writer.write_u32(*group_id);
                writer.write_sized_bytes(payload);
                writer.write_u32(outputs.len() as u32);
                for o in outputs {
                    o.write_to(writer);
                }
            }
            Operation::NftTransfer {
                group_id,
                payload,
                owners,
                ..
            } => {
                writer.write_u32(*group_id);
                writer.write_sized_bytes(payload);
                owners.write_to(writer);
            }
        }
    }
}

/// An operation tagged with its asset and the UTXOs it consumes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransferableOperation {
    /// Asset the operation acts on.
    pub asset_id: Id,
    /// UTXOs consumed, kept sorted.
    pub utxo_ids: Vec<UtxoRef>,
    /// The operation itself.
    pub operation: Operation,
}

impl TransferableOperation {
    /// Create an operation, sorting its UTXO references.
    pub fn new(asset_id: Id, mut utxo_ids: Vec<UtxoRef>, operation: Operation) -> Self {
        utxo_ids.sort();
        TransferableOperation {
            asset_id,
            utxo_ids,
            operation,
        }
    }

    /// Deserialize `assetID | n | utxoIDs | typeID | op`.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let asset_id = reader.read_array::<32>()?;
        let count = reader.read_u32()?;
        let mut utxo_ids = Vec::new();
        for _ in 0..count {
            let tx_id = reader.read_array::<32>()?;
            let output_idx = reader.read_u32()?;
            utxo_ids.push(UtxoRef { tx_id, output_idx });
        }
        let operation = Operation::read_from(reader)?;
        Ok(TransferableOperation {
            asset_id,
            utxo_ids,
            operation,
        })
    }

    /// Serialize `assetID | n | utxoIDs | typeID | op`.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.asset_id);
        writer.write_u32(self.utxo_ids.len() as u32);
        for u in &self.utxo_ids {
            writer.write_bytes(&u.tx_id);
            writer.write_u32(u.output_idx);
        }
        self.operation.write_to(writer);
    }

    /// Serialized bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        self.write_to(&mut w);
        w.into_bytes()
    }
}

impl Ord for TransferableOperation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utxo_ids
            .cmp(&other.utxo_ids)
            .then_with(|| self.to_bytes().cmp(&other.to_bytes()))
    }
}

impl PartialOrd for TransferableOperation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
