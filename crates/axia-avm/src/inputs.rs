//! Transaction inputs: SECP transfer inputs and the `TransferableInput`
//! reference to the UTXO being spent.

use std::cmp::Ordering;

use axia_primitives::util::{ByteReader, ByteWriter};

use crate::constants::SECP_XFER_INPUT_ID;
use crate::{Address, AvmError, Id};

/// One required signature: the owner's index in the spent output, plus the
/// owner address used to find the signing key (not serialized).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SigIdx {
    /// Index into the spent output's sorted owner list.
    pub index: u32,
    /// Address expected to sign.
    pub source: Address,
}

pub(crate) fn read_sig_idxs(reader: &mut ByteReader) -> Result<Vec<SigIdx>, AvmError> {
    let count = reader.read_u32()?;
    let mut out = Vec::with_capacity((count as usize).min(reader.remaining() / 4));
    for _ in 0..count {
        out.push(SigIdx {
            index: reader.read_u32()?,
            source: [0u8; 20],
        });
    }
    Ok(out)
}

pub(crate) fn write_sig_idxs(sig_idxs: &[SigIdx], writer: &mut ByteWriter) {
    writer.write_u32(sig_idxs.len() as u32);
    for s in sig_idxs {
        writer.write_u32(s.index);
    }
}

/// Spends a SECP transfer output.
///
/// # Wire format
///
/// | Field    | Size          |
/// |----------|---------------|
/// | amount   | 8 bytes (BE)  |
/// | count    | 4 bytes (BE)  |
/// | sig idxs | 4 bytes each  |
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SecpTransferInput {
    /// Amount of the spent output.
    pub amount: u64,
    /// Signatures required to spend it.
    pub sig_idxs: Vec<SigIdx>,
}

impl SecpTransferInput {
    /// An input with no signature indices yet.
    pub fn new(amount: u64) -> Self {
        SecpTransferInput {
            amount,
            sig_idxs: Vec::new(),
        }
    }

    /// Record that `source`, at `index` in the output, must sign.
    pub fn add_signature_idx(&mut self, index: u32, source: Address) {
        self.sig_idxs.push(SigIdx { index, source });
    }

    /// The wire type ID.
    pub fn type_id(&self) -> u32 {
        SECP_XFER_INPUT_ID
    }
}

/// A reference to a UTXO plus the input that spends it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransferableInput {
    /// ID of the transaction that created the UTXO.
    pub tx_id: Id,
    /// Index of the UTXO within that transaction.
    pub output_idx: u32,
    /// Asset held by the UTXO.
    pub asset_id: Id,
    /// The spend.
    pub input: SecpTransferInput,
}

impl TransferableInput {
    /// Deserialize `txID | outputIdx | assetID | typeID | input`.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let tx_id = reader.read_array::<32>()?;
        let output_idx = reader.read_u32()?;
        let asset_id = reader.read_array::<32>()?;
        let type_id = reader.read_u32()?;
        if type_id != SECP_XFER_INPUT_ID {
            return Err(AvmError::Serialization(format!(
                "TransferableInput.fromBuffer: unknown input type id {}",
                type_id
            )));
        }
        let amount = reader.read_u64()?;
        let sig_idxs = read_sig_idxs(reader)?;
        Ok(TransferableInput {
            tx_id,
            output_idx,
            asset_id,
            input: SecpTransferInput { amount, sig_idxs },
        })
    }

    /// Serialize `txID | outputIdx | assetID | typeID | input`.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.tx_id);
        writer.write_u32(self.output_idx);
        writer.write_bytes(&self.asset_id);
        writer.write_u32(self.input.type_id());
        writer.write_u64(self.input.amount);
        write_sig_idxs(&self.input.sig_idxs, writer);
    }
}

/// Inputs sort by the UTXO they spend: transaction ID, then output index.
impl Ord for TransferableInput {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.tx_id, self.output_idx).cmp(&(other.tx_id, other.output_idx))
    }
}

impl PartialOrd for TransferableInput {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_roundtrip_drops_sources() {
        let mut input = SecpTransferInput::new(590);
        input.add_signature_idx(1, [7u8; 20]);
        let ti = TransferableInput {
            tx_id: [1u8; 32],
            output_idx: 2,
            asset_id: [3u8; 32],
            input,
        };
        let mut w = ByteWriter::new();
        ti.write_to(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 32 + 4 + 32 + 4 + 8 + 4 + 4);

        let parsed = TransferableInput::read_from(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(parsed.input.amount, 590);
        assert_eq!(parsed.input.sig_idxs[0].index, 1);
        assert_eq!(parsed.input.sig_idxs[0].source, [0u8; 20]);
    }

    #[test]
    fn test_input_ordering() {
        let mk = |tx: u8, idx: u32| TransferableInput {
            tx_id: [tx; 32],
            output_idx: idx,
            asset_id: [0u8; 32],
            input: SecpTransferInput::new(1),
        };
        let mut ins = vec![mk(2, 0), mk(1, 5), mk(1, 1)];
        ins.sort();
        assert_eq!(
            ins.iter().map(|i| (i.tx_id[0], i.output_idx)).collect::<Vec<_>>(),
            vec![(1, 1), (1, 5), (2, 0)]
        );
    }
}
