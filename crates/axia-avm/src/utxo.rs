//! A single unspent output and its string forms.

use std::fmt;
use std::str::FromStr;

use axia_primitives::bintools::{buffer_to_b58, cb58_decode, cb58_encode};
use axia_primitives::util::{ByteReader, ByteWriter};

use crate::constants::LATEST_CODEC;
use crate::operations::UtxoRef;
use crate::outputs::Output;
use crate::{AvmError, Id};

/// An unspent transaction output.
///
/// # Wire format
///
/// | Field        | Size          |
/// |--------------|---------------|
/// | codec ID     | 2 bytes (BE)  |
/// | tx ID        | 32 bytes      |
/// | output index | 4 bytes (BE)  |
/// | asset ID     | 32 bytes      |
/// | type ID      | 4 bytes (BE)  |
/// | output       | variable      |
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Utxo {
    /// Codec version.
    pub codec_id: u16,
    /// Creating transaction.
    pub tx_id: Id,
    /// Index within the creating transaction.
    pub output_idx: u32,
    /// Asset held.
    pub asset_id: Id,
    /// The output.
    pub output: Output,
}

impl Utxo {
    /// A UTXO with the latest codec.
    pub fn new(tx_id: Id, output_idx: u32, asset_id: Id, output: Output) -> Self {
        Utxo {
            codec_id: LATEST_CODEC,
            tx_id,
            output_idx,
            asset_id,
            output,
        }
    }

    /// The UTXO ID: base-58 of `txID ‖ u32be(outputIdx)`.
    pub fn id(&self) -> String {
        let mut buf = Vec::with_capacity(36);
        buf.extend_from_slice(&self.tx_id);
        buf.extend_from_slice(&self.output_idx.to_be_bytes());
        buffer_to_b58(&buf)
    }

    /// The `(txID, outputIdx)` reference an input or operation spends.
    pub fn utxo_ref(&self) -> UtxoRef {
        UtxoRef {
            tx_id: self.tx_id,
            output_idx: self.output_idx,
        }
    }

    /// Parse bytes holding exactly one UTXO.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AvmError> {
        let mut reader = ByteReader::new(bytes);
        let codec_id = reader.read_u16()?;
        let tx_id = reader.read_array::<32>()?;
        let output_idx = reader.read_u32()?;
        let asset_id = reader.read_array::<32>()?;
        let output = Output::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(AvmError::Serialization(format!(
                "UTXO.fromBuffer: trailing {} bytes",
                reader.remaining()
            )));
        }
        Ok(Utxo {
            codec_id,
            tx_id,
            output_idx,
            asset_id,
            output,
        })
    }

    /// Serialized bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(128);
        w.write_u16(self.codec_id);
        w.write_bytes(&self.tx_id);
        w.write_u32(self.output_idx);
        w.write_bytes(&self.asset_id);
        self.output.write_to(&mut w);
        w.into_bytes()
    }
}

impl fmt::Display for Utxo {
    /// cb58 of the serialized bytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cb58_encode(&self.to_bytes()))
    }
}

impl FromStr for Utxo {
    type Err = AvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(&cb58_decode(s)?)
    }
}
