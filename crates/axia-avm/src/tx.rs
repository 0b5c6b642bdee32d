//! Transaction bodies: the base transfer and the four specialized kinds
//! that extend it.

use std::collections::BTreeMap;

use axia_primitives::util::{ByteReader, ByteWriter};

use crate::constants::{BASE_TX_ID, CREATE_ASSET_TX_ID, EXPORT_TX_ID, IMPORT_TX_ID, OPERATION_TX_ID};
use crate::inputs::TransferableInput;
use crate::operations::TransferableOperation;
use crate::outputs::{Output, TransferableOutput};
use crate::{AvmError, Id};

fn read_outputs(reader: &mut ByteReader) -> Result<Vec<TransferableOutput>, AvmError> {
    let count = reader.read_u32()?;
    let mut outs = Vec::new();
    for _ in 0..count {
        outs.push(TransferableOutput::read_from(reader)?);
    }
    Ok(outs)
}

fn write_outputs(outs: &[TransferableOutput], writer: &mut ByteWriter) {
    writer.write_u32(outs.len() as u32);
    for o in outs {
        o.write_to(writer);
    }
}

fn read_inputs(reader: &mut ByteReader) -> Result<Vec<TransferableInput>, AvmError> {
    let count = reader.read_u32()?;
    let mut ins = Vec::new();
    for _ in 0..count {
        ins.push(TransferableInput::read_from(reader)?);
    }
    Ok(ins)
}

fn write_inputs(ins: &[TransferableInput], writer: &mut ByteWriter) {
    writer.write_u32(ins.len() as u32);
    for i in ins {
        i.write_to(writer);
    }
}

// Clamped at u16::MAX bytes; builders cap names at 128 and symbols at 4.
fn write_short_string(s: &str, writer: &mut ByteWriter) {
    let len = u16::try_from(s.len()).unwrap_or(u16::MAX);
    writer.write_u16(len);
    writer.write_bytes(&s.as_bytes()[..usize::from(len)]);
}

fn read_short_string(reader: &mut ByteReader, field: &str) -> Result<String, AvmError> {
    let len = reader.read_u16()? as usize;
    let bytes = reader.read_bytes(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        AvmError::Serialization(format!("CreateAssetTx.fromBuffer: {} is not utf8: {}", field, e))
    })
}

// ---------------------------------------------------------------------------
// BaseTx
// ---------------------------------------------------------------------------

/// A plain transfer: the fields every transaction kind starts with.
///
/// # Wire format
///
/// | Field         | Size                   |
/// |---------------|------------------------|
/// | network ID    | 4 bytes (BE)           |
/// | blockchain ID | 32 bytes               |
/// | outputs       | u32 count + outputs    |
/// | inputs        | u32 count + inputs     |
/// | memo          | u32 length + bytes     |
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BaseTx {
    /// Network the transaction is valid on.
    pub network_id: u32,
    /// Chain the transaction is issued to.
    pub blockchain_id: Id,
    /// Outputs, sorted by serialized bytes.
    pub outs: Vec<TransferableOutput>,
    /// Inputs, sorted by spent UTXO.
    pub ins: Vec<TransferableInput>,
    /// Arbitrary memo bytes.
    pub memo: Vec<u8>,
}

impl BaseTx {
    /// Create a base transaction with canonically ordered inputs and outputs.
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        mut outs: Vec<TransferableOutput>,
        mut ins: Vec<TransferableInput>,
        memo: Vec<u8>,
    ) -> Self {
        outs.sort();
        ins.sort();
        BaseTx {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        }
    }

    /// Deserialize the base fields.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let network_id = reader.read_u32()?;
        let blockchain_id = reader.read_array::<32>()?;
        let outs = read_outputs(reader)?;
        let ins = read_inputs(reader)?;
        let memo = reader.read_sized_bytes()?.to_vec();
        Ok(BaseTx {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        })
    }

    /// Serialize the base fields.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.network_id);
        writer.write_bytes(&self.blockchain_id);
        write_outputs(&self.outs, writer);
        write_inputs(&self.ins, writer);
        writer.write_sized_bytes(&self.memo);
    }
}

// ---------------------------------------------------------------------------
// CreateAssetTx
// ---------------------------------------------------------------------------

/// Genesis outputs of a new asset, grouped by feature extension ID.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct InitialStates {
    states: BTreeMap<u32, Vec<Output>>,
}

impl InitialStates {
    /// No outputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output under feature extension `fx_id`.
    pub fn add_output(&mut self, fx_id: u32, output: Output) {
        self.states.entry(fx_id).or_default().push(output);
    }

    /// Outputs per feature extension, in fx ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&u32, &Vec<Output>)> {
        self.states.iter()
    }

    /// True if no outputs were added.
    pub fn is_empty(&self) -> bool {
        self.states.values().all(Vec::is_empty)
    }

    /// Deserialize `n | (fxID | m | outputs)`.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let mut states = InitialStates::new();
        let count = reader.read_u32()?;
        for _ in 0..count {
            let fx_id = reader.read_u32()?;
            let n = reader.read_u32()?;
            for _ in 0..n {
                states.add_output(fx_id, Output::read_from(reader)?);
            }
        }
        Ok(states)
    }

    /// Serialize with outputs sorted by their bytes within each fx ID.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.states.len() as u32);
        for (fx_id, outputs) in &self.states {
            let mut encoded: Vec<Vec<u8>> = outputs.iter().map(Output::to_bytes).collect();
            encoded.sort();
            writer.write_u32(*fx_id);
            writer.write_u32(encoded.len() as u32);
            for e in encoded {
                writer.write_bytes(&e);
            }
        }
    }
}

/// Creates a new asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateAssetTx {
    /// Fee inputs and change.
    pub base: BaseTx,
    /// Asset name, at most 128 bytes.
    pub name: String,
    /// Asset symbol, at most 4 bytes.
    pub symbol: String,
    /// Number of decimal places.
    pub denomination: u8,
    /// Genesis outputs.
    pub initial_states: InitialStates,
}

// ---------------------------------------------------------------------------
// OperationTx / ImportTx / ExportTx
// ---------------------------------------------------------------------------

/// Spends mint rights or NFTs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationTx {
    /// Fee inputs and change.
    pub base: BaseTx,
    /// Operations, sorted.
    pub ops: Vec<TransferableOperation>,
}

/// Imports atomic UTXOs exported from another chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportTx {
    /// Local fee inputs, outputs and change.
    pub base: BaseTx,
    /// Chain the UTXOs were exported from.
    pub source_chain: Id,
    /// Inputs spending the atomic UTXOs, sorted.
    pub import_ins: Vec<TransferableInput>,
}

/// Exports outputs to another chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportTx {
    /// Local inputs and change.
    pub base: BaseTx,
    /// Chain receiving the exported outputs.
    pub destination_chain: Id,
    /// Outputs placed in shared memory for the destination chain, sorted.
    pub export_outs: Vec<TransferableOutput>,
}

// ---------------------------------------------------------------------------
// TxBody
// ---------------------------------------------------------------------------

/// One of the five transaction kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxBody {
    /// Type 0.
    Base(BaseTx),
    /// Type 1.
    CreateAsset(CreateAssetTx),
    /// Type 2.
    Operation(OperationTx),
    /// Type 3.
    Import(ImportTx),
    /// Type 4.
    Export(ExportTx),
}

impl TxBody {
    /// The wire type ID.
    pub fn type_id(&self) -> u32 {
        match self {
            TxBody::Base(_) => BASE_TX_ID,
            TxBody::CreateAsset(_) => CREATE_ASSET_TX_ID,
            TxBody::Operation(_) => OPERATION_TX_ID,
            TxBody::Import(_) => IMPORT_TX_ID,
            TxBody::Export(_) => EXPORT_TX_ID,
        }
    }

    /// The shared base fields.
    pub fn base(&self) -> &BaseTx {
        match self {
            TxBody::Base(b) => b,
            TxBody::CreateAsset(t) => &t.base,
            TxBody::Operation(t) => &t.base,
            TxBody::Import(t) => &t.base,
            TxBody::Export(t) => &t.base,
        }
    }

    /// All inputs, including imported ones.
    pub fn total_ins(&self) -> Vec<&TransferableInput> {
        let mut ins: Vec<&TransferableInput> = self.base().ins.iter().collect();
        if let TxBody::Import(t) = self {
            ins.extend(t.import_ins.iter());
        }
        ins
    }

    /// All outputs, including exported ones.
    pub fn total_outs(&self) -> Vec<&TransferableOutput> {
        let mut outs: Vec<&TransferableOutput> = self.base().outs.iter().collect();
        if let TxBody::Export(t) = self {
            outs.extend(t.export_outs.iter());
        }
        outs
    }

    /// Deserialize a body whose type ID was already read.
    pub fn read_body(reader: &mut ByteReader, type_id: u32) -> Result<Self, AvmError> {
        let base = BaseTx::read_from(reader)?;
        let body = match type_id {
            BASE_TX_ID => TxBody::Base(base),
            CREATE_ASSET_TX_ID => {
                let name = read_short_string(reader, "name")?;
                let symbol = read_short_string(reader, "symbol")?;
                let denomination = reader.read_u8()?;
                let initial_states = InitialStates::read_from(reader)?;
                TxBody::CreateAsset(CreateAssetTx {
                    base,
                    name,
                    symbol,
                    denomination,
                    initial_states,
                })
            }
            OPERATION_TX_ID => {
                let count = reader.read_u32()?;
                let mut ops = Vec::new();
                for _ in 0..count {
                    ops.push(TransferableOperation::read_from(reader)?);
                }
                TxBody::Operation(OperationTx { base, ops })
            }
            IMPORT_TX_ID => {
                let source_chain = reader.read_array::<32>()?;
                let import_ins = read_inputs(reader)?;
                TxBody::Import(ImportTx {
                    base,
                    source_chain,
                    import_ins,
                })
            }
            EXPORT_TX_ID => {
                let destination_chain = reader.read_array::<32>()?;
                let export_outs = read_outputs(reader)?;
                TxBody::Export(ExportTx {
                    base,
                    destination_chain,
                    export_outs,
                })
            }
            other => {
                return Err(AvmError::Serialization(format!(
                    "UnsignedTx.fromBuffer: unknown transaction type id {}",
                    other
                )))
            }
        };
        Ok(body)
    }

    /// Serialize the body without its type ID.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        self.base().write_to(writer);
        match self {
            TxBody::Base(_) => {}
            TxBody::CreateAsset(t) => {
                write_short_string(&t.name, writer);
                write_short_string(&t.symbol, writer);
                writer.write_u8(t.denomination);
                t.initial_states.write_to(writer);
            }
            TxBody::Operation(t) => {
                writer.write_u32(t.ops.len() as u32);
                for op in &t.ops {
                    op.write_to(writer);
                }
            }
            TxBody::Import(t) => {
                writer.write_bytes(&t.source_chain);
                write_inputs(&t.import_ins, writer);
            }
            TxBody::Export(t) => {
                writer.write_bytes(&t.destination_chain);
                write_outputs(&t.export_outs, writer);
            }
        }
    }
}
