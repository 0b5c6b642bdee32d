//! Unsigned and signed AVM transactions.
//!
//! An `UnsignedTx` is the codec version plus a typed body; its SHA-256 is
//! the message every credential signs. A `Tx` appends one credential per
//! input and per operation, in that order.

use axia_primitives::bintools::{cb58_decode, cb58_encode};
use axia_primitives::hash::sha256;
use axia_primitives::util::{ByteReader, ByteWriter};

use crate::constants::LATEST_CODEC;
use crate::credentials::{Credential, CredentialKind};
use crate::inputs::SigIdx;
use crate::keychain::KeyChain;
use crate::tx::TxBody;
use crate::{AvmError, Id};

/// A transaction body awaiting signatures.
///
/// # Wire format
///
/// | Field    | Size          |
/// |----------|---------------|
/// | codec ID | 2 bytes (BE)  |
/// | type ID  | 4 bytes (BE)  |
/// | body     | variable      |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTx {
    /// Codec version; always 0 today.
    pub codec_id: u16,
    /// The typed body.
    pub body: TxBody,
}

impl UnsignedTx {
    /// Wrap a body with the latest codec.
    pub fn new(body: TxBody) -> Self {
        UnsignedTx {
            codec_id: LATEST_CODEC,
            body,
        }
    }

    /// The body's type ID.
    pub fn type_id(&self) -> u32 {
        self.body.type_id()
    }

    /// Deserialize from a reader.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let codec_id = reader.read_u16()?;
        let type_id = reader.read_u32()?;
        let body = TxBody::read_body(reader, type_id)?;
        Ok(UnsignedTx { codec_id, body })
    }

    /// Parse bytes holding exactly one unsigned transaction.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AvmError> {
        let mut reader = ByteReader::new(bytes);
        let utx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(AvmError::Serialization(format!(
                "UnsignedTx.fromBuffer: trailing {} bytes",
                reader.remaining()
            )));
        }
        Ok(utx)
    }

    /// Serialize into a writer.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u16(self.codec_id);
        writer.write_u32(self.type_id());
        self.body.write_to(writer);
    }

    /// Serialized bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(256);
        self.write_to(&mut w);
        w.into_bytes()
    }

    /// Sum of input amounts for `asset_id`, imported inputs included.
    pub fn input_total(&self, asset_id: &Id) -> u64 {
        self.body
            .total_ins()
            .iter()
            .filter(|i| &i.asset_id == asset_id)
            .fold(0u64, |acc, i| acc.saturating_add(i.input.amount))
    }

    /// Sum of SECP transfer output amounts for `asset_id`, exported outputs included.
    pub fn output_total(&self, asset_id: &Id) -> u64 {
        self.body
            .total_outs()
            .iter()
            .filter(|o| &o.asset_id == asset_id)
            .filter_map(|o| o.output.amount())
            .fold(0u64, u64::saturating_add)
    }

    /// Amount of `asset_id` consumed but not re-output: the fee.
    pub fn burn(&self, asset_id: &Id) -> u64 {
        self.input_total(asset_id).saturating_sub(self.output_total(asset_id))
    }

    /// Sign with `keychain`, producing one credential per input then one
    /// per operation.
    ///
    /// Each signature index names the address whose key must sign; a
    /// missing key fails the whole signing.
    pub fn sign(&self, keychain: &KeyChain) -> Result<Tx, AvmError> {
        let digest = sha256(&self.to_bytes());
        let mut credentials = Vec::new();

        for input in self.body.total_ins() {
            credentials.push(sign_credential(
                CredentialKind::Secp,
                &input.input.sig_idxs,
                &digest,
                keychain,
            )?);
        }
        if let TxBody::Operation(op_tx) = &self.body {
            for op in &op_tx.ops {
                credentials.push(sign_credential(
                    op.operation.credential_kind(),
                    op.operation.sig_idxs(),
                    &digest,
                    keychain,
                )?);
            }
        }

        tracing::debug!(
            type_id = self.type_id(),
            credentials = credentials.len(),
            "signed transaction"
        );
        Ok(Tx {
            unsigned: self.clone(),
            credentials,
        })
    }
}

fn sign_credential(
    kind: CredentialKind,
    sig_idxs: &[SigIdx],
    digest: &[u8; 32],
    keychain: &KeyChain,
) -> Result<Credential, AvmError> {
    let mut cred = Credential::new(kind);
    for sig_idx in sig_idxs {
        let Some(kp) = keychain.get_key(&sig_idx.source) else {
            return Err(AvmError::Signing(format!(
                "UnsignedTx.sign: no key for address {}",
                hex::encode(sig_idx.source)
            )));
        };
        cred.signatures.push(kp.sign(digest)?);
    }
    Ok(cred)
}

// ---------------------------------------------------------------------------
// Tx
// ---------------------------------------------------------------------------

/// A signed transaction, ready to issue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    /// The signed body.
    pub unsigned: UnsignedTx,
    /// One credential per input, then per operation.
    pub credentials: Vec<Credential>,
}

impl Tx {
    /// Parse bytes holding exactly one signed transaction.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AvmError> {
        let mut reader = ByteReader::new(bytes);
        let unsigned = UnsignedTx::read_from(&mut reader)?;
        let count = reader.read_u32()?;
        let mut credentials = Vec::new();
        for _ in 0..count {
            credentials.push(Credential::read_from(&mut reader)?);
        }
        if reader.remaining() != 0 {
            return Err(AvmError::Serialization(format!(
                "Tx.fromBuffer: trailing {} bytes",
                reader.remaining()
            )));
        }
        Ok(Tx {
            unsigned,
            credentials,
        })
    }

    /// Parse the cb58 form.
    pub fn from_cb58(s: &str) -> Result<Self, AvmError> {
        Self::from_bytes(&cb58_decode(s)?)
    }

    /// Serialized bytes: unsigned bytes followed by the credentials.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(512);
        self.unsigned.write_to(&mut w);
        w.write_u32(self.credentials.len() as u32);
        for c in &self.credentials {
            c.write_to(&mut w);
        }
        w.into_bytes()
    }

    /// cb58 of the serialized bytes.
    pub fn to_cb58(&self) -> String {
        cb58_encode(&self.to_bytes())
    }

    /// Transaction ID: cb58 of SHA-256 over the signed bytes.
    pub fn id(&self) -> String {
        cb58_encode(&sha256(&self.to_bytes()))
    }
}

impl std::fmt::Display for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_cb58())
    }
}

impl std::str::FromStr for Tx {
    type Err = AvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_cb58(s)
    }
}
