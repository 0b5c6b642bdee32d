//! Credentials: the signatures that authorize an input or operation.

use axia_primitives::ec::signature::{RecoverableSignature, SIGNATURE_LEN};
use axia_primitives::util::{ByteReader, ByteWriter};

use crate::constants::{NFT_CREDENTIAL_ID, SECP_CREDENTIAL_ID};
use crate::AvmError;

/// Which feature extension a credential belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Signs SECP inputs and SECP mint operations (type 9).
    Secp,
    /// Signs NFT operations (type 14).
    Nft,
}

impl CredentialKind {
    /// The wire type ID.
    pub fn type_id(self) -> u32 {
        match self {
            CredentialKind::Secp => SECP_CREDENTIAL_ID,
            CredentialKind::Nft => NFT_CREDENTIAL_ID,
        }
    }
}

/// Signatures for one input or operation, in sig-index order.
///
/// # Wire format
///
/// | Field      | Size          |
/// |------------|---------------|
/// | type ID    | 4 bytes (BE)  |
/// | count      | 4 bytes (BE)  |
/// | signatures | 65 bytes each |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    /// The credential kind.
    pub kind: CredentialKind,
    /// Signatures, one per sig index.
    pub signatures: Vec<RecoverableSignature>,
}

impl Credential {
    /// An empty credential of the given kind.
    pub fn new(kind: CredentialKind) -> Self {
        Credential {
            kind,
            signatures: Vec::new(),
        }
    }

    /// Deserialize a type ID, count and signatures.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, AvmError> {
        let kind = match reader.read_u32()? {
            SECP_CREDENTIAL_ID => CredentialKind::Secp,
            NFT_CREDENTIAL_ID => CredentialKind::Nft,
            other => {
                return Err(AvmError::Serialization(format!(
                    "Credential.fromBuffer: unknown credential type id {}",
                    other
                )))
            }
        };
        let count = reader.read_u32()?;
        let mut signatures = Vec::new();
        for _ in 0..count {
            signatures.push(RecoverableSignature::from_bytes(reader.read_bytes(SIGNATURE_LEN)?)?);
        }
        Ok(Credential { kind, signatures })
    }

    /// Serialize the type ID, count and signatures.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.kind.type_id());
        writer.write_u32(self.signatures.len() as u32);
        for s in &self.signatures {
            writer.write_bytes(&s.to_bytes());
        }
    }
}
