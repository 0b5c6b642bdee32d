//! The fixed payload type table and helpers that inspect encoded payloads.

use std::fmt;

use axia_primitives::util::ByteReader;

use crate::PayloadError;

/// Offset of the type ID byte inside an encoded payload.
const TYPE_ID_OFFSET: usize = 4;

/// The 31 registered payload types, in type ID order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PayloadType {
    /// Arbitrary binary data.
    Bin = 0,
    /// UTF-8 text.
    Utf8,
    /// Bytes displayed as hex.
    HexStr,
    /// Bytes displayed as base-58.
    B58Str,
    /// Bytes displayed as base-64.
    B64Str,
    /// Big-endian unsigned integer.
    BigNum,
    /// X-chain address.
    XChainAddr,
    /// P-chain address.
    PChainAddr,
    /// C-chain address.
    CChainAddr,
    /// Transaction ID (cb58).
    TxId,
    /// Asset ID (cb58).
    AssetId,
    /// UTXO ID (cb58).
    UtxoId,
    /// NFT ID (cb58).
    NftId,
    /// Subnet ID (cb58).
    SubnetId,
    /// Chain ID (cb58).
    ChainId,
    /// Node ID (cb58).
    NodeId,
    /// secp256k1 signature (base-58).
    SecpSig,
    /// secp256k1-encrypted message (base-58).
    SecpEnc,
    /// JPEG image.
    Jpeg,
    /// PNG image.
    Png,
    /// BMP image.
    Bmp,
    /// ICO image.
    Ico,
    /// SVG document.
    Svg,
    /// CSV document.
    Csv,
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
    /// Email address.
    Email,
    /// URL.
    Url,
    /// IPFS content hash (base-58).
    Ipfs,
    /// Onion address.
    Onion,
    /// Magnet link.
    Magnet,
}

/// How a payload type's content is held and displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    /// Raw bytes, returned as-is.
    Binary,
    /// UTF-8 text.
    Text,
    /// Bytes rendered as hex.
    Hex,
    /// Bytes rendered as base-58.
    Base58,
    /// Bytes rendered as base-64.
    Base64,
    /// A big-endian unsigned integer.
    BigNum,
    /// An address rendered as bech32 with the given chain alias.
    ChainAddress(&'static str),
    /// An identifier rendered as cb58.
    Cb58,
}

impl PayloadType {
    /// Every type in ID order.
    pub const ALL: [PayloadType; 31] = [
        PayloadType::Bin,
        PayloadType::Utf8,
        PayloadType::HexStr,
        PayloadType::B58Str,
        PayloadType::B64Str,
        PayloadType::BigNum,
        PayloadType::XChainAddr,
        PayloadType::PChainAddr,
        PayloadType::CChainAddr,
        PayloadType::TxId,
        PayloadType::AssetId,
        PayloadType::UtxoId,
        PayloadType::NftId,
        PayloadType::SubnetId,
        PayloadType::ChainId,
        PayloadType::NodeId,
        PayloadType::SecpSig,
        PayloadType::SecpEnc,
        PayloadType::Jpeg,
        PayloadType::Png,
        PayloadType::Bmp,
        PayloadType::Ico,
        PayloadType::Svg,
        PayloadType::Csv,
        PayloadType::Json,
        PayloadType::Yaml,
        PayloadType::Email,
        PayloadType::Url,
        PayloadType::Ipfs,
        PayloadType::Onion,
        PayloadType::Magnet,
    ];

    /// The numeric type ID.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Resolve a numeric type ID.
    ///
    /// # Returns
    /// The type, or `PayloadError::TypeId` for IDs outside the table.
    pub fn from_id(id: u8) -> Result<Self, PayloadError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or_else(|| PayloadError::TypeId(format!("PayloadTypes.select: unknown typeid {}", id)))
    }

    /// The table name, e.g. `"BIGNUM"`.
    pub fn name(self) -> &'static str {
        match self {
            PayloadType::Bin => "BIN",
            PayloadType::Utf8 => "UTF8",
            PayloadType::HexStr => "HEXSTR",
            PayloadType::B58Str => "B58STR",
            PayloadType::B64Str => "B64STR",
            PayloadType::BigNum => "BIGNUM",
            PayloadType::XChainAddr => "XCHAINADDR",
            PayloadType::PChainAddr => "PCHAINADDR",
            PayloadType::CChainAddr => "CCHAINADDR",
            PayloadType::TxId => "TXID",
            PayloadType::AssetId => "ASSETID",
            PayloadType::UtxoId => "UTXOID",
            PayloadType::NftId => "NFTID",
            PayloadType::SubnetId => "SUBNETID",
            PayloadType::ChainId => "CHAINID",
            PayloadType::NodeId => "NODEID",
            PayloadType::SecpSig => "SECPSIG",
            PayloadType::SecpEnc => "SECPENC",
            PayloadType::Jpeg => "JPEG",
            PayloadType::Png => "PNG",
            PayloadType::Bmp => "BMP",
            PayloadType::Ico => "ICO",
            PayloadType::Svg => "SVG",
            PayloadType::Csv => "CSV",
            PayloadType::Json => "JSON",
            PayloadType::Yaml => "YAML",
            PayloadType::Email => "EMAIL",
            PayloadType::Url => "URL",
            PayloadType::Ipfs => "IPFS",
            PayloadType::Onion => "ONION",
            PayloadType::Magnet => "MAGNET",
        }
    }

    /// How content of this type is held and displayed.
    pub fn content_kind(self) -> ContentKind {
        match self {
            PayloadType::Bin
            | PayloadType::Jpeg
            | PayloadType::Png
            | PayloadType::Bmp
            | PayloadType::Ico => ContentKind::Binary,
            PayloadType::Utf8
            | PayloadType::Svg
            | PayloadType::Csv
            | PayloadType::Json
            | PayloadType::Yaml
            | PayloadType::Email
            | PayloadType::Url
            | PayloadType::Onion
            | PayloadType::Magnet => ContentKind::Text,
            PayloadType::HexStr => ContentKind::Hex,
            PayloadType::B58Str | PayloadType::SecpSig | PayloadType::SecpEnc | PayloadType::Ipfs => {
                ContentKind::Base58
            }
            PayloadType::B64Str => ContentKind::Base64,
            PayloadType::BigNum => ContentKind::BigNum,
            PayloadType::XChainAddr => ContentKind::ChainAddress("X"),
            PayloadType::PChainAddr => ContentKind::ChainAddress("P"),
            PayloadType::CChainAddr => ContentKind::ChainAddress("C"),
            PayloadType::TxId
            | PayloadType::AssetId
            | PayloadType::UtxoId
            | PayloadType::NftId
            | PayloadType::SubnetId
            | PayloadType::ChainId
            | PayloadType::NodeId => ContentKind::Cb58,
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up a type ID by table name.
pub fn lookup_id(name: &str) -> Option<u8> {
    PayloadType::ALL.iter().find(|t| t.name() == name).map(|t| t.id())
}

/// Look up a table name by type ID.
pub fn lookup_type(id: u8) -> Option<&'static str> {
    PayloadType::from_id(id).ok().map(PayloadType::name)
}

/// Read the type ID of an encoded payload (byte 4).
pub fn get_type_id(encoded: &[u8]) -> Result<u8, PayloadError> {
    Ok(ByteReader::with_offset(encoded, TYPE_ID_OFFSET).read_u8()?)
}

/// The content of an encoded payload, without length or type ID.
pub fn get_content(encoded: &[u8]) -> Result<Vec<u8>, PayloadError> {
    let mut reader = ByteReader::new(encoded);
    let len = reader.read_u32()? as usize;
    reader.read_u8()?;
    Ok(reader.read_bytes(len.saturating_sub(1))?.to_vec())
}

/// The type ID plus content of an encoded payload, without the length.
pub fn get_payload(encoded: &[u8]) -> Result<Vec<u8>, PayloadError> {
    let mut reader = ByteReader::new(encoded);
    let len = reader.read_u32()? as usize;
    Ok(reader.read_bytes(len)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order() {
        for (i, t) in PayloadType::ALL.iter().enumerate() {
            assert_eq!(t.id() as usize, i);
            assert_eq!(PayloadType::from_id(i as u8).unwrap(), *t);
        }
        assert_eq!(PayloadType::Magnet.id(), 30);
        assert_eq!(PayloadType::Json.id(), 24);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup_id("BIGNUM"), Some(5));
        assert_eq!(lookup_id("NOPE"), None);
        assert_eq!(lookup_type(9), Some("TXID"));
        assert_eq!(lookup_type(31), None);
    }

    #[test]
    fn test_unknown_type_id() {
        let err = PayloadType::from_id(42).unwrap_err();
        assert!(matches!(err, PayloadError::TypeId(_)));
        assert_eq!(err.to_string(), "PayloadTypes.select: unknown typeid 42");
    }

    #[test]
    fn test_inspect_encoded() {
        let encoded = [0, 0, 0, 3, 1, b'h', b'i', 0xff];
        assert_eq!(get_type_id(&encoded).unwrap(), 1);
        assert_eq!(get_content(&encoded).unwrap(), b"hi");
        assert_eq!(get_payload(&encoded).unwrap(), vec![1, b'h', b'i']);
        assert!(get_type_id(&encoded[..4]).is_err());
    }
}
