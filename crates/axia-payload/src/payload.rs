//! Typed payload values and their wire encoding.

use base64::Engine;
use num_bigint::BigUint;

use axia_primitives::bintools::{
    address_to_string, b58_to_buffer, buffer_to_b58, cb58_decode, cb58_encode, from_bn_to_buffer,
    from_buffer_to_bn, string_to_address,
};
use axia_primitives::util::{ByteReader, ByteWriter};

use crate::types::{ContentKind, PayloadType};
use crate::PayloadError;

/// The natural in-memory form of a payload's content.
///
/// Returned by [`Payload::return_type`] and accepted by [`Payload::select`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadValue {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A string: UTF-8 text or an encoded rendering (hex, base-58, cb58, bech32).
    Text(String),
    /// An unsigned integer.
    BigNum(BigUint),
}

/// A payload with its type-specific content.
///
/// Every variant holds the raw wire content so that decoding and re-encoding
/// reproduces the input bytes. Text variants are validated as UTF-8 only
/// when read back through [`Payload::return_type`] or [`Payload::json_value`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Arbitrary binary data.
    Bin(Vec<u8>),
    /// UTF-8 text.
    Utf8(Vec<u8>),
    /// Bytes displayed as hex.
    HexStr(Vec<u8>),
    /// Bytes displayed as base-58.
    B58Str(Vec<u8>),
    /// Bytes displayed as base-64.
    B64Str(Vec<u8>),
    /// Unsigned integer, big-endian. Leading zero bytes on the wire are kept.
    BigNum(Vec<u8>),
    /// X-chain address bytes.
    XChainAddr(Vec<u8>),
    /// P-chain address bytes.
    PChainAddr(Vec<u8>),
    /// C-chain address bytes.
    CChainAddr(Vec<u8>),
    /// Transaction ID bytes.
    TxId(Vec<u8>),
    /// Asset ID bytes.
    AssetId(Vec<u8>),
    /// UTXO ID bytes.
    UtxoId(Vec<u8>),
    /// NFT ID bytes.
    NftId(Vec<u8>),
    /// Subnet ID bytes.
    SubnetId(Vec<u8>),
    /// Chain ID bytes.
    ChainId(Vec<u8>),
    /// Node ID bytes.
    NodeId(Vec<u8>),
    /// secp256k1 signature bytes.
    SecpSig(Vec<u8>),
    /// secp256k1-encrypted message bytes.
    SecpEnc(Vec<u8>),
    /// JPEG image bytes.
    Jpeg(Vec<u8>),
    /// PNG image bytes.
    Png(Vec<u8>),
    /// BMP image bytes.
    Bmp(Vec<u8>),
    /// ICO image bytes.
    Ico(Vec<u8>),
    /// SVG document.
    Svg(Vec<u8>),
    /// CSV document.
    Csv(Vec<u8>),
    /// JSON document, kept as its exact text.
    Json(Vec<u8>),
    /// YAML document.
    Yaml(Vec<u8>),
    /// Email address.
    Email(Vec<u8>),
    /// URL.
    Url(Vec<u8>),
    /// IPFS content hash bytes.
    Ipfs(Vec<u8>),
    /// Onion address.
    Onion(Vec<u8>),
    /// Magnet link.
    Magnet(Vec<u8>),
}

fn utf8(content: &[u8]) -> Result<String, PayloadError> {
    String::from_utf8(content.to_vec())
        .map_err(|e| PayloadError::Content(format!("Payload: content is not valid utf8: {}", e)))
}

impl Payload {
    /// Build a payload of type `ty` from its raw wire content.
    pub fn from_content(ty: PayloadType, content: Vec<u8>) -> Self {
        match ty {
            PayloadType::Bin => Payload::Bin(content),
            PayloadType::Utf8 => Payload::Utf8(content),
            PayloadType::HexStr => Payload::HexStr(content),
            PayloadType::B58Str => Payload::B58Str(content),
            PayloadType::B64Str => Payload::B64Str(content),
            PayloadType::BigNum => Payload::BigNum(content),
            PayloadType::XChainAddr => Payload::XChainAddr(content),
            PayloadType::PChainAddr => Payload::PChainAddr(content),
            PayloadType::CChainAddr => Payload::CChainAddr(content),
            PayloadType::TxId => Payload::TxId(content),
            PayloadType::AssetId => Payload::AssetId(content),
            PayloadType::UtxoId => Payload::UtxoId(content),
            PayloadType::NftId => Payload::NftId(content),
            PayloadType::SubnetId => Payload::SubnetId(content),
            PayloadType::ChainId => Payload::ChainId(content),
            PayloadType::NodeId => Payload::NodeId(content),
            PayloadType::SecpSig => Payload::SecpSig(content),
            PayloadType::SecpEnc => Payload::SecpEnc(content),
            PayloadType::Jpeg => Payload::Jpeg(content),
            PayloadType::Png => Payload::Png(content),
            PayloadType::Bmp => Payload::Bmp(content),
            PayloadType::Ico => Payload::Ico(content),
            PayloadType::Svg => Payload::Svg(content),
            PayloadType::Csv => Payload::Csv(content),
            PayloadType::Json => Payload::Json(content),
            PayloadType::Yaml => Payload::Yaml(content),
            PayloadType::Email => Payload::Email(content),
            PayloadType::Url => Payload::Url(content),
            PayloadType::Ipfs => Payload::Ipfs(content),
            PayloadType::Onion => Payload::Onion(content),
            PayloadType::Magnet => Payload::Magnet(content),
        }
    }

    /// Construct a payload for `type_id` from a natural value.
    ///
    /// Text is parsed according to the type's display encoding: hex for
    /// `HEXSTR` (no `0x` prefix) and `BIGNUM`, base-58 for `B58STR`-like
    /// types, base-64 for `B64STR`, bech32 for chain addresses (HRPs in the
    /// known set or equal to `hrp`) and cb58 for IDs. Bytes are taken as the
    /// raw content for every type.
    ///
    /// # Returns
    /// The payload, or `TypeId` for an unregistered type ID, `Hex` for a
    /// malformed hex string, `Content` when the value cannot be held.
    pub fn select(type_id: u8, value: PayloadValue, hrp: &str) -> Result<Self, PayloadError> {
        let ty = PayloadType::from_id(type_id)?;
        let content = match (ty.content_kind(), value) {
            (ContentKind::BigNum, PayloadValue::BigNum(n)) => from_bn_to_buffer(&n, None),
            (_, PayloadValue::BigNum(_)) => {
                return Err(PayloadError::Content(format!(
                    "{}Payload: cannot hold a number",
                    ty.name()
                )))
            }
            (_, PayloadValue::Bytes(b)) => b,
            (ContentKind::Binary, PayloadValue::Text(_)) => {
                return Err(PayloadError::Content(format!(
                    "{}Payload: expected bytes, got text",
                    ty.name()
                )))
            }
            (ContentKind::Text, PayloadValue::Text(s)) => s.into_bytes(),
            (ContentKind::Hex, PayloadValue::Text(s)) => {
                if s.starts_with("0x") {
                    return Err(PayloadError::Hex(
                        "HEXSTRPayload: hex string cannot start with 0x".to_string(),
                    ));
                }
                hex::decode(&s).map_err(|e| {
                    PayloadError::Hex(format!("HEXSTRPayload: invalid hex string: {}", e))
                })?
            }
            (ContentKind::BigNum, PayloadValue::Text(s)) => {
                let n = BigUint::parse_bytes(s.as_bytes(), 16).ok_or_else(|| {
                    PayloadError::Hex("BIGNUMPayload: invalid hex string".to_string())
                })?;
                from_bn_to_buffer(&n, None)
            }
            (ContentKind::Base58, PayloadValue::Text(s)) => b58_to_buffer(&s)?,
            (ContentKind::Base64, PayloadValue::Text(s)) => {
                base64::engine::general_purpose::STANDARD
                    .decode(&s)
                    .map_err(|e| PayloadError::Content(format!("B64STRPayload: {}", e)))?
            }
            (ContentKind::ChainAddress(_), PayloadValue::Text(s)) => {
                string_to_address(&s, Some(hrp))?
            }
            (ContentKind::Cb58, PayloadValue::Text(s)) => cb58_decode(&s)?,
        };
        Ok(Self::from_content(ty, content))
    }

    /// Convert a JSON value to a `JSON` payload.
    pub fn json(value: &serde_json::Value) -> Self {
        Payload::Json(value.to_string().into_bytes())
    }

    /// Parse the content of a `JSON` payload.
    pub fn json_value(&self) -> Result<serde_json::Value, PayloadError> {
        match self {
            Payload::Json(text) => serde_json::from_slice(text)
                .map_err(|e| PayloadError::Content(format!("JSONPayload: {}", e))),
            other => Err(PayloadError::Content(format!(
                "{}Payload: not a JSON payload",
                other.payload_type().name()
            ))),
        }
    }

    /// The payload's type.
    pub fn payload_type(&self) -> PayloadType {
        match self {
            Payload::Bin(_) => PayloadType::Bin,
            Payload::Utf8(_) => PayloadType::Utf8,
            Payload::HexStr(_) => PayloadType::HexStr,
            Payload::B58Str(_) => PayloadType::B58Str,
            Payload::B64Str(_) => PayloadType::B64Str,
            Payload::BigNum(_) => PayloadType::BigNum,
            Payload::XChainAddr(_) => PayloadType::XChainAddr,
            Payload::PChainAddr(_) => PayloadType::PChainAddr,
            Payload::CChainAddr(_) => PayloadType::CChainAddr,
            Payload::TxId(_) => PayloadType::TxId,
            Payload::AssetId(_) => PayloadType::AssetId,
            Payload::UtxoId(_) => PayloadType::UtxoId,
            Payload::NftId(_) => PayloadType::NftId,
            Payload::SubnetId(_) => PayloadType::SubnetId,
            Payload::ChainId(_) => PayloadType::ChainId,
            Payload::NodeId(_) => PayloadType::NodeId,
            Payload::SecpSig(_) => PayloadType::SecpSig,
            Payload::SecpEnc(_) => PayloadType::SecpEnc,
            Payload::Jpeg(_) => PayloadType::Jpeg,
            Payload::Png(_) => PayloadType::Png,
            Payload::Bmp(_) => PayloadType::Bmp,
            Payload::Ico(_) => PayloadType::Ico,
            Payload::Svg(_) => PayloadType::Svg,
            Payload::Csv(_) => PayloadType::Csv,
            Payload::Json(_) => PayloadType::Json,
            Payload::Yaml(_) => PayloadType::Yaml,
            Payload::Email(_) => PayloadType::Email,
            Payload::Url(_) => PayloadType::Url,
            Payload::Ipfs(_) => PayloadType::Ipfs,
            Payload::Onion(_) => PayloadType::Onion,
            Payload::Magnet(_) => PayloadType::Magnet,
        }
    }

    /// The numeric type ID.
    pub fn type_id(&self) -> u8 {
        self.payload_type().id()
    }

    /// The table name of this payload's type.
    pub fn type_string(&self) -> &'static str {
        self.payload_type().name()
    }

    /// The raw wire content, without length or type ID.
    pub fn content(&self) -> &[u8] {
        match self {
            Payload::Bin(b)
            | Payload::Utf8(b)
            | Payload::HexStr(b)
            | Payload::B58Str(b)
            | Payload::B64Str(b)
            | Payload::BigNum(b)
            | Payload::XChainAddr(b)
            | Payload::PChainAddr(b)
            | Payload::CChainAddr(b)
            | Payload::TxId(b)
            | Payload::AssetId(b)
            | Payload::UtxoId(b)
            | Payload::NftId(b)
            | Payload::SubnetId(b)
            | Payload::ChainId(b)
            | Payload::NodeId(b)
            | Payload::SecpSig(b)
            | Payload::SecpEnc(b)
            | Payload::Jpeg(b)
            | Payload::Png(b)
            | Payload::Bmp(b)
            | Payload::Ico(b)
            | Payload::Svg(b)
            | Payload::Csv(b)
            | Payload::Json(b)
            | Payload::Yaml(b)
            | Payload::Email(b)
            | Payload::Url(b)
            | Payload::Ipfs(b)
            | Payload::Onion(b)
            | Payload::Magnet(b) => b,
        }
    }

    /// Type ID followed by content: the encoding without its length prefix.
    pub fn payload_bytes(&self) -> Vec<u8> {
        let content = self.content();
        let mut out = Vec::with_capacity(1 + content.len());
        out.push(self.type_id());
        out.extend_from_slice(content);
        out
    }

    /// The content in its natural form.
    ///
    /// Chain addresses render as bech32 under `hrp` with their chain alias.
    /// Text types fail with `Content` when the bytes are not valid UTF-8.
    pub fn return_type(&self, hrp: &str) -> Result<PayloadValue, PayloadError> {
        let content = self.content();
        let value = match self.payload_type().content_kind() {
            ContentKind::Binary => PayloadValue::Bytes(content.to_vec()),
            ContentKind::Text => PayloadValue::Text(utf8(content)?),
            ContentKind::Hex => PayloadValue::Text(hex::encode(content)),
            ContentKind::Base58 => PayloadValue::Text(buffer_to_b58(content)),
            ContentKind::Base64 => {
                PayloadValue::Text(base64::engine::general_purpose::STANDARD.encode(content))
            }
            ContentKind::ChainAddress(chain) => {
                PayloadValue::Text(address_to_string(hrp, chain, content)?)
            }
            ContentKind::Cb58 => PayloadValue::Text(cb58_encode(content)),
            ContentKind::BigNum => PayloadValue::BigNum(from_buffer_to_bn(content)),
        };
        Ok(value)
    }

    /// Reinterpret this payload's content under another type ID.
    pub fn recast(&self, type_id: u8) -> Result<Payload, PayloadError> {
        Ok(Self::from_content(PayloadType::from_id(type_id)?, self.content().to_vec()))
    }

    /// Encode as `[u32 length][u8 type ID][content]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.payload_bytes();
        let mut w = ByteWriter::with_capacity(4 + body.len());
        w.write_sized_bytes(&body);
        w.into_bytes()
    }

    /// Decode a payload embedded at `offset` in `bytes`.
    ///
    /// # Returns
    /// The payload and the offset just past it.
    pub fn from_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), PayloadError> {
        let mut reader = ByteReader::with_offset(bytes, offset);
        let len = reader.read_u32()? as usize;
        if len == 0 {
            return Err(PayloadError::Content(
                "Payload.fromBuffer: length must include the type ID".to_string(),
            ));
        }
        let type_id = reader.read_u8()?;
        let ty = PayloadType::from_id(type_id)?;
        let content = reader.read_bytes(len - 1)?.to_vec();
        Ok((Self::from_content(ty, content), reader.position()))
    }
}
