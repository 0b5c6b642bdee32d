//! Type-directed conversion between in-memory values, wire bytes and
//! human-readable strings.
//!
//! Every conversion goes through an intermediate byte buffer:
//! `value --type_to_buffer--> bytes --buffer_to_type--> value'`.
//! [`encoder`] and [`decoder`] wrap that pipeline and apply the rule that
//! a non-display [`SerializedEncoding`] replaces the textual side of the
//! conversion (the output type when encoding, the input type when decoding).

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::bintools::{
    address_to_string, b58_to_buffer, buffer_to_b58, cb58_decode, cb58_encode, from_bn_to_buffer,
    from_buffer_to_bn, string_to_address,
};
use crate::PrimitivesError;

/// Prefix of the textual node ID form.
pub const NODE_ID_PREFIX: &str = "NodeID-";

/// Prefix of the textual private key form.
pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";

/// The representation a value is held in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SerializedType {
    Bn,
    Buffer,
    Bech32,
    NodeId,
    PrivateKey,
    Cb58,
    Base58,
    Base64,
    Hex,
    DecimalString,
    Number,
    Utf8,
}

impl SerializedType {
    /// The canonical tag string, e.g. `"cb58"` or `"decimalString"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SerializedType::Bn => "BN",
            SerializedType::Buffer => "Buffer",
            SerializedType::Bech32 => "bech32",
            SerializedType::NodeId => "nodeID",
            SerializedType::PrivateKey => "privateKey",
            SerializedType::Cb58 => "cb58",
            SerializedType::Base58 => "base58",
            SerializedType::Base64 => "base64",
            SerializedType::Hex => "hex",
            SerializedType::DecimalString => "decimalString",
            SerializedType::Number => "number",
            SerializedType::Utf8 => "utf8",
        }
    }
}

impl fmt::Display for SerializedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SerializedType {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = match s {
            "BN" => SerializedType::Bn,
            "Buffer" => SerializedType::Buffer,
            "bech32" => SerializedType::Bech32,
            "nodeID" => SerializedType::NodeId,
            "privateKey" => SerializedType::PrivateKey,
            "cb58" => SerializedType::Cb58,
            "base58" => SerializedType::Base58,
            "base64" => SerializedType::Base64,
            "hex" => SerializedType::Hex,
            "decimalString" => SerializedType::DecimalString,
            "number" => SerializedType::Number,
            "utf8" => SerializedType::Utf8,
            other => {
                return Err(PrimitivesError::UnknownType(format!(
                    "Serialization: unknown serialized type {}",
                    other
                )))
            }
        };
        Ok(t)
    }
}

/// Whether a field is rendered for the wire (`hex`) or for humans (`display`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SerializedEncoding {
    #[default]
    Hex,
    Display,
}

impl SerializedEncoding {
    /// The type forced onto the textual side, or `None` for display.
    fn forced_type(&self) -> Option<SerializedType> {
        match self {
            SerializedEncoding::Hex => Some(SerializedType::Hex),
            SerializedEncoding::Display => None,
        }
    }
}

/// A value held in one of the [`SerializedType`] representations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SerializedValue {
    Bytes(Vec<u8>),
    BigNum(BigUint),
    Number(u64),
    Text(String),
}

impl SerializedValue {
    /// Borrow the text, if this is a textual value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SerializedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the bytes, if this is a buffer value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SerializedValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Extra context some conversions need.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeArgs {
    /// HRP for bech32 rendering and parsing.
    pub hrp: Option<String>,
    /// Chain ID or alias prefixed onto bech32 addresses.
    pub chain_id: Option<String>,
    /// Fixed byte width for bignums and numbers; a truncation length for buffers.
    pub byte_length: Option<usize>,
}

impl TypeArgs {
    /// Arguments for bech32 conversions.
    pub fn bech32(hrp: &str, chain_id: &str) -> Self {
        TypeArgs {
            hrp: Some(hrp.to_string()),
            chain_id: Some(chain_id.to_string()),
            byte_length: None,
        }
    }

    /// Arguments carrying only a byte length.
    pub fn with_length(byte_length: usize) -> Self {
        TypeArgs {
            byte_length: Some(byte_length),
            ..Default::default()
        }
    }
}

fn mismatch(op: &str, ty: SerializedType, value: &SerializedValue) -> PrimitivesError {
    PrimitivesError::UnknownType(format!(
        "Serialization.{}: value {:?} cannot be held as {}",
        op, value, ty
    ))
}

/// Render a byte buffer as `ty`.
pub fn buffer_to_type(
    buf: &[u8],
    ty: SerializedType,
    args: &TypeArgs,
) -> Result<SerializedValue, PrimitivesError> {
    let value = match ty {
        SerializedType::Bn => SerializedValue::BigNum(from_buffer_to_bn(buf)),
        SerializedType::Buffer => match args.byte_length {
            Some(len) => SerializedValue::Bytes(buf[..len.min(buf.len())].to_vec()),
            None => SerializedValue::Bytes(buf.to_vec()),
        },
        SerializedType::Bech32 => {
            let hrp = args.hrp.as_deref().unwrap_or_default();
            let chain_id = args.chain_id.as_deref().unwrap_or_default();
            SerializedValue::Text(address_to_string(hrp, chain_id, buf)?)
        }
        SerializedType::NodeId => {
            SerializedValue::Text(format!("{}{}", NODE_ID_PREFIX, cb58_encode(buf)))
        }
        SerializedType::PrivateKey => {
            SerializedValue::Text(format!("{}{}", PRIVATE_KEY_PREFIX, cb58_encode(buf)))
        }
        SerializedType::Cb58 => SerializedValue::Text(cb58_encode(buf)),
        SerializedType::Base58 => SerializedValue::Text(buffer_to_b58(buf)),
        SerializedType::Base64 => {
            SerializedValue::Text(base64::engine::general_purpose::STANDARD.encode(buf))
        }
        SerializedType::Hex => SerializedValue::Text(hex::encode(buf)),
        SerializedType::DecimalString => {
            SerializedValue::Text(from_buffer_to_bn(buf).to_str_radix(10))
        }
        SerializedType::Number => {
            let n = from_buffer_to_bn(buf).to_u64().ok_or_else(|| {
                PrimitivesError::UnknownType(
                    "Serialization.bufferToType: number does not fit in 64 bits".to_string(),
                )
            })?;
            SerializedValue::Number(n)
        }
        SerializedType::Utf8 => SerializedValue::Text(String::from_utf8(buf.to_vec()).map_err(
            |e| PrimitivesError::UnknownType(format!("Serialization.bufferToType: {}", e)),
        )?),
    };
    Ok(value)
}

/// Convert a value held as `ty` into its byte buffer.
pub fn type_to_buffer(
    value: &SerializedValue,
    ty: SerializedType,
    args: &TypeArgs,
) -> Result<Vec<u8>, PrimitivesError> {
    let text = || value.as_text().ok_or_else(|| mismatch("typeToBuffer", ty, value));
    let bytes = match ty {
        SerializedType::Bn => match value {
            SerializedValue::BigNum(bn) => from_bn_to_buffer(bn, args.byte_length),
            _ => return Err(mismatch("typeToBuffer", ty, value)),
        },
        SerializedType::Buffer => match value {
            SerializedValue::Bytes(b) => match args.byte_length {
                Some(len) => b[..len.min(b.len())].to_vec(),
                None => b.clone(),
            },
            _ => return Err(mismatch("typeToBuffer", ty, value)),
        },
        SerializedType::Bech32 => string_to_address(text()?, args.hrp.as_deref())?,
        SerializedType::NodeId => strip_prefixed_cb58(text()?, NODE_ID_PREFIX)?,
        SerializedType::PrivateKey => strip_prefixed_cb58(text()?, PRIVATE_KEY_PREFIX)?,
        SerializedType::Cb58 => cb58_decode(text()?)?,
        SerializedType::Base58 => b58_to_buffer(text()?)?,
        SerializedType::Base64 => {
            base64::engine::general_purpose::STANDARD.decode(text()?).map_err(|e| {
                PrimitivesError::UnknownType(format!("Serialization.typeToBuffer: {}", e))
            })?
        }
        SerializedType::Hex => {
            let s = text()?;
            hex::decode(s.strip_prefix("0x").unwrap_or(s))?
        }
        SerializedType::DecimalString => {
            let bn = BigUint::parse_bytes(text()?.as_bytes(), 10).ok_or_else(|| {
                PrimitivesError::UnknownType(
                    "Serialization.typeToBuffer: invalid decimal string".to_string(),
                )
            })?;
            from_bn_to_buffer(&bn, args.byte_length)
        }
        SerializedType::Number => match value {
            SerializedValue::Number(n) => from_bn_to_buffer(&BigUint::from(*n), args.byte_length),
            _ => return Err(mismatch("typeToBuffer", ty, value)),
        },
        SerializedType::Utf8 => text()?.as_bytes().to_vec(),
    };
    Ok(bytes)
}

fn strip_prefixed_cb58(s: &str, prefix: &str) -> Result<Vec<u8>, PrimitivesError> {
    cb58_decode(s.strip_prefix(prefix).unwrap_or(s))
}

/// Convert `value` from `in_type` to `out_type` for output.
///
/// With a non-display `encoding`, `out_type` is replaced by the encoding's type.
pub fn encoder(
    value: &SerializedValue,
    encoding: SerializedEncoding,
    in_type: SerializedType,
    out_type: SerializedType,
    args: &TypeArgs,
) -> Result<SerializedValue, PrimitivesError> {
    let out_type = encoding.forced_type().unwrap_or(out_type);
    let buf = type_to_buffer(value, in_type, args)?;
    buffer_to_type(&buf, out_type, args)
}

/// Inverse of [`encoder`]: convert `value` from `in_type` back to `out_type`.
///
/// With a non-display `encoding`, `in_type` is replaced by the encoding's type.
pub fn decoder(
    value: &SerializedValue,
    encoding: SerializedEncoding,
    in_type: SerializedType,
    out_type: SerializedType,
    args: &TypeArgs,
) -> Result<SerializedValue, PrimitivesError> {
    let in_type = encoding.forced_type().unwrap_or(in_type);
    let buf = type_to_buffer(value, in_type, args)?;
    buffer_to_type(&buf, out_type, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(b: &[u8]) -> SerializedValue {
        SerializedValue::Bytes(b.to_vec())
    }

    #[test]
    fn test_type_tags_parse() {
        let tags = [
            "BN",
            "Buffer",
            "bech32",
            "nodeID",
            "privateKey",
            "cb58",
            "base58",
            "base64",
            "hex",
            "decimalString",
            "number",
            "utf8",
        ];
        for tag in tags {
            let ty: SerializedType = tag.parse().unwrap();
            assert_eq!(ty.as_str(), tag);
        }
        assert!("json".parse::<SerializedType>().is_err());
    }

    #[test]
    fn test_buffer_cb58_display_roundtrip() {
        let args = TypeArgs::default();
        let v = bytes(b"Wubalubadubdub!");
        let shown = encoder(
            &v,
            SerializedEncoding::Display,
            SerializedType::Buffer,
            SerializedType::Cb58,
            &args,
        )
        .unwrap();
        assert_eq!(shown.as_text(), Some("H1eQiQra9Xyg7mBTVkM28AegfA"));
        let back = decoder(
            &shown,
            SerializedEncoding::Display,
            SerializedType::Cb58,
            SerializedType::Buffer,
            &args,
        )
        .unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_hex_encoding_overrides_output_type() {
        let args = TypeArgs::default();
        let v = bytes(&[0xde, 0xad]);
        let wire = encoder(
            &v,
            SerializedEncoding::Hex,
            SerializedType::Buffer,
            SerializedType::Cb58,
            &args,
        )
        .unwrap();
        assert_eq!(wire.as_text(), Some("dead"));
        let back = decoder(
            &wire,
            SerializedEncoding::Hex,
            SerializedType::Cb58,
            SerializedType::Buffer,
            &args,
        )
        .unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_bech32_display() {
        let args = TypeArgs::bech32("fuji", "X");
        let addr = hex::decode("3cb7d3842e8cee6a0ebd09f1fe884f6861e1b29c").unwrap();
        let shown = buffer_to_type(&addr, SerializedType::Bech32, &args).unwrap();
        assert_eq!(shown.as_text(), Some("X-fuji18jma8ppw3nhx5r4ap8clazz0dps7rv5u6wmu4t"));
        assert_eq!(type_to_buffer(&shown, SerializedType::Bech32, &args).unwrap(), addr);
    }

    #[test]
    fn test_number_and_decimal_string() {
        let args = TypeArgs::with_length(4);
        let n = SerializedValue::Number(1000);
        let shown = encoder(
            &n,
            SerializedEncoding::Display,
            SerializedType::Number,
            SerializedType::DecimalString,
            &args,
        )
        .unwrap();
        assert_eq!(shown.as_text(), Some("1000"));
        let wire = type_to_buffer(&shown, SerializedType::DecimalString, &args).unwrap();
        assert_eq!(wire, vec![0, 0, 0x03, 0xe8]);
        let back = decoder(
            &shown,
            SerializedEncoding::Display,
            SerializedType::DecimalString,
            SerializedType::Number,
            &args,
        )
        .unwrap();
        assert_eq!(back, n);
    }

    #[test]
    fn test_bn_padding() {
        let args = TypeArgs::with_length(8);
        let v = SerializedValue::BigNum(BigUint::from(123456789u64));
        let buf = type_to_buffer(&v, SerializedType::Bn, &args).unwrap();
        assert_eq!(hex::encode(&buf), "00000000075bcd15");
        assert_eq!(buffer_to_type(&buf, SerializedType::Bn, &args).unwrap(), v);
    }

    #[test]
    fn test_prefixed_ids() {
        let args = TypeArgs::default();
        let raw = [7u8; 20];
        let node = buffer_to_type(&raw, SerializedType::NodeId, &args).unwrap();
        assert!(node.as_text().unwrap().starts_with("NodeID-"));
        assert_eq!(type_to_buffer(&node, SerializedType::NodeId, &args).unwrap(), raw.to_vec());
        let key = buffer_to_type(&[9u8; 32], SerializedType::PrivateKey, &args).unwrap();
        assert!(key.as_text().unwrap().starts_with("PrivateKey-"));
    }

    #[test]
    fn test_base_encodings() {
        let args = TypeArgs::default();
        let raw = b"axia".to_vec();
        for ty in [
            SerializedType::Base58,
            SerializedType::Base64,
            SerializedType::Hex,
            SerializedType::Utf8,
            SerializedType::Cb58,
        ] {
            let shown = buffer_to_type(&raw, ty, &args).unwrap();
            assert_eq!(type_to_buffer(&shown, ty, &args).unwrap(), raw, "{}", ty);
        }
        let hex0x = SerializedValue::Text("0x61786961".to_string());
        assert_eq!(type_to_buffer(&hex0x, SerializedType::Hex, &args).unwrap(), raw);
    }

    #[test]
    fn test_mismatched_value_is_rejected() {
        let args = TypeArgs::default();
        let err = type_to_buffer(&bytes(&[1]), SerializedType::Cb58, &args).unwrap_err();
        assert!(matches!(err, PrimitivesError::UnknownType(_)));
        assert!(type_to_buffer(&SerializedValue::Number(1), SerializedType::Bn, &args).is_err());
    }

    #[test]
    fn test_buffer_truncation() {
        let args = TypeArgs::with_length(2);
        assert_eq!(
            buffer_to_type(&[1, 2, 3], SerializedType::Buffer, &args).unwrap(),
            bytes(&[1, 2])
        );
    }
}
