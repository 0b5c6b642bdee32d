//! Binary codec utilities.
//!
//! Stateless helpers shared by every layer of the SDK:
//! - buffer copies and length-prefixed strings
//! - raw base-58 and checksummed base-58 ("cb58", SHA-256 checksum)
//! - bech32 chain addresses of the form `<chain>-<hrp>1<data>`
//! - ETH-style `0x` hex addresses with EIP-55 checksums
//! - big-endian buffer/bignum conversions
//!
//! Errors carry the operation that detected them, e.g.
//! `BinTools.cb58Decode: invalid checksum`.

use bech32::{FromBase32, ToBase32, Variant};
use num_bigint::BigUint;

use crate::hash::{keccak256, sha256};
use crate::PrimitivesError;

/// Length of the cb58 checksum appended to payloads.
pub const CHECKSUM_LEN: usize = 4;

/// Length in bytes of an ETH-style hex address.
pub const ETH_ADDRESS_LEN: usize = 20;

/// HRPs accepted by [`string_to_address`] regardless of the caller's network.
pub const KNOWN_HRPS: &[&str] = &["axc", "fuji", "local", "custom"];

// ---------------------------------------------------------------------------
// Buffers
// ---------------------------------------------------------------------------

/// Return an independent copy of `buf[start..end]`.
///
/// `end` defaults to `buf.len()`. Out-of-range bounds are clamped, so an
/// inverted or empty range yields an empty vector rather than a panic.
pub fn copy_from(buf: &[u8], start: usize, end: Option<usize>) -> Vec<u8> {
    let end = end.unwrap_or(buf.len()).min(buf.len());
    let start = start.min(end);
    buf[start..end].to_vec()
}

/// Encode a string as a u16 big-endian length prefix followed by UTF-8 bytes.
///
/// # Returns
/// The encoding, or `Length` when `s` is longer than `u16::MAX` bytes.
pub fn string_to_buffer(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let len = u16::try_from(s.len()).map_err(|_| {
        PrimitivesError::Length(format!(
            "BinTools.stringToBuffer: {} bytes do not fit a u16 length prefix",
            s.len()
        ))
    })?;
    let mut out = Vec::with_capacity(2 + s.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(s.as_bytes());
    Ok(out)
}

/// Decode a u16-length-prefixed UTF-8 string produced by [`string_to_buffer`].
pub fn buffer_to_string(buf: &[u8]) -> Result<String, PrimitivesError> {
    if buf.len() < 2 {
        return Err(PrimitivesError::UnexpectedEof { needed: 2, remaining: buf.len() });
    }
    let len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
    if buf.len() < 2 + len {
        return Err(PrimitivesError::UnexpectedEof { needed: len, remaining: buf.len() - 2 });
    }
    String::from_utf8(buf[2..2 + len].to_vec()).map_err(|e| {
        PrimitivesError::UnknownType(format!("BinTools.bufferToString: invalid utf8: {}", e))
    })
}

// ---------------------------------------------------------------------------
// Base-58 and cb58
// ---------------------------------------------------------------------------

/// Encode bytes as base-58 (Bitcoin alphabet, no checksum).
pub fn buffer_to_b58(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a base-58 string (Bitcoin alphabet, no checksum).
pub fn b58_to_buffer(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::Base58(format!("BinTools.b58ToBuffer: {}", e)))
}

/// Append the 4-byte checksum: the last 4 bytes of SHA-256(data).
pub fn add_checksum(data: &[u8]) -> Vec<u8> {
    let hash = sha256(data);
    let mut out = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    out.extend_from_slice(data);
    out.extend_from_slice(&hash[32 - CHECKSUM_LEN..]);
    out
}

/// Check that the trailing 4 bytes match the checksum of everything before them.
pub fn validate_checksum(data: &[u8]) -> bool {
    if data.len() < CHECKSUM_LEN {
        return false;
    }
    let (payload, checksum) = data.split_at(data.len() - CHECKSUM_LEN);
    let hash = sha256(payload);
    checksum == &hash[32 - CHECKSUM_LEN..]
}

/// Encode bytes as cb58: `base58(data ‖ checksum)`.
pub fn cb58_encode(data: &[u8]) -> String {
    buffer_to_b58(&add_checksum(data))
}

/// Decode a cb58 string and strip its checksum.
///
/// # Returns
/// The payload bytes, or `Checksum` if the trailing 4 bytes don't match.
pub fn cb58_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let raw = b58_to_buffer(s)?;
    cb58_decode_bytes(&raw)
}

/// Validate and strip the checksum of already base-58-decoded cb58 bytes.
pub fn cb58_decode_bytes(raw: &[u8]) -> Result<Vec<u8>, PrimitivesError> {
    if !validate_checksum(raw) {
        return Err(PrimitivesError::Checksum(
            "BinTools.cb58Decode: invalid checksum".to_string(),
        ));
    }
    Ok(copy_from(raw, 0, Some(raw.len() - CHECKSUM_LEN)))
}

// ---------------------------------------------------------------------------
// String classification
// ---------------------------------------------------------------------------

/// True if `s` is a non-empty string of hex digits, optionally `0x`-prefixed.
pub fn is_hex(s: &str) -> bool {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// True if `s` only contains base-58 alphabet characters.
pub fn is_base58(s: &str) -> bool {
    !s.is_empty() && b58_to_buffer(s).is_ok()
}

/// True if `s` is a non-empty string of decimal digits.
pub fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// True if `s` decodes as base-58 and carries a valid cb58 checksum.
pub fn is_cb58(s: &str) -> bool {
    cb58_decode(s).is_ok()
}

// ---------------------------------------------------------------------------
// Bignums
// ---------------------------------------------------------------------------

/// Interpret bytes as a big-endian unsigned integer. Empty input is zero.
pub fn from_buffer_to_bn(buf: &[u8]) -> BigUint {
    BigUint::from_bytes_be(buf)
}

/// Serialize a bignum big-endian.
///
/// When `length` is given the result is left-padded with zero bytes to
/// exactly `length` bytes. A value that is already longer is returned
/// unpadded and untruncated.
pub fn from_bn_to_buffer(bn: &BigUint, length: Option<usize>) -> Vec<u8> {
    let bytes = bn.to_bytes_be();
    match length {
        Some(len) if len > bytes.len() => {
            let mut out = vec![0u8; len - bytes.len()];
            out.extend_from_slice(&bytes);
            out
        }
        _ => bytes,
    }
}

// ---------------------------------------------------------------------------
// ETH-style hex addresses
// ---------------------------------------------------------------------------

/// Render a 20-byte address with the EIP-55 mixed-case checksum.
pub fn to_checksum_address(addr: &[u8]) -> String {
    let lower = hex::encode(addr);
    let hash = keccak256(lower.as_bytes());
    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// True if `s` is a `0x` + 40-hex-digit address whose casing is either
/// uniform (all lower or all upper) or a valid EIP-55 checksum.
pub fn is_eth_address(s: &str) -> bool {
    let Some(digits) = s.strip_prefix("0x") else {
        return false;
    };
    if digits.len() != ETH_ADDRESS_LEN * 2 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }
    match hex::decode(digits) {
        Ok(bytes) => to_checksum_address(&bytes) == s,
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Bech32 chain addresses
// ---------------------------------------------------------------------------

/// Format `bytes` as a chain address: `<chain_id>-<bech32(hrp, bytes)>`.
pub fn address_to_string(hrp: &str, chain_id: &str, bytes: &[u8]) -> Result<String, PrimitivesError> {
    let encoded = bech32::encode(hrp, bytes.to_base32(), Variant::Bech32).map_err(|e| {
        PrimitivesError::Bech32(format!("BinTools.addressToString: {}", e))
    })?;
    Ok(format!("{}-{}", chain_id, encoded))
}

/// Decode a chain address (or `0x` hex address) into its raw bytes.
///
/// Bech32 addresses are split on the first `-`; the chain prefix must be
/// non-empty and the HRP must be one of [`KNOWN_HRPS`] or equal to `hrp`.
pub fn string_to_address(address: &str, hrp: Option<&str>) -> Result<Vec<u8>, PrimitivesError> {
    if address.starts_with("0x") {
        if is_eth_address(address) {
            return Ok(hex::decode(&address[2..])?);
        }
        return Err(PrimitivesError::Hex(
            "BinTools.stringToAddress: invalid hex address".to_string(),
        ));
    }

    let mut parts = address.trim().split('-');
    let prefix = parts.next().unwrap_or_default();
    let Some(encoded) = parts.next() else {
        return Err(PrimitivesError::Bech32(
            "BinTools.stringToAddress: valid address should include -".to_string(),
        ));
    };
    if prefix.is_empty() {
        return Err(PrimitivesError::Bech32(
            "BinTools.stringToAddress: valid address must have prefix before -".to_string(),
        ));
    }
    let Some(split) = encoded.rfind('1') else {
        return Err(PrimitivesError::Bech32(
            "BinTools.stringToAddress: valid address must include separator (1)".to_string(),
        ));
    };
    let human_readable_part = &encoded[..split];
    if human_readable_part.is_empty() {
        return Err(PrimitivesError::Bech32(
            "BinTools.stringToAddress: HRP should be at least 1 character".to_string(),
        ));
    }
    if !KNOWN_HRPS.contains(&human_readable_part) && Some(human_readable_part) != hrp {
        return Err(PrimitivesError::Bech32(format!(
            "BinTools.stringToAddress: invalid HRP {}",
            human_readable_part
        )));
    }

    let (_, data, variant) = bech32::decode(encoded).map_err(|e| {
        PrimitivesError::Bech32(format!("BinTools.stringToAddress: {}", e))
    })?;
    if variant != Variant::Bech32 {
        return Err(PrimitivesError::Bech32(
            "BinTools.stringToAddress: expected bech32, got bech32m".to_string(),
        ));
    }
    Vec::<u8>::from_base32(&data)
        .map_err(|e| PrimitivesError::Bech32(format!("BinTools.stringToAddress: {}", e)))
}

/// Strictly parse a chain address bound to one blockchain.
///
/// The prefix before `-` must equal `alias` or `blockchain_id`, and the
/// decoded address must be `addr_len` bytes long (`0` disables the length
/// check). Any mismatch or decoding failure yields `None`.
pub fn parse_address(
    addr: &str,
    blockchain_id: &str,
    alias: Option<&str>,
    addr_len: usize,
    hrp: Option<&str>,
) -> Option<Vec<u8>> {
    let parts: Vec<&str> = addr.split('-').collect();
    if parts.len() != 2 {
        return None;
    }
    let prefix_ok = alias.is_some_and(|a| parts[0] == a)
        || (!blockchain_id.is_empty() && parts[0] == blockchain_id);
    if !prefix_ok {
        return None;
    }
    let bytes = string_to_address(addr, hrp).ok()?;
    if addr_len == 0 || bytes.len() == addr_len {
        Some(bytes)
    } else {
        None
    }
}
