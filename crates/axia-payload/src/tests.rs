use num_bigint::BigUint;

use crate::types::get_type_id;
use crate::{Payload, PayloadError, PayloadType, PayloadValue};

const ADDR_HEX: &str = "3cb7d3842e8cee6a0ebd09f1fe884f6861e1b29c";

// ---------------------------------------------------------------------------
// Wire layout
// ---------------------------------------------------------------------------

#[test]
fn test_utf8_layout() {
    let p = Payload::Utf8(b"hello".to_vec());
    let bytes = p.to_bytes();
    assert_eq!(&bytes[..4], &[0, 0, 0, 6]);
    assert_eq!(bytes[4], 1);
    assert_eq!(&bytes[5..], b"hello");
    assert_eq!(p.payload_bytes(), bytes[4..].to_vec());
}

#[test]
fn test_bignum_scenario() {
    let p = Payload::select(5, PayloadValue::BigNum(BigUint::from(123456789u64)), "axc").unwrap();
    let encoded = p.to_bytes();
    assert_eq!(get_type_id(&encoded).unwrap(), 5);

    let (decoded, next) = Payload::from_bytes(&encoded, 0).unwrap();
    assert_eq!(next, encoded.len());
    let selected = Payload::select(decoded.type_id(), decoded.return_type("axc").unwrap(), "axc").unwrap();
    assert_eq!(
        selected.return_type("axc").unwrap(),
        PayloadValue::BigNum(BigUint::from(123456789u64))
    );
}

#[test]
fn test_from_bytes_at_offset() {
    let a = Payload::Utf8(b"first".to_vec());
    let b = Payload::Bin(vec![1, 2, 3]);
    let mut stream = vec![0xaa, 0xbb];
    stream.extend(a.to_bytes());
    stream.extend(b.to_bytes());

    let (pa, off) = Payload::from_bytes(&stream, 2).unwrap();
    let (pb, end) = Payload::from_bytes(&stream, off).unwrap();
    assert_eq!(pa, a);
    assert_eq!(pb, b);
    assert_eq!(end, stream.len());
}

#[test]
fn test_zero_padded_bignum_keeps_wire_bytes() {
    let input = [0, 0, 0, 4, 5, 0, 0, 7];
    let (p, end) = Payload::from_bytes(&input, 0).unwrap();
    assert_eq!(end, input.len());
    assert_eq!(p.to_bytes(), input.to_vec());
    assert_eq!(p.return_type("axc").unwrap(), PayloadValue::BigNum(BigUint::from(7u8)));
}

#[test]
fn test_non_utf8_text_keeps_wire_bytes() {
    let input = [0, 0, 0, 3, PayloadType::Utf8.id(), 0xc3, 0x28];
    let (p, _) = Payload::from_bytes(&input, 0).unwrap();
    assert_eq!(p.type_string(), "UTF8");
    assert_eq!(p.to_bytes(), input.to_vec());
    assert!(matches!(p.return_type("axc"), Err(PayloadError::Content(_))));

    let json = [0, 0, 0, 2, PayloadType::Json.id(), 0xff];
    let (p, _) = Payload::from_bytes(&json, 0).unwrap();
    assert_eq!(p.to_bytes(), json.to_vec());
    assert!(p.json_value().is_err());
}

#[test]
fn test_from_bytes_rejects_truncated_and_unknown() {
    let bytes = Payload::Bin(vec![1, 2, 3]).to_bytes();
    assert!(Payload::from_bytes(&bytes[..bytes.len() - 1], 0).is_err());
    assert!(Payload::from_bytes(&[0, 0, 0, 0], 0).is_err());
    let err = Payload::from_bytes(&[0, 0, 0, 1, 99], 0).unwrap_err();
    assert!(matches!(err, PayloadError::TypeId(_)));
}

// ---------------------------------------------------------------------------
// select / return_type
// ---------------------------------------------------------------------------

#[test]
fn test_select_unknown_type_id() {
    let err = Payload::select(31, PayloadValue::Bytes(vec![]), "axc").unwrap_err();
    assert!(matches!(err, PayloadError::TypeId(_)));
}

#[test]
fn test_hexstr_rejects_prefix_and_garbage() {
    let err = Payload::select(2, PayloadValue::Text("0xdead".into()), "axc").unwrap_err();
    assert!(matches!(err, PayloadError::Hex(_)));
    let err = Payload::select(2, PayloadValue::Text("zz".into()), "axc").unwrap_err();
    assert!(matches!(err, PayloadError::Hex(_)));
    let ok = Payload::select(2, PayloadValue::Text("deadbeef".into()), "axc").unwrap();
    assert_eq!(ok, Payload::HexStr(vec![0xde, 0xad, 0xbe, 0xef]));
    assert_eq!(ok.return_type("axc").unwrap(), PayloadValue::Text("deadbeef".into()));
}

#[test]
fn test_chain_address_payloads() {
    let addr = hex::decode(ADDR_HEX).unwrap();
    let p = Payload::XChainAddr(addr.clone());
    assert_eq!(
        p.return_type("fuji").unwrap(),
        PayloadValue::Text("X-fuji18jma8ppw3nhx5r4ap8clazz0dps7rv5u6wmu4t".into())
    );
    let back = Payload::select(
        6,
        PayloadValue::Text("X-fuji18jma8ppw3nhx5r4ap8clazz0dps7rv5u6wmu4t".into()),
        "fuji",
    )
    .unwrap();
    assert_eq!(back.content(), addr);

    let p = Payload::PChainAddr(addr.clone());
    match p.return_type("axc").unwrap() {
        PayloadValue::Text(s) => assert!(s.starts_with("P-axc1")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_cb58_id_payloads() {
    let p = Payload::TxId(vec![0u8; 32]);
    assert_eq!(
        p.return_type("axc").unwrap(),
        PayloadValue::Text("11111111111111111111111111111111LpoYY".into())
    );
    let bad = Payload::select(9, PayloadValue::Text("11111111111111111111111111111111LpoYZ".into()), "axc");
    assert!(bad.is_err());
}

#[test]
fn test_json_payload_keeps_text() {
    let text = r#"{"b":1,"a":[true,null]}"#;
    let p = Payload::select(24, PayloadValue::Text(text.into()), "axc").unwrap();
    let (decoded, _) = Payload::from_bytes(&p.to_bytes(), 0).unwrap();
    assert_eq!(decoded, Payload::Json(text.as_bytes().to_vec()));
    assert_eq!(decoded.json_value().unwrap()["b"], 1);

    let from_value = Payload::json(&serde_json::json!({"k": "v"}));
    assert_eq!(from_value.type_string(), "JSON");
    assert!(Payload::Utf8(b"x".to_vec()).json_value().is_err());
}

#[test]
fn test_binary_rejects_text_and_numbers_rejected_elsewhere() {
    assert!(matches!(
        Payload::select(0, PayloadValue::Text("abc".into()), "axc"),
        Err(PayloadError::Content(_))
    ));
    assert!(matches!(
        Payload::select(1, PayloadValue::BigNum(BigUint::from(1u8)), "axc"),
        Err(PayloadError::Content(_))
    ));
}

#[test]
fn test_recast() {
    let p = Payload::Bin(b"magnet:?xt=urn".to_vec());
    let recast = p.recast(PayloadType::Magnet.id()).unwrap();
    assert_eq!(recast, Payload::Magnet(b"magnet:?xt=urn".to_vec()));

    let text = Payload::Bin(vec![0xff]).recast(PayloadType::Utf8.id()).unwrap();
    assert!(matches!(text.return_type("axc"), Err(PayloadError::Content(_))));
    assert!(Payload::Bin(vec![0xff]).recast(99).is_err());
}

#[test]
fn test_every_type_roundtrips_through_select() {
    let addr = hex::decode(ADDR_HEX).unwrap();
    for ty in PayloadType::ALL {
        let content = match ty {
            PayloadType::BigNum => vec![0x07, 0x5b, 0xcd, 0x15],
            PayloadType::XChainAddr | PayloadType::PChainAddr | PayloadType::CChainAddr => addr.clone(),
            _ => b"payload".to_vec(),
        };
        let p = Payload::from_content(ty, content.clone());
        assert_eq!(p.content(), content, "{}", ty);
        let again = Payload::select(p.type_id(), p.return_type("axc").unwrap(), "axc").unwrap();
        assert_eq!(again.to_bytes(), p.to_bytes(), "{}", ty);
    }
}
