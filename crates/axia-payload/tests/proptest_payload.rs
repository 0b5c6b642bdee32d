use proptest::prelude::*;

use axia_payload::{Payload, PayloadType, PayloadValue};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn payloads_roundtrip_wire_bytes(
        type_idx in 0usize..31,
        content in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        let ty = PayloadType::ALL[type_idx];
        let p = Payload::from_content(ty, content.clone());
        let encoded = p.to_bytes();
        let (decoded, end) = Payload::from_bytes(&encoded, 0).unwrap();
        prop_assert_eq!(end, content.len() + 5);
        prop_assert_eq!(decoded.content(), &content[..]);
        prop_assert_eq!(decoded.type_id(), ty.id());
        prop_assert_eq!(decoded.to_bytes(), encoded);
    }

    #[test]
    fn bignum_select_roundtrip(value in any::<u128>()) {
        let n = num_bigint::BigUint::from(value);
        let p = Payload::select(PayloadType::BigNum.id(), PayloadValue::BigNum(n.clone()), "axc")
            .unwrap();
        let (decoded, _) = Payload::from_bytes(&p.to_bytes(), 0).unwrap();
        prop_assert_eq!(decoded.return_type("axc").unwrap(), PayloadValue::BigNum(n));
    }
}
