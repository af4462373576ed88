// Property-based tests for canonical Bencode roundtrips.
//
// Sizes and depths stay small so the suite runs quickly.
#![cfg(feature = "alloc")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use std::collections::BTreeMap;

use strict_bencode::{
    decode, encode, validate_canonical, BigInt, DecodeOptions, Dictionary, Integer, Value,
};

fn arb_key() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..12)
}

fn arb_bigint() -> impl Strategy<Value = BigInt> {
    // Twenty or more digits with a non-zero lead always lie outside the i64 range.
    (
        any::<bool>(),
        1u8..=9,
        proptest::collection::vec(0u8..=9, 19..40),
    )
        .prop_map(|(neg, lead, rest)| {
            let mut digits = vec![b'0' + lead];
            digits.extend(rest.into_iter().map(|d| b'0' + d));
            BigInt::new(neg, digits).expect("bigint must be valid")
        })
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::int),
        arb_bigint().prop_map(|b| Value::Integer(Integer::from_bigint(b))),
        proptest::collection::vec(any::<u8>(), 0..64).prop_map(Value::ByteString),
        "[a-z ]{0,16}".prop_map(|s| Value::str(&s)),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 256, 10, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..10).prop_map(Value::List),
            proptest::collection::vec((arb_key(), inner), 0..10).prop_map(|pairs| {
                let m: BTreeMap<Vec<u8>, Value> = pairs.into_iter().collect();
                let entries = m.into_iter().collect::<Vec<_>>();
                Value::Dictionary(Dictionary::try_from_entries(entries).expect("unique keys"))
            }),
        ]
    })
}

proptest! {
    #[test]
    fn canonical_roundtrip(v in arb_value()) {
        let bytes = encode(&v).unwrap();
        let opts = DecodeOptions::for_bytes(bytes.len());
        let canon = validate_canonical(&bytes, opts).unwrap();

        let decoded = decode(&bytes, opts).unwrap();
        prop_assert_eq!(&decoded, &v);

        let bytes2 = encode(&decoded).unwrap();
        prop_assert_eq!(&bytes, &bytes2);
        prop_assert_eq!(v.encoded_len(), bytes.len());

        #[cfg(feature = "sha2")]
        {
            prop_assert_eq!(canon.sha256(), decoded.sha256().unwrap());
        }
        #[cfg(not(feature = "sha2"))]
        let _ = canon;
    }

    #[test]
    fn decode_and_validate_agree(bytes in proptest::collection::vec(
        prop_oneof![
            Just(b'i'), Just(b'l'), Just(b'd'), Just(b'e'), Just(b':'), Just(b'-'),
            Just(b'0'), Just(b'1'), Just(b'2'), Just(b'9'), Just(b'a'),
        ],
        0..24,
    )) {
        let opts = DecodeOptions::default();
        match (validate_canonical(&bytes, opts), decode(&bytes, opts)) {
            (Ok(_), Ok(v)) => prop_assert_eq!(encode(&v).unwrap(), bytes),
            (Err(a), Err(b)) => {
                prop_assert_eq!(a.code, b.code);
                prop_assert_eq!(a.offset, b.offset);
            }
            (a, b) => prop_assert!(false, "validate {:?} vs decode {:?}", a.map(|_| ()), b.map(|_| ())),
        }
    }

    #[test]
    fn lenient_decode_always_reencodes_canonically(bytes in proptest::collection::vec(any::<u8>(), 0..48)) {
        if let Ok(v) = decode(&bytes, DecodeOptions::lenient()) {
            let out = encode(&v).unwrap();
            prop_assert!(validate_canonical(&out, DecodeOptions::default()).is_ok());
        }
    }

    #[test]
    fn integers_roundtrip_through_text(n in any::<i128>()) {
        let v = Value::from(n);
        let bytes = encode(&v).unwrap();
        prop_assert_eq!(bytes.clone(), format!("i{n}e").into_bytes());
        let back = decode(&bytes, DecodeOptions::default()).unwrap();
        prop_assert_eq!(back.as_integer().and_then(Integer::to_i128), Some(n));
    }
}
