#![cfg(feature = "alloc")]

use strict_bencode::{
    encode, encode_into, validate, BigInt, Dictionary, Encoder, ErrorCode, Integer, Value,
};

#[test]
fn scalar_vectors() {
    let cases: &[(Value, &[u8])] = &[
        (Value::int(0), b"i0e"),
        (Value::int(7), b"i7e"),
        (Value::int(-7), b"i-7e"),
        (Value::int(i64::MAX), b"i9223372036854775807e"),
        (Value::int(i64::MIN), b"i-9223372036854775808e"),
        (Value::from(u128::MAX), b"i340282366920938463463374607431768211455e"),
        (Value::from(i128::MIN), b"i-170141183460469231731687303715884105728e"),
        (Value::bytes(Vec::new()), b"0:"),
        (Value::str("spam"), b"4:spam"),
        (Value::bytes(vec![0u8; 10]), b"10:\0\0\0\0\0\0\0\0\0\0"),
        (Value::list(Vec::new()), b"le"),
        (Value::Dictionary(Dictionary::new()), b"de"),
    ];
    for (value, expected) in cases {
        assert_eq!(encode(value).unwrap(), *expected, "value {value:?}");
        assert_eq!(value.encoded_len(), expected.len(), "value {value:?}");
    }
}

#[test]
fn length_prefix_counts_bytes_not_characters() {
    let v = Value::str("h\u{e9}llo \u{1f600}");
    let encoded = encode(&v).unwrap();
    assert_eq!(&encoded[..3], b"11:");
    assert_eq!(encoded.len(), 3 + 11);
}

#[test]
fn big_integers_encode_their_digits() {
    let big = BigInt::new(true, b"123456789012345678901234567890".to_vec()).unwrap();
    let v = Value::Integer(Integer::from_bigint(big));
    assert_eq!(encode(&v).unwrap(), b"i-123456789012345678901234567890e");

    let err = BigInt::new(false, b"42".to_vec()).unwrap_err();
    assert_eq!(err.code, ErrorCode::BigIntInI64Range);
    let err = BigInt::new(false, b"0123456789012345678901".to_vec()).unwrap_err();
    assert_eq!(err.code, ErrorCode::BigIntNotCanonical);
}

#[test]
fn dictionaries_are_emitted_in_key_order() {
    let mut d = Dictionary::new();
    d.push("zeta", 1);
    d.push("alpha", 2);
    d.push(&b"\xff"[..], 3);
    d.push("", 4);
    let v = Value::Dictionary(d);
    assert_eq!(encode(&v).unwrap(), b"d0:i4e5:alphai2e4:zetai1e1:\xffi3ee");
}

#[test]
fn last_duplicate_wins_when_encoding_a_pushed_dictionary() {
    let mut d = Dictionary::new();
    d.push("k", 1);
    d.push("k", 2);
    let v = Value::Dictionary(d);
    assert_eq!(validate(&v).unwrap_err().code, ErrorCode::DuplicateKey);
    assert_eq!(v.get("k").and_then(Value::as_i64), Some(2));
    assert_eq!(encode(&v).unwrap(), b"d1:ki2ee");
}

#[test]
fn validate_reports_unsorted_recorded_keys() {
    let mut d = Dictionary::new();
    d.push("b", 1);
    d.push("a", 2);
    let v = Value::list(vec![Value::Dictionary(d)]);
    assert_eq!(validate(&v).unwrap_err().code, ErrorCode::UnsortedKeys);

    let mut sorted = Dictionary::new();
    sorted.insert("b", 1);
    sorted.insert("a", 2);
    assert!(validate(&Value::Dictionary(sorted)).is_ok());
}

#[test]
fn encode_into_appends() {
    let mut out = b"xx".to_vec();
    encode_into(&Value::int(1), &mut out).unwrap();
    assert_eq!(out, b"xxi1e");
}

#[test]
fn streaming_encoder_matches_tree_encoding() {
    let mut enc = Encoder::new();
    enc.dict(|d| {
        d.entry_str("info", |e| {
            e.dict(|d| {
                d.entry(b"length", |e| e.int(12))?;
                d.entry(b"name", |e| e.str("a.txt"))
            })
        })?;
        d.entry(b"list", |e| {
            e.list(|l| {
                l.int_u128(u128::from(u64::MAX))?;
                l.bytes(b"\x00")
            })
        })
    })
    .unwrap();
    assert_eq!(
        enc.as_bytes(),
        b"d4:infod6:lengthi12e4:name5:a.txte4:listli18446744073709551615e1:\x00ee"
    );
    let canon = enc.into_canonical().unwrap();
    assert_eq!(canon.to_value().unwrap().encode().unwrap(), canon.as_bytes());
}

#[test]
fn streaming_encoder_rejects_out_of_order_keys_and_rolls_back() {
    let mut enc = Encoder::new();
    enc.int(1).unwrap();
    let err = enc
        .dict(|d| {
            d.entry(b"b", |e| e.int(1))?;
            d.entry(b"a", |e| e.int(2))
        })
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsortedKeys);
    assert_eq!(enc.as_bytes(), b"i1e");

    let err = enc
        .dict(|d| {
            d.entry(b"a", |e| e.int(1))?;
            d.entry(b"a", |e| e.int(2))
        })
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateKey);
    assert_eq!(enc.as_bytes(), b"i1e");
}

#[test]
fn deep_trees_encode_without_recursion() {
    let mut v = Value::int(0);
    for _ in 0..1_000 {
        v = Value::list(vec![v]);
    }
    let bytes = encode(&v).unwrap();
    assert_eq!(bytes.len(), 1_000 * 2 + 3);
    assert!(bytes.starts_with(b"lll"));
    assert!(bytes.ends_with(b"i0eeee"));
}
