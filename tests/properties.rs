#![cfg(feature = "alloc")]

use strict_bencode::{
    decode, encode, validate_canonical, DecodeOptions, Dictionary, ErrorKind, Value,
};

fn opts() -> DecodeOptions {
    DecodeOptions::default()
}

#[test]
fn byte_string_spam() {
    let v = decode(b"4:spam", opts()).unwrap();
    assert_eq!(v, Value::bytes(&b"spam"[..]));
    assert_eq!(v.as_str(), Some("spam"));
}

#[test]
fn negative_zero_is_a_syntax_error() {
    let err = decode(b"i-0e", opts()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.is_syntax());
}

#[test]
fn list_of_two_strings() {
    let v = decode(b"l4:spam4:eggse", opts()).unwrap();
    assert_eq!(v, Value::list(vec![Value::str("spam"), Value::str("eggs")]));
}

#[test]
fn dictionary_and_reordered_construction_encode_alike() {
    let v = decode(b"d3:cow3:moo4:spam4:eggse", opts()).unwrap();
    assert_eq!(v.get("cow").and_then(Value::as_str), Some("moo"));
    assert_eq!(v.get("spam").and_then(Value::as_str), Some("eggs"));

    let mut reordered = Dictionary::new();
    reordered.push("spam", "eggs");
    reordered.push("cow", "moo");
    let reordered = Value::Dictionary(reordered);
    assert_eq!(encode(&reordered).unwrap(), encode(&v).unwrap());
    assert_eq!(encode(&v).unwrap(), b"d3:cow3:moo4:spam4:eggse");
}

#[test]
fn truncated_byte_string_is_a_bounds_error() {
    let err = decode(b"4:sp", opts()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bounds);
    assert_eq!(err.offset, 2);
}

#[test]
fn nesting_beyond_max_depth() {
    let err = decode(b"llleee", opts().with_max_depth(2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DepthExceeded);
    assert_eq!(err.offset, 2);
    assert!(decode(b"llleee", opts().with_max_depth(3)).is_ok());
}

#[test]
fn empty_input_is_a_validation_error() {
    let err = decode(b"", opts()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.offset, 0);
}

#[test]
fn decode_then_encode_is_identity_on_canonical_input() {
    let inputs: &[&[u8]] = &[
        b"i0e",
        b"i-1e",
        b"i9223372036854775807e",
        b"i-9223372036854775808e",
        b"i9223372036854775808e",
        b"i-123456789012345678901234567890e",
        b"0:",
        b"3:\x00\xff\x80",
        b"le",
        b"de",
        b"d0:i1e1:a0:2:aale1:bdee",
        b"ll1:aelee",
    ];
    for &input in inputs {
        let v = decode(input, opts()).unwrap();
        assert_eq!(encode(&v).unwrap(), input, "input {input:?}");
        assert_eq!(validate_canonical(input, opts()).unwrap().as_bytes(), input);
    }
}

#[test]
fn encode_is_idempotent() {
    let mut inner = Dictionary::new();
    inner.push("z", 1);
    inner.push("a", Value::list(vec![Value::int(-5), Value::bytes(vec![0u8, 1, 2])]));
    let v = Value::list(vec![Value::Dictionary(inner), Value::int(i64::MIN)]);

    let once = encode(&v).unwrap();
    let twice = encode(&decode(&once, opts()).unwrap()).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once, b"ld1:ali-5e3:\x00\x01\x02e1:zi1eei-9223372036854775808ee");

    let back = decode(&once, opts()).unwrap();
    let dict = back.as_list().and_then(|items| items[0].as_dict()).unwrap();
    assert!(dict.is_canonical());
    assert_eq!(dict.keys().collect::<Vec<_>>(), [&b"a"[..], &b"z"[..]]);
}

#[cfg(feature = "sha2")]
#[test]
fn sha256_of_encoding_matches_validated_input() {
    let input = b"d4:infod6:lengthi12e4:name5:a.txtee";
    let canon = validate_canonical(input, opts()).unwrap();
    let v = decode(input, opts()).unwrap();
    assert_eq!(v.sha256().unwrap(), canon.sha256());
}

#[test]
fn deep_trees_decode_and_drop_within_the_depth_limit() {
    const DEPTH: usize = 200_000;
    let mut lists = vec![b'l'; DEPTH];
    lists.extend(core::iter::repeat(b'e').take(DEPTH));
    let v = decode(&lists, opts().with_max_depth(DEPTH)).unwrap();
    assert_eq!(v.encoded_len(), lists.len());
    drop(v);

    let mut dicts = b"d1:a".repeat(DEPTH - 1);
    dicts.extend_from_slice(b"le");
    dicts.extend(core::iter::repeat(b'e').take(DEPTH - 1));
    let v = decode(&dicts, opts().with_max_depth(DEPTH)).unwrap();
    assert_eq!(encode(&v).unwrap(), dicts);
    drop(v);

    let canon = validate_canonical(&lists, opts().with_max_depth(DEPTH)).unwrap();
    drop(canon.to_value().unwrap());
}
