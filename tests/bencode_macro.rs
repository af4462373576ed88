#![cfg(feature = "alloc")]

use strict_bencode::{bencode, BigInt, ErrorCode, Integer, Value};

#[test]
fn scalars() {
    assert_eq!(bencode!(true).unwrap(), Value::int(1));
    assert_eq!(bencode!(false).unwrap(), Value::int(0));
    assert_eq!(bencode!(-12).unwrap(), Value::int(-12));
    assert_eq!(bencode!("spam").unwrap(), Value::str("spam"));
    assert_eq!(bencode!(b"\x00\x01").unwrap(), Value::bytes(vec![0u8, 1]));
    assert_eq!(
        bencode!(u64::MAX).unwrap().encode().unwrap(),
        b"i18446744073709551615e"
    );
}

#[test]
fn nested_literal_encodes_canonically() {
    let v = bencode!({
        "zz": [1, [], {}],
        a: { inner: (-1) },
        "m": [true, "x", b"\xff"],
    })
    .unwrap();
    assert_eq!(
        v.encode().unwrap(),
        b"d1:ad5:inneri-1ee1:mli1e1:x1:\xffe2:zzli1eledeee"
    );
    assert!(v.validate().is_ok());
}

#[test]
fn expression_keys_and_values() {
    let key = String::from("dyn");
    let raw_key: &[u8] = b"\x01";
    let count = 3usize;
    let nested = bencode!([1, 2]).unwrap();
    let v = bencode!({
        (key.as_str()): count,
        (raw_key): (nested.clone()),
    })
    .unwrap();
    assert_eq!(v.encode().unwrap(), b"d1:\x01li1ei2ee3:dyni3ee");
}

#[test]
fn duplicate_keys_are_rejected() {
    let err = bencode!({ a: 1, "a": 2 }).unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateKey);
}

#[test]
fn none_has_no_representation() {
    let missing: Option<i32> = None;
    let err = bencode!([(missing)]).unwrap_err();
    assert_eq!(err.code, ErrorCode::Unsupported);
    assert_eq!(bencode!((Some(4))).unwrap(), Value::int(4));
}

#[test]
fn big_integers_pass_through() {
    let big = BigInt::new(false, b"99999999999999999999".to_vec()).unwrap();
    let v = bencode!([(big.clone()), (Integer::from(i128::MIN))]).unwrap();
    assert_eq!(
        v.encode().unwrap(),
        b"li99999999999999999999ei-170141183460469231731687303715884105728ee"
    );
}
