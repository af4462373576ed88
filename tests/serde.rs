#![cfg(feature = "serde")]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strict_bencode::{
    decode, from_slice, from_value, serde_value, to_value, to_vec, DecodeOptions, ErrorCode, Value,
};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Peer {
    ip: String,
    port: u16,
    #[serde(rename = "peer id")]
    peer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seed: Option<bool>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Announce {
    interval: u32,
    peers: Vec<Peer>,
    #[serde(with = "serde_value")]
    extra: Value,
}

fn sample() -> Announce {
    Announce {
        interval: 1800,
        peers: vec![Peer {
            ip: "10.0.0.1".into(),
            port: 6881,
            peer_id: "abc".into(),
            seed: None,
        }],
        extra: Value::bytes(vec![0xffu8, 0x00]),
    }
}

const SAMPLE: &[u8] =
    b"d5:extra2:\xff\x008:intervali1800e5:peersld2:ip8:10.0.0.17:peer id3:abc4:porti6881eeee";

#[test]
fn struct_serializes_with_sorted_keys() {
    assert_eq!(to_vec(&sample()).unwrap(), SAMPLE);
}

#[test]
fn struct_deserializes_from_bytes() {
    let back: Announce = from_slice(SAMPLE, DecodeOptions::default()).unwrap();
    assert_eq!(back, sample());
}

#[test]
fn none_fields_are_omitted_even_without_skip_attribute() {
    #[derive(Serialize)]
    struct Plain {
        a: Option<u8>,
        b: u8,
    }
    assert_eq!(to_vec(&Plain { a: None, b: 1 }).unwrap(), b"d1:bi1ee");
    assert_eq!(to_vec(&Plain { a: Some(2), b: 1 }).unwrap(), b"d1:ai2e1:bi1ee");
}

#[test]
fn booleans_are_integers() {
    assert_eq!(to_vec(&true).unwrap(), b"i1e");
    let v = decode(b"i0e", DecodeOptions::default()).unwrap();
    assert!(!from_value::<bool>(&v).unwrap());
    let v = decode(b"i2e", DecodeOptions::default()).unwrap();
    assert!(from_value::<bool>(&v).is_err());
}

#[test]
fn enums_are_externally_tagged() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    enum Event {
        Started,
        Completed { downloaded: u64 },
        Bytes(u32, u32),
    }

    let cases = [
        (Event::Started, &b"7:Started"[..]),
        (
            Event::Completed { downloaded: 5 },
            &b"d9:Completedd10:downloadedi5eee"[..],
        ),
        (Event::Bytes(1, 2), &b"d5:Bytesli1ei2eee"[..]),
    ];
    for (event, bytes) in cases {
        assert_eq!(to_vec(&event).unwrap(), bytes);
        let back: Event = from_slice(bytes, DecodeOptions::default()).unwrap();
        assert_eq!(back, event);
    }
}

#[test]
fn missing_field_maps_to_missing_key() {
    let err = from_slice::<Peer>(b"d2:ip1:xe", DecodeOptions::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingKey);
}

#[test]
fn maps_with_string_keys() {
    let mut m = BTreeMap::new();
    m.insert("b".to_string(), vec![1i64, -1]);
    m.insert("a".to_string(), Vec::new());
    let bytes = to_vec(&m).unwrap();
    assert_eq!(bytes, b"d1:ale1:bli1ei-1eee");
    let back: BTreeMap<String, Vec<i64>> = from_slice(&bytes, DecodeOptions::default()).unwrap();
    assert_eq!(back, m);
}

#[test]
fn large_integers_survive() {
    let v = to_value(&u128::MAX).unwrap();
    assert_eq!(v.encode().unwrap(), b"i340282366920938463463374607431768211455e");
    assert_eq!(from_value::<u128>(&v).unwrap(), u128::MAX);
    assert_eq!(
        from_value::<u64>(&v).unwrap_err().code,
        ErrorCode::IntegerOutOfRange
    );
}

#[test]
fn lenient_input_through_from_slice() {
    let back: BTreeMap<String, u8> =
        from_slice(b"d1:bi2e1:ai1ee", DecodeOptions::lenient()).unwrap();
    let pairs: Vec<(String, u8)> = back.into_iter().collect();
    assert_eq!(pairs, [("a".to_string(), 1), ("b".to_string(), 2)]);
    let err = from_slice::<BTreeMap<String, u8>>(b"d1:bi2e1:ai1ee", DecodeOptions::default())
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsortedKeys);
}
