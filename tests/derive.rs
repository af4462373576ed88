#![cfg(feature = "alloc")]

use strict_bencode::{
    decode_as, encode_to_vec, BencodeDecode, BencodeEncode, DecodeOptions, ErrorCode,
};

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
struct FileEntry {
    path: Vec<String>,
    length: u64,
}

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
struct Info {
    name: String,
    #[bencode(rename = "piece length")]
    piece_length: u32,
    pieces: Vec<u8>,
    files: Vec<FileEntry>,
    private: Option<bool>,
    #[bencode(skip)]
    cached_hash: Option<[u8; 4]>,
}

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
struct Torrent {
    announce: String,
    info: Info,
    #[bencode(rename = "creation date", default)]
    creation_date: i64,
}

fn sample() -> Torrent {
    Torrent {
        announce: "http://tracker/announce".into(),
        info: Info {
            name: "dir".into(),
            piece_length: 16_384,
            pieces: vec![0xde, 0xad, 0xbe, 0xef],
            files: vec![FileEntry {
                path: vec!["a".into(), "b.txt".into()],
                length: 3,
            }],
            private: None,
            cached_hash: None,
        },
        creation_date: 1_700_000_000,
    }
}

const SAMPLE: &[u8] = b"d8:announce23:http://tracker/announce13:creation datei1700000000e\
4:infod5:filesld6:lengthi3e4:pathl1:a5:b.txteee4:name3:dir12:piece lengthi16384e\
6:pieces4:\xde\xad\xbe\xefee";

#[test]
fn named_struct_keys_are_sorted_by_bytes() {
    assert_eq!(encode_to_vec(&sample()).unwrap(), SAMPLE);
}

#[test]
fn derived_decode_roundtrips() {
    let back: Torrent = decode_as(SAMPLE, DecodeOptions::default()).unwrap();
    assert_eq!(back, sample());
}

#[test]
fn option_field_is_present_when_some() {
    let mut t = sample();
    t.info.private = Some(true);
    let bytes = encode_to_vec(&t).unwrap();
    let needle: &[u8] = b"7:privatei1e";
    assert!(bytes.windows(needle.len()).any(|w| w == needle));
    let back: Torrent = decode_as(&bytes, DecodeOptions::default()).unwrap();
    assert_eq!(back.info.private, Some(true));
}

#[test]
fn default_field_may_be_absent() {
    let bytes = b"d8:announce1:x4:infod5:filesle4:name0:12:piece lengthi1e6:pieces0:ee";
    let t: Torrent = decode_as(bytes, DecodeOptions::default()).unwrap();
    assert_eq!(t.creation_date, 0);
    assert_eq!(t.info.private, None);
}

#[test]
fn missing_required_key_is_reported() {
    let err = decode_as::<FileEntry>(b"d6:lengthi3ee", DecodeOptions::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingKey);
}

#[test]
fn unknown_keys_are_skipped() {
    let v: FileEntry = decode_as(
        b"d5:extrali1ei2ee6:lengthi3e4:pathl1:aee",
        DecodeOptions::default(),
    )
    .unwrap();
    assert_eq!(v.length, 3);
    assert_eq!(v.path, vec!["a".to_string()]);
}

#[test]
fn wrong_shape_is_reported() {
    let err = decode_as::<FileEntry>(b"l1:ae", DecodeOptions::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::ExpectedDict);
}

#[test]
fn unsorted_input_is_rejected_before_typed_decoding() {
    let err = decode_as::<FileEntry>(b"d4:pathle6:lengthi3ee", DecodeOptions::default())
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsortedKeys);
}

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
struct Pair(i32, String);

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
struct Wrapper(u16);

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
struct Marker;

#[test]
fn tuple_newtype_and_unit_structs() {
    assert_eq!(encode_to_vec(&Pair(-1, "x".into())).unwrap(), b"li-1e1:xe");
    assert_eq!(encode_to_vec(&Wrapper(9)).unwrap(), b"i9e");
    assert_eq!(encode_to_vec(&Marker).unwrap(), b"le");

    let p: Pair = decode_as(b"li-1e1:xe", DecodeOptions::default()).unwrap();
    assert_eq!(p, Pair(-1, "x".into()));
    let w: Wrapper = decode_as(b"i9e", DecodeOptions::default()).unwrap();
    assert_eq!(w, Wrapper(9));
    let m: Marker = decode_as(b"le", DecodeOptions::default()).unwrap();
    assert_eq!(m, Marker);
}

#[test]
fn tuple_length_must_match() {
    let err = decode_as::<Pair>(b"li1ee", DecodeOptions::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::ListLenMismatch);
    let err = decode_as::<Pair>(b"li1e1:x1:ye", DecodeOptions::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::ListLenMismatch);
    let err = decode_as::<Wrapper>(b"i70000e", DecodeOptions::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::IntegerOutOfRange);
}

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
enum Message {
    Ping,
    #[bencode(rename = "have")]
    Have(u32),
    Request(u32, u32, u32),
    Piece { index: u32, data: Vec<u8> },
}

#[test]
fn enum_representations() {
    let cases: Vec<(Message, &[u8])> = vec![
        (Message::Ping, &b"4:Ping"[..]),
        (Message::Have(7), &b"d4:havei7ee"[..]),
        (Message::Request(1, 2, 3), &b"d7:Requestli1ei2ei3eee"[..]),
        (
            Message::Piece {
                index: 4,
                data: b"xy".to_vec(),
            },
            &b"d5:Pieced4:data2:xy5:indexi4eee"[..],
        ),
    ];
    for (msg, bytes) in cases {
        assert_eq!(encode_to_vec(&msg).unwrap(), bytes);
        let back: Message = decode_as(bytes, DecodeOptions::default()).unwrap();
        assert_eq!(back, msg);
    }
}

#[test]
fn enum_rejects_unknown_or_ambiguous_forms() {
    let opts = DecodeOptions::default();
    let code = |bytes: &[u8]| decode_as::<Message>(bytes, opts).unwrap_err().code;
    assert_eq!(code(b"4:Pong"), ErrorCode::UnknownVariant);
    assert_eq!(code(b"d4:Pongi1ee"), ErrorCode::UnknownVariant);
    assert_eq!(code(b"d4:havei1e4:more0:e"), ErrorCode::UnknownVariant);
    assert_eq!(code(b"de"), ErrorCode::UnknownVariant);
    assert_eq!(code(b"i1e"), ErrorCode::UnknownVariant);
}

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
struct Node {
    label: String,
    children: Vec<Node>,
}

#[test]
fn recursive_types_derive() {
    let tree = Node {
        label: "root".into(),
        children: vec![Node {
            label: "leaf".into(),
            children: Vec::new(),
        }],
    };
    let bytes = encode_to_vec(&tree).unwrap();
    assert_eq!(
        bytes,
        b"d8:childrenld8:childrenle5:label4:leafee5:label4:roote"
    );
    let back: Node = decode_as(&bytes, DecodeOptions::default()).unwrap();
    assert_eq!(back, tree);
}

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
struct Borrowed<'a> {
    name: &'a str,
    raw: &'a [u8],
}

#[test]
fn borrowed_fields_point_into_the_input() {
    let input = b"d4:name2:hi3:raw2:\x00\x01e";
    let b: Borrowed<'_> = decode_as(input, DecodeOptions::default()).unwrap();
    assert_eq!(b.name, "hi");
    assert_eq!(b.raw, b"\x00\x01");
    assert_eq!(encode_to_vec(&b).unwrap(), input);
}

#[derive(Debug, PartialEq, BencodeEncode, BencodeDecode)]
struct Generic<T> {
    value: T,
}

#[test]
fn generic_structs_bound_their_parameters() {
    let g = Generic { value: vec![1i64, 2] };
    let bytes = encode_to_vec(&g).unwrap();
    assert_eq!(bytes, b"d5:valueli1ei2eee");
    let back: Generic<Vec<i64>> = decode_as(&bytes, DecodeOptions::default()).unwrap();
    assert_eq!(back, g);
}
