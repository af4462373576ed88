#[cfg(feature = "alloc")]
use strict_bencode::decode;
use strict_bencode::{validate_bytes, validate_canonical, DecodeOptions, ErrorCode, ErrorKind};

fn assert_invalid(bytes: &[u8], options: DecodeOptions, code: ErrorCode) -> usize {
    let err = validate_canonical(bytes, options).unwrap_err();
    assert_eq!(err.code, code, "input {bytes:?}");
    err.offset
}

#[cfg(feature = "alloc")]
fn assert_decode_validate_match(bytes: &[u8], options: DecodeOptions, code: ErrorCode) {
    let v_err = validate_canonical(bytes, options).unwrap_err();
    let d_err = decode(bytes, options).unwrap_err();
    assert_eq!(v_err.code, code, "input {bytes:?}");
    assert_eq!(d_err.code, code, "input {bytes:?}");
    assert_eq!(v_err.offset, d_err.offset, "input {bytes:?}");
}

const VECTORS: &[(&[u8], ErrorCode, usize)] = &[
    (b"", ErrorCode::EmptyInput, 0),
    (b"i-0e", ErrorCode::NegativeZero, 0),
    (b"i00e", ErrorCode::LeadingZero, 0),
    (b"i-01e", ErrorCode::LeadingZero, 0),
    (b"i+1e", ErrorCode::InvalidInteger, 0),
    (b"ie", ErrorCode::InvalidInteger, 0),
    (b"i-e", ErrorCode::InvalidInteger, 0),
    (b"i1.5e", ErrorCode::InvalidInteger, 2),
    (b"i 1e", ErrorCode::InvalidInteger, 0),
    (b"i42", ErrorCode::UnexpectedEof, 3),
    (b"01:a", ErrorCode::InvalidLength, 0),
    (b"1a", ErrorCode::InvalidLength, 1),
    (b"-1:a", ErrorCode::UnexpectedByte, 0),
    (b"5:abc", ErrorCode::UnexpectedEof, 2),
    (b"l", ErrorCode::UnexpectedEof, 1),
    (b"li1e", ErrorCode::UnexpectedEof, 4),
    (b"d", ErrorCode::UnexpectedEof, 1),
    (b"d1:a", ErrorCode::UnexpectedEof, 4),
    (b"e", ErrorCode::UnexpectedByte, 0),
    (b" i1e", ErrorCode::UnexpectedByte, 0),
    (b"x", ErrorCode::UnexpectedByte, 0),
    (b"i1ei2e", ErrorCode::TrailingBytes, 3),
    (b"le ", ErrorCode::TrailingBytes, 2),
    (b"di1ei2ee", ErrorCode::DictKeyMustBeBytes, 1),
    (b"dle0:e", ErrorCode::DictKeyMustBeBytes, 1),
    (b"d1:ae", ErrorCode::UnexpectedByte, 4),
    (b"d1:b0:1:a0:e", ErrorCode::UnsortedKeys, 6),
    (b"d1:a0:1:a0:e", ErrorCode::DuplicateKey, 6),
    (b"d2:ab0:1:a0:e", ErrorCode::UnsortedKeys, 7),
    (b"ld1:b0:1:a0:ee", ErrorCode::UnsortedKeys, 7),
];

#[test]
fn rejects_every_vector_at_the_expected_offset() {
    for &(input, code, offset) in VECTORS {
        let got = assert_invalid(input, DecodeOptions::default(), code);
        assert_eq!(got, offset, "input {input:?}");
    }
}

#[cfg(feature = "alloc")]
#[test]
fn decode_and_validate_agree_on_every_vector() {
    for &(input, code, _) in VECTORS {
        assert_decode_validate_match(input, DecodeOptions::default(), code);
    }
}

#[test]
fn error_kinds_follow_the_taxonomy() {
    let kind = |input: &[u8]| {
        validate_canonical(input, DecodeOptions::default())
            .unwrap_err()
            .kind()
    };
    assert_eq!(kind(b"i-0e"), ErrorKind::Syntax);
    assert_eq!(kind(b"i1ei2e"), ErrorKind::Syntax);
    assert_eq!(kind(b"4:sp"), ErrorKind::Bounds);
    assert_eq!(kind(b"d1:b0:1:a0:e"), ErrorKind::Validation);
    assert_eq!(kind(b""), ErrorKind::Validation);
    let err = validate_canonical(b"lle", DecodeOptions::default().with_max_depth(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DepthExceeded);
}

#[test]
fn accepts_canonical_documents() {
    let docs: &[&[u8]] = &[
        b"i0e",
        b"i-9223372036854775809e",
        b"0:",
        b"le",
        b"de",
        b"d0:0:e",
        b"d1:\x00i1e1:\xffi2ee",
        b"d3:bar4:spam3:fooi42ee",
        b"d8:announce3:url4:infod6:lengthi1e4:name1:x12:piece lengthi16384eee",
    ];
    for &doc in docs {
        let canon = validate_canonical(doc, DecodeOptions::default()).unwrap();
        assert_eq!(canon.as_bytes(), doc);
        assert!(validate_bytes(doc, DecodeOptions::for_bytes(doc.len())).is_ok());
    }
}

#[test]
fn key_order_is_unsigned_bytewise() {
    // 0x7f sorts before 0x80 and a prefix sorts before its extensions.
    assert!(validate_bytes(b"d1:\x7fi1e1:\x80i2ee", DecodeOptions::default()).is_ok());
    assert!(validate_bytes(b"d1:a0:2:aa0:e", DecodeOptions::default()).is_ok());
    assert_invalid(b"d1:\x80i1e1:\x7fi2ee", DecodeOptions::default(), ErrorCode::UnsortedKeys);
    assert_invalid(b"d2:aa0:1:a0:e", DecodeOptions::default(), ErrorCode::UnsortedKeys);
}

#[test]
fn validate_is_always_strict() {
    let lenient = DecodeOptions::lenient();
    assert_invalid(b"d1:b0:1:a0:e", lenient, ErrorCode::UnsortedKeys);
    assert_invalid(b"d1:a0:1:a0:e", lenient, ErrorCode::DuplicateKey);
}

#[test]
fn limits_are_enforced() {
    let opts = DecodeOptions::default().with_max_input_bytes(3);
    assert_eq!(
        assert_invalid(b"4:spam", opts.with_max_bytes_len(3), ErrorCode::InputLenLimitExceeded),
        0
    );

    let opts = DecodeOptions::default().with_max_bytes_len(3);
    assert_eq!(
        assert_invalid(b"l4:spame", opts, ErrorCode::BytesLenLimitExceeded),
        1
    );
    assert!(validate_bytes(b"l3:spae", opts).is_ok());

    let opts = DecodeOptions::default().with_max_total_items(3);
    assert_eq!(
        assert_invalid(b"li1ei2ei3ee", opts, ErrorCode::TotalItemsLimitExceeded),
        7
    );
    assert!(validate_bytes(b"li1ei2ee", opts).is_ok());
}

#[test]
fn options_admitting_no_value_are_a_configuration_error() {
    let opts = DecodeOptions::default().with_max_total_items(0);
    let err = validate_canonical(b"i1e", opts).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidOptions);
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn input_cap_alone_leaves_byte_strings_bounded_by_input() {
    let opts = DecodeOptions::default().with_max_input_bytes(1 << 20);
    assert!(validate_bytes(b"i1e", opts).is_ok());
    assert!(validate_bytes(b"l4:spame", opts).is_ok());
    let tight = DecodeOptions::default().with_max_input_bytes(2);
    assert_eq!(
        assert_invalid(b"i1e", tight, ErrorCode::InputLenLimitExceeded),
        0
    );
    assert_eq!(assert_invalid(b"9:ab", opts, ErrorCode::UnexpectedEof), 2);
}

#[cfg(feature = "alloc")]
#[test]
fn decode_accepts_an_input_cap_without_a_byte_string_cap() {
    let v = decode(b"d3:cow3:mooe", DecodeOptions::default().with_max_input_bytes(64)).unwrap();
    assert_eq!(v.get("cow").and_then(strict_bencode::Value::as_str), Some("moo"));
}

#[test]
fn huge_length_prefix_overflows_without_panicking() {
    let err = validate_canonical(b"99999999999999999999999999:x", DecodeOptions::default())
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::LengthOverflow);
    assert_eq!(err.offset, 0);
}

#[test]
fn depth_limit_counts_containers() {
    let opts = DecodeOptions::default().with_max_depth(2);
    assert!(validate_bytes(b"ld1:ai1eee", opts).is_ok());
    assert_eq!(assert_invalid(b"ld1:aleee", opts, ErrorCode::DepthLimitExceeded), 5);
    assert_eq!(
        assert_invalid(b"le", opts.with_max_depth(0), ErrorCode::DepthLimitExceeded),
        0
    );
}
