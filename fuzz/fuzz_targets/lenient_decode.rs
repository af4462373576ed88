#![no_main]

use libfuzzer_sys::fuzz_target;

use strict_bencode::{decode, encode, validate_canonical, DecodeOptions};

fuzz_target!(|data: &[u8]| {
    let max = data.len().min(1 << 20);
    let options = DecodeOptions::lenient()
        .with_max_input_bytes(max)
        .with_max_bytes_len(max)
        .with_max_depth(64)
        .with_max_total_items(1 << 16);
    if let Ok(v) = decode(data, options) {
        // Normalized trees always re-encode to bytes the strict validator accepts.
        let out = encode(&v).expect("re-encode");
        validate_canonical(&out, DecodeOptions::default()).expect("canonical output");
        assert_eq!(decode(&out, DecodeOptions::default()).expect("strict decode"), v);
    }
});
