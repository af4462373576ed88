#![no_main]

use libfuzzer_sys::fuzz_target;

use strict_bencode::{validate_canonical, DecodeOptions};

fn fuzz_options(input_len: usize) -> DecodeOptions {
    let max = input_len.min(1 << 20);
    DecodeOptions::default()
        .with_max_input_bytes(max)
        .with_max_bytes_len(max)
        .with_max_depth(64)
        .with_max_total_items(1 << 16)
}

fuzz_target!(|data: &[u8]| {
    let _ = validate_canonical(data, fuzz_options(data.len()));
});
