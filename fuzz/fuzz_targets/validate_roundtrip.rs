#![no_main]

use libfuzzer_sys::fuzz_target;

use strict_bencode::{decode, encode, validate_canonical, DecodeOptions};

fn fuzz_options(input_len: usize) -> DecodeOptions {
    let max = input_len.min(1 << 20);
    DecodeOptions::default()
        .with_max_input_bytes(max)
        .with_max_bytes_len(max)
        .with_max_depth(64)
        .with_max_total_items(1 << 16)
}

fuzz_target!(|data: &[u8]| {
    let options = fuzz_options(data.len());
    match (validate_canonical(data, options), decode(data, options)) {
        (Ok(canon), Ok(v)) => {
            let out = encode(&v).expect("re-encode");
            assert_eq!(out, canon.as_bytes());
            assert_eq!(canon.sha256(), v.sha256().expect("hash"));
        }
        (Err(a), Err(b)) => assert_eq!((a.code, a.offset), (b.code, b.offset)),
        (a, b) => panic!("validate {:?} disagrees with decode {:?}", a.map(|_| ()), b.map(|_| ())),
    }
});
