use std::thread;

use strict_bencode::{environment, validate_canonical, DecodeOptions};

#[test]
fn init_is_idempotent_and_thread_safe() {
    let handles: Vec<_> = (0..8).map(|_| thread::spawn(environment::init)).collect();
    for h in handles {
        assert!(h.join().unwrap().is_ok());
    }
    assert!(environment::is_initialized());
    assert!(environment::init().is_ok());
}

#[test]
fn operations_run_the_guard_implicitly() {
    validate_canonical(b"9:\xc3\xa9\xe2\x82\xac\xf0\x9d\x84\x9e", DecodeOptions::default())
        .unwrap();
    assert!(environment::is_initialized());
}
