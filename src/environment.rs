//! One-time host environment check.
//!
//! Length prefixes count raw bytes. The check confirms that the platform can address the lengths
//! this crate computes and that a multi-byte UTF-8 payload travels through the length-prefix path
//! with its byte count, never its character count. The result is cached for the life of the
//! process; [`crate::decode`], [`crate::validate_canonical`] and [`crate::encode`] consult it.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::parse::{Parser, Token};
use crate::{BencodeError, DecodeOptions, ErrorCode};

const UNCHECKED: u8 = 0;
const RUNNING: u8 = 1;
const READY: u8 = 2;
const UNSUPPORTED_PLATFORM: u8 = 3;
const BYTE_LENGTH_MISMATCH: u8 = 4;

static STATE: AtomicU8 = AtomicU8::new(UNCHECKED);

/// "é€𝄞": three characters, nine bytes.
const PROBE_TEXT: &str = "\u{e9}\u{20ac}\u{1d11e}";
const PROBE_CHARS: usize = 3;
const PROBE_FRAME: &[u8] = b"9:\xc3\xa9\xe2\x82\xac\xf0\x9d\x84\x9e";

/// Run the environment check once and return its cached result.
///
/// Safe to call from any thread and any number of times; the probe itself runs at most once per
/// process.
///
/// # Errors
///
/// Returns `UnsupportedPlatform` if `usize` is narrower than 32 bits, or `ByteLengthMismatch` if
/// the probe payload does not round-trip with its byte count.
pub fn init() -> Result<(), BencodeError> {
    loop {
        match STATE.compare_exchange(UNCHECKED, RUNNING, Ordering::Acquire, Ordering::Acquire) {
            Ok(_) => {
                let res = probe();
                let state = match res {
                    Ok(()) => READY,
                    Err(err) => {
                        log::error!("bencode environment check failed: {err}");
                        match err.code {
                            ErrorCode::UnsupportedPlatform => UNSUPPORTED_PLATFORM,
                            _ => BYTE_LENGTH_MISMATCH,
                        }
                    }
                };
                STATE.store(state, Ordering::Release);
                return res;
            }
            Err(RUNNING) => core::hint::spin_loop(),
            Err(state) => return cached(state),
        }
    }
}

/// Returns `true` once [`init`] has completed, successfully or not.
#[must_use]
pub fn is_initialized() -> bool {
    STATE.load(Ordering::Acquire) >= READY
}

const fn cached(state: u8) -> Result<(), BencodeError> {
    match state {
        READY => Ok(()),
        UNSUPPORTED_PLATFORM => Err(BencodeError::new(ErrorCode::UnsupportedPlatform, 0)),
        _ => Err(BencodeError::new(ErrorCode::ByteLengthMismatch, 0)),
    }
}

fn probe() -> Result<(), BencodeError> {
    if usize::BITS < 32 {
        return Err(BencodeError::new(ErrorCode::UnsupportedPlatform, 0));
    }
    let mismatch = BencodeError::new(ErrorCode::ByteLengthMismatch, 0);
    let mut p = Parser::new(PROBE_FRAME, DecodeOptions::default()).map_err(|_| mismatch)?;
    let Ok((Token::Bytes(payload), _)) = p.next_token() else {
        return Err(mismatch);
    };
    let byte_len = PROBE_TEXT.len();
    if payload != PROBE_TEXT.as_bytes()
        || payload.len() != byte_len
        || byte_len == PROBE_CHARS
        || p.finish().is_err()
    {
        return Err(mismatch);
    }
    Ok(())
}
