//! # strict-bencode
//!
//! Strict, deterministic Bencode decoding and canonical encoding.
//!
//! ## Design principles
//!
//! - **Canonical bytes are the value.**
//!   Every value has exactly one canonical encoding, so semantic equality reduces to
//!   **byte equality** and canonical bytes can be hashed for content addressing.
//! - **Hot-path validation is allocation-free.**
//!   Use [`validate_canonical`] to check a single value against the canonical rules and get a
//!   borrowed [`CanonicalBytesRef`] witness.
//! - **Encoding is streaming-first.**
//!   Use [`Encoder`] or the typed [`BencodeEncode`] layer to emit canonical bytes without building
//!   an owned tree.
//!
//! ## Wire format
//!
//! - Integer: `i<digits>e`, optional leading `-`. No `+`, no leading zeros, no `-0`.
//! - Byte string: `<len>:<bytes>`, where `len` is the byte count with no leading zeros.
//! - List: `l<items>e`.
//! - Dictionary: `d<key><value>...e`, keys are byte strings, unique and strictly ascending by
//!   unsigned byte comparison.
//! - Exactly one top-level value, no trailing bytes, no whitespace.
//!
//! Integers are unbounded; values outside `i64` are carried as [`BigInt`].
//!
//! ## Strict and lenient decoding
//!
//! [`decode`] is strict by default and rejects unsorted or duplicate dictionary keys.
//! [`DecodeOptions::lenient`] normalizes such dictionaries instead (sorted, last duplicate wins);
//! every other canonical rule still applies. [`encode`] always emits canonical order.
//!
//! ```
//! use strict_bencode::{decode, DecodeOptions, Value};
//!
//! # fn main() -> Result<(), strict_bencode::BencodeError> {
//! let v = decode(b"d3:cow3:moo4:spam4:eggse", DecodeOptions::default())?;
//! assert_eq!(v.get("cow").and_then(Value::as_str), Some("moo"));
//! assert_eq!(v.encode()?, b"d3:cow3:moo4:spam4:eggse");
//! # Ok(()) }
//! ```
//!
//! ## Feature flags
//!
//! - `std` *(default)*: implements `std::error::Error` for [`BencodeError`] and enables [`io`].
//! - `alloc` *(default)*: enables the owned value tree, encoders and owned canonical bytes.
//! - `sha2` *(default)*: enables SHA-256 hashing helpers for canonical bytes.
//! - `serde`: enables the serde bridge (`to_vec`, `from_slice`, `to_value`, `from_value`).
//! - `simdutf8`: enables SIMD-accelerated UTF-8 validation where supported.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible.
//! - Validation-only usage works without `alloc`.
//! - Owned APIs require `alloc` and therefore an allocator provided by your environment.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
mod alloc_util;
mod canonical;
mod codec;
pub mod environment;
mod error;
mod limits;
mod parse;
mod profile;
mod scanner;
pub(crate) mod utf8;

#[cfg(feature = "alloc")]
mod encode;
#[cfg(all(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod io;
#[cfg(feature = "alloc")]
mod macros;
#[cfg(feature = "serde")]
mod serde_impl;
#[cfg(feature = "alloc")]
mod validate;
#[cfg(feature = "alloc")]
mod value;

pub use crate::canonical::CanonicalBytesRef;
pub use crate::codec::{
    decode_as, decode_canonical, BencodeDecode, BencodeKind, BencodeListElem, Decoder,
};
pub use crate::error::{BencodeError, ErrorCode, ErrorKind};
pub use crate::limits::{DecodeOptions, DEFAULT_MAX_DEPTH};
pub use crate::parse::{validate_bytes, validate_canonical};
pub use crate::scanner::ByteScanner;

#[cfg(feature = "alloc")]
pub use crate::canonical::CanonicalBytes;
#[cfg(feature = "alloc")]
pub use crate::codec::{encode_to_canonical, encode_to_vec, BencodeEncode};
#[cfg(feature = "alloc")]
pub use crate::encode::{encode, encode_into, DictEncoder, Encoder};
#[cfg(feature = "alloc")]
#[doc(hidden)]
pub use crate::macros::__bencode_macro;
#[cfg(feature = "alloc")]
pub use crate::parse::decode;
#[cfg(feature = "alloc")]
pub use crate::validate::validate;
#[cfg(feature = "alloc")]
pub use crate::value::{BigInt, Dictionary, Integer, Value};

#[cfg(feature = "serde")]
pub use crate::serde_impl::{from_slice, from_value, serde_value, to_value, to_vec};

pub use strict_bencode_derive::{BencodeDecode, BencodeEncode};
