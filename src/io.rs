//! File and stream helpers.
//!
//! Codec failures surface as [`std::io::Error`] of kind [`std::io::ErrorKind::InvalidData`]
//! wrapping the [`BencodeError`](crate::BencodeError).

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::{DecodeOptions, Value};

/// Encode `value` canonically and write it to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an I/O error, or `InvalidData` if encoding fails.
pub fn dump<P: AsRef<Path>>(path: P, value: &Value) -> io::Result<()> {
    let bytes = crate::encode(value)?;
    fs::write(path, bytes)
}

/// Read `path` and decode its whole contents as a single value.
///
/// # Errors
///
/// Returns an I/O error, or `InvalidData` if the contents do not decode under `options`.
pub fn load<P: AsRef<Path>>(path: P, options: DecodeOptions) -> io::Result<Value> {
    let file = fs::File::open(path)?;
    read_from(file, options)
}

/// Encode `value` canonically into `writer`.
///
/// # Errors
///
/// Returns an I/O error, or `InvalidData` if encoding fails.
pub fn write_to<W: Write>(mut writer: W, value: &Value) -> io::Result<()> {
    let bytes = crate::encode(value)?;
    writer.write_all(&bytes)
}

/// Read `reader` to the end and decode its contents as a single value.
///
/// At most `options.max_input_bytes + 1` bytes are read, so an oversized stream fails with
/// `InputLenLimitExceeded` without being buffered in full.
///
/// # Errors
///
/// Returns an I/O error, or `InvalidData` if the contents do not decode under `options`.
pub fn read_from<R: Read>(reader: R, options: DecodeOptions) -> io::Result<Value> {
    let cap = u64::try_from(options.max_input_bytes)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(cap).read_to_end(&mut bytes)?;
    Ok(crate::decode(&bytes, options)?)
}
