use crate::alloc_util::try_reserve;
use crate::canonical::{CanonicalBytes, CanonicalBytesRef};
use crate::codec::BencodeEncode;
use crate::profile::{
    check_key_order, encoded_bytes_len, DICT_START, END, INT_START, LEN_SEP, LIST_START, MINUS,
};
use crate::value::{BigInt, Integer, Value};
use crate::{BencodeError, ErrorCode};
use alloc::vec::Vec;

trait Sink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BencodeError>;

    fn write_u8(&mut self, byte: u8) -> Result<(), BencodeError> {
        self.write(&[byte])
    }

    fn position(&self) -> usize;
}

struct VecSink {
    buf: Vec<u8>,
}

impl VecSink {
    const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::new();
        // Best effort; every write reserves again and reports `AllocationFailed` itself.
        buf.try_reserve(capacity).ok();
        Self { buf }
    }

    fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    fn reserve(&mut self, additional: usize) -> Result<(), BencodeError> {
        let available = self.buf.capacity().saturating_sub(self.buf.len());
        if additional <= available {
            return Ok(());
        }
        let offset = self.buf.len();
        try_reserve(&mut self.buf, additional, offset)
    }
}

impl Sink for VecSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BencodeError> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn write_u8(&mut self, byte: u8) -> Result<(), BencodeError> {
        if self.buf.len() == self.buf.capacity() {
            self.reserve(1)?;
        }
        self.buf.push(byte);
        Ok(())
    }

    fn position(&self) -> usize {
        self.buf.len()
    }
}

/// Writes the decimal digits of `n` into the tail of `buf` and returns them.
#[allow(clippy::cast_possible_truncation)]
fn format_decimal(mut n: u128, buf: &mut [u8; 39]) -> &[u8] {
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[i..]
}

fn encode_int_parts<S: Sink>(
    sink: &mut S,
    negative: bool,
    digits: &[u8],
) -> Result<(), BencodeError> {
    sink.write_u8(INT_START)?;
    if negative {
        sink.write_u8(MINUS)?;
    }
    sink.write(digits)?;
    sink.write_u8(END)
}

fn encode_i128<S: Sink>(sink: &mut S, v: i128) -> Result<(), BencodeError> {
    let mut buf = [0u8; 39];
    let digits = format_decimal(v.unsigned_abs(), &mut buf);
    encode_int_parts(sink, v < 0, digits)
}

fn encode_big<S: Sink>(sink: &mut S, big: &BigInt) -> Result<(), BencodeError> {
    encode_int_parts(sink, big.is_negative(), big.digits())
}

fn encode_integer<S: Sink>(sink: &mut S, v: &Integer) -> Result<(), BencodeError> {
    match v.repr() {
        Ok(small) => encode_i128(sink, i128::from(small)),
        Err(big) => encode_big(sink, big),
    }
}

fn encode_bytes<S: Sink>(sink: &mut S, bytes: &[u8]) -> Result<(), BencodeError> {
    let mut buf = [0u8; 39];
    sink.write(format_decimal(bytes.len() as u128, &mut buf))?;
    sink.write_u8(LEN_SEP)?;
    sink.write(bytes)
}

enum Work<'a> {
    Value(&'a Value),
    Key(&'a [u8]),
    End,
}

/// Walks `value` without recursion, emitting dictionaries in canonical order.
fn encode_value<S: Sink>(sink: &mut S, value: &Value) -> Result<(), BencodeError> {
    let mut stack: Vec<Work<'_>> = Vec::new();
    stack.push(Work::Value(value));
    while let Some(work) = stack.pop() {
        match work {
            Work::End => sink.write_u8(END)?,
            Work::Key(k) => encode_bytes(sink, k)?,
            Work::Value(Value::Integer(i)) => encode_integer(sink, i)?,
            Work::Value(Value::ByteString(b)) => encode_bytes(sink, b)?,
            Work::Value(Value::List(items)) => {
                sink.write_u8(LIST_START)?;
                crate::alloc_util::try_push(&mut stack, Work::End, sink.position())?;
                try_reserve(&mut stack, items.len(), sink.position())?;
                stack.extend(items.iter().rev().map(Work::Value));
            }
            Work::Value(Value::Dictionary(d)) => {
                sink.write_u8(DICT_START)?;
                crate::alloc_util::try_push(&mut stack, Work::End, sink.position())?;
                let entries = d.canonical_entries();
                let (n, _) = entries.size_hint();
                try_reserve(&mut stack, n.saturating_mul(2), sink.position())?;
                for (k, v) in entries.rev() {
                    stack.push(Work::Value(v));
                    stack.push(Work::Key(k));
                }
            }
        }
    }
    Ok(())
}

/// Exact length of the canonical encoding of `value`, saturating at `usize::MAX`.
pub(crate) fn encoded_len(value: &Value) -> usize {
    let mut total: usize = 0;
    let mut stack: Vec<&Value> = Vec::new();
    stack.push(value);
    while let Some(v) = stack.pop() {
        let here = match v {
            Value::Integer(i) => i.encoded_len(),
            Value::ByteString(b) => encoded_bytes_len(b.len()),
            Value::List(items) => {
                stack.extend(items.iter());
                2
            }
            Value::Dictionary(d) => {
                let mut keys: usize = 2;
                for (k, v) in d.canonical_entries() {
                    keys = keys.saturating_add(encoded_bytes_len(k.len()));
                    stack.push(v);
                }
                keys
            }
        };
        total = total.saturating_add(here);
    }
    total
}

/// Encode `value` into canonical bytes.
///
/// Dictionary entries are emitted sorted by key; when a dictionary records the same key more
/// than once, the last recorded value is emitted.
///
/// # Errors
///
/// Returns a configuration error if the environment guard failed, or `AllocationFailed` /
/// `LengthOverflow` if the output buffer cannot grow.
pub fn encode(value: &Value) -> Result<Vec<u8>, BencodeError> {
    let mut out = Vec::new();
    encode_into(value, &mut out)?;
    Ok(out)
}

/// Append the canonical encoding of `value` to `out`.
///
/// On failure `out` is left as it was.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_into(value: &Value, out: &mut Vec<u8>) -> Result<(), BencodeError> {
    crate::environment::init()?;
    let start = out.len();
    let mut sink = VecSink {
        buf: core::mem::take(out),
    };
    // Best effort, as in `VecSink::with_capacity`.
    sink.reserve(encoded_len(value)).ok();
    let res = encode_value(&mut sink, value);
    *out = sink.into_vec();
    if res.is_err() {
        out.truncate(start);
    }
    res
}

/// Streaming encoder that writes canonical Bencode directly into a `Vec<u8>`.
///
/// This supports splicing validated canonical bytes.
pub struct Encoder {
    sink: VecSink,
    // Complete values written at the current nesting level.
    values: usize,
}

impl Encoder {
    /// Create a new canonical encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sink: VecSink::new(),
            values: 0,
        }
    }

    /// Create a canonical encoder with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sink: VecSink::with_capacity(capacity),
            values: 0,
        }
    }

    /// Return the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sink.buf.len()
    }

    /// Returns `true` if no bytes have been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sink.buf.is_empty()
    }

    /// Consume and return the encoded bytes.
    ///
    /// Nothing checks that exactly one top-level value was written; use
    /// [`Encoder::into_canonical`] when that must hold.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.sink.into_vec()
    }

    /// Consume and return canonical bytes as a `CanonicalBytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer does not contain exactly one canonical Bencode value.
    pub fn into_canonical(self) -> Result<CanonicalBytes, BencodeError> {
        let bytes = self.into_vec();
        let options = crate::DecodeOptions::for_bytes(bytes.len()).with_max_depth(usize::MAX);
        crate::validate_canonical(&bytes, options)?;
        Ok(CanonicalBytes::new_unchecked(bytes))
    }

    fn counted(&mut self, res: Result<(), BencodeError>) -> Result<(), BencodeError> {
        if res.is_ok() {
            self.values += 1;
        }
        res
    }

    /// Borrow the bytes emitted so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.sink.buf
    }

    /// Encode an integer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn int(&mut self, v: i64) -> Result<(), BencodeError> {
        let res = encode_i128(&mut self.sink, i128::from(v));
        self.counted(res)
    }

    /// Encode a signed 128-bit integer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn int_i128(&mut self, v: i128) -> Result<(), BencodeError> {
        let res = encode_i128(&mut self.sink, v);
        self.counted(res)
    }

    /// Encode an unsigned 128-bit integer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn int_u128(&mut self, v: u128) -> Result<(), BencodeError> {
        let mut buf = [0u8; 39];
        let digits = format_decimal(v, &mut buf);
        let res = encode_int_parts(&mut self.sink, false, digits);
        self.counted(res)
    }

    /// Encode an integer outside the `i64` range.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn big_int(&mut self, v: &BigInt) -> Result<(), BencodeError> {
        let res = encode_big(&mut self.sink, v);
        self.counted(res)
    }

    /// Encode an integer of any magnitude.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn integer(&mut self, v: &Integer) -> Result<(), BencodeError> {
        let res = encode_integer(&mut self.sink, v);
        self.counted(res)
    }

    /// Encode a byte string.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn bytes(&mut self, b: &[u8]) -> Result<(), BencodeError> {
        let res = encode_bytes(&mut self.sink, b);
        self.counted(res)
    }

    /// Encode the UTF-8 bytes of `s` as a byte string.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn str(&mut self, s: &str) -> Result<(), BencodeError> {
        let res = encode_bytes(&mut self.sink, s.as_bytes());
        self.counted(res)
    }

    /// Encode an owned value tree, normalizing dictionary order.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails. The partial value is removed.
    pub fn value(&mut self, v: &Value) -> Result<(), BencodeError> {
        let start = self.sink.buf.len();
        let res = encode_value(&mut self.sink, v).map_err(|err| {
            self.sink.buf.truncate(start);
            err
        });
        self.counted(res)
    }

    /// Splice already validated canonical bytes as the next value.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn raw(&mut self, v: CanonicalBytesRef<'_>) -> Result<(), BencodeError> {
        let res = self.sink.write(v.as_bytes());
        self.counted(res)
    }

    /// Encode a list and fill it via the provided builder.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails. The partial list is removed.
    pub fn list<F>(&mut self, f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), BencodeError>,
    {
        let start = self.sink.buf.len();
        let outer = core::mem::replace(&mut self.values, 0);
        let res = self
            .sink
            .write_u8(LIST_START)
            .and_then(|()| f(self))
            .and_then(|()| self.sink.write_u8(END));
        self.values = outer;
        if res.is_err() {
            self.sink.buf.truncate(start);
        }
        self.counted(res)
    }

    /// Encode a dictionary and fill it via the provided builder.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or keys are not strictly ascending. The partial
    /// dictionary is removed.
    pub fn dict<F>(&mut self, f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut DictEncoder<'_>) -> Result<(), BencodeError>,
    {
        let start = self.sink.buf.len();
        if let Err(err) = self.sink.write_u8(DICT_START) {
            self.sink.buf.truncate(start);
            return Err(err);
        }
        let mut d = DictEncoder {
            enc: self,
            prev_key_range: None,
        };
        if let Err(err) = f(&mut d) {
            self.sink.buf.truncate(start);
            return Err(err);
        }
        if let Err(err) = self.sink.write_u8(END) {
            self.sink.buf.truncate(start);
            return Err(err);
        }
        self.values += 1;
        Ok(())
    }

    /// Encode any value implementing [`BencodeEncode`].
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode<T: BencodeEncode + ?Sized>(&mut self, v: &T) -> Result<(), BencodeError> {
        v.encode(self)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for writing dictionary entries into a canonical Bencode stream.
///
/// Keys must be written in strictly ascending byte order.
pub struct DictEncoder<'a> {
    enc: &'a mut Encoder,
    prev_key_range: Option<(usize, usize)>,
}

impl DictEncoder<'_> {
    fn fail_entry<T>(&mut self, entry_start: usize, err: BencodeError) -> Result<T, BencodeError> {
        self.enc.sink.buf.truncate(entry_start);
        Err(err)
    }

    /// Insert a dictionary entry. Keys must be in canonical order; duplicates are rejected.
    ///
    /// The builder must write exactly one value.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails, if keys are out of order, if duplicates are found, or
    /// `EntryValueCount` if the builder wrote no value or several.
    pub fn entry<F>(&mut self, key: &[u8], f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), BencodeError>,
    {
        let entry_start = self.enc.sink.buf.len();
        if let Err(err) = encode_bytes(&mut self.enc.sink, key) {
            return self.fail_entry(entry_start, err);
        }
        let key_end = self.enc.sink.buf.len();
        let key_start = key_end - key.len();
        if let Some((ps, pe)) = self.prev_key_range {
            let buf = &self.enc.sink.buf;
            if let Err(code) = check_key_order(&buf[ps..pe], &buf[key_start..key_end]) {
                return self.fail_entry(entry_start, BencodeError::new(code, entry_start));
            }
        }
        let outer = core::mem::replace(&mut self.enc.values, 0);
        let res = f(self.enc);
        let written = core::mem::replace(&mut self.enc.values, outer);
        if let Err(err) = res {
            return self.fail_entry(entry_start, err);
        }
        if written != 1 {
            let err = BencodeError::new(ErrorCode::EntryValueCount, key_end);
            return self.fail_entry(entry_start, err);
        }
        self.prev_key_range = Some((key_start, key_end));
        Ok(())
    }

    /// Insert a dictionary entry keyed by the UTF-8 bytes of `key`.
    ///
    /// # Errors
    ///
    /// See [`DictEncoder::entry`].
    pub fn entry_str<F>(&mut self, key: &str, f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), BencodeError>,
    {
        self.entry(key.as_bytes(), f)
    }

    /// Insert a dictionary entry whose value implements [`BencodeEncode`].
    ///
    /// # Errors
    ///
    /// See [`DictEncoder::entry`].
    pub fn field<T: BencodeEncode + ?Sized>(
        &mut self,
        key: &[u8],
        value: &T,
    ) -> Result<(), BencodeError> {
        self.entry(key, |enc| value.encode(enc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Dictionary;
    use crate::ErrorCode;

    #[test]
    fn integers_use_minimal_decimal() {
        let mut enc = Encoder::new();
        enc.int(0).unwrap();
        enc.int(-42).unwrap();
        enc.int(i64::MIN).unwrap();
        enc.int_u128(u128::MAX).unwrap();
        assert_eq!(
            enc.as_bytes(),
            b"i0ei-42ei-9223372036854775808ei340282366920938463463374607431768211455e"
        );
    }

    #[test]
    fn dict_builder_rejects_out_of_order_and_truncates() {
        let mut enc = Encoder::new();
        let err = enc
            .dict(|d| {
                d.entry(b"b", |e| e.int(1))?;
                d.entry(b"a", |e| e.int(2))
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsortedKeys);
        assert!(enc.is_empty());

        let err = enc
            .dict(|d| {
                d.entry(b"a", |e| e.int(1))?;
                d.entry(b"a", |e| e.int(2))
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateKey);
        assert!(enc.is_empty());
    }

    #[test]
    fn failed_entry_value_is_removed() {
        let mut enc = Encoder::new();
        enc.dict(|d| {
            d.entry(b"a", |e| e.int(1))?;
            let res = d.entry(b"b", |e| {
                e.int(2)?;
                Err(BencodeError::new(ErrorCode::Unsupported, 0))
            });
            assert!(res.is_err());
            d.entry(b"c", |e| e.int(3))
        })
        .unwrap();
        assert_eq!(enc.as_bytes(), b"d1:ai1e1:ci3ee");
    }

    #[test]
    fn encode_normalizes_unordered_dictionary() {
        let d = Dictionary::from_unordered(vec![
            (b"spam".to_vec(), Value::str("eggs")),
            (b"cow".to_vec(), Value::str("moo")),
            (b"spam".to_vec(), Value::str("ham")),
        ]);
        let v = Value::Dictionary(d);
        let bytes = encode(&v).unwrap();
        assert_eq!(bytes, b"d3:cow3:moo4:spam3:hame");
        assert_eq!(encoded_len(&v), bytes.len());
    }

    #[test]
    fn encode_into_appends() {
        let mut out = b"xx".to_vec();
        encode_into(&Value::list(vec![Value::int(1)]), &mut out).unwrap();
        assert_eq!(out, b"xxli1ee");
    }

    #[test]
    fn into_canonical_rejects_multiple_values() {
        let mut enc = Encoder::new();
        enc.int(1).unwrap();
        enc.int(2).unwrap();
        let err = enc.into_canonical().unwrap_err();
        assert_eq!(err.code, ErrorCode::TrailingBytes);
    }

    #[test]
    fn dict_entry_must_write_exactly_one_value() {
        let mut enc = Encoder::new();
        let err = enc.dict(|d| d.entry(b"a", |_| Ok(()))).unwrap_err();
        assert_eq!((err.code, err.offset), (ErrorCode::EntryValueCount, 4));
        assert!(enc.is_empty());

        let err = enc
            .dict(|d| {
                d.entry(b"a", |e| {
                    e.int(1)?;
                    e.int(2)
                })
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EntryValueCount);
        assert!(enc.is_empty());

        enc.dict(|d| {
            d.entry(b"a", |e| {
                e.list(|l| {
                    l.int(1)?;
                    l.int(2)
                })
            })?;
            d.entry(b"b", |e| e.dict(|_| Ok(())))
        })
        .unwrap();
        assert_eq!(enc.as_bytes(), b"d1:ali1ei2ee1:bdee");
    }
}
