#[cfg(feature = "alloc")]
use alloc::collections::BTreeMap;
#[cfg(feature = "alloc")]
use alloc::string::String;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::canonical::CanonicalBytesRef;
use crate::parse::{validate_canonical, Parser, Token};
use crate::profile::{parse_i64, parse_u128, DICT_START, END, INT_START, LIST_START};
use crate::{BencodeError, DecodeOptions, ErrorCode};

#[cfg(feature = "alloc")]
use crate::encode::Encoder;
#[cfg(feature = "alloc")]
use crate::value::{BigInt, Integer, Value};
#[cfg(feature = "alloc")]
use crate::CanonicalBytes;

/// The shape of a Bencode value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BencodeKind {
    /// `i...e`
    Integer,
    /// `<len>:<bytes>`
    ByteString,
    /// `l...e`
    List,
    /// `d...e`
    Dictionary,
}

/// Streaming decoder over canonical Bencode bytes.
///
/// The decoder enforces token syntax, size limits and the depth limit, but does not re-check
/// dictionary key order; [`decode_as`] validates the whole input before decoding.
pub struct Decoder<'de> {
    parser: Parser<'de>,
    depth: usize,
}

impl<'de> Decoder<'de> {
    /// Construct a decoder over canonical bytes with the provided options.
    ///
    /// # Errors
    ///
    /// Returns `InputLenLimitExceeded` if `bytes` exceeds the input limit, `EmptyInput` for empty
    /// input, or `InvalidOptions` for inconsistent options.
    pub fn new(bytes: &'de [u8], options: DecodeOptions) -> Result<Self, BencodeError> {
        Ok(Self {
            parser: Parser::new(bytes, options)?,
            depth: 0,
        })
    }

    /// Return the current byte offset in the input.
    #[must_use]
    #[inline]
    pub const fn position(&self) -> usize {
        self.parser.position()
    }

    /// Current container nesting depth.
    #[must_use]
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    fn err(&self, code: ErrorCode) -> BencodeError {
        BencodeError::new(code, self.parser.position())
    }

    /// Peek at the kind of the next value without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` at the end of input or `UnexpectedByte` if no value starts here.
    pub fn peek_kind(&self) -> Result<BencodeKind, BencodeError> {
        match self.parser.peek() {
            Some(INT_START) => Ok(BencodeKind::Integer),
            Some(b'0'..=b'9') => Ok(BencodeKind::ByteString),
            Some(LIST_START) => Ok(BencodeKind::List),
            Some(DICT_START) => Ok(BencodeKind::Dictionary),
            Some(_) => Err(self.err(ErrorCode::UnexpectedByte)),
            None => Err(self.err(ErrorCode::UnexpectedEof)),
        }
    }

    fn int_token(&mut self) -> Result<(bool, &'de [u8], usize), BencodeError> {
        match self.parser.next_token()? {
            (Token::Int { negative, digits }, off) => Ok((negative, digits, off)),
            (_, off) => Err(BencodeError::new(ErrorCode::ExpectedInteger, off)),
        }
    }

    /// Decode an integer that fits in `i64`.
    ///
    /// # Errors
    ///
    /// Returns `ExpectedInteger` for another shape, `IntegerOutOfRange` if the value does not fit.
    pub fn int(&mut self) -> Result<i64, BencodeError> {
        let (negative, digits, off) = self.int_token()?;
        parse_i64(negative, digits)
            .ok_or_else(|| BencodeError::new(ErrorCode::IntegerOutOfRange, off))
    }

    /// Decode an integer that fits in `i128`.
    ///
    /// # Errors
    ///
    /// Returns `ExpectedInteger` for another shape, `IntegerOutOfRange` if the value does not fit.
    pub fn int_i128(&mut self) -> Result<i128, BencodeError> {
        let (negative, digits, off) = self.int_token()?;
        let out_of_range = || BencodeError::new(ErrorCode::IntegerOutOfRange, off);
        let magnitude = parse_u128(digits).ok_or_else(out_of_range)?;
        if negative {
            0_i128.checked_sub_unsigned(magnitude).ok_or_else(out_of_range)
        } else {
            i128::try_from(magnitude).map_err(|_| out_of_range())
        }
    }

    /// Decode a non-negative integer that fits in `u128`.
    ///
    /// # Errors
    ///
    /// Returns `ExpectedInteger` for another shape, `IntegerOutOfRange` if the value does not fit.
    pub fn int_u128(&mut self) -> Result<u128, BencodeError> {
        let (negative, digits, off) = self.int_token()?;
        if negative {
            return Err(BencodeError::new(ErrorCode::IntegerOutOfRange, off));
        }
        parse_u128(digits).ok_or_else(|| BencodeError::new(ErrorCode::IntegerOutOfRange, off))
    }

    /// Decode an integer of any magnitude.
    ///
    /// # Errors
    ///
    /// Returns `ExpectedInteger` for another shape or `AllocationFailed`.
    #[cfg(feature = "alloc")]
    pub fn integer(&mut self) -> Result<Integer, BencodeError> {
        let (negative, digits, off) = self.int_token()?;
        if let Some(v) = parse_i64(negative, digits) {
            return Ok(Integer::new(v));
        }
        let digits = crate::alloc_util::try_vec_from_slice(digits, off)?;
        Ok(Integer::from_bigint(BigInt::from_canonical_digits(
            negative, digits,
        )))
    }

    /// Decode a byte string, borrowing from the input.
    ///
    /// # Errors
    ///
    /// Returns `ExpectedBytes` for another shape.
    pub fn bytes(&mut self) -> Result<&'de [u8], BencodeError> {
        match self.parser.next_token()? {
            (Token::Bytes(b), _) => Ok(b),
            (_, off) => Err(BencodeError::new(ErrorCode::ExpectedBytes, off)),
        }
    }

    /// Decode a byte string holding UTF-8 text, borrowing from the input.
    ///
    /// # Errors
    ///
    /// Returns `ExpectedBytes` for another shape, `Utf8Invalid` if the bytes are not UTF-8.
    pub fn str(&mut self) -> Result<&'de str, BencodeError> {
        let off = self.parser.position();
        let b = self.bytes()?;
        crate::utf8::validate(b).map_err(|()| BencodeError::new(ErrorCode::Utf8Invalid, off))
    }

    /// Enter a list. Pair with [`Decoder::at_end`] or [`Decoder::end_list`].
    ///
    /// # Errors
    ///
    /// Returns `ExpectedList` for another shape or `DepthLimitExceeded`.
    pub fn begin_list(&mut self) -> Result<(), BencodeError> {
        match self.parser.next_token()? {
            (Token::ListStart, off) => self.enter(off),
            (_, off) => Err(BencodeError::new(ErrorCode::ExpectedList, off)),
        }
    }

    /// Enter a dictionary. Pair with [`Decoder::next_key`].
    ///
    /// # Errors
    ///
    /// Returns `ExpectedDict` for another shape or `DepthLimitExceeded`.
    pub fn begin_dict(&mut self) -> Result<(), BencodeError> {
        match self.parser.next_token()? {
            (Token::DictStart, off) => self.enter(off),
            (_, off) => Err(BencodeError::new(ErrorCode::ExpectedDict, off)),
        }
    }

    fn enter(&mut self, off: usize) -> Result<(), BencodeError> {
        let next = self.depth + 1;
        self.parser.check_depth(next, off)?;
        self.depth = next;
        Ok(())
    }

    /// Inside a list: consume the closing `e` and return `true`, or return `false` if another
    /// item follows.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` at the end of input.
    pub fn at_end(&mut self) -> Result<bool, BencodeError> {
        match self.parser.peek() {
            Some(END) => {
                self.parser.next_token()?;
                self.depth = self.depth.saturating_sub(1);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(self.err(ErrorCode::UnexpectedEof)),
        }
    }

    /// Inside a list: require the closing `e`.
    ///
    /// # Errors
    ///
    /// Returns `ListLenMismatch` if more items follow.
    pub fn end_list(&mut self) -> Result<(), BencodeError> {
        if self.at_end()? {
            Ok(())
        } else {
            Err(self.err(ErrorCode::ListLenMismatch))
        }
    }

    /// Inside a dictionary: read the next key, or consume the closing `e` and return `None`.
    ///
    /// # Errors
    ///
    /// Returns `DictKeyMustBeBytes` if the next value is not a byte string.
    pub fn next_key(&mut self) -> Result<Option<&'de [u8]>, BencodeError> {
        match self.parser.read_key()? {
            Some((key, _)) => Ok(Some(key)),
            None => {
                self.depth = self.depth.saturating_sub(1);
                Ok(None)
            }
        }
    }

    /// Skip exactly one value while enforcing decode limits.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the value is malformed or violates limits.
    pub fn skip_value(&mut self) -> Result<(), BencodeError> {
        self.parser.skip_value(self.depth)
    }

    /// Borrow the raw bytes of the next value.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the value is malformed or violates limits.
    pub fn raw_value(&mut self) -> Result<CanonicalBytesRef<'de>, BencodeError> {
        let start = self.parser.position();
        self.skip_value()?;
        let end = self.parser.position();
        Ok(CanonicalBytesRef::new(&self.parser.data()[start..end]))
    }

    /// Decode the next value into an owned tree.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the value is malformed or violates limits.
    #[cfg(feature = "alloc")]
    pub fn value(&mut self) -> Result<Value, BencodeError> {
        crate::parse::build_value(&mut self.parser, self.depth)
    }

    /// Require that the whole input has been consumed.
    ///
    /// # Errors
    ///
    /// Returns `TrailingBytes` otherwise.
    pub const fn finish(&self) -> Result<(), BencodeError> {
        self.parser.finish()
    }
}

/// Decode a value from a streaming decoder.
pub trait BencodeDecode<'de>: Sized {
    /// Decode `Self` from a streaming decoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the Bencode value does not match the expected type or violates
    /// decode limits.
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError>;
}

#[cfg(feature = "alloc")]
/// Encode a value into canonical Bencode bytes using the streaming encoder.
pub trait BencodeEncode {
    /// Encode `self` into the provided encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError>;
}

/// Marker trait for values that can appear as list elements.
///
/// `u8` is deliberately not a list element: `Vec<u8>` and `&[u8]` are byte strings.
pub trait BencodeListElem {}

/// Validate canonical Bencode and decode a value using `BencodeDecode`.
///
/// The strict profile always applies, whatever `options.strict` says.
///
/// # Errors
///
/// Returns an error if the input is not canonical Bencode or if decoding fails.
pub fn decode_as<'de, T: BencodeDecode<'de>>(
    bytes: &'de [u8],
    options: DecodeOptions,
) -> Result<T, BencodeError> {
    let canon = validate_canonical(bytes, options)?;
    decode_with(canon.as_bytes(), options)
}

/// Decode a value from validated canonical bytes.
///
/// # Errors
///
/// Returns an error if decoding fails.
pub fn decode_canonical<'de, T: BencodeDecode<'de>>(
    canon: CanonicalBytesRef<'de>,
) -> Result<T, BencodeError> {
    let bytes = canon.as_bytes();
    decode_with(
        bytes,
        DecodeOptions::for_bytes(bytes.len()).with_max_depth(usize::MAX),
    )
}

fn decode_with<'de, T: BencodeDecode<'de>>(
    bytes: &'de [u8],
    options: DecodeOptions,
) -> Result<T, BencodeError> {
    let mut decoder = Decoder::new(bytes, options.with_strict(true))?;
    let value = T::decode(&mut decoder)?;
    decoder.finish()?;
    Ok(value)
}

#[cfg(feature = "alloc")]
/// Encode a value into canonical Bencode bytes.
///
/// Dictionary entries are checked to hold exactly one value, but the top level is not: a
/// hand-written impl that emits several top-level values is only caught by
/// [`encode_to_canonical`].
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_to_vec<T: BencodeEncode + ?Sized>(value: &T) -> Result<Vec<u8>, BencodeError> {
    crate::environment::init()?;
    let mut enc = Encoder::new();
    value.encode(&mut enc)?;
    Ok(enc.into_vec())
}

#[cfg(feature = "alloc")]
/// Encode a value into owned canonical Bencode bytes.
///
/// # Errors
///
/// Returns an error if encoding fails or the result is not a single canonical value.
pub fn encode_to_canonical<T: BencodeEncode + ?Sized>(
    value: &T,
) -> Result<CanonicalBytes, BencodeError> {
    let mut enc = Encoder::new();
    value.encode(&mut enc)?;
    enc.into_canonical()
}

impl<'de> BencodeDecode<'de> for bool {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        let off = decoder.position();
        match decoder.int()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(BencodeError::new(ErrorCode::IntegerOutOfRange, off)),
        }
    }
}

impl<'de> BencodeDecode<'de> for i64 {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        decoder.int()
    }
}

macro_rules! impl_decode_narrow {
    ($($t:ty),*) => {$(
        impl<'de> BencodeDecode<'de> for $t {
            fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
                let off = decoder.position();
                let v = decoder.int_i128()?;
                Self::try_from(v).map_err(|_| BencodeError::new(ErrorCode::IntegerOutOfRange, off))
            }
        }
    )*};
}

impl_decode_narrow!(i8, i16, i32, isize, u8, u16, u32, u64, usize);

impl<'de> BencodeDecode<'de> for i128 {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        decoder.int_i128()
    }
}

impl<'de> BencodeDecode<'de> for u128 {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        decoder.int_u128()
    }
}

impl<'de> BencodeDecode<'de> for &'de str {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        decoder.str()
    }
}

impl<'de> BencodeDecode<'de> for &'de [u8] {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        decoder.bytes()
    }
}

impl<'de> BencodeDecode<'de> for CanonicalBytesRef<'de> {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        decoder.raw_value()
    }
}

/// `Option` only wraps a present value; absence is expressed by omitting a dictionary key.
impl<'de, T: BencodeDecode<'de>> BencodeDecode<'de> for Option<T> {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        T::decode(decoder).map(Some)
    }
}

#[cfg(feature = "alloc")]
impl<'de, T: BencodeDecode<'de> + BencodeListElem> BencodeDecode<'de> for Vec<T> {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        decoder.begin_list()?;
        let mut out = Self::new();
        while !decoder.at_end()? {
            let off = decoder.position();
            crate::alloc_util::try_push(&mut out, T::decode(decoder)?, off)?;
        }
        Ok(out)
    }
}

#[cfg(feature = "alloc")]
impl<'de, V: BencodeDecode<'de>> BencodeDecode<'de> for BTreeMap<Vec<u8>, V> {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        decoder.begin_dict()?;
        let mut out = Self::new();
        while let Some(key) = decoder.next_key()? {
            let value = V::decode(decoder)?;
            out.insert(key.to_vec(), value);
        }
        Ok(out)
    }
}

#[cfg(feature = "alloc")]
impl<'de, V: BencodeDecode<'de>> BencodeDecode<'de> for BTreeMap<String, V> {
    fn decode(decoder: &mut Decoder<'de>) -> Result<Self, BencodeError> {
        decoder.begin_dict()?;
        let mut out = Self::new();
        loop {
            let off = decoder.position();
            let Some(key) = decoder.next_key()? else {
                break;
            };
            let key = crate::utf8::validate(key)
                .map_err(|()| BencodeError::new(ErrorCode::Utf8Invalid, off))?;
            let value = V::decode(decoder)?;
            out.insert(String::from(key), value);
        }
        Ok(out)
    }
}

#[cfg(feature = "alloc")]
impl BencodeDecode<'_> for String {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, BencodeError> {
        decoder.str().map(String::from)
    }
}

#[cfg(feature = "alloc")]
impl BencodeDecode<'_> for Vec<u8> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, BencodeError> {
        let off = decoder.position();
        let b = decoder.bytes()?;
        crate::alloc_util::try_vec_from_slice(b, off)
    }
}

#[cfg(feature = "alloc")]
impl BencodeDecode<'_> for Value {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, BencodeError> {
        decoder.value()
    }
}

#[cfg(feature = "alloc")]
impl BencodeDecode<'_> for Integer {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, BencodeError> {
        decoder.integer()
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for bool {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.int(i64::from(*self))
    }
}

macro_rules! impl_encode_via_i64 {
    ($($t:ty),*) => {$(
        #[cfg(feature = "alloc")]
        impl BencodeEncode for $t {
            fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
                enc.int(i64::from(*self))
            }
        }
    )*};
}

impl_encode_via_i64!(i8, i16, i32, i64, u8, u16, u32);

#[cfg(feature = "alloc")]
impl BencodeEncode for isize {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.int_i128(*self as i128)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for i128 {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.int_i128(*self)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for u64 {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.int_u128(u128::from(*self))
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for usize {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.int_u128(*self as u128)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for u128 {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.int_u128(*self)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for str {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.str(self)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for [u8] {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.bytes(self)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for String {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.str(self)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for Vec<u8> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.bytes(self)
    }
}

#[cfg(feature = "alloc")]
impl<T: BencodeEncode + ?Sized> BencodeEncode for &T {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        (**self).encode(enc)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for CanonicalBytesRef<'_> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.raw(*self)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for Value {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.value(self)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for Integer {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.integer(self)
    }
}

#[cfg(feature = "alloc")]
impl BencodeEncode for BigInt {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.big_int(self)
    }
}

/// `None` has no standalone representation; derived dictionaries omit the key instead.
#[cfg(feature = "alloc")]
impl<T: BencodeEncode> BencodeEncode for Option<T> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        match self {
            Some(v) => v.encode(enc),
            None => Err(BencodeError::new(ErrorCode::Unsupported, enc.len())),
        }
    }
}

#[cfg(feature = "alloc")]
impl<T: BencodeEncode + BencodeListElem> BencodeEncode for [T] {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.list(|l| {
            for item in self {
                item.encode(l)?;
            }
            Ok(())
        })
    }
}

#[cfg(feature = "alloc")]
impl<T: BencodeEncode + BencodeListElem> BencodeEncode for Vec<T> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        self.as_slice().encode(enc)
    }
}

/// Keys are emitted in map order; a key type whose `Ord` disagrees with byte order fails with
/// `UnsortedKeys`.
#[cfg(feature = "alloc")]
impl<K: AsRef<[u8]>, V: BencodeEncode> BencodeEncode for BTreeMap<K, V> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.dict(|d| {
            for (k, v) in self {
                d.field(k.as_ref(), v)?;
            }
            Ok(())
        })
    }
}

macro_rules! impl_list_elem {
    ($($t:ty),*) => {$(
        impl BencodeListElem for $t {}
    )*};
}

impl_list_elem!(bool, i8, i16, i32, i64, i128, isize, u16, u32, u64, u128, usize, str);
impl_list_elem!(&str, &[u8], CanonicalBytesRef<'_>);

#[cfg(feature = "alloc")]
impl_list_elem!(String, Vec<u8>, Value, Integer, BigInt);

impl<T: BencodeListElem> BencodeListElem for Option<T> {}
#[cfg(feature = "alloc")]
impl<T: BencodeListElem> BencodeListElem for Vec<T> {}
#[cfg(feature = "alloc")]
impl<K, V> BencodeListElem for BTreeMap<K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_walks_nested_shapes() {
        let mut d = Decoder::new(b"d1:ali1ei2ee1:b3:xyze", DecodeOptions::default()).unwrap();
        assert_eq!(d.peek_kind().unwrap(), BencodeKind::Dictionary);
        d.begin_dict().unwrap();
        assert_eq!(d.next_key().unwrap(), Some(b"a".as_slice()));
        d.begin_list().unwrap();
        assert_eq!(d.depth(), 2);
        assert!(!d.at_end().unwrap());
        assert_eq!(d.int().unwrap(), 1);
        assert_eq!(d.int().unwrap(), 2);
        assert!(d.at_end().unwrap());
        assert_eq!(d.next_key().unwrap(), Some(b"b".as_slice()));
        assert_eq!(d.str().unwrap(), "xyz");
        assert_eq!(d.next_key().unwrap(), None);
        assert_eq!(d.depth(), 0);
        d.finish().unwrap();
    }

    #[test]
    fn integer_range_checks() {
        let big = b"i170141183460469231731687303715884105728e";
        let err = decode_as::<i128>(big, DecodeOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::IntegerOutOfRange);
        assert_eq!(
            decode_as::<u128>(big, DecodeOptions::default()).unwrap(),
            1u128 << 127
        );
        assert_eq!(
            decode_as::<i128>(b"i-170141183460469231731687303715884105728e", DecodeOptions::default())
                .unwrap(),
            i128::MIN
        );
        let err = decode_as::<u8>(b"i256e", DecodeOptions::default()).unwrap_err();
        assert_eq!((err.code, err.offset), (ErrorCode::IntegerOutOfRange, 0));
        let err = decode_as::<bool>(b"i2e", DecodeOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::IntegerOutOfRange);
    }

    #[test]
    fn typed_shape_mismatch() {
        let err = decode_as::<i64>(b"3:abc", DecodeOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedInteger);
        let err = decode_as::<&str>(b"1:\xff", DecodeOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Utf8Invalid);
        let err = decode_as::<Vec<i64>>(b"de", DecodeOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedList);
    }

    #[test]
    fn typed_roundtrip_of_std_types() {
        let mut m: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        m.insert("b".into(), vec![u64::MAX, 0]);
        m.insert("a".into(), vec![]);
        let bytes = encode_to_vec(&m).unwrap();
        assert_eq!(bytes, b"d1:ale1:bli18446744073709551615ei0eee");
        let back: BTreeMap<String, Vec<u64>> =
            decode_as(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn bytes_and_lists_are_distinct() {
        assert_eq!(encode_to_vec(&vec![1u8, 2]).unwrap(), b"2:\x01\x02");
        assert_eq!(encode_to_vec(&vec![1u16, 2]).unwrap(), b"li1ei2ee");
    }

    #[test]
    fn none_has_no_standalone_encoding() {
        let err = encode_to_vec(&Option::<i64>::None).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unsupported);
    }

    #[test]
    fn raw_value_borrows_sub_slice() {
        let (a, b): (CanonicalBytesRef<'_>, i64) = {
            let mut d = Decoder::new(b"ld1:xi1eei7ee", DecodeOptions::default()).unwrap();
            d.begin_list().unwrap();
            let raw = d.raw_value().unwrap();
            let n = d.int().unwrap();
            d.end_list().unwrap();
            (raw, n)
        };
        assert_eq!(a.as_bytes(), b"d1:xi1ee");
        assert_eq!(b, 7);
    }
}
