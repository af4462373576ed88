use crate::canonical::CanonicalBytesRef;
use crate::limits::DEFAULT_MAX_DEPTH;
use crate::profile::{
    check_integer_digits, check_key_order, parse_length, DICT_START, END, INT_START, LEN_SEP,
    LIST_START, MINUS,
};
use crate::scanner::ByteScanner;
use crate::{BencodeError, DecodeOptions, ErrorCode};

#[cfg(feature = "alloc")]
use crate::value::{BigInt, Dictionary, Integer, Value};
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

const INLINE_STACK: usize = DEFAULT_MAX_DEPTH;

/// One lexical unit of the wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    Int { negative: bool, digits: &'a [u8] },
    Bytes(&'a [u8]),
    ListStart,
    DictStart,
    End,
}

#[derive(Clone, Copy)]
enum Frame<'a> {
    List,
    Dict {
        expecting_key: bool,
        prev_key: Option<&'a [u8]>,
    },
}

struct FrameStack<'a, const N: usize> {
    inline: [Option<Frame<'a>>; N],
    len: usize,
    #[cfg(feature = "alloc")]
    overflow: Vec<Frame<'a>>,
}

impl<'a, const N: usize> FrameStack<'a, N> {
    const fn new() -> Self {
        Self {
            inline: [None; N],
            len: 0,
            #[cfg(feature = "alloc")]
            overflow: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        #[cfg(feature = "alloc")]
        {
            self.len + self.overflow.len()
        }
        #[cfg(not(feature = "alloc"))]
        {
            self.len
        }
    }

    #[cfg(feature = "alloc")]
    fn push(&mut self, frame: Frame<'a>, off: usize) -> Result<(), BencodeError> {
        if self.overflow.is_empty() && self.len < N {
            self.inline[self.len] = Some(frame);
            self.len += 1;
            return Ok(());
        }
        crate::alloc_util::try_push(&mut self.overflow, frame, off)
    }

    #[cfg(not(feature = "alloc"))]
    fn push(&mut self, frame: Frame<'a>, off: usize) -> Result<(), BencodeError> {
        if self.len < N {
            self.inline[self.len] = Some(frame);
            self.len += 1;
            Ok(())
        } else {
            Err(BencodeError::new(ErrorCode::DepthLimitExceeded, off))
        }
    }

    fn pop(&mut self) -> Option<Frame<'a>> {
        #[cfg(feature = "alloc")]
        {
            if let Some(frame) = self.overflow.pop() {
                return Some(frame);
            }
        }
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        self.inline[self.len].take()
    }

    fn peek_mut(&mut self) -> Option<&mut Frame<'a>> {
        #[cfg(feature = "alloc")]
        {
            if let Some(frame) = self.overflow.last_mut() {
                return Some(frame);
            }
        }
        if self.len == 0 {
            return None;
        }
        self.inline[self.len - 1].as_mut()
    }
}

/// Tokenizer shared by the validator, the tree builder and the typed decoder.
///
/// Enforces every per-token rule and the size limits. Structural rules (depth, key order,
/// trailing bytes) belong to the driver.
pub struct Parser<'a> {
    scanner: ByteScanner<'a>,
    options: DecodeOptions,
    items_seen: usize,
}

impl<'a> Parser<'a> {
    /// Check the options and the input envelope, then position at the first byte.
    pub fn new(data: &'a [u8], options: DecodeOptions) -> Result<Self, BencodeError> {
        if data.is_empty() {
            return Err(BencodeError::new(ErrorCode::EmptyInput, 0));
        }
        let options = options.check()?;
        if data.len() > options.max_input_bytes {
            return Err(BencodeError::new(ErrorCode::InputLenLimitExceeded, 0));
        }
        Ok(Self {
            scanner: ByteScanner::new(data),
            options,
            items_seen: 0,
        })
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.scanner.position()
    }

    #[inline]
    pub const fn options(&self) -> DecodeOptions {
        self.options
    }

    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.scanner.data()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.scanner.peek()
    }

    /// Fail with `TrailingBytes` unless the input is fully consumed.
    pub const fn finish(&self) -> Result<(), BencodeError> {
        if self.scanner.is_at_end() {
            Ok(())
        } else {
            Err(BencodeError::new(
                ErrorCode::TrailingBytes,
                self.scanner.position(),
            ))
        }
    }

    /// Fail if opening a container would nest deeper than `max_depth`.
    pub const fn check_depth(&self, next_depth: usize, off: usize) -> Result<(), BencodeError> {
        if next_depth > self.options.max_depth {
            return Err(BencodeError::new(ErrorCode::DepthLimitExceeded, off));
        }
        Ok(())
    }

    /// Read the next token and the offset it started at.
    pub fn next_token(&mut self) -> Result<(Token<'a>, usize), BencodeError> {
        let off = self.scanner.position();
        let lead = self
            .scanner
            .peek()
            .ok_or_else(|| BencodeError::new(ErrorCode::UnexpectedEof, off))?;
        let token = match lead {
            INT_START => self.read_int(off)?,
            b'0'..=b'9' => Token::Bytes(self.read_bytes(off)?),
            LIST_START => {
                self.scanner.read_u8()?;
                Token::ListStart
            }
            DICT_START => {
                self.scanner.read_u8()?;
                Token::DictStart
            }
            END => {
                self.scanner.read_u8()?;
                return Ok((Token::End, off));
            }
            _ => return Err(BencodeError::new(ErrorCode::UnexpectedByte, off)),
        };
        self.bump_items(off)?;
        Ok((token, off))
    }

    /// Read a dictionary key, or `None` at the closing `e`.
    pub fn read_key(&mut self) -> Result<Option<(&'a [u8], usize)>, BencodeError> {
        let off = self.scanner.position();
        match self.scanner.peek() {
            Some(END) => {
                self.scanner.read_u8()?;
                Ok(None)
            }
            Some(b'0'..=b'9') => {
                let key = self.read_bytes(off)?;
                self.bump_items(off)?;
                Ok(Some((key, off)))
            }
            Some(_) => Err(BencodeError::new(ErrorCode::DictKeyMustBeBytes, off)),
            None => Err(BencodeError::new(ErrorCode::UnexpectedEof, off)),
        }
    }

    fn read_int(&mut self, off: usize) -> Result<Token<'a>, BencodeError> {
        self.scanner.expect(INT_START, ErrorCode::UnexpectedByte)?;
        let negative = self.scanner.peek() == Some(MINUS);
        if negative {
            self.scanner.read_u8()?;
        }
        let digits = self.scanner.read_decimal_run();
        if digits.is_empty() && self.scanner.is_at_end() {
            return Err(BencodeError::new(
                ErrorCode::UnexpectedEof,
                self.scanner.position(),
            ));
        }
        check_integer_digits(negative, digits).map_err(|code| BencodeError::new(code, off))?;
        self.scanner.expect(END, ErrorCode::InvalidInteger)?;
        Ok(Token::Int { negative, digits })
    }

    fn read_bytes(&mut self, off: usize) -> Result<&'a [u8], BencodeError> {
        let digits = self.scanner.read_decimal_run();
        let len = parse_length(digits).map_err(|code| BencodeError::new(code, off))?;
        if len > self.options.max_bytes_len {
            return Err(BencodeError::new(ErrorCode::BytesLenLimitExceeded, off));
        }
        self.scanner.expect(LEN_SEP, ErrorCode::InvalidLength)?;
        self.scanner.consume(len)
    }

    fn bump_items(&mut self, off: usize) -> Result<(), BencodeError> {
        self.items_seen = self
            .items_seen
            .checked_add(1)
            .ok_or_else(|| BencodeError::new(ErrorCode::LengthOverflow, off))?;
        if self.items_seen > self.options.max_total_items {
            return Err(BencodeError::new(ErrorCode::TotalItemsLimitExceeded, off));
        }
        Ok(())
    }

    /// Skip exactly one value, checking canonical key order along the way.
    ///
    /// `base_depth` is the nesting depth the value sits at.
    pub fn skip_value(&mut self, base_depth: usize) -> Result<(), BencodeError> {
        let mut stack = FrameStack::<'a, INLINE_STACK>::new();

        loop {
            if let Some(Frame::Dict {
                expecting_key: expecting_key @ true,
                prev_key,
            }) = stack.peek_mut()
            {
                match self.read_key()? {
                    Some((key, off)) => {
                        if let Some(prev) = *prev_key {
                            check_key_order(prev, key)
                                .map_err(|code| BencodeError::new(code, off))?;
                        }
                        *prev_key = Some(key);
                        *expecting_key = false;
                        continue;
                    }
                    None => {
                        stack.pop();
                    }
                }
            } else {
                let (token, off) = self.next_token()?;
                match token {
                    Token::Int { .. } | Token::Bytes(_) => {}
                    Token::ListStart => {
                        self.check_depth(base_depth + stack.len() + 1, off)?;
                        stack.push(Frame::List, off)?;
                        continue;
                    }
                    Token::DictStart => {
                        self.check_depth(base_depth + stack.len() + 1, off)?;
                        stack.push(
                            Frame::Dict {
                                expecting_key: true,
                                prev_key: None,
                            },
                            off,
                        )?;
                        continue;
                    }
                    Token::End => match stack.peek_mut() {
                        Some(Frame::List) => {
                            stack.pop();
                        }
                        _ => return Err(BencodeError::new(ErrorCode::UnexpectedByte, off)),
                    },
                }
            }

            match stack.peek_mut() {
                None => return Ok(()),
                Some(Frame::Dict { expecting_key, .. }) => *expecting_key = true,
                Some(Frame::List) => {}
            }
        }
    }
}

/// Validate that `bytes` hold exactly one canonical Bencode value.
///
/// This is an allocation-free hot-path validator. It always applies the strict profile,
/// whatever `options.strict` says.
///
/// # Errors
///
/// Returns an error if decoding fails (EOF, trailing bytes, limit violations) or if validation fails
/// (key order, duplicate keys, empty input).
pub fn validate_bytes(bytes: &[u8], options: DecodeOptions) -> Result<(), BencodeError> {
    validate_canonical(bytes, options).map(|_| ())
}

/// Validate that `bytes` hold exactly one canonical Bencode value and return a wrapper.
///
/// # Errors
///
/// Returns an error if decoding fails (EOF, trailing bytes, limit violations) or if validation fails
/// (key order, duplicate keys, empty input). Returns a configuration error if the environment
/// guard failed or the options are inconsistent.
pub fn validate_canonical(
    bytes: &'_ [u8],
    options: DecodeOptions,
) -> Result<CanonicalBytesRef<'_>, BencodeError> {
    crate::environment::init()?;
    let mut p = Parser::new(bytes, options.with_strict(true))?;
    p.skip_value(0)?;
    p.finish()?;
    Ok(CanonicalBytesRef::new(bytes))
}

#[cfg(feature = "alloc")]
enum BuildFrame {
    List(Vec<Value>),
    Dict {
        entries: Vec<(Vec<u8>, Value)>,
        key: Option<Vec<u8>>,
        ordered: bool,
        off: usize,
    },
}

#[cfg(feature = "alloc")]
fn integer_from_token(negative: bool, digits: &[u8], off: usize) -> Result<Integer, BencodeError> {
    if let Some(v) = crate::profile::parse_i64(negative, digits) {
        return Ok(Integer::new(v));
    }
    let digits = crate::alloc_util::try_vec_from_slice(digits, off)?;
    Ok(Integer::from_bigint(BigInt::from_canonical_digits(
        negative, digits,
    )))
}

#[cfg(feature = "alloc")]
fn finish_dict(entries: Vec<(Vec<u8>, Value)>, ordered: bool, off: usize) -> Dictionary {
    if ordered {
        return Dictionary::from_sorted_unchecked(entries);
    }
    log::debug!(
        "normalizing non-canonical dictionary at offset {off} ({} entries)",
        entries.len()
    );
    Dictionary::from_unordered(entries).normalized()
}

/// Decode exactly one value into an owned tree.
///
/// In strict mode (the default) this accepts exactly the inputs [`validate_canonical`] accepts.
/// In lenient mode dictionaries with unsorted or duplicate keys are normalized: entries are
/// sorted by key and the last occurrence of a duplicate key wins.
///
/// # Errors
///
/// Returns an error if decoding fails (EOF, trailing bytes, limit violations), if validation fails
/// in strict mode, or if memory allocation fails.
#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
pub fn decode(bytes: &[u8], options: DecodeOptions) -> Result<Value, BencodeError> {
    crate::environment::init()?;
    let mut p = Parser::new(bytes, options)?;
    let value = build_value(&mut p, 0)?;
    p.finish()?;
    Ok(value)
}

/// Build one value starting at the parser's position, `base_depth` levels deep.
#[cfg(feature = "alloc")]
pub fn build_value(p: &mut Parser<'_>, base_depth: usize) -> Result<Value, BencodeError> {
    use crate::alloc_util::{try_push, try_vec_from_slice};

    let strict = p.options().strict;
    let mut stack: Vec<BuildFrame> = Vec::new();

    loop {
        let value = if let Some(BuildFrame::Dict {
            entries,
            key: key @ None,
            ordered,
            off,
        }) = stack.last_mut()
        {
            match p.read_key()? {
                Some((k, key_off)) => {
                    if let Some((prev, _)) = entries.last() {
                        if let Err(code) = check_key_order(prev, k) {
                            if strict {
                                return Err(BencodeError::new(code, key_off));
                            }
                            *ordered = false;
                        }
                    }
                    *key = Some(try_vec_from_slice(k, key_off)?);
                    continue;
                }
                None => {
                    let entries = core::mem::take(entries);
                    let dict = finish_dict(entries, *ordered, *off);
                    stack.pop();
                    Value::Dictionary(dict)
                }
            }
        } else {
            let (token, off) = p.next_token()?;
            match token {
                Token::Int { negative, digits } => {
                    Value::Integer(integer_from_token(negative, digits, off)?)
                }
                Token::Bytes(b) => Value::ByteString(try_vec_from_slice(b, off)?),
                Token::ListStart => {
                    p.check_depth(base_depth + stack.len() + 1, off)?;
                    try_push(&mut stack, BuildFrame::List(Vec::new()), off)?;
                    continue;
                }
                Token::DictStart => {
                    p.check_depth(base_depth + stack.len() + 1, off)?;
                    try_push(
                        &mut stack,
                        BuildFrame::Dict {
                            entries: Vec::new(),
                            key: None,
                            ordered: true,
                            off,
                        },
                        off,
                    )?;
                    continue;
                }
                Token::End => match stack.pop() {
                    Some(BuildFrame::List(items)) => Value::List(items),
                    _ => return Err(BencodeError::new(ErrorCode::UnexpectedByte, off)),
                },
            }
        };

        let pos = p.position();
        match stack.last_mut() {
            None => return Ok(value),
            Some(BuildFrame::List(items)) => try_push(items, value, pos)?,
            Some(BuildFrame::Dict { entries, key, .. }) => {
                let Some(k) = key.take() else {
                    return Err(BencodeError::new(ErrorCode::UnexpectedByte, pos));
                };
                try_push(entries, (k, value), pos)?;
            }
        }
    }
}
