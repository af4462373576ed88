use core::fmt;

/// The high-level class of an error.
///
/// Every [`ErrorCode`] belongs to exactly one kind:
/// - **Syntax**: malformed tokens (bad integer digits, bad length prefix, unexpected bytes).
/// - **Bounds**: truncated input, arithmetic overflow on lengths, and configured size limits.
/// - **DepthExceeded**: the nesting limit was hit.
/// - **Validation**: input that parses but is not canonical (key order, duplicates, empty input).
/// - **Configuration**: the host environment or the supplied options cannot guarantee byte-exact
///   length semantics.
/// - **Conversion**: a typed decode or serde conversion did not match the target shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed token.
    Syntax,
    /// Truncated input or size limit.
    Bounds,
    /// Nesting limit exceeded.
    DepthExceeded,
    /// Non-canonical but syntactically valid input.
    Validation,
    /// Host environment or options misconfiguration.
    Configuration,
    /// Typed/serde conversion mismatch.
    Conversion,
}

/// A structured error code identifying the reason an input or value was rejected.
///
/// This enum is stable and string-free to support `no_std`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Decode options are inconsistent.
    InvalidOptions,
    /// The platform cannot address the lengths this crate relies on.
    UnsupportedPlatform,
    /// The byte-length probe observed character counts instead of byte counts.
    ByteLengthMismatch,

    /// Lookahead byte does not start any value.
    UnexpectedByte,
    /// Integer token is empty, signed with `+`, or contains a non-digit.
    InvalidInteger,
    /// Integer has a leading zero.
    LeadingZero,
    /// Integer is `-0`.
    NegativeZero,
    /// Byte string length prefix is malformed (non-digit, leading zero, missing `:`).
    InvalidLength,
    /// Dictionary key is not a byte string.
    DictKeyMustBeBytes,
    /// Input contains bytes after the single top-level value.
    TrailingBytes,

    /// Unexpected end of input.
    UnexpectedEof,
    /// Arithmetic overflow while computing a length or offset.
    LengthOverflow,
    /// Input exceeds `max_input_bytes`.
    InputLenLimitExceeded,
    /// A byte string exceeds `max_bytes_len`.
    BytesLenLimitExceeded,
    /// Total number of decoded items exceeds `max_total_items`.
    TotalItemsLimitExceeded,
    /// Memory allocation failed.
    AllocationFailed,

    /// Nesting depth limit exceeded.
    DepthLimitExceeded,

    /// Input is empty.
    EmptyInput,
    /// Dictionary keys are not in ascending byte order.
    UnsortedKeys,
    /// Dictionary contains the same key twice.
    DuplicateKey,
    /// Big integer digits are not canonical (empty, non-digit, leading zero).
    BigIntNotCanonical,
    /// Big integer used for a value that fits in `i64`.
    BigIntInI64Range,
    /// A dictionary entry builder wrote no value or more than one.
    EntryValueCount,

    /// Expected an integer.
    ExpectedInteger,
    /// Expected a byte string.
    ExpectedBytes,
    /// Expected a list.
    ExpectedList,
    /// Expected a dictionary.
    ExpectedDict,
    /// Integer does not fit the target type.
    IntegerOutOfRange,
    /// Byte string is not valid UTF-8 where text was requested.
    Utf8Invalid,
    /// A required dictionary key is missing.
    MissingKey,
    /// List length does not match the target type.
    ListLenMismatch,
    /// Enum variant name is not known to the target type.
    UnknownVariant,
    /// The value has no Bencode representation (floats, bare unit values).
    Unsupported,
    /// A serde conversion failed.
    SerdeError,
}

impl ErrorCode {
    /// Return the [`ErrorKind`] this code belongs to.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::InvalidOptions | Self::UnsupportedPlatform | Self::ByteLengthMismatch => {
                ErrorKind::Configuration
            }
            Self::UnexpectedByte
            | Self::InvalidInteger
            | Self::LeadingZero
            | Self::NegativeZero
            | Self::InvalidLength
            | Self::DictKeyMustBeBytes
            | Self::TrailingBytes => ErrorKind::Syntax,
            Self::UnexpectedEof
            | Self::LengthOverflow
            | Self::InputLenLimitExceeded
            | Self::BytesLenLimitExceeded
            | Self::TotalItemsLimitExceeded
            | Self::AllocationFailed => ErrorKind::Bounds,
            Self::DepthLimitExceeded => ErrorKind::DepthExceeded,
            Self::EmptyInput
            | Self::UnsortedKeys
            | Self::DuplicateKey
            | Self::BigIntNotCanonical
            | Self::BigIntInI64Range
            | Self::EntryValueCount => ErrorKind::Validation,
            Self::ExpectedInteger
            | Self::ExpectedBytes
            | Self::ExpectedList
            | Self::ExpectedDict
            | Self::IntegerOutOfRange
            | Self::Utf8Invalid
            | Self::MissingKey
            | Self::ListLenMismatch
            | Self::UnknownVariant
            | Self::Unsupported
            | Self::SerdeError => ErrorKind::Conversion,
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::InvalidOptions => "invalid decode options",
            Self::UnsupportedPlatform => "platform usize is narrower than 32 bits",
            Self::ByteLengthMismatch => "string length accounting is not byte-exact",

            Self::UnexpectedByte => "unexpected byte",
            Self::InvalidInteger => "malformed integer",
            Self::LeadingZero => "integer has a leading zero",
            Self::NegativeZero => "negative zero is not allowed",
            Self::InvalidLength => "malformed byte string length",
            Self::DictKeyMustBeBytes => "dictionary keys must be byte strings",
            Self::TrailingBytes => "trailing bytes after single value",

            Self::UnexpectedEof => "unexpected end of input",
            Self::LengthOverflow => "length overflow",
            Self::InputLenLimitExceeded => "input length exceeds decode limits",
            Self::BytesLenLimitExceeded => "byte string length exceeds decode limits",
            Self::TotalItemsLimitExceeded => "total items limit exceeded",
            Self::AllocationFailed => "allocation failed",

            Self::DepthLimitExceeded => "nesting depth limit exceeded",

            Self::EmptyInput => "empty input",
            Self::UnsortedKeys => "dictionary keys are not in ascending order",
            Self::DuplicateKey => "duplicate dictionary key",
            Self::BigIntNotCanonical => "big integer digits are not canonical",
            Self::BigIntInI64Range => "big integer must be outside the i64 range",
            Self::EntryValueCount => "dictionary entry must hold exactly one value",

            Self::ExpectedInteger => "expected integer",
            Self::ExpectedBytes => "expected byte string",
            Self::ExpectedList => "expected list",
            Self::ExpectedDict => "expected dictionary",
            Self::IntegerOutOfRange => "integer out of range for target type",
            Self::Utf8Invalid => "byte string is not valid UTF-8",
            Self::MissingKey => "missing dictionary key",
            Self::ListLenMismatch => "list length mismatch",
            Self::UnknownVariant => "unknown enum variant",
            Self::Unsupported => "value has no bencode representation",
            Self::SerdeError => "serde conversion error",
        }
    }
}

/// A Bencode error with a stable code and a byte offset.
///
/// For decode errors the offset points into the input. For encode errors it is the output
/// position at the time of failure. Configuration errors use offset `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BencodeError {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset where the error was detected.
    pub offset: usize,
}

impl BencodeError {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }

    /// The error kind.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        self.code.kind()
    }

    /// Returns true iff this is a syntax error.
    #[inline]
    #[must_use]
    pub const fn is_syntax(self) -> bool {
        matches!(self.kind(), ErrorKind::Syntax)
    }

    /// Returns true iff this is a bounds error (truncation or size limit).
    #[inline]
    #[must_use]
    pub const fn is_bounds(self) -> bool {
        matches!(self.kind(), ErrorKind::Bounds)
    }

    /// Returns true iff this is a validation error.
    #[inline]
    #[must_use]
    pub const fn is_validation(self) -> bool {
        matches!(self.kind(), ErrorKind::Validation)
    }
}

impl fmt::Display for BencodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = self.code.message();
        match self.kind() {
            ErrorKind::Configuration => write!(f, "bencode configuration error: {msg}"),
            ErrorKind::Conversion => {
                write!(f, "bencode conversion failed at {}: {msg}", self.offset)
            }
            ErrorKind::Validation => {
                write!(f, "bencode validation failed at {}: {msg}", self.offset)
            }
            ErrorKind::Syntax | ErrorKind::Bounds | ErrorKind::DepthExceeded => {
                write!(f, "bencode decode failed at {}: {msg}", self.offset)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BencodeError {}

#[cfg(feature = "std")]
impl From<BencodeError> for std::io::Error {
    fn from(err: BencodeError) -> Self {
        Self::new(std::io::ErrorKind::InvalidData, err)
    }
}
