use crate::{BencodeError, ErrorCode};

/// Default maximum nesting depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Decode-time policy and resource limits.
///
/// Limits are enforced deterministically and never depend on timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject non-canonical dictionaries (`true`) or normalize them (`false`).
    ///
    /// In lenient mode dictionaries are sorted by key and the last of any duplicate keys wins.
    pub strict: bool,
    /// Maximum nesting depth. A list or dictionary at the top level has depth 1.
    pub max_depth: usize,
    /// Maximum total input length in bytes.
    pub max_input_bytes: usize,
    /// Maximum byte-string length (applies to keys too).
    pub max_bytes_len: usize,
    /// Maximum total count of decoded values across the whole input
    /// (dictionary keys count as values).
    pub max_total_items: usize,
}

impl DecodeOptions {
    /// Options with the given strictness and depth limit, and no size limits.
    #[must_use]
    pub const fn new(strict: bool, max_depth: usize) -> Self {
        Self {
            strict,
            max_depth,
            max_input_bytes: usize::MAX,
            max_bytes_len: usize::MAX,
            max_total_items: usize::MAX,
        }
    }

    /// Construct conservative limits derived from a maximum message size.
    ///
    /// The defaults are:
    /// - `strict = true`
    /// - `max_depth = DEFAULT_MAX_DEPTH`
    /// - `max_input_bytes`, `max_bytes_len` and `max_total_items` equal `max_message_bytes`
    #[must_use]
    pub const fn for_bytes(max_message_bytes: usize) -> Self {
        Self {
            strict: true,
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_bytes: max_message_bytes,
            max_bytes_len: max_message_bytes,
            max_total_items: max_message_bytes,
        }
    }

    /// Default limits with dictionary normalization instead of rejection.
    #[must_use]
    pub const fn lenient() -> Self {
        Self::new(false, DEFAULT_MAX_DEPTH)
    }

    /// Set the strictness policy.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the nesting depth limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum input length.
    #[must_use]
    pub const fn with_max_input_bytes(mut self, max_input_bytes: usize) -> Self {
        self.max_input_bytes = max_input_bytes;
        self
    }

    /// Set the maximum byte-string length.
    #[must_use]
    pub const fn with_max_bytes_len(mut self, max_bytes_len: usize) -> Self {
        self.max_bytes_len = max_bytes_len;
        self
    }

    /// Set the maximum total item count.
    #[must_use]
    pub const fn with_max_total_items(mut self, max_total_items: usize) -> Self {
        self.max_total_items = max_total_items;
        self
    }

    /// Check that the options admit at least one value.
    ///
    /// A `max_bytes_len` above `max_input_bytes` is redundant, not inconsistent: the input limit
    /// already bounds every byte string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOptions` if `max_total_items` is zero.
    pub const fn check(self) -> Result<Self, BencodeError> {
        if self.max_total_items == 0 {
            return Err(BencodeError::new(ErrorCode::InvalidOptions, 0));
        }
        Ok(self)
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new(true, DEFAULT_MAX_DEPTH)
    }
}
