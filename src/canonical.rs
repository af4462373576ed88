#[cfg(feature = "alloc")]
use crate::{BencodeError, DecodeOptions};

/// A validated canonical Bencode value borrowed from an input buffer.
///
/// This is the primary "hot-path" product of [`crate::validate_canonical`]. The bytes are guaranteed to:
///
/// - encode exactly one Bencode value, and
/// - already be in canonical form (minimal integers, sorted unique dictionary keys).
///
/// Two canonical encodings are equal iff the values they encode are equal, so these bytes can be
/// compared, hashed and stored directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalBytesRef<'a> {
    bytes: &'a [u8],
}

impl<'a> CanonicalBytesRef<'a> {
    #[inline]
    pub(crate) const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Return the canonical bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(self) -> &'a [u8] {
        self.bytes
    }

    /// Length in bytes of the canonical representation.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` iff the canonical encoding is empty (this never happens for a valid value).
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bytes.is_empty()
    }

    /// Compute the SHA-256 digest of the canonical bytes.
    #[cfg(feature = "sha2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "sha2")))]
    #[must_use]
    pub fn sha256(self) -> [u8; 32] {
        use sha2::{Digest, Sha256};
        let mut h = Sha256::new();
        h.update(self.bytes);
        h.finalize().into()
    }

    /// Decode into an owned value tree.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if memory allocation fails.
    #[cfg(feature = "alloc")]
    #[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
    pub fn to_value(self) -> Result<crate::Value, BencodeError> {
        crate::decode(self.bytes, trusted_options(self.bytes.len()))
    }

    /// Copy into an owned [`CanonicalBytes`].
    #[cfg(feature = "alloc")]
    #[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
    #[must_use]
    pub fn to_owned(self) -> CanonicalBytes {
        CanonicalBytes {
            bytes: self.bytes.to_vec(),
        }
    }
}

impl AsRef<[u8]> for CanonicalBytesRef<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

/// Options under which already validated bytes re-decode without tripping any limit.
#[cfg(feature = "alloc")]
const fn trusted_options(len: usize) -> DecodeOptions {
    DecodeOptions::for_bytes(len).with_max_depth(usize::MAX)
}

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// An owned canonical Bencode value.
///
/// This type is useful for durable storage of canonical bytes and for content addressing.
#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes {
    bytes: Vec<u8>,
}

#[cfg(feature = "alloc")]
impl CanonicalBytes {
    #[inline]
    pub(crate) const fn new_unchecked(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Validate and copy `bytes` into an owned canonical representation.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` are not a canonical Bencode value.
    pub fn from_slice(bytes: &[u8], options: DecodeOptions) -> Result<Self, BencodeError> {
        let canon = crate::validate_canonical(bytes, options)?;
        Ok(canon.to_owned())
    }

    /// Validate and take ownership of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` are not a canonical Bencode value.
    pub fn from_vec(bytes: Vec<u8>, options: DecodeOptions) -> Result<Self, BencodeError> {
        crate::validate_canonical(&bytes, options)?;
        Ok(Self { bytes })
    }

    /// Borrow as a [`CanonicalBytesRef`].
    #[inline]
    #[must_use]
    pub fn as_canonical(&self) -> CanonicalBytesRef<'_> {
        CanonicalBytesRef::new(&self.bytes)
    }

    /// Borrow the canonical bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the canonical bytes.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decode into an owned value tree.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if memory allocation fails.
    pub fn to_value(&self) -> Result<crate::Value, BencodeError> {
        self.as_canonical().to_value()
    }

    /// Compute the SHA-256 digest of the canonical bytes.
    #[cfg(feature = "sha2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "sha2")))]
    #[must_use]
    pub fn sha256(&self) -> [u8; 32] {
        self.as_canonical().sha256()
    }
}

#[cfg(feature = "alloc")]
impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
