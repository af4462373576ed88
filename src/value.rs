use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use crate::canonical::CanonicalBytes;
use crate::codec::BencodeKind;
use crate::profile::{cmp_keys, parse_u128, validate_big_digits};
use crate::{BencodeError, ErrorCode};

/// An integer outside the `i64` range.
///
/// Bencode places no bound on integer magnitude. Values that do not fit in `i64` are carried as a
/// sign and the canonical ASCII decimal digits of the magnitude (non-empty, no leading zero).
/// A `BigInt` never holds a value that fits in `i64`, so every integer has exactly one
/// representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    negative: bool,
    digits: Vec<u8>,
}

impl BigInt {
    /// Construct a `BigInt` from a sign and the decimal digits of its magnitude.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the digits are empty, contain a non-digit, or have a leading zero, or
    /// - the represented integer fits in `i64`.
    pub fn new(negative: bool, digits: Vec<u8>) -> Result<Self, BencodeError> {
        validate_big_digits(negative, &digits).map_err(|code| BencodeError::new(code, 0))?;
        Ok(Self { negative, digits })
    }

    #[inline]
    pub(crate) const fn from_canonical_digits(negative: bool, digits: Vec<u8>) -> Self {
        Self { negative, digits }
    }

    /// Sign flag: `true` if this value is negative.
    #[inline]
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    /// The canonical ASCII decimal digits of the magnitude.
    #[inline]
    #[must_use]
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Convert to `i128` if the value fits.
    #[must_use]
    pub fn to_i128(&self) -> Option<i128> {
        let magnitude = parse_u128(&self.digits)?;
        if self.negative {
            0_i128.checked_sub_unsigned(magnitude)
        } else {
            i128::try_from(magnitude).ok()
        }
    }

    /// Convert to `u128` if the value is positive and fits.
    #[must_use]
    pub fn to_u128(&self) -> Option<u128> {
        if self.negative {
            return None;
        }
        parse_u128(&self.digits)
    }

    /// Length of the canonical encoding (`i...e`).
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        2 + usize::from(self.negative) + self.digits.len()
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        for &d in &self.digits {
            fmt::Write::write_char(f, char::from(d))?;
        }
        Ok(())
    }
}

impl FromStr for BigInt {
    type Err = BencodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.as_bytes() {
            [b'-', rest @ ..] => (true, rest),
            rest => (false, rest),
        };
        Self::new(negative, digits.to_vec())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn u128_digits(mut v: u128) -> Vec<u8> {
    let mut buf = [0u8; 39];
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    buf[i..].to_vec()
}

/// A Bencode integer of any magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integer(IntegerRepr);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IntegerRepr {
    Small(i64),
    Big(BigInt),
}

impl Integer {
    /// Construct an integer from an `i64`.
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(IntegerRepr::Small(value))
    }

    /// Construct an integer from an `i128`, using a [`BigInt`] outside the `i64` range.
    #[must_use]
    pub fn from_i128(value: i128) -> Self {
        match i64::try_from(value) {
            Ok(v) => Self::new(v),
            Err(_) => Self(IntegerRepr::Big(BigInt::from_canonical_digits(
                value < 0,
                u128_digits(value.unsigned_abs()),
            ))),
        }
    }

    /// Construct an integer from a `u128`, using a [`BigInt`] above `i64::MAX`.
    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        match i64::try_from(value) {
            Ok(v) => Self::new(v),
            Err(_) => Self(IntegerRepr::Big(BigInt::from_canonical_digits(
                false,
                u128_digits(value),
            ))),
        }
    }

    /// Construct an integer from an existing `BigInt`.
    #[inline]
    #[must_use]
    pub const fn from_bigint(big: BigInt) -> Self {
        Self(IntegerRepr::Big(big))
    }

    /// Returns `true` iff this integer lies outside the `i64` range.
    #[inline]
    #[must_use]
    pub const fn is_big(&self) -> bool {
        matches!(self.0, IntegerRepr::Big(_))
    }

    /// Returns `true` iff this integer is negative.
    #[inline]
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        match &self.0 {
            IntegerRepr::Small(v) => *v < 0,
            IntegerRepr::Big(b) => b.is_negative(),
        }
    }

    /// Return the value as `i64` if it fits.
    #[inline]
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            IntegerRepr::Small(v) => Some(*v),
            IntegerRepr::Big(_) => None,
        }
    }

    /// Return the underlying `BigInt` if this integer lies outside the `i64` range.
    #[inline]
    #[must_use]
    pub const fn as_bigint(&self) -> Option<&BigInt> {
        match &self.0 {
            IntegerRepr::Big(b) => Some(b),
            IntegerRepr::Small(_) => None,
        }
    }

    #[inline]
    pub(crate) const fn repr(&self) -> Result<i64, &BigInt> {
        match &self.0 {
            IntegerRepr::Small(v) => Ok(*v),
            IntegerRepr::Big(b) => Err(b),
        }
    }

    /// Convert to `i128` if the value fits.
    #[must_use]
    pub fn to_i128(&self) -> Option<i128> {
        match &self.0 {
            IntegerRepr::Small(v) => Some(i128::from(*v)),
            IntegerRepr::Big(b) => b.to_i128(),
        }
    }

    /// Convert to `u128` if the value is non-negative and fits.
    #[must_use]
    pub fn to_u128(&self) -> Option<u128> {
        match &self.0 {
            IntegerRepr::Small(v) => u128::try_from(*v).ok(),
            IntegerRepr::Big(b) => b.to_u128(),
        }
    }

    /// Length of the canonical encoding (`i...e`).
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match &self.0 {
            IntegerRepr::Small(v) => crate::profile::encoded_int_len(*v),
            IntegerRepr::Big(b) => b.encoded_len(),
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            IntegerRepr::Small(v) => fmt::Display::fmt(v, f),
            IntegerRepr::Big(b) => fmt::Display::fmt(b, f),
        }
    }
}

impl From<BigInt> for Integer {
    fn from(value: BigInt) -> Self {
        Self::from_bigint(value)
    }
}

macro_rules! impl_integer_from_small {
    ($($t:ty),*) => {$(
        impl From<$t> for Integer {
            fn from(value: $t) -> Self {
                Self::new(i64::from(value))
            }
        }
    )*};
}

impl_integer_from_small!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self::from_u128(u128::from(value))
    }
}

impl From<usize> for Integer {
    fn from(value: usize) -> Self {
        Self::from_u128(value as u128)
    }
}

impl From<isize> for Integer {
    fn from(value: isize) -> Self {
        Self::from_i128(value as i128)
    }
}

impl From<i128> for Integer {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

impl From<u128> for Integer {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

/// An owned Bencode value.
///
/// Byte strings hold raw bytes and are never transformed. Use [`Value::as_str`] for a UTF-8 view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed integer of any magnitude.
    Integer(Integer),
    /// Raw byte string.
    ByteString(Vec<u8>),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Dictionary keyed by byte strings.
    Dictionary(Dictionary),
}

impl Value {
    /// Construct an integer value.
    #[inline]
    #[must_use]
    pub const fn int(v: i64) -> Self {
        Self::Integer(Integer::new(v))
    }

    /// Construct a byte string value.
    #[inline]
    #[must_use]
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Self::ByteString(b.into())
    }

    /// Construct a byte string from the UTF-8 bytes of `s`.
    #[inline]
    #[must_use]
    pub fn str(s: &str) -> Self {
        Self::ByteString(s.as_bytes().to_vec())
    }

    /// Construct a list value.
    #[inline]
    #[must_use]
    pub const fn list(items: Vec<Self>) -> Self {
        Self::List(items)
    }

    /// Construct a dictionary value.
    #[inline]
    #[must_use]
    pub const fn dict(d: Dictionary) -> Self {
        Self::Dictionary(d)
    }

    /// Return the shape of this value.
    #[must_use]
    pub const fn kind(&self) -> BencodeKind {
        match self {
            Self::Integer(_) => BencodeKind::Integer,
            Self::ByteString(_) => BencodeKind::ByteString,
            Self::List(_) => BencodeKind::List,
            Self::Dictionary(_) => BencodeKind::Dictionary,
        }
    }

    /// Return the integer if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<&Integer> {
        match self {
            Self::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Return the value as `i64` if this is an integer that fits.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => i.as_i64(),
            _ => None,
        }
    }

    /// Return the raw bytes if this is a byte string.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ByteString(b) => Some(b),
            _ => None,
        }
    }

    /// Return a UTF-8 view if this is a byte string holding valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| crate::utf8::validate(b).ok())
    }

    /// Return the items if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Return the items mutably if this is a list.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Self>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Return the dictionary if this is a dictionary.
    #[must_use]
    pub const fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Return the dictionary mutably if this is a dictionary.
    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Look up `key` if this is a dictionary.
    #[must_use]
    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&Self> {
        self.as_dict().and_then(|d| d.get(key))
    }

    /// Encode this value into canonical bytes.
    ///
    /// # Errors
    ///
    /// See [`crate::encode`].
    pub fn encode(&self) -> Result<Vec<u8>, BencodeError> {
        crate::encode::encode(self)
    }

    /// Exact length of the canonical encoding of this value.
    ///
    /// Saturates at `usize::MAX`.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        crate::encode::encoded_len(self)
    }

    /// Check that this tree is canonical as built.
    ///
    /// # Errors
    ///
    /// See [`crate::validate`].
    pub fn validate(&self) -> Result<(), BencodeError> {
        crate::validate::validate(self)
    }

    /// Encode into an owned canonical witness.
    ///
    /// # Errors
    ///
    /// See [`crate::encode`].
    pub fn to_canonical(&self) -> Result<CanonicalBytes, BencodeError> {
        self.encode().map(CanonicalBytes::new_unchecked)
    }

    /// SHA-256 of the canonical encoding.
    ///
    /// # Errors
    ///
    /// See [`crate::encode`].
    #[cfg(feature = "sha2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "sha2")))]
    pub fn sha256(&self) -> Result<[u8; 32], BencodeError> {
        Ok(self.to_canonical()?.sha256())
    }

    const fn is_container(&self) -> bool {
        matches!(self, Self::List(_) | Self::Dictionary(_))
    }
}

/// Tears nested containers down from a heap worklist so that dropping a deep tree never recurses.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending: Vec<Self> = match self {
            Self::List(items) if items.iter().any(Self::is_container) => core::mem::take(items),
            Self::Dictionary(d) if d.entries.iter().any(|(_, v)| v.is_container()) => {
                d.entries.drain(..).map(|(_, v)| v).collect()
            }
            _ => return,
        };
        while let Some(mut v) = pending.pop() {
            match &mut v {
                Self::List(items) => pending.append(items),
                Self::Dictionary(d) => pending.extend(d.entries.drain(..).map(|(_, v)| v)),
                Self::Integer(_) | Self::ByteString(_) => {}
            }
        }
    }
}

macro_rules! impl_value_from_integer {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Self::Integer(Integer::from(value))
            }
        }
    )*};
}

impl_value_from_integer!(i8, i16, i32, i64, isize, i128, u8, u16, u32, u64, usize, u128);

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Self::Integer(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Self::Integer(Integer::from_bigint(value))
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::ByteString(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::ByteString(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(value: &[u8; N]) -> Self {
        Self::ByteString(value.to_vec())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::str(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::ByteString(value.into_bytes())
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<Dictionary> for Value {
    fn from(value: Dictionary) -> Self {
        Self::Dictionary(value)
    }
}

type Entry = (Vec<u8>, Value);

/// A dictionary of byte-string keys to values.
///
/// Entries are kept in the order they were recorded. [`Dictionary::insert`] and every
/// constructor except [`Dictionary::from_unordered`] keep keys unique and strictly ascending;
/// [`Dictionary::push`] appends as-is so that a non-canonical layout can be represented and
/// reported by [`crate::validate`]. Lookups on a non-canonical dictionary resolve to the last
/// entry for a key, matching what [`crate::encode`] emits.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: Vec<Entry>,
    canonical: bool,
}

impl Dictionary {
    /// Create an empty dictionary.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            canonical: true,
        }
    }

    /// Create an empty dictionary with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            canonical: true,
        }
    }

    /// Build a canonical dictionary from entries in any order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if two entries share a key.
    pub fn try_from_entries(mut entries: Vec<Entry>) -> Result<Self, BencodeError> {
        entries.sort_by(|a, b| cmp_keys(&a.0, &b.0));
        if entries.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(BencodeError::new(ErrorCode::DuplicateKey, 0));
        }
        Ok(Self {
            entries,
            canonical: true,
        })
    }

    /// Wrap entries exactly as given, without sorting or de-duplicating.
    #[must_use]
    pub fn from_unordered(entries: Vec<Entry>) -> Self {
        let canonical = is_strictly_ascending(&entries);
        Self { entries, canonical }
    }

    #[inline]
    pub(crate) const fn from_sorted_unchecked(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            canonical: true,
        }
    }

    /// Append an entry at the end, keeping whatever order results.
    pub fn push(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Value>) {
        let key = key.into();
        if self.canonical {
            if let Some((last, _)) = self.entries.last() {
                self.canonical = cmp_keys(last, &key) == Ordering::Less;
            }
        }
        self.entries.push((key, value.into()));
    }

    /// Insert an entry in canonical position, returning the previous value for `key`.
    ///
    /// A non-canonical dictionary is normalized first.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Value>) -> Option<Value> {
        self.normalize();
        let key = key.into();
        let value = value.into();
        match self.search(&key) {
            Ok(idx) => Some(core::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (key, value));
                None
            }
        }
    }

    /// Look up the value for `key`.
    #[must_use]
    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&Value> {
        self.position(key.as_ref()).map(|idx| &self.entries[idx].1)
    }

    /// Look up the value for `key` mutably.
    pub fn get_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<&mut Value> {
        self.position(key.as_ref())
            .map(|idx| &mut self.entries[idx].1)
    }

    /// Returns `true` iff `key` is present.
    #[must_use]
    pub fn contains_key<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.position(key.as_ref()).is_some()
    }

    /// Remove every entry for `key`, returning the value that lookups resolved to.
    pub fn remove<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<Value> {
        let key = key.as_ref();
        if self.canonical {
            return match self.search(key) {
                Ok(idx) => Some(self.entries.remove(idx).1),
                Err(_) => None,
            };
        }
        let mut found = None;
        let mut kept = Vec::with_capacity(self.entries.len());
        for (k, v) in self.entries.drain(..) {
            if k == key {
                found = Some(v);
            } else {
                kept.push((k, v));
            }
        }
        self.entries = kept;
        self.canonical = is_strictly_ascending(&self.entries);
        found
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` iff there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` iff keys are unique and strictly ascending.
    #[inline]
    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        self.canonical
    }

    /// Sort entries by key and collapse duplicates, keeping the last recorded value.
    pub fn normalize(&mut self) {
        if self.canonical {
            return;
        }
        self.entries.sort_by(|a, b| cmp_keys(&a.0, &b.0));
        // `dedup_by` keeps the first of a run; swapping carries the later value forward.
        self.entries.dedup_by(|later, kept| {
            if later.0 == kept.0 {
                core::mem::swap(later, kept);
                true
            } else {
                false
            }
        });
        self.canonical = true;
    }

    /// Consume and return the normalized dictionary.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Iterate over entries in recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v))
    }

    /// Iterate over keys in recorded order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|(k, _)| k.as_slice())
    }

    /// Iterate over values in recorded order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Iterate mutably over values in recorded order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    /// Borrow the recorded entries.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Consume and return the recorded entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Entries in the order the encoder emits them.
    pub(crate) fn canonical_entries(&self) -> CanonicalEntries<'_> {
        if self.canonical {
            return CanonicalEntries::Sorted(self.entries.iter());
        }
        let mut order: Vec<&Entry> = self.entries.iter().collect();
        order.sort_by(|a, b| cmp_keys(&a.0, &b.0));
        order.dedup_by(|later, kept| {
            if later.0 == kept.0 {
                core::mem::swap(later, kept);
                true
            } else {
                false
            }
        });
        CanonicalEntries::Normalized(order.into_iter())
    }

    fn search(&self, key: &[u8]) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(k, _)| cmp_keys(k, key))
    }

    fn position(&self, key: &[u8]) -> Option<usize> {
        if self.canonical {
            self.search(key).ok()
        } else {
            self.entries.iter().rposition(|(k, _)| k == key)
        }
    }
}

fn is_strictly_ascending(entries: &[Entry]) -> bool {
    entries
        .windows(2)
        .all(|w| cmp_keys(&w[0].0, &w[1].0) == Ordering::Less)
}

pub(crate) enum CanonicalEntries<'a> {
    Sorted(core::slice::Iter<'a, Entry>),
    Normalized(alloc::vec::IntoIter<&'a Entry>),
}

impl<'a> Iterator for CanonicalEntries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Sorted(it) => it.next(),
            Self::Normalized(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Sorted(it) => it.size_hint(),
            Self::Normalized(it) => it.size_hint(),
        }
    }
}

impl DoubleEndedIterator for CanonicalEntries<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        match self {
            Self::Sorted(it) => it.next_back(),
            Self::Normalized(it) => it.next_back(),
        }
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Dictionary {}

impl<K: Into<Vec<u8>>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_unordered(entries).normalized()
    }
}

impl IntoIterator for Dictionary {
    type Item = Entry;
    type IntoIter = alloc::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = &'a Entry;
    type IntoIter = core::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
