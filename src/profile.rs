//! Canonical profile definition.
//!
//! A byte sequence is **canonical for this crate** iff:
//!
//! - It encodes exactly one Bencode value (no trailing bytes, not empty).
//! - Integers (`i...e`): an optional `-` followed by at least one ASCII digit, no `+`, no leading
//!   zero except the literal `0`, and never `-0`. Integers of any magnitude are accepted; those
//!   outside the `i64` range are carried as [`BigInt`](crate::BigInt).
//! - Byte strings (`<len>:<bytes>`): the length is ASCII decimal without leading zeros (except
//!   `0`) and counts raw bytes.
//! - Lists (`l...e`) hold any values.
//! - Dictionaries (`d...e`): keys are byte strings, unique, and strictly increasing by unsigned
//!   byte-lexicographic order.
//!
//! There is no whitespace anywhere.

use core::cmp::Ordering;

use crate::ErrorCode;

/// Decimal digits of `i64::MAX`.
pub const I64_MAX_DIGITS: &[u8] = b"9223372036854775807";

/// Decimal digits of the magnitude of `i64::MIN`.
pub const I64_MIN_MAGNITUDE_DIGITS: &[u8] = b"9223372036854775808";

pub(crate) const INT_START: u8 = b'i';
pub(crate) const LIST_START: u8 = b'l';
pub(crate) const DICT_START: u8 = b'd';
pub(crate) const END: u8 = b'e';
pub(crate) const LEN_SEP: u8 = b':';
pub(crate) const MINUS: u8 = b'-';

/// Check the digit run of an integer token.
///
/// `digits` is the run after the optional `-` sign.
pub const fn check_integer_digits(negative: bool, digits: &[u8]) -> Result<(), ErrorCode> {
    if digits.is_empty() {
        return Err(ErrorCode::InvalidInteger);
    }
    if digits[0] == b'0' {
        if digits.len() > 1 {
            return Err(ErrorCode::LeadingZero);
        }
        if negative {
            return Err(ErrorCode::NegativeZero);
        }
    }
    Ok(())
}

/// Compare two canonical decimal magnitudes numerically.
///
/// Both inputs must be non-empty ASCII digit runs without leading zeros.
#[must_use]
pub fn cmp_decimal(a: &[u8], b: &[u8]) -> Ordering {
    match a.len().cmp(&b.len()) {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}

/// Returns `true` iff the canonical magnitude `digits` with the given sign fits in `i64`.
#[must_use]
pub fn fits_i64(negative: bool, digits: &[u8]) -> bool {
    let bound = if negative {
        I64_MIN_MAGNITUDE_DIGITS
    } else {
        I64_MAX_DIGITS
    };
    cmp_decimal(digits, bound) != Ordering::Greater
}

/// Parse a canonical digit run that is known to fit in `i64`.
///
/// Returns `None` if the value does not fit.
#[must_use]
pub fn parse_i64(negative: bool, digits: &[u8]) -> Option<i64> {
    if !fits_i64(negative, digits) {
        return None;
    }
    // Accumulate toward the sign so that i64::MIN does not overflow.
    let mut acc: i64 = 0;
    for &d in digits {
        let digit = i64::from(d.checked_sub(b'0')?);
        acc = acc.checked_mul(10)?;
        acc = if negative {
            acc.checked_sub(digit)?
        } else {
            acc.checked_add(digit)?
        };
    }
    Some(acc)
}

/// Parse a canonical magnitude digit run into a `u128`.
///
/// Returns `None` if the value does not fit.
#[must_use]
pub fn parse_u128(digits: &[u8]) -> Option<u128> {
    digits.iter().try_fold(0_u128, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u128::from(d.checked_sub(b'0')?))
    })
}

/// Validate the digits of a big integer.
///
/// A big integer is canonical iff its digits are a non-empty ASCII decimal run with no leading
/// zero and the value lies outside the `i64` range.
pub fn validate_big_digits(negative: bool, digits: &[u8]) -> Result<(), ErrorCode> {
    if digits.is_empty() || digits[0] == b'0' || !digits.iter().all(u8::is_ascii_digit) {
        return Err(ErrorCode::BigIntNotCanonical);
    }
    if fits_i64(negative, digits) {
        return Err(ErrorCode::BigIntInI64Range);
    }
    Ok(())
}

/// Parse the digit run of a byte-string length prefix.
pub fn parse_length(digits: &[u8]) -> Result<usize, ErrorCode> {
    if digits.is_empty() || (digits[0] == b'0' && digits.len() > 1) {
        return Err(ErrorCode::InvalidLength);
    }
    let mut len: usize = 0;
    for &d in digits {
        len = len
            .checked_mul(10)
            .and_then(|v| v.checked_add(usize::from(d - b'0')))
            .ok_or(ErrorCode::LengthOverflow)?;
    }
    Ok(len)
}

/// Compare two dictionary keys by canonical order (unsigned byte-lexicographic).
#[inline]
#[must_use]
pub fn cmp_keys(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Check that `curr` may follow `prev` in a canonical dictionary.
pub fn check_key_order(prev: &[u8], curr: &[u8]) -> Result<(), ErrorCode> {
    match cmp_keys(prev, curr) {
        Ordering::Less => Ok(()),
        Ordering::Equal => Err(ErrorCode::DuplicateKey),
        Ordering::Greater => Err(ErrorCode::UnsortedKeys),
    }
}

/// Number of ASCII digits needed to print `n`.
#[must_use]
pub const fn decimal_len(mut n: u64) -> usize {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}

/// Length of the canonical encoding of an `i64` (`i...e`).
#[must_use]
pub const fn encoded_int_len(v: i64) -> usize {
    let sign = if v < 0 { 1 } else { 0 };
    2 + sign + decimal_len(v.unsigned_abs())
}

/// Length of the canonical encoding of a byte string with `n` payload bytes.
///
/// Saturates at `usize::MAX`.
#[must_use]
pub const fn encoded_bytes_len(n: usize) -> usize {
    let header = decimal_len(n as u64) + 1;
    match n.checked_add(header) {
        Some(v) => v,
        None => usize::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_digit_rules() {
        assert_eq!(check_integer_digits(false, b"0"), Ok(()));
        assert_eq!(check_integer_digits(false, b"10"), Ok(()));
        assert_eq!(check_integer_digits(true, b"0"), Err(ErrorCode::NegativeZero));
        assert_eq!(check_integer_digits(false, b"03"), Err(ErrorCode::LeadingZero));
        assert_eq!(check_integer_digits(true, b"00"), Err(ErrorCode::LeadingZero));
        assert_eq!(check_integer_digits(false, b""), Err(ErrorCode::InvalidInteger));
    }

    #[test]
    fn i64_boundaries() {
        assert_eq!(parse_i64(false, I64_MAX_DIGITS), Some(i64::MAX));
        assert_eq!(parse_i64(true, I64_MIN_MAGNITUDE_DIGITS), Some(i64::MIN));
        assert_eq!(parse_i64(false, I64_MIN_MAGNITUDE_DIGITS), None);
        assert_eq!(parse_i64(true, b"9223372036854775809"), None);
        assert_eq!(parse_i64(true, b"42"), Some(-42));
    }

    #[test]
    fn big_digits_must_be_out_of_range() {
        assert_eq!(
            validate_big_digits(false, I64_MAX_DIGITS),
            Err(ErrorCode::BigIntInI64Range)
        );
        assert_eq!(validate_big_digits(false, I64_MIN_MAGNITUDE_DIGITS), Ok(()));
        assert_eq!(
            validate_big_digits(false, b"0123456789012345678901"),
            Err(ErrorCode::BigIntNotCanonical)
        );
        assert_eq!(
            validate_big_digits(true, b"12a"),
            Err(ErrorCode::BigIntNotCanonical)
        );
    }

    #[test]
    fn length_rules() {
        assert_eq!(parse_length(b"0"), Ok(0));
        assert_eq!(parse_length(b"42"), Ok(42));
        assert_eq!(parse_length(b"042"), Err(ErrorCode::InvalidLength));
        assert_eq!(parse_length(b""), Err(ErrorCode::InvalidLength));
        assert_eq!(
            parse_length(b"99999999999999999999999999"),
            Err(ErrorCode::LengthOverflow)
        );
    }

    #[test]
    fn encoded_lengths() {
        assert_eq!(encoded_int_len(0), 3);
        assert_eq!(encoded_int_len(-1), 4);
        assert_eq!(encoded_int_len(i64::MIN), 22);
        assert_eq!(encoded_bytes_len(0), 2);
        assert_eq!(encoded_bytes_len(10), 13);
    }

    #[test]
    fn key_order() {
        assert_eq!(check_key_order(b"a", b"b"), Ok(()));
        assert_eq!(check_key_order(b"a", b"ab"), Ok(()));
        assert_eq!(check_key_order(b"b", b"a"), Err(ErrorCode::UnsortedKeys));
        assert_eq!(check_key_order(b"a", b"a"), Err(ErrorCode::DuplicateKey));
        // Unsigned byte order: 0xff sorts after ASCII.
        assert_eq!(check_key_order(b"z", &[0xff]), Ok(()));
    }
}
