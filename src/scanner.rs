use crate::{BencodeError, ErrorCode};

/// Positional cursor over an immutable byte slice.
///
/// All reads are exact byte counts. A read that would run past the end fails with
/// `UnexpectedEof` at the offset where the read started; the cursor does not move on failure.
#[derive(Debug, Clone, Copy)]
pub struct ByteScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteScanner<'a> {
    /// Create a scanner positioned at the start of `data`.
    #[inline]
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// The underlying buffer.
    #[inline]
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of unread bytes.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` once every byte has been consumed.
    #[inline]
    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Look at the next byte without consuming it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Consume one byte.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` at the end of input.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, BencodeError> {
        let b = self
            .peek()
            .ok_or_else(|| BencodeError::new(ErrorCode::UnexpectedEof, self.pos))?;
        self.pos += 1;
        Ok(b)
    }

    /// Consume exactly `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns `LengthOverflow` if the end offset overflows, `UnexpectedEof` if fewer than `n`
    /// bytes remain.
    pub fn consume(&mut self, n: usize) -> Result<&'a [u8], BencodeError> {
        let off = self.pos;
        let end = off
            .checked_add(n)
            .ok_or_else(|| BencodeError::new(ErrorCode::LengthOverflow, off))?;
        if end > self.data.len() {
            return Err(BencodeError::new(ErrorCode::UnexpectedEof, off));
        }
        let s = &self.data[off..end];
        self.pos = end;
        Ok(s)
    }

    /// Consume `byte` or fail with `code` at the current offset.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` at the end of input, `code` on a different byte.
    pub fn expect(&mut self, byte: u8, code: ErrorCode) -> Result<(), BencodeError> {
        let off = self.pos;
        if self.read_u8()? == byte {
            Ok(())
        } else {
            self.pos = off;
            Err(BencodeError::new(code, off))
        }
    }

    /// Consume the longest run of ASCII digits (possibly empty).
    #[must_use]
    pub fn read_decimal_run(&mut self) -> &'a [u8] {
        let start = self.pos;
        let run = self.data[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        self.pos = start + run;
        &self.data[start..self.pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_past_end_leaves_cursor() {
        let mut s = ByteScanner::new(b"4:sp");
        assert_eq!(s.consume(2).unwrap(), b"4:");
        let err = s.consume(4).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedEof);
        assert_eq!(err.offset, 2);
        assert_eq!(s.position(), 2);
        assert_eq!(s.remaining(), 2);
    }

    #[test]
    fn consume_overflow_is_reported() {
        let mut s = ByteScanner::new(b"ab");
        s.read_u8().unwrap();
        let err = s.consume(usize::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::LengthOverflow);
    }

    #[test]
    fn decimal_run_stops_at_non_digit() {
        let mut s = ByteScanner::new(b"123:x");
        assert_eq!(s.read_decimal_run(), b"123");
        assert_eq!(s.peek(), Some(b':'));
        assert_eq!(s.read_decimal_run(), b"");
    }

    #[test]
    fn expect_mismatch_does_not_advance() {
        let mut s = ByteScanner::new(b"x");
        let err = s.expect(b':', ErrorCode::InvalidLength).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLength);
        assert_eq!(s.position(), 0);
        assert!(!s.is_at_end());
    }
}
