use alloc::vec::Vec;
use core::alloc::Layout;

use crate::{BencodeError, ErrorCode};

#[inline]
fn check_reserve_len<T>(len: usize, additional: usize, offset: usize) -> Result<(), BencodeError> {
    let needed = len
        .checked_add(additional)
        .ok_or_else(|| BencodeError::new(ErrorCode::LengthOverflow, offset))?;
    Layout::array::<T>(needed)
        .map_err(|_| BencodeError::new(ErrorCode::LengthOverflow, offset))?;
    Ok(())
}

/// Reserve exactly `additional` slots or fail with a structured error at `offset`.
#[inline]
pub fn try_reserve_exact<T>(
    v: &mut Vec<T>,
    additional: usize,
    offset: usize,
) -> Result<(), BencodeError> {
    let needed = v
        .len()
        .checked_add(additional)
        .ok_or_else(|| BencodeError::new(ErrorCode::LengthOverflow, offset))?;
    if needed <= v.capacity() {
        return Ok(());
    }
    check_reserve_len::<T>(v.len(), additional, offset)?;
    v.try_reserve_exact(additional)
        .map_err(|_| BencodeError::new(ErrorCode::AllocationFailed, offset))
}

/// Reserve at least `additional` slots or fail with a structured error at `offset`.
#[inline]
pub fn try_reserve<T>(v: &mut Vec<T>, additional: usize, offset: usize) -> Result<(), BencodeError> {
    let needed = v
        .len()
        .checked_add(additional)
        .ok_or_else(|| BencodeError::new(ErrorCode::LengthOverflow, offset))?;
    if needed <= v.capacity() {
        return Ok(());
    }
    check_reserve_len::<T>(v.len(), additional, offset)?;
    v.try_reserve(additional)
        .map_err(|_| BencodeError::new(ErrorCode::AllocationFailed, offset))
}

/// Copy a decoded byte run into an owned buffer without aborting on allocation failure.
#[inline]
pub fn try_vec_from_slice(bytes: &[u8], offset: usize) -> Result<Vec<u8>, BencodeError> {
    let mut v = Vec::new();
    try_reserve_exact(&mut v, bytes.len(), offset)?;
    v.extend_from_slice(bytes);
    Ok(v)
}

/// Append one element, growing fallibly.
#[inline]
pub fn try_push<T>(v: &mut Vec<T>, item: T, offset: usize) -> Result<(), BencodeError> {
    if v.len() == v.capacity() {
        try_reserve(v, 1, offset)?;
    }
    v.push(item);
    Ok(())
}
