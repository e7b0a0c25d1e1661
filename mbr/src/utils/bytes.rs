//! Fixed-endian integer extraction
//!
//! On-disk MBR fields are packed and unaligned, so values are copied out of the
//! byte stream rather than cast.

use crate::error::{MbrError, Result};

/// Byte order of a packed field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

/// Copy `N` bytes starting at `offset` out of `data`
///
/// Fails with `SizeMismatch` when the field does not fit.
pub fn field<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    let end = offset.checked_add(N).ok_or(MbrError::OutOfBounds)?;
    let bytes = data.get(offset..end).ok_or(MbrError::SizeMismatch)?;

    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Read a 16-bit little-endian value
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    field::<2>(data, offset).map(u16::from_le_bytes)
}

/// Read a 16-bit big-endian value
pub fn read_u16_be(data: &[u8], offset: usize) -> Result<u16> {
    field::<2>(data, offset).map(u16::from_be_bytes)
}

/// Read a 24-bit value into the low bits of a `u32`
pub fn read_u24(data: &[u8], offset: usize, endian: Endian) -> Result<u32> {
    let [a, b, c] = field::<3>(data, offset)?;
    Ok(match endian {
        Endian::Little => u32::from_le_bytes([a, b, c, 0]),
        Endian::Big => u32::from_be_bytes([0, a, b, c]),
    })
}

/// Read a 24-bit little-endian value
pub fn read_u24_le(data: &[u8], offset: usize) -> Result<u32> {
    read_u24(data, offset, Endian::Little)
}

/// Read a 24-bit big-endian value
pub fn read_u24_be(data: &[u8], offset: usize) -> Result<u32> {
    read_u24(data, offset, Endian::Big)
}

/// Read a 32-bit little-endian value
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    field::<4>(data, offset).map(u32::from_le_bytes)
}

/// Read a 32-bit big-endian value
pub fn read_u32_be(data: &[u8], offset: usize) -> Result<u32> {
    field::<4>(data, offset).map(u32::from_be_bytes)
}
