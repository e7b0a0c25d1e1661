//! Sector alignment and offset calculation utilities
//!
//! Sector sizes are only known at runtime (512 to 4096 bytes), so every helper
//! takes the active `bytes_per_sector`.

use crate::error::{MbrError, Result};

/// Convert a sector number relative to a partition table into an absolute byte offset
///
/// `table_offset + sector * bytes_per_sector`, rejecting results that do not
/// fit a signed 64-bit offset.
pub fn sector_to_offset(table_offset: i64, sector: u32, bytes_per_sector: u32) -> Result<i64> {
    let relative = i64::from(sector)
        .checked_mul(i64::from(bytes_per_sector))
        .ok_or(MbrError::OutOfBounds)?;
    table_offset.checked_add(relative).ok_or(MbrError::OutOfBounds)
}

/// Convert a sector count into a byte count
pub fn sectors_to_bytes(count: u32, bytes_per_sector: u32) -> u64 {
    // u32 * u32 always fits in u64
    u64::from(count) * u64::from(bytes_per_sector)
}

/// Align value to sector boundary (round down)
pub fn align_down(value: u64, bytes_per_sector: u32) -> u64 {
    let bps = u64::from(bytes_per_sector);
    value - (value % bps)
}
