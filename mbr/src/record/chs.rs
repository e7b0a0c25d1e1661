//! Cylinder-Head-Sector address decoding
//!
//! CHS values are legacy geometry and are only decoded for diagnostics; all
//! offset arithmetic uses LBA values.

use core::fmt;

use crate::error::Result;
use crate::utils::bytes::{read_u24, Endian};

/// Decoded CHS address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChsAddress {
    /// Cylinder (10 bits)
    pub cylinder: u16,

    /// Head
    pub head: u8,

    /// Sector (6 bits, 1-based on disk)
    pub sector: u8,
}

impl ChsAddress {
    /// Size of a packed CHS field
    pub const SIZE: usize = 3;

    /// Decode a packed 3-byte CHS field
    ///
    /// Layout of the 24-bit value (as read with `endian`): bits 0-7 head,
    /// bits 8-13 sector, bits 14-23 cylinder.
    pub fn from_bytes(data: &[u8], endian: Endian) -> Result<Self> {
        let mut value = read_u24(data, 0, endian)?;

        let head = (value & 0xff) as u8;
        value >>= 8;
        let sector = (value & 0x3f) as u8;
        value >>= 6;
        let cylinder = (value & 0x3ff) as u16;

        Ok(Self {
            cylinder,
            head,
            sector,
        })
    }
}

impl fmt::Display for ChsAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.cylinder, self.head, self.sector)
    }
}
