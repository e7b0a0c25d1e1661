//! Partition table entry
//!
//! Layout of a 16-byte entry:
//!
//! | offset | size | field                 |
//! |--------|------|-----------------------|
//! | 0      | 1    | flags (0x80 bootable) |
//! | 1      | 3    | start address (CHS)   |
//! | 4      | 1    | partition type        |
//! | 5      | 3    | end address (CHS)     |
//! | 8      | 4    | start address (LBA)   |
//! | 12     | 4    | number of sectors     |

use crate::error::{MbrError, Result};
use crate::record::chs::ChsAddress;
use crate::types::{
    FLAG_BOOTABLE, PARTITION_ENTRY_SIZE, PARTITION_TYPE_EMPTY, PARTITION_TYPE_EXTENDED_CHS,
    PARTITION_TYPE_EXTENDED_LBA,
};
use crate::utils::bytes::{field, read_u32_le, Endian};

/// One decoded partition table slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartitionEntry {
    /// Slot index within its boot record (0-3)
    pub index: u8,

    /// Flags, bit 0x80 marks the entry bootable
    pub flags: u8,

    /// Partition type, 0x00 marks an unused slot
    pub partition_type: u8,

    /// Packed start address in CHS
    pub start_chs: [u8; 3],

    /// Packed end address in CHS
    pub end_chs: [u8; 3],

    /// Start sector, relative to the boot record holding this entry
    pub start_lba: u32,

    /// Number of sectors
    pub sector_count: u32,
}

impl PartitionEntry {
    /// Decode a 16-byte partition entry
    ///
    /// Only the structural size is validated; an all-zero entry decodes to an
    /// unused slot rather than an error.
    pub fn parse(index: u8, data: &[u8]) -> Result<Self> {
        if data.len() != PARTITION_ENTRY_SIZE {
            return Err(MbrError::SizeMismatch);
        }
        if index > 3 {
            return Err(MbrError::InvalidArgument);
        }

        Ok(Self {
            index,
            flags: data[0],
            start_chs: field::<3>(data, 1)?,
            partition_type: data[4],
            end_chs: field::<3>(data, 5)?,
            start_lba: read_u32_le(data, 8)?,
            sector_count: read_u32_le(data, 12)?,
        })
    }

    /// Whether the slot is unused
    pub fn is_empty(&self) -> bool {
        self.partition_type == PARTITION_TYPE_EMPTY
    }

    /// Whether the slot points at the next extended boot record
    pub fn is_extended(&self) -> bool {
        matches!(
            self.partition_type,
            PARTITION_TYPE_EXTENDED_CHS | PARTITION_TYPE_EXTENDED_LBA
        )
    }

    /// Whether the bootable flag is set
    pub fn is_bootable(&self) -> bool {
        self.flags & FLAG_BOOTABLE != 0
    }

    /// Decoded start address in CHS
    pub fn start_chs(&self) -> ChsAddress {
        // A 3-byte array always holds a full CHS field
        ChsAddress::from_bytes(&self.start_chs, Endian::Little).unwrap_or_default()
    }

    /// Decoded end address in CHS
    pub fn end_chs(&self) -> ChsAddress {
        ChsAddress::from_bytes(&self.end_chs, Endian::Little).unwrap_or_default()
    }
}
