//! Partition descriptor as discovered in the MBR/EBR chain

use crate::error::Result;
use crate::record::PartitionEntry;
use crate::utils::sector::{sector_to_offset, sectors_to_bytes};

/// Location and type of one partition
///
/// Sector values are relative to the boot record the entry was found in and
/// only meaningful with the sector size active when the chain was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionDescriptor {
    /// Partition type byte
    pub partition_type: u8,

    /// Byte offset of the boot record holding the entry
    pub table_offset: i64,

    /// Start sector relative to `table_offset`
    pub sector_number: u32,

    /// Number of sectors
    pub sector_count: u32,
}

impl PartitionDescriptor {
    /// Build a descriptor from a decoded entry of the table at `table_offset`
    pub fn from_entry(entry: &PartitionEntry, table_offset: i64) -> Self {
        Self {
            partition_type: entry.partition_type,
            table_offset,
            sector_number: entry.start_lba,
            sector_count: entry.sector_count,
        }
    }

    /// Absolute byte offset of the partition start
    pub fn offset(&self, bytes_per_sector: u32) -> Result<i64> {
        sector_to_offset(self.table_offset, self.sector_number, bytes_per_sector)
    }

    /// Partition size in bytes
    pub fn size(&self, bytes_per_sector: u32) -> u64 {
        sectors_to_bytes(self.sector_count, bytes_per_sector)
    }
}
