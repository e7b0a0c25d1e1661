//! Boot record decoding
//!
//! The MBR and every EBR share one 512-byte layout. Two variants exist:
//!
//! - **classical**: 446 bytes of boot code, the partition table, the signature
//! - **modern**: 440 bytes of boot code, a 4-byte disk identity, 2 bytes of
//!   padding, the partition table, the signature
//!
//! The disk identity is always read from the modern offset, including for
//! classical sectors where those bytes are boot code.

pub mod chs;
pub mod entry;

pub use chs::ChsAddress;
pub use entry::PartitionEntry;

use crate::error::{MbrError, Result};
use crate::io::BackingStore;
use crate::types::{
    BOOT_RECORD_SIZE, BOOT_SIGNATURE, BOOT_SIGNATURE_OFFSET, DISK_IDENTITY_OFFSET,
    PARTITION_ENTRY_COUNT, PARTITION_ENTRY_SIZE, PARTITION_TABLE_OFFSET,
};
use crate::utils::bytes::read_u32_le;
use log::{trace, warn};

/// Decoded MBR or EBR sector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootRecord {
    /// Disk identity (meaningful for the modern layout only)
    pub disk_identity: u32,

    /// The four partition entries, in slot order
    pub entries: [PartitionEntry; PARTITION_ENTRY_COUNT],
}

impl BootRecord {
    /// Decode a boot record from exactly 512 bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != BOOT_RECORD_SIZE {
            return Err(MbrError::SizeMismatch);
        }
        if !has_boot_signature(data) {
            return Err(MbrError::InvalidSignature);
        }

        let disk_identity = read_u32_le(data, DISK_IDENTITY_OFFSET)?;

        let mut entries = [PartitionEntry::default(); PARTITION_ENTRY_COUNT];
        for (index, slot) in entries.iter_mut().enumerate() {
            let start = PARTITION_TABLE_OFFSET + index * PARTITION_ENTRY_SIZE;
            *slot = PartitionEntry::parse(index as u8, &data[start..start + PARTITION_ENTRY_SIZE])?;
        }

        Ok(Self {
            disk_identity,
            entries,
        })
    }

    /// Read and decode the boot record at `offset` in a backing store
    ///
    /// # Arguments
    /// * `store` - Backing store holding the volume
    /// * `offset` - Absolute byte offset of the boot record
    ///
    /// # Returns
    /// The decoded boot record; `ReadFailed` if fewer than 512 bytes are available
    pub fn read_from(store: &dyn BackingStore, offset: i64) -> Result<Self> {
        let offset = u64::try_from(offset).map_err(|_| MbrError::OutOfBounds)?;
        let mut buffer = [0u8; BOOT_RECORD_SIZE];

        trace!("reading boot record at offset {} (0x{:08x})", offset, offset);

        let read = store.read_at(&mut buffer, offset)?;
        if read != BOOT_RECORD_SIZE {
            warn!(
                "short boot record read at offset {}: {} of {} bytes",
                offset, read, BOOT_RECORD_SIZE
            );
            return Err(MbrError::ReadFailed);
        }

        Self::parse(&buffer)
    }

    /// Entries that are in use, in slot order
    pub fn used_entries(&self) -> impl Iterator<Item = &PartitionEntry> {
        self.entries.iter().filter(|entry| !entry.is_empty())
    }
}

/// Check the 0x55 0xAA trailer of a boot record sized buffer
pub fn has_boot_signature(data: &[u8]) -> bool {
    data.get(BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2) == Some(&BOOT_SIGNATURE[..])
}
