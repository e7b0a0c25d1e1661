//! Disk image builder laying out MBR and EBR sectors

use std::sync::Arc;

use crate::common::MemoryBlockDevice;
use mbr::{BackingStore, MemoryStore};

pub struct MbrImageBuilder {
    data: Vec<u8>,
}

#[allow(dead_code)]
impl MbrImageBuilder {
    /// Zero-filled image of `size` bytes
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
        }
    }

    /// Image starting out with `contents`
    pub fn from_contents(contents: Vec<u8>) -> Self {
        Self { data: contents }
    }

    /// Write the 0x55 0xAA trailer of the boot record at byte offset `at`
    pub fn boot_record(mut self, at: usize) -> Self {
        self.data[at + 510] = 0x55;
        self.data[at + 511] = 0xaa;
        self
    }

    /// Write the disk identity of the boot record at `at`
    pub fn disk_identity(mut self, at: usize, identity: u32) -> Self {
        self.data[at + 440..at + 444].copy_from_slice(&identity.to_le_bytes());
        self
    }

    /// Write partition entry `slot` of the boot record at `at` and sign it
    pub fn entry(
        mut self,
        at: usize,
        slot: usize,
        partition_type: u8,
        start_lba: u32,
        sector_count: u32,
    ) -> Self {
        let start = at + 446 + slot * 16;
        self.data[start..start + 16].fill(0);
        self.data[start + 4] = partition_type;
        self.data[start + 8..start + 12].copy_from_slice(&start_lba.to_le_bytes());
        self.data[start + 12..start + 16].copy_from_slice(&sector_count.to_le_bytes());
        self.boot_record(at)
    }

    /// Overwrite bytes starting at `at`
    pub fn bytes(mut self, at: usize, contents: &[u8]) -> Self {
        self.data[at..at + contents.len()].copy_from_slice(contents);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }

    pub fn build_store(self) -> Arc<dyn BackingStore> {
        Arc::new(MemoryStore::new(self.data))
    }

    pub fn build_device(self, block_size: usize) -> MemoryBlockDevice {
        MemoryBlockDevice::with_block_size(self.data, block_size)
    }
}
