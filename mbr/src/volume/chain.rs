//! Extended boot record chain resolution
//!
//! Walks the MBR and every EBR it links to, collecting non-empty,
//! non-extended entries in discovery order:
//!
//! 1. Read the MBR at offset 0 (depth 0)
//! 2. Primary entries of a table become descriptors; at most one entry may be
//!    an extended pointer, its EBR is read immediately
//! 3. While reading the EBR linked from the MBR, failures caused by a wrong
//!    sector size are retried with the size doubled, up to 4096 bytes
//! 4. The walk continues at the EBR with depth + 1
//!
//! Nothing is committed to the volume until the whole chain is read.

use alloc::vec::Vec;

use log::{debug, trace, warn};

use crate::error::{MbrError, Result};
use crate::io::{BackingStore, CancellationToken};
use crate::record::{BootRecord, PartitionEntry};
use crate::types::MAXIMUM_BYTES_PER_SECTOR;
use crate::utils::sector::sector_to_offset;
use crate::volume::PartitionDescriptor;

/// Outcome of a successful chain walk
#[derive(Debug)]
pub(crate) struct ResolvedChain {
    pub disk_identity: u32,
    pub bytes_per_sector: u32,
    /// An EBR was read, so the sector size is now fixed
    pub sector_size_latched: bool,
    pub partitions: Vec<PartitionDescriptor>,
}

/// Walk state, one per open
pub(crate) struct ChainResolver<'a> {
    store: &'a dyn BackingStore,
    abort: &'a CancellationToken,
    bytes_per_sector: u32,
    maximum_depth: usize,
    sector_size_latched: bool,
    partitions: Vec<PartitionDescriptor>,
}

impl<'a> ChainResolver<'a> {
    pub fn new(
        store: &'a dyn BackingStore,
        abort: &'a CancellationToken,
        bytes_per_sector: u32,
        maximum_depth: usize,
    ) -> Self {
        Self {
            store,
            abort,
            bytes_per_sector,
            maximum_depth,
            sector_size_latched: false,
            partitions: Vec::new(),
        }
    }

    /// Read the MBR and follow the extended partition chain to its end
    pub fn resolve(mut self) -> Result<ResolvedChain> {
        let mut record = self.read_record(0)?;
        let disk_identity = record.disk_identity;

        debug!("master boot record: disk identity 0x{:08x}", disk_identity);

        let mut table_offset = 0i64;
        let mut depth = 0usize;

        loop {
            if depth > self.maximum_depth {
                warn!(
                    "extended partition chain exceeds maximum depth {}",
                    self.maximum_depth
                );
                return Err(MbrError::OutOfBounds);
            }

            let Some((next_offset, next_record)) = self.walk_table(&record, table_offset, depth)?
            else {
                break;
            };

            if next_offset == 0 || next_offset == table_offset {
                warn!("unsupported extended partition record offset {}", next_offset);
                return Err(MbrError::OutOfBounds);
            }

            record = next_record;
            table_offset = next_offset;
            depth += 1;
        }

        debug!(
            "resolved {} partitions over {} boot records, {} bytes per sector",
            self.partitions.len(),
            depth + 1,
            self.bytes_per_sector
        );

        Ok(ResolvedChain {
            disk_identity,
            bytes_per_sector: self.bytes_per_sector,
            sector_size_latched: self.sector_size_latched,
            partitions: self.partitions,
        })
    }

    /// Collect the entries of one table
    ///
    /// # Returns
    /// Offset and contents of the linked EBR, if the table has an extended entry
    fn walk_table(
        &mut self,
        record: &BootRecord,
        table_offset: i64,
        depth: usize,
    ) -> Result<Option<(i64, BootRecord)>> {
        let mut extended = None;

        for entry in record.used_entries() {
            if entry.is_extended() {
                if extended.is_some() {
                    warn!("more than one extended partition entry at offset {}", table_offset);
                    return Err(MbrError::UnsupportedLayout);
                }
                extended = Some(self.read_extended(entry, table_offset, depth)?);
            } else {
                trace!(
                    "partition entry {}: type 0x{:02x}, start {}, {} sectors",
                    entry.index,
                    entry.partition_type,
                    entry.start_lba,
                    entry.sector_count
                );
                self.partitions
                    .push(PartitionDescriptor::from_entry(entry, table_offset));
            }
        }

        Ok(extended)
    }

    /// Read the EBR an extended entry points to
    ///
    /// Only the EBR linked from the MBR may change the sector size.
    fn read_extended(
        &mut self,
        entry: &PartitionEntry,
        table_offset: i64,
        depth: usize,
    ) -> Result<(i64, BootRecord)> {
        loop {
            let offset = sector_to_offset(table_offset, entry.start_lba, self.bytes_per_sector)?;

            debug!(
                "reading extended partition record at offset {} (0x{:08x})",
                offset, offset
            );

            match self.read_record(offset) {
                Ok(record) => {
                    self.sector_size_latched = true;
                    return Ok((offset, record));
                }
                Err(MbrError::InvalidSignature | MbrError::ReadFailed)
                    if depth == 0 && self.bytes_per_sector < MAXIMUM_BYTES_PER_SECTOR =>
                {
                    self.bytes_per_sector *= 2;
                    debug!("retrying with {} bytes per sector", self.bytes_per_sector);
                }
                Err(err @ (MbrError::Cancelled | MbrError::NotOpen)) => return Err(err),
                Err(err) => {
                    warn!("unable to read extended partition record at offset {}: {}", offset, err);
                    return Err(MbrError::ReadFailed);
                }
            }
        }
    }

    fn read_record(&self, offset: i64) -> Result<BootRecord> {
        if self.abort.is_cancelled() {
            return Err(MbrError::Cancelled);
        }
        BootRecord::read_from(self.store, offset)
    }
}
