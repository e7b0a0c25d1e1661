//! Partition reader
//!
//! A [`Partition`] is a seekable, read-only view of one partition's byte range
//! in the backing store. Reads go through a private sector cache; the cursor
//! and the cache share one lock so a reader can be used from several threads.

pub mod cache;
pub mod sector;

pub use cache::SectorCache;
pub use sector::SectorData;

use alloc::sync::Arc;
use alloc::vec::Vec;

use log::{trace, warn};
use spin::RwLock;

use crate::error::{MbrError, Result};
use crate::io::{BackingStore, CancellationToken};
use crate::utils::sector::align_down;
use crate::volume::PartitionDescriptor;

/// Reference point for [`Partition::seek`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// From the start of the partition
    Set,
    /// From the current offset
    Cur,
    /// From the end of the partition
    End,
}

struct ReaderState {
    offset: i64,
    cache: SectorCache,
}

/// Read-only view of one partition
pub struct Partition {
    descriptor: Arc<PartitionDescriptor>,
    store: Arc<dyn BackingStore>,
    abort: CancellationToken,
    bytes_per_sector: u32,
    volume_offset: i64,
    size: i64,
    state: RwLock<ReaderState>,
}

impl Partition {
    /// Create a reader over `descriptor`
    ///
    /// # Arguments
    /// * `descriptor` - Partition location, shared with the volume
    /// * `store` - Backing store holding the volume
    /// * `abort` - Cancellation token of the volume
    /// * `bytes_per_sector` - Sector size the chain was resolved with
    /// * `cache_capacity` - Number of sectors to cache
    pub fn new(
        descriptor: Arc<PartitionDescriptor>,
        store: Arc<dyn BackingStore>,
        abort: CancellationToken,
        bytes_per_sector: u32,
        cache_capacity: usize,
    ) -> Result<Self> {
        if bytes_per_sector == 0 {
            return Err(MbrError::InvalidArgument);
        }
        let volume_offset = descriptor.offset(bytes_per_sector)?;
        let size = i64::try_from(descriptor.size(bytes_per_sector))
            .map_err(|_| MbrError::OutOfBounds)?;
        volume_offset
            .checked_add(size)
            .ok_or(MbrError::OutOfBounds)?;

        Ok(Self {
            descriptor,
            store,
            abort,
            bytes_per_sector,
            volume_offset,
            size,
            state: RwLock::new(ReaderState {
                offset: 0,
                cache: SectorCache::new(cache_capacity),
            }),
        })
    }

    /// Read from the current offset, advancing it
    ///
    /// # Returns
    /// Bytes read; 0 at or past the end of the partition
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.state.write();
        let start = state.offset;
        self.read_locked(&mut state, buf, start)
    }

    /// Read at `offset`, leaving the cursor after the bytes read
    ///
    /// Positioning and reading happen under one lock acquisition. A failed
    /// read leaves the cursor where it was.
    pub fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<usize> {
        if offset < 0 {
            return Err(MbrError::OutOfBounds);
        }
        let mut state = self.state.write();
        self.read_locked(&mut state, buf, offset)
    }

    /// Move the cursor
    ///
    /// Offsets past the end are allowed; reads there return 0.
    ///
    /// # Returns
    /// The new offset
    pub fn seek(&self, offset: i64, whence: Whence) -> Result<i64> {
        let mut state = self.state.write();
        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => state.offset,
            Whence::End => self.size,
        };
        let target = base.checked_add(offset).ok_or(MbrError::OutOfBounds)?;
        if target < 0 {
            return Err(MbrError::OutOfBounds);
        }
        state.offset = target;
        Ok(target)
    }

    /// Current offset within the partition
    pub fn offset(&self) -> i64 {
        self.state.read().offset
    }

    /// Partition size in bytes
    pub fn size(&self) -> u64 {
        // Validated non-negative in new()
        self.size as u64
    }

    /// Partition type byte
    pub fn partition_type(&self) -> u8 {
        self.descriptor.partition_type
    }

    /// Absolute byte offset of the partition in the backing store
    pub fn volume_offset(&self) -> i64 {
        self.volume_offset
    }

    /// Descriptor this reader was created from
    pub fn descriptor(&self) -> &PartitionDescriptor {
        &self.descriptor
    }

    /// Sector size used to locate the partition
    pub fn bytes_per_sector(&self) -> u32 {
        self.bytes_per_sector
    }

    /// Read from `start`; the cursor only moves once every sector was read
    fn read_locked(&self, state: &mut ReaderState, buf: &mut [u8], start: i64) -> Result<usize> {
        let requested = i64::try_from(buf.len()).map_err(|_| MbrError::ValueExceedsMaximum)?;
        if requested == 0 || start >= self.size {
            state.offset = start;
            return Ok(0);
        }

        let len = requested.min(self.size - start) as usize;
        let bytes_per_sector = i64::from(self.bytes_per_sector);

        let mut position = start;
        let mut done = 0usize;

        while done < len {
            // Non-negative: start was checked by the callers
            let range_start = align_down(position as u64, self.bytes_per_sector) as i64;
            let range_len = bytes_per_sector.min(self.size - range_start) as usize;
            let skip = (position - range_start) as usize;
            let key = self.volume_offset + range_start;

            let data = state
                .cache
                .get_or_insert_with(key, || self.load_range(key, range_len))?;

            let count = (data.len() - skip).min(len - done);
            buf[done..done + count].copy_from_slice(&data.as_bytes()[skip..skip + count]);

            done += count;
            position += count as i64;
        }

        state.offset = position;
        Ok(done)
    }

    fn load_range(&self, offset: i64, len: usize) -> Result<SectorData> {
        if self.abort.is_cancelled() {
            return Err(MbrError::Cancelled);
        }
        let store_offset = u64::try_from(offset).map_err(|_| MbrError::OutOfBounds)?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| MbrError::InsufficientMemory)?;
        bytes.resize(len, 0);

        trace!("reading {} bytes at offset {}", len, store_offset);

        let read = self.store.read_at(&mut bytes, store_offset)?;
        if read != len {
            warn!(
                "short partition read at offset {}: {} of {} bytes",
                store_offset, read, len
            );
            return Err(MbrError::ReadFailed);
        }
        Ok(SectorData::new(bytes))
    }
}

impl core::fmt::Debug for Partition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Partition")
            .field("descriptor", &self.descriptor)
            .field("bytes_per_sector", &self.bytes_per_sector)
            .field("volume_offset", &self.volume_offset)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "std")]
impl std::io::Read for Partition {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Partition::read(self, buf).map_err(Into::into)
    }
}

#[cfg(feature = "std")]
impl std::io::Seek for Partition {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        let (offset, whence) = match pos {
            std::io::SeekFrom::Start(offset) => (
                i64::try_from(offset).map_err(|_| std::io::Error::from(MbrError::OutOfBounds))?,
                Whence::Set,
            ),
            std::io::SeekFrom::Current(offset) => (offset, Whence::Cur),
            std::io::SeekFrom::End(offset) => (offset, Whence::End),
        };
        let target = Partition::seek(self, offset, whence)?;
        Ok(target as u64)
    }
}
