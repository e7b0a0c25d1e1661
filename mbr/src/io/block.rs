//! Backing store over a `gpt_disk_io::BlockIo` device
//!
//! Byte-granular reads are served by reading the covering blocks into a
//! scratch buffer and copying out the requested range.

use alloc::vec;
use core::sync::atomic::{AtomicBool, Ordering};

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;
use log::warn;
use spin::Mutex;

use super::BackingStore;
use crate::error::{MbrError, Result};

/// Adapts any block device to [`BackingStore`]
pub struct BlockIoStore<B: BlockIo + Send> {
    device: Mutex<B>,
    open: AtomicBool,
}

impl<B: BlockIo + Send> BlockIoStore<B> {
    /// Wrap a block device; the store starts closed
    pub fn new(device: B) -> Self {
        Self {
            device: Mutex::new(device),
            open: AtomicBool::new(false),
        }
    }

    /// Unwrap the block device
    pub fn into_inner(self) -> B {
        self.device.into_inner()
    }
}

impl<B: BlockIo + Send> BackingStore for BlockIoStore<B> {
    fn open(&self) -> Result<()> {
        self.open.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn size(&self) -> Result<u64> {
        let mut device = self.device.lock();
        let block_size = u64::from(device.block_size().to_u32());
        let blocks = device.num_blocks().map_err(|err| {
            warn!("unable to query block count: {}", err);
            MbrError::ReadFailed
        })?;
        blocks.checked_mul(block_size).ok_or(MbrError::OutOfBounds)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if !self.is_open() {
            return Err(MbrError::NotOpen);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let mut device = self.device.lock();
        let block_size = u64::from(device.block_size().to_u32());
        let total = device
            .num_blocks()
            .map_err(|err| {
                warn!("unable to query block count: {}", err);
                MbrError::ReadFailed
            })?
            .checked_mul(block_size)
            .ok_or(MbrError::OutOfBounds)?;

        if offset >= total {
            return Ok(0);
        }
        let len = (buf.len() as u64).min(total - offset);
        let end = offset + len;

        let first_block = offset / block_size;
        let last_block = (end - 1) / block_size;
        let span = usize::try_from((last_block - first_block + 1) * block_size)
            .map_err(|_| MbrError::ValueExceedsMaximum)?;

        let mut scratch = vec![0u8; span];
        device
            .read_blocks(Lba(first_block), &mut scratch)
            .map_err(|err| {
                warn!("block read at lba {} failed: {}", first_block, err);
                MbrError::ReadFailed
            })?;

        let skip = (offset - first_block * block_size) as usize;
        let len = len as usize;
        buf[..len].copy_from_slice(&scratch[skip..skip + len]);
        Ok(len)
    }
}
