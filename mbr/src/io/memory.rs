//! In-memory backing store

use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use super::BackingStore;
use crate::error::{MbrError, Result};

/// Backing store over a byte buffer, e.g. a disk image loaded into memory
#[derive(Debug)]
pub struct MemoryStore {
    data: Vec<u8>,
    open: AtomicBool,
}

impl MemoryStore {
    /// Create a closed store over `data`
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            open: AtomicBool::new(false),
        }
    }

    /// Raw contents of the store
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl BackingStore for MemoryStore {
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
        Ok(self.data.len() as u64)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if !self.is_open() {
            return Err(MbrError::NotOpen);
        }
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.data.len() => start,
            _ => return Ok(0),
        };

        let len = buf.len().min(self.data.len() - start);
        buf[..len].copy_from_slice(&self.data[start..start + len]);
        Ok(len)
    }
}
