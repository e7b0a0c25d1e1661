//! Per-volume IO state: sector size and abort flag

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::types::DEFAULT_BYTES_PER_SECTOR;

/// Shared abort flag
///
/// Clones observe the same flag, so a token handed to another thread can
/// interrupt a chain walk or partition read in progress. Long operations poll
/// the flag before each backing store read.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear a previous cancellation request
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// IO configuration shared by a volume and the readers it creates
#[derive(Debug, Clone)]
pub struct IoHandle {
    /// Sector size used for all LBA to byte conversions
    pub bytes_per_sector: u32,

    /// Abort flag
    pub abort: CancellationToken,
}

impl IoHandle {
    /// Create a handle with 512-byte sectors and no pending abort
    pub fn new() -> Self {
        Self {
            bytes_per_sector: DEFAULT_BYTES_PER_SECTOR,
            abort: CancellationToken::new(),
        }
    }

    /// Reset to the initial state
    pub fn clear(&mut self) {
        self.bytes_per_sector = DEFAULT_BYTES_PER_SECTOR;
        self.abort.reset();
    }
}

impl Default for IoHandle {
    fn default() -> Self {
        Self::new()
    }
}
