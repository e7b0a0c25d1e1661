//! Backing stores and per-volume IO state
//!
//! A volume and all partition readers created from it share one backing store.
//! Every read is positioned (offset + length), so readers on different threads
//! never contend on a shared cursor.

pub mod block;
#[cfg(feature = "std")]
pub mod file;
pub mod handle;
pub mod memory;

pub use block::BlockIoStore;
#[cfg(feature = "std")]
pub use file::FileStore;
pub use handle::{CancellationToken, IoHandle};
pub use memory::MemoryStore;

use crate::error::Result;

/// Random-access, read-only byte source holding a volume
///
/// Implementations use interior mutability so one store can be shared by
/// `Arc` between a [`Volume`](crate::Volume) and its partition readers.
pub trait BackingStore: Send + Sync {
    /// Open the store for reading
    fn open(&self) -> Result<()>;

    /// Close the store
    fn close(&self) -> Result<()>;

    /// Whether the store is currently open
    fn is_open(&self) -> bool;

    /// Total size of the store in bytes
    fn size(&self) -> Result<u64>;

    /// Read into `buf` starting at absolute byte `offset`
    ///
    /// # Returns
    /// Number of bytes read; less than `buf.len()` only when the end of the
    /// store is reached
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize>;
}
