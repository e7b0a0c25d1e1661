//! Volume: an opened MBR partitioned backing store

mod chain;
pub mod descriptor;
pub mod signature;

pub use descriptor::PartitionDescriptor;

use alloc::sync::Arc;
use alloc::vec::Vec;

use log::{debug, warn};

use crate::error::{MbrError, Result};
use crate::io::{BackingStore, CancellationToken, IoHandle};
use crate::partition::Partition;
use crate::types::{
    is_supported_bytes_per_sector, DEFAULT_MAXIMUM_RECURSION_DEPTH,
    DEFAULT_SECTOR_CACHE_CAPACITY,
};
use chain::ChainResolver;

/// Who is responsible for the backing store's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOwnership {
    /// Created by [`Volume::open`] from a path
    OwnedByVolume,

    /// Passed in by the caller through [`Volume::open_store`]
    BorrowedByCaller,
}

/// Runtime limits of a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeOptions {
    /// Maximum number of EBRs followed after the MBR
    pub maximum_recursion_depth: usize,

    /// Number of sectors each partition reader caches
    pub sector_cache_capacity: usize,
}

impl Default for VolumeOptions {
    fn default() -> Self {
        Self {
            maximum_recursion_depth: DEFAULT_MAXIMUM_RECURSION_DEPTH,
            sector_cache_capacity: DEFAULT_SECTOR_CACHE_CAPACITY,
        }
    }
}

/// MBR volume
///
/// Created empty, populated once by `open`/`open_store`, emptied by `close`
/// and reusable afterwards.
pub struct Volume {
    io_handle: IoHandle,
    options: VolumeOptions,
    store: Option<Arc<dyn BackingStore>>,
    ownership: Option<StoreOwnership>,
    opened_by_volume: bool,
    disk_identity: u32,
    size: u64,
    partitions: Vec<Arc<PartitionDescriptor>>,
    bytes_per_sector_set_by_library: bool,
}

impl Volume {
    /// Create a closed volume with default options
    pub fn new() -> Self {
        Self::with_options(VolumeOptions::default())
    }

    /// Create a closed volume with explicit options
    pub fn with_options(options: VolumeOptions) -> Self {
        Self {
            io_handle: IoHandle::new(),
            options,
            store: None,
            ownership: None,
            opened_by_volume: false,
            disk_identity: 0,
            size: 0,
            partitions: Vec::new(),
            bytes_per_sector_set_by_library: false,
        }
    }

    /// Open the disk image or device at `path`
    ///
    /// The volume owns the file and closes it in [`Volume::close`].
    #[cfg(feature = "std")]
    pub fn open(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        if self.store.is_some() {
            return Err(MbrError::AlreadyOpen);
        }
        let store: Arc<dyn BackingStore> = Arc::new(crate::io::FileStore::new(path));
        store.open()?;

        if let Err(err) = self.attach(store.clone(), StoreOwnership::OwnedByVolume, true) {
            // Close errors are secondary to the resolve error
            let _ = store.close();
            return Err(err);
        }
        Ok(())
    }

    /// Open a volume over a caller-provided backing store
    ///
    /// The store is opened if necessary; it is only closed again by
    /// [`Volume::close`] when this call opened it.
    pub fn open_store(&mut self, store: Arc<dyn BackingStore>) -> Result<()> {
        if self.store.is_some() {
            return Err(MbrError::AlreadyOpen);
        }
        let opened_here = !store.is_open();
        if opened_here {
            store.open()?;
        }

        if let Err(err) = self.attach(store.clone(), StoreOwnership::BorrowedByCaller, opened_here) {
            if opened_here {
                let _ = store.close();
            }
            return Err(err);
        }
        Ok(())
    }

    /// Resolve the partition chain and commit the result
    fn attach(
        &mut self,
        store: Arc<dyn BackingStore>,
        ownership: StoreOwnership,
        opened_by_volume: bool,
    ) -> Result<()> {
        let size = store.size()?;

        let chain = ChainResolver::new(
            store.as_ref(),
            &self.io_handle.abort,
            self.io_handle.bytes_per_sector,
            self.options.maximum_recursion_depth,
        )
        .resolve()?;

        debug!(
            "opened volume: {} bytes, {} partitions",
            size,
            chain.partitions.len()
        );

        self.io_handle.bytes_per_sector = chain.bytes_per_sector;
        if chain.sector_size_latched {
            self.bytes_per_sector_set_by_library = true;
        }
        self.disk_identity = chain.disk_identity;
        self.size = size;
        self.partitions = chain.partitions.into_iter().map(Arc::new).collect();
        self.store = Some(store);
        self.ownership = Some(ownership);
        self.opened_by_volume = opened_by_volume;
        Ok(())
    }

    /// Close the volume
    ///
    /// Readers created before closing keep their own reference to the store
    /// but fail with `NotOpen` once the store itself is closed.
    pub fn close(&mut self) -> Result<()> {
        let store = self.store.take().ok_or(MbrError::NotOpen)?;

        let result = if self.opened_by_volume {
            store.close()
        } else {
            Ok(())
        };
        if let Err(err) = result {
            warn!("unable to close backing store: {}", err);
        }

        self.io_handle.clear();
        self.ownership = None;
        self.opened_by_volume = false;
        self.disk_identity = 0;
        self.size = 0;
        self.partitions.clear();
        self.bytes_per_sector_set_by_library = false;
        result
    }

    /// Request that a chain walk or partition read in progress stops
    pub fn signal_abort(&self) {
        self.io_handle.abort.cancel();
    }

    /// Token that aborts operations of this volume from another thread
    pub fn cancellation_token(&self) -> CancellationToken {
        self.io_handle.abort.clone()
    }

    /// Active sector size
    pub fn bytes_per_sector(&self) -> u32 {
        self.io_handle.bytes_per_sector
    }

    /// Override the sector size used by the next open
    ///
    /// Partitions of an open volume stay located with the size the chain was
    /// resolved with.
    ///
    /// # Errors
    /// `AlreadySet` once the size was fixed by reading an EBR,
    /// `AlreadyOpen` while a store is attached,
    /// `InvalidArgument` for sizes other than 512, 1024, 2048 or 4096
    pub fn set_bytes_per_sector(&mut self, bytes_per_sector: u32) -> Result<()> {
        if self.bytes_per_sector_set_by_library {
            return Err(MbrError::AlreadySet);
        }
        if self.is_open() {
            return Err(MbrError::AlreadyOpen);
        }
        if !is_supported_bytes_per_sector(bytes_per_sector) {
            return Err(MbrError::InvalidArgument);
        }
        self.io_handle.bytes_per_sector = bytes_per_sector;
        Ok(())
    }

    /// Disk identity from the MBR
    pub fn disk_identity(&self) -> u32 {
        self.disk_identity
    }

    /// Size of the backing store in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether a backing store is attached
    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// How the attached store is owned, `None` when closed
    pub fn ownership(&self) -> Option<StoreOwnership> {
        self.ownership
    }

    /// Number of partitions found in the MBR/EBR chain
    pub fn number_of_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Descriptors of all partitions, in discovery order
    pub fn partition_descriptors(&self) -> impl Iterator<Item = &PartitionDescriptor> {
        self.partitions.iter().map(|descriptor| descriptor.as_ref())
    }

    /// Create a reader for the partition at `index`
    ///
    /// # Arguments
    /// * `index` - Position in discovery order
    pub fn partition(&self, index: usize) -> Result<Partition> {
        let store = self.store.as_ref().ok_or(MbrError::NotOpen)?;
        let descriptor = self
            .partitions
            .get(index)
            .ok_or(MbrError::InvalidArgument)?;

        Partition::new(
            descriptor.clone(),
            store.clone(),
            self.io_handle.abort.clone(),
            self.io_handle.bytes_per_sector,
            self.options.sector_cache_capacity,
        )
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Volume {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Volume")
            .field("io_handle", &self.io_handle)
            .field("options", &self.options)
            .field("ownership", &self.ownership)
            .field("disk_identity", &self.disk_identity)
            .field("size", &self.size)
            .field("partitions", &self.partitions)
            .finish_non_exhaustive()
    }
}

impl Drop for Volume {
    fn drop(&mut self) {
        if self.is_open() {
            let _ = self.close();
        }
    }
}
