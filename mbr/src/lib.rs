//! MBR Volume System Reader
//!
//! A `no_std` reader for the Master Boot Record (MBR) partition table format,
//! with support for chains of Extended Boot Records (EBR).
//!
//! # Overview
//!
//! The first sector of a disk image or block device may hold an MBR: boot code,
//! four 16-byte partition entries and the `0x55 0xAA` boot signature. One of the
//! entries may point at an extended partition, whose first sector is an EBR with
//! the same layout, which in turn may point at the next EBR. This crate provides:
//! - Boot record and partition entry decoding (including diagnostic CHS fields)
//! - Extended partition chain resolution with sector size auto-detection
//! - Read-only, seekable views of each partition backed by a sector cache
//! - A quick probe that tells an MBR apart from NTFS/FAT boot sectors
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Record layer** - Decodes 512-byte boot records and their entries
//! 2. **IO layer** - Backing stores (memory, host file, any `BlockIo` device)
//! 3. **Volume layer** - Walks the MBR/EBR chain into a flat partition list
//! 4. **Partition layer** - Seek/read over one partition through an LRU cache
//!
//! # Usage
//!
//! ```ignore
//! use mbr::{Volume, Whence};
//!
//! let mut volume = Volume::new();
//! volume.open("disk.raw")?;
//!
//! for index in 0..volume.number_of_partitions() {
//!     let partition = volume.partition(index)?;
//!     let mut boot_sector = [0u8; 512];
//!     partition.read_at(&mut boot_sector, 0)?;
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod error;
pub mod io;
pub mod partition;
pub mod partition_type;
pub mod record;
pub mod types;
pub mod utils;
pub mod volume;

pub use error::{MbrError, Result};
pub use io::{BackingStore, BlockIoStore, CancellationToken, IoHandle, MemoryStore};
#[cfg(feature = "std")]
pub use io::FileStore;
pub use partition::{Partition, Whence};
pub use record::{BootRecord, ChsAddress, PartitionEntry};
pub use volume::{PartitionDescriptor, StoreOwnership, Volume, VolumeOptions};

// High-level API exports
pub use volume::signature::check_volume_signature;
#[cfg(feature = "std")]
pub use volume::signature::check_volume_signature_path;
