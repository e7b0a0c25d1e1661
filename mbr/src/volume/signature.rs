//! Quick MBR signature probe
//!
//! NTFS and FAT boot sectors also end in 0x55 0xAA; their OEM and file system
//! type strings sit inside the boot code area, which is how they are told
//! apart from a partition table.

use log::{debug, warn};

use crate::error::{MbrError, Result};
use crate::io::BackingStore;
use crate::record::has_boot_signature;
use crate::types::{BOOT_RECORD_SIZE, PARTITION_TABLE_OFFSET};

/// Check whether a backing store starts with an MBR
///
/// The store is opened for the probe and closed again if it was not open
/// when passed in.
///
/// # Returns
/// `true` when the boot signature is present and the boot code area contains
/// neither "NTFS" nor "FAT"
pub fn check_volume_signature(store: &dyn BackingStore) -> Result<bool> {
    let opened_here = !store.is_open();
    if opened_here {
        store.open()?;
    }

    let result = probe(store);

    if opened_here {
        let closed = store.close();
        // A probe error takes precedence over a close error
        let matched = result?;
        closed?;
        return Ok(matched);
    }
    result
}

/// Check whether the file at `path` starts with an MBR
#[cfg(feature = "std")]
pub fn check_volume_signature_path(path: impl AsRef<std::path::Path>) -> Result<bool> {
    let store = crate::io::FileStore::new(path);
    check_volume_signature(&store)
}

fn probe(store: &dyn BackingStore) -> Result<bool> {
    let mut sector = [0u8; BOOT_RECORD_SIZE];
    let read = store.read_at(&mut sector, 0)?;
    if read != BOOT_RECORD_SIZE {
        warn!("short read of first sector: {} of {} bytes", read, BOOT_RECORD_SIZE);
        return Err(MbrError::ReadFailed);
    }

    if !has_boot_signature(&sector) {
        return Ok(false);
    }

    let boot_code = &sector[..PARTITION_TABLE_OFFSET];
    if contains(boot_code, b"NTFS") || contains(boot_code, b"FAT") {
        debug!("boot signature present but sector is a file system boot sector");
        return Ok(false);
    }
    Ok(true)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
