//! Cached sector contents

use alloc::vec::Vec;

/// Bytes of one sector-aligned range read from the backing store
///
/// The buffer is zeroed when dropped so partition contents do not linger in
/// freed memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorData {
    bytes: Vec<u8>,
}

impl SectorData {
    /// Wrap bytes read from the store
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Sector contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes are held
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Overwrite the contents with zeros
    fn wipe(&mut self) {
        for byte in self.bytes.iter_mut() {
            // Volatile so the wipe is not elided as a dead store
            unsafe { core::ptr::write_volatile(byte, 0) };
        }
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }
}

impl Drop for SectorData {
    fn drop(&mut self) {
        self.wipe();
    }
}
