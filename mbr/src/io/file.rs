//! Host file backing store (requires `std`)

use std::fs::File;
use std::path::{Path, PathBuf};

use log::warn;
use spin::RwLock;

use super::BackingStore;
use crate::error::{MbrError, Result};

/// Backing store over a disk image or device node, opened read-only
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: RwLock<Option<File>>,
}

impl FileStore {
    /// Create a closed store for `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: RwLock::new(None),
        }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BackingStore for FileStore {
    fn open(&self) -> Result<()> {
        let mut file = self.file.write();
        if file.is_some() {
            return Err(MbrError::AlreadyOpen);
        }
        match File::open(&self.path) {
            Ok(handle) => {
                *file = Some(handle);
                Ok(())
            }
            Err(err) => {
                warn!("unable to open {}: {}", self.path.display(), err);
                Err(MbrError::ReadFailed)
            }
        }
    }

    fn close(&self) -> Result<()> {
        self.file.write().take();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.file.read().is_some()
    }

    fn size(&self) -> Result<u64> {
        let file = self.file.read();
        let file = file.as_ref().ok_or(MbrError::NotOpen)?;
        file.metadata().map(|meta| meta.len()).map_err(|err| {
            warn!("unable to stat {}: {}", self.path.display(), err);
            MbrError::ReadFailed
        })
    }

    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        use std::os::unix::fs::FileExt;

        let file = self.file.read();
        let file = file.as_ref().ok_or(MbrError::NotOpen)?;

        // Positioned reads may return short counts before EOF, loop until full or EOF
        let mut total = 0;
        while total < buf.len() {
            let position = offset.checked_add(total as u64).ok_or(MbrError::OutOfBounds)?;
            match file.read_at(&mut buf[total..], position) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("read of {} at {} failed: {}", self.path.display(), position, err);
                    return Err(MbrError::ReadFailed);
                }
            }
        }
        Ok(total)
    }

    #[cfg(not(unix))]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        use std::io::{Read, Seek, SeekFrom};

        // Exclusive lock: seek and read must not interleave between readers
        let mut file = self.file.write();
        let file = file.as_mut().ok_or(MbrError::NotOpen)?;

        file.seek(SeekFrom::Start(offset)).map_err(|err| {
            warn!("seek of {} to {} failed: {}", self.path.display(), offset, err);
            MbrError::ReadFailed
        })?;

        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("read of {} at {} failed: {}", self.path.display(), offset, err);
                    return Err(MbrError::ReadFailed);
                }
            }
        }
        Ok(total)
    }
}
