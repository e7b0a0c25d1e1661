//! Error types for MBR volume operations

use core::fmt;

/// Result type for MBR volume operations
pub type Result<T> = core::result::Result<T, MbrError>;

/// Errors that can occur while decoding or reading an MBR volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbrError {
    /// Caller input is zero-length, out of range or otherwise unusable
    InvalidArgument,

    /// Buffer length does not match a fixed-size on-disk structure
    SizeMismatch,

    /// Boot record does not end in 0x55 0xAA
    InvalidSignature,

    /// Partition table layout is not supported (e.g. two extended entries)
    UnsupportedLayout,

    /// Offset, size or depth arithmetic exceeds a representable or configured limit
    OutOfBounds,

    /// Value exceeds the maximum the operation accepts
    ValueExceedsMaximum,

    /// Backing store read failed or returned fewer bytes than requested
    ReadFailed,

    /// Backing store write failed
    WriteFailed,

    /// Value was already set and may not be overridden
    AlreadySet,

    /// Volume already has an open backing store
    AlreadyOpen,

    /// Volume or backing store is not open
    NotOpen,

    /// Buffer allocation failed
    InsufficientMemory,

    /// Operation observed an abort request
    Cancelled,
}

impl fmt::Display for MbrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "Invalid argument"),
            Self::SizeMismatch => write!(f, "Buffer size does not match structure size"),
            Self::InvalidSignature => write!(f, "Invalid boot record signature"),
            Self::UnsupportedLayout => write!(f, "Unsupported partition table layout"),
            Self::OutOfBounds => write!(f, "Value out of bounds"),
            Self::ValueExceedsMaximum => write!(f, "Value exceeds maximum"),
            Self::ReadFailed => write!(f, "Read operation failed"),
            Self::WriteFailed => write!(f, "Write operation failed"),
            Self::AlreadySet => write!(f, "Value already set"),
            Self::AlreadyOpen => write!(f, "Volume already open"),
            Self::NotOpen => write!(f, "Volume or backing store not open"),
            Self::InsufficientMemory => write!(f, "Insufficient memory"),
            Self::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MbrError {}

#[cfg(feature = "std")]
impl From<MbrError> for std::io::Error {
    fn from(err: MbrError) -> Self {
        use std::io::ErrorKind;

        let kind = match err {
            MbrError::InvalidArgument | MbrError::OutOfBounds | MbrError::ValueExceedsMaximum => {
                ErrorKind::InvalidInput
            }
            MbrError::SizeMismatch | MbrError::InvalidSignature | MbrError::UnsupportedLayout => {
                ErrorKind::InvalidData
            }
            MbrError::ReadFailed => ErrorKind::UnexpectedEof,
            MbrError::Cancelled => ErrorKind::Interrupted,
            MbrError::NotOpen => ErrorKind::NotConnected,
            MbrError::InsufficientMemory => ErrorKind::OutOfMemory,
            _ => ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}
