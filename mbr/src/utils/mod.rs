//! Utility functions for MBR decoding

pub mod bytes;
pub mod sector;
