//! Common constants for the MBR on-disk format

/// Size of a boot record (MBR or EBR), independent of the device sector size
pub const BOOT_RECORD_SIZE: usize = 512;

/// Offset of the disk identity in the "modern" boot record layout
pub const DISK_IDENTITY_OFFSET: usize = 440;

/// Offset of the partition table (classical and modern layout)
pub const PARTITION_TABLE_OFFSET: usize = 446;

/// Size of a single partition table entry
pub const PARTITION_ENTRY_SIZE: usize = 16;

/// Number of partition entries per boot record
pub const PARTITION_ENTRY_COUNT: usize = 4;

/// Offset of the boot signature
pub const BOOT_SIGNATURE_OFFSET: usize = 510;

/// Boot signature bytes
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xaa];

/// Bootable flag in the partition entry flags byte
pub const FLAG_BOOTABLE: u8 = 0x80;

/// Partition type of an unused entry
pub const PARTITION_TYPE_EMPTY: u8 = 0x00;

/// Extended partition, CHS addressed
pub const PARTITION_TYPE_EXTENDED_CHS: u8 = 0x05;

/// Extended partition, LBA addressed
pub const PARTITION_TYPE_EXTENDED_LBA: u8 = 0x0f;

/// Default number of bytes per sector
pub const DEFAULT_BYTES_PER_SECTOR: u32 = 512;

/// Largest sector size tried by auto-detection
pub const MAXIMUM_BYTES_PER_SECTOR: u32 = 4096;

/// Sector sizes accepted (the set Linux fdisk supports)
pub const SUPPORTED_BYTES_PER_SECTOR: [u32; 4] = [512, 1024, 2048, 4096];

/// Default maximum depth of the extended boot record chain
pub const DEFAULT_MAXIMUM_RECURSION_DEPTH: usize = 256;

/// Default number of sectors each partition reader keeps cached
pub const DEFAULT_SECTOR_CACHE_CAPACITY: usize = 16;

/// Check whether a sector size is one of the supported values
pub fn is_supported_bytes_per_sector(bytes_per_sector: u32) -> bool {
    SUPPORTED_BYTES_PER_SECTOR.contains(&bytes_per_sector)
}
