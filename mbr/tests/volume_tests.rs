//! Volume open and partition chain tests

mod common;

use std::sync::Arc;

use common::MbrImageBuilder;
use mbr::{
    BackingStore, MbrError, MemoryStore, PartitionDescriptor, StoreOwnership, Volume,
    VolumeOptions,
};

const SECTOR: usize = 512;

fn descriptors(volume: &Volume) -> Vec<PartitionDescriptor> {
    volume.partition_descriptors().copied().collect()
}

/// MBR with one primary and an extended partition holding two logical partitions
fn chained_image() -> MbrImageBuilder {
    MbrImageBuilder::new(64 * SECTOR)
        .disk_identity(0, 0x1234_5678)
        .entry(0, 0, 0x83, 1, 7)
        .entry(0, 1, 0x05, 8, 32)
        // First EBR at sector 8: a logical partition and the link to the next EBR
        .entry(8 * SECTOR, 0, 0x07, 1, 7)
        .entry(8 * SECTOR, 1, 0x05, 8, 16)
        // Second EBR at sector 16, relative to the first
        .entry(16 * SECTOR, 0, 0x0c, 2, 4)
}

#[test]
fn test_open_primary_partitions_only() {
    let store = MbrImageBuilder::new(16 * SECTOR)
        .entry(0, 0, 0x83, 1, 2)
        .entry(0, 2, 0x07, 3, 4)
        .entry(0, 3, 0x0c, 7, 1)
        .build_store();

    let mut volume = Volume::new();
    volume.open_store(store).expect("open should succeed");

    assert!(volume.is_open());
    assert_eq!(volume.number_of_partitions(), 3);
    assert_eq!(volume.bytes_per_sector(), 512);
    assert_eq!(volume.size(), 16 * 512);

    let types: Vec<u8> = volume.partition_descriptors().map(|p| p.partition_type).collect();
    assert_eq!(types, vec![0x83, 0x07, 0x0c]);
    assert!(volume.partition_descriptors().all(|p| p.table_offset == 0));
}

#[test]
fn test_open_one_mib_scenario() {
    let store = MbrImageBuilder::new(1_048_576)
        .entry(0, 0, 0x83, 2048, 2048)
        .build_store();

    let mut volume = Volume::new();
    volume.open_store(store).unwrap();

    assert_eq!(
        descriptors(&volume),
        vec![PartitionDescriptor {
            partition_type: 0x83,
            table_offset: 0,
            sector_number: 2048,
            sector_count: 2048,
        }]
    );

    let partition = volume.partition(0).unwrap();
    assert_eq!(partition.size(), 1_048_576);
    assert_eq!(partition.offset(), 0);
    assert_eq!(partition.volume_offset(), 1_048_576);

    // The partition lies past the end of the image
    let mut buf = [0u8; 16];
    assert_eq!(partition.read(&mut buf), Err(MbrError::ReadFailed));
}

#[test]
fn test_open_extended_chain() {
    let mut volume = Volume::new();
    volume.open_store(chained_image().build_store()).unwrap();

    assert_eq!(volume.disk_identity(), 0x1234_5678);
    assert_eq!(
        descriptors(&volume),
        vec![
            PartitionDescriptor {
                partition_type: 0x83,
                table_offset: 0,
                sector_number: 1,
                sector_count: 7,
            },
            PartitionDescriptor {
                partition_type: 0x07,
                table_offset: 8 * 512,
                sector_number: 1,
                sector_count: 7,
            },
            PartitionDescriptor {
                partition_type: 0x0c,
                table_offset: 16 * 512,
                sector_number: 2,
                sector_count: 4,
            },
        ]
    );
}

#[test]
fn test_empty_and_extended_entries_never_listed() {
    let mut volume = Volume::new();
    volume.open_store(chained_image().build_store()).unwrap();

    assert!(volume
        .partition_descriptors()
        .all(|p| !matches!(p.partition_type, 0x00 | 0x05 | 0x0f)));
}

#[test]
fn test_invalid_mbr_signature() {
    let store = MbrImageBuilder::new(4 * SECTOR).build_store();
    let mut volume = Volume::new();

    assert_eq!(volume.open_store(store.clone()), Err(MbrError::InvalidSignature));
    assert!(!volume.is_open());
    assert!(!store.is_open(), "store opened by the volume is closed on failure");
}

#[test]
fn test_image_smaller_than_boot_record() {
    let store: Arc<dyn BackingStore> = Arc::new(MemoryStore::new(vec![0u8; 100]));
    let mut volume = Volume::new();
    assert_eq!(volume.open_store(store), Err(MbrError::ReadFailed));
}

#[test]
fn test_two_extended_entries_unsupported() {
    let store = MbrImageBuilder::new(32 * SECTOR)
        .entry(0, 0, 0x83, 1, 1)
        .entry(0, 1, 0x05, 8, 8)
        .entry(0, 2, 0x0f, 16, 8)
        .boot_record(8 * SECTOR)
        .boot_record(16 * SECTOR)
        .build_store();

    let mut volume = Volume::new();
    assert_eq!(volume.open_store(store), Err(MbrError::UnsupportedLayout));

    // Nothing committed on failure
    assert!(!volume.is_open());
    assert_eq!(volume.number_of_partitions(), 0);
}

#[test]
fn test_extended_entry_pointing_at_mbr() {
    let store = MbrImageBuilder::new(8 * SECTOR)
        .entry(0, 0, 0x0f, 0, 8)
        .build_store();

    let mut volume = Volume::new();
    assert_eq!(volume.open_store(store), Err(MbrError::OutOfBounds));
}

#[test]
fn test_extended_entry_pointing_at_itself() {
    let store = MbrImageBuilder::new(16 * SECTOR)
        .entry(0, 0, 0x05, 4, 8)
        .entry(4 * SECTOR, 0, 0x83, 1, 1)
        .entry(4 * SECTOR, 1, 0x05, 0, 8)
        .build_store();

    let mut volume = Volume::new();
    assert_eq!(volume.open_store(store), Err(MbrError::OutOfBounds));
}

fn linear_chain(records: usize) -> Arc<dyn BackingStore> {
    // MBR links to sector 1, every EBR links to the sector after it
    let mut builder = MbrImageBuilder::new((records + 2) * SECTOR).entry(0, 0, 0x05, 1, 1);
    for index in 1..=records {
        builder = builder.entry(index * SECTOR, 0, 0x83, 0, 0);
        if index < records {
            builder = builder.entry(index * SECTOR, 1, 0x05, 1, 1);
        }
    }
    builder.build_store()
}

#[test]
fn test_chain_within_maximum_depth() {
    let options = VolumeOptions {
        maximum_recursion_depth: 3,
        ..VolumeOptions::default()
    };
    let mut volume = Volume::with_options(options);
    volume.open_store(linear_chain(3)).unwrap();
    assert_eq!(volume.number_of_partitions(), 3);
}

#[test]
fn test_chain_exceeding_maximum_depth() {
    let options = VolumeOptions {
        maximum_recursion_depth: 3,
        ..VolumeOptions::default()
    };
    let mut volume = Volume::with_options(options);
    assert_eq!(volume.open_store(linear_chain(4)), Err(MbrError::OutOfBounds));
}

/// EBRs every 4 sectors, each linking with LBA 4
fn back_link_image() -> MbrImageBuilder {
    let mut builder = MbrImageBuilder::new(64 * SECTOR).entry(0, 0, 0x05, 4, 60);
    for sector in (4..64).step_by(4) {
        builder = builder
            .entry(sector * SECTOR, 0, 0x83, 1, 1)
            .entry(sector * SECTOR, 1, 0x05, 4, 4);
    }
    builder
}

#[test]
fn test_back_link_stops_at_maximum_depth() {
    // Every EBR links with LBA 4, the absolute sector of the first EBR. Links
    // are relative to the table holding them, so EBR 8 -> 12 -> 16 and so on
    // instead of looping back to sector 4; the depth limit ends the walk.
    let options = VolumeOptions {
        maximum_recursion_depth: 8,
        ..VolumeOptions::default()
    };
    let mut volume = Volume::with_options(options);
    assert_eq!(
        volume.open_store(back_link_image().build_store()),
        Err(MbrError::OutOfBounds)
    );
    assert!(!volume.is_open());
    assert_eq!(volume.number_of_partitions(), 0);

    // The same chain is fully walked once the limit allows it to reach the end
    // of the image, where the link past the last EBR cannot be read
    let mut volume = Volume::new();
    assert_eq!(
        volume.open_store(back_link_image().build_store()),
        Err(MbrError::ReadFailed)
    );
}

#[test]
fn test_unreadable_ebr_is_fatal() {
    // No valid EBR at any sector size
    let store = MbrImageBuilder::new(64 * SECTOR)
        .entry(0, 0, 0x83, 1, 1)
        .entry(0, 1, 0x0f, 2, 8)
        .build_store();

    let mut volume = Volume::new();
    assert_eq!(volume.open_store(store), Err(MbrError::ReadFailed));
    assert_eq!(volume.bytes_per_sector(), 512);
}

fn four_kib_image() -> MbrImageBuilder {
    // Extended entry at LBA 2 is only valid at 4096 bytes per sector (offset 8192);
    // offsets 1024, 2048 and 4096 hold no boot record
    MbrImageBuilder::new(32 * 4096)
        .entry(0, 0, 0x83, 4, 1)
        .entry(0, 1, 0x0f, 2, 2)
        .entry(2 * 4096, 0, 0x07, 1, 1)
}

#[test]
fn test_sector_size_auto_detection() {
    let mut volume = Volume::new();
    assert_eq!(volume.bytes_per_sector(), 512);

    volume.open_store(four_kib_image().build_store()).unwrap();

    assert_eq!(volume.bytes_per_sector(), 4096);
    assert_eq!(volume.number_of_partitions(), 2);
    assert_eq!(volume.set_bytes_per_sector(512), Err(MbrError::AlreadySet));

    let logical = volume.partition(1).unwrap();
    assert_eq!(logical.volume_offset(), 2 * 4096 + 4096);
    assert_eq!(logical.size(), 4096);
}

#[test]
fn test_explicit_sector_size() {
    let mut volume = Volume::new();
    assert_eq!(volume.set_bytes_per_sector(1000), Err(MbrError::InvalidArgument));
    volume.set_bytes_per_sector(4096).unwrap();

    volume.open_store(four_kib_image().build_store()).unwrap();
    assert_eq!(volume.bytes_per_sector(), 4096);
    assert_eq!(volume.partition(0).unwrap().volume_offset(), 4 * 4096);
}

#[test]
fn test_primary_only_does_not_latch_sector_size() {
    let store = MbrImageBuilder::new(8 * SECTOR)
        .entry(0, 0, 0x83, 1, 1)
        .build_store();

    let mut volume = Volume::new();
    volume.open_store(store).unwrap();
    assert_eq!(volume.set_bytes_per_sector(2048), Err(MbrError::AlreadyOpen));

    volume.close().unwrap();
    assert_eq!(volume.set_bytes_per_sector(2048), Ok(()));
    assert_eq!(volume.bytes_per_sector(), 2048);
}

#[test]
fn test_sector_size_fixed_while_open() {
    let store = MbrImageBuilder::new(1_048_576)
        .entry(0, 0, 0x83, 2048, 2048)
        .build_store();

    let mut volume = Volume::new();
    volume.open_store(store).unwrap();

    assert_eq!(volume.set_bytes_per_sector(4096), Err(MbrError::AlreadyOpen));
    assert_eq!(volume.bytes_per_sector(), 512);

    let partition = volume.partition(0).unwrap();
    assert_eq!(partition.bytes_per_sector(), 512);
    assert_eq!(partition.volume_offset(), 1_048_576);
    assert_eq!(partition.size(), 1_048_576);
}

#[test]
fn test_reopen_yields_identical_partitions() {
    let store = chained_image().build_store();
    let mut volume = Volume::new();

    volume.open_store(store.clone()).unwrap();
    let first = descriptors(&volume);
    volume.close().unwrap();

    assert!(!volume.is_open());
    assert_eq!(volume.number_of_partitions(), 0);
    assert_eq!(volume.bytes_per_sector(), 512);

    volume.open_store(store).unwrap();
    assert_eq!(descriptors(&volume), first);
}

#[test]
fn test_open_twice_fails() {
    let mut volume = Volume::new();
    volume.open_store(chained_image().build_store()).unwrap();
    assert_eq!(
        volume.open_store(chained_image().build_store()),
        Err(MbrError::AlreadyOpen)
    );
    assert_eq!(volume.number_of_partitions(), 3);
}

#[test]
fn test_close_unopened_volume() {
    let mut volume = Volume::new();
    assert_eq!(volume.close(), Err(MbrError::NotOpen));
}

#[test]
fn test_store_ownership() {
    let store = chained_image().build_store();
    let mut volume = Volume::new();

    // Closed store: opened by the volume, closed again on close
    volume.open_store(store.clone()).unwrap();
    assert_eq!(volume.ownership(), Some(StoreOwnership::BorrowedByCaller));
    assert!(store.is_open());
    volume.close().unwrap();
    assert!(!store.is_open());
    assert_eq!(volume.ownership(), None);

    // Already open store: left open on close
    store.open().unwrap();
    volume.open_store(store.clone()).unwrap();
    volume.close().unwrap();
    assert!(store.is_open());
}

#[test]
fn test_partition_index_out_of_range() {
    let mut volume = Volume::new();
    assert_eq!(volume.partition(0).err(), Some(MbrError::NotOpen));

    volume.open_store(chained_image().build_store()).unwrap();
    assert!(volume.partition(2).is_ok());
    assert_eq!(volume.partition(3).err(), Some(MbrError::InvalidArgument));
}

#[test]
fn test_abort_before_open() {
    let store = chained_image().build_store();
    let mut volume = Volume::new();

    volume.signal_abort();
    assert_eq!(volume.open_store(store.clone()), Err(MbrError::Cancelled));
    assert!(!volume.is_open());

    volume.cancellation_token().reset();
    volume.open_store(store).unwrap();
    assert_eq!(volume.number_of_partitions(), 3);
}

#[test]
fn test_abort_interrupts_partition_reads() {
    let mut volume = Volume::new();
    volume.open_store(chained_image().build_store()).unwrap();
    let partition = volume.partition(0).unwrap();

    let token = volume.cancellation_token();
    std::thread::spawn(move || token.cancel()).join().unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(partition.read(&mut buf), Err(MbrError::Cancelled));
}
