//! Fixed-capacity LRU cache of partition sectors
//!
//! Keyed by the absolute byte offset of a sector in the backing store. Each
//! slot carries a use stamp; when full, the slot with the oldest stamp is
//! evicted.

use alloc::collections::BTreeMap;

use log::trace;

use super::sector::SectorData;
use crate::error::Result;

struct Slot {
    data: SectorData,
    stamp: u64,
}

/// Sector cache private to one partition reader
pub struct SectorCache {
    slots: BTreeMap<i64, Slot>,
    capacity: usize,
    clock: u64,
}

impl SectorCache {
    /// Create an empty cache holding at most `capacity` sectors (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: BTreeMap::new(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    /// Return the sector at `key`, loading it on a miss
    ///
    /// A failing `load` leaves the cache unchanged.
    pub fn get_or_insert_with<F>(&mut self, key: i64, load: F) -> Result<&SectorData>
    where
        F: FnOnce() -> Result<SectorData>,
    {
        self.clock += 1;
        let stamp = self.clock;

        if let Some(slot) = self.slots.get_mut(&key) {
            slot.stamp = stamp;
        } else {
            trace!("sector cache miss at offset {}", key);
            let data = load()?;
            if self.slots.len() >= self.capacity {
                self.evict_oldest();
            }
            self.slots.insert(key, Slot { data, stamp });
        }

        Ok(&self.slots[&key].data)
    }

    /// Number of cached sectors
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of cached sectors
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `key` is cached, without touching its stamp
    pub fn contains(&self, key: i64) -> bool {
        self.slots.contains_key(&key)
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.stamp)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            trace!("evicting cached sector at offset {}", key);
            self.slots.remove(&key);
        }
    }
}

impl core::fmt::Debug for SectorCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SectorCache")
            .field("len", &self.slots.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
