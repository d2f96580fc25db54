//! Second-chance (CLOCK) replacement over arena-backed objects.
//!
//! Entries live in a ring whose front holds the newest arrival. Every
//! entry carries a "used" bit that a cache hit sets. When a miss finds the
//! cache full, the back of the ring is inspected: a used entry has its bit
//! cleared and is moved to the front instead of being evicted, and the
//! first entry found unused is destroyed. Only then is the new object
//! created and placed at the front with its bit clear.
//!
//! Unlike strict LRU, recency is a single bit per entry, refreshed by hits
//! and consumed by the eviction scan.

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;

use log::{debug, trace, warn};
use twin_core::{CacheError, ConfigError, FromKey, KeyProvider};
use twin_pool::{Slot, TypedAllocator};

use crate::config::CacheConfig;
use crate::stats::CacheStats;

struct Entry<T> {
    slot: Slot<T>,
    used: bool,
}

/// A bounded cache of `T` objects looked up by `K`.
///
/// The cache exclusively owns every object it holds; objects are created
/// in, and destroyed through, the cache's [`TypedAllocator`]. A key hits
/// an entry when the stored object reports
/// [`matches_key`](KeyProvider::matches_key); a missed key is turned into
/// an object with [`FromKey::from_key`].
///
/// # Example
///
/// ```
/// use twin_cache::{CacheConfig, SecondChanceCache};
/// use twin_core::{FromKey, KeyProvider};
///
/// struct Square { n: u64, value: u64 }
///
/// impl KeyProvider<u64> for Square {
///     fn matches_key(&self, key: &u64) -> bool { self.n == *key }
/// }
///
/// impl FromKey<u64> for Square {
///     fn from_key(key: &u64) -> Self { Square { n: *key, value: key * key } }
/// }
///
/// let mut cache: SecondChanceCache<u64, Square> =
///     SecondChanceCache::new(CacheConfig::new(2)).unwrap();
/// assert_eq!(cache.get(&3).unwrap().value, 9);
/// assert_eq!(cache.get(&4).unwrap().value, 16);
/// assert_eq!(cache.len(), 2);
/// ```
pub struct SecondChanceCache<K: ?Sized, T: 'static> {
    capacity: usize,
    alloc: TypedAllocator,
    /// The CLOCK ring; front is the most recently inserted entry.
    ring: VecDeque<Entry<T>>,
    stats: CacheStats,
    _key: PhantomData<fn(&K)>,
}

impl<K: ?Sized, T> SecondChanceCache<K, T>
where
    T: KeyProvider<K> + FromKey<K> + 'static,
{
    /// Build a cache and its backing arena from `config`.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        let alloc = TypedAllocator::new(config.pool)?;
        Self::with_allocator(config.capacity, alloc)
    }

    /// Build a cache on top of an existing allocator.
    ///
    /// Objects created by the caller in `alloc` stay owned by their slots
    /// and do not count towards `capacity`.
    pub fn with_allocator(capacity: usize, alloc: TypedAllocator) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity.into());
        }
        Ok(Self {
            capacity,
            alloc,
            ring: VecDeque::with_capacity(capacity),
            stats: CacheStats::default(),
            _key: PhantomData,
        })
    }

    /// Look up `key`, constructing its object on a miss.
    ///
    /// A hit marks the entry used. A miss at capacity evicts exactly one
    /// entry first. If the arena cannot hold the new object the call fails
    /// and no entry is added.
    ///
    /// # Panics
    ///
    /// A panic from the evicted object's destructor propagates after the
    /// victim has left the ring and its block is back in the arena.
    pub fn get(&mut self, key: &K) -> Result<&mut T, CacheError> {
        if let Some(pos) = self.position(key) {
            self.stats.hits += 1;
            let entry = &mut self.ring[pos];
            entry.used = true;
            return Ok(self.alloc.get_mut(&entry.slot));
        }

        self.stats.misses += 1;
        if self.ring.len() >= self.capacity {
            self.evict()?;
        }
        let slot = self.alloc.create(T::from_key(key))?;
        trace!("inserted entry at {}", slot.offset());
        self.ring.push_front(Entry { slot, used: false });
        let entry = &self.ring[0];
        Ok(self.alloc.get_mut(&entry.slot))
    }

    /// Run the second-chance scan and destroy the first unused entry.
    fn evict(&mut self) -> Result<(), CacheError> {
        while let Some(mut entry) = self.ring.pop_back() {
            if entry.used {
                entry.used = false;
                self.stats.second_chances += 1;
                self.ring.push_front(entry);
                continue;
            }
            self.stats.evictions += 1;
            debug!("evicting entry at {}", entry.slot.offset());
            self.alloc.destroy(entry.slot)?;
            return Ok(());
        }
        Ok(())
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.ring
            .iter()
            .position(|entry| self.alloc.get(&entry.slot).matches_key(key))
    }

    /// Whether `key` is resident. Does not mark the entry used.
    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// The resident object for `key`, if any. Does not mark it used.
    pub fn peek(&self, key: &K) -> Option<&T> {
        self.position(key)
            .map(|pos| self.alloc.get(&self.ring[pos].slot))
    }
}

impl<K: ?Sized, T: 'static> SecondChanceCache<K, T> {
    /// Number of resident objects.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether no object is resident.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Maximum number of resident objects.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resident objects with their used bits, newest first.
    pub fn iter(&self) -> impl Iterator<Item = (&T, bool)> + '_ {
        self.ring
            .iter()
            .map(|entry| (self.alloc.get(&entry.slot), entry.used))
    }

    /// Destroy every resident object.
    ///
    /// # Panics
    ///
    /// A panic from an object's destructor propagates. That entry has
    /// already left the ring and its block is back in the arena; entries
    /// not yet reached stay resident.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        while let Some(entry) = self.ring.pop_front() {
            self.alloc.destroy(entry.slot)?;
        }
        Ok(())
    }

    /// Lookup and eviction counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The allocator backing the cached objects.
    pub fn allocator(&self) -> &TypedAllocator {
        &self.alloc
    }
}

impl<K: ?Sized, T: 'static> Drop for SecondChanceCache<K, T> {
    fn drop(&mut self) {
        for entry in self.ring.drain(..) {
            if let Err(e) = self.alloc.destroy(entry.slot) {
                warn!("failed to destroy cache entry on drop: {e}");
            }
        }
    }
}

impl<K: ?Sized, T: fmt::Display + 'static> fmt::Display for SecondChanceCache<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ring.is_empty() {
            return writeln!(f, "<empty>");
        }
        for (value, used) in self.iter() {
            writeln!(f, "{value}{}", if used { " *" } else { "" })?;
        }
        Ok(())
    }
}

impl<K: ?Sized, T: 'static> fmt::Debug for SecondChanceCache<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondChanceCache")
            .field("capacity", &self.capacity)
            .field("len", &self.ring.len())
            .field("stats", &self.stats)
            .finish()
    }
}
