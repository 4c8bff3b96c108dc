//! An open-addressing hash set of `i64` keys.
//!
//! [`LongHashSet`] is the coverage container used on the instrumentation hot
//! path. Every intercepted instruction lands here, so the set avoids per-entry
//! allocation and supports an O(1) [`clear`](LongHashSet::clear) that keeps the
//! backing storage alive for the next run.
//!
//! # Layout
//!
//! Keys live in a flat power-of-two table searched linearly. Each slot carries a
//! generation stamp; a slot is occupied only when its stamp equals the current
//! generation. Clearing bumps the generation instead of touching every slot.
//!
//! # Example
//!
//! ```rust,ignore
//! use concolic_trace::utils::LongHashSet;
//!
//! let mut set = LongHashSet::new();
//! assert!(set.add(5));
//! assert!(!set.add(5));
//! set.add(7);
//!
//! assert_eq!(set.len(), 2);
//! set.clear();
//! assert!(!set.contains(5));
//! ```

use std::{fmt, hash::Hasher};

use rustc_hash::FxHasher;

const MIN_CAPACITY: usize = 16;

/// A set of `i64` values with idempotent insertion and O(1) logical clear.
#[derive(Clone)]
pub struct LongHashSet {
    keys: Vec<i64>,
    /// Generation in which each slot was last written. `0` is never current.
    stamps: Vec<u32>,
    generation: u32,
    len: usize,
}

impl LongHashSet {
    /// Creates an empty set with the minimum table size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Creates an empty set able to hold `capacity` keys before rehashing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = Self::slots_for(capacity);
        LongHashSet {
            keys: vec![0; slots],
            stamps: vec![0; slots],
            generation: 1,
            len: 0,
        }
    }

    fn slots_for(capacity: usize) -> usize {
        // Keep the load factor at or below 3/4.
        let wanted = capacity.saturating_mul(4) / 3 + 1;
        wanted.max(MIN_CAPACITY).next_power_of_two()
    }

    /// Number of distinct keys added since the last clear.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no key has been added since the last clear.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of keys the current table holds before it grows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.keys.len() / 4 * 3
    }

    fn hash(key: i64) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write_i64(key);
        hasher.finish()
    }

    /// Finds the slot holding `key`, or the empty slot where it belongs.
    fn find_slot(&self, key: i64) -> (usize, bool) {
        let mask = self.keys.len() - 1;
        #[allow(clippy::cast_possible_truncation)]
        let mut index = (Self::hash(key) as usize) & mask;
        loop {
            if self.stamps[index] != self.generation {
                return (index, false);
            }
            if self.keys[index] == key {
                return (index, true);
            }
            index = (index + 1) & mask;
        }
    }

    /// Adds `key` to the set.
    ///
    /// Returns `true` if the key was not present. Adding a key twice is a no-op
    /// and never increases [`len`](Self::len).
    pub fn add(&mut self, key: i64) -> bool {
        let (index, found) = self.find_slot(key);
        if found {
            return false;
        }

        if self.len + 1 > self.capacity() {
            self.grow();
            let (index, _) = self.find_slot(key);
            self.occupy(index, key);
        } else {
            self.occupy(index, key);
        }
        true
    }

    fn occupy(&mut self, index: usize, key: i64) {
        self.keys[index] = key;
        self.stamps[index] = self.generation;
        self.len += 1;
    }

    fn grow(&mut self) {
        let live: Vec<i64> = self.iter().collect();
        let slots = self.keys.len() * 2;

        self.keys = vec![0; slots];
        self.stamps = vec![0; slots];
        self.generation = 1;
        self.len = 0;

        for key in live {
            let (index, _) = self.find_slot(key);
            self.occupy(index, key);
        }
    }

    /// Returns `true` if `key` was added since the last clear.
    #[must_use]
    pub fn contains(&self, key: i64) -> bool {
        self.find_slot(key).1
    }

    /// Logically removes every key. The table keeps its allocation.
    pub fn clear(&mut self) {
        self.len = 0;
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Stamps from 2^32 clears ago would look current again.
            self.stamps.fill(0);
            self.generation = 1;
        }
    }

    /// Iterates over the keys in table order.
    pub fn iter(&self) -> LongHashSetIter<'_> {
        LongHashSetIter {
            set: self,
            index: 0,
        }
    }

    /// Returns the keys in ascending order.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<i64> {
        let mut keys: Vec<i64> = self.iter().collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for LongHashSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LongHashSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.to_sorted_vec()).finish()
    }
}

impl PartialEq for LongHashSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|key| other.contains(key))
    }
}

impl Eq for LongHashSet {}

impl Extend<i64> for LongHashSet {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

impl FromIterator<i64> for LongHashSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = LongHashSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a LongHashSet {
    type Item = i64;
    type IntoIter = LongHashSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the keys of a [`LongHashSet`].
pub struct LongHashSetIter<'a> {
    set: &'a LongHashSet,
    index: usize,
}

impl Iterator for LongHashSetIter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.set.keys.len() {
            let index = self.index;
            self.index += 1;
            if self.set.stamps[index] == self.set.generation {
                return Some(self.set.keys[index]);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut set = LongHashSet::new();

        assert!(set.add(5));
        assert!(!set.add(5));
        assert!(set.add(7));

        assert_eq!(set.len(), 2);
        assert!(set.contains(5));
        assert!(set.contains(7));
        assert!(!set.contains(6));
    }

    #[test]
    fn test_clear_keeps_storage() {
        let mut set = LongHashSet::new();
        for key in 0..100 {
            set.add(key);
        }
        let capacity = set.capacity();

        set.clear();

        assert!(set.is_empty());
        assert!(!set.contains(5));
        assert_eq!(set.capacity(), capacity);
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn test_growth_preserves_keys() {
        let mut set = LongHashSet::with_capacity(4);
        for key in -500..500 {
            set.add(key * 7919);
        }

        assert_eq!(set.len(), 1000);
        for key in -500..500 {
            assert!(set.contains(key * 7919));
        }
    }

    #[test]
    fn test_extreme_keys() {
        let mut set = LongHashSet::new();
        set.add(i64::MIN);
        set.add(i64::MAX);
        set.add(0);

        assert_eq!(set.to_sorted_vec(), vec![i64::MIN, 0, i64::MAX]);
    }

    #[test]
    fn test_generation_wraparound() {
        let mut set = LongHashSet::new();
        set.add(1);
        set.generation = u32::MAX;
        set.stamps.fill(u32::MAX);

        set.clear();

        assert_eq!(set.generation, 1);
        assert!(!set.contains(1));
        assert!(set.add(1));
    }

    #[test]
    fn test_reuse_after_clear() {
        let mut set: LongHashSet = [1, 2, 3].into_iter().collect();
        set.clear();
        set.extend([3, 4]);

        assert_eq!(set.to_sorted_vec(), vec![3, 4]);
        assert_eq!(format!("{set:?}"), "{3, 4}");
    }
}
