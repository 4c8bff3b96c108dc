//! Append-only array with a fixed 3/2 growth policy.
//!
//! [`AppendVec`] backs small per-run tables such as the mock registry, where
//! entries are only ever pushed during a run and dropped wholesale between
//! runs. Lookups are linear scans; the tables hold tens of entries, not
//! thousands.

use std::{ops::Index, slice};

const MIN_CAPACITY: usize = 4;

/// An append-only vector that grows by half its capacity on overflow.
///
/// The backing storage never shrinks on its own. [`clear`](AppendVec::clear)
/// resets the logical length so the allocation is reused by the next run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendVec<T> {
    items: Vec<T>,
}

impl<T> AppendVec<T> {
    /// Creates an empty array without allocating.
    #[must_use]
    pub const fn new() -> Self {
        AppendVec { items: Vec::new() }
    }

    /// Creates an empty array with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AppendVec {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of elements appended since the last clear.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been appended since the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Allocated slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Appends `item` and returns its index.
    pub fn push(&mut self, item: T) -> usize {
        let capacity = self.items.capacity();
        if self.items.len() == capacity {
            let target = (capacity + capacity / 2).max(MIN_CAPACITY);
            self.items.reserve_exact(target - self.items.len());
        }
        self.items.push(item);
        self.items.len() - 1
    }

    /// Returns the element at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the element at `index` mutably, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Returns the first element matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().find(|item| predicate(item))
    }

    /// Returns the first element matching `predicate` mutably.
    pub fn find_mut<P>(&mut self, mut predicate: P) -> Option<&mut T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter_mut().find(|item| predicate(item))
    }

    /// Returns the index of the first element matching `predicate`.
    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().position(predicate)
    }

    /// Drops every element but keeps the allocation.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterates over the elements in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Returns the elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for AppendVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for AppendVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a AppendVec<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for AppendVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = AppendVec::new();
        for item in iter {
            array.push(item);
        }
        array
    }
}
