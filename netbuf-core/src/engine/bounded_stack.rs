//! Fixed-Capacity Stack Used as the Pool Free List
//!
//! Push and pop work purely through `tail_idx`. Arbitrary removal is O(1)
//! beyond the lookup scan: the matching slot is nulled in place instead of
//! shifting its neighbours, which fragments the array. While fragmented the
//! stack is marked unsorted and lookups scan the whole capacity, because a
//! hole may sit below `tail_idx` while a live entry sits above it.
//! [`BoundedStack::compact`] restores the dense prefix.

use super::alloc::try_alloc_slice;
use crate::error::Result;

/// An array-backed LIFO stack of opaque handles.
///
/// `None` marks an empty slot and is never a valid handle.
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    entries: Box<[Option<T>]>,
    /// Number of entries in the dense prefix; also the insertion point.
    tail_idx: usize,
    /// True iff every live entry sits in `[0, tail_idx)`.
    is_sorted: bool,
}

impl<T: Copy + PartialEq> BoundedStack<T> {
    /// Allocate an empty stack able to hold `capacity` handles.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let entries = try_alloc_slice("bounded stack", capacity, None)?;
        Ok(Self {
            entries,
            tail_idx: 0,
            is_sorted: true,
        })
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of entries below the insertion point.
    ///
    /// Exact only while the stack is sorted; call [`compact`](Self::compact)
    /// first after out-of-order removals.
    pub fn count(&self) -> usize {
        self.tail_idx
    }

    pub fn is_empty(&self) -> bool {
        self.tail_idx == 0
    }

    pub fn is_full(&self) -> bool {
        self.tail_idx == self.capacity()
    }

    pub fn is_sorted(&self) -> bool {
        self.is_sorted
    }

    /// Raw view of every slot, holes included.
    pub fn slots(&self) -> &[Option<T>] {
        &self.entries
    }

    /// Push `item` at the insertion point.
    ///
    /// # Panics
    /// Panics if the stack is full.
    pub fn push(&mut self, item: T) {
        assert!(
            self.tail_idx < self.capacity(),
            "push on a full stack (capacity {})",
            self.capacity()
        );
        self.entries[self.tail_idx] = Some(item);
        self.tail_idx += 1;
    }

    /// Pop the most recently pushed entry.
    ///
    /// # Panics
    /// Panics if the stack is empty, or if it was fragmented by
    /// [`remove`](Self::remove) and not compacted since.
    pub fn pop(&mut self) -> T {
        assert!(self.tail_idx > 0, "pop on an empty stack");
        assert!(self.is_sorted, "pop on a fragmented stack; compact it first");
        self.tail_idx -= 1;
        self.entries[self.tail_idx]
            .take()
            .expect("sorted stack has no holes below tail_idx")
    }

    /// Whether an entry equal to `item` is present.
    pub fn contains(&self, item: &T) -> bool {
        self.position(item).is_some()
    }

    /// Null out the lowest-index entry equal to `item`.
    ///
    /// Returns `false` without touching the stack if `item` is absent.
    /// Neighbouring entries are not moved; the stack becomes unsorted.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.position(item) {
            Some(idx) => {
                self.entries[idx] = None;
                self.is_sorted = false;
                true
            }
            None => false,
        }
    }

    /// Stably move every live entry to the front and recompute `tail_idx`.
    pub fn compact(&mut self) {
        let mut write = 0;
        for read in 0..self.entries.len() {
            if self.entries[read].is_some() {
                self.entries.swap(write, read);
                write += 1;
            }
        }
        self.tail_idx = write;
        self.is_sorted = true;
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.tail_idx = 0;
        self.is_sorted = true;
    }

    fn scan_bound(&self) -> usize {
        if self.is_sorted {
            self.tail_idx
        } else {
            self.entries.len()
        }
    }

    fn position(&self, item: &T) -> Option<usize> {
        self.entries[..self.scan_bound()]
            .iter()
            .position(|slot| slot.as_ref() == Some(item))
    }
}
