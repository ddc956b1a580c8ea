//! Double-Ended Ring Buffer for Acquisition-Order Tracking
//!
//! This module provides a fixed-capacity circular buffer of copyable handles.
//! The buffer pool uses it as its "used list": handles are appended at the
//! back when acquired, so the front is always the least-recently-acquired
//! slot and can be handed to an eviction policy in O(1).
//!
//! # Performance-First Design:
//! - Storage is reserved once in [`RingBuffer::with_capacity`]; no operation
//!   allocates afterwards
//! - Push/pop at either end is O(1)
//! - Arbitrary removal shifts whichever side of the victim is shorter, so it
//!   never moves more than half of the live items and keeps their order

use tracing::trace;

use super::alloc::try_alloc_slice;
use crate::error::Result;

/// A fixed-capacity double-ended queue over opaque handles.
///
/// Live items occupy the slots from `head` (inclusive) to `tail` (exclusive),
/// walking forward with wraparound, oldest first. Slots outside that range
/// hold `None`. The buffer stores handles only and never owns whatever a
/// handle refers to.
///
/// Pushing into a full buffer or popping from an empty one is a programmer
/// error and panics.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    entries: Box<[Option<T>]>,
    /// Physical index of the oldest live item.
    head: usize,
    /// Physical index one past the newest live item.
    tail: usize,
    count: usize,
}

impl<T: Copy + PartialEq> RingBuffer<T> {
    /// Allocate an empty ring buffer able to hold `capacity` handles.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let entries = try_alloc_slice("ring buffer", capacity, None)?;
        Ok(Self {
            entries,
            head: 0,
            tail: 0,
            count: 0,
        })
    }

    /// Maximum number of items the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of live items.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Append `item` after the newest entry.
    ///
    /// # Panics
    /// Panics if the buffer is full.
    pub fn push_back(&mut self, item: T) {
        assert!(
            self.count < self.capacity(),
            "push_back on a full ring buffer (capacity {})",
            self.capacity()
        );
        self.entries[self.tail] = Some(item);
        self.tail = self.forward(self.tail);
        self.count += 1;
    }

    /// Remove and return the newest entry.
    ///
    /// # Panics
    /// Panics if the buffer is empty.
    pub fn pop_back(&mut self) -> T {
        assert!(self.count > 0, "pop_back on an empty ring buffer");
        self.tail = self.backward(self.tail);
        self.count -= 1;
        self.take_slot(self.tail)
    }

    /// Insert `item` before the oldest entry.
    ///
    /// # Panics
    /// Panics if the buffer is full.
    pub fn push_front(&mut self, item: T) {
        assert!(
            self.count < self.capacity(),
            "push_front on a full ring buffer (capacity {})",
            self.capacity()
        );
        self.head = self.backward(self.head);
        self.entries[self.head] = Some(item);
        self.count += 1;
    }

    /// Remove and return the oldest entry.
    ///
    /// # Panics
    /// Panics if the buffer is empty.
    pub fn pop_front(&mut self) -> T {
        assert!(self.count > 0, "pop_front on an empty ring buffer");
        let item = self.take_slot(self.head);
        self.head = self.forward(self.head);
        self.count -= 1;
        item
    }

    /// The oldest entry, without removing it.
    pub fn peek_front(&self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        self.entries[self.head]
    }

    /// The newest entry, without removing it.
    pub fn peek_back(&self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        self.entries[self.backward(self.tail)]
    }

    /// Logical position (0 = oldest) of the first entry equal to `item`.
    pub fn contains(&self, item: &T) -> Option<usize> {
        (0..self.count).find(|&offset| self.entries[self.physical(offset)].as_ref() == Some(item))
    }

    /// Remove the first entry equal to `item`, keeping the order of the rest.
    ///
    /// Returns `false` without touching the buffer if `item` is absent.
    ///
    /// The gap is closed from whichever side is shorter: either the block
    /// between `head` and the victim moves one slot forward and `head`
    /// advances, or the block between the victim and `tail` moves one slot
    /// backward and `tail` retreats. On a tie the tail side moves.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(offset) = self.contains(item) else {
            return false;
        };

        let head_moves = offset;
        let tail_moves = self.count - 1 - offset;

        if head_moves < tail_moves {
            trace!(offset, moves = head_moves, "ring remove: closing gap from head");
            for i in (0..offset).rev() {
                let dst = self.physical(i + 1);
                self.entries[dst] = self.entries[self.physical(i)];
            }
            self.entries[self.head] = None;
            self.head = self.forward(self.head);
        } else {
            trace!(offset, moves = tail_moves, "ring remove: closing gap from tail");
            for i in offset..self.count - 1 {
                let dst = self.physical(i);
                self.entries[dst] = self.entries[self.physical(i + 1)];
            }
            self.tail = self.backward(self.tail);
            self.entries[self.tail] = None;
        }

        self.count -= 1;
        true
    }

    /// Iterate over live items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.count).filter_map(move |offset| self.entries[self.physical(offset)])
    }

    /// Drop every entry and rewind both cursors.
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    fn take_slot(&mut self, idx: usize) -> T {
        self.entries[idx]
            .take()
            .expect("live ring buffer slot must hold an item")
    }

    /// Physical index of the item `offset` places after `head`.
    fn physical(&self, offset: usize) -> usize {
        let idx = self.head + offset;
        if idx >= self.capacity() {
            idx - self.capacity()
        } else {
            idx
        }
    }

    fn forward(&self, idx: usize) -> usize {
        if idx + 1 >= self.capacity() {
            0
        } else {
            idx + 1
        }
    }

    fn backward(&self, idx: usize) -> usize {
        if idx == 0 {
            self.capacity() - 1
        } else {
            idx - 1
        }
    }
}
