//! Fixed-Capacity Network Buffer Pool
//!
//! This module provides a pool of pre-allocated message buffers for stacks
//! that must not touch the allocator once running (CAN frame handling and
//! similar). Every slot is allocated at construction and is, at all times,
//! on exactly one of two lists:
//!
//! - the free list, a [`BoundedStack`] of handles nobody holds, and
//! - the used list, a [`RingBuffer`] of acquired handles in acquisition
//!   order, oldest at the front.
//!
//! # Performance-First Design:
//! - Acquire is a stack pop plus a ring push, O(1)
//! - Releasing the least-recently-acquired slot (the common FIFO case) is a
//!   ring pop, O(1); any other release closes the gap from the shorter side
//!   of the ring, at most half the acquired slots
//! - The front of the used list is an LRU candidate an eviction policy can
//!   read without a scan
//!
//! The pool is not synchronized. Callers sharing one across threads must
//! guard every operation with a single lock.

use tracing::{debug, info, warn};

use super::bounded_stack::BoundedStack;
use super::buffer::{NetBuffer, NetBufferMut, SlotHandle, SlotStorage};
use super::ring_buffer::RingBuffer;
use crate::config::PoolConfig;
use crate::error::{NetBufError, Result};
use crate::stats::PoolStats;

struct PoolInner {
    free_list: BoundedStack<SlotHandle>,
    used_list: RingBuffer<SlotHandle>,
    slots: SlotStorage,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    high_water: u32,
    acquisitions: u64,
    failed_acquisitions: u64,
    releases: u64,
    slow_releases: u64,
    rejected_releases: u64,
}

/// A pool of fixed-size network buffers with acquisition-order tracking.
///
/// Slot contents are owned by the caller between acquire and release and
/// are not cleared on release unless [`PoolConfig::scrub_on_release`] is set;
/// a reacquired slot may still hold the previous occupant's data.
///
/// # Performance Pattern: Acquire, Write, Release
/// ```rust
/// # use netbuf_core::BufferPool;
/// let mut pool = BufferPool::new(4, 16).unwrap();
/// let slot = pool.acquire().unwrap();
/// pool.write_checked(slot, b"frame").unwrap();
/// assert_eq!(pool.buffer(slot).unwrap().user_data(), b"frame");
/// pool.release(slot).unwrap();
/// assert_eq!(pool.used_count(), 0);
/// ```
pub struct BufferPool {
    config: PoolConfig,
    /// `None` once the pool has been deinitialized.
    inner: Option<PoolInner>,
    counters: Counters,
}

impl BufferPool {
    /// Create a pool of `num_buffers` slots of `buffer_payload_size` bytes.
    pub fn new(num_buffers: usize, buffer_payload_size: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(num_buffers, buffer_payload_size))
    }

    /// Create a pool from a full configuration.
    ///
    /// Fails if the configuration is invalid or any backing structure cannot
    /// be allocated; structures allocated before the failure are released.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let num_buffers = config.num_buffers;

        let mut free_list = BoundedStack::with_capacity(num_buffers)?;
        let used_list = RingBuffer::with_capacity(num_buffers)?;
        let slots = SlotStorage::new(num_buffers, config.buffer_payload_size)?;

        for index in 0..num_buffers as u32 {
            free_list.push(SlotHandle::new(index));
        }

        info!(
            num_buffers,
            buffer_payload_size = config.buffer_payload_size,
            scrub_on_release = config.scrub_on_release,
            "Creating BufferPool"
        );

        Ok(Self {
            config,
            inner: Some(PoolInner {
                free_list,
                used_list,
                slots,
            }),
            counters: Counters::default(),
        })
    }

    /// Release all backing storage.
    ///
    /// Safe to call repeatedly. Afterwards acquisition returns `None`, and
    /// release and writes fail with [`NetBufError::Uninitialized`].
    pub fn deinit(&mut self) {
        if self.inner.take().is_some() {
            info!(num_buffers = self.config.num_buffers, "BufferPool deinitialized");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn num_buffers(&self) -> usize {
        self.config.num_buffers
    }

    /// Payload bytes per slot.
    pub fn buffer_capacity(&self) -> usize {
        self.config.buffer_payload_size
    }

    /// Acquire a free slot, or `None` if every slot is in use.
    ///
    /// The slot becomes the most-recently-acquired entry of the used list.
    pub fn acquire(&mut self) -> Option<SlotHandle> {
        let Some(inner) = self.inner.as_mut() else {
            warn!("acquire on a deinitialized BufferPool");
            return None;
        };
        if inner.free_list.is_empty() {
            self.counters.failed_acquisitions += 1;
            debug!(used = inner.used_list.count(), "BufferPool exhausted");
            return None;
        }
        Some(self.acquire_unchecked())
    }

    /// Acquire a free slot without checking availability.
    ///
    /// # Panics
    /// Panics if the pool is deinitialized or no slot is free. Callers use
    /// this after checking [`free_count`](Self::free_count) themselves.
    pub fn acquire_unchecked(&mut self) -> SlotHandle {
        let Some(inner) = self.inner.as_mut() else {
            panic!("acquire_unchecked on a deinitialized BufferPool");
        };
        let handle = inner.free_list.pop();
        inner.used_list.push_back(handle);
        self.counters.acquisitions += 1;
        debug!(slot = %handle, used = inner.used_list.count(), "Buffer acquired");
        handle
    }

    /// Return an acquired slot to the free list.
    ///
    /// Fails with [`NetBufError::InvalidHandle`] for a handle outside the
    /// pool and [`NetBufError::NotAcquired`] for a slot that is already free;
    /// a failed release changes nothing.
    pub fn release(&mut self, handle: SlotHandle) -> Result<()> {
        let scrub = self.config.scrub_on_release;
        let Some(inner) = self.inner.as_mut() else {
            warn!(slot = %handle, "release on a deinitialized BufferPool");
            return Err(NetBufError::Uninitialized);
        };

        if let Err(err) = inner.slots.view(handle) {
            self.counters.rejected_releases += 1;
            warn!(slot = %handle, "Rejected release of an out-of-range handle");
            return Err(err);
        }

        if inner.used_list.peek_front() == Some(handle) {
            inner.used_list.pop_front();
        } else if inner.used_list.remove(&handle) {
            self.counters.slow_releases += 1;
            debug!(slot = %handle, "Released out of acquisition order");
        } else {
            self.counters.rejected_releases += 1;
            warn!(slot = %handle, "Rejected release of a slot that is not acquired");
            return Err(NetBufError::NotAcquired {
                index: handle.index(),
            });
        }

        if scrub {
            if let Ok(mut buffer) = inner.slots.view_mut(handle) {
                buffer.scrub();
            }
        }
        inner.free_list.push(handle);
        self.counters.releases += 1;
        debug!(slot = %handle, used = inner.used_list.count(), "Buffer released to pool");
        Ok(())
    }

    /// Copy `data` into a slot and record its length.
    ///
    /// Fails without writing if `data` exceeds the payload capacity. The
    /// handle is bounds-checked but not checked for being acquired; writing
    /// to a slot you do not hold is a caller bug.
    pub fn write_checked(&mut self, handle: SlotHandle, data: &[u8]) -> Result<usize> {
        let capacity = self.config.buffer_payload_size;
        let inner = self.inner.as_mut().ok_or(NetBufError::Uninitialized)?;
        if data.len() > capacity {
            warn!(slot = %handle, len = data.len(), capacity, "Rejected oversized write");
            return Err(NetBufError::PayloadTooLarge {
                len: data.len(),
                capacity,
            });
        }
        inner.slots.view_mut(handle)?.write(data)
    }

    /// Read-only view of a slot. Same handle contract as
    /// [`write_checked`](Self::write_checked).
    pub fn buffer(&self, handle: SlotHandle) -> Result<NetBuffer<'_>> {
        let inner = self.inner.as_ref().ok_or(NetBufError::Uninitialized)?;
        inner.slots.view(handle)
    }

    /// Mutable view of a slot, for setting tags or writing in place.
    pub fn buffer_mut(&mut self, handle: SlotHandle) -> Result<NetBufferMut<'_>> {
        let inner = self.inner.as_mut().ok_or(NetBufError::Uninitialized)?;
        inner.slots.view_mut(handle)
    }

    /// Number of acquired slots.
    pub fn used_count(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.used_list.count())
    }

    /// Number of free slots.
    pub fn free_count(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.free_list.count())
    }

    /// The acquired slot that has been held the longest.
    pub fn least_recently_used(&self) -> Option<SlotHandle> {
        self.inner.as_ref()?.used_list.peek_front()
    }

    /// The most recently acquired slot.
    pub fn most_recently_used(&self) -> Option<SlotHandle> {
        self.inner.as_ref()?.used_list.peek_back()
    }

    pub fn is_acquired(&self, handle: SlotHandle) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| inner.used_list.contains(&handle).is_some())
    }

    /// Acquired slots, oldest first.
    pub fn iter_used(&self) -> impl Iterator<Item = SlotHandle> + '_ {
        self.inner.iter().flat_map(|inner| inner.used_list.iter())
    }

    /// Fold the current occupancy into the high-water mark.
    pub fn update_counters(&mut self) {
        let used = u32::try_from(self.used_count()).unwrap_or(u32::MAX);
        if used > self.counters.high_water {
            self.counters.high_water = used;
            debug!(high_water = used, "New BufferPool high-water mark");
        }
    }

    /// Highest occupancy seen by [`update_counters`](Self::update_counters).
    pub fn high_water(&self) -> u32 {
        self.counters.high_water
    }

    pub fn reset_high_water(&mut self) {
        self.counters.high_water = 0;
    }

    /// Return a snapshot of current pool statistics.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            num_buffers: self.config.num_buffers,
            buffer_capacity: self.config.buffer_payload_size,
            free: self.free_count(),
            used: self.used_count(),
            high_water: self.counters.high_water,
            acquisitions: self.counters.acquisitions,
            failed_acquisitions: self.counters.failed_acquisitions,
            releases: self.counters.releases,
            slow_releases: self.counters.slow_releases,
            rejected_releases: self.counters.rejected_releases,
        }
    }
}
