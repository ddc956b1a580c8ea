//! Network Buffer Slots
//!
//! This module defines the per-slot payload record handed out by the
//! [`BufferPool`](super::memory_pool::BufferPool) and the contiguous storage
//! that backs every slot of a pool.
//!
//! # Performance-First Design:
//! - All slot headers live in one array and all payload bytes in one arena,
//!   both allocated once at pool construction
//! - Callers get borrowed views ([`NetBuffer`], [`NetBufferMut`]) rather
//!   than owned buffers, so acquire/release never move payload bytes
//! - A slot is addressed by a [`SlotHandle`] index, never by address

use std::fmt;

use serde::{Deserialize, Serialize};

use super::alloc::try_alloc_slice;
use crate::error::{NetBufError, Result};

/// Byte written over every payload at construction so stale reads stand out.
pub const POISON_BYTE: u8 = 0xAA;

/// Payload size of a classic CAN data frame.
pub const CAN_PAYLOAD_SIZE: usize = 8;

/// Payload size of a CAN FD data frame.
pub const CAN_FD_PAYLOAD_SIZE: usize = 64;

/// Opaque reference to one slot of a pool.
///
/// A handle is only meaningful for the pool that issued it and only while
/// the slot is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotHandle(u32);

impl SlotHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw slot index inside the pool's backing storage.
    pub fn index(self) -> u32 {
        self.0
    }

    fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Kind of CAN frame a slot carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FrameKind {
    /// Remote (request) frame.
    #[default]
    Remote = 0,
    /// Data frame.
    Data = 1,
}

/// Caller-defined metadata attached to a slot.
///
/// The pool never interprets these fields; it only preserves them until
/// the slot is reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferTag {
    /// Interface type the frame arrived on or is destined for.
    pub if_type: i8,
    /// Interface (channel) number.
    pub if_id: i8,
    /// Frame identifier.
    pub id: u32,
    pub frame_kind: FrameKind,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SlotHeader {
    tag: BufferTag,
    user_data_length: usize,
}

/// Read-only view of one slot.
#[derive(Debug, Clone, Copy)]
pub struct NetBuffer<'a> {
    handle: SlotHandle,
    header: &'a SlotHeader,
    payload: &'a [u8],
}

impl<'a> NetBuffer<'a> {
    pub fn handle(&self) -> SlotHandle {
        self.handle
    }

    pub fn tag(&self) -> BufferTag {
        self.header.tag
    }

    /// Number of valid payload bytes recorded by the last write.
    pub fn user_data_length(&self) -> usize {
        self.header.user_data_length
    }

    /// The valid payload bytes.
    pub fn user_data(&self) -> &'a [u8] {
        &self.payload[..self.header.user_data_length]
    }

    /// Payload capacity of the slot in bytes.
    pub fn capacity(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.user_data_length == 0
    }
}

/// Mutable view of one slot.
#[derive(Debug)]
pub struct NetBufferMut<'a> {
    handle: SlotHandle,
    header: &'a mut SlotHeader,
    payload: &'a mut [u8],
}

impl<'a> NetBufferMut<'a> {
    pub fn handle(&self) -> SlotHandle {
        self.handle
    }

    pub fn tag(&self) -> BufferTag {
        self.header.tag
    }

    pub fn set_tag(&mut self, tag: BufferTag) {
        self.header.tag = tag;
    }

    pub fn user_data_length(&self) -> usize {
        self.header.user_data_length
    }

    pub fn user_data(&self) -> &[u8] {
        &self.payload[..self.header.user_data_length]
    }

    pub fn capacity(&self) -> usize {
        self.payload.len()
    }

    /// Copy `data` into the payload and record its length.
    ///
    /// Fails without writing anything if `data` is longer than the slot's
    /// capacity. Bytes past `data.len()` keep whatever they held before.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        if data.len() > self.payload.len() {
            return Err(NetBufError::PayloadTooLarge {
                len: data.len(),
                capacity: self.payload.len(),
            });
        }
        self.payload[..data.len()].copy_from_slice(data);
        self.header.user_data_length = data.len();
        Ok(data.len())
    }

    /// Reset the tag and length and zero every payload byte.
    pub fn scrub(&mut self) {
        *self.header = SlotHeader::default();
        self.payload.fill(0);
    }
}

/// Headers and payload arena for every slot of a pool.
#[derive(Debug)]
pub(crate) struct SlotStorage {
    headers: Box<[SlotHeader]>,
    arena: Box<[u8]>,
    buffer_capacity: usize,
}

impl SlotStorage {
    pub(crate) fn new(num_buffers: usize, buffer_capacity: usize) -> Result<Self> {
        let arena_len = num_buffers
            .checked_mul(buffer_capacity)
            .ok_or(NetBufError::InvalidConfig("total buffer size overflows usize"))?;

        let headers = try_alloc_slice("slot headers", num_buffers, SlotHeader::default())?;
        let arena = try_alloc_slice("buffer arena", arena_len, POISON_BYTE)?;

        Ok(Self {
            headers,
            arena,
            buffer_capacity,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.headers.len()
    }

    fn check(&self, handle: SlotHandle) -> Result<usize> {
        let idx = handle.as_usize();
        if idx >= self.headers.len() {
            return Err(NetBufError::InvalidHandle {
                index: handle.index(),
                num_buffers: self.headers.len(),
            });
        }
        Ok(idx)
    }

    pub(crate) fn view(&self, handle: SlotHandle) -> Result<NetBuffer<'_>> {
        let idx = self.check(handle)?;
        let start = idx * self.buffer_capacity;
        Ok(NetBuffer {
            handle,
            header: &self.headers[idx],
            payload: &self.arena[start..start + self.buffer_capacity],
        })
    }

    pub(crate) fn view_mut(&mut self, handle: SlotHandle) -> Result<NetBufferMut<'_>> {
        let idx = self.check(handle)?;
        let start = idx * self.buffer_capacity;
        Ok(NetBufferMut {
            handle,
            header: &mut self.headers[idx],
            payload: &mut self.arena[start..start + self.buffer_capacity],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_starts_poisoned() {
        let storage = SlotStorage::new(2, 16).unwrap();
        assert_eq!(storage.len(), 2);
        let buf = storage.view(SlotHandle::new(1)).unwrap();
        assert_eq!(buf.capacity(), 16);
        assert_eq!(buf.user_data_length(), 0);
        assert!(buf.is_empty());
        assert_eq!(buf.tag(), BufferTag::default());
        assert_eq!(buf.tag().frame_kind, FrameKind::Remote);
        assert!(storage.arena.iter().all(|&b| b == POISON_BYTE));
    }

    #[test]
    fn test_write_and_read() {
        let mut storage = SlotStorage::new(2, 16).unwrap();
        let mut buf = storage.view_mut(SlotHandle::new(0)).unwrap();
        assert_eq!(buf.write(b"hello").unwrap(), 5);
        assert_eq!(buf.user_data(), b"hello");

        let view = storage.view(SlotHandle::new(0)).unwrap();
        assert_eq!(view.user_data(), b"hello");
        assert_eq!(view.user_data_length(), 5);
    }

    #[test]
    fn test_slots_do_not_overlap() {
        let mut storage = SlotStorage::new(3, 4).unwrap();
        storage.view_mut(SlotHandle::new(0)).unwrap().write(&[1; 4]).unwrap();
        storage.view_mut(SlotHandle::new(2)).unwrap().write(&[3; 4]).unwrap();

        assert_eq!(&storage.arena[..4], &[1u8; 4]);
        assert_eq!(&storage.arena[4..8], &[POISON_BYTE; 4]);
        assert_eq!(&storage.arena[8..], &[3u8; 4]);
    }

    #[test]
    fn test_oversized_write_leaves_slot_untouched() {
        let mut storage = SlotStorage::new(1, 4).unwrap();
        let mut buf = storage.view_mut(SlotHandle::new(0)).unwrap();
        let err = buf.write(&[0u8; 5]).unwrap_err();
        assert!(matches!(err, NetBufError::PayloadTooLarge { len: 5, capacity: 4 }));
        assert_eq!(buf.user_data_length(), 0);
        assert!(storage.arena.iter().all(|&b| b == POISON_BYTE));
    }

    #[test]
    fn test_tag_round_trips_through_views() {
        let mut storage = SlotStorage::new(1, 8).unwrap();
        let tag = BufferTag {
            if_type: 1,
            if_id: -2,
            id: 0x7FF,
            frame_kind: FrameKind::Data,
        };
        storage.view_mut(SlotHandle::new(0)).unwrap().set_tag(tag);
        assert_eq!(storage.view(SlotHandle::new(0)).unwrap().tag(), tag);
    }

    #[test]
    fn test_scrub_resets_slot() {
        let mut storage = SlotStorage::new(1, 4).unwrap();
        let mut buf = storage.view_mut(SlotHandle::new(0)).unwrap();
        buf.write(b"abcd").unwrap();
        buf.set_tag(BufferTag {
            id: 5,
            ..BufferTag::default()
        });
        buf.scrub();
        assert_eq!(buf.user_data_length(), 0);
        assert_eq!(buf.tag(), BufferTag::default());
        assert_eq!(&storage.arena[..], &[0u8; 4]);
    }

    #[test]
    fn test_out_of_range_handle() {
        let storage = SlotStorage::new(2, 4).unwrap();
        let err = storage.view(SlotHandle::new(2)).unwrap_err();
        assert!(matches!(
            err,
            NetBufError::InvalidHandle {
                index: 2,
                num_buffers: 2
            }
        ));
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(SlotHandle::new(3).to_string(), "slot#3");
    }
}
