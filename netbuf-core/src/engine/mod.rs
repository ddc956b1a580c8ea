//! Engine module - Core pool components
//!
//! This module contains the two allocation-free containers the pool is built
//! from, the slot record they track, and the pool manager that ties them
//! together.

pub(crate) mod alloc;
pub mod bounded_stack;
pub mod buffer;
pub mod memory_pool;
pub mod ring_buffer;

pub use bounded_stack::BoundedStack;
pub use buffer::{BufferTag, FrameKind, NetBuffer, NetBufferMut, SlotHandle};
pub use memory_pool::BufferPool;
pub use ring_buffer::RingBuffer;
