//! Netbuf Core - Fixed-Capacity Network Buffer Pool
//!
//! This crate provides a memory pool of fixed-size message buffers for
//! networking stacks (CAN frame handling and similar) that must not allocate
//! during steady-state operation.
//!
//! # Performance-First Design Patterns:
//! - All storage is reserved once at pool construction
//! - O(1) acquire, O(1) release in acquisition order
//! - Acquisition-order tracking exposes an LRU eviction candidate for free
//! - Single-threaded and unsynchronized; callers serialize shared access

pub mod config;
pub mod engine;
pub mod error;
pub mod stats;

pub use config::PoolConfig;
pub use engine::buffer::{
    BufferTag, FrameKind, NetBuffer, NetBufferMut, SlotHandle, CAN_FD_PAYLOAD_SIZE, CAN_PAYLOAD_SIZE,
    POISON_BYTE,
};
pub use engine::{BoundedStack, BufferPool, RingBuffer};
pub use error::{NetBufError, Result};
pub use stats::PoolStats;

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber that writes to stderr.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Fails if a
/// global subscriber is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    info!("Initializing netbuf v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
