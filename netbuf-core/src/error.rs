//! Error types for buffer pool operations.
//!
//! Only recoverable conditions live here. Precondition violations on the
//! containers (pushing into a full ring, popping an empty stack) are
//! programmer errors and panic instead of returning a variant.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetBufError>;

/// Reportable failures of the pool and its configuration layer.
///
/// A call that returns one of these leaves every structure exactly as it was
/// before the call.
#[derive(Debug, Error)]
pub enum NetBufError {
    /// Construction parameters were rejected.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(&'static str),

    /// Backing storage for one of the pool structures could not be reserved.
    #[error("failed to allocate {what} ({requested} elements)")]
    AllocationFailed {
        /// Which structure was being allocated.
        what: &'static str,
        /// Number of elements requested.
        requested: usize,
    },

    /// The pool was deinitialized and no longer owns any storage.
    #[error("buffer pool is not initialized")]
    Uninitialized,

    /// The handle does not name a slot of this pool.
    #[error("slot handle {index} out of range (pool has {num_buffers} buffers)")]
    InvalidHandle {
        /// Raw slot index carried by the handle.
        index: u32,
        /// Number of slots in the pool.
        num_buffers: usize,
    },

    /// The handle is not currently acquired, e.g. a double release.
    #[error("slot {index} is not currently acquired")]
    NotAcquired {
        /// Raw slot index carried by the handle.
        index: u32,
    },

    /// A write was larger than the per-slot payload capacity.
    #[error("payload of {len} bytes exceeds buffer capacity of {capacity} bytes")]
    PayloadTooLarge {
        /// Requested payload length.
        len: usize,
        /// Configured payload capacity.
        capacity: usize,
    },

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be parsed.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}
