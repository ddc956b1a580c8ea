//! Construction-time configuration for a [`BufferPool`](crate::BufferPool).
//!
//! Every value here is fixed for the lifetime of the pool. Configurations can
//! be built in code or loaded from a JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::buffer::CAN_PAYLOAD_SIZE;
use crate::error::{NetBufError, Result};

/// Default number of slots in a pool.
pub const DEFAULT_NUM_BUFFERS: usize = 16;

/// Sizing and release policy of a buffer pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Number of slots.
    pub num_buffers: usize,
    /// Payload bytes per slot.
    pub buffer_payload_size: usize,
    /// Zero the payload and reset the header of a slot when it is released.
    ///
    /// When `false` (the default) a reacquired slot still holds the previous
    /// occupant's tag, length and bytes.
    pub scrub_on_release: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_buffers: DEFAULT_NUM_BUFFERS,
            buffer_payload_size: CAN_PAYLOAD_SIZE,
            scrub_on_release: false,
        }
    }
}

impl PoolConfig {
    pub fn new(num_buffers: usize, buffer_payload_size: usize) -> Self {
        Self {
            num_buffers,
            buffer_payload_size,
            ..Self::default()
        }
    }

    pub fn with_scrub_on_release(mut self, scrub: bool) -> Self {
        self.scrub_on_release = scrub;
        self
    }

    /// Reject configurations the pool cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.num_buffers == 0 {
            return Err(NetBufError::InvalidConfig("num_buffers must be non-zero"));
        }
        if self.buffer_payload_size == 0 {
            return Err(NetBufError::InvalidConfig(
                "buffer_payload_size must be non-zero",
            ));
        }
        if u32::try_from(self.num_buffers).is_err() {
            return Err(NetBufError::InvalidConfig(
                "num_buffers must fit in a 32-bit slot index",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading pool configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
