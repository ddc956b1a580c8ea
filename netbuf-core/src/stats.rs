//! Pool Utilization Statistics
//!
//! [`PoolStats`] is a point-in-time snapshot of a pool's occupancy and
//! cumulative counters. Operators use it to right-size `num_buffers` and to
//! spot release patterns that keep hitting the slow removal path.

use serde::Serialize;

/// Snapshot of a [`BufferPool`](crate::BufferPool)'s state and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Total slots owned by the pool.
    pub num_buffers: usize,
    /// Payload bytes per slot.
    pub buffer_capacity: usize,
    /// Slots on the free list.
    pub free: usize,
    /// Slots currently acquired.
    pub used: usize,
    /// Highest `used` value seen by `update_counters` since the last reset.
    pub high_water: u32,
    /// Successful acquisitions.
    pub acquisitions: u64,
    /// Checked acquisitions that found the free list empty.
    pub failed_acquisitions: u64,
    /// Successful releases.
    pub releases: u64,
    /// Releases that were not the least-recently-used slot and needed an
    /// arbitrary-position removal.
    pub slow_releases: u64,
    /// Releases rejected because the handle was invalid or not acquired.
    pub rejected_releases: u64,
}

impl PoolStats {
    /// Fraction of slots currently acquired, from 0.0 to 1.0.
    pub fn utilization(&self) -> f64 {
        if self.num_buffers == 0 {
            return 0.0;
        }
        self.used as f64 / self.num_buffers as f64
    }

    /// Fraction of successful releases that took the fast LRU path.
    pub fn fast_release_rate(&self) -> f64 {
        if self.releases == 0 {
            return 0.0;
        }
        (self.releases - self.slow_releases) as f64 / self.releases as f64
    }

    /// Print a human-readable report.
    pub fn print_report(&self) {
        println!("╔═══════════════════════════════════════════════════════════╗");
        println!("║            Network Buffer Pool Report                     ║");
        println!("╠═══════════════════════════════════════════════════════════╣");
        println!("║ Capacity                                                  ║");
        println!("║   Buffers:     {:>8} x {:>6} bytes                     ║",
                 self.num_buffers, self.buffer_capacity);
        println!("╠═══════════════════════════════════════════════════════════╣");
        println!("║ Occupancy                                                 ║");
        println!("║   Used:        {:>8} (util: {:>6.2}%)               ║",
                 self.used, self.utilization() * 100.0);
        println!("║   Free:        {:>8}                                   ║", self.free);
        println!("║   High water:  {:>8}                                   ║", self.high_water);
        println!("╠═══════════════════════════════════════════════════════════╣");
        println!("║ Traffic                                                   ║");
        println!("║   Acquired:    {:>8} (failed: {:>8})              ║",
                 self.acquisitions, self.failed_acquisitions);
        println!("║   Released:    {:>8} (fast: {:>6.2}%)               ║",
                 self.releases, self.fast_release_rate() * 100.0);
        println!("║   Rejected:    {:>8}                                   ║",
                 self.rejected_releases);
        println!("╚═══════════════════════════════════════════════════════════╝");
    }
}
