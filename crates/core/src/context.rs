//! Block time shared between the mining harness and its scanners

use core::sync::atomic::{AtomicU64, Ordering};

/// Current block timestamp as published by the harness.
///
/// The harness writes it when new work arrives; each scan reads it once at
/// start and hashes every nonce of that call against the same value.
#[derive(Debug, Default)]
pub struct BlockHeaderContext {
    time: AtomicU64,
}

impl BlockHeaderContext {
    /// Context holding `timestamp`
    pub const fn new(timestamp: u64) -> Self {
        Self {
            time: AtomicU64::new(timestamp),
        }
    }

    /// Publish a new block time
    pub fn initialize(&self, timestamp: u64) {
        self.time.store(timestamp, Ordering::Release);
    }

    /// Current block time
    pub fn block_time(&self) -> u64 {
        self.time.load(Ordering::Acquire)
    }
}
