//! Nonce scanning
//!
//! A scan works on a private copy of the header: it writes successive nonces
//! into word 19, hashes, and tests the digest against the target until it
//! finds a match, reaches `max_nonce`, or sees its cancel signal. The
//! timestamp is read once at the start and salts every attempt of the call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::context::BlockHeaderContext;
use crate::target::matches;
use crate::types::{HeaderWords, TargetWords};
use crate::xhash::xhash;

/// Cooperative stop request, polled once after every unsuccessful attempt
pub trait CancelSignal {
    fn is_cancelled(&self) -> bool;
}

impl CancelSignal for AtomicBool {
    #[inline(always)]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: CancelSignal + ?Sized> CancelSignal for &T {
    #[inline(always)]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: CancelSignal + ?Sized> CancelSignal for Arc<T> {
    #[inline(always)]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Outcome of one scan call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanResult {
    pub found: bool,
    /// The matching nonce, or the last nonce tried
    pub nonce: u32,
    pub hashes_done: u64,
}

/// Scan with an explicit timestamp
///
/// Tries `header.nonce()` first and stops after `max_nonce`. At least one
/// nonce is always tried, so a start above `max_nonce` costs one attempt.
pub fn scan_with_timestamp<C>(
    header: &HeaderWords,
    target: &TargetWords,
    max_nonce: u32,
    timestamp: u64,
    cancel: &C,
) -> ScanResult
where
    C: CancelSignal + ?Sized,
{
    let mut work = *header;
    let first = work.nonce();
    let mut nonce = first.wrapping_sub(1);
    let mut hashes_done = 0u64;
    let mut cancelled = false;

    debug!(
        target: "xhash::scan",
        first_nonce = first,
        max_nonce,
        timestamp,
        "Scan started"
    );

    loop {
        nonce = nonce.wrapping_add(1);
        work.set_nonce(nonce);
        let digest = xhash(&work, timestamp);
        hashes_done += 1;

        if matches(&digest, target) {
            debug!(
                target: "xhash::scan",
                nonce,
                hashes = hashes_done,
                digest = %digest,
                "Nonce found"
            );
            return ScanResult {
                found: true,
                nonce,
                hashes_done,
            };
        }

        if nonce >= max_nonce {
            break;
        }
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
    }

    debug!(
        target: "xhash::scan",
        last_nonce = nonce,
        hashes = hashes_done,
        cancelled,
        "Scan finished"
    );

    ScanResult {
        found: false,
        nonce,
        hashes_done,
    }
}

/// Scanner bound to the harness-owned block time
#[derive(Debug, Clone, Copy)]
pub struct NonceScanner<'a> {
    context: &'a BlockHeaderContext,
}

impl<'a> NonceScanner<'a> {
    pub fn new(context: &'a BlockHeaderContext) -> Self {
        Self { context }
    }

    /// Search `header.nonce()..=max_nonce` for a digest within `target`
    ///
    /// The block time is snapshotted once; updates made to the context while
    /// the scan runs apply to the next call.
    pub fn scan<C>(
        &self,
        header: &HeaderWords,
        target: &TargetWords,
        max_nonce: u32,
        cancel: &C,
    ) -> ScanResult
    where
        C: CancelSignal + ?Sized,
    {
        let timestamp = self.context.block_time();
        scan_with_timestamp(header, target, max_nonce, timestamp, cancel)
    }
}
