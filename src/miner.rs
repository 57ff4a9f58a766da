//! Multi-threaded nonce search
//!
//! The 32-bit nonce space is split into one disjoint slice per worker. Each
//! worker runs on a blocking thread and scans its slice in chunks of
//! `nonce_span` nonces, polling its own restart flag after every attempt.
//! The first worker to find a nonce reports it and every worker is told to
//! stop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use xhash_core::{BlockHeaderContext, Digest, NonceScanner, WorkItem, xhash};

use crate::config::MinerConfig;

#[derive(Error, Debug)]
pub enum MinerError {
    #[error("Mining cancelled")]
    Cancelled,

    #[error("Nonce space exhausted after {hashes} hashes")]
    Exhausted { hashes: u64 },

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// One restart flag per worker slot
///
/// Only the scheduler writes a flag; its worker only reads it.
#[derive(Debug)]
pub struct WorkRestart {
    flags: Vec<AtomicBool>,
}

impl WorkRestart {
    pub fn new(workers: usize) -> Self {
        Self {
            flags: (0..workers).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// The flag worker `id` polls
    pub fn flag(&self, id: usize) -> &AtomicBool {
        &self.flags[id]
    }

    /// Ask worker `id` to stop
    pub fn request(&self, id: usize) {
        self.flags[id].store(true, Ordering::Relaxed);
    }

    /// Ask every worker to stop
    pub fn request_all(&self) {
        for flag in &self.flags {
            flag.store(true, Ordering::Relaxed);
        }
    }

    pub fn any_requested(&self) -> bool {
        self.flags.iter().any(|flag| flag.load(Ordering::Relaxed))
    }

    /// Clear every flag before new work
    pub fn reset(&self) {
        for flag in &self.flags {
            flag.store(false, Ordering::Relaxed);
        }
    }
}

/// Inclusive nonce slice owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceRange {
    pub start: u32,
    pub end: u32,
}

impl NonceRange {
    /// Number of nonces in the slice
    pub fn size(&self) -> u64 {
        (self.end - self.start) as u64 + 1
    }
}

/// Split the nonce space into `workers` disjoint slices
///
/// Worker i starts at `i * (2^32 / n)`; the last slice ends at `u32::MAX`.
pub fn partition(workers: usize) -> Vec<NonceRange> {
    let n = (workers.max(1) as u64).min(1 << 32);
    let width = (1u64 << 32) / n;

    (0..n)
        .map(|i| {
            let start = i * width;
            let end = if i + 1 == n {
                u32::MAX as u64
            } else {
                start + width - 1
            };
            NonceRange {
                start: start as u32,
                end: end as u32,
            }
        })
        .collect()
}

/// Result of successful mining
#[derive(Debug, Clone)]
pub struct MiningOutcome {
    /// Worker that found the nonce
    pub worker: usize,
    /// The winning nonce
    pub nonce: u32,
    /// Its digest
    pub digest: Digest,
    /// Hashes computed by all workers
    pub hashes: u64,
    /// Time taken to find solution
    pub elapsed: Duration,
}

impl MiningOutcome {
    /// Get hashrate in H/s
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.hashes as f64 / secs
        } else {
            0.0
        }
    }
}

/// A nonce reported by a worker
struct Found {
    worker: usize,
    nonce: u32,
    digest: Digest,
}

/// Everything a worker thread needs, moved onto it
struct WorkerJob {
    id: usize,
    range: NonceRange,
    work: WorkItem,
    nonce_span: u32,
    context: Arc<BlockHeaderContext>,
    restart: Arc<WorkRestart>,
    total_hashes: Arc<AtomicU64>,
    found: mpsc::UnboundedSender<Found>,
}

impl WorkerJob {
    /// Scan the slice chunk by chunk; returns this worker's hash count
    fn run(self) -> u64 {
        let scanner = NonceScanner::new(&self.context);
        let flag = self.restart.flag(self.id);
        let span = self.nonce_span.max(1);

        let mut header = self.work.header;
        let mut next = self.range.start;
        let mut hashes = 0u64;

        debug!(
            target: "xhash::miner",
            thread = self.id,
            start = self.range.start,
            end = self.range.end,
            "Worker started"
        );

        loop {
            let chunk_end = next.saturating_add(span - 1).min(self.range.end);
            header.set_nonce(next);

            let result = scanner.scan(&header, &self.work.target, chunk_end, flag);
            hashes += result.hashes_done;
            self.total_hashes
                .fetch_add(result.hashes_done, Ordering::Relaxed);

            if result.found {
                let digest = xhash(&header.with_nonce(result.nonce), self.context.block_time());
                info!(
                    target: "xhash::miner",
                    thread = self.id,
                    nonce = result.nonce,
                    digest = %digest,
                    "Nonce found"
                );
                // The receiver is gone once another worker has won
                let _ = self.found.send(Found {
                    worker: self.id,
                    nonce: result.nonce,
                    digest,
                });
                break;
            }

            if flag.load(Ordering::Relaxed) || result.nonce >= self.range.end {
                break;
            }
            next = result.nonce + 1;
        }

        debug!(
            target: "xhash::miner",
            thread = self.id,
            hashes,
            "Worker stopped"
        );
        hashes
    }
}

/// Wait for every worker; the first failure stops the rest
async fn join_workers(handles: Vec<JoinHandle<u64>>, restart: &WorkRestart) -> Result<(), MinerError> {
    for handle in handles {
        if let Err(e) = handle.await {
            restart.request_all();
            return Err(MinerError::Worker(e));
        }
    }
    Ok(())
}

/// Scheduler for the worker threads
pub struct Miner {
    threads: usize,
    nonce_span: u32,
    report_interval: Duration,
    restart: Arc<WorkRestart>,
    total_hashes: Arc<AtomicU64>,
}

impl Miner {
    pub fn new(config: &MinerConfig) -> Self {
        let threads = config.worker_threads();
        Self {
            threads,
            nonce_span: config.nonce_span.max(1),
            report_interval: Duration::from_secs(config.report_interval_secs.max(1)),
            restart: Arc::new(WorkRestart::new(threads)),
            total_hashes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Restart flags, for stopping the run from another task
    pub fn restart_handle(&self) -> Arc<WorkRestart> {
        Arc::clone(&self.restart)
    }

    /// Cancel ongoing mining
    pub fn cancel(&self) {
        self.restart.request_all();
    }

    /// Reset flags and counters before new work
    pub fn reset(&self) {
        self.restart.reset();
        self.total_hashes.store(0, Ordering::Relaxed);
    }

    /// Get current hash count
    pub fn hash_count(&self) -> u64 {
        self.total_hashes.load(Ordering::Relaxed)
    }

    /// Search the whole nonce space of `work` at block time `timestamp`
    ///
    /// Returns the first nonce any worker reports. Restart flags and the hash
    /// counter are cleared on entry, so a `Miner` can run one job after
    /// another; stop a run through [`Miner::cancel`] or the restart handle
    /// once it has started.
    pub async fn mine(&self, work: WorkItem, timestamp: u64) -> Result<MiningOutcome, MinerError> {
        self.reset();
        let start = Instant::now();
        let context = Arc::new(BlockHeaderContext::new(timestamp));
        let (tx, mut rx) = mpsc::unbounded_channel();

        info!(
            target: "xhash::miner",
            threads = self.threads,
            nonce_span = self.nonce_span,
            timestamp,
            target_msw = format!("{:#010x}", work.target.msw()),
            "Starting mining"
        );

        let mut handles = Vec::with_capacity(self.threads);
        for (id, range) in partition(self.threads).into_iter().enumerate() {
            let job = WorkerJob {
                id,
                range,
                work,
                nonce_span: self.nonce_span,
                context: Arc::clone(&context),
                restart: Arc::clone(&self.restart),
                total_hashes: Arc::clone(&self.total_hashes),
                found: tx.clone(),
            };
            handles.push(tokio::task::spawn_blocking(move || job.run()));
        }
        drop(tx);

        let mut report = tokio::time::interval(self.report_interval);
        report.tick().await;

        let found = loop {
            tokio::select! {
                message = rx.recv() => {
                    if message.is_some() {
                        self.restart.request_all();
                    }
                    break message;
                }
                _ = report.tick() => {
                    let hashes = self.hash_count();
                    let elapsed = start.elapsed().as_secs_f64();
                    info!(
                        target: "xhash::miner",
                        hashes,
                        hashrate = format!("{:.2} H/s", hashes as f64 / elapsed),
                        "Mining in progress"
                    );
                }
            }
        };

        join_workers(handles, &self.restart).await?;

        let hashes = self.hash_count();
        let elapsed = start.elapsed();

        match found {
            Some(found) => {
                let outcome = MiningOutcome {
                    worker: found.worker,
                    nonce: found.nonce,
                    digest: found.digest,
                    hashes,
                    elapsed,
                };
                info!(
                    target: "xhash::miner",
                    nonce = outcome.nonce,
                    hashes,
                    duration_ms = elapsed.as_millis() as u64,
                    hashrate = outcome.hashrate(),
                    "Solution found"
                );
                Ok(outcome)
            }
            None if self.restart.any_requested() => Err(MinerError::Cancelled),
            None => Err(MinerError::Exhausted { hashes }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xhash_core::{HeaderWords, TargetWords};

    fn config(threads: usize, nonce_span: u32) -> MinerConfig {
        MinerConfig {
            threads,
            nonce_span,
            ..Default::default()
        }
    }

    fn work(target: TargetWords) -> WorkItem {
        WorkItem::new(HeaderWords::from_bytes(&[0x5au8; 80]).unwrap(), target)
    }

    #[test]
    fn test_partition_covers_space() {
        for workers in [1usize, 2, 3, 4, 7, 64] {
            let ranges = partition(workers);
            assert_eq!(ranges.len(), workers);
            assert_eq!(ranges[0].start, 0);
            assert_eq!(ranges[workers - 1].end, u32::MAX);

            for pair in ranges.windows(2) {
                assert_eq!(
                    pair[0].end as u64 + 1,
                    pair[1].start as u64,
                    "gap or overlap with {} workers",
                    workers
                );
            }

            let total: u64 = ranges.iter().map(NonceRange::size).sum();
            assert_eq!(total, 1u64 << 32);
        }
    }

    #[test]
    fn test_partition_starts() {
        let ranges = partition(4);
        assert_eq!(ranges[1].start, 0x4000_0000);
        assert_eq!(ranges[2].start, 0x8000_0000);
        assert_eq!(ranges[3].start, 0xC000_0000);
        assert_eq!(partition(0), partition(1));
    }

    #[test]
    fn test_restart_flags() {
        let restart = WorkRestart::new(3);
        assert!(!restart.any_requested());

        restart.request(1);
        assert!(!restart.flag(0).load(Ordering::Relaxed));
        assert!(restart.flag(1).load(Ordering::Relaxed));

        restart.request_all();
        assert!((0..3).all(|i| restart.flag(i).load(Ordering::Relaxed)));

        restart.reset();
        assert!(!restart.any_requested());
    }

    #[tokio::test]
    async fn test_mine_easy_target() {
        let miner = Miner::new(&config(2, 16));
        let work = work(TargetWords::MAX);

        let outcome = miner.mine(work, 1_700_000_000).await.unwrap();

        // Every nonce matches, so the winner stopped on its first attempt
        let starts: Vec<u32> = partition(2).iter().map(|r| r.start).collect();
        assert!(starts.contains(&outcome.nonce));
        assert_eq!(
            outcome.digest,
            xhash(&work.header.with_nonce(outcome.nonce), 1_700_000_000)
        );
        assert!(outcome.hashes >= 1);
        assert!(miner.restart_handle().any_requested());
    }

    #[tokio::test]
    async fn test_mine_clears_stale_cancel() {
        let miner = Miner::new(&config(3, 1024));
        miner.cancel();

        let outcome = miner.mine(work(TargetWords::MAX), 0).await.unwrap();

        // Every worker matched its first nonce; none saw the old flag
        assert_eq!(outcome.hashes, 3);
        assert_eq!(miner.hash_count(), 3);
    }

    #[tokio::test]
    async fn test_mine_back_to_back() {
        let miner = Miner::new(&config(2, 4096));
        let mut words = [u32::MAX; 8];
        words[7] = 0x00FF_FFFF;
        let work = work(TargetWords::new(words));

        let first = miner.mine(work, 1_700_000_000).await.unwrap();
        let second = miner.mine(work, 1_700_000_000).await.unwrap();

        for outcome in [&first, &second] {
            assert!(outcome.digest.msw() <= 0x00FF_FFFF);
            assert_eq!(
                outcome.digest,
                xhash(&work.header.with_nonce(outcome.nonce), 1_700_000_000)
            );
        }
        assert_eq!(second.hashes, miner.hash_count());
    }

    #[tokio::test]
    async fn test_hash_count_restarts_per_run() {
        let miner = Miner::new(&config(2, 16));

        let first = miner.mine(work(TargetWords::MAX), 0).await.unwrap();
        let second = miner.mine(work(TargetWords::MAX), 0).await.unwrap();

        assert_eq!(first.hashes, 2);
        assert_eq!(second.hashes, 2);
        assert_eq!(miner.hash_count(), 2);
    }

    #[tokio::test]
    async fn test_worker_failure_stops_the_rest() {
        let restart = Arc::new(WorkRestart::new(2));

        let crashed = tokio::task::spawn_blocking(|| -> u64 { panic!("worker crashed") });
        let survivor = {
            let restart = Arc::clone(&restart);
            tokio::task::spawn_blocking(move || {
                let mut spins = 0u64;
                while !restart.flag(1).load(Ordering::Relaxed) {
                    std::thread::sleep(Duration::from_millis(1));
                    spins += 1;
                }
                spins
            })
        };

        let result = join_workers(vec![crashed, survivor], &restart).await;

        assert!(matches!(result, Err(MinerError::Worker(_))));
        assert!(restart.flag(1).load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_mine_cancelled_while_running() {
        let miner = Arc::new(Miner::new(&config(2, 256)));
        let restart = miner.restart_handle();

        let task = {
            let miner = Arc::clone(&miner);
            tokio::spawn(async move { miner.mine(work(TargetWords::new([0; 8])), 0).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        restart.request_all();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(MinerError::Cancelled)));
        assert!(miner.hash_count() >= 2);
    }

    #[tokio::test]
    async fn test_reset_clears_state() {
        let miner = Miner::new(&config(1, 8));
        miner.mine(work(TargetWords::MAX), 0).await.unwrap();
        assert!(miner.hash_count() > 0);

        miner.reset();
        assert_eq!(miner.hash_count(), 0);
        assert!(!miner.restart_handle().any_requested());
    }
}
