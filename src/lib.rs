//! Xhash Miner Library
//!
//! A CPU miner for the Xhash proof-of-work.
//!
//! # Overview
//!
//! Xhash chains seven 512-bit hash functions over a timestamp-salted block
//! header. This crate wraps the core algorithm with what a miner needs
//! around it: configuration, work files, and a scheduler that spreads the
//! nonce space over worker threads.
//!
//! # Example
//!
//! ```rust
//! use xhash::algorithm::{HeaderWords, xhash};
//!
//! // 80-byte header, nonce in word 19
//! let header = HeaderWords::from_bytes(&[0u8; 80]).unwrap().with_nonce(42);
//!
//! // Compute digest at a given block time
//! let digest = xhash(&header, 1_700_000_000);
//! println!("{}", digest);
//! ```

// Re-export the core algorithm
pub use xhash_core as algorithm;

pub mod config;
pub mod miner;
pub mod work;

// Convenience re-exports
pub use algorithm::{Digest, HeaderWords, TargetWords, WorkItem, xhash};
pub use config::MinerConfig;
pub use miner::{Miner, MinerError, MiningOutcome};
pub use work::WorkTemplate;
