//! # Xhash Core Algorithm
//!
//! A chained proof-of-work digest and the nonce search built on it.
//!
//! Seven 512-bit hash functions run in sequence over an 8-byte timestamp
//! followed by the 80-byte block header. Three of the stages fold their
//! input back into their output with XOR. The first 32 bytes of the last
//! stage are the digest.
//!
//! ## Pipeline
//!
//! ```text
//! BLAKE-512 -> BMW-512 (^) -> Groestl-512 -> Skein-512 (^)
//!           -> Keccak-512 -> Luffa-512 -> ECHO-512 (^) -> digest[0..32]
//! ```
//!
//! ## Input Format
//!
//! Work arrives as 32 little-endian 32-bit words, of which the first 20
//! (80 bytes) are hashed. Word 19 holds the nonce:
//!
//! ```text
//! blake_input = timestamp_le (8B) || header_words[0..20] (80B)
//!                                                 ^^^^ word 19 = nonce
//! ```
//!
//! A digest matches a target when, read as a 256-bit number with word 7
//! most significant, it is numerically less than or equal to the target.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::atomic::AtomicBool;
//! use xhash_core::{BlockHeaderContext, HeaderWords, NonceScanner, TargetWords, xhash};
//!
//! let header = HeaderWords::from_bytes(&[0u8; 80]).unwrap();
//! let digest = xhash(&header, 1_700_000_000);
//! println!("{}", digest);
//!
//! let context = BlockHeaderContext::new(1_700_000_000);
//! let stop = AtomicBool::new(false);
//! let result = NonceScanner::new(&context).scan(&header, &TargetWords::MAX, 1000, &stop);
//! assert!(result.found);
//! ```

mod context;
mod echo;
mod error;
mod luffa;
mod params;
mod primitives;
mod scanner;
mod target;
mod types;
mod xhash;

mod ffi;

pub use context::BlockHeaderContext;
pub use error::XhashError;
pub use params::*;
pub use primitives::{
    Blake512, Bmw512, Echo512, Groestl512, Hash512, Keccak512, Luffa512, Skein512,
};
pub use scanner::{CancelSignal, NonceScanner, ScanResult, scan_with_timestamp};
pub use target::{fast_reject_mask, fulltest, matches, matches_with};
pub use types::{Digest, HeaderWords, TargetWords, WorkItem};
pub use xhash::{Stage, StageBuffer, xhash, xhash_bytes, xhash_stages, xor_into};
