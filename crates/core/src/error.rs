//! Boundary validation errors
//!
//! Hashing and scanning are total over well-formed buffers; the only
//! failures are malformed inputs rejected before a scan starts.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XhashError {
    #[error("Header must be 80 or 128 bytes, got {0}")]
    HeaderBytes(usize),

    #[error("Header must be 32 words, got {0}")]
    HeaderWords(usize),

    #[error("Target must be 32 bytes, got {0}")]
    TargetBytes(usize),

    #[error("Target must be 8 words, got {0}")]
    TargetWords(usize),
}
