//! Xhash Algorithm Parameters
//!
//! Layout of the work buffers exchanged with the mining harness and
//! widths of the intermediate hash stages.

/// Number of 32-bit words in a header buffer
pub const HEADER_WORDS: usize = 32;

/// Index of the nonce word inside the header buffer
pub const NONCE_INDEX: usize = 19;

/// Serialized block header size in bytes (the first 20 words)
pub const HEADER_BYTES: usize = 80;

/// Number of 32-bit words in a target
pub const TARGET_WORDS: usize = 8;

/// Number of 32-bit words in a digest
pub const DIGEST_WORDS: usize = 8;

/// Digest size in bytes
pub const DIGEST_BYTES: usize = DIGEST_WORDS * 4;

/// Output width of every hash stage (512 bits)
pub const STAGE_BYTES: usize = 64;

/// Number of chained hash stages
pub const STAGES: usize = 7;

/// Timestamp prefix fed to the first stage (little-endian u64)
pub const TIMESTAMP_BYTES: usize = 8;

/// Most-significant target/digest word, used by the fast-reject check
pub const MSW_INDEX: usize = 7;
