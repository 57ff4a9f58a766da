//! Work buffers exchanged with the mining harness
//!
//! All three types store 32-bit words; byte views are little-endian per word,
//! matching the in-memory layout the harness hands over.

use core::fmt;

use crate::error::XhashError;
use crate::params::*;

/// 32-word header buffer; word [`NONCE_INDEX`] is the nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderWords([u32; HEADER_WORDS]);

impl HeaderWords {
    pub const fn new(words: [u32; HEADER_WORDS]) -> Self {
        Self(words)
    }

    /// Build from a word slice, which must hold exactly 32 words
    pub fn from_words(words: &[u32]) -> Result<Self, XhashError> {
        let words: [u32; HEADER_WORDS] = words
            .try_into()
            .map_err(|_| XhashError::HeaderWords(words.len()))?;
        Ok(Self(words))
    }

    /// Build from bytes: either the 80-byte serialized header (the remaining
    /// words are zero) or the full 128-byte buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, XhashError> {
        if bytes.len() != HEADER_BYTES && bytes.len() != HEADER_WORDS * 4 {
            return Err(XhashError::HeaderBytes(bytes.len()));
        }

        let mut words = [0u32; HEADER_WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Self(words))
    }

    pub fn words(&self) -> &[u32; HEADER_WORDS] {
        &self.0
    }

    #[inline(always)]
    pub fn nonce(&self) -> u32 {
        self.0[NONCE_INDEX]
    }

    #[inline(always)]
    pub fn set_nonce(&mut self, nonce: u32) {
        self.0[NONCE_INDEX] = nonce;
    }

    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.set_nonce(nonce);
        self
    }

    /// The 80 bytes that enter the first hash stage
    #[inline(always)]
    pub fn serialize(&self) -> [u8; HEADER_BYTES] {
        let mut out = [0u8; HEADER_BYTES];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

/// 256-bit target as 8 words, most significant at index 7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetWords([u32; TARGET_WORDS]);

impl TargetWords {
    /// The easiest possible target: every digest matches
    pub const MAX: Self = Self([u32::MAX; TARGET_WORDS]);

    pub const fn new(words: [u32; TARGET_WORDS]) -> Self {
        Self(words)
    }

    pub fn from_words(words: &[u32]) -> Result<Self, XhashError> {
        let words: [u32; TARGET_WORDS] = words
            .try_into()
            .map_err(|_| XhashError::TargetWords(words.len()))?;
        Ok(Self(words))
    }

    /// Build from 32 bytes, little-endian words
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, XhashError> {
        if bytes.len() != TARGET_WORDS * 4 {
            return Err(XhashError::TargetBytes(bytes.len()));
        }

        let mut words = [0u32; TARGET_WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Self(words))
    }

    /// Target for a pool share difficulty (difficulty 1 = 0xFFFF0000 << 192)
    ///
    /// Zero, negative or NaN difficulties yield [`TargetWords::MAX`].
    pub fn from_difficulty(difficulty: f64) -> Self {
        if difficulty.is_nan() || difficulty <= 0.0 {
            return Self::MAX;
        }

        let mut diff = difficulty;
        let mut k = 6usize;
        while k > 0 && diff > 1.0 {
            diff /= 4_294_967_296.0;
            k -= 1;
        }

        let m = (4_294_901_760.0 / diff) as u64;
        if m == 0 && k == 6 {
            return Self::MAX;
        }

        let mut words = [0u32; TARGET_WORDS];
        words[k] = m as u32;
        words[k + 1] = (m >> 32) as u32;
        Self(words)
    }

    pub fn words(&self) -> &[u32; TARGET_WORDS] {
        &self.0
    }

    /// Most-significant word
    #[inline(always)]
    pub fn msw(&self) -> u32 {
        self.0[MSW_INDEX]
    }

    pub fn to_bytes(&self) -> [u8; TARGET_WORDS * 4] {
        let mut out = [0u8; TARGET_WORDS * 4];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

/// 32-byte pipeline output viewed as 8 little-endian words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Digest([u32; DIGEST_WORDS]);

impl Digest {
    pub const fn new(words: [u32; DIGEST_WORDS]) -> Self {
        Self(words)
    }

    #[inline(always)]
    pub fn from_bytes(bytes: &[u8; DIGEST_BYTES]) -> Self {
        let mut words = [0u32; DIGEST_WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(words)
    }

    pub fn to_bytes(&self) -> [u8; DIGEST_BYTES] {
        let mut out = [0u8; DIGEST_BYTES];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    pub fn words(&self) -> &[u32; DIGEST_WORDS] {
        &self.0
    }

    /// Most-significant word
    #[inline(always)]
    pub fn msw(&self) -> u32 {
        self.0[MSW_INDEX]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// One unit of work handed over by the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    pub header: HeaderWords,
    pub target: TargetWords,
}

impl WorkItem {
    pub fn new(header: HeaderWords, target: TargetWords) -> Self {
        Self { header, target }
    }
}
