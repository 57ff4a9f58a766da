//! Xhash pipeline
//!
//! Seven 512-bit primitives chained over the timestamp-salted header, with
//! XOR feedback after BMW, Skein and ECHO:
//!
//! ```text
//! h0 = Blake512(timestamp_le || header[0..80])
//! h1 = Bmw512(h0)     ^ h0
//! h2 = Groestl512(h1)
//! h3 = Skein512(h2)   ^ h2
//! h4 = Keccak512(h3)
//! h5 = Luffa512(h4)
//! h6 = Echo512(h5)    ^ h5
//! digest = h6[0..32]
//! ```
//!
//! Every primitive state is created inside the call and dropped with it;
//! nothing is cached between calls or shared between threads.

use crate::params::*;
use crate::primitives::{
    Blake512, Bmw512, Echo512, Groestl512, Hash512, Keccak512, Luffa512, Skein512,
};
use crate::types::{Digest, HeaderWords};

/// One 64-byte stage output
pub type Stage = [u8; STAGE_BYTES];

/// The seven intermediate outputs of a single pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageBuffer([Stage; STAGES]);

impl StageBuffer {
    /// Output of stage `index` (0 = BLAKE, 6 = ECHO), after any XOR feedback
    pub fn stage(&self, index: usize) -> &Stage {
        &self.0[index]
    }

    /// First 32 bytes of the last stage
    #[inline(always)]
    pub fn digest(&self) -> Digest {
        let mut out = [0u8; DIGEST_BYTES];
        out.copy_from_slice(&self.0[STAGES - 1][..DIGEST_BYTES]);
        Digest::from_bytes(&out)
    }
}

/// `dst ^= src` over all 64 bytes
#[inline(always)]
pub fn xor_into(dst: &mut Stage, src: &Stage) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}

/// Run `H` over `input`, optionally folding `input` back into the output
#[inline(always)]
fn stage<H: Hash512>(input: &Stage, feedback: bool) -> Stage {
    let mut out = H::digest(input);
    if feedback {
        xor_into(&mut out, input);
    }
    out
}

/// Full pipeline over the serialized header bytes
#[inline(always)]
fn run(header: &[u8; HEADER_BYTES], timestamp: u64) -> StageBuffer {
    let salt: [u8; TIMESTAMP_BYTES] = timestamp.to_le_bytes();
    let mut blake = Blake512::init();
    blake.update(&salt);
    blake.update(header);
    let h0 = blake.finalize();

    let h1 = stage::<Bmw512>(&h0, true);
    let h2 = stage::<Groestl512>(&h1, false);
    let h3 = stage::<Skein512>(&h2, true);
    let h4 = stage::<Keccak512>(&h3, false);
    let h5 = stage::<Luffa512>(&h4, false);
    let h6 = stage::<Echo512>(&h5, true);

    StageBuffer([h0, h1, h2, h3, h4, h5, h6])
}

/// All stage outputs for `header` at `timestamp`
pub fn xhash_stages(header: &HeaderWords, timestamp: u64) -> StageBuffer {
    run(&header.serialize(), timestamp)
}

/// Digest of `header` (its first 80 bytes) salted with `timestamp`
///
/// Deterministic: the same header words and timestamp always give the same
/// digest.
#[inline(always)]
pub fn xhash(header: &HeaderWords, timestamp: u64) -> Digest {
    run(&header.serialize(), timestamp).digest()
}

/// Byte-level variant for callers holding an already serialized header
pub fn xhash_bytes(header: &[u8; HEADER_BYTES], timestamp: u64) -> [u8; DIGEST_BYTES] {
    run(header, timestamp).digest().to_bytes()
}
