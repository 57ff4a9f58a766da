//! Hash primitives chained by the Xhash pipeline
//!
//! Every stage is consumed through [`Hash512`]: a fresh state, any number of
//! byte buffers, and a fixed 64-byte output. Five of the seven algorithms come
//! from their crates; Luffa-512 and ECHO-512 live in [`crate::luffa`] and
//! [`crate::echo`].

use digest::consts::U64;

use crate::params::STAGE_BYTES;

pub use crate::echo::Echo512;
pub use crate::luffa::Luffa512;

/// Uniform init / update / finalize capability over a 512-bit hash.
///
/// Implementations carry no shared state: every `init()` returns an
/// independent instance, so pipelines on different threads never alias.
pub trait Hash512: Sized {
    /// Fresh hashing state
    fn init() -> Self;

    /// Absorb `data`
    fn update(&mut self, data: &[u8]);

    /// Consume the state and produce the 64-byte output
    fn finalize(self) -> [u8; STAGE_BYTES];

    /// One-shot convenience over a single buffer
    #[inline(always)]
    fn digest(data: &[u8]) -> [u8; STAGE_BYTES] {
        let mut state = Self::init();
        state.update(data);
        state.finalize()
    }
}

/// Adapts a RustCrypto (`digest` 0.10) 512-bit hasher to [`Hash512`]
macro_rules! digest_stage {
    ($(#[$doc:meta])* $name:ident, $inner:ty) => {
        $(#[$doc])*
        pub struct $name($inner);

        impl Hash512 for $name {
            #[inline(always)]
            fn init() -> Self {
                Self(<$inner as digest::Digest>::new())
            }

            #[inline(always)]
            fn update(&mut self, data: &[u8]) {
                digest::Digest::update(&mut self.0, data);
            }

            #[inline(always)]
            fn finalize(self) -> [u8; STAGE_BYTES] {
                let mut out = [0u8; STAGE_BYTES];
                out.copy_from_slice(&digest::Digest::finalize(self.0));
                out
            }
        }
    };
}

digest_stage!(
    /// Blue Midnight Wish, 512-bit output
    Bmw512,
    bmw_hash::Bmw512
);

digest_stage!(
    /// Grøstl-512
    Groestl512,
    groestl::Groestl512
);

digest_stage!(
    /// Skein-512 with a 512-bit output
    Skein512,
    skein::Skein512<U64>
);

digest_stage!(
    /// Keccak-512 (original Keccak padding, not FIPS-202 SHA3-512)
    Keccak512,
    sha3::Keccak512
);

/// BLAKE-512 (SHA-3 finalist, 16 rounds)
///
/// `blake-hash` is still on `digest` 0.9, hence the separate adapter.
pub struct Blake512(blake_hash::Blake512);

impl Hash512 for Blake512 {
    #[inline(always)]
    fn init() -> Self {
        Self(<blake_hash::Blake512 as blake_hash::Digest>::new())
    }

    #[inline(always)]
    fn update(&mut self, data: &[u8]) {
        blake_hash::Digest::update(&mut self.0, data);
    }

    #[inline(always)]
    fn finalize(self) -> [u8; STAGE_BYTES] {
        let mut out = [0u8; STAGE_BYTES];
        out.copy_from_slice(&blake_hash::Digest::finalize(self.0));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_streaming<H: Hash512>() {
        let data: Vec<u8> = (0..200u8).collect();

        let one_shot = H::digest(&data);

        let mut split = H::init();
        split.update(&data[..7]);
        split.update(&data[7..130]);
        split.update(&[]);
        split.update(&data[130..]);

        assert_eq!(one_shot, split.finalize());
    }

    fn check_deterministic<H: Hash512>() {
        let block = [1u8; 64];

        let result1 = H::digest(&block);
        let result2 = H::digest(&block);

        assert_eq!(result1, result2);
        assert_ne!(result1, block);
        assert_ne!(H::digest(&[0u8; 64]), result1);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        check_streaming::<Blake512>();
        check_streaming::<Bmw512>();
        check_streaming::<Groestl512>();
        check_streaming::<Skein512>();
        check_streaming::<Keccak512>();
        check_streaming::<Luffa512>();
        check_streaming::<Echo512>();
    }

    #[test]
    fn test_primitives_deterministic() {
        check_deterministic::<Blake512>();
        check_deterministic::<Bmw512>();
        check_deterministic::<Groestl512>();
        check_deterministic::<Skein512>();
        check_deterministic::<Keccak512>();
        check_deterministic::<Luffa512>();
        check_deterministic::<Echo512>();
    }

    #[test]
    fn test_primitives_are_distinct() {
        let input = [0x5au8; 64];
        let outputs = [
            Blake512::digest(&input),
            Bmw512::digest(&input),
            Groestl512::digest(&input),
            Skein512::digest(&input),
            Keccak512::digest(&input),
            Luffa512::digest(&input),
            Echo512::digest(&input),
        ];

        for i in 0..outputs.len() {
            for j in i + 1..outputs.len() {
                assert_ne!(outputs[i], outputs[j], "stages {} and {} collide", i, j);
            }
        }
    }

    #[test]
    fn test_keccak_is_not_sha3() {
        use digest::Digest;

        let sha3 = sha3::Sha3_512::digest(b"abc");
        assert_ne!(Keccak512::digest(b"abc")[..], sha3[..]);
    }
}
