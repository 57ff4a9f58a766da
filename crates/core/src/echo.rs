//! ECHO-512
//!
//! A 4x4 matrix of 128-bit words: eight words of chaining value and eight of
//! message (128-byte blocks). Each of the ten rounds runs two AES rounds on
//! every word (keyed by the running bit counter, then by the zero salt),
//! followed by a word-level ShiftRows and a byte-wise AES MixColumns across
//! each column of words.

use aes::Block;
use aes::hazmat::cipher_round;

use crate::params::STAGE_BYTES;
use crate::primitives::Hash512;

const BLOCK_BYTES: usize = 128;
const ROUNDS: usize = 10;
const CHAINING_WORDS: usize = 8;
const OUTPUT_BITS: u16 = 512;

/// Room needed at the end of the final block: 2-byte output size + 16-byte counter
const TRAILER_BYTES: usize = 18;

type Word = [u8; 16];

/// ECHO-512 hashing state
#[derive(Clone)]
pub struct Echo512 {
    chaining: [Word; CHAINING_WORDS],
    counter: u128,
    buffer: [u8; BLOCK_BYTES],
    buffered: usize,
}

impl Echo512 {
    fn compress(&mut self, block: &[u8; BLOCK_BYTES]) {
        let mut w = [[0u8; 16]; 16];
        w[..CHAINING_WORDS].copy_from_slice(&self.chaining);
        for (word, chunk) in w[CHAINING_WORDS..].iter_mut().zip(block.chunks_exact(16)) {
            word.copy_from_slice(chunk);
        }

        let salt = Block::default();
        let mut k = self.counter;

        for _ in 0..ROUNDS {
            for word in w.iter_mut() {
                let mut state = Block::clone_from_slice(word);
                cipher_round(&mut state, &Block::clone_from_slice(&k.to_le_bytes()));
                cipher_round(&mut state, &salt);
                word.copy_from_slice(state.as_slice());
                k = k.wrapping_add(1);
            }

            shift_rows(&mut w);
            mix_columns(&mut w);
        }

        for (u, chain) in self.chaining.iter_mut().enumerate() {
            for (b, byte) in chain.iter_mut().enumerate() {
                *byte ^= block[u * 16 + b] ^ w[u][b] ^ w[u + CHAINING_WORDS][b];
            }
        }
    }
}

impl Hash512 for Echo512 {
    fn init() -> Self {
        Self {
            chaining: [(OUTPUT_BITS as u128).to_le_bytes(); CHAINING_WORDS],
            counter: 0,
            buffer: [0u8; BLOCK_BYTES],
            buffered: 0,
        }
    }

    fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (BLOCK_BYTES - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];

            if self.buffered == BLOCK_BYTES {
                self.counter = self.counter.wrapping_add((BLOCK_BYTES * 8) as u128);
                let block = self.buffer;
                self.compress(&block);
                self.buffered = 0;
            }
        }
    }

    fn finalize(mut self) -> [u8; STAGE_BYTES] {
        let tail_bits = (self.buffered * 8) as u128;
        self.counter = self.counter.wrapping_add(tail_bits);
        let total_bits = self.counter;

        // A final block carrying only padding is processed with a zero counter
        if tail_bits == 0 {
            self.counter = 0;
        }

        let mut last = [0u8; BLOCK_BYTES];
        last[..self.buffered].copy_from_slice(&self.buffer[..self.buffered]);
        last[self.buffered] = 0x80;

        if self.buffered + 1 > BLOCK_BYTES - TRAILER_BYTES {
            self.compress(&last);
            self.counter = 0;
            last = [0u8; BLOCK_BYTES];
        }

        last[BLOCK_BYTES - TRAILER_BYTES..BLOCK_BYTES - 16]
            .copy_from_slice(&OUTPUT_BITS.to_le_bytes());
        last[BLOCK_BYTES - 16..].copy_from_slice(&total_bits.to_le_bytes());
        self.compress(&last);

        let mut out = [0u8; STAGE_BYTES];
        for (chunk, word) in out.chunks_exact_mut(16).zip(self.chaining.iter()) {
            chunk.copy_from_slice(word);
        }
        out
    }
}

/// Rotate row `r` of the word matrix left by `r` columns (index = 4 * col + row)
#[inline(always)]
fn shift_rows(w: &mut [Word; 16]) {
    for row in 1..4 {
        let current = [w[row], w[row + 4], w[row + 8], w[row + 12]];
        for col in 0..4 {
            w[row + 4 * col] = current[(col + row) % 4];
        }
    }
}

/// Multiply by 2 in GF(2^8) with reduction polynomial x^8 + x^4 + x^3 + x + 1
#[inline(always)]
fn xtime(x: u8) -> u8 {
    (x << 1) ^ ((x >> 7) * 0x1b)
}

/// AES MixColumns applied byte-wise to each column of four words
#[inline(always)]
fn mix_columns(w: &mut [Word; 16]) {
    for col in 0..4 {
        let base = col * 4;
        for b in 0..16 {
            let a0 = w[base][b];
            let a1 = w[base + 1][b];
            let a2 = w[base + 2][b];
            let a3 = w[base + 3][b];

            let ab = a0 ^ a1;
            let bc = a1 ^ a2;
            let cd = a2 ^ a3;
            let abx = xtime(ab);
            let bcx = xtime(bc);
            let cdx = xtime(cd);

            w[base][b] = abx ^ bc ^ a3;
            w[base + 1][b] = bcx ^ a0 ^ cd;
            w[base + 2][b] = cdx ^ ab ^ a3;
            w[base + 3][b] = abx ^ bcx ^ cdx ^ ab ^ a2;
        }
    }
}
