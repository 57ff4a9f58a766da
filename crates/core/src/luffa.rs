//! Luffa-512
//!
//! Five 256-bit lanes absorb 32-byte message blocks through the message
//! injection function, then each lane runs its own eight-step permutation
//! (SubCrumb, MixWord, AddConstant). Words are big-endian. The 512-bit
//! output is squeezed over two blank rounds after the padding block.

use crate::params::STAGE_BYTES;
use crate::primitives::Hash512;

const BLOCK_BYTES: usize = 32;
const LANES: usize = 5;
const STEPS: usize = 8;

type Lane = [u32; 8];

const IV: [Lane; LANES] = [
    [
        0x6d251e69, 0x44b051e0, 0x4eaa6fb4, 0xdbf78465, 0x6e292011, 0x90152df4, 0xee058139,
        0xdef610bb,
    ],
    [
        0xc3b44b95, 0xd9d2f256, 0x70eee9a0, 0xde099fa3, 0x5d9b0557, 0x8fc944b3, 0xcf1ccf0e,
        0x746cd581,
    ],
    [
        0xf7efc89d, 0x5dba5781, 0x04016ce5, 0xad659c05, 0x0306194f, 0x666d1836, 0x24aa230a,
        0x8b264ae7,
    ],
    [
        0x858075d5, 0x36d79cce, 0xe571f7d7, 0x204b1f67, 0x35870c6a, 0x57e9e923, 0x14bcb808,
        0x7cde72ce,
    ],
    [
        0x6c68e9be, 0x5ec41e22, 0xc825b7c7, 0xaffb4363, 0xf5df3999, 0x0fc688f1, 0xb07224cc,
        0x03e86cea,
    ],
];

/// Step constants per lane: `[lane][0]` is added to word 0, `[lane][1]` to word 4
const RC: [[[u32; STEPS]; 2]; LANES] = [
    [
        [
            0x303994a6, 0xc0e65299, 0x6cc33a12, 0xdc56983e, 0x1e00108f, 0x7800423d, 0x8f5b7882,
            0x96e1db12,
        ],
        [
            0xe0337818, 0x441ba90d, 0x7f34d442, 0x9389217f, 0xe5a8bce6, 0x5274baf4, 0x26889ba7,
            0x9a226e9d,
        ],
    ],
    [
        [
            0xb6de10ed, 0x70f47aae, 0x0707a3d4, 0x1c1e8f51, 0x707a3d45, 0xaeb28562, 0xbaca1589,
            0x40a46f3e,
        ],
        [
            0x01685f3d, 0x05a17cf4, 0xbd09caca, 0xf4272b28, 0x144ae5cc, 0xfaa7ae2b, 0x2e48f1c1,
            0xb923c704,
        ],
    ],
    [
        [
            0xfc20d9d2, 0x34552e25, 0x7ad8818f, 0x8438764a, 0xbb6de032, 0xedb780c8, 0xd9847356,
            0xa2c78434,
        ],
        [
            0xe25e72c1, 0xe623bb72, 0x5c58a4a4, 0x1e38e2e7, 0x78e38b9d, 0x27586719, 0x36eda57f,
            0x703aace7,
        ],
    ],
    [
        [
            0xb213afa5, 0xc84ebe95, 0x4e608a22, 0x56d858fe, 0x343b138f, 0xd0ec4e3d, 0x2ceb4882,
            0xb3ad2208,
        ],
        [
            0xe028c9bf, 0x44756f91, 0x7e8fce32, 0x956548be, 0xfe191be2, 0x3cb226e5, 0x5944a28e,
            0xa1c4c355,
        ],
    ],
    [
        [
            0xf0d2e9e3, 0xac11d7fa, 0x1bcb66f2, 0x6f2d9bc9, 0x78602649, 0x8edae952, 0x3b6ba548,
            0xedae9520,
        ],
        [
            0x5090d577, 0x2d1925ab, 0xb46496ac, 0xd1925ab0, 0x29131ab6, 0x0fc053c3, 0x3f014f0c,
            0xfc053c31,
        ],
    ],
];

/// Luffa-512 hashing state
#[derive(Clone)]
pub struct Luffa512 {
    chaining: [Lane; LANES],
    buffer: [u8; BLOCK_BYTES],
    buffered: usize,
}

impl Luffa512 {
    fn absorb(&mut self, block: &[u8; BLOCK_BYTES]) {
        let mut message = [0u32; 8];
        for (word, chunk) in message.iter_mut().zip(block.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        inject(&mut self.chaining, message);
        permute(&mut self.chaining);
    }

    /// XOR of all lanes, big-endian
    fn squeeze(&self, out: &mut [u8]) {
        for (i, chunk) in out.chunks_exact_mut(4).enumerate() {
            let word = self
                .chaining
                .iter()
                .fold(0u32, |acc, lane| acc ^ lane[i]);
            chunk.copy_from_slice(&word.to_be_bytes());
        }
    }
}

impl Hash512 for Luffa512 {
    fn init() -> Self {
        Self {
            chaining: IV,
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
                let block = self.buffer;
                self.absorb(&block);
                self.buffered = 0;
            }
        }
    }

    fn finalize(mut self) -> [u8; STAGE_BYTES] {
        let mut last = [0u8; BLOCK_BYTES];
        last[..self.buffered].copy_from_slice(&self.buffer[..self.buffered]);
        last[self.buffered] = 0x80;
        self.absorb(&last);

        let blank = [0u8; BLOCK_BYTES];
        let mut out = [0u8; STAGE_BYTES];

        self.absorb(&blank);
        self.squeeze(&mut out[..32]);
        self.absorb(&blank);
        self.squeeze(&mut out[32..]);

        out
    }
}

/// Multiplication by x in GF(2^32)[x] / (x^8 + x^4 + x^3 + x + 1)
#[inline(always)]
fn mul2(x: Lane) -> Lane {
    let t = x[7];
    [t, x[0] ^ t, x[1], x[2] ^ t, x[3] ^ t, x[4], x[5], x[6]]
}

#[inline(always)]
fn xor(a: Lane, b: Lane) -> Lane {
    let mut out = a;
    for (o, b) in out.iter_mut().zip(b.iter()) {
        *o ^= b;
    }
    out
}

/// Message injection for five lanes
#[inline(always)]
fn inject(v: &mut [Lane; LANES], message: Lane) {
    let a = mul2(xor(xor(xor(v[0], v[1]), xor(v[2], v[3])), v[4]));
    for lane in v.iter_mut() {
        *lane = xor(*lane, a);
    }

    let b = xor(mul2(v[0]), v[1]);
    v[1] = xor(mul2(v[1]), v[2]);
    v[2] = xor(mul2(v[2]), v[3]);
    v[3] = xor(mul2(v[3]), v[4]);
    v[4] = xor(mul2(v[4]), v[0]);

    v[0] = xor(mul2(b), v[4]);
    v[4] = xor(mul2(v[4]), v[3]);
    v[3] = xor(mul2(v[3]), v[2]);
    v[2] = xor(mul2(v[2]), v[1]);
    v[1] = xor(mul2(v[1]), b);

    let mut m = message;
    for lane in v.iter_mut() {
        *lane = xor(*lane, m);
        m = mul2(m);
    }
}

/// Tweak then eight steps on each lane
#[inline(always)]
fn permute(v: &mut [Lane; LANES]) {
    for (j, lane) in v.iter_mut().enumerate() {
        for word in &mut lane[4..] {
            *word = word.rotate_left(j as u32);
        }

        for r in 0..STEPS {
            sub_crumb(lane, [0, 1, 2, 3]);
            sub_crumb(lane, [5, 6, 7, 4]);

            mix_word(lane, 0, 4);
            mix_word(lane, 1, 5);
            mix_word(lane, 2, 6);
            mix_word(lane, 3, 7);

            lane[0] ^= RC[j][0][r];
            lane[4] ^= RC[j][1][r];
        }
    }
}

/// 4-bit S-box applied bit-sliced across four words
#[inline(always)]
fn sub_crumb(lane: &mut Lane, idx: [usize; 4]) {
    let (mut a0, mut a1, mut a2, mut a3) = (lane[idx[0]], lane[idx[1]], lane[idx[2]], lane[idx[3]]);

    let mut tmp = a0;
    a0 |= a1;
    a2 ^= a3;
    a1 = !a1;
    a0 ^= a3;
    a3 &= tmp;
    a1 ^= a3;
    a3 ^= a2;
    a2 &= a0;
    a0 = !a0;
    a2 ^= a1;
    a1 |= a3;
    tmp ^= a1;
    a3 ^= a2;
    a2 &= a1;
    a1 ^= a0;
    a0 = tmp;

    lane[idx[0]] = a0;
    lane[idx[1]] = a1;
    lane[idx[2]] = a2;
    lane[idx[3]] = a3;
}

#[inline(always)]
fn mix_word(lane: &mut Lane, i: usize, j: usize) {
    let (mut u, mut v) = (lane[i], lane[j]);

    v ^= u;
    u = u.rotate_left(2) ^ v;
    v = v.rotate_left(14) ^ u;
    u = u.rotate_left(10) ^ v;
    v = v.rotate_left(1);

    lane[i] = u;
    lane[j] = v;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_answers() {
        assert_eq!(
            hex::encode(Luffa512::digest(b"")),
            "6e7de4501189b3ca58f3ac114916654bbcd4922024b4cc1cd764acfe8ab4b780\
             5df133eab345ffdb1c414564c924f48e0a301824e2ac4c34bd4efde2e43da90e"
        );
        assert_eq!(
            hex::encode(Luffa512::digest(b"abc")),
            "f40245973e80d79d0f4b9b202ddd4505b81b8830501bea31612b5817aae38792\
             1dcefd808ca2c78020aff59345d6f91f0ee6b2eee113f0cbcf22b64381387e8a"
        );
    }

    #[test]
    fn test_mul2_feedback() {
        // Top word feeds back into words 0, 1, 3 and 4
        let x = [0, 0, 0, 0, 0, 0, 0, 1];
        assert_eq!(mul2(x), [1, 1, 0, 1, 1, 0, 0, 0]);

        // Without feedback it is a plain word shift
        let y = [1, 2, 3, 4, 5, 6, 7, 0];
        assert_eq!(mul2(y), [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_padding_distinguishes_block_boundary() {
        // 32 bytes fill a block; the 0x80 then lands in a fresh block
        let full = Luffa512::digest(&[0u8; 32]);
        let short = Luffa512::digest(&[0u8; 31]);
        assert_ne!(full, short);
    }

    #[test]
    fn test_halves_differ() {
        let out = Luffa512::digest(b"luffa");
        assert_ne!(out[..32], out[32..]);
    }
}
