//! SHA3-256 (FIPS 202): Keccak-f[1600] sponge with a 1088-bit rate.

use zeroize::Zeroize;

use super::{HashAlgorithm, Hasher, Lifecycle};
use crate::error::Result;

pub(crate) const RATE: usize = 136;
pub(crate) const OUT_LEN: usize = 32;

const ROUNDS: usize = 24;

/// SHA3 domain separation bits plus the first bit of pad10*1.
const DOMAIN_PAD: u8 = 0x06;

const RC: [u64; ROUNDS] = [
    0x0000000000000001, 0x0000000000008082, 0x800000000000808a, 0x8000000080008000,
    0x000000000000808b, 0x0000000080000001, 0x8000000080008081, 0x8000000000008009,
    0x000000000000008a, 0x0000000000000088, 0x0000000080008009, 0x000000008000000a,
    0x000000008000808b, 0x800000000000008b, 0x8000000000008089, 0x8000000000008003,
    0x8000000000008002, 0x8000000000000080, 0x000000000000800a, 0x800000008000000a,
    0x8000000080008081, 0x8000000000008080, 0x0000000080000001, 0x8000000080008008,
];

/// Rotation offsets r[x][y].
const RHO: [[u32; 5]; 5] = [
    [0, 36, 3, 41, 18],
    [1, 44, 10, 45, 2],
    [62, 6, 43, 15, 61],
    [28, 55, 25, 21, 56],
    [27, 20, 39, 8, 14],
];

/// Streaming SHA3-256. Lane (x, y) of the 5x5 state lives at `state[x + 5 * y]`.
#[derive(Clone, Debug)]
pub struct Sha3_256 {
    state: [u64; 25],
    buf: [u8; RATE],
    buf_len: usize,
    lifecycle: Lifecycle,
}

impl Default for Sha3_256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha3_256 {
    pub fn new() -> Self {
        Self {
            state: [0u64; 25],
            buf: [0u8; RATE],
            buf_len: 0,
            lifecycle: Lifecycle::Init,
        }
    }

    /// One-shot SHA3-256.
    pub fn hash(data: &[u8]) -> [u8; OUT_LEN] {
        let mut h = Self::new();
        h.absorb(data);
        h.finish()
    }

    fn absorb(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (RATE - self.buf_len).min(data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];

            if self.buf_len == RATE {
                let block = self.buf;
                self.absorb_block(&block);
                self.buf_len = 0;
            }
        }
    }

    fn absorb_block(&mut self, block: &[u8; RATE]) {
        for (lane, bytes) in self.state.iter_mut().zip(block.chunks_exact(8)) {
            *lane ^= u64::from_le_bytes(bytes.try_into().unwrap()); // chunks_exact guarantees 8 bytes
        }
        keccak_f(&mut self.state);
    }

    fn finish(&mut self) -> [u8; OUT_LEN] {
        // pad10*1 with SHA3 domain bits; both ends may land on the same byte
        let mut block = [0u8; RATE];
        block[..self.buf_len].copy_from_slice(&self.buf[..self.buf_len]);
        block[self.buf_len] ^= DOMAIN_PAD;
        block[RATE - 1] ^= 0x80;
        self.absorb_block(&block);
        block.zeroize();

        // OUT_LEN < RATE, so one squeeze suffices
        let mut out = [0u8; OUT_LEN];
        for (chunk, lane) in out.chunks_exact_mut(8).zip(self.state) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }

        self.wipe();
        out
    }

    fn wipe(&mut self) {
        self.state.zeroize();
        self.buf.zeroize();
        self.buf_len = 0;
    }
}

impl Hasher for Sha3_256 {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha3_256
    }

    fn block_size(&self) -> usize {
        RATE
    }

    fn output_size(&self) -> usize {
        OUT_LEN
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.lifecycle.on_update()?;
        self.absorb(data);
        Ok(())
    }

    fn digest(&mut self) -> Result<Vec<u8>> {
        self.lifecycle.on_digest()?;
        Ok(self.finish().to_vec())
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Keccak-f[1600]: 24 rounds of θ, ρ+π, χ, ι.
fn keccak_f(a: &mut [u64; 25]) {
    for rc in RC {
        // θ
        let mut c = [0u64; 5];
        for x in 0..5 {
            c[x] = a[x] ^ a[x + 5] ^ a[x + 10] ^ a[x + 15] ^ a[x + 20];
        }
        for x in 0..5 {
            let d = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
            for y in 0..5 {
                a[x + 5 * y] ^= d;
            }
        }

        // ρ and π: B[y, 2x + 3y] = rot(A[x, y], r[x][y])
        let mut b = [0u64; 25];
        for x in 0..5 {
            for y in 0..5 {
                b[y + 5 * ((2 * x + 3 * y) % 5)] = a[x + 5 * y].rotate_left(RHO[x][y]);
            }
        }

        // χ
        for y in 0..5 {
            for x in 0..5 {
                a[x + 5 * y] = b[x + 5 * y] ^ (!b[(x + 1) % 5 + 5 * y] & b[(x + 2) % 5 + 5 * y]);
            }
        }

        // ι
        a[0] ^= rc;
    }
}
