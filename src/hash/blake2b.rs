//! BLAKE2b (RFC 7693), sequential mode, optional key, 1-64 byte digests.

use zeroize::Zeroize;

use super::{HashAlgorithm, Hasher, Lifecycle};
use crate::error::{Error, Result};

pub(crate) const BLOCK_LEN: usize = 128;
pub(crate) const MAX_OUT_LEN: usize = 64;
const MAX_KEY_LEN: usize = 64;
const ROUNDS: usize = 12;

const IV: [u64; 8] = [
    0x6a09e667f3bcc908, 0xbb67ae8584caa73b, 0x3c6ef372fe94f82b, 0xa54ff53a5f1d36f1,
    0x510e527fade682d1, 0x9b05688c2b3e6c1f, 0x1f83d9abfb41bd6b, 0x5be0cd19137e2179,
];

/// Message word schedule; rounds 10 and 11 reuse rows 0 and 1.
const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

/// Streaming BLAKE2b.
///
/// The last buffered block is only compressed once more input arrives or at `digest`,
/// because the final compression must carry the finalization flag.
#[derive(Clone)]
pub struct Blake2b {
    h: [u64; 8],
    /// bytes compressed so far (128-bit counter t)
    t: u128,
    buf: [u8; BLOCK_LEN],
    buf_len: usize,
    out_len: usize,
    key: Vec<u8>,
    lifecycle: Lifecycle,
}

impl Default for Blake2b {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Blake2b {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blake2b")
            .field("out_len", &self.out_len)
            .field("keyed", &!self.key.is_empty())
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl Drop for Blake2b {
    fn drop(&mut self) {
        self.key.zeroize();
        self.buf.zeroize();
        self.h.zeroize();
    }
}

impl Blake2b {
    /// Unkeyed BLAKE2b-512.
    pub fn new() -> Self {
        Self::init(MAX_OUT_LEN, Vec::new())
    }

    /// BLAKE2b with a `digest_len`-byte output (1-64) and an optional key (0-64 bytes).
    pub fn with_params(digest_len: usize, key: &[u8]) -> Result<Self> {
        if !(1..=MAX_OUT_LEN).contains(&digest_len) {
            return Err(Error::InvalidParameter("BLAKE2b digest length must be 1-64 bytes"));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(Error::InvalidKeyLength {
                len: key.len(),
                expected: "0-64",
            });
        }
        Ok(Self::init(digest_len, key.to_vec()))
    }

    /// One-shot unkeyed BLAKE2b-512.
    pub fn hash(data: &[u8]) -> Vec<u8> {
        let mut h = Self::new();
        h.absorb(data);
        h.finish()
    }

    fn init(out_len: usize, key: Vec<u8>) -> Self {
        let mut h = IV;
        // parameter block word 0: digest length, key length, fanout 1, depth 1
        h[0] ^= 0x0101_0000 ^ ((key.len() as u64) << 8) ^ out_len as u64;

        let mut hasher = Self {
            h,
            t: 0,
            buf: [0u8; BLOCK_LEN],
            buf_len: 0,
            out_len,
            key,
            lifecycle: Lifecycle::Init,
        };

        // a keyed instance starts with the zero-padded key as its first block
        if !hasher.key.is_empty() {
            hasher.buf[..hasher.key.len()].copy_from_slice(&hasher.key);
            hasher.buf_len = BLOCK_LEN;
        }
        hasher
    }

    fn absorb(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            if self.buf_len == BLOCK_LEN {
                // more input follows, so the buffered block is not the last one
                self.t += BLOCK_LEN as u128;
                let block = self.buf;
                compress(&mut self.h, &block, self.t, false);
                self.buf_len = 0;
            }

            let take = (BLOCK_LEN - self.buf_len).min(data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];
        }
    }

    fn finish(&mut self) -> Vec<u8> {
        self.t += self.buf_len as u128;
        self.buf[self.buf_len..].fill(0);
        let block = self.buf;
        compress(&mut self.h, &block, self.t, true);

        let mut out: Vec<u8> = self.h.iter().flat_map(|w| w.to_le_bytes()).collect();
        out.truncate(self.out_len);

        self.h.zeroize();
        self.buf.zeroize();
        self.buf_len = 0;
        self.t = 0;
        out
    }
}

impl Hasher for Blake2b {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Blake2b
    }

    fn block_size(&self) -> usize {
        BLOCK_LEN
    }

    fn output_size(&self) -> usize {
        self.out_len
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
        Ok(self.finish())
    }

    fn reset(&mut self) {
        let key = std::mem::take(&mut self.key);
        *self = Self::init(self.out_len, key);
    }
}

#[inline(always)]
fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

fn compress(h: &mut [u64; 8], block: &[u8; BLOCK_LEN], t: u128, last: bool) {
    let mut m = [0u64; 16];
    for (word, bytes) in m.iter_mut().zip(block.chunks_exact(8)) {
        *word = u64::from_le_bytes(bytes.try_into().unwrap()); // chunks_exact guarantees 8 bytes
    }

    let mut v = [0u64; 16];
    v[..8].copy_from_slice(h);
    v[8..].copy_from_slice(&IV);
    v[12] ^= t as u64;
    v[13] ^= (t >> 64) as u64;
    if last {
        v[14] = !v[14];
    }

    for round in 0..ROUNDS {
        let s = &SIGMA[round % 10];
        g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
    m.zeroize();
    v.zeroize();
}
