//! CMAC (NIST SP 800-38B, RFC 4493) over a 128-bit block cipher.

use zeroize::Zeroize;

use super::Mac;
use crate::block::{Aes, BLOCK_SIZE, Block, BlockCipher};
use crate::error::{Error, Result};
use crate::gf128::dbl;
use crate::hash::Lifecycle;
use crate::key::Key;
use crate::util::xor_in_place;

/// Streaming CMAC. The most recent full block is held back until more data arrives,
/// since only the final block is combined with a subkey.
#[derive(Clone)]
pub struct Cmac<C: BlockCipher> {
    cipher: C,
    k1: Block,
    k2: Block,
    /// running CBC-MAC chaining value
    x: Block,
    buf: Block,
    buf_len: usize,
    lifecycle: Lifecycle,
}

impl<C: BlockCipher> Cmac<C> {
    pub fn new(cipher: C) -> Self {
        let l = cipher.encrypt_block(&[0u8; BLOCK_SIZE]);
        let k1 = dbl(&l);
        let k2 = dbl(&k1);
        Self {
            cipher,
            k1,
            k2,
            x: [0u8; BLOCK_SIZE],
            buf: [0u8; BLOCK_SIZE],
            buf_len: 0,
            lifecycle: Lifecycle::Init,
        }
    }

    /// The derived subkeys (K1, K2).
    pub fn subkeys(&self) -> (Block, Block) {
        (self.k1, self.k2)
    }

    fn absorb(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            if self.buf_len == BLOCK_SIZE {
                xor_in_place(&mut self.x, &self.buf);
                self.x = self.cipher.encrypt_block(&self.x);
                self.buf_len = 0;
            }
            let take = (BLOCK_SIZE - self.buf_len).min(data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];
        }
    }

    fn finish(&mut self) -> Block {
        let mut last = [0u8; BLOCK_SIZE];
        if self.buf_len == BLOCK_SIZE {
            last = self.buf;
            xor_in_place(&mut last, &self.k1);
        } else {
            // 10* padding for an empty or partial final block
            last[..self.buf_len].copy_from_slice(&self.buf[..self.buf_len]);
            last[self.buf_len] = 0x80;
            xor_in_place(&mut last, &self.k2);
        }
        xor_in_place(&mut self.x, &last);
        let tag = self.cipher.encrypt_block(&self.x);

        last.zeroize();
        self.x.zeroize();
        self.buf.zeroize();
        self.buf_len = 0;
        tag
    }
}

impl<C: BlockCipher> Mac for Cmac<C> {
    fn tag_size(&self) -> usize {
        BLOCK_SIZE
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
        self.x.zeroize();
        self.buf.zeroize();
        self.buf_len = 0;
        self.lifecycle = Lifecycle::Init;
    }
}

impl<C: BlockCipher> Drop for Cmac<C> {
    fn drop(&mut self) {
        self.k1.zeroize();
        self.k2.zeroize();
        self.x.zeroize();
        self.buf.zeroize();
    }
}

impl<C: BlockCipher> std::fmt::Debug for Cmac<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cmac")
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

/// One-shot AES-128-CMAC. The key must be exactly 16 bytes.
pub fn aes_cmac(key: &[u8], message: &[u8]) -> Result<Block> {
    if key.len() != 16 {
        return Err(Error::InvalidKeyLength {
            len: key.len(),
            expected: "16",
        });
    }
    let mut cmac = Cmac::new(Aes::new(&Key::try_from_slice(key)?));
    cmac.absorb(message);
    Ok(cmac.finish())
}
