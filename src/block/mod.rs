//! The 128-bit block-cipher primitive every mode, CMAC and GCM is built on.
//!
//! Everything above this module only sees [`BlockCipher`]. [`Aes`] is the bundled
//! implementation (FIPS-197): key schedule plus round function.

mod constants;
mod decryption;
mod encryption;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::key::Key;

use constants::{RCON, SBOX};

/// Size of every block handled by this crate.
pub const BLOCK_SIZE: usize = 16;

/// One 16-byte cipher block.
pub type Block = [u8; BLOCK_SIZE];

/// A keyed 128-bit block permutation.
pub trait BlockCipher: Send + Sync {
    fn encrypt_block(&self, block: &Block) -> Block;
    fn decrypt_block(&self, block: &Block) -> Block;
}

/// AES-128/192/256. Instantiated with a [Key], which is expanded into round keys and stored
/// in the instance. Round keys are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes {
    round_keys: Vec<Block>,
}

impl Aes {
    /// Generates round keys from the provided key.
    pub fn new(key: &Key) -> Self {
        Self {
            round_keys: expand_key(key.as_bytes()),
        }
    }

    /// Number of rounds (10, 12, or 14).
    pub fn rounds(&self) -> usize {
        self.round_keys.len() - 1
    }

    #[cfg(test)]
    pub(crate) fn round_keys(&self) -> &[Block] {
        &self.round_keys
    }
}

impl BlockCipher for Aes {
    #[inline(always)]
    fn encrypt_block(&self, block: &Block) -> Block {
        encryption::encrypt_block(block, &self.round_keys)
    }

    #[inline(always)]
    fn decrypt_block(&self, block: &Block) -> Block {
        decryption::decrypt_block(block, &self.round_keys)
    }
}

impl std::fmt::Debug for Aes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aes").field("rounds", &self.rounds()).finish_non_exhaustive()
    }
}

/// AES key schedule. Returns Nr + 1 round keys (11, 13, or 15), the first being the key itself.
/// Round keys are stored column-major, matching the state layout.
fn expand_key(key: &[u8]) -> Vec<Block> {
    // Nk words in the key, Nr rounds, Nw words in the whole schedule (FIPS-197 5.2)
    let nk = key.len() / 4;
    let nr = nk + 6;
    let nw = (nr + 1) * 4;

    let mut w: Vec<[u8; 4]> = key
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();
    w.reserve(nw - nk);

    for i in nk..nw {
        let prev = w[i - 1];
        let temp = if i % nk == 0 {
            // RotWord, SubWord, Rcon
            [
                SBOX[prev[1] as usize] ^ RCON[i / nk],
                SBOX[prev[2] as usize],
                SBOX[prev[3] as usize],
                SBOX[prev[0] as usize],
            ]
        } else if nk == 8 && i % nk == 4 {
            prev.map(|b| SBOX[b as usize])
        } else {
            prev
        };

        let back = w[i - nk];
        w.push([
            temp[0] ^ back[0],
            temp[1] ^ back[1],
            temp[2] ^ back[2],
            temp[3] ^ back[3],
        ]);
    }

    let round_keys = w
        .chunks_exact(4)
        .map(|words| {
            let mut rk = [0u8; BLOCK_SIZE];
            for (col, word) in words.iter().enumerate() {
                rk[col * 4..col * 4 + 4].copy_from_slice(word);
            }
            rk
        })
        .collect();

    w.zeroize();
    round_keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use hex_literal::hex;

    #[test]
    fn key_schedule_128() -> Result<()> {
        // FIPS-197 Appendix A.1
        let aes = Aes::new(&Key::try_from_slice(&hex!("2b7e151628aed2a6abf7158809cf4f3c"))?);
        assert_eq!(aes.rounds(), 10);
        assert_eq!(
            aes.round_keys().last().copied(),
            Some(hex!("d014f9a8c9ee2589e13f0cc8b6630ca6"))
        );
        Ok(())
    }

    #[test]
    fn key_schedule_192() -> Result<()> {
        // FIPS-197 Appendix A.2
        let aes = Aes::new(&Key::try_from_slice(&hex!(
            "8e73b0f7da0e6452c810f32b809079e562f8ead2522c6b7b"
        ))?);
        assert_eq!(aes.rounds(), 12);
        assert_eq!(
            aes.round_keys().last().copied(),
            Some(hex!("e98ba06f448c773c8ecc720401002202"))
        );
        Ok(())
    }

    #[test]
    fn key_schedule_256() -> Result<()> {
        // FIPS-197 Appendix A.3
        let aes = Aes::new(&Key::try_from_slice(&hex!(
            "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4"
        ))?);
        assert_eq!(aes.rounds(), 14);
        assert_eq!(
            aes.round_keys().last().copied(),
            Some(hex!("fe4890d1e6188d0b046df344706c631e"))
        );
        Ok(())
    }

    #[test]
    fn fips197_appendix_c_blocks() -> Result<()> {
        let pt = hex!("00112233445566778899aabbccddeeff");
        let cases = [
            (&hex!("000102030405060708090a0b0c0d0e0f")[..], hex!("69c4e0d86a7b0430d8cdb78070b4c55a")),
            (
                &hex!("000102030405060708090a0b0c0d0e0f1011121314151617")[..],
                hex!("dda97ca4864cdfe06eaf70a0ec0d7191"),
            ),
            (
                &hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")[..],
                hex!("8ea2b7ca516745bfeafc49904b496089"),
            ),
        ];

        for (key, ct) in cases {
            let aes = Aes::new(&Key::try_from_slice(key)?);
            assert_eq!(aes.encrypt_block(&pt), ct);
            assert_eq!(aes.decrypt_block(&ct), pt);
        }
        Ok(())
    }
}
