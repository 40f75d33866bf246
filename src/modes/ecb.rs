use rayon::prelude::*;

use crate::block::{BLOCK_SIZE, Block, BlockCipher};
use crate::error::{Error, Result};
use crate::modes::util::{PARALLEL_THRESHOLD, pad, unpad};

/// ECB encryption. PKCS#7 pads, then encrypts each 16-byte block independently.
pub fn ecb_encrypt<C: BlockCipher>(cipher: &C, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut data = pad(plaintext);
    map_blocks(&mut data, |block| cipher.encrypt_block(block));
    Ok(data)
}

/// ECB decryption. Assumes the plaintext was PKCS#7 padded.
pub fn ecb_decrypt<C: BlockCipher>(cipher: &C, ciphertext: &[u8]) -> Result<Vec<u8>> {
    // ECB ciphertext should (and must) always be a non-empty multiple of 16 bytes.
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::InvalidCiphertext {
            len: ciphertext.len(),
            context: "ECB ciphertext not a multiple of 16 bytes",
        });
    }

    let mut data = ciphertext.to_vec();
    map_blocks(&mut data, |block| cipher.decrypt_block(block));
    unpad(data)
}

/// Replace every block in `data` (a whole number of blocks) with `f(block)`.
fn map_blocks<F>(data: &mut [u8], f: F)
where
    F: Fn(&Block) -> Block + Sync,
{
    let apply = |chunk: &mut [u8]| {
        let block: &Block = (&*chunk).try_into().unwrap(); // safe unwrap, chunks_exact guarantees 16
        let out = f(block);
        chunk.copy_from_slice(&out);
    };

    if data.len() > PARALLEL_THRESHOLD {
        data.par_chunks_exact_mut(BLOCK_SIZE).for_each(apply);
    } else {
        data.chunks_exact_mut(BLOCK_SIZE).for_each(apply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::util::test_util::{KEY_128, KEY_192, KEY_256, PLAINTEXT, aes};
    use hex_literal::hex;

    // SP 800-38A F.1 ciphertext, followed by the encrypted full padding block
    const ECB_128: [u8; 80] = hex!(
        "3ad77bb40d7a3660a89ecaf32466ef97"
        "f5d3d58503b9699de785895a96fdbaaf"
        "43b1cd7f598ece23881b00e3ed030688"
        "7b0c785e27e8ad3f8223207104725dd4"
        "a254be88e037ddd9d79fb6411c3f9df8"
    );
    const ECB_192: [u8; 80] = hex!(
        "bd334f1d6e45f25ff712a214571fa5cc"
        "974104846d0ad3ad7734ecb3ecee4eef"
        "ef7afd2270e2e60adce0ba2face6444e"
        "9a4b41ba738d6c72fb16691603c18e0e"
        "daa0af074bd8083c8a32d4fc563c55cc"
    );
    const ECB_256: [u8; 64] = hex!(
        "f3eed1bdb5d2a03c064b5a7e3db181f8"
        "591ccb10d410ed26dc5ba74a31362870"
        "b6ed21b99ca6f4f9f153e7b1beafed1d"
        "23304b7a39f9f3ff067d8d8f9e24ecc7"
    );

    #[test]
    fn aes_ecb_128() -> Result<()> {
        let cipher = aes(&KEY_128)?;
        assert_eq!(ecb_encrypt(&cipher, &PLAINTEXT)?, ECB_128.to_vec());
        assert_eq!(ecb_decrypt(&cipher, &ECB_128)?, PLAINTEXT.to_vec());
        Ok(())
    }

    #[test]
    fn aes_ecb_192() -> Result<()> {
        let cipher = aes(&KEY_192)?;
        assert_eq!(ecb_encrypt(&cipher, &PLAINTEXT)?, ECB_192.to_vec());
        assert_eq!(ecb_decrypt(&cipher, &ECB_192)?, PLAINTEXT.to_vec());
        Ok(())
    }

    #[test]
    fn aes_ecb_256() -> Result<()> {
        let cipher = aes(&KEY_256)?;
        let encrypted = ecb_encrypt(&cipher, &PLAINTEXT)?;
        assert_eq!(encrypted[..64], ECB_256);
        assert_eq!(encrypted.len(), 80);
        assert_eq!(ecb_decrypt(&cipher, &encrypted)?, PLAINTEXT.to_vec());
        Ok(())
    }

    #[test]
    fn parallel_path_matches_serial() -> Result<()> {
        let cipher = aes(&KEY_128)?;
        let big: Vec<u8> = PLAINTEXT.iter().copied().cycle().take(PARALLEL_THRESHOLD * 2).collect();
        let encrypted = ecb_encrypt(&cipher, &big)?;
        // identical plaintext blocks give identical ciphertext blocks
        for (i, chunk) in encrypted[..big.len()].chunks_exact(64).enumerate() {
            assert_eq!(chunk, &ECB_128[..64], "chunk {i}");
        }
        assert_eq!(ecb_decrypt(&cipher, &encrypted)?, big);
        Ok(())
    }

    #[test]
    fn rejects_partial_blocks() -> Result<()> {
        let cipher = aes(&KEY_128)?;
        assert!(matches!(
            ecb_decrypt(&cipher, &ECB_128[..79]),
            Err(Error::InvalidCiphertext { len: 79, .. })
        ));
        assert!(matches!(
            ecb_decrypt(&cipher, &[]),
            Err(Error::InvalidCiphertext { len: 0, .. })
        ));
        Ok(())
    }
}
