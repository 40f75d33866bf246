use rayon::prelude::*;

use crate::block::{BLOCK_SIZE, Block, BlockCipher};
use crate::error::Result;
use crate::modes::util::PARALLEL_THRESHOLD;
use crate::util::xor_in_place;

/// **Counter mode** encryption and decryption (CTR is symmetric).
///
/// The IV is the initial counter block, read as a big-endian 128-bit integer and
/// incremented by one per block, wrapping modulo 2^128.
///
/// **Important**: the same (key, IV) pair must never be reused.
pub fn ctr_apply<C: BlockCipher>(cipher: &C, iv: &Block, input: &[u8]) -> Result<Vec<u8>> {
    let start = u128::from_be_bytes(*iv);
    Ok(keystream_xor(cipher, input, |i| {
        start.wrapping_add(i as u128).to_be_bytes()
    }))
}

/// XOR `input` with `E(counter_block(i))` for each block index `i`. Inputs above
/// [`PARALLEL_THRESHOLD`] are processed on the rayon pool; output is identical either way.
pub(crate) fn keystream_xor<C, F>(cipher: &C, input: &[u8], counter_block: F) -> Vec<u8>
where
    C: BlockCipher,
    F: Fn(usize) -> Block + Sync,
{
    let mut output = input.to_vec();
    let apply = |(i, chunk): (usize, &mut [u8])| {
        let keystream = cipher.encrypt_block(&counter_block(i));
        xor_in_place(chunk, &keystream);
    };

    if input.len() > PARALLEL_THRESHOLD {
        output.par_chunks_mut(BLOCK_SIZE).enumerate().for_each(apply);
    } else {
        output.chunks_mut(BLOCK_SIZE).enumerate().for_each(apply);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::util::test_util::{CTR_IV, KEY_128, KEY_192, KEY_256, PLAINTEXT, aes};
    use hex_literal::hex;

    // SP 800-38A F.5
    const CTR_128: [u8; 64] = hex!(
        "874d6191b620e3261bef6864990db6ce"
        "9806f66b7970fdff8617187bb9fffdff"
        "5ae4df3edbd5d35e5b4f09020db03eab"
        "1e031dda2fbe03d1792170a0f3009cee"
    );
    const CTR_192: [u8; 64] = hex!(
        "1abc932417521ca24f2b0459fe7e6e0b"
        "090339ec0aa6faefd5ccc2c6f4ce8e94"
        "1e36b26bd1ebc670d1bd1d665620abf7"
        "4f78a7f6d29809585a97daec58c6b050"
    );
    const CTR_256: [u8; 64] = hex!(
        "601ec313775789a5b7a7f504bbf3d228"
        "f443e3ca4d62b59aca84e990cacaf5c5"
        "2b0930daa23de94ce87017ba2d84988d"
        "dfc9c58db67aada613c2dd08457941a6"
    );

    #[test]
    fn aes_ctr_128() -> Result<()> {
        let cipher = aes(&KEY_128)?;
        assert_eq!(ctr_apply(&cipher, &CTR_IV, &PLAINTEXT)?, CTR_128.to_vec());
        assert_eq!(ctr_apply(&cipher, &CTR_IV, &CTR_128)?, PLAINTEXT.to_vec());
        Ok(())
    }

    #[test]
    fn aes_ctr_192() -> Result<()> {
        let cipher = aes(&KEY_192)?;
        assert_eq!(ctr_apply(&cipher, &CTR_IV, &PLAINTEXT)?, CTR_192.to_vec());
        assert_eq!(ctr_apply(&cipher, &CTR_IV, &CTR_192)?, PLAINTEXT.to_vec());
        Ok(())
    }

    #[test]
    fn aes_ctr_256() -> Result<()> {
        let cipher = aes(&KEY_256)?;
        assert_eq!(ctr_apply(&cipher, &CTR_IV, &PLAINTEXT)?, CTR_256.to_vec());
        assert_eq!(ctr_apply(&cipher, &CTR_IV, &CTR_256)?, PLAINTEXT.to_vec());
        Ok(())
    }

    #[test]
    fn counter_wraps_at_128_bits() -> Result<()> {
        let cipher = aes(&KEY_128)?;
        let ct = ctr_apply(&cipher, &[0xff; 16], &[0u8; 32])?;
        // second keystream block is E(0)
        assert_eq!(ct[16..], cipher.encrypt_block(&[0u8; 16]));
        assert_eq!(ct[..16], cipher.encrypt_block(&[0xff; 16]));
        Ok(())
    }

    #[test]
    fn parallel_path_matches_serial() -> Result<()> {
        let cipher = aes(&KEY_128)?;
        let big: Vec<u8> = (0..PARALLEL_THRESHOLD * 2 + 5).map(|i| (i * 31) as u8).collect();
        let encrypted = ctr_apply(&cipher, &CTR_IV, &big)?;

        // the first 64 bytes alone stay below the threshold
        let head = ctr_apply(&cipher, &CTR_IV, &big[..64])?;
        assert_eq!(encrypted[..64], head[..]);

        // resume serially from block 300
        let iv = (u128::from_be_bytes(CTR_IV) + 300).to_be_bytes();
        let tail = ctr_apply(&cipher, &iv, &big[300 * 16..])?;
        assert_eq!(encrypted[300 * 16..], tail[..]);

        assert_eq!(ctr_apply(&cipher, &CTR_IV, &encrypted)?, big);
        Ok(())
    }
}
