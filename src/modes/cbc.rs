use rayon::prelude::*;

use crate::block::{BLOCK_SIZE, Block, BlockCipher};
use crate::error::{Error, Result};
use crate::modes::util::{PARALLEL_THRESHOLD, pad, unpad};
use crate::util::xor_in_place;

/// CBC encryption with PKCS#7 padding. Each plaintext block is XOR'd with the previous
/// ciphertext block (the IV for the first) before encryption. Inherently serial.
pub fn cbc_encrypt<C: BlockCipher>(cipher: &C, iv: &Block, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut data = pad(plaintext);
    let mut prev = *iv;

    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        xor_in_place(&mut prev, chunk);
        prev = cipher.encrypt_block(&prev);
        chunk.copy_from_slice(&prev);
    }

    Ok(data)
}

/// CBC decryption. Every block only depends on two ciphertext blocks, so large inputs
/// are decrypted in parallel.
pub fn cbc_decrypt<C: BlockCipher>(cipher: &C, iv: &Block, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::InvalidCiphertext {
            len: ciphertext.len(),
            context: "CBC ciphertext not a multiple of 16 bytes",
        });
    }

    let mut plaintext = vec![0u8; ciphertext.len()];
    let decrypt = |(i, out): (usize, &mut [u8])| {
        let start = i * BLOCK_SIZE;
        let ct: &Block = ciphertext[start..start + BLOCK_SIZE].try_into().unwrap(); // safe unwrap, exact 16-byte range
        let prev = if i == 0 {
            iv.as_slice()
        } else {
            &ciphertext[start - BLOCK_SIZE..start]
        };
        let mut block = cipher.decrypt_block(ct);
        xor_in_place(&mut block, prev);
        out.copy_from_slice(&block);
    };

    if ciphertext.len() > PARALLEL_THRESHOLD {
        plaintext
            .par_chunks_exact_mut(BLOCK_SIZE)
            .enumerate()
            .for_each(decrypt);
    } else {
        plaintext
            .chunks_exact_mut(BLOCK_SIZE)
            .enumerate()
            .for_each(decrypt);
    }

    unpad(plaintext)
}
