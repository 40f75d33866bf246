//! Cipher feedback, full-block (CFB-128) and byte-wise (CFB-8) segments. No padding.

use crate::block::{BLOCK_SIZE, Block, BlockCipher};
use crate::error::Result;
use crate::util::xor_in_place;

/// CFB-128 encryption. The last segment may be partial.
pub fn cfb_encrypt<C: BlockCipher>(cipher: &C, iv: &Block, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut out = plaintext.to_vec();
    let mut feedback = *iv;

    for chunk in out.chunks_mut(BLOCK_SIZE) {
        let keystream = cipher.encrypt_block(&feedback);
        xor_in_place(chunk, &keystream);
        // only a full block can be fed back, and a partial one is always last
        feedback[..chunk.len()].copy_from_slice(chunk);
    }

    Ok(out)
}

/// CFB-128 decryption.
pub fn cfb_decrypt<C: BlockCipher>(cipher: &C, iv: &Block, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut out = ciphertext.to_vec();
    let mut feedback = *iv;

    for (chunk, ct) in out.chunks_mut(BLOCK_SIZE).zip(ciphertext.chunks(BLOCK_SIZE)) {
        let keystream = cipher.encrypt_block(&feedback);
        xor_in_place(chunk, &keystream);
        feedback[..ct.len()].copy_from_slice(ct);
    }

    Ok(out)
}

/// CFB-8 encryption. One block encryption per byte; the shift register takes in each
/// ciphertext byte.
pub fn cfb8_encrypt<C: BlockCipher>(cipher: &C, iv: &Block, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut register = *iv;
    let out = plaintext
        .iter()
        .map(|&p| {
            let c = p ^ cipher.encrypt_block(&register)[0];
            shift_in(&mut register, c);
            c
        })
        .collect();
    Ok(out)
}

/// CFB-8 decryption.
pub fn cfb8_decrypt<C: BlockCipher>(cipher: &C, iv: &Block, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut register = *iv;
    let out = ciphertext
        .iter()
        .map(|&c| {
            let p = c ^ cipher.encrypt_block(&register)[0];
            shift_in(&mut register, c);
            p
        })
        .collect();
    Ok(out)
}

#[inline(always)]
fn shift_in(register: &mut Block, byte: u8) {
    register.copy_within(1.., 0);
    register[BLOCK_SIZE - 1] = byte;
}
