use crate::block::{BLOCK_SIZE, Block, BlockCipher};
use crate::error::Result;
use crate::util::xor_in_place;

/// **Output feedback**. The keystream is the IV encrypted repeatedly and never depends on
/// the data, so encryption and decryption are the same operation.
///
/// **Important**: reusing an IV under the same key produces the same keystream, and the
/// XOR of the two ciphertexts equals the XOR of the two plaintexts.
pub fn ofb_apply<C: BlockCipher>(cipher: &C, iv: &Block, input: &[u8]) -> Result<Vec<u8>> {
    let mut out = input.to_vec();
    let mut keystream = *iv;

    for chunk in out.chunks_mut(BLOCK_SIZE) {
        keystream = cipher.encrypt_block(&keystream);
        xor_in_place(chunk, &keystream);
    }

    Ok(out)
}
