use subtle::{ConstantTimeEq, ConstantTimeGreater, ConstantTimeLess};
use zeroize::Zeroize;

use crate::block::BLOCK_SIZE;
use crate::error::{Error, Result};

pub const PARALLEL_THRESHOLD: usize = 4 * 1024; // process blocks in parallel if input size gt 4 KiB

/// PKCS#7 pad to a whole number of blocks. Always adds 1..=16 bytes.
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.resize(data.len() + pad_len, pad_len as u8);
    out
}

/// Strip PKCS#7 padding. The whole final block is checked with constant-time masks, so
/// timing does not depend on where the padding is malformed. On failure the buffer is wiped.
pub fn unpad(mut data: Vec<u8>) -> Result<Vec<u8>> {
    let n = data.len();
    if n == 0 || n % BLOCK_SIZE != 0 {
        data.zeroize();
        return Err(Error::InvalidPadding);
    }

    let last = &data[n - BLOCK_SIZE..];
    let pad_len = last[BLOCK_SIZE - 1];

    let mut valid = !pad_len.ct_eq(&0) & !pad_len.ct_gt(&(BLOCK_SIZE as u8));
    for (i, &b) in last.iter().rev().enumerate() {
        let in_pad = (i as u8).ct_lt(&pad_len);
        valid &= !in_pad | b.ct_eq(&pad_len);
    }

    if bool::from(valid) {
        data.truncate(n - pad_len as usize);
        Ok(data)
    } else {
        data.zeroize();
        Err(Error::InvalidPadding)
    }
}
