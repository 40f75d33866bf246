use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::mac::hmac_sha256;

/// Expand `master_key` into `length` bytes bound to `context`.
///
/// Output is `T(1) || T(2) || ...` truncated to `length`, where
/// `T(i) = HMAC-SHA256(master_key, context || BE32(i))`.
pub fn derive_key(master_key: &[u8], context: &[u8], length: usize) -> Result<Vec<u8>> {
    if length == 0 {
        return Err(Error::InvalidParameter("derived key length must be positive"));
    }

    let mut input = Zeroizing::new(Vec::with_capacity(context.len() + 4));
    let mut derived = Vec::with_capacity(length.next_multiple_of(32));
    let mut counter: u32 = 1;

    while derived.len() < length {
        input.clear();
        input.extend_from_slice(context);
        input.extend_from_slice(&counter.to_be_bytes());
        derived.extend_from_slice(&hmac_sha256(master_key, &input));
        counter = counter
            .checked_add(1)
            .ok_or(Error::InvalidParameter("derived key length too large"))?;
    }

    derived.truncate(length);
    Ok(derived)
}
