use rand::TryRngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// Fill a fresh buffer of `n` bytes from the OS RNG.
pub fn random_bytes(n: usize) -> Result<Vec<u8>> {
    if n == 0 {
        return Err(Error::InvalidParameter("random byte count must be positive"));
    }
    let mut out = vec![0u8; n];
    OsRng.try_fill_bytes(&mut out)?;
    Ok(out)
}

/// Random 16-byte IV for CBC/CFB/OFB/CTR.
pub fn random_iv() -> Result<[u8; 16]> {
    let mut iv = [0u8; 16];
    OsRng.try_fill_bytes(&mut iv)?;
    tracing::debug!(len = iv.len(), "generated IV");
    Ok(iv)
}

/// Random 12-byte nonce for GCM.
pub fn random_nonce() -> Result<[u8; 12]> {
    let mut nonce = [0u8; 12];
    OsRng.try_fill_bytes(&mut nonce)?;
    tracing::debug!(len = nonce.len(), "generated nonce");
    Ok(nonce)
}

/// Random salt for PBKDF2.
pub fn generate_salt(len: usize) -> Result<Vec<u8>> {
    random_bytes(len)
}

/// Constant-time equality. Slices of different lengths compare unequal.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[inline(always)]
pub(crate) fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

/// Heuristic check for keys with obvious structure. Such keys are still accepted,
/// callers only get a warning.
pub fn is_weak_key(key: &[u8]) -> bool {
    let Some((&first, rest)) = key.split_first() else {
        return false;
    };

    if rest.iter().all(|&b| b == first) {
        return true; // covers all-zero and all-0xff
    }

    let incrementing = key.windows(2).all(|w| w[1] == w[0].wrapping_add(1));
    let decrementing = key.windows(2).all(|w| w[1] == w[0].wrapping_sub(1));
    if incrementing || decrementing {
        return true;
    }

    key.len() % 2 == 0 && key.chunks_exact(2).all(|pair| pair == &key[..2])
}

pub(crate) fn warn_if_weak(key: &[u8]) {
    if is_weak_key(key) {
        tracing::warn!(len = key.len(), "using a potentially weak key");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ct_eq_matches_only_identical_slices() {
        assert!(ct_eq(b"abcdef", b"abcdef"));
        assert!(!ct_eq(b"abcdef", b"abcdeg"));
        assert!(!ct_eq(b"abc", b"abcd"));
        assert!(ct_eq(b"", b""));
    }

    #[test]
    fn weak_keys_detected() {
        assert!(is_weak_key(&[0u8; 16]));
        assert!(is_weak_key(&[0xffu8; 32]));
        assert!(is_weak_key(&(0u8..16).collect::<Vec<_>>()));
        assert!(is_weak_key(&(0u8..16).rev().collect::<Vec<_>>()));
        assert!(is_weak_key(&[0xab, 0xcd].repeat(8)));
        assert!(!is_weak_key(&[
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ]));
        assert!(!is_weak_key(&[]));
    }

    #[test]
    fn random_bytes_rejects_zero() {
        assert!(matches!(random_bytes(0), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn random_iv_and_nonce_differ_between_calls() -> Result<()> {
        assert_ne!(random_iv()?, random_iv()?);
        assert_ne!(random_nonce()?, random_nonce()?);
        assert_eq!(generate_salt(24)?.len(), 24);
        Ok(())
    }
}
