use rayon::prelude::*;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::mac::{Hmac, Mac};
use crate::util::xor_in_place;

/// PBKDF2 (RFC 8018) with HMAC over `algorithm`.
///
/// Output blocks are independent, so multi-block outputs are derived on the rayon pool.
pub fn pbkdf2_hmac(
    algorithm: HashAlgorithm,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    dklen: usize,
) -> Result<Vec<u8>> {
    if iterations == 0 {
        return Err(Error::InvalidParameter("PBKDF2 iterations must be positive"));
    }
    if dklen == 0 {
        return Err(Error::InvalidParameter("PBKDF2 key length must be positive"));
    }
    tracing::debug!(%algorithm, iterations, dklen, "deriving key with PBKDF2");

    let h_len = algorithm.output_size();
    let blocks = dklen.div_ceil(h_len);
    if u32::try_from(blocks).is_err() {
        return Err(Error::InvalidParameter("PBKDF2 key length too large"));
    }

    // keyed once; each PRF call clones the primed state
    let prf = Hmac::new(algorithm, password)?;

    let mut derived = vec![0u8; dklen];
    derived
        .par_chunks_mut(h_len)
        .enumerate()
        .try_for_each(|(i, out)| -> Result<()> {
            let t = f_block(&prf, salt, iterations, i as u32 + 1)?;
            out.copy_from_slice(&t[..out.len()]);
            Ok(())
        })?;

    Ok(derived)
}

/// PBKDF2-HMAC-SHA256.
pub fn pbkdf2_hmac_sha256(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    dklen: usize,
) -> Result<Vec<u8>> {
    pbkdf2_hmac(HashAlgorithm::Sha256, password, salt, iterations, dklen)
}

/// F(P, S, c, i) = U1 ^ U2 ^ ... ^ Uc
fn f_block(prf: &Hmac, salt: &[u8], iterations: u32, index: u32) -> Result<Zeroizing<Vec<u8>>> {
    let mut mac = prf.clone();
    mac.update(salt)?;
    mac.update(&index.to_be_bytes())?;
    let mut u = Zeroizing::new(mac.digest()?);
    let mut t = u.clone();

    for _ in 1..iterations {
        let mut mac = prf.clone();
        mac.update(&u)?;
        u = Zeroizing::new(mac.digest()?);
        xor_in_place(&mut t, &u);
    }

    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn rfc6070_style_sha256() -> Result<()> {
        assert_eq!(
            pbkdf2_hmac_sha256(b"password", b"salt", 1, 20)?,
            hex!("120fb6cffcf8b32c43e7225256c4f837a86548c9").to_vec()
        );
        assert_eq!(
            pbkdf2_hmac_sha256(b"password", b"salt", 2, 20)?,
            hex!("ae4d0c95af6b46d32d0adff928f06dd02a303f8e").to_vec()
        );
        assert_eq!(
            pbkdf2_hmac_sha256(b"password", b"salt", 4096, 20)?,
            hex!("c5e478d59288c841aa530db6845c4c8d962893a0").to_vec()
        );
        Ok(())
    }

    #[test]
    fn multi_block_output() -> Result<()> {
        // 40 bytes spans two SHA-256 blocks
        assert_eq!(
            pbkdf2_hmac_sha256(
                b"passwordPASSWORDpassword",
                b"saltSALTsaltSALTsaltSALTsaltSALTsalt",
                4096,
                40
            )?,
            hex!(
                "348c89dbcbd32b2f32d814b8116e84cf2b17347ebc1800181c4e2a1fb8dd53e1"
                "c635518c7dac47e9"
            )
            .to_vec()
        );
        Ok(())
    }

    #[test]
    fn embedded_nul_bytes() -> Result<()> {
        assert_eq!(
            pbkdf2_hmac_sha256(b"pass\0word", b"sa\0lt", 4096, 16)?,
            hex!("89b69d0516f829893c696226650a8687").to_vec()
        );
        Ok(())
    }

    #[test]
    fn prefix_consistent_across_lengths() -> Result<()> {
        let short = pbkdf2_hmac_sha256(b"pw", b"salt", 3, 10)?;
        let long = pbkdf2_hmac_sha256(b"pw", b"salt", 3, 100)?;
        assert_eq!(long.len(), 100);
        assert_eq!(short, long[..10]);
        Ok(())
    }

    #[test]
    fn other_hashes_produce_requested_length() -> Result<()> {
        for alg in [HashAlgorithm::Sha3_256, HashAlgorithm::Blake2b] {
            let a = pbkdf2_hmac(alg, b"pw", b"salt", 2, 70)?;
            assert_eq!(a.len(), 70);
            assert_ne!(a, pbkdf2_hmac_sha256(b"pw", b"salt", 2, 70)?);
        }
        Ok(())
    }

    #[test]
    fn rejects_zero_parameters() {
        assert!(matches!(
            pbkdf2_hmac_sha256(b"pw", b"salt", 0, 32),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            pbkdf2_hmac_sha256(b"pw", b"salt", 1, 0),
            Err(Error::InvalidParameter(_))
        ));
    }
}
