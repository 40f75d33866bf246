use crate::block::{Aes, BLOCK_SIZE, Block, BlockCipher};
use crate::error::{Error, Result};
use crate::gf128::gf_mul;
use crate::key::Key;
use crate::modes::keystream_xor;
use crate::util::{ct_eq, random_nonce, xor_in_place};

/*
https://nvlpubs.nist.gov/nistpubs/Legacy/SP/nistspecialpublication800-38d.pdf

H = block of 0s encrypted with key
start with accumulator s = 0
for each 16-byte block b:
    s = (s ^ b) * H (GF128 multiplication)

where blocks are:
    - all AAD blocks (zero padded)
    - all ciphertext blocks (zero padded)
    - one block comprised bitlen(aad) || bitlen(ct)

tag = s ^ E(K, J0)

where J0 is:
    - nonce || 1u32 for a 96-bit nonce
    - GHASH(nonce padded || 0^64 || bitlen(nonce)) otherwise
and plaintext is CTR-encrypted from inc32(J0).
*/

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

// inc32 leaves 2^32 - 1 counter values after J0; J0 itself and the wrap are excluded
const MAX_BLOCKS: u64 = (1 << 32) - 2;

/// **Galois/counter mode** over a 128-bit block cipher.
///
/// `H` is computed once at construction. The container produced by [Gcm::encrypt] is
/// `Nonce (12 bytes) || Ciphertext || Tag (16 bytes)`.
#[derive(Clone)]
pub struct Gcm<C = Aes> {
    cipher: C,
    h: Block,
}

impl Gcm<Aes> {
    pub fn new(key: &Key) -> Self {
        Self::with_cipher(Aes::new(key))
    }
}

impl<C: BlockCipher> Gcm<C> {
    pub fn with_cipher(cipher: C) -> Self {
        let h = cipher.encrypt_block(&[0u8; BLOCK_SIZE]);
        Self { cipher, h }
    }

    /// Encrypt and authenticate. Returns `Ciphertext || Tag`.
    ///
    /// Any non-empty nonce length is accepted; 12 bytes is the fast path and the only length
    /// [Gcm::encrypt] uses.
    ///
    /// **Important**: the same nonce must never be reused with the same key.
    pub fn seal(&self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        check_len(plaintext.len())?;
        let j0 = self.j0(nonce)?;

        let mut out = self.gctr(&j0, plaintext);
        let tag = self.tag(&j0, aad, &out);
        out.extend_from_slice(&tag);
        Ok(out)
    }

    /// Verify and decrypt `Ciphertext || Tag`.
    ///
    /// The tag is checked in constant time before any decryption happens; on mismatch no
    /// plaintext is produced and [AuthFailed](crate::Error::AuthFailed) is returned.
    pub fn open(&self, nonce: &[u8], data: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if data.len() < TAG_LEN {
            return Err(Error::InputTooShort {
                len: data.len(),
                min: TAG_LEN,
            });
        }
        let (ct, received_tag) = data.split_at(data.len() - TAG_LEN);
        check_len(ct.len())?;
        let j0 = self.j0(nonce)?;

        let computed_tag = self.tag(&j0, aad, ct);
        if !ct_eq(&computed_tag, received_tag) {
            tracing::warn!(ct_len = ct.len(), aad_len = aad.len(), "GCM authentication failed");
            return Err(Error::AuthFailed);
        }

        Ok(self.gctr(&j0, ct))
    }

    /// Encrypt under a fresh random 96-bit nonce.
    ///
    /// Output is formatted as `Nonce (12 bytes) || Ciphertext || Tag (16 bytes)`.
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let nonce = random_nonce()?;
        self.encrypt_with_nonce(&nonce, plaintext, aad)
    }

    /// As [Gcm::encrypt] with a caller-chosen 12-byte nonce.
    pub fn encrypt_with_nonce(&self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if nonce.len() != NONCE_LEN {
            return Err(Error::InvalidNonceLength {
                len: nonce.len(),
                expected: "12",
            });
        }
        let sealed = self.seal(nonce, plaintext, aad)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Decrypt a container produced by [Gcm::encrypt].
    ///
    /// Returns:
    /// - plaintext if the tag was authenticated.
    /// - [AuthFailed](crate::Error::AuthFailed) if the computed tag did not match the input tag.
    /// - [InputTooShort](crate::Error::InputTooShort) if fewer than 28 bytes were provided.
    pub fn decrypt(&self, data: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(Error::InputTooShort {
                len: data.len(),
                min: NONCE_LEN + TAG_LEN,
            });
        }
        let (nonce, sealed) = data.split_at(NONCE_LEN);
        self.open(nonce, sealed, aad)
    }

    fn j0(&self, nonce: &[u8]) -> Result<Block> {
        if nonce.is_empty() {
            return Err(Error::InvalidNonceLength {
                len: 0,
                expected: "at least 1",
            });
        }

        if nonce.len() == NONCE_LEN {
            let mut j0 = [0u8; BLOCK_SIZE];
            j0[..NONCE_LEN].copy_from_slice(nonce);
            j0[BLOCK_SIZE - 1] = 1;
            return Ok(j0);
        }

        let mut s = [0u8; BLOCK_SIZE];
        self.ghash_blocks(&mut s, nonce);
        let mut len = [0u8; BLOCK_SIZE];
        len[8..].copy_from_slice(&(nonce.len() as u64 * 8).to_be_bytes());
        xor_in_place(&mut s, &len);
        Ok(gf_mul(&s, &self.h))
    }

    /// Fold `data` into the accumulator, zero padding the last partial block.
    fn ghash_blocks(&self, s: &mut Block, data: &[u8]) {
        for chunk in data.chunks(BLOCK_SIZE) {
            xor_in_place(s, chunk);
            *s = gf_mul(s, &self.h);
        }
    }

    fn tag(&self, j0: &Block, aad: &[u8], ct: &[u8]) -> Block {
        let mut s = [0u8; BLOCK_SIZE];
        self.ghash_blocks(&mut s, aad);
        self.ghash_blocks(&mut s, ct);

        // authenticate message length, build bitlen(aad) || bitlen(ct)
        let mut len = [0u8; BLOCK_SIZE];
        len[..8].copy_from_slice(&(aad.len() as u64 * 8).to_be_bytes());
        len[8..].copy_from_slice(&(ct.len() as u64 * 8).to_be_bytes());
        xor_in_place(&mut s, &len);
        s = gf_mul(&s, &self.h);

        xor_in_place(&mut s, &self.cipher.encrypt_block(j0));
        s
    }

    /// CTR from inc32(J0): the low 32 bits count, the high 96 stay fixed.
    fn gctr(&self, j0: &Block, data: &[u8]) -> Vec<u8> {
        let prefix: [u8; 12] = j0[..12].try_into().unwrap(); // safe unwrap, fixed 12-byte range
        let start = u32::from_be_bytes([j0[12], j0[13], j0[14], j0[15]]);
        keystream_xor(&self.cipher, data, |i| {
            let mut block = [0u8; BLOCK_SIZE];
            block[..12].copy_from_slice(&prefix);
            block[12..].copy_from_slice(&start.wrapping_add(i as u32 + 1).to_be_bytes());
            block
        })
    }
}

impl<C> std::fmt::Debug for Gcm<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gcm").finish_non_exhaustive()
    }
}

fn check_len(len: usize) -> Result<()> {
    if (len as u64).div_ceil(BLOCK_SIZE as u64) > MAX_BLOCKS {
        return Err(Error::CounterOverflow);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // test cases from the GCM submission (McGrew & Viega), AES-128

    #[test]
    fn tag_no_pt_no_aad() -> Result<()> {
        let gcm = Gcm::new(&Key::try_from_slice(&[0u8; 16])?);
        let sealed = gcm.seal(&[0u8; 12], &[], &[])?;
        assert_eq!(sealed, hex!("58e2fccefa7e3061367f1d57a4e7455a").to_vec());
        assert_eq!(gcm.open(&[0u8; 12], &sealed, &[])?, Vec::<u8>::new());
        Ok(())
    }

    #[test]
    fn one_zero_block() -> Result<()> {
        let gcm = Gcm::new(&Key::try_from_slice(&[0u8; 16])?);
        let sealed = gcm.seal(&[0u8; 12], &[0u8; 16], &[])?;
        assert_eq!(
            sealed,
            hex!("0388dace60b6a392f328c2b971b2fe78" "ab6e47d42cec13bdf53a67b21257bddf").to_vec()
        );
        Ok(())
    }

    #[test]
    fn with_aad_and_partial_block() -> Result<()> {
        let key = Key::try_from_slice(&hex!("feffe9928665731c6d6a8f9467308308"))?;
        let nonce = hex!("cafebabefacedbaddecaf888");
        let pt = hex!(
            "d9313225f88406e5a55909c5aff5269a"
            "86a7a9531534f7da2e4c303d8a318a72"
            "1c3c0c95956809532fcf0e2449a6b525"
            "b16aedf5aa0de657ba637b39"
        );
        let aad = hex!("feedfacedeadbeeffeedfacedeadbeefabaddad2");
        let expected = hex!(
            "42831ec2217774244b7221b784d0d49c"
            "e3aa212f2c02a4e035c17e2329aca12e"
            "21d514b25466931c7d8f6a5aac84aa05"
            "1ba30b396a0aac973d58e091"
            "5bc94fbc3221a5db94fae95ae7121a47"
        );

        let gcm = Gcm::new(&key);
        assert_eq!(gcm.seal(&nonce, &pt, &aad)?, expected.to_vec());
        assert_eq!(gcm.open(&nonce, &expected, &aad)?, pt.to_vec());
        Ok(())
    }

    #[test]
    fn short_nonce_uses_ghash_j0() -> Result<()> {
        let key = Key::try_from_slice(&hex!("feffe9928665731c6d6a8f9467308308"))?;
        let nonce = hex!("cafebabefacedbad");
        let pt = hex!(
            "d9313225f88406e5a55909c5aff5269a"
            "86a7a9531534f7da2e4c303d8a318a72"
            "1c3c0c95956809532fcf0e2449a6b525"
            "b16aedf5aa0de657ba637b39"
        );
        let aad = hex!("feedfacedeadbeeffeedfacedeadbeefabaddad2");
        let expected = hex!(
            "61353b4c2806934a777ff51fa22a4755"
            "699b2a714fcdc6f83766e5f97b6c7423"
            "73806900e49f24b22b097544d4896b42"
            "4989b5e1ebac0f07c23f4598"
            "3612d2e79e3b0785561be14aaca2fccb"
        );

        let gcm = Gcm::new(&key);
        assert_eq!(gcm.seal(&nonce, &pt, &aad)?, expected.to_vec());
        assert_eq!(gcm.open(&nonce, &expected, &aad)?, pt.to_vec());
        Ok(())
    }

    #[test]
    fn container_round_trip() -> Result<()> {
        let gcm = Gcm::new(&Key::rand_key_256()?);
        let container = gcm.encrypt(b"attack at dawn", b"header")?;
        assert_eq!(container.len(), NONCE_LEN + 14 + TAG_LEN);
        assert_eq!(gcm.decrypt(&container, b"header")?, b"attack at dawn".to_vec());
        Ok(())
    }

    #[test]
    fn every_bit_flip_is_rejected() -> Result<()> {
        let gcm = Gcm::new(&Key::rand_key_128()?);
        let container = gcm.encrypt(b"sixteen byte msg plus a tail", b"aad")?;
        for i in 0..container.len() {
            let mut tampered = container.clone();
            tampered[i] ^= 0x01;
            assert!(matches!(
                gcm.decrypt(&tampered, b"aad"),
                Err(Error::AuthFailed)
            ));
        }
        assert!(matches!(gcm.decrypt(&container, b"aae"), Err(Error::AuthFailed)));
        assert!(matches!(gcm.decrypt(&container, b""), Err(Error::AuthFailed)));
        Ok(())
    }

    #[test]
    fn nonce_reuse_leaks_plaintext_xor() -> Result<()> {
        // misuse: identical (key, nonce) gives identical keystream
        let gcm = Gcm::new(&Key::rand_key_128()?);
        let nonce = [7u8; 12];
        let p1 = b"transfer $100 to alice";
        let p2 = b"transfer $999 to mallo";
        let c1 = gcm.encrypt_with_nonce(&nonce, p1, b"")?;
        let c2 = gcm.encrypt_with_nonce(&nonce, p2, b"")?;
        for i in 0..p1.len() {
            assert_eq!(c1[NONCE_LEN + i] ^ c2[NONCE_LEN + i], p1[i] ^ p2[i]);
        }
        // same plaintext under a reused nonce collides completely, tag included
        assert_eq!(
            gcm.encrypt_with_nonce(&nonce, p1, b"")?,
            gcm.encrypt_with_nonce(&nonce, p1, b"")?
        );
        Ok(())
    }

    #[test]
    fn rejects_short_input_and_bad_nonce() -> Result<()> {
        let gcm = Gcm::new(&Key::rand_key_128()?);
        assert!(matches!(
            gcm.decrypt(&[0u8; 27], b""),
            Err(Error::InputTooShort { len: 27, min: 28 })
        ));
        assert!(matches!(
            gcm.seal(&[], b"pt", b""),
            Err(Error::InvalidNonceLength { len: 0, .. })
        ));
        assert!(matches!(
            gcm.encrypt_with_nonce(&[0u8; 16], b"pt", b""),
            Err(Error::InvalidNonceLength { len: 16, .. })
        ));
        assert!(matches!(check_len(16 * (1 << 32)), Err(Error::CounterOverflow)));
        assert!(check_len(16 * ((1 << 32) - 2)).is_ok());
        Ok(())
    }
}
