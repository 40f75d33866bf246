use zeroize::Zeroizing;

use crate::cipher::{Cipher, Mode};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::kdf::derive_key;
use crate::key::Key;
use crate::mac::{Hmac, Mac};

pub const TAG_LEN: usize = 32;

const ENC_CONTEXT: &[u8] = b"cryptocore etm encryption key";
const MAC_CONTEXT: &[u8] = b"cryptocore etm authentication key";

/// **Encrypt-then-MAC**: a [Cipher] in any base [Mode] followed by HMAC-SHA256.
///
/// Both subkeys are derived from the master key with [derive_key] under separate contexts.
/// The tag covers the base-mode container (IV included) followed by the AAD, and output is
/// formatted as `IV (16 bytes, if the mode takes one) || Ciphertext || Tag (32 bytes)`.
pub struct EncryptThenMac {
    cipher: Cipher,
    mac_key: Zeroizing<Vec<u8>>,
}

impl EncryptThenMac {
    pub fn new(master_key: &Key, base_mode: Mode) -> Result<Self> {
        let enc_key = Zeroizing::new(derive_key(
            master_key.as_bytes(),
            ENC_CONTEXT,
            master_key.len(),
        )?);
        let mac_key = Zeroizing::new(derive_key(master_key.as_bytes(), MAC_CONTEXT, TAG_LEN)?);

        Ok(Self {
            cipher: Cipher::new(&Key::try_from_slice(&enc_key)?, base_mode),
            mac_key,
        })
    }

    pub fn mode(&self) -> Mode {
        self.cipher.mode()
    }

    /// Encrypt with a random IV (when the base mode uses one) and append the tag.
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let body = self.cipher.encrypt(plaintext)?;
        self.append_tag(body, aad)
    }

    /// As [EncryptThenMac::encrypt] with a caller-supplied 16-byte IV.
    pub fn encrypt_with_iv(&self, plaintext: &[u8], iv: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let body = self.cipher.encrypt_with_iv(plaintext, iv)?;
        self.append_tag(body, aad)
    }

    /// Verify the tag over `container || aad`, and only then decrypt.
    ///
    /// Returns [AuthFailed](crate::Error::AuthFailed) on any mismatch without touching the
    /// base mode, and [InputTooShort](crate::Error::InputTooShort) if no full tag is present.
    pub fn decrypt(&self, data: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if data.len() < TAG_LEN {
            return Err(Error::InputTooShort {
                len: data.len(),
                min: TAG_LEN,
            });
        }
        let (body, tag) = data.split_at(data.len() - TAG_LEN);

        let mut mac = self.mac()?;
        mac.update(body)?;
        mac.update(aad)?;
        if let Err(e) = mac.verify(tag) {
            tracing::warn!(len = data.len(), mode = %self.mode(), "encrypt-then-MAC authentication failed");
            return Err(e);
        }

        self.cipher.decrypt(body)
    }

    fn append_tag(&self, mut body: Vec<u8>, aad: &[u8]) -> Result<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(&body)?;
        mac.update(aad)?;
        let tag = mac.digest()?;
        body.extend_from_slice(&tag);
        Ok(body)
    }

    fn mac(&self) -> Result<Hmac> {
        Hmac::new(HashAlgorithm::Sha256, &self.mac_key)
    }
}

impl std::fmt::Debug for EncryptThenMac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptThenMac")
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::hmac_sha256;
    use crate::modes::util::test_util::{IV, KEY_128};

    const ALL: [Mode; 6] = [Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Cfb8, Mode::Ofb, Mode::Ctr];

    #[test]
    fn round_trip_every_base_mode() -> Result<()> {
        let key = Key::rand_key_256()?;
        for mode in ALL {
            let etm = EncryptThenMac::new(&key, mode)?;
            for pt in [&b""[..], b"x", b"exactly sixteen!", b"a somewhat longer message body"] {
                let container = etm.encrypt(pt, b"associated")?;
                assert_eq!(etm.decrypt(&container, b"associated")?, pt, "{mode}");
            }
        }
        Ok(())
    }

    #[test]
    fn tag_covers_container_then_aad() -> Result<()> {
        let master = Key::try_from_slice(&KEY_128)?;
        let etm = EncryptThenMac::new(&master, Mode::Ctr)?;
        let out = etm.encrypt_with_iv(b"message", &IV, b"aad")?;
        assert_eq!(out.len(), 16 + 7 + TAG_LEN);

        let (body, tag) = out.split_at(out.len() - TAG_LEN);
        let mac_key = derive_key(&KEY_128, MAC_CONTEXT, TAG_LEN)?;
        let mut input = body.to_vec();
        input.extend_from_slice(b"aad");
        assert_eq!(tag, hmac_sha256(&mac_key, &input));
        Ok(())
    }

    #[test]
    fn subkeys_differ_from_master() -> Result<()> {
        let master = Key::try_from_slice(&KEY_128)?;
        let etm = EncryptThenMac::new(&master, Mode::Cbc)?;
        let with_master = Cipher::new(&master, Mode::Cbc).encrypt_with_iv(b"message", &IV)?;
        let with_etm = etm.encrypt_with_iv(b"message", &IV, b"")?;
        assert_ne!(with_etm[..with_master.len()], with_master[..]);
        Ok(())
    }

    #[test]
    fn any_tampering_fails_closed() -> Result<()> {
        let etm = EncryptThenMac::new(&Key::rand_key_128()?, Mode::Cbc)?;
        let container = etm.encrypt(b"do not decrypt if modified", b"v1")?;
        for i in 0..container.len() {
            let mut tampered = container.clone();
            tampered[i] ^= 0x80;
            assert!(matches!(etm.decrypt(&tampered, b"v1"), Err(Error::AuthFailed)));
        }
        assert!(matches!(etm.decrypt(&container, b"v2"), Err(Error::AuthFailed)));
        Ok(())
    }

    #[test]
    fn rejects_short_input() -> Result<()> {
        let etm = EncryptThenMac::new(&Key::rand_key_128()?, Mode::Ctr)?;
        assert!(matches!(
            etm.decrypt(&[0u8; 31], b""),
            Err(Error::InputTooShort { len: 31, min: 32 })
        ));
        // a bare tag with no IV passes length checks but not authentication
        assert!(matches!(etm.decrypt(&[0u8; 32], b""), Err(Error::AuthFailed)));
        Ok(())
    }
}
