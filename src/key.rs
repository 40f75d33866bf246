//! Defines the [`Key`] struct, which holds a valid block-cipher key of 128, 192, or 256 bits.
//! Keys can be randomly generated or constructed from an existing byte slice.

use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::util::warn_if_weak;

pub(crate) const KEY_LENGTHS: &str = "16, 24, or 32";

#[derive(Clone, PartialEq, Eq, Zeroize)]
enum KeyBytes {
    K128([u8; 16]),
    K192([u8; 24]),
    K256([u8; 32]),
}

/// Contains a valid AES key. Can be instantiated with a random key, or built from a slice
/// of bytes that is 16, 24, or 32 bytes long. The bytes are wiped when the key is dropped.
///
/// ## Examples
/// ```
/// # fn main() -> cryptocore::Result<()> {
/// use cryptocore::Key;
///
/// let random = Key::rand_key_256()?;
/// assert_eq!(random.len(), 32);
///
/// let key_bytes = [0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6,
///                  0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c];
/// let key = Key::try_from_slice(&key_bytes)?;
/// assert_eq!(key.as_bytes(), &key_bytes);
///
/// // anything other than 16, 24, or 32 bytes is rejected
/// assert!(Key::try_from_slice(&key_bytes[..10]).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Key {
    bytes: KeyBytes,
}

impl Key {
    /// Generate a random 128-bit key. Returns Error if OsRng fails.
    pub fn rand_key_128() -> Result<Self> {
        let mut k = [0u8; 16];
        OsRng.try_fill_bytes(&mut k)?;
        Ok(Self {
            bytes: KeyBytes::K128(k),
        })
    }

    /// Generate a random 192-bit key. Returns Error if OsRng fails.
    pub fn rand_key_192() -> Result<Self> {
        let mut k = [0u8; 24];
        OsRng.try_fill_bytes(&mut k)?;
        Ok(Self {
            bytes: KeyBytes::K192(k),
        })
    }

    /// Generate a random 256-bit key. Returns Error if OsRng fails.
    pub fn rand_key_256() -> Result<Self> {
        let mut k = [0u8; 32];
        OsRng.try_fill_bytes(&mut k)?;
        Ok(Self {
            bytes: KeyBytes::K256(k),
        })
    }

    /// Attempts to build a key from a slice of bytes. Returns an InvalidKeyLength error
    /// if the input slice is anything other than 16, 24, or 32 bytes long.
    /// Logs a warning (but still succeeds) when the key has an obviously weak structure.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes = if let Ok(k) = <[u8; 16]>::try_from(bytes) {
            KeyBytes::K128(k)
        } else if let Ok(k) = <[u8; 24]>::try_from(bytes) {
            KeyBytes::K192(k)
        } else if let Ok(k) = <[u8; 32]>::try_from(bytes) {
            KeyBytes::K256(k)
        } else {
            return Err(Error::InvalidKeyLength {
                len: bytes.len(),
                expected: KEY_LENGTHS,
            });
        };

        let key = Self { bytes };
        warn_if_weak(key.as_bytes());
        Ok(key)
    }

    /// Returns a reference to the internal key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.bytes {
            KeyBytes::K128(k) => k,
            KeyBytes::K192(k) => k,
            KeyBytes::K256(k) => k,
        }
    }

    /// Key length in bytes (16, 24, or 32).
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key").field("len", &self.len()).finish_non_exhaustive()
    }
}
