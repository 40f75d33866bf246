//! Message authentication codes: [`Hmac`] over any [`HashAlgorithm`](crate::HashAlgorithm) and
//! [`Cmac`] over any [`BlockCipher`](crate::BlockCipher).

mod cmac;
mod hmac;

use crate::error::{Error, Result};
use crate::hash::Lifecycle;
use crate::util::ct_eq;

pub use cmac::{Cmac, aes_cmac};
pub use hmac::{Hmac, hmac_sha256};

/// Streaming MAC with the same lifecycle as [`Hasher`](crate::Hasher).
pub trait Mac {
    /// Tag size in bytes.
    fn tag_size(&self) -> usize;

    fn lifecycle(&self) -> Lifecycle;

    fn update(&mut self, data: &[u8]) -> Result<()>;

    /// Finalize and return the tag.
    fn digest(&mut self) -> Result<Vec<u8>>;

    fn reset(&mut self);

    /// Finalize and compare against `tag` in constant time.
    fn verify(&mut self, tag: &[u8]) -> Result<()> {
        let computed = self.digest()?;
        if ct_eq(&computed, tag) {
            Ok(())
        } else {
            Err(Error::AuthFailed)
        }
    }

    /// Lowercase hex of [`Mac::digest`].
    fn hexdigest(&mut self) -> Result<String> {
        Ok(hex::encode(self.digest()?))
    }
}
