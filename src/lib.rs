//! Block cipher modes, authenticated encryption, hashing, MACs and key derivation built on
//! one 128-bit [`BlockCipher`] seam.
//!
//! ```
//! # fn main() -> cryptocore::Result<()> {
//! use cryptocore::{Gcm, Key};
//!
//! let key = Key::rand_key_256()?;
//! let gcm = Gcm::new(&key);
//! let container = gcm.encrypt(b"secret", b"header")?;
//! assert_eq!(gcm.decrypt(&container, b"header")?, b"secret");
//! assert!(gcm.decrypt(&container, b"other header").is_err());
//! # Ok(())
//! # }
//! ```

pub mod aead;
pub mod block;
mod cipher;
mod error;
pub mod gf128;
pub mod hash;
pub mod kdf;
mod key;
pub mod mac;
pub mod modes;
pub mod util;

pub use aead::{EncryptThenMac, Gcm};
pub use block::{Aes, BLOCK_SIZE, Block, BlockCipher};
pub use cipher::{Cipher, Mode};
pub use error::{Error, Result};
pub use hash::{
    Blake2b, HashAlgorithm, HashFunction, Hasher, Lifecycle, Sha256, Sha3_256, hash, hash_hex,
};
pub use kdf::{derive_key, pbkdf2_hmac, pbkdf2_hmac_sha256};
pub use key::Key;
pub use mac::{Cmac, Hmac, Mac, aes_cmac, hmac_sha256};
pub use util::{generate_salt, random_bytes};
