//! Key derivation on top of HMAC: PBKDF2 for passwords, counter-mode expansion for
//! splitting one master key into independent subkeys.

mod hkdf;
mod pbkdf2;

pub use crate::util::generate_salt;
pub use hkdf::derive_key;
pub use pbkdf2::{pbkdf2_hmac, pbkdf2_hmac_sha256};
