//! Authenticated encryption. Both constructions verify before decrypting and never return
//! plaintext alongside an authentication error.

pub mod etm;
pub mod gcm;

pub use etm::EncryptThenMac;
pub use gcm::Gcm;
