use rand::rand_core;
use thiserror::Error;

/// cryptocore Result type.
pub type Result<T> = std::result::Result<T, Error>;

/// cryptocore Error type.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Key size is outside the set accepted by the algorithm.
    #[error("invalid key length: {len} bytes (expected {expected})")]
    InvalidKeyLength { len: usize, expected: &'static str },

    /// Nonce or IV has the wrong size for the selected mode.
    #[error("invalid nonce/IV length: {len} bytes (expected {expected})")]
    InvalidNonceLength { len: usize, expected: &'static str },

    /// PKCS#7 padding of the decrypted plaintext is malformed.
    #[error("invalid PKCS#7 padding")]
    InvalidPadding,

    /// Computed authentication tag did not match input tag. Ciphertext and/or AAD has been modified since it was encrypted.
    #[error("authentication failed (invalid tag)")]
    AuthFailed,

    /// Container is shorter than its fixed overhead (IV, nonce, tag).
    #[error("input too short: {len} bytes (minimum {min})")]
    InputTooShort { len: usize, min: usize },

    /// Provided ciphertext that did not match the expected format of the mode of operation.
    #[error("invalid ciphertext length: {len} bytes ({context})")]
    InvalidCiphertext { len: usize, context: &'static str },

    /// Non-positive iteration count or output length, or an unsupported algorithm choice.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Attempted to encrypt more than 2^32 - 2 blocks under a single GCM nonce.
    #[error("input size caused counter overflow (maximum GCM plaintext is 16 * (2^32 - 2) bytes)")]
    CounterOverflow,

    /// `update` or `digest` called on a finalized hash/MAC without an intervening `reset`.
    #[error("hash or MAC already finalized; call reset() before reuse")]
    AlreadyFinalized,

    /// OS RNG failed while generating a key, IV, nonce or salt.
    #[error("OS RNG failed")]
    Rng(#[from] rand_core::OsError),
}
