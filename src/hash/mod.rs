//! Streaming hash functions behind one [`Hasher`] contract.
//!
//! Every hasher moves through [`Lifecycle`]: `Init --update--> Accumulating --digest--> Finalized`.
//! `digest` wipes the running state; reusing a finalized hasher requires [`Hasher::reset`].

mod blake2b;
mod sha256;
mod sha3;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub use blake2b::Blake2b;
pub use sha256::Sha256;
pub use sha3::Sha3_256;

/// Where a streaming hash or MAC object is in its life.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Init,
    Accumulating,
    Finalized,
}

impl Lifecycle {
    /// Transition for `update`.
    pub(crate) fn on_update(&mut self) -> Result<()> {
        match self {
            Lifecycle::Finalized => Err(Error::AlreadyFinalized),
            _ => {
                *self = Lifecycle::Accumulating;
                Ok(())
            }
        }
    }

    /// Transition for `digest`.
    pub(crate) fn on_digest(&mut self) -> Result<()> {
        match self {
            Lifecycle::Finalized => Err(Error::AlreadyFinalized),
            _ => {
                *self = Lifecycle::Finalized;
                Ok(())
            }
        }
    }
}

/// Capability set shared by all hash variants.
pub trait Hasher {
    fn algorithm(&self) -> HashAlgorithm;

    /// Internal block size in bytes (the HMAC key block size).
    fn block_size(&self) -> usize;

    /// Digest size in bytes.
    fn output_size(&self) -> usize;

    fn lifecycle(&self) -> Lifecycle;

    /// Absorb `data`. Any chunk size and alignment is accepted.
    fn update(&mut self, data: &[u8]) -> Result<()>;

    /// Apply final padding and return the digest. Fails with [`Error::AlreadyFinalized`]
    /// when called twice without a `reset`.
    fn digest(&mut self) -> Result<Vec<u8>>;

    /// Return to `Init`, keeping construction parameters.
    fn reset(&mut self);

    /// Lowercase hex of [`Hasher::digest`].
    fn hexdigest(&mut self) -> Result<String> {
        Ok(hex::encode(self.digest()?))
    }
}

/// Selects a hash variant at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha3_256,
    /// BLAKE2b with a 64-byte digest.
    Blake2b,
}

impl HashAlgorithm {
    pub fn block_size(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => sha256::BLOCK_LEN,
            HashAlgorithm::Sha3_256 => sha3::RATE,
            HashAlgorithm::Blake2b => blake2b::BLOCK_LEN,
        }
    }

    pub fn output_size(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => sha256::OUT_LEN,
            HashAlgorithm::Sha3_256 => sha3::OUT_LEN,
            HashAlgorithm::Blake2b => blake2b::MAX_OUT_LEN,
        }
    }

    /// A fresh hasher for this algorithm.
    pub fn hasher(self) -> HashFunction {
        match self {
            HashAlgorithm::Sha256 => HashFunction::Sha256(Sha256::new()),
            HashAlgorithm::Sha3_256 => HashFunction::Sha3_256(Sha3_256::new()),
            HashAlgorithm::Blake2b => HashFunction::Blake2b(Blake2b::new()),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha3_256 => "sha3-256",
            HashAlgorithm::Blake2b => "blake2b",
        })
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha3256" | "sha3" => Ok(HashAlgorithm::Sha3_256),
            "blake2b" | "blake2b512" => Ok(HashAlgorithm::Blake2b),
            _ => Err(Error::InvalidParameter("unsupported hash algorithm")),
        }
    }
}

/// Tagged variant over the concrete hashers.
#[derive(Clone, Debug)]
pub enum HashFunction {
    Sha256(Sha256),
    Sha3_256(Sha3_256),
    Blake2b(Blake2b),
}

impl HashFunction {
    fn inner(&self) -> &dyn Hasher {
        match self {
            HashFunction::Sha256(h) => h,
            HashFunction::Sha3_256(h) => h,
            HashFunction::Blake2b(h) => h,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Hasher {
        match self {
            HashFunction::Sha256(h) => h,
            HashFunction::Sha3_256(h) => h,
            HashFunction::Blake2b(h) => h,
        }
    }
}

impl Hasher for HashFunction {
    fn algorithm(&self) -> HashAlgorithm {
        self.inner().algorithm()
    }

    fn block_size(&self) -> usize {
        self.inner().block_size()
    }

    fn output_size(&self) -> usize {
        self.inner().output_size()
    }

    fn lifecycle(&self) -> Lifecycle {
        self.inner().lifecycle()
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.inner_mut().update(data)
    }

    fn digest(&mut self) -> Result<Vec<u8>> {
        self.inner_mut().digest()
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }
}

/// One-shot digest of `data`.
pub fn hash(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha256 => Sha256::hash(data).to_vec(),
        HashAlgorithm::Sha3_256 => Sha3_256::hash(data).to_vec(),
        HashAlgorithm::Blake2b => Blake2b::hash(data),
    }
}

/// One-shot lowercase hex digest of `data`.
pub fn hash_hex(algorithm: HashAlgorithm, data: &[u8]) -> String {
    hex::encode(hash(algorithm, data))
}
