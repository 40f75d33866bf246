//! HMAC (RFC 2104) over any hash variant.

use zeroize::Zeroizing;

use super::Mac;
use crate::error::Result;
use crate::hash::{HashAlgorithm, HashFunction, Hasher, Lifecycle, Sha256};
use crate::util::ct_eq;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Streaming HMAC. The inner hash is primed with `K ^ ipad` and the outer hash with
/// `K ^ opad` at construction; `update` feeds the inner hash only.
#[derive(Clone)]
pub struct Hmac {
    algorithm: HashAlgorithm,
    /// block-sized key, kept for `reset`
    key_block: Zeroizing<Vec<u8>>,
    inner: HashFunction,
    outer: HashFunction,
    lifecycle: Lifecycle,
}

impl std::fmt::Debug for Hmac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hmac")
            .field("algorithm", &self.algorithm)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl Hmac {
    /// Keys longer than the hash block size are hashed first; shorter keys are zero-padded.
    /// Any key length, including empty, is accepted.
    pub fn new(algorithm: HashAlgorithm, key: &[u8]) -> Result<Self> {
        let block_size = algorithm.block_size();

        let mut key_block = Zeroizing::new(vec![0u8; block_size]);
        if key.len() > block_size {
            let mut h = algorithm.hasher();
            h.update(key)?;
            let hashed = Zeroizing::new(h.digest()?);
            key_block[..hashed.len()].copy_from_slice(&hashed);
        } else {
            key_block[..key.len()].copy_from_slice(key);
        }

        let mut hmac = Self {
            algorithm,
            key_block,
            inner: algorithm.hasher(),
            outer: algorithm.hasher(),
            lifecycle: Lifecycle::Init,
        };
        hmac.prime()?;
        Ok(hmac)
    }

    /// HMAC-SHA256 instance.
    pub fn sha256(key: &[u8]) -> Result<Self> {
        Self::new(HashAlgorithm::Sha256, key)
    }

    /// One-shot HMAC.
    pub fn compute(algorithm: HashAlgorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        let mut mac = Self::new(algorithm, key)?;
        mac.update(message)?;
        mac.digest()
    }

    /// One-shot constant-time check of `tag` against HMAC(key, message).
    pub fn verify_tag(
        algorithm: HashAlgorithm,
        key: &[u8],
        message: &[u8],
        tag: &[u8],
    ) -> Result<bool> {
        let computed = Self::compute(algorithm, key, message)?;
        Ok(ct_eq(&computed, tag))
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn prime(&mut self) -> Result<()> {
        let ipad = Zeroizing::new(self.key_block.iter().map(|b| b ^ IPAD).collect::<Vec<u8>>());
        let opad = Zeroizing::new(self.key_block.iter().map(|b| b ^ OPAD).collect::<Vec<u8>>());
        self.inner.reset();
        self.outer.reset();
        self.inner.update(&ipad)?;
        self.outer.update(&opad)?;
        Ok(())
    }
}

impl Mac for Hmac {
    fn tag_size(&self) -> usize {
        self.algorithm.output_size()
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.lifecycle.on_update()?;
        self.inner.update(data)
    }

    fn digest(&mut self) -> Result<Vec<u8>> {
        self.lifecycle.on_digest()?;
        let inner = Zeroizing::new(self.inner.digest()?);
        self.outer.update(&inner)?;
        self.outer.digest()
    }

    fn reset(&mut self) {
        self.lifecycle = Lifecycle::Init;
        // priming a freshly reset hasher cannot hit the finalized state
        let _ = self.prime();
    }
}

/// One-shot HMAC-SHA256 into a fixed-size tag.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut key_block = Zeroizing::new([0u8; 64]);
    if key.len() > 64 {
        key_block[..32].copy_from_slice(&Sha256::hash(key));
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut inner = Sha256::new();
    inner.absorb(&key_block.map(|b| b ^ IPAD));
    inner.absorb(message);
    let inner_hash = Zeroizing::new(inner.finish());

    let mut outer = Sha256::new();
    outer.absorb(&key_block.map(|b| b ^ OPAD));
    outer.absorb(&*inner_hash);
    outer.finish()
}
