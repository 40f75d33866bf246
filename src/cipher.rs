use std::fmt;
use std::str::FromStr;

use crate::block::{Aes, BLOCK_SIZE, Block};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::modes::*;
use crate::util::random_iv;

/// Confidentiality-only mode of operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Ecb,
    Cbc,
    /// CFB with full 128-bit segments.
    Cfb,
    /// CFB with 8-bit segments.
    Cfb8,
    Ofb,
    Ctr,
}

impl Mode {
    /// Whether the container starts with a 16-byte IV.
    pub fn needs_iv(self) -> bool {
        !matches!(self, Mode::Ecb)
    }

    /// Whether plaintext is PKCS#7 padded.
    pub fn needs_padding(self) -> bool {
        matches!(self, Mode::Ecb | Mode::Cbc)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Ecb => "ecb",
            Mode::Cbc => "cbc",
            Mode::Cfb => "cfb",
            Mode::Cfb8 => "cfb8",
            Mode::Ofb => "ofb",
            Mode::Ctr => "ctr",
        })
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ecb" => Ok(Mode::Ecb),
            "cbc" => Ok(Mode::Cbc),
            "cfb" | "cfb128" => Ok(Mode::Cfb),
            "cfb8" => Ok(Mode::Cfb8),
            "ofb" => Ok(Mode::Ofb),
            "ctr" => Ok(Mode::Ctr),
            _ => Err(Error::InvalidParameter("unsupported cipher mode")),
        }
    }
}

/// AES in one [Mode], producing and consuming self-describing containers:
/// - ECB: `Ciphertext`
/// - CBC, CFB, CFB-8, OFB, CTR: `IV (16 bytes) || Ciphertext`
#[derive(Clone, Debug)]
pub struct Cipher {
    aes: Aes,
    mode: Mode,
}

impl Cipher {
    /// Expands the key and fixes the mode.
    pub fn new(key: &Key, mode: Mode) -> Self {
        Self {
            aes: Aes::new(key),
            mode,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Encrypt `plaintext`, generating a random IV for modes that need one.
    ///
    /// **ECB** encrypts each block independently and is vulnerable to pattern emergence
    /// in the ciphertext.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if !self.mode.needs_iv() {
            return ecb_encrypt(&self.aes, plaintext);
        }
        let iv = random_iv()?;
        self.encrypt_with_iv(plaintext, &iv)
    }

    /// Encrypt with a caller-supplied 16-byte IV. The IV is prepended to the output.
    ///
    /// **Important**: for CTR and OFB the same IV must never be reused with the same key.
    pub fn encrypt_with_iv(&self, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        let iv: &Block = iv.try_into().map_err(|_| Error::InvalidNonceLength {
            len: iv.len(),
            expected: "16",
        })?;

        let body = match self.mode {
            Mode::Ecb => return Err(Error::InvalidParameter("ECB does not take an IV")),
            Mode::Cbc => cbc_encrypt(&self.aes, iv, plaintext)?,
            Mode::Cfb => cfb_encrypt(&self.aes, iv, plaintext)?,
            Mode::Cfb8 => cfb8_encrypt(&self.aes, iv, plaintext)?,
            Mode::Ofb => ofb_apply(&self.aes, iv, plaintext)?,
            Mode::Ctr => ctr_apply(&self.aes, iv, plaintext)?,
        };

        let mut out = Vec::with_capacity(BLOCK_SIZE + body.len());
        out.extend_from_slice(iv);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decrypt a container produced by [Cipher::encrypt].
    ///
    /// Returns:
    /// - [InputTooShort](crate::Error::InputTooShort) if an IV mode container has no full IV.
    /// - [InvalidCiphertext](crate::Error::InvalidCiphertext) if a padded mode body is not whole blocks.
    /// - [InvalidPadding](crate::Error::InvalidPadding) if PKCS#7 padding is malformed.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if !self.mode.needs_iv() {
            return ecb_decrypt(&self.aes, data);
        }
        if data.len() < BLOCK_SIZE {
            return Err(Error::InputTooShort {
                len: data.len(),
                min: BLOCK_SIZE,
            });
        }

        let (iv, body) = data.split_at(BLOCK_SIZE);
        let iv: &Block = iv.try_into().unwrap(); // safe unwrap, split_at guarantees 16 bytes

        match self.mode {
            Mode::Ecb => ecb_decrypt(&self.aes, data),
            Mode::Cbc => cbc_decrypt(&self.aes, iv, body),
            Mode::Cfb => cfb_decrypt(&self.aes, iv, body),
            Mode::Cfb8 => cfb8_decrypt(&self.aes, iv, body),
            Mode::Ofb => ofb_apply(&self.aes, iv, body),
            Mode::Ctr => ctr_apply(&self.aes, iv, body),
        }
    }
}
