mod args;

use args::{Cli, Commands, CommonArgs, DeriveArgs, DgstArgs, EncryptArgs};
use clap::Parser;

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use cryptocore::{
    Aes, Cipher, Cmac, EncryptThenMac, Gcm, HashAlgorithm, Hasher, Hmac, Key, Mac, Mode,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const READ_CHUNK: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("--aad is only valid with --mode gcm or etm")]
    AadInvalidMode,

    #[error("--iv is not used by --mode ecb")]
    IvInvalidMode,

    #[error("a key is required: pass --key <HEX> or --gen-key")]
    MissingKey,

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("verification failed: expected {expected}, computed {computed}")]
    VerifyFailed { expected: String, computed: String },

    #[error("verify file is empty")]
    EmptyVerifyFile,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Crypto(#[from] cryptocore::Error),
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(args.verbose);

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Encrypt(enc) => encrypt(enc),
        Commands::Decrypt(common) => decrypt(common),
        Commands::Dgst(dgst) => digest(dgst),
        Commands::Derive(derive) => derive_cmd(derive),
    }
}

fn encrypt(enc: EncryptArgs) -> Result<(), CliError> {
    let common = enc.common;

    // read or generate key
    let key = if enc.gen_key {
        let key = Key::rand_key_128()?;
        println!("Generated key: {}", hex::encode(key.as_bytes()));
        key
    } else {
        parse_key(common.key.as_deref())?
    };

    let aad = parse_aad(common.mode, common.aad.as_deref())?;
    let iv = match enc.iv.as_deref() {
        Some(_) if common.mode == args::Mode::Ecb => return Err(CliError::IvInvalidMode),
        Some(iv) => Some(hex::decode(iv.trim())?),
        None => None,
    };

    let plaintext = fs::read(&common.input)?;
    let start = Instant::now();

    // encrypt plaintext and write output
    let ciphertext = match (common.mode, iv) {
        (args::Mode::Gcm, Some(nonce)) => Gcm::new(&key).encrypt_with_nonce(&nonce, &plaintext, &aad)?,
        (args::Mode::Gcm, None) => Gcm::new(&key).encrypt(&plaintext, &aad)?,
        (args::Mode::Etm, Some(iv)) => {
            EncryptThenMac::new(&key, Mode::Ctr)?.encrypt_with_iv(&plaintext, &iv, &aad)?
        }
        (args::Mode::Etm, None) => EncryptThenMac::new(&key, Mode::Ctr)?.encrypt(&plaintext, &aad)?,
        (mode, Some(iv)) => Cipher::new(&key, base_mode(mode)).encrypt_with_iv(&plaintext, &iv)?,
        (mode, None) => Cipher::new(&key, base_mode(mode)).encrypt(&plaintext)?,
    };

    let duration = start.elapsed();

    fs::write(&common.output, &ciphertext)?;
    println!(
        "Encrypted {} bytes in {} ms",
        plaintext.len(),
        duration.as_millis()
    );
    Ok(())
}

fn decrypt(common: CommonArgs) -> Result<(), CliError> {
    let key = parse_key(common.key.as_deref())?;
    let aad = parse_aad(common.mode, common.aad.as_deref())?;
    let ciphertext = fs::read(&common.input)?;

    let start = Instant::now();

    let plaintext = match common.mode {
        args::Mode::Gcm => Gcm::new(&key).decrypt(&ciphertext, &aad)?,
        args::Mode::Etm => EncryptThenMac::new(&key, Mode::Ctr)?.decrypt(&ciphertext, &aad)?,
        mode => Cipher::new(&key, base_mode(mode)).decrypt(&ciphertext)?,
    };

    let duration = start.elapsed();

    // never leave a truncated plaintext behind
    if let Err(e) = fs::write(&common.output, &plaintext) {
        let _ = fs::remove_file(&common.output);
        return Err(e.into());
    }

    println!(
        "Decrypted {} bytes in {} ms",
        plaintext.len(),
        duration.as_millis()
    );
    Ok(())
}

fn digest(dgst: DgstArgs) -> Result<(), CliError> {
    let algorithm = HashAlgorithm::from(dgst.algorithm);

    let (computed, label) = if dgst.cmac {
        let key = parse_key(dgst.key.as_deref())?;
        let mut mac = Cmac::new(Aes::new(&key));
        stream_into(&dgst.input, |chunk| mac.update(chunk))?;
        (mac.hexdigest()?, Some("AES-CMAC".to_string()))
    } else if dgst.hmac {
        let key = hex::decode(dgst.key.as_deref().unwrap_or_default().trim())?;
        let mut mac = Hmac::new(algorithm, &key)?;
        stream_into(&dgst.input, |chunk| mac.update(chunk))?;
        (mac.hexdigest()?, Some(format!("HMAC-{algorithm}")))
    } else {
        let mut hasher = algorithm.hasher();
        stream_into(&dgst.input, |chunk| hasher.update(chunk))?;
        (hasher.hexdigest()?, None)
    };

    let line = match label {
        Some(label) => format!("{computed}  {label}({})", dgst.input.display()),
        None => format!("{computed}  {}", dgst.input.display()),
    };
    println!("{line}");

    if let Some(path) = &dgst.output {
        fs::write(path, format!("{line}\n"))?;
    }

    if let Some(path) = &dgst.verify {
        let contents = fs::read_to_string(path)?;
        let expected = contents
            .split_whitespace()
            .next()
            .ok_or(CliError::EmptyVerifyFile)?
            .to_ascii_lowercase();
        if !cryptocore::util::ct_eq(expected.as_bytes(), computed.as_bytes()) {
            return Err(CliError::VerifyFailed { expected, computed });
        }
        println!("[OK] verification passed");
    }

    Ok(())
}

fn derive_cmd(derive: DeriveArgs) -> Result<(), CliError> {
    let salt = match derive.salt.as_deref() {
        Some(s) => hex::decode(s.trim())?,
        None => cryptocore::generate_salt(16)?,
    };

    let start = Instant::now();
    let key = cryptocore::pbkdf2_hmac(
        derive.algorithm.into(),
        derive.password.as_bytes(),
        &salt,
        derive.iterations,
        derive.length,
    )?;
    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "PBKDF2 finished");

    println!("{} {}", hex::encode(&key), hex::encode(&salt));
    Ok(())
}

fn base_mode(mode: args::Mode) -> Mode {
    match mode {
        args::Mode::Ecb => Mode::Ecb,
        args::Mode::Cbc => Mode::Cbc,
        args::Mode::Cfb => Mode::Cfb,
        args::Mode::Cfb8 => Mode::Cfb8,
        args::Mode::Ofb => Mode::Ofb,
        // gcm and etm are dispatched before reaching here; CTR is the etm base mode
        args::Mode::Ctr | args::Mode::Gcm | args::Mode::Etm => Mode::Ctr,
    }
}

fn parse_key(hex_key: Option<&str>) -> Result<Key, CliError> {
    let hex_key = hex_key.ok_or(CliError::MissingKey)?;
    let bytes = zeroize::Zeroizing::new(hex::decode(hex_key.trim())?);
    Ok(Key::try_from_slice(&bytes)?)
}

fn parse_aad(mode: args::Mode, aad: Option<&str>) -> Result<Vec<u8>, CliError> {
    match aad {
        Some(_) if !matches!(mode, args::Mode::Gcm | args::Mode::Etm) => Err(CliError::AadInvalidMode),
        Some(aad) => {
            let hex: String = aad.chars().filter(|c| !c.is_whitespace()).collect();
            Ok(hex::decode(hex)?)
        }
        None => Ok(Vec::new()),
    }
}

/// Feed a file to `update` in fixed-size chunks.
fn stream_into<F>(path: &Path, mut update: F) -> Result<(), CliError>
where
    F: FnMut(&[u8]) -> cryptocore::Result<()>,
{
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        update(&buf[..n])?;
    }
}
