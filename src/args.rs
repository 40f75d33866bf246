use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, author, arg_required_else_help = true)]
pub struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt input to output
    Encrypt(EncryptArgs),

    /// Decrypt input to output
    Decrypt(CommonArgs),

    /// Hash or MAC a file
    Dgst(DgstArgs),

    /// Derive a key from a password with PBKDF2
    Derive(DeriveArgs),
}

#[derive(Args, Debug)]
#[command(arg_required_else_help = true)]
pub struct CommonArgs {
    /// Mode of operation.
    #[arg(
        short = 'm',
        long = "mode",
        value_enum,
        default_value_t = Mode::Gcm,
    )]
    pub mode: Mode,

    /// Input file path.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output file path.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Key as a hex string (16, 24, or 32 bytes).
    #[arg(short = 'k', long = "key", value_name = "HEX")]
    pub key: Option<String>,

    /// Additional authenticated data as a hex string (optional, gcm and etm only).
    #[arg(long = "aad", value_name = "HEX")]
    pub aad: Option<String>,
}

#[derive(Args, Debug)]
#[command(arg_required_else_help = true)]
pub struct EncryptArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Generate a random 128-bit key and print it once.
    #[arg(long = "gen-key", conflicts_with = "key")]
    pub gen_key: bool,

    /// IV (16 bytes) or GCM nonce (12 bytes) as a hex string. Random if omitted.
    #[arg(long = "iv", value_name = "HEX")]
    pub iv: Option<String>,
}

#[derive(Args, Debug)]
#[command(arg_required_else_help = true)]
pub struct DgstArgs {
    /// Hash algorithm.
    #[arg(
        short = 'a',
        long = "algorithm",
        value_enum,
        default_value_t = HashAlg::Sha256,
    )]
    pub algorithm: HashAlg,

    /// Compute HMAC with --key instead of a plain digest.
    #[arg(long = "hmac", requires = "key", conflicts_with = "cmac")]
    pub hmac: bool,

    /// Compute AES-CMAC with a 16-byte --key.
    #[arg(long = "cmac", requires = "key")]
    pub cmac: bool,

    /// MAC key as a hex string.
    #[arg(short = 'k', long = "key", value_name = "HEX")]
    pub key: Option<String>,

    /// File whose first field is the expected hex value.
    #[arg(long = "verify", value_name = "FILE")]
    pub verify: Option<PathBuf>,

    /// Input file path.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Also write the result line to this file.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(arg_required_else_help = true)]
pub struct DeriveArgs {
    /// Password (UTF-8 text).
    #[arg(short = 'p', long = "password")]
    pub password: String,

    /// Salt as a hex string. A random 16-byte salt is generated if omitted.
    #[arg(short = 's', long = "salt", value_name = "HEX")]
    pub salt: Option<String>,

    /// PBKDF2 iteration count.
    #[arg(short = 'c', long = "iterations", default_value_t = 100_000)]
    pub iterations: u32,

    /// Derived key length in bytes.
    #[arg(short = 'l', long = "length", default_value_t = 32)]
    pub length: usize,

    /// PRF hash for HMAC.
    #[arg(
        short = 'a',
        long = "algorithm",
        value_enum,
        default_value_t = HashAlg::Sha256,
    )]
    pub algorithm: HashAlg,
}

#[derive(Copy, Clone, Debug, ValueEnum, Eq, PartialEq)]
pub enum Mode {
    #[value(name = "ecb")]
    Ecb,
    #[value(name = "cbc")]
    Cbc,
    #[value(name = "cfb")]
    Cfb,
    #[value(name = "cfb8")]
    Cfb8,
    #[value(name = "ofb")]
    Ofb,
    #[value(name = "ctr")]
    Ctr,
    #[value(name = "gcm")]
    Gcm,
    /// Encrypt-then-MAC over CTR with HMAC-SHA256.
    #[value(name = "etm")]
    Etm,
}

#[derive(Copy, Clone, Debug, ValueEnum, Eq, PartialEq)]
pub enum HashAlg {
    #[value(name = "sha256")]
    Sha256,
    #[value(name = "sha3-256")]
    Sha3_256,
    #[value(name = "blake2b")]
    Blake2b,
}

impl From<HashAlg> for cryptocore::HashAlgorithm {
    fn from(alg: HashAlg) -> Self {
        match alg {
            HashAlg::Sha256 => cryptocore::HashAlgorithm::Sha256,
            HashAlg::Sha3_256 => cryptocore::HashAlgorithm::Sha3_256,
            HashAlg::Blake2b => cryptocore::HashAlgorithm::Blake2b,
        }
    }
}
