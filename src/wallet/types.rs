//! Wallet constants and error definitions.

use thiserror::Error;

use crate::error::ErrorKind;

/// Length of an Ed25519 seed in bytes.
pub const SEED_LEN: usize = 32;

/// Length of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Prefix of every textual address.
pub const ADDRESS_PREFIX: &str = "oct";

/// Raw Ed25519 seed.
pub type Seed = [u8; SEED_LEN];

/// Raw Ed25519 public key.
pub type PublicKey = [u8; PUBLIC_KEY_LEN];

/// Errors raised by key handling, keystores and transaction encoding.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Public key is not exactly 32 bytes.
    #[error("Invalid public key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// Seed is not exactly 32 bytes.
    #[error("Invalid seed length: expected 32 bytes, got {0}")]
    InvalidSeedLength(usize),

    /// Text could not be decoded (base64 / base58).
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Instruction sender is not the address of the signing key.
    #[error("Sender {from} does not match signing key address {expected}")]
    SenderMismatch { from: String, expected: String },

    #[error("Password must not be empty")]
    EmptyPassword,

    /// Decryption failed. Wrong password and corrupted records look the same.
    #[error("invalid password")]
    InvalidPassword,

    #[error("Signature verification failed")]
    InvalidSignature,

    #[error("Unsupported keystore cipher: {0}")]
    UnsupportedCipher(String),

    #[error("Invalid keystore: {0}")]
    InvalidKeystore(String),

    #[error("Secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Environment variable {0} not set")]
    MissingEnv(&'static str),

    #[error("Keystore I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WalletError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidPassword | WalletError::InvalidSignature => {
                ErrorKind::CryptoFailure
            }
            WalletError::EntropyUnavailable(_) => ErrorKind::EntropyUnavailable,
            _ => ErrorKind::InvalidInput,
        }
    }
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;
