//! In-memory Ed25519 key material.
//!
//! # Security
//! - Seeds are zeroized on drop (`SigningKey` implements `ZeroizeOnDrop`)
//! - `Debug` output never contains the seed
//! - Keys are never logged; only the derived address is

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::wallet::address::{derive_address, Address};
use crate::wallet::types::{PublicKey, Seed, WalletError, WalletResult, SEED_LEN, SIGNATURE_LEN};

/// Environment variable holding a base64 encoded seed.
pub const PRIVATE_KEY_ENV_VAR: &str = "OCTRA_PRIVATE_KEY";

/// Ed25519 key pair plus its derived address.
///
/// The public key and address are always derived from the seed.
#[derive(Clone)]
pub struct KeyMaterial {
    signing_key: SigningKey,
    address: Address,
}

impl KeyMaterial {
    /// Generate a fresh key pair from the operating system CSPRNG.
    pub fn generate() -> WalletResult<Self> {
        let mut seed = Zeroizing::new([0u8; SEED_LEN]);
        OsRng
            .try_fill_bytes(&mut seed[..])
            .map_err(|e| WalletError::EntropyUnavailable(e.to_string()))?;

        Self::from_seed(&seed[..])
    }

    /// Rebuild key material from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8]) -> WalletResult<Self> {
        let seed: &Seed = seed
            .try_into()
            .map_err(|_| WalletError::InvalidSeedLength(seed.len()))?;

        let signing_key = SigningKey::from_bytes(seed);
        let address = derive_address(signing_key.verifying_key().as_bytes())?;

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Rebuild key material from a base64 encoded seed.
    pub fn from_base64(seed_b64: &str) -> WalletResult<Self> {
        let seed = Zeroizing::new(
            BASE64
                .decode(seed_b64.trim())
                .map_err(|e| WalletError::InvalidEncoding(format!("seed is not base64: {}", e)))?,
        );

        Self::from_seed(&seed)
    }

    /// Load key material from `OCTRA_PRIVATE_KEY`.
    pub fn from_env() -> WalletResult<Self> {
        let seed_b64 = Zeroizing::new(
            std::env::var(PRIVATE_KEY_ENV_VAR)
                .map_err(|_| WalletError::MissingEnv(PRIVATE_KEY_ENV_VAR))?,
        );

        let keys = Self::from_base64(&seed_b64)?;
        tracing::info!(address = %keys.address, "Key material loaded from environment");
        Ok(keys)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key(&self) -> PublicKey {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.public_key())
    }

    /// Raw seed. Callers own the copy and should drop it promptly.
    pub fn seed(&self) -> Zeroizing<Seed> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// Base64 seed for backups.
    pub fn export_seed_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE64.encode(&self.seed()[..]))
    }

    /// Ed25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address)
            .field("public_key", &self.public_key_base64())
            .finish_non_exhaustive()
    }
}
