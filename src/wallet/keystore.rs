//! Password-protected keystore records.
//!
//! # Format
//! ```text
//! {"address":"oct…","crypto":{"cipher":"aes-256-gcm","ciphertext":"<b64>","salt":"<b64>","nonce":"<b64>"}}
//! ```
//!
//! # Scheme
//! - scrypt (N=32768, r=8, p=1) derives a 32-byte key from password + 16-byte salt
//! - AES-256-GCM seals the 32-byte seed under a 12-byte nonce, no AAD
//! - Salt and nonce are fresh for every encryption
//!
//! Decryption has a single authenticated step. A wrong password and a
//! corrupted record both surface as `WalletError::InvalidPassword`.

use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::wallet::address::Address;
use crate::wallet::keys::KeyMaterial;
use crate::wallet::types::{WalletError, WalletResult};

/// Cipher identifier stored in every record.
pub const CIPHER_ID: &str = "aes-256-gcm";

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;

/// scrypt cost parameter N = 2^15.
const SCRYPT_LOG_N: u8 = 15;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const KEY_LEN: usize = 32;

/// Persisted keystore record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreRecord {
    pub address: Address,
    pub crypto: KeystoreCrypto,
}

/// Cipher section of a keystore record. All binary fields are base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreCrypto {
    pub cipher: String,
    pub ciphertext: String,
    pub salt: String,
    pub nonce: String,
}

impl KeystoreRecord {
    /// Encrypt the seed of `keys` under `password`.
    pub fn encrypt(keys: &KeyMaterial, password: &str) -> WalletResult<Self> {
        if password.is_empty() {
            return Err(WalletError::EmptyPassword);
        }

        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .and_then(|_| OsRng.try_fill_bytes(&mut nonce))
            .map_err(|e| WalletError::EntropyUnavailable(e.to_string()))?;

        let key = derive_key(password, &salt)
            .map_err(|e| WalletError::InvalidKeystore(format!("key derivation failed: {}", e)))?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|_| WalletError::InvalidKeystore("bad derived key length".to_string()))?;

        let seed = keys.seed();
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), seed.as_slice())
            .map_err(|_| WalletError::InvalidKeystore("encryption failed".to_string()))?;

        tracing::debug!(address = %keys.address(), "Keystore encrypted");

        Ok(Self {
            address: keys.address().clone(),
            crypto: KeystoreCrypto {
                cipher: CIPHER_ID.to_string(),
                ciphertext: BASE64.encode(ciphertext),
                salt: BASE64.encode(salt),
                nonce: BASE64.encode(nonce),
            },
        })
    }

    /// Recover the key material sealed in this record.
    pub fn decrypt(&self, password: &str) -> WalletResult<KeyMaterial> {
        if self.crypto.cipher != CIPHER_ID {
            return Err(WalletError::UnsupportedCipher(self.crypto.cipher.clone()));
        }

        let salt = BASE64
            .decode(&self.crypto.salt)
            .map_err(|_| WalletError::InvalidPassword)?;
        let nonce = BASE64
            .decode(&self.crypto.nonce)
            .map_err(|_| WalletError::InvalidPassword)?;
        let ciphertext = BASE64
            .decode(&self.crypto.ciphertext)
            .map_err(|_| WalletError::InvalidPassword)?;

        if salt.len() != SALT_LEN || nonce.len() != NONCE_LEN {
            return Err(WalletError::InvalidPassword);
        }

        let key = derive_key(password, &salt).map_err(|_| WalletError::InvalidPassword)?;
        let cipher =
            Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| WalletError::InvalidPassword)?;

        let seed = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
                .map_err(|_| WalletError::InvalidPassword)?,
        );

        let keys = KeyMaterial::from_seed(&seed).map_err(|_| WalletError::InvalidPassword)?;
        if keys.address() != &self.address {
            tracing::warn!(
                stored = %self.address,
                derived = %keys.address(),
                "Keystore address field does not match decrypted key"
            );
        }

        Ok(keys)
    }

    pub fn to_json(&self) -> WalletResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WalletError::InvalidKeystore(e.to_string()))
    }

    pub fn from_json(json: &str) -> WalletResult<Self> {
        serde_json::from_str(json).map_err(|e| WalletError::InvalidKeystore(e.to_string()))
    }

    /// Write the record to `path`, readable by the owner only on Unix.
    ///
    /// The file is created with mode 0600, and an existing file is narrowed
    /// to 0600 before any key material is written into it.
    pub fn save(&self, path: &Path) -> WalletResult<()> {
        let json = self.to_json()?;
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            options.mode(0o600);
            let file = options.open(path)?;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
            write_record(file, &json)?;
        }

        #[cfg(not(unix))]
        write_record(options.open(path)?, &json)?;

        tracing::info!(path = %path.display(), address = %self.address, "Keystore saved");
        Ok(())
    }

    pub fn load(path: &Path) -> WalletResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

fn write_record(mut file: std::fs::File, json: &str) -> std::io::Result<()> {
    use std::io::Write;

    file.write_all(json.as_bytes())?;
    file.sync_all()
}

fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, String> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| e.to_string())?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(password.as_bytes(), salt, &params, key.as_mut_slice())
        .map_err(|e| e.to_string())?;
    Ok(key)
}
