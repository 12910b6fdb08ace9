//! Address derivation: `oct` + base58(sha256(public key)).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::wallet::types::{WalletError, WalletResult, ADDRESS_PREFIX, PUBLIC_KEY_LEN};

/// Textual on-chain address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string.
    ///
    /// The body after the `oct` prefix must be base58 decoding to a
    /// 32-byte digest.
    pub fn parse(s: &str) -> WalletResult<Self> {
        let body = s
            .strip_prefix(ADDRESS_PREFIX)
            .ok_or_else(|| WalletError::InvalidAddress(format!("missing '{}' prefix", ADDRESS_PREFIX)))?;

        let digest = bs58::decode(body)
            .into_vec()
            .map_err(|e| WalletError::InvalidAddress(format!("bad base58: {}", e)))?;

        if digest.len() != 32 {
            return Err(WalletError::InvalidAddress(format!(
                "expected 32-byte digest, got {}",
                digest.len()
            )));
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the address of a 32-byte Ed25519 public key.
pub fn derive_address(public_key: &[u8]) -> WalletResult<Address> {
    if public_key.len() != PUBLIC_KEY_LEN {
        return Err(WalletError::InvalidKeyLength(public_key.len()));
    }

    let digest = Sha256::digest(public_key);
    Ok(Address(format!(
        "{}{}",
        ADDRESS_PREFIX,
        bs58::encode(digest).into_string()
    )))
}
