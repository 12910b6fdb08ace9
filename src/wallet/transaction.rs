//! OTX-1 transfer canonicalization and signing.
//!
//! # Canonical form
//! ```text
//! {"from":"oct…","to_":"oct…","amount":"5000000","nonce":10,"ou":"1000","timestamp":1737273600.5}
//! ```
//! - Field order is fixed; no whitespace
//! - `ou` defaults to `"1000"` when empty
//! - `timestamp` is the shortest exact decimal form, never exponent notation
//! - `message` is never part of the signed bytes
//!
//! # Trust boundary
//! The broadcast form carries `message` next to the signed fields. A relay
//! can alter or strip it without invalidating the signature.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::wallet::address::Address;
use crate::wallet::keys::KeyMaterial;
use crate::wallet::types::{WalletError, WalletResult, PUBLIC_KEY_LEN, SIGNATURE_LEN};

/// Operation-unit tag used when an instruction leaves `ou` empty.
pub const DEFAULT_OU: &str = "1000";

/// A value transfer before signing.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferInstruction {
    pub from: Address,
    pub to: Address,
    /// Amount in atoms, as decimal digits.
    pub amount: String,
    /// Must be the sender's last on-chain nonce + 1.
    pub nonce: u64,
    pub ou: String,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub message: Option<String>,
}

impl TransferInstruction {
    /// Transfer of `amount_atoms` stamped with the current time.
    pub fn new(from: Address, to: Address, amount_atoms: u64, nonce: u64) -> Self {
        Self {
            from,
            to,
            amount: amount_atoms.to_string(),
            nonce,
            ou: String::new(),
            timestamp: current_timestamp(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_ou(mut self, ou: impl Into<String>) -> Self {
        self.ou = ou.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// The exact bytes that get signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for CanonicalPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wall-clock seconds since the Unix epoch, with sub-second precision.
pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Shortest exact decimal rendering of a timestamp.
pub fn normalize_timestamp(timestamp: f64) -> WalletResult<String> {
    if !timestamp.is_finite() || timestamp < 0.0 {
        return Err(WalletError::InvalidTimestamp(format!(
            "{} is not a non-negative finite number",
            timestamp
        )));
    }
    // -0.0 would otherwise render as "-0"
    let timestamp = if timestamp == 0.0 { 0.0 } else { timestamp };

    Ok(format!("{}", timestamp))
}

/// Build the canonical payload of an instruction.
pub fn build_canonical(instruction: &TransferInstruction) -> WalletResult<CanonicalPayload> {
    let amount = &instruction.amount;
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WalletError::InvalidAmount(format!(
            "'{}' is not a decimal atom count",
            amount
        )));
    }

    let ou = effective_ou(&instruction.ou);
    let timestamp = normalize_timestamp(instruction.timestamp)?;

    Ok(CanonicalPayload(format!(
        r#"{{"from":{},"to_":{},"amount":{},"nonce":{},"ou":{},"timestamp":{}}}"#,
        json_string(instruction.from.as_str()),
        json_string(instruction.to.as_str()),
        json_string(amount),
        instruction.nonce,
        json_string(ou),
        timestamp,
    )))
}

fn effective_ou(ou: &str) -> &str {
    if ou.is_empty() {
        DEFAULT_OU
    } else {
        ou
    }
}

fn json_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Signed transfer ready for broadcast.
///
/// Fields are read-only; any change would invalidate the signature.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    signature: String,
    public_key: String,
    instruction: TransferInstruction,
    canonical: CanonicalPayload,
    timestamp: Number,
}

/// Sign an instruction with the sender's key.
///
/// The returned transaction carries the instruction with `ou` defaulted.
pub fn sign_transaction(
    mut instruction: TransferInstruction,
    keys: &KeyMaterial,
) -> WalletResult<SignedTransaction> {
    if &instruction.from != keys.address() {
        return Err(WalletError::SenderMismatch {
            from: instruction.from.to_string(),
            expected: keys.address().to_string(),
        });
    }

    instruction.ou = effective_ou(&instruction.ou).to_string();
    let canonical = build_canonical(&instruction)?;
    let timestamp = timestamp_number(instruction.timestamp)?;
    let signature = keys.sign(canonical.as_bytes());

    tracing::debug!(
        from = %instruction.from,
        to = %instruction.to,
        nonce = instruction.nonce,
        "Transaction signed"
    );

    Ok(SignedTransaction {
        signature: BASE64.encode(signature),
        public_key: keys.public_key_base64(),
        instruction,
        canonical,
        timestamp,
    })
}

/// JSON number carrying the same digits as the canonical timestamp.
///
/// Fails with `InvalidTimestamp` when JSON would render the value
/// differently (exponent form for very small fractions).
fn timestamp_number(timestamp: f64) -> WalletResult<Number> {
    // 2^64: every integral f64 below this converts to u64 exactly
    const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

    let canonical = normalize_timestamp(timestamp)?;
    let number = if timestamp.fract() == 0.0 && timestamp < U64_LIMIT {
        Number::from(timestamp as u64)
    } else {
        Number::from_f64(timestamp)
            .ok_or_else(|| WalletError::InvalidTimestamp(format!("{} is not finite", timestamp)))?
    };

    if number.to_string() != canonical {
        return Err(WalletError::InvalidTimestamp(format!(
            "{} has no plain JSON number form matching {}",
            number, canonical
        )));
    }
    Ok(number)
}

impl SignedTransaction {
    /// Base64 of the 64-byte signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Base64 of the 32-byte public key.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn instruction(&self) -> &TransferInstruction {
        &self.instruction
    }

    pub fn canonical(&self) -> &CanonicalPayload {
        &self.canonical
    }

    /// Check the signature against the embedded public key and payload.
    pub fn verify(&self) -> WalletResult<()> {
        let pk_bytes: [u8; PUBLIC_KEY_LEN] = decode_fixed(&self.public_key, "public key")?;
        let sig_bytes: [u8; SIGNATURE_LEN] = decode_fixed(&self.signature, "signature")?;

        let verifying_key =
            VerifyingKey::from_bytes(&pk_bytes).map_err(|_| WalletError::InvalidSignature)?;
        verifying_key
            .verify(self.canonical.as_bytes(), &Signature::from_bytes(&sig_bytes))
            .map_err(|_| WalletError::InvalidSignature)
    }

    /// Full set of fields the node expects, including `message`.
    pub fn broadcast_form(&self) -> BroadcastForm {
        BroadcastForm {
            from: self.instruction.from.to_string(),
            to: self.instruction.to.to_string(),
            amount: self.instruction.amount.clone(),
            nonce: self.instruction.nonce,
            ou: self.instruction.ou.clone(),
            timestamp: self.timestamp.clone(),
            signature: self.signature.clone(),
            public_key: self.public_key.clone(),
            message: self.instruction.message.clone(),
        }
    }
}

fn decode_fixed<const N: usize>(b64: &str, what: &str) -> WalletResult<[u8; N]> {
    let bytes = BASE64
        .decode(b64)
        .map_err(|e| WalletError::InvalidEncoding(format!("{} is not base64: {}", what, e)))?;
    bytes.as_slice().try_into().map_err(|_| {
        WalletError::InvalidEncoding(format!("{} must be {} bytes, got {}", what, N, bytes.len()))
    })
}

/// Wire submission object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastForm {
    pub from: String,
    #[serde(rename = "to_")]
    pub to: String,
    pub amount: String,
    pub nonce: u64,
    pub ou: String,
    pub timestamp: Number,
    pub signature: String,
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BroadcastForm {
    /// The same fields as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("from".into(), Value::from(self.from.clone()));
        map.insert("to_".into(), Value::from(self.to.clone()));
        map.insert("amount".into(), Value::from(self.amount.clone()));
        map.insert("nonce".into(), Value::from(self.nonce));
        map.insert("ou".into(), Value::from(self.ou.clone()));
        map.insert("timestamp".into(), Value::Number(self.timestamp.clone()));
        map.insert("signature".into(), Value::from(self.signature.clone()));
        map.insert("public_key".into(), Value::from(self.public_key.clone()));
        if let Some(message) = &self.message {
            map.insert("message".into(), Value::from(message.clone()));
        }
        map
    }
}
