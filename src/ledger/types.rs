//! Ledger response types and error definitions.
//!
//! Node responses are free-form JSON. Instead of deserializing them into a
//! rigid schema, each type pulls out only the named fields it needs and
//! ignores everything else.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::wallet::types::WalletError;

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Network failure or per-call timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Node answered with an error status. `reason` is the raw body.
    #[error("rpc error [{status}]: {reason}")]
    Rejected { status: u16, reason: String },

    /// Response lacked a field this client depends on.
    #[error("Malformed ledger response: {0}")]
    Decode(String),

    #[error("Insufficient balance: have {available} atoms, need {requested}")]
    InsufficientFunds { available: u64, requested: u64 },

    /// Confirmation deadline passed.
    #[error("Transaction not confirmed within {0:?}")]
    Timeout(Duration),

    /// Caller cancelled the wait.
    #[error("Confirmation wait cancelled")]
    Cancelled,

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl LedgerError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Transport(_) | LedgerError::Decode(_) => ErrorKind::TransportFailure,
            LedgerError::Rejected { .. } => ErrorKind::Rejected,
            LedgerError::InsufficientFunds { .. } => ErrorKind::InvalidInput,
            LedgerError::Timeout(_) => ErrorKind::Timeout,
            LedgerError::Cancelled => ErrorKind::Cancelled,
            LedgerError::Wallet(e) => e.kind(),
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Read a field as text, accepting JSON strings and numbers.
fn field_text(doc: &Value, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a field as `u64`, accepting JSON numbers and numeric strings.
fn field_u64(doc: &Value, key: &str) -> Option<u64> {
    match doc.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Balance and nonce of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceInfo {
    pub address: String,
    /// Display units, as rendered by the node.
    pub balance: String,
    /// Atoms, as decimal text.
    pub balance_raw: String,
    pub has_public_key: bool,
    /// Last nonce used by this address. Submit `nonce + 1`.
    pub nonce: u64,
}

impl BalanceInfo {
    pub fn from_value(address: &str, doc: &Value) -> LedgerResult<Self> {
        let nonce = field_u64(doc, "nonce")
            .ok_or_else(|| LedgerError::Decode("balance response has no nonce".to_string()))?;

        Ok(Self {
            address: field_text(doc, "address").unwrap_or_else(|| address.to_string()),
            balance: field_text(doc, "balance").unwrap_or_else(|| "0".to_string()),
            balance_raw: field_text(doc, "balance_raw").unwrap_or_else(|| "0".to_string()),
            has_public_key: doc
                .get("has_public_key")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            nonce,
        })
    }

    /// Nonce the next submission must carry.
    ///
    /// A node reporting `u64::MAX` has no next nonce; wrapping to 0 would
    /// reuse one, so that is a `Decode` error.
    pub fn next_nonce(&self) -> LedgerResult<u64> {
        self.nonce.checked_add(1).ok_or_else(|| {
            LedgerError::Decode(format!("nonce {} of {} has no successor", self.nonce, self.address))
        })
    }

    pub fn balance_atoms(&self) -> LedgerResult<u64> {
        self.balance_raw.trim().parse().map_err(|_| {
            LedgerError::Decode(format!("balance_raw '{}' is not an atom count", self.balance_raw))
        })
    }
}

/// Node acknowledgement of a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub tx_hash: String,
    pub raw: Value,
}

impl SubmitReceipt {
    pub fn from_value(doc: Value) -> LedgerResult<Self> {
        let tx_hash = field_text(&doc, "tx_hash")
            .ok_or_else(|| LedgerError::Decode("transaction not accepted: no tx_hash".to_string()))?;
        Ok(Self { tx_hash, raw: doc })
    }
}

/// Decoded `parsed_tx` section of a transaction lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTx {
    pub from: String,
    pub to: String,
    pub amount: String,
    pub timestamp: String,
}

/// Transaction lookup result.
#[derive(Debug, Clone, PartialEq)]
pub struct TxRecord {
    pub status: Option<String>,
    /// Present and non-null once the transaction is in an epoch.
    pub epoch: Option<Value>,
    pub parsed: Option<ParsedTx>,
    /// Full response document.
    pub raw: Value,
}

impl TxRecord {
    pub fn from_value(doc: Value) -> Self {
        let status = field_text(&doc, "status");
        let epoch = doc.get("epoch").filter(|e| !e.is_null()).cloned();
        let parsed = doc
            .get("parsed_tx")
            .filter(|p| p.is_object())
            .map(|p| ParsedTx {
                from: field_text(p, "from").unwrap_or_default(),
                to: field_text(p, "to").unwrap_or_default(),
                amount: field_text(p, "amount").unwrap_or_default(),
                timestamp: field_text(p, "timestamp").unwrap_or_default(),
            });

        Self {
            status,
            epoch,
            parsed,
            raw: doc,
        }
    }

    /// Either signal suffices: `status == "confirmed"` or an epoch is set.
    pub fn is_confirmed(&self) -> bool {
        self.status.as_deref() == Some("confirmed") || self.epoch.is_some()
    }

    pub fn epoch_number(&self) -> Option<u64> {
        match self.epoch.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Entry of an address's recent-transactions listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReference {
    pub hash: String,
    pub epoch: Option<u64>,
}

impl TxReference {
    /// Parse the `recent_transactions` array of an address listing.
    ///
    /// Entries without a hash are dropped.
    pub fn list_from_value(doc: &Value) -> LedgerResult<Vec<Self>> {
        let items = match doc.get("recent_transactions") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(other) => {
                return Err(LedgerError::Decode(format!(
                    "recent_transactions is not a list: {}",
                    other
                )))
            }
        };

        Ok(items
            .iter()
            .filter_map(|item| {
                Some(Self {
                    hash: field_text(item, "hash")?,
                    epoch: field_u64(item, "epoch"),
                })
            })
            .collect())
    }
}

/// Resolved history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub hash: String,
    pub epoch: Option<u64>,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub timestamp: String,
    pub status: String,
}

/// Client-side aggregate over recent history. Not authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletStats {
    pub total_in: u128,
    pub total_out: u128,
    pub tx_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_balance_extraction() {
        let doc = json!({
            "address": "octA",
            "balance": "1.5",
            "balance_raw": "1500000",
            "has_public_key": true,
            "nonce": 7,
            "pending": ["ignored"]
        });
        let info = BalanceInfo::from_value("octA", &doc).unwrap();
        assert_eq!(info.nonce, 7);
        assert_eq!(info.next_nonce().unwrap(), 8);
        assert_eq!(info.balance_atoms().unwrap(), 1_500_000);
        assert!(info.has_public_key);
    }

    #[test]
    fn test_balance_accepts_numeric_fields() {
        let doc = json!({"balance": 2, "balance_raw": 2000000, "nonce": "3"});
        let info = BalanceInfo::from_value("octB", &doc).unwrap();
        assert_eq!(info.address, "octB");
        assert_eq!(info.balance_raw, "2000000");
        assert_eq!(info.nonce, 3);
    }

    #[test]
    fn test_exhausted_nonce_has_no_successor() {
        let doc = json!({"balance_raw": "10", "nonce": u64::MAX});
        let info = BalanceInfo::from_value("octA", &doc).unwrap();
        assert!(matches!(info.next_nonce(), Err(LedgerError::Decode(_))));

        let doc = json!({"balance_raw": "10", "nonce": u64::MAX - 1});
        let info = BalanceInfo::from_value("octA", &doc).unwrap();
        assert_eq!(info.next_nonce().unwrap(), u64::MAX);
    }

    #[test]
    fn test_balance_requires_nonce() {
        let err = BalanceInfo::from_value("octA", &json!({"balance": "1"})).unwrap_err();
        assert!(matches!(err, LedgerError::Decode(_)));
    }

    #[test]
    fn test_confirmation_signals() {
        let pending = TxRecord::from_value(json!({"status": "pending", "epoch": null}));
        assert!(!pending.is_confirmed());

        let by_status = TxRecord::from_value(json!({"status": "confirmed"}));
        assert!(by_status.is_confirmed());

        let by_epoch = TxRecord::from_value(json!({"status": "pending", "epoch": 42}));
        assert!(by_epoch.is_confirmed());
        assert_eq!(by_epoch.epoch_number(), Some(42));
    }

    #[test]
    fn test_parsed_tx_extraction() {
        let record = TxRecord::from_value(json!({
            "parsed_tx": {"from": "octA", "to": "octB", "amount": "1.5 OCT", "timestamp": 1737273600.5}
        }));
        let parsed = record.parsed.unwrap();
        assert_eq!(parsed.to, "octB");
        assert_eq!(parsed.timestamp, "1737273600.5");
    }

    #[test]
    fn test_submit_receipt_requires_hash() {
        assert!(SubmitReceipt::from_value(json!({"tx_hash": "abc"})).is_ok());
        assert!(matches!(
            SubmitReceipt::from_value(json!({"status": "ok"})),
            Err(LedgerError::Decode(_))
        ));
    }

    #[test]
    fn test_reference_listing() {
        let doc = json!({"recent_transactions": [
            {"hash": "h1", "epoch": 5},
            {"epoch": 6},
            {"hash": "h3"}
        ]});
        let refs = TxReference::list_from_value(&doc).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].epoch, Some(5));
        assert_eq!(refs[1].hash, "h3");

        assert!(TxReference::list_from_value(&json!({})).unwrap().is_empty());
        assert!(TxReference::list_from_value(&json!({"recent_transactions": 1})).is_err());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(LedgerError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            LedgerError::Rejected { status: 400, reason: "bad nonce".into() }.kind(),
            ErrorKind::Rejected
        );
        assert_eq!(
            LedgerError::from(WalletError::InvalidPassword).kind(),
            ErrorKind::CryptoFailure
        );
        let err = LedgerError::Rejected { status: 400, reason: "bad nonce".into() };
        assert_eq!(err.to_string(), "rpc error [400]: bad nonce");
    }
}
