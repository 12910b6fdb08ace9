//! Ledger node interaction.
//!
//! # Data Flow
//! ```text
//! SignedTransaction::broadcast_form
//!     → gateway.rs (LedgerGateway trait; client.rs is the HTTP impl)
//!     → POST /send-tx → SubmitReceipt { tx_hash }
//!     → confirm.rs (poll GET /tx/{hash} until confirmed, deadline or cancel)
//!     → TxRecord
//! ```
//!
//! # Design Decisions
//! - The transport handle is built once and passed explicitly
//! - Responses are read field by field; unknown fields are ignored
//! - Submissions are never retried automatically
//! - History resolution is the only place that swallows per-item errors

pub mod client;
pub mod confirm;
pub mod gateway;
pub mod history;
pub mod transfer;
pub mod types;

pub use client::HttpGateway;
pub use confirm::{ConfirmationState, ConfirmationWaiter};
pub use gateway::LedgerGateway;
pub use history::{get_history, get_stats};
pub use transfer::{prepare_transfer, submit_and_confirm, TransferOutcome};
pub use types::{
    BalanceInfo, HistoryEntry, LedgerError, LedgerResult, SubmitReceipt, TxRecord, TxReference,
    WalletStats,
};
