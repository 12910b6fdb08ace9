//! Octra wallet client library.
//!
//! # Architecture Overview
//!
//! ```text
//!   seed / keystore ──▶ wallet::keys ──▶ wallet::transaction ──▶ ledger::gateway ──▶ node
//!                           │                  (OTX-1 sign)           │
//!                           ▼                                         ▼
//!                    wallet::keystore                         ledger::confirm
//!                  (scrypt + AES-GCM)                     (poll until confirmed)
//!
//!   cross-cutting: config, observability, lifecycle (cancellation), error
//! ```

// Key custody and signing
pub mod wallet;

// Node interaction
pub mod ledger;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::WalletConfig;
pub use error::ErrorKind;
pub use ledger::{ConfirmationWaiter, HttpGateway, LedgerError, LedgerGateway};
pub use lifecycle::{CancelToken, Cancellation};
pub use wallet::{Address, KeyMaterial, KeystoreRecord, SignedTransaction, WalletError};
