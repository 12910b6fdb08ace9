//! Key custody and transaction encoding.
//!
//! # Data Flow
//! ```text
//! seed (generated, env var, or keystore)
//!     → keys.rs (KeyMaterial, Ed25519 signing)
//!     → address.rs ("oct" + base58(sha256(pubkey)))
//!     → keystore.rs (scrypt + AES-256-GCM at rest)
//!     → transaction.rs (OTX-1 canonical payload, signature, broadcast form)
//! ```
//!
//! # Security Constraints
//! - Seeds and passwords are never logged
//! - Seeds are zeroized when key material is dropped
//! - Decrypt failures never distinguish wrong password from corruption

pub mod address;
pub mod amount;
pub mod keys;
pub mod keystore;
pub mod transaction;
pub mod typed_data;
pub mod types;

pub use address::{derive_address, Address};
pub use amount::{from_atoms, to_atoms};
pub use keys::KeyMaterial;
pub use keystore::KeystoreRecord;
pub use transaction::{
    build_canonical, sign_transaction, BroadcastForm, CanonicalPayload, SignedTransaction,
    TransferInstruction,
};
pub use types::{WalletError, WalletResult};
