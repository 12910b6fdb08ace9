//! Error classification shared by the wallet and ledger subsystems.
//!
//! Each subsystem owns its own `thiserror` enum; `ErrorKind` groups their
//! variants into the categories callers branch on.

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed key, seed, address, amount or record.
    InvalidInput,
    /// Authentication failure (decrypt or signature check).
    CryptoFailure,
    /// The secure random source could not supply bytes.
    EntropyUnavailable,
    /// Network error or per-call timeout talking to the ledger.
    TransportFailure,
    /// The ledger answered with an error status.
    Rejected,
    /// Confirmation deadline passed.
    Timeout,
    /// The caller aborted the operation.
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::CryptoFailure => "crypto failure",
            ErrorKind::EntropyUnavailable => "entropy unavailable",
            ErrorKind::TransportFailure => "transport failure",
            ErrorKind::Rejected => "rejected",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}
