//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Caller (or Ctrl-C in the CLI) → Cancellation::cancel
//!     → every CancelToken resolves
//!     → ConfirmationWaiter stops at its next await point
//! ```
//!
//! # Design Decisions
//! - Backed by a watch channel so late subscribers still see the signal
//! - Cancelling is idempotent

pub mod cancel;

pub use cancel::{CancelToken, Cancellation};
