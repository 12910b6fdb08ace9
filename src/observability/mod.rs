//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! wallet + ledger subsystems produce:
//!     → tracing events (structured fields, never seeds or passwords)
//!     → metrics.rs (submission and confirmation counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, filtered by RUST_LOG or config)
//!     → any `metrics` recorder the embedding application installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
