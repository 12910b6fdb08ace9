//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse, deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → WalletConfig (validated, immutable)
//!     → passed explicitly to the gateway and waiter
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - No global config; callers hold and pass the value

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{default_config, load_config, ConfigError};
pub use schema::{ConfirmationConfig, NodeConfig, ObservabilityConfig, WalletConfig};
pub use validation::{validate_config, ValidationError};
