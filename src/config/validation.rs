//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Check the node URL is an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WalletConfig → Result<(), Vec<ValidationError>>

use crate::config::schema::WalletConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &WalletConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.node.rpc_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError {
            field: "node.rpc_url",
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: "node.rpc_url",
            message: format!("invalid URL '{}': {}", config.node.rpc_url, e),
        }),
    }

    if config.node.connect_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "node.connect_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError {
            field: "confirmation.poll_interval_ms",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.confirmation.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "confirmation.timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
