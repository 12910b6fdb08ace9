//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every section has defaults so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the wallet client.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WalletConfig {
    /// Ledger node connection settings.
    pub node: NodeConfig,

    /// Confirmation polling settings.
    pub confirmation: ConfirmationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger node connection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the node's HTTP API.
    pub rpc_url: String,

    /// Connect and per-request timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://octra.network".to_string(),
            connect_timeout_secs: 30,
        }
    }
}

impl NodeConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Confirmation polling.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Delay between transaction lookups in milliseconds.
    pub poll_interval_ms: u64,

    /// Overall wait before giving up, in seconds.
    pub timeout_secs: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            timeout_secs: 120,
        }
    }
}

impl ConfirmationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.node.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.confirmation.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.confirmation.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_partial_toml() {
        let config: WalletConfig = toml::from_str(
            r#"
            [confirmation]
            poll_interval_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.confirmation.poll_interval_ms, 500);
        assert_eq!(config.confirmation.timeout_secs, 120);
        assert_eq!(config.node, NodeConfig::default());
    }
}
