//! Configuration management for spendguard
//!
//! This module handles loading, validation, and management of
//! spendguard configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Data storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataConfig {
    /// Path to the JSON snapshot file backing the document store.
    /// An empty path keeps the store purely in-memory.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: PathBuf,
}

fn default_snapshot_file() -> PathBuf {
    PathBuf::from("./data/spendguard.json")
}

/// Fraud classifier service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudConfig {
    /// Base URL of the external classification service
    #[serde(default = "default_fraud_url")]
    pub service_url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_fraud_timeout")]
    pub timeout_ms: u64,
    /// Disable to skip the outbound call and store the default verdict
    #[serde(default = "default_true")]
    pub enable: bool,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            service_url: default_fraud_url(),
            timeout_ms: default_fraud_timeout(),
            enable: true,
        }
    }
}

fn default_fraud_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

fn default_fraud_timeout() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page when the request does not specify a limit
    #[serde(default = "default_page_size")]
    pub default_limit: usize,
    /// Upper bound on the per-request limit
    #[serde(default = "default_max_page_size")]
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_size(),
            max_limit: default_max_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    100
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data storage settings
    #[serde(default)]
    pub data: DataConfig,
    /// Fraud classifier settings
    #[serde(default)]
    pub fraud: FraudConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_string_lossy().to_string(),
                }
            } else {
                ConfigError::IoError
            }
        })?;

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidYaml {
                message: e.to_string(),
            })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.pagination.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_limit".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.pagination.max_limit < self.pagination.default_limit {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_limit".to_string(),
                reason: "Maximum page size must not be below the default".to_string(),
            });
        }

        if self.fraud.enable && self.fraud.service_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "fraud.service_url".to_string(),
                reason: "Service URL is required while the fraud check is enabled".to_string(),
            });
        }

        if self.fraud.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fraud.timeout_ms".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.pagination.max_limit, 100);
        assert!(config.fraud.enable);
        assert_eq!(config.fraud.timeout_ms, 5000);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
server:
  port: 8080
fraud:
  service_url: "http://ai.internal:9000"
  timeout_ms: 1500
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.fraud.service_url, "http://ai.internal:9000");
        assert_eq!(config.fraud.timeout_ms, 1500);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::InvalidValue);
    }

    #[test]
    fn test_validate_rejects_empty_fraud_url() {
        let mut config = Config::default();
        config.fraud.service_url = String::new();
        assert!(config.validate().is_err());

        // Acceptable once the check is disabled
        config.fraud.enable = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_limits() {
        let mut config = Config::default();
        config.pagination.default_limit = 50;
        config.pagination.max_limit = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_template_parses() {
        let config: Config = serde_yaml::from_str(Config::generate_default()).unwrap();
        assert!(config.validate().is_ok());
    }
}
