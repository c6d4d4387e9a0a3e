//! Configuration module
//!
//! Reads `config.toml` (default `~/.config/utility-pricing/config.toml`).
//! Every section and key is optional; missing values fall back to defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::ServiceCode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Default config location under the platform config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("utility-pricing")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub pagination: PaginationConfig,
    pub pricing: PricingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds the HTTP server may drain after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `utility_pricing=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: crate::shared::REQUESTS_PAGE_SIZE,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Billable services that may carry a tier ladder
    pub service_codes: Vec<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            service_codes: vec!["ELECTRIC".to_string(), "WATER".to_string()],
        }
    }
}

impl PricingConfig {
    pub fn codes(&self) -> Vec<ServiceCode> {
        self.service_codes.iter().map(ServiceCode::new).collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON array of tiers loaded into the in-memory store at startup
    pub seed_tiers_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }
        if self.pagination.default_page_size == 0 || self.pagination.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "pagination page sizes must be at least 1".into(),
            ));
        }
        if self.pagination.default_page_size > self.pagination.max_page_size {
            return Err(ConfigError::Invalid(
                "pagination.default_page_size exceeds max_page_size".into(),
            ));
        }
        if self
            .pricing
            .service_codes
            .iter()
            .all(|c| c.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "pricing.service_codes must name at least one service".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.pagination.default_page_size, 10);
        assert_eq!(
            config.pricing.codes(),
            vec![ServiceCode::new("ELECTRIC"), ServiceCode::new("WATER")]
        );
        assert!(config.storage.seed_tiers_path.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9100

            [logging]
            format = "json"

            [pricing]
            service_codes = ["electric", "water", "heating"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.address(), "0.0.0.0:9100");
        assert_eq!(config.server.shutdown_timeout, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.pricing.codes()[2], ServiceCode::new("HEATING"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml("[server]\nport = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[pricing]\nservice_codes = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[pagination]\ndefault_page_size = 500"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[logging]\nformat = \"xml\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/utility-pricing.toml")).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
