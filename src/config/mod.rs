//! Configuration management for ntpscout
//!
//! This module handles loading and validating configuration from environment
//! variables with sensible defaults for every field.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default catalog endpoint
pub const DEFAULT_CATALOG_URL: &str = "https://dns.icoa.cn/ntp/";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog fetching configuration
    pub catalog: CatalogConfig,

    /// Probe configuration
    pub probe: ProbeConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Catalog-fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog page URL
    pub url: String,

    /// Fetch timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Maximum retry attempts for retryable HTTP failures
    pub max_retries: u32,
}

/// Probe-stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Number of concurrent probe workers
    pub max_workers: usize,

    /// Per-probe connect timeout in seconds
    pub timeout_secs: u64,

    /// How many best servers to report
    pub top_n: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("NTPSCOUT_CATALOG_URL")
            .unwrap_or_else(|_| String::from(DEFAULT_CATALOG_URL));

        let fetch_timeout_secs = std::env::var("NTPSCOUT_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let max_retries = std::env::var("NTPSCOUT_FETCH_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(2);

        let max_workers = std::env::var("NTPSCOUT_MAX_WORKERS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let timeout_secs = std::env::var("NTPSCOUT_PROBE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3);

        let top_n = std::env::var("NTPSCOUT_TOP_N")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(5);

        let level = std::env::var("NTPSCOUT_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let format = std::env::var("NTPSCOUT_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        let config = Self {
            catalog: CatalogConfig {
                url,
                fetch_timeout_secs,
                max_retries,
            },
            probe: ProbeConfig {
                max_workers,
                timeout_secs,
                top_n,
            },
            logging: LoggingConfig { level, format },
        };

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.catalog.url)
            .with_context(|| format!("Invalid catalog URL: {}", self.catalog.url))?;

        if self.catalog.fetch_timeout_secs == 0 {
            bail!("Fetch timeout must be at least 1 second");
        }

        if self.probe.max_workers == 0 {
            bail!("Probe worker count must be at least 1");
        }

        if self.probe.timeout_secs == 0 {
            bail!("Probe timeout must be at least 1 second");
        }

        Ok(())
    }

    /// Catalog fetch timeout as a [`Duration`]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.fetch_timeout_secs)
    }

    /// Per-probe connect timeout as a [`Duration`]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                url: String::from(DEFAULT_CATALOG_URL),
                fetch_timeout_secs: 10,
                max_retries: 2,
            },
            probe: ProbeConfig {
                max_workers: 10,
                timeout_secs: 3,
                top_n: 5,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.url, DEFAULT_CATALOG_URL);
        assert_eq!(config.probe.max_workers, 10);
        assert_eq!(config.probe_timeout(), Duration::from_secs(3));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = Config::default();
        config.catalog.url = String::from("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default();
        config.probe.max_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.probe.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
