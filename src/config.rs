//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! field has a default, so a partial (or missing) file is fine. The price
//! feed URL can be overridden with `WALLETBOARD_PRICES_URL`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::data::balances::DEFAULT_BALANCES_FILE;
use crate::data::prices::DEFAULT_PRICES_URL;
use crate::pricing::CacheConfig;

/// Environment variable that overrides `price_source.url`.
pub const PRICES_URL_ENV: &str = "WALLETBOARD_PRICES_URL";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub price_source: PriceSourceConfig,
    pub cache: CacheSettings,
    pub balances: BalancesConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PriceSourceConfig {
    pub url: String,
    /// Deadline for one fetch. Absent means no deadline.
    pub timeout_secs: Option<u64>,
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PRICES_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BalancesConfig {
    pub path: String,
}

impl Default for BalancesConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_BALANCES_FILE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(PRICES_URL_ENV) {
            if !url.trim().is_empty() {
                self.price_source.url = url;
            }
        }
        self
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            fetch_timeout: self.price_source.timeout_secs.map(Duration::from_secs),
        }
    }
}
