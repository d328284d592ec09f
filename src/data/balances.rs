//! File-backed balance source.
//!
//! Reads a JSON document from disk on every call, so edits to the file
//! show up on the next ranking pass.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

use super::BalanceSource;

pub const DEFAULT_BALANCES_FILE: &str = "balances.json";

pub struct FileBalanceSource {
    path: PathBuf,
}

impl FileBalanceSource {
    pub fn new(path: Option<&str>) -> Self {
        Self {
            path: PathBuf::from(path.unwrap_or(DEFAULT_BALANCES_FILE)),
        }
    }
}

#[async_trait]
impl BalanceSource for FileBalanceSource {
    async fn fetch_balances(&self) -> Result<Value> {
        let path = self.path.display().to_string();
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read balances from {path}"))?;

        let value: Value = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse balances from {path}"))?;

        debug!(path, "Balances loaded");
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
