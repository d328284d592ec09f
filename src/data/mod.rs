//! External data sources.
//!
//! Defines the `PriceSource` and `BalanceSource` traits consumed by the
//! core, plus the concrete HTTP price feed and file-backed balance source.

pub mod balances;
pub mod prices;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::types::PriceRecord;

/// Abstraction over the remote price feed.
///
/// One call returns every known quote, unordered, possibly with several
/// entries per currency. Any transport or decode failure is an `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_prices(&self) -> Result<Vec<PriceRecord>>;
}

/// Abstraction over wherever the holder's balances come from.
///
/// Returns the raw JSON document: it may not be an array, and the
/// ranker is responsible for tolerating that.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balances(&self) -> Result<Value>;
}
