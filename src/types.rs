//! Shared types for WALLETBOARD.
//!
//! The data model used by the portfolio, pricing and dashboard modules.
//! Nothing here performs I/O.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Currency symbol → USD price. One entry per currency.
pub type PriceMap = HashMap<String, f64>;

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

/// A raw token balance as reported by the balance source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub currency: String,
    pub amount: f64,
    pub blockchain: String,
}

impl WalletBalance {
    pub fn new(currency: &str, amount: f64, blockchain: &str) -> Self {
        Self {
            currency: currency.to_string(),
            amount,
            blockchain: blockchain.to_string(),
        }
    }
}

impl fmt::Display for WalletBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.amount, self.currency, self.blockchain)
    }
}

/// A balance that survived ranking, tagged with its chain priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBalance {
    pub currency: String,
    pub amount: f64,
    pub blockchain: String,
    pub priority: i32,
}

/// A display-ready row handed to the render sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub currency: String,
    pub blockchain: String,
    /// Raw amount, unformatted.
    pub amount: f64,
    pub priority: i32,
    /// Amount with exactly two decimals.
    pub formatted_amount: String,
    /// `price * amount`, or 0 when no price is known.
    pub usd_value: f64,
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// One quote as returned by the remote price feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub currency: String,
    /// Quote timestamp as sent by the feed (ISO-like, not parsed).
    #[serde(default)]
    pub date: String,
    pub price: f64,
}

impl PriceRecord {
    pub fn new(currency: &str, date: &str, price: f64) -> Self {
        Self {
            currency: currency.to_string(),
            date: date.to_string(),
            price,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain errors. None of them are fatal: each has a local recovery path
/// (empty output, passthrough, zero substitution or empty price map).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalletError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No price available for {0}")]
    MissingPrice(String),

    #[error("Price source unavailable: {0}")]
    SourceUnavailable(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
