//! HTTP price feed.
//!
//! Fetches a flat JSON array of `{currency, date, price}` quotes.
//!
//! Default feed: `https://interview.switcheo.com/prices.json`
//! Auth: none.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::PriceSource;
use crate::types::PriceRecord;

pub const DEFAULT_PRICES_URL: &str = "https://interview.switcheo.com/prices.json";

/// Per-request timeout on the HTTP client itself.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub struct HttpPriceSource {
    http: Client,
    url: String,
}

impl HttpPriceSource {
    pub fn new(url: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .user_agent("WALLETBOARD/0.1.0")
            .build()
            .context("Failed to build HTTP client for price feed")?;

        Ok(Self {
            http,
            url: url.unwrap_or_else(|| DEFAULT_PRICES_URL.to_string()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_prices(&self) -> Result<Vec<PriceRecord>> {
        debug!(url = %self.url, "Fetching prices");

        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Price feed request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Price feed error {status}: {body}");
        }

        let records: Vec<PriceRecord> = resp
            .json()
            .await
            .context("Failed to parse price feed response")?;

        debug!(count = records.len(), "Price feed returned quotes");
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
