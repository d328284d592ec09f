//! Mock price feed for integration testing.
//!
//! A deterministic `PriceSource` that returns controllable quotes after an
//! optional delay, counts every call, and can be told to fail. All state is
//! in-memory with no external dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use walletboard::data::PriceSource;
use walletboard::types::PriceRecord;

/// A mock price feed. Cloning shares all state, so tests can keep a
/// handle after moving one into the cache.
#[derive(Clone)]
pub struct MockPriceFeed {
    records: Arc<Mutex<Vec<PriceRecord>>>,
    calls: Arc<AtomicUsize>,
    delay: Duration,
    /// If set, every fetch returns this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockPriceFeed {
    /// Feed with the default quotes and no delay.
    pub fn new() -> Self {
        Self::with_records(Self::default_records())
    }

    pub fn with_records(records: Vec<PriceRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Make every fetch take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_records(&self, records: Vec<PriceRecord>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// Number of fetches the feed has received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A feed snapshot shaped like the real one: unordered, with a
    /// duplicated currency.
    pub fn default_records() -> Vec<PriceRecord> {
        vec![
            PriceRecord::new("USDC", "2023-08-29T07:10:30.000Z", 1.0),
            PriceRecord::new("BTC", "2023-08-29T07:10:40.000Z", 30000.0),
            PriceRecord::new("ETH", "2023-08-29T07:10:52.000Z", 2000.0),
            PriceRecord::new("OSMO", "2023-08-29T07:10:40.000Z", 0.5),
            PriceRecord::new("BTC", "2023-08-29T07:10:44.000Z", 31000.0),
            PriceRecord::new("ATOM", "2023-08-29T07:10:50.000Z", 7.2),
        ]
    }
}

#[async_trait]
impl PriceSource for MockPriceFeed {
    async fn fetch_prices(&self) -> Result<Vec<PriceRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(self.records.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mock_feed_returns_records() {
    let feed = MockPriceFeed::new();
    let records = feed.fetch_prices().await.unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(feed.calls(), 1);
}

#[tokio::test]
async fn test_mock_feed_forced_error() {
    let feed = MockPriceFeed::new();
    feed.set_error("connection reset");
    let err = feed.fetch_prices().await.unwrap_err();
    assert!(err.to_string().contains("connection reset"));

    feed.clear_error();
    assert!(feed.fetch_prices().await.is_ok());
    assert_eq!(feed.calls(), 2);
}
