//! Shared price cache.
//!
//! Wraps a [`PriceSource`] with three guarantees:
//!
//! - one price per currency, the highest quote seen in a fetch;
//! - a validity window (5 minutes by default) during which the source is
//!   not contacted again;
//! - single-flight: callers arriving while a fetch is in progress await
//!   that same fetch instead of starting another one.
//!
//! Fetch failures never reach the caller. They resolve to an empty map and
//! leave nothing cached, so the next call tries again.
//!
//! `PriceCache` is a cheap handle; clone it into every component that
//! needs prices. The fetch-completion path is the only writer. Fetches run
//! on their own task, so a caller that gives up does not stall them.

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::data::PriceSource;
use crate::types::{PriceMap, PriceRecord, WalletError};

/// Default validity window for a successful fetch.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    pub ttl: Duration,
    /// Upper bound on a single fetch. `None` waits for the source however
    /// long it takes.
    pub fetch_timeout: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            fetch_timeout: None,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// A successful fetch. Replaced wholesale, never patched.
#[derive(Debug, Clone)]
pub struct PriceCacheEntry {
    pub prices_by_currency: Arc<PriceMap>,
    /// Monotonic fetch time, used for expiry.
    pub fetched_at: Instant,
    /// Wall-clock fetch time, for reporting.
    pub fetched_at_utc: DateTime<Utc>,
}

impl PriceCacheEntry {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) > ttl
    }
}

/// Hit/fetch counters for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Fetches started against the source.
    pub fetches: u64,
    /// Calls answered from a valid entry.
    pub hits: u64,
    /// Calls that attached to a fetch already in flight.
    pub coalesced: u64,
    /// Fetches that failed and resolved to an empty map.
    pub failures: u64,
}

type PendingFetch = Shared<BoxFuture<'static, Arc<PriceMap>>>;

#[derive(Default)]
struct CacheState {
    entry: Option<PriceCacheEntry>,
    pending: Option<PendingFetch>,
    stats: CacheStats,
}

struct Inner {
    source: Arc<dyn PriceSource>,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl Inner {
    // The lock is never held across an await, so a poisoned mutex only
    // means a panic elsewhere mid-update; the state itself is still whole.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PriceCache {
    inner: Arc<Inner>,
}

impl PriceCache {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    pub fn with_config(source: Arc<dyn PriceSource>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                config,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    /// Current prices, fetching first if nothing valid is cached.
    ///
    /// Never fails: an unreachable source yields an empty map.
    pub async fn get_prices(&self) -> Arc<PriceMap> {
        let pending = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;

            if let Some(entry) = &state.entry {
                if !entry.is_expired(self.inner.config.ttl, Instant::now()) {
                    let prices = Arc::clone(&entry.prices_by_currency);
                    state.stats.hits += 1;
                    return prices;
                }
            }

            match &state.pending {
                Some(fetch) => {
                    let fetch = fetch.clone();
                    state.stats.coalesced += 1;
                    debug!("Joining in-flight price fetch");
                    fetch
                }
                None => {
                    let fetch = spawn_fetch(Arc::clone(&self.inner));
                    state.pending = Some(fetch.clone());
                    state.stats.fetches += 1;
                    fetch
                }
            }
        };

        pending.await
    }

    /// Price of a single currency, fetching if needed.
    pub async fn price_of(&self, currency: &str) -> Option<f64> {
        self.get_prices().await.get(currency).copied()
    }

    /// The last successful fetch, even if expired. Never contacts the source.
    pub fn snapshot(&self) -> Option<PriceCacheEntry> {
        self.inner.lock().entry.clone()
    }

    /// Whether a fetch is currently in flight.
    pub fn is_fetching(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    /// Forget the cached entry so the next call refetches. An in-flight
    /// fetch is left alone and will still store its result.
    pub fn invalidate(&self) {
        let mut state = self.inner.lock();
        if state.entry.take().is_some() {
            debug!("Price cache invalidated");
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }
}

/// Start a fetch on its own task. It runs to completion and stores its
/// result even if every caller awaiting it is dropped.
fn spawn_fetch(inner: Arc<Inner>) -> PendingFetch {
    let handle = tokio::spawn(fetch_and_store(Arc::clone(&inner)));
    async move {
        match handle.await {
            Ok(prices) => prices,
            Err(e) => {
                let mut state = inner.lock();
                state.pending = None;
                state.stats.failures += 1;
                warn!(error = %e, "Price fetch task aborted, serving empty prices");
                Arc::new(PriceMap::new())
            }
        }
    }
    .boxed()
    .shared()
}

/// Run one fetch against the source and publish the outcome.
async fn fetch_and_store(inner: Arc<Inner>) -> Arc<PriceMap> {
    let result = fetch_records(&inner).await;

    let mut state = inner.lock();
    state.pending = None;

    match result {
        Ok(records) => {
            let prices = Arc::new(build_price_map(&records));
            info!(
                quotes = records.len(),
                currencies = prices.len(),
                "Price cache refreshed"
            );
            state.entry = Some(PriceCacheEntry {
                prices_by_currency: Arc::clone(&prices),
                fetched_at: Instant::now(),
                fetched_at_utc: Utc::now(),
            });
            prices
        }
        Err(e) => {
            state.stats.failures += 1;
            warn!(error = %e, "Price fetch failed, serving empty prices");
            Arc::new(PriceMap::new())
        }
    }
}

async fn fetch_records(inner: &Inner) -> Result<Vec<PriceRecord>, WalletError> {
    let fetch = inner.source.fetch_prices();
    let result = match inner.config.fetch_timeout {
        Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| {
            WalletError::SourceUnavailable(format!("no response within {}ms", limit.as_millis()))
        })?,
        None => fetch.await,
    };
    result.map_err(|e| WalletError::SourceUnavailable(format!("{e:#}")))
}

/// Collapse raw quotes into one price per currency, keeping the highest.
///
/// Quotes that are not finite and positive are ignored, so a currency
/// whose only quotes are unusable has no entry at all.
pub fn build_price_map(records: &[PriceRecord]) -> PriceMap {
    let mut prices = PriceMap::with_capacity(records.len());
    for record in records {
        if !(record.price.is_finite() && record.price > 0.0) {
            debug!(currency = %record.currency, price = record.price, "Ignoring unusable quote");
            continue;
        }
        prices
            .entry(record.currency.clone())
            .and_modify(|p| *p = p.max(record.price))
            .or_insert(record.price);
    }
    prices
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
