//! Token-to-token conversion at current prices.
//!
//! Conversion never fails outright. Unusable input yields an empty string
//! and missing prices pass the input amount through unconverted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use super::cache::PriceCache;
use crate::types::{PriceMap, WalletError};

/// Converted amounts carry six decimals.
pub const CONVERSION_DECIMALS: usize = 6;

/// Parse a user-entered amount. Only finite, strictly positive numbers pass.
pub fn parse_amount(amount: &str) -> Result<f64, WalletError> {
    let value: f64 = amount
        .trim()
        .parse()
        .map_err(|_| WalletError::InvalidInput(format!("not a number: {amount:?}")))?;

    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(WalletError::InvalidInput(format!("not a positive amount: {amount:?}")))
    }
}

/// Convert against an already-fetched price map.
pub fn convert_with(prices: &PriceMap, from: &str, to: &str, amount: &str) -> String {
    let value = match parse_amount(amount) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "Nothing to convert");
            return String::new();
        }
    };

    if from == to {
        return amount.to_string();
    }

    let (from_price, to_price) = match (price(prices, from), price(prices, to)) {
        (Ok(f), Ok(t)) => (f, t),
        (Err(e), _) | (_, Err(e)) => {
            debug!(from, to, error = %e, "Passing amount through unconverted");
            return amount.to_string();
        }
    };

    format!("{:.*}", CONVERSION_DECIMALS, value * from_price / to_price)
}

/// A usable price for `currency`. Zero, negative and non-finite prices
/// count as missing.
fn price(prices: &PriceMap, currency: &str) -> Result<f64, WalletError> {
    prices
        .get(currency)
        .copied()
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| WalletError::MissingPrice(currency.to_string()))
}

/// Converts amounts using prices from a shared [`PriceCache`].
#[derive(Clone)]
pub struct CurrencyConverter {
    cache: PriceCache,
}

impl CurrencyConverter {
    pub fn new(cache: PriceCache) -> Self {
        Self { cache }
    }

    /// Convert `amount` of `from` into `to`.
    ///
    /// Input is validated before the cache is touched, and identical tokens
    /// short-circuit, so neither case can trigger a fetch.
    pub async fn convert(&self, from: &str, to: &str, amount: &str) -> String {
        if parse_amount(amount).is_err() || from == to {
            return convert_with(&PriceMap::new(), from, to, amount);
        }
        let prices = self.cache.get_prices().await;
        convert_with(&prices, from, to, amount)
    }
}

// ---------------------------------------------------------------------------
// Last-write-wins result slot
// ---------------------------------------------------------------------------

/// Identifies one conversion request. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QuoteTicket(u64);

/// Holds the visible conversion result for one input form.
///
/// Every input change takes a ticket with [`begin`](Self::begin). A result
/// is only published if no newer ticket has been issued in the meantime,
/// so a slow conversion can't overwrite the output of a faster, newer one.
#[derive(Debug, Default)]
pub struct QuoteTracker {
    latest: AtomicU64,
    current: Mutex<Option<String>>,
}

impl QuoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> QuoteTicket {
        QuoteTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: QuoteTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Store `value` if `ticket` is still the newest. Returns whether it was stored.
    pub fn publish(&self, ticket: QuoteTicket, value: String) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        // Checked under the lock so a newer publish can't interleave.
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, "Discarding stale conversion result");
            return false;
        }
        *current = Some(value);
        true
    }

    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run a conversion and publish it unless superseded while suspended.
    /// Returns the published value, or `None` if the result was stale.
    pub async fn quote(
        &self,
        converter: &CurrencyConverter,
        from: &str,
        to: &str,
        amount: &str,
    ) -> Option<String> {
        let ticket = self.begin();
        let converted = converter.convert(from, to, amount).await;
        if self.publish(ticket, converted.clone()) {
            Some(converted)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
