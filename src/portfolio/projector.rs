//! Row projection: ranked balance + prices → display row.

use std::collections::HashMap;
use tracing::warn;

use crate::types::{DisplayRow, PriceMap, RankedBalance};

/// Display amounts carry two decimals.
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// USD value of `amount` units of `currency`, or 0 with a warning when
/// the price is missing or unusable.
pub fn usd_value(currency: &str, amount: f64, prices: &PriceMap) -> f64 {
    match prices.get(currency) {
        Some(price) if price.is_finite() => price * amount,
        _ => {
            warn!(currency, "Price not available, valuing at 0");
            0.0
        }
    }
}

pub fn project(balance: &RankedBalance, prices: &PriceMap) -> DisplayRow {
    DisplayRow {
        currency: balance.currency.clone(),
        blockchain: balance.blockchain.clone(),
        amount: balance.amount,
        priority: balance.priority,
        formatted_amount: format_amount(balance.amount),
        usd_value: usd_value(&balance.currency, balance.amount, prices),
    }
}

/// Project a whole ranking, preserving rank order.
pub fn project_all(ranked: &[RankedBalance], prices: &PriceMap) -> Vec<DisplayRow> {
    ranked.iter().map(|b| project(b, prices)).collect()
}

/// Key rows by currency. Currencies are assumed unique upstream; if one
/// repeats, the later row replaces the earlier one.
pub fn rows_by_currency(rows: &[DisplayRow]) -> HashMap<&str, &DisplayRow> {
    rows.iter().map(|r| (r.currency.as_str(), r)).collect()
}

pub fn total_usd_value(rows: &[DisplayRow]) -> f64 {
    rows.iter().map(|r| r.usd_value).sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
