//! Balance ranking.
//!
//! Filters out balances that should not be displayed and orders the rest
//! by chain priority, then by amount. Pure: no price data involved.

use serde_json::Value;
use std::cmp::Ordering;
use tracing::{debug, error, warn};

use super::priority::{priority_of, MIN_VALID_PRIORITY};
use crate::types::{RankedBalance, WalletBalance, WalletError};

/// Amounts must be strictly above this to be displayed.
const MIN_VALID_AMOUNT: f64 = 0.0;

/// Whether a balance with this priority and amount is displayable.
pub fn is_valid(priority: i32, amount: f64) -> bool {
    priority > MIN_VALID_PRIORITY && amount > MIN_VALID_AMOUNT
}

/// Rank balances: attach priority, drop invalid ones, sort.
///
/// Sort order is priority descending, then amount descending. `sort_by` is
/// stable, so balances with equal keys keep their input order.
pub fn rank(balances: &[WalletBalance]) -> Vec<RankedBalance> {
    let mut ranked: Vec<RankedBalance> = balances
        .iter()
        .map(|b| RankedBalance {
            currency: b.currency.clone(),
            amount: b.amount,
            blockchain: b.blockchain.clone(),
            priority: priority_of(&b.blockchain),
        })
        .filter(|b| is_valid(b.priority, b.amount))
        .collect();

    ranked.sort_by(|a, b| {
        b.priority.cmp(&a.priority).then_with(|| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(Ordering::Equal)
        })
    });

    debug!(input = balances.len(), ranked = ranked.len(), "Balances ranked");
    ranked
}

/// Parse raw balance-source output.
///
/// The top level must be a JSON array. Elements that don't have the
/// `WalletBalance` shape are skipped with a warning.
pub fn parse_balances(input: &Value) -> Result<Vec<WalletBalance>, WalletError> {
    let items = input.as_array().ok_or_else(|| {
        WalletError::InvalidInput(format!("expected an array of balances, got {}", kind(input)))
    })?;

    let mut balances = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<WalletBalance>(item.clone()) {
            Ok(b) => balances.push(b),
            Err(e) => warn!(index, error = %e, "Skipping malformed balance"),
        }
    }
    Ok(balances)
}

/// Rank unvalidated input. Garbage in yields an empty ranking, never a panic.
pub fn rank_value(input: &Value) -> Vec<RankedBalance> {
    match parse_balances(input) {
        Ok(balances) => rank(&balances),
        Err(e) => {
            error!(error = %e, "Invalid balances input");
            Vec::new()
        }
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
