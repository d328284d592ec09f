//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.
//! Handlers never fail on bad upstream data: they log and return
//! degraded (empty, passthrough or zero-valued) output instead.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

use crate::data::BalanceSource;
use crate::portfolio::{project_all, rank_value};
use crate::pricing::{CurrencyConverter, PriceCache};
use crate::types::DisplayRow;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub cache: PriceCache,
    pub converter: CurrencyConverter,
    pub balances: Arc<dyn BalanceSource>,
}

impl DashboardState {
    pub fn new(cache: PriceCache, balances: Arc<dyn BalanceSource>) -> Self {
        Self {
            converter: CurrencyConverter::new(cache.clone()),
            cache,
            balances,
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConvertParams {
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertResponse {
    pub from: String,
    pub to: String,
    pub amount: String,
    /// Empty when the amount was not a positive number.
    pub converted: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricesResponse {
    /// RFC 3339 time of the fetch that produced `prices`; absent when the
    /// prices are an empty fallback.
    pub fetched_at: Option<String>,
    pub prices: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub type AppState = Arc<DashboardState>;

/// GET /api/balances
pub async fn get_balances(State(state): State<AppState>) -> Json<Vec<DisplayRow>> {
    let raw = match state.balances.fetch_balances().await {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "Balance source failed");
            serde_json::Value::Null
        }
    };

    let ranked = rank_value(&raw);
    if ranked.is_empty() {
        return Json(Vec::new());
    }

    let prices = state.cache.get_prices().await;
    let rows = project_all(&ranked, &prices);
    debug!(rows = rows.len(), "Balances projected");
    Json(rows)
}

/// GET /api/convert?from=ETH&to=USDC&amount=1
pub async fn get_convert(
    State(state): State<AppState>,
    Query(params): Query<ConvertParams>,
) -> Json<ConvertResponse> {
    let converted = state
        .converter
        .convert(&params.from, &params.to, &params.amount)
        .await;

    Json(ConvertResponse {
        from: params.from,
        to: params.to,
        amount: params.amount,
        converted,
    })
}

/// GET /api/prices
pub async fn get_prices(State(state): State<AppState>) -> Json<PricesResponse> {
    let prices = state.cache.get_prices().await;
    // Only the entry whose map is being served; after a failed refresh the
    // snapshot is older than the empty fallback.
    let fetched_at = state
        .cache
        .snapshot()
        .filter(|entry| Arc::ptr_eq(&entry.prices_by_currency, &prices))
        .map(|entry| entry.fetched_at_utc.to_rfc3339());

    Json(PricesResponse {
        fetched_at,
        prices: prices.iter().map(|(c, p)| (c.clone(), *p)).collect(),
    })
}

/// GET /api/tokens: currencies with a known price, sorted.
pub async fn get_tokens(State(state): State<AppState>) -> Json<Vec<String>> {
    let prices = state.cache.get_prices().await;
    let mut tokens: Vec<String> = prices.keys().cloned().collect();
    tokens.sort();
    Json(tokens)
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
