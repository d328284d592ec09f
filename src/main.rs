//! WALLETBOARD: ranked token balances and live-price conversion.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! warms the price cache, logs the current ranking and serves the
//! dashboard API until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

use walletboard::config::AppConfig;
use walletboard::dashboard::{self, routes::DashboardState};
use walletboard::data::balances::FileBalanceSource;
use walletboard::data::prices::HttpPriceSource;
use walletboard::data::BalanceSource;
use walletboard::portfolio::{project_all, rank_value};
use walletboard::portfolio::projector::total_usd_value;
use walletboard::pricing::PriceCache;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load_or_default("config.toml")?.with_env_overrides();

    init_logging();

    info!(
        prices_url = %cfg.price_source.url,
        ttl_secs = cfg.cache.ttl_secs,
        timeout_secs = ?cfg.price_source.timeout_secs,
        balances = %cfg.balances.path,
        "WALLETBOARD starting up"
    );

    // -- Initialise components -------------------------------------------

    let source = HttpPriceSource::new(Some(cfg.price_source.url.clone()))?;
    let cache = PriceCache::with_config(Arc::new(source), cfg.cache_config());
    let balances: Arc<dyn BalanceSource> =
        Arc::new(FileBalanceSource::new(Some(&cfg.balances.path)));

    log_portfolio(&cache, balances.as_ref()).await;

    if !cfg.dashboard.enabled {
        info!("Dashboard disabled, nothing left to do.");
        return Ok(());
    }

    let state = Arc::new(DashboardState::new(cache.clone(), balances));
    dashboard::spawn_dashboard(state, cfg.dashboard.port).await?;

    info!("Serving. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    let stats = cache.stats();
    info!(
        fetches = stats.fetches,
        hits = stats.hits,
        coalesced = stats.coalesced,
        failures = stats.failures,
        "WALLETBOARD shut down cleanly."
    );

    Ok(())
}

/// Rank the configured balances once and log the result.
async fn log_portfolio(cache: &PriceCache, balances: &dyn BalanceSource) {
    let raw = match balances.fetch_balances().await {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "Could not load balances");
            return;
        }
    };

    let ranked = rank_value(&raw);
    let prices = cache.get_prices().await;
    if prices.is_empty() {
        warn!("No prices available; USD values will read 0");
    }

    let rows = project_all(&ranked, &prices);
    for row in &rows {
        info!(
            currency = %row.currency,
            blockchain = %row.blockchain,
            priority = row.priority,
            amount = %row.formatted_amount,
            usd = format!("${:.2}", row.usd_value),
            "Balance"
        );
    }
    info!(
        rows = rows.len(),
        total = format!("${:.2}", total_usd_value(&rows)),
        "Portfolio ranked"
    );
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("walletboard=info"));

    let json_logging = std::env::var("WALLETBOARD_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
