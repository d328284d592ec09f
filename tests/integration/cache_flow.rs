//! Price cache behaviour under concurrency, expiry and feed failure.

use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

use walletboard::pricing::{CacheConfig, PriceCache};
use walletboard::types::PriceRecord;

use crate::mock_source::MockPriceFeed;

const SLOW: Duration = Duration::from_secs(2);

fn cache_over(feed: &MockPriceFeed) -> PriceCache {
    PriceCache::new(Arc::new(feed.clone()))
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_fetch() {
    let feed = MockPriceFeed::new().with_delay(SLOW);
    let cache = cache_over(&feed);

    let (a, b) = tokio::join!(cache.get_prices(), cache.get_prices());

    assert_eq!(feed.calls(), 1);
    assert_eq!(a, b);
    assert_eq!(cache.stats().coalesced, 1);
}

#[tokio::test(start_paused = true)]
async fn test_spawned_tasks_share_one_fetch() {
    let feed = MockPriceFeed::new().with_delay(SLOW);
    let cache = cache_over(&feed);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_prices().await })
        })
        .collect();

    for handle in handles {
        let prices = assert_ok!(handle.await);
        assert_eq!(prices.len(), 5);
    }
    assert_eq!(feed.calls(), 1);
    assert!(!cache.is_fetching());
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_quotes_keep_max() {
    let feed = MockPriceFeed::new();
    let cache = cache_over(&feed);

    assert_eq!(cache.price_of("BTC").await, Some(31000.0));
    assert_eq!(cache.price_of("ETH").await, Some(2000.0));
    assert_eq!(cache.price_of("NOPE").await, None);
    assert_eq!(feed.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_window() {
    let feed = MockPriceFeed::new();
    let cache = cache_over(&feed);

    cache.get_prices().await;
    assert_eq!(feed.calls(), 1);

    tokio::time::advance(Duration::from_secs(4 * 60)).await;
    cache.get_prices().await;
    assert_eq!(feed.calls(), 1, "no refetch inside the window");

    feed.set_records(vec![PriceRecord::new("ETH", "2023-08-29T07:20:00.000Z", 2100.0)]);
    tokio::time::advance(Duration::from_secs(61)).await;
    let refreshed = cache.get_prices().await;
    assert_eq!(feed.calls(), 2, "refetch after the window");
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed["ETH"], 2100.0);
}

#[tokio::test(start_paused = true)]
async fn test_custom_ttl() {
    let feed = MockPriceFeed::new();
    let cache = PriceCache::with_config(
        Arc::new(feed.clone()),
        CacheConfig {
            ttl: Duration::from_secs(10),
            fetch_timeout: None,
        },
    );

    cache.get_prices().await;
    tokio::time::advance(Duration::from_secs(11)).await;
    cache.get_prices().await;
    assert_eq!(feed.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_retried_on_next_call() {
    let feed = MockPriceFeed::new();
    feed.set_error("503 Service Unavailable");
    let cache = cache_over(&feed);

    assert!(cache.get_prices().await.is_empty());
    assert!(cache.snapshot().is_none());

    feed.clear_error();
    let prices = cache.get_prices().await;
    assert_eq!(prices.len(), 5);
    assert_eq!(feed.calls(), 2);
    assert_eq!(cache.stats().failures, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_last_good_snapshot() {
    let feed = MockPriceFeed::new();
    let cache = cache_over(&feed);
    cache.get_prices().await;
    let first = cache.snapshot().unwrap();

    feed.set_error("timeout");
    tokio::time::advance(Duration::from_secs(301)).await;
    assert!(cache.get_prices().await.is_empty());

    let kept = cache.snapshot().unwrap();
    assert!(Arc::ptr_eq(&first.prices_by_currency, &kept.prices_by_currency));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_bounds_a_hung_feed() {
    let feed = MockPriceFeed::new().with_delay(Duration::from_secs(3600));
    let cache = PriceCache::with_config(
        Arc::new(feed.clone()),
        CacheConfig {
            ttl: Duration::from_secs(300),
            fetch_timeout: Some(Duration::from_secs(5)),
        },
    );

    let prices = cache.get_prices().await;
    assert!(prices.is_empty());
    assert_eq!(cache.stats().failures, 1);
    assert!(!cache.is_fetching());

    // Not cached: the next call goes back to the feed.
    cache.get_prices().await;
    assert_eq!(feed.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_completes_after_caller_gives_up() {
    let feed = MockPriceFeed::new().with_delay(SLOW);
    let cache = cache_over(&feed);

    let gave_up = tokio::time::timeout(Duration::from_secs(1), cache.get_prices()).await;
    assert!(gave_up.is_err());
    assert!(cache.is_fetching());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!cache.is_fetching());
    let entry = cache.snapshot().unwrap();
    assert_eq!(entry.prices_by_currency["BTC"], 31000.0);

    // Stored when the feed answered, so still valid now.
    assert_ok!(tokio::time::timeout(Duration::from_millis(1), cache.get_prices()).await);
    assert_eq!(feed.calls(), 1);
    assert_eq!(cache.stats().hits, 1);
}
