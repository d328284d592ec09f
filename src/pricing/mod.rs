//! Live pricing: the shared price cache and token conversion on top of it.

pub mod cache;
pub mod converter;

pub use cache::{build_price_map, CacheConfig, PriceCache, PriceCacheEntry};
pub use converter::{convert_with, CurrencyConverter, QuoteTracker};
