//! Integration tests: the price cache, converter and ranking pipeline
//! driven by a deterministic mock price feed.

mod cache_flow;
mod mock_source;
