//! WALLETBOARD: ranked token balances and live-price conversion.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod data;
pub mod portfolio;
pub mod pricing;
pub mod dashboard;
