//! Aggregation gateway for three upstream price-data providers.
//!
//! The crate exposes provider clients that translate tickers into upstream
//! requests and normalize each provider's response envelope into one uniform
//! time-series shape, plus an optional Redis-backed side cache and an axum
//! HTTP front end.

pub mod cache;
pub mod clients;
pub mod config;
pub mod errors;
pub mod models;
pub mod server;
pub mod utils;

pub use errors::GatewayError;
pub use models::entry::{TimeSeriesEntries, TimeSeriesEntry};
