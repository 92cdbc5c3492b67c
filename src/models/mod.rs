//! Data models: the uniform time-series shape and per-provider envelopes.

pub mod cbr;
pub mod entry;
pub mod moex;
pub mod spbex;

pub use entry::{TimeSeriesEntries, TimeSeriesEntry};
