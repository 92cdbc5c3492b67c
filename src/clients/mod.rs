//! Provider-specific clients translating tickers into upstream requests.

pub mod cbr_client;
pub mod moex_client;
pub mod spbex_client;
pub mod traits;

pub use cbr_client::CbrClient;
pub use moex_client::MoexClient;
pub use spbex_client::SpbexClient;
pub use traits::PriceHistoryProvider;
