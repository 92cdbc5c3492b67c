//! Outbound HTTP with a fixed upstream allow-list.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::errors::GatewayError;

pub const MOEX_BASE_URL: &str = "https://iss.moex.com";
pub const SPBEX_BASE_URL: &str = "https://investcab.ru/api";
pub const CBR_BASE_URL: &str = "https://www.cbr.ru";

const URL_ALLOW_LIST: [&str; 3] = [MOEX_BASE_URL, SPBEX_BASE_URL, CBR_BASE_URL];

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One upstream blocks default client agents, so every request carries a
/// browser-like User-Agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Outbound HTTP client confined to an allow-list of base URLs. Any URL
/// outside the list is refused before touching the network.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    allowed: Vec<String>,
}

impl HttpFetcher {
    /// Fetcher allowing all known upstream bases.
    pub fn new() -> Self {
        Self::with_allowed(URL_ALLOW_LIST.iter().map(|s| s.to_string()).collect())
    }

    /// Fetcher confined to a single base URL. Clients constructed with an
    /// overridden upstream get a fetcher scoped to that override.
    pub fn for_base(base: impl Into<String>) -> Self {
        Self::with_allowed(vec![base.into()])
    }

    fn with_allowed(allowed: Vec<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, allowed }
    }

    /// Is the URL rooted at one of the allowed bases?
    pub fn is_allowed(&self, url: &str) -> bool {
        self.allowed.iter().any(|base| url.starts_with(base))
    }

    /// GET the URL and return the raw body bytes.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        if !self.is_allowed(url) {
            return Err(GatewayError::NotAllowed(url.to_string()));
        }

        debug!("fetching {url}");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(GatewayError::CouldNotFetchData(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}
