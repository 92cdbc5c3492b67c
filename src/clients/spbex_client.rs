//! Secondary-exchange client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::GatewayError;
use crate::models::entry::{TimeSeriesEntries, TimeSeriesEntry};
use crate::models::spbex::SpbexHistory;
use crate::utils::http::{HttpFetcher, SPBEX_BASE_URL};

/// Client for the secondary exchange's chart-history endpoint.
///
/// The provider exposes neither volume nor face value, and wraps its JSON
/// payload in a JSON-encoded string. No caching; one request per call.
#[derive(Clone)]
pub struct SpbexClient {
    base_url: String,
    fetcher: HttpFetcher,
}

impl SpbexClient {
    pub fn new() -> Self {
        Self::with_base_url(SPBEX_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            fetcher: HttpFetcher::for_base(base_url.clone()),
            base_url,
        }
    }

    /// Fetch daily history for a ticker over the window `[0, now]`.
    pub async fn fetch(&self, ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
        let url = format!(
            "{}/chistory?symbol={}&resolution=D&from=0&to={}",
            self.base_url,
            ticker,
            Utc::now().timestamp(),
        );

        let raw = self.fetcher.get_bytes(&url).await?;
        let body = String::from_utf8(raw)
            .map_err(|e| GatewayError::CouldNotParseJson(e.to_string()))?;

        let history = parse_history(&body)?;
        Ok(normalize(&history))
    }
}

impl Default for SpbexClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl crate::clients::traits::PriceHistoryProvider for SpbexClient {
    fn id(&self) -> &'static str {
        "SPBEX"
    }

    async fn fetch(&self, ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
        SpbexClient::fetch(self, ticker).await
    }
}

/// Decode the double-encoded payload.
///
/// The provider returns a JSON string whose contents are themselves JSON;
/// this is a protocol quirk, not a bug, so both decodes are unconditional.
/// An empty time axis means the ticker is unknown.
fn parse_history(body: &str) -> Result<SpbexHistory, GatewayError> {
    let inner: String =
        serde_json::from_str(body).map_err(|e| GatewayError::CouldNotParseJson(e.to_string()))?;
    let history: SpbexHistory =
        serde_json::from_str(&inner).map_err(|e| GatewayError::CouldNotParseJson(e.to_string()))?;

    if history.time.is_empty() {
        return Err(GatewayError::NotFound);
    }

    Ok(history)
}

fn normalize(history: &SpbexHistory) -> TimeSeriesEntries {
    let mut entries: TimeSeriesEntries = history
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(TimeSeriesEntry {
                date,
                close: decimal_at(&history.close, i),
                high: decimal_at(&history.high, i),
                low: decimal_at(&history.low, i),
                volume: 0,
                face_value: Decimal::ONE,
            })
        })
        .collect();

    entries.sort_by_key(|e| e.date);
    entries
}

fn decimal_at(values: &[f64], index: usize) -> Decimal {
    values
        .get(index)
        .and_then(|v| Decimal::from_f64_retain(*v))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn wrap(payload: &str) -> String {
        serde_json::to_string(payload).unwrap()
    }

    #[test]
    fn test_double_decode() {
        let body = wrap(r#"{"t":[1700000000],"o":[10.0],"h":[11.0],"l":[9.8],"c":[10.5],"s":"ok"}"#);
        let history = parse_history(&body).unwrap();
        assert_eq!(history.time, vec![1_700_000_000]);
        assert_eq!(history.close, vec![10.5]);
    }

    #[test]
    fn test_single_encoded_body_is_a_parse_error() {
        let err = parse_history(r#"{"t":[1700000000],"s":"ok"}"#).unwrap_err();
        assert!(matches!(err, GatewayError::CouldNotParseJson(_)));
    }

    #[test]
    fn test_empty_time_axis_is_not_found() {
        let body = wrap(r#"{"t":[],"o":[],"h":[],"l":[],"c":[],"s":"no_data"}"#);
        let err = parse_history(&body).unwrap_err();
        assert!(matches!(err, GatewayError::NotFound));
    }

    #[test]
    fn test_normalize_fixes_volume_and_face_value() {
        let history = SpbexHistory {
            time: vec![1_700_000_000, 1_700_086_400],
            open: vec![10.0, 10.5],
            high: vec![11.0, 10.9],
            low: vec![9.8, 10.2],
            close: vec![10.5, 10.7],
            status: "ok".to_string(),
        };
        let entries = normalize(&history);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        assert_eq!(entries[0].close, dec!(10.5));
        assert!(entries[0].date < entries[1].date);
        for entry in &entries {
            assert_eq!(entry.volume, 0);
            assert_eq!(entry.face_value, Decimal::ONE);
        }
    }
}
