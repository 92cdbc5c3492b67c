//! Central-bank rate client.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::errors::GatewayError;
use crate::models::cbr::{decode_windows_1251, ValCurs};
use crate::models::entry::{TimeSeriesEntries, TimeSeriesEntry};
use crate::utils::http::{HttpFetcher, CBR_BASE_URL};

/// Earliest date the gateway asks rates for.
const HISTORY_START: (i32, u32, u32) = (2014, 1, 1);

/// Supported currency codes mapped to the provider's internal IDs.
/// See the provider's XML_val listing for the full set.
fn currency_id(code: &str) -> Option<&'static str> {
    match code {
        "usd" => Some("R01235"),
        "eur" => Some("R01239"),
        "cny" => Some("R01375"),
        _ => None,
    }
}

/// Client for the central bank's dynamic-rates endpoint.
///
/// Responses are windows-1251 XML with locale-formatted decimals. Results
/// are fetched fresh on every call; the endpoint is cheap and the window
/// is fixed.
#[derive(Clone)]
pub struct CbrClient {
    base_url: String,
    fetcher: HttpFetcher,
}

impl CbrClient {
    pub fn new() -> Self {
        Self::with_base_url(CBR_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            fetcher: HttpFetcher::for_base(base_url.clone()),
            base_url,
        }
    }

    /// Fetch the daily rate history for a currency code.
    ///
    /// Unrecognized codes return `NotFound` without any network call.
    pub async fn fetch(&self, currency_code: &str) -> Result<TimeSeriesEntries, GatewayError> {
        let currency = currency_id(currency_code).ok_or(GatewayError::NotFound)?;

        let (year, month, day) = HISTORY_START;
        let start = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let end = Utc::now().date_naive();

        let url = format!(
            "{}/scripts/XML_dynamic.asp?date_req1={}&date_req2={}&VAL_NM_RQ={}",
            self.base_url,
            start.format("%d/%m/%Y"),
            end.format("%d/%m/%Y"),
            currency,
        );

        let raw = self.fetcher.get_bytes(&url).await?;
        let xml = decode_windows_1251(&raw);
        parse_rates(&xml)
    }
}

impl Default for CbrClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a decoded rates document.
///
/// A malformed date aborts the whole fetch; a malformed rate only degrades
/// that record to a dated placeholder.
fn parse_rates(xml: &str) -> Result<TimeSeriesEntries, GatewayError> {
    let val_curs: ValCurs =
        quick_xml::de::from_str(xml).map_err(|e| GatewayError::CouldNotParseXml(e.to_string()))?;

    let mut entries = TimeSeriesEntries::with_capacity(val_curs.records.len());
    for record in &val_curs.records {
        let date = NaiveDate::parse_from_str(&record.date, "%d.%m.%Y").map_err(|e| {
            GatewayError::CouldNotParseXml(format!("bad record date {:?}: {e}", record.date))
        })?;

        let mut entry = TimeSeriesEntry::placeholder(date);
        match record.vunit_rate.replace(',', ".").parse::<Decimal>() {
            Ok(rate) => entry.close = rate,
            Err(e) => warn!("skipping rate {:?} for {date}: {e}", record.vunit_rate),
        }
        entries.push(entry);
    }

    entries.sort_by_key(|e| e.date);
    Ok(entries)
}
