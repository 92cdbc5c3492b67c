//! Securities-exchange client: metadata discovery, offset pagination,
//! per-page caching and the live-price tail.

use std::future::Future;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{page_ttl, SharedCache, PAGE_SIZE};
use crate::errors::GatewayError;
use crate::models::entry::{TimeSeriesEntries, TimeSeriesEntry};
use crate::models::moex::{
    coerce_decimal, coerce_u64, BoardListing, ColumnTable, CurrencyRatesEnvelope, HistoryEnvelope,
    InstrumentMetadata, MarketDataEnvelope,
};
use crate::utils::http::{HttpFetcher, MOEX_BASE_URL};

/// Tickers with this prefix bypass the security path and read the central
/// bank rates republished by the exchange's statistics endpoint.
const RATE_TICKER_PREFIX: &str = "cbrf_";

/// Client for the exchange's ISS REST API.
///
/// The cache handle is optional; without one every page and metadata lookup
/// goes straight to the upstream.
pub struct MoexClient {
    base_url: String,
    fetcher: HttpFetcher,
    cache: SharedCache,
}

impl MoexClient {
    pub fn new(cache: SharedCache) -> Self {
        Self::with_base_url(MOEX_BASE_URL, cache)
    }

    pub fn with_base_url(base_url: impl Into<String>, cache: SharedCache) -> Self {
        let base_url = base_url.into();
        Self {
            fetcher: HttpFetcher::for_base(base_url.clone()),
            base_url,
            cache,
        }
    }

    /// Fetch the normalized history for a ticker, dispatching on its class.
    pub async fn fetch(&self, ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
        if ticker.starts_with(RATE_TICKER_PREFIX) {
            self.fetch_currency_rate(ticker).await
        } else {
            self.fetch_security(ticker).await
        }
    }

    /// Rate-passthrough path: single request, single entry.
    async fn fetch_currency_rate(&self, ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
        if ticker != "cbrf_usd" && ticker != "cbrf_eur" {
            return Err(GatewayError::NotFound);
        }

        let url = format!(
            "{}/iss/statistics/engines/currency/markets/selt/rates.json?iss.meta=off&\
             cbrf.columns=CBRF_USD_LAST,CBRF_USD_TRADEDATE,CBRF_EUR_LAST,CBRF_EUR_TRADEDATE",
            self.base_url,
        );

        let raw = self.fetcher.get_bytes(&url).await?;
        let envelope: CurrencyRatesEnvelope = serde_json::from_slice(&raw)
            .map_err(|e| GatewayError::CouldNotParseJson(e.to_string()))?;

        parse_currency_rate(&envelope.cbrf, ticker)
    }

    /// Regular-security path: resolve metadata, paginate history, then try
    /// to append the live tail.
    async fn fetch_security(&self, ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
        let meta = self.security_metadata(ticker).await?;

        let mut history =
            collect_history(|offset| self.history_page(ticker, &meta, offset)).await?;

        match self.current_price(ticker, &meta).await {
            Ok(tail) => append_current_price(&mut history, tail),
            Err(GatewayError::NoData) => {
                debug!("no current price data for {ticker}, returning history only");
            }
            Err(e) => {
                // Live data is best-effort; history alone is still a valid answer.
                warn!("current price fetch failed for {ticker}: {e}");
            }
        }

        history.sort_by_key(|e| e.date);
        Ok(history)
    }

    /// Resolve the board/market/engine triple for a ticker, cache-first.
    async fn security_metadata(&self, ticker: &str) -> Result<InstrumentMetadata, GatewayError> {
        if let Some(cache) = &self.cache {
            if let Some(raw) = cache.get(ticker).await {
                if let Ok(meta) = serde_json::from_slice(&raw) {
                    debug!("metadata cache hit for {ticker}");
                    return Ok(meta);
                }
            }
        }

        let url = format!(
            "{}/iss/securities/{}.json?iss.only=boards&iss.meta=off&\
             boards.columns=boardid,market,engine,is_primary",
            self.base_url, ticker,
        );

        let raw = self.fetcher.get_bytes(&url).await?;
        let listing: BoardListing = serde_json::from_slice(&raw)
            .map_err(|e| GatewayError::CouldNotParseJson(e.to_string()))?;

        let meta = select_primary_board(&listing.boards).ok_or(GatewayError::NotFound)?;

        if let Some(cache) = &self.cache {
            let bytes =
                serde_json::to_vec(&meta).map_err(|e| GatewayError::Cache(e.to_string()))?;
            // Metadata is stable for the life of an instrument: no expiry.
            cache.set(ticker, bytes, None).await?;
        }

        Ok(meta)
    }

    /// One history page at the given offset, cache-first.
    async fn history_page(
        &self,
        ticker: &str,
        meta: &InstrumentMetadata,
        offset: usize,
    ) -> Result<TimeSeriesEntries, GatewayError> {
        let cache_key = format!(
            "{}-{}-{}-{}-{}",
            meta.board, meta.market, meta.engine, ticker, offset
        );

        if let Some(cache) = &self.cache {
            if let Some(raw) = cache.get(&cache_key).await {
                if let Ok(page) = serde_json::from_slice(&raw) {
                    debug!("history cache hit for {cache_key}");
                    return Ok(page);
                }
            }
        }

        let url = format!(
            "{}/iss/history/engines/{}/markets/{}/boards/{}/securities/{}.json?\
             iss.meta=off&start={}&history.columns=TRADEDATE,CLOSE,HIGH,LOW,VOLUME,FACEVALUE",
            self.base_url, meta.engine, meta.market, meta.board, ticker, offset,
        );

        let raw = self.fetcher.get_bytes(&url).await?;
        let envelope: HistoryEnvelope = serde_json::from_slice(&raw)
            .map_err(|e| GatewayError::CouldNotParseJson(e.to_string()))?;

        let page = parse_history_page(&envelope.history)?;

        // An empty page only signals end-of-data; nothing worth keeping.
        if !page.is_empty() {
            if let Some(cache) = &self.cache {
                let bytes =
                    serde_json::to_vec(&page).map_err(|e| GatewayError::Cache(e.to_string()))?;
                cache.set(&cache_key, bytes, page_ttl(page.len())).await?;
            }
        }

        Ok(page)
    }

    /// Live quote from the marketdata block scoped to the resolved board.
    async fn current_price(
        &self,
        ticker: &str,
        meta: &InstrumentMetadata,
    ) -> Result<TimeSeriesEntry, GatewayError> {
        let url = format!(
            "{}/iss/engines/{}/markets/{}/securities/{}.json?iss.meta=off&\
             iss.only=marketdata&marketdata.columns=BOARDID,LAST,HIGH,LOW,VOLTODAY",
            self.base_url, meta.engine, meta.market, ticker,
        );

        let raw = self.fetcher.get_bytes(&url).await?;
        let envelope: MarketDataEnvelope = serde_json::from_slice(&raw)
            .map_err(|e| GatewayError::CouldNotParseJson(e.to_string()))?;

        parse_current_price(&envelope.marketdata, &meta.board)
    }
}

#[async_trait]
impl crate::clients::traits::PriceHistoryProvider for MoexClient {
    fn id(&self) -> &'static str {
        "MOEX"
    }

    async fn fetch(&self, ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
        MoexClient::fetch(self, ticker).await
    }
}

/// Drive a page source through increasing offsets until exhaustion.
///
/// An empty page terminates; a short page is appended and then terminates,
/// whether or not caching is in play. Offsets advance by [`PAGE_SIZE`], so
/// each page's offset depends only on the count of full pages before it.
pub(crate) async fn collect_history<F, Fut>(
    mut fetch_page: F,
) -> Result<TimeSeriesEntries, GatewayError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<TimeSeriesEntries, GatewayError>>,
{
    let mut history = TimeSeriesEntries::new();
    let mut offset = 0;

    loop {
        let page = fetch_page(offset).await?;
        if page.is_empty() {
            break;
        }
        let last = page.len() != PAGE_SIZE;
        history.extend(page);
        if last {
            break;
        }
        offset += PAGE_SIZE;
    }

    Ok(history)
}

/// Append the live tail, inheriting face value from the last historical
/// entry. The live endpoint does not expose face value, so whatever the
/// tail carried is overwritten whenever history is non-empty.
pub(crate) fn append_current_price(history: &mut TimeSeriesEntries, tail: TimeSeriesEntry) {
    history.push(tail);
    let n = history.len();
    if n > 1 {
        history[n - 1].face_value = history[n - 2].face_value;
    }
}

/// Pick the board row flagged primary; the exchange marks exactly one per
/// instrument, but if several appear the last wins.
fn select_primary_board(table: &ColumnTable) -> Option<InstrumentMetadata> {
    let board_col = table.column("boardid")?;
    let market_col = table.column("market")?;
    let engine_col = table.column("engine")?;
    let primary_col = table.column("is_primary")?;

    let mut selected = None;
    for row in &table.data {
        if row.get(primary_col).map(coerce_u64) != Some(1) {
            continue;
        }
        let board = row.get(board_col)?.as_str()?;
        let market = row.get(market_col)?.as_str()?;
        let engine = row.get(engine_col)?.as_str()?;
        selected = Some(InstrumentMetadata {
            board: board.to_string(),
            market: market.to_string(),
            engine: engine.to_string(),
        });
    }
    selected
}

/// Normalize one history page.
///
/// Rows with a null close, high or low keep their date as zero-valued
/// placeholders. A malformed trade date fails the page.
fn parse_history_page(table: &ColumnTable) -> Result<TimeSeriesEntries, GatewayError> {
    if table.data.is_empty() {
        return Ok(TimeSeriesEntries::new());
    }

    let date_col = table
        .column("TRADEDATE")
        .ok_or_else(|| GatewayError::CouldNotParseJson("history has no TRADEDATE".to_string()))?;
    let close_col = table.column("CLOSE");
    let high_col = table.column("HIGH");
    let low_col = table.column("LOW");
    let volume_col = table.column("VOLUME");
    let face_col = table.column("FACEVALUE");

    let cell = |row: &[Value], col: Option<usize>| -> Value {
        col.and_then(|i| row.get(i).cloned()).unwrap_or(Value::Null)
    };

    let mut page = TimeSeriesEntries::with_capacity(table.data.len());
    for row in &table.data {
        let date_str = row
            .get(date_col)
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::CouldNotParseJson("non-string TRADEDATE".to_string()))?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            GatewayError::CouldNotParseJson(format!("bad trade date {date_str:?}: {e}"))
        })?;

        let mut entry = TimeSeriesEntry::placeholder(date);

        let close = cell(row, close_col);
        let high = cell(row, high_col);
        let low = cell(row, low_col);
        if close.is_null() || high.is_null() || low.is_null() {
            page.push(entry);
            continue;
        }

        entry.close = coerce_decimal(&close);
        entry.high = coerce_decimal(&high);
        entry.low = coerce_decimal(&low);
        entry.volume = coerce_u64(&cell(row, volume_col));

        let face = cell(row, face_col);
        if !face.is_null() {
            entry.face_value = coerce_decimal(&face);
        }

        page.push(entry);
    }

    Ok(page)
}

/// Normalize the statistics endpoint's latest central-bank rates into a
/// single-entry sequence for the requested passthrough ticker.
fn parse_currency_rate(
    table: &ColumnTable,
    ticker: &str,
) -> Result<TimeSeriesEntries, GatewayError> {
    let row = table.data.first().ok_or(GatewayError::NoData)?;

    let (last_name, date_name) = if ticker == "cbrf_usd" {
        ("CBRF_USD_LAST", "CBRF_USD_TRADEDATE")
    } else {
        ("CBRF_EUR_LAST", "CBRF_EUR_TRADEDATE")
    };

    let close = table
        .cell(row, last_name)
        .map(coerce_decimal)
        .ok_or_else(|| GatewayError::CouldNotParseJson(format!("missing {last_name}")))?;
    let date_str = table
        .cell(row, date_name)
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::CouldNotParseJson(format!("missing {date_name}")))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        GatewayError::CouldNotParseJson(format!("bad trade date {date_str:?}: {e}"))
    })?;

    Ok(vec![TimeSeriesEntry {
        date,
        close,
        high: Decimal::ZERO,
        low: Decimal::ZERO,
        volume: 0,
        face_value: Decimal::ONE,
    }])
}

/// Find the live row for the resolved board.
///
/// A null LAST means the market has no current data, which the caller
/// treats as a history-only result; a missing board row is `NotFound`.
fn parse_current_price(
    table: &ColumnTable,
    board: &str,
) -> Result<TimeSeriesEntry, GatewayError> {
    let board_col = table
        .column("BOARDID")
        .ok_or_else(|| GatewayError::CouldNotParseJson("marketdata has no BOARDID".to_string()))?;

    for row in &table.data {
        if row.get(board_col).and_then(Value::as_str) != Some(board) {
            continue;
        }

        let last = table.cell(row, "LAST").cloned().unwrap_or(Value::Null);
        if last.is_null() {
            return Err(GatewayError::NoData);
        }

        let mut entry = TimeSeriesEntry::placeholder(Utc::now().date_naive());
        entry.close = coerce_decimal(&last);
        if let Some(high) = table.cell(row, "HIGH") {
            entry.high = coerce_decimal(high);
        }
        if let Some(low) = table.cell(row, "LOW") {
            entry.low = coerce_decimal(low);
        }
        if let Some(volume) = table.cell(row, "VOLTODAY") {
            entry.volume = coerce_u64(volume);
        }
        return Ok(entry);
    }

    Err(GatewayError::NotFound)
}
