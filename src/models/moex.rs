//! MOEX ISS response envelopes.
//!
//! Every ISS block shares the same columnar shape: a `columns` array of
//! labels and a `data` array of rows, where each row is a heterogeneous
//! JSON array aligned with the labels.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `columns` + `data` block from an ISS response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnTable {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

impl ColumnTable {
    /// Index of a column label, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell of `row` under the labelled column.
    pub fn cell<'a>(&self, row: &'a [Value], name: &str) -> Option<&'a Value> {
        row.get(self.column(name)?)
    }
}

/// `iss/securities/{ticker}.json?iss.only=boards` envelope.
#[derive(Debug, Deserialize)]
pub struct BoardListing {
    pub boards: ColumnTable,
}

/// `iss/history/...` envelope.
#[derive(Debug, Deserialize)]
pub struct HistoryEnvelope {
    pub history: ColumnTable,
}

/// `iss/engines/.../securities/{ticker}.json?iss.only=marketdata` envelope.
#[derive(Debug, Deserialize)]
pub struct MarketDataEnvelope {
    pub marketdata: ColumnTable,
}

/// `iss/statistics/engines/currency/markets/selt/rates.json` envelope.
#[derive(Debug, Deserialize)]
pub struct CurrencyRatesEnvelope {
    pub cbrf: ColumnTable,
}

/// The exchange's three-level classification of an instrument.
///
/// Required to address the history and marketdata endpoints; assumed stable
/// for the life of an instrument, so cached without expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMetadata {
    pub board: String,
    pub market: String,
    pub engine: String,
}

/// Coerce an ISS cell to a decimal. Numbers keep their textual
/// representation to avoid float round-off; nulls and junk become zero.
pub fn coerce_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => n.to_string().parse().unwrap_or_default(),
        Value::String(s) => s.parse().unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

/// Coerce an ISS cell to a non-negative integer. Volumes occasionally come
/// back in float notation.
pub fn coerce_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
