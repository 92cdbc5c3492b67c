//! The uniform time-series entry shape returned by every provider.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One calendar day of price data, normalized across providers.
///
/// Prices are `Decimal` rather than binary floats so that values survive
/// cache round-trips without rounding drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesEntry {
    /// UTC calendar day.
    pub date: NaiveDate,
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    /// Trading volume; 0 when the upstream does not report it.
    pub volume: u64,
    /// Price multiplier for bond-like instruments; 1 when inapplicable.
    #[serde(rename = "facevalue")]
    pub face_value: Decimal,
}

/// Chronologically ordered sequence of entries.
pub type TimeSeriesEntries = Vec<TimeSeriesEntry>;

impl TimeSeriesEntry {
    /// Entry carrying only a date, with zeroed prices and default face value.
    ///
    /// Upstream rows with null price fields keep their position in the
    /// sequence as placeholders instead of being dropped.
    pub fn placeholder(date: NaiveDate) -> Self {
        Self {
            date,
            close: Decimal::ZERO,
            high: Decimal::ZERO,
            low: Decimal::ZERO,
            volume: 0,
            face_value: Decimal::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_placeholder_defaults() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let entry = TimeSeriesEntry::placeholder(date);
        assert_eq!(entry.date, date);
        assert_eq!(entry.close, Decimal::ZERO);
        assert_eq!(entry.volume, 0);
        assert_eq!(entry.face_value, Decimal::ONE);
    }

    #[test]
    fn test_json_field_names() {
        let entry = TimeSeriesEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            close: dec!(250.55),
            high: dec!(252.1),
            low: dec!(249.0),
            volume: 1_000,
            face_value: dec!(1),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("facevalue").is_some());
        assert!(json.get("face_value").is_none());
        assert_eq!(json["date"], "2024-03-01");
    }

    #[test]
    fn test_serde_round_trip_preserves_precision() {
        let entry = TimeSeriesEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            close: dec!(87.9041),
            high: dec!(88.0001),
            low: dec!(87.0),
            volume: 42,
            face_value: dec!(10),
        };
        let bytes = serde_json::to_vec(&entry).unwrap();
        let back: TimeSeriesEntry = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, entry);
    }
}
