//! Secondary-exchange history blob: parallel arrays keyed by single letters.

use serde::Deserialize;

/// Daily-resolution history for one ticker.
///
/// Arrays are index-aligned; `t` drives the record count.
#[derive(Debug, Default, Deserialize)]
pub struct SpbexHistory {
    /// Unix timestamps, seconds.
    #[serde(rename = "t", default)]
    pub time: Vec<i64>,
    #[serde(rename = "o", default)]
    pub open: Vec<f64>,
    #[serde(rename = "h", default)]
    pub high: Vec<f64>,
    #[serde(rename = "l", default)]
    pub low: Vec<f64>,
    #[serde(rename = "c", default)]
    pub close: Vec<f64>,
    /// Provider status flag ("ok" / "no_data").
    #[serde(rename = "s", default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parallel_arrays() {
        let json = r#"{"t":[1700000000,1700086400],"o":[10.0,10.5],"h":[11.0,10.9],"l":[9.8,10.2],"c":[10.5,10.7],"s":"ok"}"#;
        let history: SpbexHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.time.len(), 2);
        assert_eq!(history.close[1], 10.7);
        assert_eq!(history.status, "ok");
    }

    #[test]
    fn test_missing_arrays_default_empty() {
        let history: SpbexHistory = serde_json::from_str(r#"{"s":"no_data"}"#).unwrap();
        assert!(history.time.is_empty());
    }
}
