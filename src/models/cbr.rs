//! Central-bank XML envelope.
//!
//! The rates endpoint responds with windows-1251 encoded XML; the body is
//! transcoded to UTF-8 before deserialization.

use serde::Deserialize;

/// Root element of the dynamic-rates response.
#[derive(Debug, Deserialize)]
pub struct ValCurs {
    #[serde(rename = "Record", default)]
    pub records: Vec<RateRecord>,
}

/// One dated rate record.
#[derive(Debug, Deserialize)]
pub struct RateRecord {
    /// `dd.mm.yyyy` date attribute.
    #[serde(rename = "@Date")]
    pub date: String,
    /// Units of currency the rate is quoted for.
    #[serde(rename = "Nominal", default)]
    pub nominal: String,
    /// Rate per nominal, comma as decimal separator.
    #[serde(rename = "Value", default)]
    pub value: String,
    /// Rate per single unit, comma as decimal separator.
    #[serde(rename = "VunitRate", default)]
    pub vunit_rate: String,
}

/// Transcode a windows-1251 body to UTF-8.
pub fn decode_windows_1251(raw: &[u8]) -> String {
    let (text, _, _) = encoding_rs::WINDOWS_1251.decode(raw);
    text.into_owned()
}
