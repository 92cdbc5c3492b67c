//! Gateway error types and their HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while fetching and normalizing upstream data.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Unknown ticker, no primary board, or empty upstream dataset.
    #[error("not found")]
    NotFound,

    /// Network or transport failure talking to an upstream.
    #[error("could not fetch data: {0}")]
    CouldNotFetchData(String),

    /// Upstream returned a JSON body we could not decode.
    #[error("could not parse json: {0}")]
    CouldNotParseJson(String),

    /// Upstream returned an XML body we could not decode.
    #[error("could not parse xml: {0}")]
    CouldNotParseXml(String),

    /// A live-price field was present but null.
    #[error("no current price data")]
    NoData,

    /// Outbound URL is outside the upstream allow-list.
    #[error("url is not allowed: {0}")]
    NotAllowed(String),

    /// Cache backend failure.
    #[error("cache error: {0}")]
    Cache(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::CouldNotFetchData(err.to_string())
    }
}

impl From<redis::RedisError> for GatewayError {
    fn from(err: redis::RedisError) -> Self {
        GatewayError::Cache(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GatewayError::NotFound => (StatusCode::NOT_FOUND, json!({ "status": "not found" })),
            _ => (StatusCode::BAD_REQUEST, json!({ "status": "bad request" })),
        };
        (status, axum::Json(body)).into_response()
    }
}
