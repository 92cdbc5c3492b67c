//! HTTP surface: route table, shared state and handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::debug;

use crate::clients::PriceHistoryProvider;
use crate::errors::GatewayError;
use crate::models::entry::TimeSeriesEntries;
use crate::utils::sanitize::sanitize_ticker;

/// Shared handler state: one provider per exchange route.
pub struct AppState {
    pub moex: Arc<dyn PriceHistoryProvider>,
    pub spbex: Arc<dyn PriceHistoryProvider>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/moex/{ticker}", get(moex_history))
        .route("/spbex/{ticker}", get(spbex_history))
        .route("/healthcheck", get(healthcheck))
        .with_state(state)
}

async fn moex_history(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<TimeSeriesEntries>, GatewayError> {
    fetch_history(state.moex.as_ref(), &ticker).await
}

async fn spbex_history(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<TimeSeriesEntries>, GatewayError> {
    fetch_history(state.spbex.as_ref(), &ticker).await
}

async fn fetch_history(
    provider: &dyn PriceHistoryProvider,
    raw_ticker: &str,
) -> Result<Json<TimeSeriesEntries>, GatewayError> {
    let ticker = sanitize_ticker(raw_ticker);
    if ticker.is_empty() {
        return Err(GatewayError::NotFound);
    }

    debug!("fetching {ticker} from {}", provider.id());
    let entries = provider.fetch(&ticker).await?;
    Ok(Json(entries))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    use crate::models::entry::TimeSeriesEntry;

    struct StubProvider {
        result: fn(&str) -> Result<TimeSeriesEntries, GatewayError>,
    }

    #[async_trait]
    impl PriceHistoryProvider for StubProvider {
        fn id(&self) -> &'static str {
            "STUB"
        }

        async fn fetch(&self, ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
            (self.result)(ticker)
        }
    }

    fn one_entry(_ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
        let mut entry = TimeSeriesEntry::placeholder(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        entry.close = dec!(250.55);
        Ok(vec![entry])
    }

    fn not_found(_ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
        Err(GatewayError::NotFound)
    }

    fn router_with(result: fn(&str) -> Result<TimeSeriesEntries, GatewayError>) -> Router {
        let state = Arc::new(AppState {
            moex: Arc::new(StubProvider { result }),
            spbex: Arc::new(StubProvider { result }),
        });
        create_router(state)
    }

    async fn get_response(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_history_route_returns_entries() {
        let (status, body) = get_response(router_with(one_entry), "/moex/SBER").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["date"], "2024-01-09");
        assert_eq!(body[0]["close"], "250.55");
        assert_eq!(body[0]["facevalue"], "1");
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_404() {
        let (status, body) = get_response(router_with(not_found), "/spbex/NOPE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "not found");
    }

    #[tokio::test]
    async fn test_symbol_only_ticker_is_404_without_provider_call() {
        fn panic_if_called(_ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
            panic!("provider must not be called for an empty sanitized ticker");
        }
        let (status, _) = get_response(router_with(panic_if_called), "/moex/!!!").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ticker_is_sanitized_before_fetch() {
        fn assert_sanitized(ticker: &str) -> Result<TimeSeriesEntries, GatewayError> {
            assert_eq!(ticker, "sber");
            Ok(TimeSeriesEntries::new())
        }
        let (status, _) = get_response(router_with(assert_sanitized), "/moex/SBER").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let (status, body) = get_response(router_with(one_entry), "/healthcheck").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
