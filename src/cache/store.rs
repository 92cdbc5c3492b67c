//! Cache store abstraction and the in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::errors::GatewayError;

/// Handle passed to cache-aware clients. `None` means caching is disabled
/// and every cache-touching path is a passthrough to upstream.
pub type SharedCache = Option<Arc<dyn CacheStore>>;

/// Key/value store with per-entry TTL.
///
/// A `ttl` of `None` means the entry never expires. Read failures are the
/// implementation's problem to swallow: `get` returns `None` for both
/// misses and backend errors, so callers always fall through to upstream.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), GatewayError>;
}

struct MemoryEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// In-process store backed by a `HashMap` with lazy expiry.
///
/// Not shared across processes; exists so cache behavior can be exercised
/// without a running Redis.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        Some(entry.value.clone())
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), GatewayError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| GatewayError::Cache(format!("lock poisoned: {e}")))?;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value,
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry::{TimeSeriesEntries, TimeSeriesEntry};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_set_get() {
        let store = MemoryStore::new();
        store.set("k", b"v".to_vec(), None).await.unwrap();
        assert_eq!(store.get("k").await, Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_miss() {
        let store = MemoryStore::new();
        assert_eq!(store.get("absent").await, None);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = MemoryStore::new();
        store
            .set("k", b"v".to_vec(), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert!(store.get("k").await.is_some());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn test_permanent_entry_survives() {
        let store = MemoryStore::new();
        store.set("k", b"v".to_vec(), None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(store.get("k").await.is_some());
    }

    #[tokio::test]
    async fn test_entries_round_trip_through_store() {
        let history: TimeSeriesEntries = vec![
            TimeSeriesEntry {
                date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
                close: dec!(250.55),
                high: dec!(252.1),
                low: dec!(249.33),
                volume: 12_345,
                face_value: dec!(1),
            },
            TimeSeriesEntry {
                date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                close: dec!(251.0),
                high: dec!(251.8),
                low: dec!(250.0),
                volume: 0,
                face_value: dec!(10),
            },
        ];

        let store = MemoryStore::new();
        let bytes = serde_json::to_vec(&history).unwrap();
        store.set("page", bytes, None).await.unwrap();

        let raw = store.get("page").await.unwrap();
        let back: TimeSeriesEntries = serde_json::from_slice(&raw).unwrap();
        assert_eq!(back, history);
    }
}
