//! Redis-backed cache store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{Client, Commands, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::store::CacheStore;
use crate::errors::GatewayError;

/// Cache store over a single Redis connection.
pub struct RedisStore {
    #[allow(dead_code)] // Keep client alive to maintain connection
    client: Client,
    connection: Arc<Mutex<Connection>>,
}

impl RedisStore {
    /// Connect and ping; a bad connection string or unreachable server is a
    /// startup error, not something to discover on the first request.
    pub fn connect(url: &str) -> Result<Self, GatewayError> {
        let client = Client::open(url)?;
        let mut connection = client.get_connection()?;
        redis::cmd("PING").query::<String>(&mut connection)?;

        debug!("connected to redis at {url}");

        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut conn = self.connection.lock().await;
        match conn.get::<_, Option<Vec<u8>>>(key) {
            Ok(value) => value,
            Err(e) => {
                debug!("redis GET failed for {key}: {e}");
                None
            }
        }
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), GatewayError> {
        let mut conn = self.connection.lock().await;
        match ttl {
            Some(duration) => {
                let _: () = conn.set_ex(key, value, duration.as_secs())?;
            }
            None => {
                let _: () = conn.set(key, value)?;
            }
        }
        Ok(())
    }
}
