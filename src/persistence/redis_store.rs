use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::time::{timeout, Duration};

use super::{PersistenceError, SnapshotStore};

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Redis persistence for the snapshot
///
/// Stores the JSON payload as a plain string under a single key.
pub struct RedisStore {
    conn: ConnectionManager,
    key: String,
}

impl RedisStore {
    /// Connect to Redis
    ///
    /// # Arguments
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    /// * `key` - Key holding the snapshot
    ///
    /// # Example
    /// ```ignore
    /// let store = RedisStore::new("redis://127.0.0.1:6379", "nexus_mobile_state").await?;
    /// ```
    pub async fn new(redis_url: &str, key: &str) -> Result<Self, PersistenceError> {
        let client = Client::open(redis_url)?;

        let conn = timeout(
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| PersistenceError::Timeout(CONNECT_TIMEOUT_SECS))??;

        tracing::info!("Connected to Redis at {}", redis_url);

        Ok(Self {
            conn,
            key: key.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl SnapshotStore for RedisStore {
    async fn read(&mut self) -> Result<Option<String>, PersistenceError> {
        let payload: Option<String> = self.conn.get(&self.key).await?;
        Ok(payload)
    }

    async fn write(&mut self, payload: &str) -> Result<(), PersistenceError> {
        self.conn.set::<_, _, ()>(&self.key, payload).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("redis:{}", self.key)
    }
}
