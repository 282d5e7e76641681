// Crash/reload recovery: one snapshot of {position, run state} under a single key
pub mod file_store;
pub mod memory_store;
pub mod redis_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::execution::Position;
use crate::models::RunState;

/// Schema version written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection timeout after {0} seconds")]
    Timeout(u64),

    #[error("invalid snapshot payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("inconsistent snapshot: {0}")]
    Inconsistent(String),
}

/// Durable key/value slot holding the serialized snapshot
#[async_trait]
pub trait SnapshotStore: Send {
    /// Read the raw payload, `None` if nothing was ever written
    async fn read(&mut self) -> Result<Option<String>, PersistenceError>;

    /// Overwrite the payload
    async fn write(&mut self, payload: &str) -> Result<(), PersistenceError>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}

/// Everything needed to resume after a restart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub position: Position,
    pub run_state: RunState,
}

/// Wire format. A payload without `version` is the legacy unversioned blob (version 0),
/// which has the same fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSnapshot {
    #[serde(default)]
    version: u32,
    is_running: bool,
    balance: f64,
    coin_volume: f64,
    avg_price: f64,
}

pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String, PersistenceError> {
    let stored = StoredSnapshot {
        version: SNAPSHOT_VERSION,
        is_running: snapshot.run_state.is_running,
        balance: snapshot.position.balance,
        coin_volume: snapshot.position.quantity,
        avg_price: snapshot.position.avg_entry_price,
    };

    Ok(serde_json::to_string(&stored)?)
}

pub fn decode_snapshot(payload: &str) -> Result<Snapshot, PersistenceError> {
    let stored: StoredSnapshot = serde_json::from_str(payload)?;

    match stored.version {
        // v0 -> v1 added only the version tag
        0 | SNAPSHOT_VERSION => {}
        other => return Err(PersistenceError::UnsupportedVersion(other)),
    }

    let position = Position {
        balance: stored.balance,
        quantity: stored.coin_volume,
        avg_entry_price: stored.avg_price,
    };

    if !position.is_consistent() {
        return Err(PersistenceError::Inconsistent(format!("{:?}", position)));
    }

    Ok(Snapshot {
        position,
        run_state: RunState {
            is_running: stored.is_running,
        },
    })
}

/// Best-effort persistence in front of a [`SnapshotStore`]
///
/// Never surfaces errors: a lost snapshot falls back to defaults on the next
/// start, while a failing trading loop would not recover at all.
pub struct PersistenceGateway<S> {
    store: S,
}

impl<S: SnapshotStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrite the stored snapshot, logging any failure
    pub async fn save(&mut self, position: &Position, run_state: RunState) {
        let snapshot = Snapshot {
            position: *position,
            run_state,
        };

        let result = match encode_snapshot(&snapshot) {
            Ok(payload) => self.store.write(&payload).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => tracing::debug!(
                store = %self.store.describe(),
                running = run_state.is_running,
                "Saved snapshot"
            ),
            Err(e) => tracing::warn!(
                store = %self.store.describe(),
                "Failed to save snapshot: {}",
                e
            ),
        }
    }

    /// Last snapshot, or None if absent, unreadable or malformed
    pub async fn load(&mut self) -> Option<Snapshot> {
        let payload = match self.store.read().await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::info!(store = %self.store.describe(), "No saved snapshot found");
                return None;
            }
            Err(e) => {
                tracing::warn!(store = %self.store.describe(), "Failed to read snapshot: {}", e);
                return None;
            }
        };

        match decode_snapshot(&payload) {
            Ok(snapshot) => {
                tracing::info!(
                    store = %self.store.describe(),
                    running = snapshot.run_state.is_running,
                    balance = %snapshot.position.balance,
                    quantity = %snapshot.position.quantity,
                    "Loaded snapshot"
                );
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed snapshot: {}", e);
                None
            }
        }
    }
}
