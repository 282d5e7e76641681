use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{PersistenceError, SnapshotStore};

/// In-process store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current raw payload
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().map(|s| s.clone()).unwrap_or(None)
    }

    /// Replace the raw payload, bypassing encoding
    pub fn set_raw(&self, payload: &str) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(payload.to_string());
        }
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn read(&mut self) -> Result<Option<String>, PersistenceError> {
        Ok(self.raw())
    }

    async fn write(&mut self, payload: &str) -> Result<(), PersistenceError> {
        self.set_raw(payload);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
