use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{PersistenceError, SnapshotStore};

/// Snapshot kept in a JSON file
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn read(&mut self) -> Result<Option<String>, PersistenceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&mut self, payload: &str) -> Result<(), PersistenceError> {
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Position;
    use crate::models::RunState;
    use crate::persistence::PersistenceGateway;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("nexusbot-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_file_reads_none() {
        let mut store = FileStore::new(scratch_path());
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let path = scratch_path();
        let mut store = FileStore::new(&path);

        tokio_test::assert_ok!(store.write("{\"a\":1}").await);
        assert_eq!(store.read().await.unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(!store.tmp_path().exists());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_gateway_survives_restart() {
        let path = scratch_path();
        let position = Position {
            balance: 0.0,
            quantity: 0.125,
            avg_entry_price: 80_000_000.0,
        };

        {
            let mut gateway = PersistenceGateway::new(FileStore::new(&path));
            gateway.save(&position, RunState { is_running: true }).await;
        }

        // Fresh gateway, as after a process restart
        let mut gateway = PersistenceGateway::new(FileStore::new(&path));
        let snapshot = gateway.load().await.unwrap();

        assert_eq!(snapshot.position, position);
        assert!(snapshot.run_state.is_running);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_save_to_unwritable_path_does_not_panic() {
        let path = std::env::temp_dir()
            .join(format!("nexusbot-missing-{}", uuid::Uuid::new_v4()))
            .join("state.json");
        let mut gateway = PersistenceGateway::new(FileStore::new(&path));

        gateway.save(&Position::flat(1.0), RunState::default()).await;
        assert!(gateway.load().await.is_none());
    }
}
