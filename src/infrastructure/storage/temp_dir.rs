//! Clip storage in a local directory

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::{ClipStorage, StorageError};

/// Clip files kept in one directory, by default under the system temp dir
pub struct TempDirStorage {
    root: PathBuf,
}

impl TempDirStorage {
    /// Store clips in `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ClipStorage for TempDirStorage {
    async fn prepare(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::PrepareFailed {
                path: self.root.display().to_string(),
                reason: e.to_string(),
            })?;
        debug!(root = %self.root.display(), "Storage directory ready");
        Ok(())
    }

    fn destination(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    async fn remove(&self, location: &Path) -> Result<(), StorageError> {
        match fs::remove_file(location).await {
            Ok(()) => {
                debug!(location = %location.display(), "Clip file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(location.display().to_string()))
            }
            Err(e) => Err(StorageError::DeleteFailed {
                path: location.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn exists(&self, location: &Path) -> bool {
        location.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepare_creates_nested_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("a").join("voice-memos");
        let storage = TempDirStorage::new(&root);

        storage.prepare().await.unwrap();
        assert!(root.is_dir());

        // Preparing twice is fine
        storage.prepare().await.unwrap();
    }

    #[test]
    fn destination_joins_root() {
        let storage = TempDirStorage::new("/tmp/voice-memos");
        assert_eq!(
            storage.destination("recording_4.wav"),
            PathBuf::from("/tmp/voice-memos/recording_4.wav")
        );
    }

    #[tokio::test]
    async fn remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TempDirStorage::new(dir.path());
        let clip = storage.destination("recording_0.wav");
        std::fs::write(&clip, b"RIFF").unwrap();
        assert!(storage.exists(&clip));

        storage.remove(&clip).await.unwrap();
        assert!(!storage.exists(&clip));
    }

    #[tokio::test]
    async fn remove_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TempDirStorage::new(dir.path());
        let result = storage.remove(&storage.destination("recording_9.wav")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn remove_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TempDirStorage::new(dir.path());
        let sub = dir.path().join("recording_0.wav");
        std::fs::create_dir(&sub).unwrap();

        let result = storage.remove(&sub).await;
        assert!(matches!(result, Err(StorageError::DeleteFailed { .. })));
        assert!(!storage.exists(&sub));
    }
}
