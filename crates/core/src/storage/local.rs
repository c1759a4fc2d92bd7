use super::{ArtifactKey, ArtifactStorage};
use crate::error::StorageError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Stores artifacts under `<root>/<owner>/<project>/<filename>`.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &ArtifactKey) -> Result<PathBuf, StorageError> {
        for segment in [&key.owner, &key.project, &key.filename] {
            let mut components = Path::new(segment).components();
            let single_normal = matches!(components.next(), Some(Component::Normal(_)))
                && components.next().is_none();
            if !single_normal {
                return Err(StorageError::Fatal {
                    location: key.to_string(),
                    reason: format!("invalid path segment {:?}", segment),
                });
            }
        }

        Ok(self
            .root
            .join(&key.owner)
            .join(&key.project)
            .join(&key.filename))
    }
}

fn classify(key: &ArtifactKey, err: std::io::Error) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => key.not_found(),
        ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock => {
            StorageError::Retryable {
                location: key.to_string(),
                reason: err.to_string(),
            }
        }
        _ => StorageError::Fatal {
            location: key.to_string(),
            reason: err.to_string(),
        },
    }
}

#[async_trait]
impl ArtifactStorage for LocalStorage {
    async fn read(&self, key: &ArtifactKey) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        debug!(path = %path.display(), "Reading artifact");
        fs::read(&path).await.map_err(|e| classify(key, e))
    }

    async fn write(&self, key: &ArtifactKey, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| classify(key, e))?;
        }
        debug!(path = %path.display(), bytes = bytes.len(), "Writing artifact");
        fs::write(&path, bytes).await.map_err(|e| classify(key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let key = ArtifactKey::new("alice", "42", "android.keystore");

        storage.write(&key, b"keystore-bytes").await.unwrap();

        assert!(dir.path().join("alice/42/android.keystore").exists());
        assert_eq!(storage.read(&key).await.unwrap(), b"keystore-bytes");
    }

    #[tokio::test]
    async fn test_missing_artifact_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let key = ArtifactKey::new("alice", "42", "missing.keystore");

        let err = storage.read(&key).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let key = ArtifactKey::new("alice", "..", "secret");

        let err = storage.read(&key).await.unwrap_err();
        assert!(matches!(err, StorageError::Fatal { .. }));

        let key = ArtifactKey::new("alice", "42", "nested/file");
        assert!(storage.write(&key, b"x").await.is_err());
    }
}
