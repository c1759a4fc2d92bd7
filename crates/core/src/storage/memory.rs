use super::{ArtifactKey, ArtifactStorage};
use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-process storage for tests and dry runs.
#[derive(Default)]
pub struct MemoryStorage {
    artifacts: RwLock<HashMap<ArtifactKey, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(self, key: ArtifactKey, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(key, bytes);
        self
    }

    pub fn insert(&self, key: ArtifactKey, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut artifacts) = self.artifacts.write() {
            artifacts.insert(key, bytes.into());
        }
    }

    pub fn get(&self, key: &ArtifactKey) -> Option<Vec<u8>> {
        self.artifacts
            .read()
            .ok()
            .and_then(|artifacts| artifacts.get(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.artifacts.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(key: &ArtifactKey) -> StorageError {
    StorageError::Fatal {
        location: key.to_string(),
        reason: "storage lock poisoned".to_string(),
    }
}

#[async_trait]
impl ArtifactStorage for MemoryStorage {
    async fn read(&self, key: &ArtifactKey) -> Result<Vec<u8>, StorageError> {
        let artifacts = self.artifacts.read().map_err(|_| poisoned(key))?;
        artifacts.get(key).cloned().ok_or_else(|| key.not_found())
    }

    async fn write(&self, key: &ArtifactKey, bytes: &[u8]) -> Result<(), StorageError> {
        let mut artifacts = self.artifacts.write().map_err(|_| poisoned(key))?;
        artifacts.insert(key.clone(), bytes.to_vec());
        Ok(())
    }
}
