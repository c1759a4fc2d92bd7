//! ArtifactStorage trait definition

use crate::error::StorageError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a stored build artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub owner: String,
    pub project: String,
    pub filename: String,
}

impl ArtifactKey {
    pub fn new(
        owner: impl Into<String>,
        project: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            project: project.into(),
            filename: filename.into(),
        }
    }

    pub fn not_found(&self) -> StorageError {
        StorageError::NotFound {
            owner: self.owner.clone(),
            project: self.project.clone(),
            filename: self.filename.clone(),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.project, self.filename)
    }
}

/// Named build artifact store. Retry policy belongs to implementations, never
/// to the pipeline.
#[async_trait]
pub trait ArtifactStorage: Send + Sync {
    async fn read(&self, key: &ArtifactKey) -> Result<Vec<u8>, StorageError>;

    async fn write(&self, key: &ArtifactKey, bytes: &[u8]) -> Result<(), StorageError>;
}
