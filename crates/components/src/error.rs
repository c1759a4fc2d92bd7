use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to read component catalogue {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse component catalogue: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Component type {0} is defined more than once")]
    DuplicateType(String),

    #[error("Component entry has an empty type name")]
    EmptyTypeName,
}
