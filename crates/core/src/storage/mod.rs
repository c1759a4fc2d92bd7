//! Artifact storage boundary used by tasks that read keys or publish outputs

mod local;
mod memory;
mod r#trait;

pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use r#trait::{ArtifactKey, ArtifactStorage};
