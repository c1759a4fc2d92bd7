pub mod config;
pub mod error;
pub mod progress;
pub mod project;
pub mod storage;

pub use config::{BuildServerConfig, ConfigError};
pub use error::{ConfigurationError, StorageError};
pub use progress::{BuildEvent, LoggingReporter, NoOpReporter, Reporter};
pub use project::{BuildFlavor, ComponentInstance, ComponentUsage, Orientation, Project, Screen};
pub use storage::{ArtifactKey, ArtifactStorage, LocalStorage, MemoryStorage};
