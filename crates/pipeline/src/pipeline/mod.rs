pub mod cancel;
pub mod context;
pub mod orchestrator;
pub mod outcome;
pub mod platform;
pub mod registry;
pub mod request;
pub mod task_trait;
pub mod tasks;

pub use cancel::CancellationFlag;
pub use context::CompilerContext;
pub use orchestrator::PipelineOrchestrator;
pub use platform::{Android, Ios, Platform};
pub use registry::TaskRegistry;
pub use task_trait::{Task, TaskResult};
