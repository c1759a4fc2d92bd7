pub mod pipeline;
pub mod toolchain;

pub use pipeline::context::{Aggregation, BuildConfig, CompilerContext, ContextBuilder};
pub use pipeline::orchestrator::{PipelineError, PipelineOrchestrator};
pub use pipeline::outcome::{BuildOutcome, OutcomeSummary};
pub use pipeline::platform::{Android, Ios, Platform};
pub use pipeline::registry::{Collaborators, TaskRegistry};
pub use pipeline::request::BuildRequest;
pub use pipeline::task_trait::{Task, TaskResult};
pub use toolchain::{CommandToolchain, DryRunToolchain, PackagedArtifact, PackagingToolchain, ToolchainError};
