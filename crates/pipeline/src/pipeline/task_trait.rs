use super::context::CompilerContext;
use super::platform::Platform;
use anyhow::Result;
use appbuild_core::ConfigurationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of one task. A failure is an expected, user-facing condition and
/// stops the pipeline; it is never used for programming errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub error_message: Option<String>,
}

impl TaskResult {
    pub fn success() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl From<ConfigurationError> for TaskResult {
    fn from(err: ConfigurationError) -> Self {
        TaskResult::failure(err.to_string())
    }
}

/// One unit of pipeline work, bound to a single platform family.
///
/// Tasks are stateless apart from the collaborators they were constructed
/// with. They may read all of the context but can only write its aggregation
/// area. Returning `Err` aborts the whole build request.
#[async_trait]
pub trait Task<P: Platform>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, context: &mut CompilerContext<P>) -> Result<TaskResult>;
}
