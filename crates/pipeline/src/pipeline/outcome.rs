use super::context::CompilerContext;
use super::platform::Platform;
use appbuild_components::ComponentInfo;
use appbuild_core::{ArtifactKey, BuildFlavor};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one orchestrator run, with the final context state.
#[derive(Debug)]
pub struct BuildOutcome<P: Platform> {
    pub success: bool,
    /// Message of the first failed task.
    pub error_message: Option<String>,
    pub failed_task: Option<String>,
    /// Tasks that ran to completion, in order. A failed task is not included.
    pub executed_tasks: Vec<String>,
    pub context: CompilerContext<P>,
}

impl<P: Platform> BuildOutcome<P> {
    pub fn component_info(&self) -> Option<&ComponentInfo> {
        self.context.aggregation().component_info.as_ref()
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.context.aggregation().fingerprint.as_deref()
    }

    pub fn summary(&self) -> OutcomeSummary {
        let config = self.context.config();
        let aggregation = self.context.aggregation();

        OutcomeSummary {
            project: config.project.id.clone(),
            flavor: config.flavor,
            platform: P::NAME,
            success: self.success,
            error_message: self.error_message.clone(),
            failed_task: self.failed_task.clone(),
            executed_tasks: self.executed_tasks.clone(),
            component_info: aggregation.component_info.clone(),
            fingerprint: aggregation.fingerprint.clone(),
            artifact: aggregation.artifact.clone(),
            artifact_sha256: aggregation.artifact_sha256.clone(),
            manifest: self.context.manifest().map(str::to_string),
            completed_at: Utc::now(),
        }
    }
}

/// Serialisable view of a [`BuildOutcome`] for callers and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    pub project: String,
    pub flavor: BuildFlavor,
    pub platform: &'static str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_task: Option<String>,
    pub executed_tasks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_info: Option<ComponentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    pub completed_at: DateTime<Utc>,
}
