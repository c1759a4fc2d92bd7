use super::cancel::CancellationFlag;
use super::context::CompilerContext;
use super::outcome::BuildOutcome;
use super::platform::Platform;
use super::registry::TaskRegistry;
use appbuild_core::{BuildEvent, LoggingReporter, Reporter};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error};

/// A task hit an internal invariant violation. The build is aborted and no
/// outcome is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Task {task} aborted the build: {error:#}")]
    Fatal {
        task: &'static str,
        error: anyhow::Error,
    },
}

impl PipelineError {
    pub fn task(&self) -> &'static str {
        match self {
            PipelineError::Fatal { task, .. } => task,
        }
    }
}

pub struct PipelineOrchestrator<P: Platform> {
    registry: TaskRegistry<P>,
    reporter: Arc<dyn Reporter>,
    cancellation: CancellationFlag,
}

impl<P: Platform> PipelineOrchestrator<P> {
    pub fn new(registry: TaskRegistry<P>) -> Self {
        Self {
            registry,
            reporter: Arc::new(LoggingReporter),
            cancellation: CancellationFlag::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn registry(&self) -> &TaskRegistry<P> {
        &self.registry
    }

    /// Runs the tasks selected for the context's flavor, in master order,
    /// stopping at the first failed result. The context is consumed and
    /// handed back inside the outcome.
    pub async fn execute(
        &self,
        mut context: CompilerContext<P>,
    ) -> Result<BuildOutcome<P>, PipelineError> {
        let start = Instant::now();
        let flavor = context.config().flavor;
        let tasks = self.registry.select(flavor);
        let total = tasks.len();

        debug!(
            platform = P::NAME,
            flavor = %flavor,
            selected = ?tasks.iter().map(|task| task.name()).collect::<Vec<_>>(),
            "Selected tasks"
        );
        self.reporter.report(&BuildEvent::BuildStarted {
            project: context.config().project.id.clone(),
            flavor: flavor.to_string(),
            tasks: total,
        });

        let mut executed_tasks = Vec::with_capacity(total);
        let mut failure: Option<(&'static str, String)> = None;

        for (index, task) in tasks.into_iter().enumerate() {
            let task_name = task.name();

            if self.cancellation.is_cancelled() {
                self.reporter.report(&BuildEvent::Cancelled {
                    before_task: task_name.to_string(),
                });
                failure = Some((task_name, format!("build cancelled before task {}", task_name)));
                break;
            }

            self.reporter.report(&BuildEvent::TaskStarted {
                task: task_name.to_string(),
                index: index + 1,
                total,
            });

            let task_start = Instant::now();
            let result = match task.execute(&mut context).await {
                Ok(result) => result,
                Err(err) => {
                    let message = format!("{:#}", err);
                    error!(task = task_name, error = %message, "Task aborted the build");
                    self.reporter.report(&BuildEvent::BuildComplete {
                        success: false,
                        total_time: start.elapsed(),
                    });
                    return Err(PipelineError::Fatal {
                        task: task_name,
                        error: err,
                    });
                }
            };

            if result.is_success() {
                self.reporter.report(&BuildEvent::TaskComplete {
                    task: task_name.to_string(),
                    duration: task_start.elapsed(),
                });
                executed_tasks.push(task_name.to_string());
            } else {
                let message = result
                    .error_message
                    .unwrap_or_else(|| format!("Task {} failed", task_name));
                self.reporter.report(&BuildEvent::TaskFailed {
                    task: task_name.to_string(),
                    message: message.clone(),
                    duration: task_start.elapsed(),
                });
                failure = Some((task_name, message));
                break;
            }
        }

        let success = failure.is_none();
        self.reporter.report(&BuildEvent::BuildComplete {
            success,
            total_time: start.elapsed(),
        });

        let (failed_task, error_message) = match failure {
            Some((task, message)) => (Some(task.to_string()), Some(message)),
            None => (None, None),
        };

        Ok(BuildOutcome {
            success,
            error_message,
            failed_task,
            executed_tasks,
            context,
        })
    }
}
