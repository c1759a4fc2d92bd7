//! Logging-based reporter

use super::{BuildEvent, Reporter};
use tracing::{info, warn};

/// Reporter that forwards build events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingReporter;

impl Reporter for LoggingReporter {
    fn report(&self, event: &BuildEvent) {
        match event {
            BuildEvent::BuildStarted {
                project,
                flavor,
                tasks,
            } => {
                info!(project = %project, flavor = %flavor, tasks, "Starting build");
            }
            BuildEvent::TaskStarted { task, index, total } => {
                info!(
                    task = %task,
                    progress = format!("{}/{}", index, total),
                    "Starting task"
                );
            }
            BuildEvent::TaskComplete { task, duration } => {
                info!(
                    task = %task,
                    duration_ms = duration.as_millis(),
                    "Task complete"
                );
            }
            BuildEvent::TaskFailed {
                task,
                message,
                duration,
            } => {
                warn!(
                    task = %task,
                    error = %message,
                    duration_ms = duration.as_millis(),
                    "Task failed"
                );
            }
            BuildEvent::Cancelled { before_task } => {
                warn!(task = %before_task, "Build cancelled");
            }
            BuildEvent::BuildComplete {
                success,
                total_time,
            } => {
                if *success {
                    info!(total_time_ms = total_time.as_millis(), "Build complete");
                } else {
                    warn!(total_time_ms = total_time.as_millis(), "Build failed");
                }
            }
        }
    }
}
