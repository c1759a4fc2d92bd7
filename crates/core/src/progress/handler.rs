//! Reporter trait and events

use std::time::Duration;

/// Events emitted while a build request moves through the pipeline
#[derive(Debug, Clone)]
pub enum BuildEvent {
    /// Pipeline selected its tasks and is about to run them
    BuildStarted {
        project: String,
        flavor: String,
        tasks: usize,
    },

    /// Task execution started
    TaskStarted {
        task: String,
        index: usize,
        total: usize,
    },

    /// Task returned a successful result
    TaskComplete { task: String, duration: Duration },

    /// Task returned a failed result; no later task runs
    TaskFailed {
        task: String,
        message: String,
        duration: Duration,
    },

    /// Cancellation was observed at a task boundary
    Cancelled { before_task: String },

    /// Pipeline finished, successfully or not
    BuildComplete { success: bool, total_time: Duration },
}

/// Receives progress for a build. Reporting never fails a build, so there is
/// nothing to return.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &BuildEvent);
}

/// Reporter that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpReporter;

impl Reporter for NoOpReporter {
    fn report(&self, _event: &BuildEvent) {}
}
