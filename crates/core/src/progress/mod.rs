//! Progress reporting for build pipeline runs

mod handler;
mod logging;

pub use handler::{BuildEvent, NoOpReporter, Reporter};
pub use logging::LoggingReporter;
