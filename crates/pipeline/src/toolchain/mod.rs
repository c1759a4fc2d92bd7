//! Packaging toolchain boundary.
//!
//! The toolchain turns a finished context into the installable file. The
//! pipeline treats it as one opaque call and bounds it with a timeout.

mod command;
mod dry_run;

pub use command::CommandToolchain;
pub use dry_run::DryRunToolchain;

use crate::pipeline::{CompilerContext, Platform};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// File produced by a toolchain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Toolchain exited with {}: {stderr}", describe_exit(.code))]
    Exit { code: Option<i32>, stderr: String },

    #[error("Toolchain did not produce {0}")]
    MissingOutput(PathBuf),

    #[error("Toolchain I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not stage toolchain inputs: {0}")]
    Staging(#[from] serde_json::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

#[async_trait]
pub trait PackagingToolchain<P: Platform>: Send + Sync {
    fn name(&self) -> &str;

    async fn package(&self, context: &CompilerContext<P>) -> Result<PackagedArtifact, ToolchainError>;
}

/// File name the toolchain is asked to produce for `context`.
pub fn output_file_name<P: Platform>(context: &CompilerContext<P>) -> String {
    let config = context.config();
    format!("{}.{}", config.project.name, config.flavor.output_extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Ios;
    use appbuild_core::{BuildFlavor, Project, Screen};

    #[test]
    fn test_output_file_name_uses_flavor_extension() {
        let context = CompilerContext::<Ios>::builder()
            .project(Project::new("p-1", "HelloPurr").with_screen(Screen::new("Screen1")))
            .flavor(BuildFlavor::StoreSubmission)
            .build()
            .unwrap();

        assert_eq!(output_file_name(&context), "HelloPurr.ipa");
    }

    #[test]
    fn test_exit_error_display() {
        let err = ToolchainError::Exit {
            code: Some(2),
            stderr: "bad manifest".to_string(),
        };
        assert_eq!(err.to_string(), "Toolchain exited with status 2: bad manifest");

        let err = ToolchainError::Exit {
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Toolchain exited with signal: ");
    }
}
