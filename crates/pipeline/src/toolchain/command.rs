use super::{output_file_name, PackagedArtifact, PackagingToolchain, ToolchainError};
use crate::pipeline::{CompilerContext, Platform};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

const COMPONENT_INFO_FILE: &str = "component_info.json";

/// Runs an external packaging command in a fresh work directory.
///
/// The command is invoked as `<program> <args...> <work_dir> <flavor> <output>`
/// after the platform manifest and `component_info.json` have been staged in
/// `work_dir`. It must leave the packaged file at `<work_dir>/<output>`. If the
/// packaging future is dropped the child is killed and the work directory is
/// removed with it.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    program: String,
    args: Vec<String>,
    work_root: PathBuf,
}

impl CommandToolchain {
    pub fn new(program: impl Into<String>, work_root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_root: work_root.into(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Splits a whitespace separated command line. No shell quoting is
    /// applied, so arguments cannot contain spaces; `BuildServerConfig::validate`
    /// rejects quoted command lines. Returns `None` for a blank line.
    pub fn from_command_line(command_line: &str, work_root: impl Into<PathBuf>) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, work_root).with_args(parts))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run<P: Platform>(
        &self,
        context: &CompilerContext<P>,
        work_dir: &Path,
    ) -> Result<PackagedArtifact, ToolchainError> {
        let config = context.config();

        if let Some(manifest) = context.manifest() {
            tokio::fs::write(work_dir.join(P::MANIFEST_FILE), manifest).await?;
        }
        let info = serde_json::to_vec_pretty(&context.aggregation().component_info)?;
        tokio::fs::write(work_dir.join(COMPONENT_INFO_FILE), info).await?;

        let output_name = output_file_name(context);
        debug!(
            program = %self.program,
            work_dir = %work_dir.display(),
            output = %output_name,
            "Running packaging toolchain"
        );

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(work_dir)
            .arg(config.flavor.name())
            .arg(&output_name)
            .env("APPBUILD_EMULATOR", config.emulator.to_string())
            .env("APPBUILD_COMPANION", config.companion.to_string())
            .env("APPBUILD_RAM_MB", config.ram_limit_mb.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolchainError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(ToolchainError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let output_path = work_dir.join(&output_name);
        let bytes = match tokio::fs::read(&output_path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolchainError::MissingOutput(output_path));
            }
            Err(err) => return Err(err.into()),
        };

        Ok(PackagedArtifact {
            file_name: output_name,
            bytes,
        })
    }
}

#[async_trait]
impl<P: Platform> PackagingToolchain<P> for CommandToolchain {
    fn name(&self) -> &str {
        &self.program
    }

    async fn package(&self, context: &CompilerContext<P>) -> Result<PackagedArtifact, ToolchainError> {
        tokio::fs::create_dir_all(&self.work_root).await?;
        let work_dir = tempfile::Builder::new()
            .prefix("build-")
            .tempdir_in(&self.work_root)?;

        let result = self.run(context, work_dir.path()).await;

        let path = work_dir.path().to_path_buf();
        if let Err(err) = work_dir.close() {
            warn!(work_dir = %path.display(), error = %err, "Failed to clean up work directory");
        }
        result
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::pipeline::Android;
    use appbuild_components::ComponentInfo;
    use appbuild_core::{BuildFlavor, Project, Screen};
    use tempfile::TempDir;

    fn context() -> CompilerContext<Android> {
        let mut context = CompilerContext::<Android>::builder()
            .project(Project::new("p-1", "HelloPurr").with_screen(Screen::new("Screen1")))
            .flavor(BuildFlavor::Package)
            .build()
            .unwrap();
        let aggregation = context.aggregation_mut();
        aggregation.component_info = Some(ComponentInfo::new());
        aggregation.platform.manifest = Some("<manifest/>".to_string());
        context
    }

    #[test]
    fn test_from_command_line() {
        let toolchain = CommandToolchain::from_command_line("  packager --release  fast ", "/tmp").unwrap();
        assert_eq!(toolchain.program(), "packager");
        assert_eq!(toolchain.args, vec!["--release", "fast"]);
        assert!(CommandToolchain::from_command_line("   ", "/tmp").is_none());
    }

    #[tokio::test]
    async fn test_packages_staged_manifest() {
        let root = TempDir::new().unwrap();
        // Concatenate the staged manifest and the flavor into the output file.
        let toolchain = CommandToolchain::new("sh", root.path()).with_args([
            "-c",
            r#"cat "$0/AndroidManifest.xml" > "$0/$2" && printf ' %s' "$1" >> "$0/$2""#,
        ]);

        let artifact = toolchain.package(&context()).await.unwrap();

        assert_eq!(artifact.file_name, "HelloPurr.apk");
        assert_eq!(artifact.bytes, b"<manifest/> package");
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_stderr() {
        let root = TempDir::new().unwrap();
        let toolchain = CommandToolchain::new("sh", root.path())
            .with_args(["-c", "echo 'signing failed' >&2; exit 4"]);

        let err = toolchain.package(&context()).await.unwrap_err();

        assert!(matches!(
            err,
            ToolchainError::Exit { code: Some(4), ref stderr } if stderr == "signing failed"
        ));
    }

    #[tokio::test]
    async fn test_missing_output() {
        let root = TempDir::new().unwrap();
        let toolchain = CommandToolchain::new("sh", root.path()).with_args(["-c", "true"]);

        let err = toolchain.package(&context()).await.unwrap_err();
        assert!(matches!(err, ToolchainError::MissingOutput(_)));
    }

    #[tokio::test]
    async fn test_timeout_removes_work_directory() {
        let root = TempDir::new().unwrap();
        let toolchain = CommandToolchain::new("sh", root.path()).with_args(["-c", "sleep 30"]);
        let context = context();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(500),
            PackagingToolchain::<Android>::package(&toolchain, &context),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_program() {
        let root = TempDir::new().unwrap();
        let toolchain = CommandToolchain::new("/nonexistent/appbuild-packager", root.path());

        let err = toolchain.package(&context()).await.unwrap_err();
        assert!(matches!(err, ToolchainError::Spawn { .. }));
    }
}
