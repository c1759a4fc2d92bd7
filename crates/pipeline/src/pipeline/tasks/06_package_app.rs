use crate::pipeline::context::CompilerContext;
use crate::pipeline::platform::Platform;
use crate::pipeline::task_trait::{Task, TaskResult};
use crate::toolchain::PackagingToolchain;
use anyhow::Result;
use appbuild_core::ArtifactStorage;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Hands the finished context to the packaging toolchain and stores what it
/// produces.
pub struct PackageApp<P: Platform> {
    toolchain: Arc<dyn PackagingToolchain<P>>,
    storage: Arc<dyn ArtifactStorage>,
    timeout: Duration,
}

impl<P: Platform> PackageApp<P> {
    pub fn new(
        toolchain: Arc<dyn PackagingToolchain<P>>,
        storage: Arc<dyn ArtifactStorage>,
        timeout: Duration,
    ) -> Self {
        Self {
            toolchain,
            storage,
            timeout,
        }
    }
}

#[async_trait]
impl<P: Platform> Task<P> for PackageApp<P> {
    fn name(&self) -> &'static str {
        "PackageApp"
    }

    async fn execute(&self, context: &mut CompilerContext<P>) -> Result<TaskResult> {
        if let Err(err) = context.require_component_info() {
            return Ok(err.into());
        }
        if context.manifest().is_none() {
            return Ok(TaskResult::failure(format!(
                "{} has not been generated",
                P::MANIFEST_FILE
            )));
        }

        let packaged = match timeout(self.timeout, self.toolchain.package(context)).await {
            Ok(Ok(packaged)) => packaged,
            Ok(Err(err)) => {
                warn!(toolchain = self.toolchain.name(), error = %err, "Packaging failed");
                return Ok(TaskResult::failure(format!("Packaging failed: {}", err)));
            }
            Err(_) => {
                warn!(toolchain = self.toolchain.name(), "Packaging timed out");
                return Ok(TaskResult::failure(format!(
                    "Packaging toolchain timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        let key = context.config().artifact_key(packaged.file_name.clone());
        if let Err(err) = self.storage.write(&key, &packaged.bytes).await {
            return Ok(TaskResult::failure(format!(
                "Could not store {}: {}",
                key, err
            )));
        }

        let digest = hex::encode(Sha256::digest(&packaged.bytes));
        info!(
            artifact = %key,
            bytes = packaged.bytes.len(),
            sha256 = %digest,
            "Stored packaged app"
        );

        let aggregation = context.aggregation_mut();
        aggregation.artifact = Some(key);
        aggregation.artifact_sha256 = Some(digest);
        Ok(TaskResult::success())
    }
}
