use crate::pipeline::context::CompilerContext;
use crate::pipeline::platform::Platform;
use crate::pipeline::task_trait::{Task, TaskResult};
use anyhow::Result;
use appbuild_core::ArtifactStorage;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the signing key from storage and records its certificate
/// fingerprint.
pub struct ComputeFingerprint {
    storage: Arc<dyn ArtifactStorage>,
}

impl ComputeFingerprint {
    pub fn new(storage: Arc<dyn ArtifactStorage>) -> Self {
        Self { storage }
    }
}

/// SHA-256 as colon separated uppercase hex pairs, `AB:CD:...`.
pub fn fingerprint(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(":")
}

#[async_trait]
impl<P: Platform> Task<P> for ComputeFingerprint {
    fn name(&self) -> &'static str {
        "ComputeFingerprint"
    }

    async fn execute(&self, context: &mut CompilerContext<P>) -> Result<TaskResult> {
        let config = context.config();
        let key_name = match &config.signing_key {
            Some(key) => key,
            None if config.flavor.is_store_distribution() => {
                return Ok(TaskResult::failure(format!(
                    "A signing key is required for {} builds",
                    config.flavor
                )));
            }
            None => {
                debug!("No signing key supplied, skipping fingerprint");
                return Ok(TaskResult::success());
            }
        };

        let key = config.artifact_key(key_name.clone());
        let bytes = match self.storage.read(&key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key = %key, retryable = err.is_retryable(), "Could not read signing key");
                return Ok(TaskResult::failure(format!(
                    "Could not read signing key: {}",
                    err
                )));
            }
        };
        if bytes.is_empty() {
            return Ok(TaskResult::failure(format!("Signing key {} is empty", key)));
        }

        let fingerprint = fingerprint(&bytes);
        debug!(key = %key, fingerprint = %fingerprint, "Computed signing key fingerprint");
        context.aggregation_mut().fingerprint = Some(fingerprint);
        Ok(TaskResult::success())
    }
}
