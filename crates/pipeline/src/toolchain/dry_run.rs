use super::{PackagedArtifact, PackagingToolchain, ToolchainError};
use crate::pipeline::{CompilerContext, Platform};
use async_trait::async_trait;
use serde_json::json;

/// Writes a JSON description of what would have been packaged instead of
/// running a real toolchain.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunToolchain;

#[async_trait]
impl<P: Platform> PackagingToolchain<P> for DryRunToolchain {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn package(&self, context: &CompilerContext<P>) -> Result<PackagedArtifact, ToolchainError> {
        let config = context.config();
        let aggregation = context.aggregation();

        let placeholder = json!({
            "platform": P::NAME,
            "project": config.project.id,
            "package": config.project.package_name,
            "flavor": config.flavor,
            "output": super::output_file_name(context),
            "ram_limit_mb": config.ram_limit_mb,
            "companion": config.companion,
            "emulator": config.emulator,
            "fingerprint": aggregation.fingerprint,
            "component_info": aggregation.component_info,
            "manifest_file": P::MANIFEST_FILE,
            "manifest": context.manifest(),
        });

        Ok(PackagedArtifact {
            file_name: format!("{}-{}.dryrun.json", config.project.name, config.flavor),
            bytes: serde_json::to_vec_pretty(&placeholder)?,
        })
    }
}
