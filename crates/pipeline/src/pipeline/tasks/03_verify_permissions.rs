use crate::pipeline::context::CompilerContext;
use crate::pipeline::platform::Android;
use crate::pipeline::task_trait::{Task, TaskResult};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// Permissions a store listing only accepts with an explicit declaration.
pub const RESTRICTED_PERMISSIONS: &[&str] = &[
    "android.permission.SEND_SMS",
    "android.permission.RECEIVE_SMS",
    "android.permission.READ_SMS",
    "android.permission.READ_CALL_LOG",
    "android.permission.WRITE_CALL_LOG",
    "android.permission.PROCESS_OUTGOING_CALLS",
];

/// Rejects store bundles that would request SMS or call-log access unless the
/// request explicitly allows it.
pub struct VerifyPermissions;

#[async_trait]
impl Task<Android> for VerifyPermissions {
    fn name(&self) -> &'static str {
        "VerifyPermissions"
    }

    async fn execute(&self, context: &mut CompilerContext<Android>) -> Result<TaskResult> {
        let info = match context.require_component_info() {
            Ok(info) => info,
            Err(err) => return Ok(err.into()),
        };

        let offending: Vec<String> = RESTRICTED_PERMISSIONS
            .iter()
            .filter_map(|permission| {
                let types = info.types_requiring(permission);
                (!types.is_empty()).then(|| format!("{} (required by {})", permission, types.join(", ")))
            })
            .collect();

        if offending.is_empty() {
            return Ok(TaskResult::success());
        }

        if context.config().allow_dangerous_permissions {
            info!(
                restricted = offending.len(),
                "Restricted permissions allowed by request"
            );
            return Ok(TaskResult::success());
        }

        warn!(restricted = offending.len(), "Restricted permissions requested");
        Ok(TaskResult::failure(format!(
            "Restricted permissions are not allowed for {} builds: {}",
            context.config().flavor,
            offending.join("; ")
        )))
    }
}
