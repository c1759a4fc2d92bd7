//! Metadata resolver.
//!
//! Walks the used component types against the database (falling back to
//! request extensions) and collects, per type, the permissions and manifest
//! fragments the project needs. Block usage is the union over every instance
//! of a type, so one instance using a trigger block enables the fragment for
//! all instances of that type.

use crate::pipeline::context::CompilerContext;
use crate::pipeline::platform::Platform;
use crate::pipeline::task_trait::{Task, TaskResult};
use anyhow::Result;
use appbuild_components::{ComponentDatabase, ComponentDescriptor, ComponentInfo};
use appbuild_core::ComponentUsage;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

pub struct LoadComponentInfo {
    database: Arc<ComponentDatabase>,
}

impl LoadComponentInfo {
    pub fn new(database: Arc<ComponentDatabase>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl<P: Platform> Task<P> for LoadComponentInfo {
    fn name(&self) -> &'static str {
        "LoadComponentInfo"
    }

    async fn execute(&self, context: &mut CompilerContext<P>) -> Result<TaskResult> {
        let usage = match context.require_usage() {
            Ok(usage) => usage,
            Err(err) => return Ok(err.into()),
        };

        let info = resolve(&self.database, &context.config().extensions, usage);
        info!(
            component_types = info.permissions.len(),
            permissions = info.all_permissions().len(),
            "Resolved component info"
        );
        context.aggregation_mut().component_info = Some(info);

        Ok(TaskResult::success())
    }
}

/// Resolves `usage` into per-type manifest requirements.
///
/// Unknown types get empty sets. The result only depends on the inputs, so
/// resolving twice gives identical output.
pub fn resolve(
    database: &ComponentDatabase,
    extensions: &BTreeMap<String, ComponentDescriptor>,
    usage: &ComponentUsage,
) -> ComponentInfo {
    let empty = BTreeSet::new();
    let mut info = ComponentInfo::new();

    for component_type in &usage.types {
        info.ensure_type(component_type);

        let descriptor = match database
            .get(component_type)
            .or_else(|| extensions.get(component_type))
        {
            Some(descriptor) => descriptor,
            None => {
                debug!(component_type = %component_type, "No descriptor, contributes nothing");
                continue;
            }
        };
        let used = usage.blocks_for(component_type).unwrap_or(&empty);

        for permission in &descriptor.permissions {
            info.add_permission(component_type, permission.as_str());
        }
        for conditional in &descriptor.conditional_permissions {
            if conditional.triggered_by(used) {
                info.add_permission(component_type, conditional.fragment.as_str());
            }
        }
        for receiver in &descriptor.receivers {
            if receiver.triggered_by(used) {
                info.add_receiver(component_type, receiver.fragment.as_str());
            }
        }
        for activity in &descriptor.activities {
            if activity.is_unconditional() || activity.triggered_by(used) {
                info.add_activity(component_type, activity.fragment.as_str());
            }
        }
        for service in &descriptor.services {
            if service.is_unconditional() || service.triggered_by(used) {
                info.add_service(component_type, service.fragment.as_str());
            }
        }
        if let Some(min_sdk) = descriptor.min_sdk {
            info.set_min_sdk(component_type, min_sdk);
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::platform::Ios;
    use appbuild_components::ConditionalFragment;
    use appbuild_core::{BuildFlavor, Project, Screen};

    fn usage(entries: &[(&str, &[&str])]) -> ComponentUsage {
        let mut usage = ComponentUsage::default();
        for (component_type, blocks) in entries {
            usage.record(component_type, blocks.iter().map(|b| b.to_string()));
        }
        usage
    }

    #[test]
    fn test_unknown_type_resolves_to_empty_sets() {
        let info = resolve(
            &ComponentDatabase::empty(),
            &BTreeMap::new(),
            &usage(&[("Mystery", &["Anything"])]),
        );

        assert!(info.permissions_for("Mystery").unwrap().is_empty());
        assert!(info.receivers_for("Mystery").unwrap().is_empty());
        assert!(info.activities_for("Mystery").unwrap().is_empty());
        assert!(info.services_for("Mystery").unwrap().is_empty());
        assert!(info.min_sdks.is_empty());
    }

    #[test]
    fn test_extension_used_when_database_lacks_type() {
        let mut extensions = BTreeMap::new();
        extensions.insert(
            "com.example.Beacon".to_string(),
            ComponentDescriptor::new()
                .with_permissions(["android.permission.BLUETOOTH_SCAN"])
                .with_service(ConditionalFragment::always("<service android:name=\"BeaconService\"/>"))
                .with_min_sdk(21),
        );

        let info = resolve(
            &ComponentDatabase::empty(),
            &extensions,
            &usage(&[("com.example.Beacon", &[])]),
        );

        assert!(info
            .permissions_for("com.example.Beacon")
            .unwrap()
            .contains("android.permission.BLUETOOTH_SCAN"));
        assert_eq!(info.services_for("com.example.Beacon").unwrap().len(), 1);
        assert_eq!(info.max_min_sdk(), Some(21));
    }

    #[test]
    fn test_conditional_permissions_follow_trigger_blocks() {
        let database = ComponentDatabase::builtin().unwrap();

        let idle = resolve(&database, &BTreeMap::new(), &usage(&[("Texting", &[])]));
        let sending = resolve(
            &database,
            &BTreeMap::new(),
            &usage(&[("Texting", &["SendMessageDirect"])]),
        );

        assert!(!idle
            .permissions_for("Texting")
            .unwrap()
            .contains("android.permission.SEND_SMS"));
        assert!(sending
            .permissions_for("Texting")
            .unwrap()
            .contains("android.permission.SEND_SMS"));
        assert_eq!(sending.services_for("Texting").unwrap().len(), 1);
        assert!(idle.services_for("Texting").unwrap().is_empty());
    }

    #[test]
    fn test_receivers_without_trigger_are_not_included() {
        let database = ComponentDatabase::from_entries([(
            "Odd".to_string(),
            ComponentDescriptor::new()
                .with_receiver(ConditionalFragment::always("<receiver android:name=\"Odd\"/>")),
        )])
        .unwrap();

        let info = resolve(&database, &BTreeMap::new(), &usage(&[("Odd", &["X"])]));
        assert!(info.receivers_for("Odd").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_usage_is_configuration_failure() {
        let mut context = CompilerContext::<Ios>::builder()
            .project(Project::new("p-1", "NoUsage").with_screen(Screen::new("Screen1")))
            .flavor(BuildFlavor::IosPackage)
            .build()
            .unwrap();

        let task = LoadComponentInfo::new(Arc::new(ComponentDatabase::builtin().unwrap()));
        let result = task.execute(&mut context).await.unwrap();

        assert!(!result.is_success());
        assert!(result.error_message.unwrap().contains("component_usage"));
        assert!(context.aggregation().component_info.is_none());
    }
}
