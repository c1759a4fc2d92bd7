use crate::pipeline::context::CompilerContext;
use crate::pipeline::platform::Platform;
use crate::pipeline::task_trait::{Task, TaskResult};
use anyhow::Result;
use appbuild_components::ComponentDatabase;
use appbuild_core::ConfigurationError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Derives which component types, and which blocks per type, the project
/// uses. Everything downstream reads this instead of walking the tree again.
pub struct ReadBuildInfo {
    database: Arc<ComponentDatabase>,
}

impl ReadBuildInfo {
    pub fn new(database: Arc<ComponentDatabase>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl<P: Platform> Task<P> for ReadBuildInfo {
    fn name(&self) -> &'static str {
        "ReadBuildInfo"
    }

    async fn execute(&self, context: &mut CompilerContext<P>) -> Result<TaskResult> {
        let (config, aggregation) = context.parts_mut();

        if config.project.screens.is_empty() {
            return Ok(ConfigurationError::missing("project.screens").into());
        }

        let shadowed: Vec<&str> = config
            .extensions
            .keys()
            .map(String::as_str)
            .filter(|component_type| self.database.contains(component_type))
            .collect();
        if !shadowed.is_empty() {
            return Ok(ConfigurationError::invalid(
                "extensions",
                format!("redefines built-in component types: {}", shadowed.join(", ")),
            )
            .into());
        }

        let usage = config.project.component_usage();
        debug!(
            screens = config.project.screens.len(),
            component_types = usage.types.len(),
            extensions = config.extensions.len(),
            "Read build info"
        );
        aggregation.usage = Some(usage);

        Ok(TaskResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::platform::Android;
    use appbuild_components::ComponentDescriptor;
    use appbuild_core::{BuildFlavor, ComponentInstance, Project, Screen};

    fn database() -> Arc<ComponentDatabase> {
        Arc::new(ComponentDatabase::builtin().unwrap())
    }

    fn context(project: Project) -> CompilerContext<Android> {
        CompilerContext::builder()
            .project(project)
            .flavor(BuildFlavor::Package)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_records_usage() {
        let project = Project::new("p-1", "Usage").with_screen(
            Screen::new("Screen1")
                .with_component(ComponentInstance::new("Label1", "Label"))
                .with_component(ComponentInstance::new("Texting1", "Texting").with_blocks(["MessageReceived"])),
        );
        let mut context = context(project);

        let result = ReadBuildInfo::new(database()).execute(&mut context).await.unwrap();

        assert!(result.is_success());
        let usage = context.require_usage().unwrap();
        assert_eq!(usage.types.len(), 2);
        assert!(usage.blocks_for("Texting").unwrap().contains("MessageReceived"));
    }

    #[tokio::test]
    async fn test_project_without_screens_fails() {
        let mut context = context(Project::new("p-1", "Empty"));

        let result = ReadBuildInfo::new(database()).execute(&mut context).await.unwrap();

        assert!(!result.is_success());
        assert!(result.error_message.unwrap().contains("project.screens"));
        assert!(context.aggregation().usage.is_none());
    }

    #[tokio::test]
    async fn test_extension_shadowing_builtin_fails() {
        let mut context = CompilerContext::<Android>::builder()
            .project(Project::new("p-1", "Shadow").with_screen(Screen::new("Screen1")))
            .flavor(BuildFlavor::Package)
            .extension("Texting", ComponentDescriptor::new())
            .extension("com.example.Ext", ComponentDescriptor::new())
            .build()
            .unwrap();

        let result = ReadBuildInfo::new(database()).execute(&mut context).await.unwrap();

        assert!(!result.is_success());
        let message = result.error_message.unwrap();
        assert!(message.contains("`extensions`"));
        assert!(message.contains("Texting"));
        assert!(!message.contains("com.example.Ext"));
    }
}
