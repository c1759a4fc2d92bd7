//! Output formatting for build outcomes, resolved component info and the
//! component catalogue.

use anyhow::{Context, Result};
use appbuild_components::{ComponentDatabase, ComponentInfo};
use appbuild_pipeline::OutcomeSummary;
use serde_json::json;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_outcome(&self, summary: &OutcomeSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(summary)
                .context("Failed to serialize build outcome to JSON"),
            OutputFormat::Human => Ok(self.format_outcome_human(summary)),
        }
    }

    pub fn format_component_info(&self, info: &ComponentInfo) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(info)
                .context("Failed to serialize component info to JSON"),
            OutputFormat::Human => Ok(self.format_component_info_human(info)),
        }
    }

    pub fn format_catalogue(&self, database: &ComponentDatabase) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<_> = database
                    .iter()
                    .map(|(component_type, descriptor)| {
                        json!({
                            "type": component_type,
                            "permissions": descriptor.permissions,
                            "conditional_permissions": descriptor.conditional_permissions.len(),
                            "receivers": descriptor.receivers.len(),
                            "activities": descriptor.activities.len(),
                            "services": descriptor.services.len(),
                            "min_sdk": descriptor.min_sdk,
                        })
                    })
                    .collect();
                serde_json::to_string_pretty(&entries)
                    .context("Failed to serialize component catalogue to JSON")
            }
            OutputFormat::Human => Ok(self.format_catalogue_human(database)),
        }
    }

    fn format_outcome_human(&self, summary: &OutcomeSummary) -> String {
        let mut output = String::new();

        if summary.success {
            output.push_str("\u{2713} Build Succeeded\n");
        } else {
            output.push_str("\u{2717} Build Failed\n");
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Project:   {}\n", summary.project));
        output.push_str(&format!(
            "Target:    {} ({})\n",
            summary.flavor, summary.platform
        ));
        if summary.executed_tasks.is_empty() {
            output.push_str("Tasks:     (none completed)\n");
        } else {
            output.push_str(&format!(
                "Tasks:     {}\n",
                summary.executed_tasks.join(" \u{2192} ")
            ));
        }

        if let Some(task) = &summary.failed_task {
            output.push_str(&format!("Failed:    {}\n", task));
        }
        if let Some(message) = &summary.error_message {
            output.push_str(&format!("Error:     {}\n", message));
        }

        let artifacts: Vec<(&str, String)> = [
            ("Fingerprint:", summary.fingerprint.clone()),
            ("Package:    ", summary.artifact.as_ref().map(|key| key.to_string())),
            ("SHA-256:    ", summary.artifact_sha256.clone()),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|value| (label, value)))
        .collect();

        if !artifacts.is_empty() {
            output.push_str("\nArtifacts:\n");
            for (index, (label, value)) in artifacts.iter().enumerate() {
                output.push_str(&format!("{} {} {}\n", branch(index, artifacts.len()), label, value));
            }
        }

        if let Some(info) = &summary.component_info {
            output.push('\n');
            output.push_str(&self.format_component_info_human(info));
        }

        output
    }

    fn format_component_info_human(&self, info: &ComponentInfo) -> String {
        let mut output = String::from("Components:\n");
        let types: Vec<&str> = info.component_types().collect();

        if types.is_empty() {
            output.push_str("\u{2514}\u{2500} (none)\n");
            return output;
        }

        for (index, component_type) in types.iter().enumerate() {
            let count = |set: Option<&std::collections::BTreeSet<String>>| set.map_or(0, |s| s.len());
            output.push_str(&format!(
                "{} {}: {} permissions, {} receivers, {} activities, {} services\n",
                branch(index, types.len()),
                component_type,
                count(info.permissions_for(component_type)),
                count(info.receivers_for(component_type)),
                count(info.activities_for(component_type)),
                count(info.services_for(component_type)),
            ));
        }

        let permissions = info.all_permissions();
        if !permissions.is_empty() {
            output.push_str("\nPermissions:\n");
            for permission in permissions {
                output.push_str(&format!("  {}\n", permission));
            }
        }

        output
    }

    fn format_catalogue_human(&self, database: &ComponentDatabase) -> String {
        let mut output = format!("Component Catalogue ({} types)\n", database.len());
        output.push_str(RULE);
        output.push('\n');

        for (component_type, descriptor) in database.iter() {
            let mut details = Vec::new();
            if !descriptor.permissions.is_empty() {
                details.push(format!("{} permissions", descriptor.permissions.len()));
            }
            let conditional = descriptor.conditional_permissions.len()
                + descriptor.receivers.len()
                + descriptor.activities.len()
                + descriptor.services.len();
            if conditional > 0 {
                details.push(format!("{} fragments", conditional));
            }
            if let Some(min_sdk) = descriptor.min_sdk {
                details.push(format!("min sdk {}", min_sdk));
            }

            if details.is_empty() {
                output.push_str(&format!("{}\n", component_type));
            } else {
                output.push_str(&format!("{:<24} {}\n", component_type, details.join(", ")));
            }
        }

        output
    }
}

/// Tree connector for entry `index` of `len`.
fn branch(index: usize, len: usize) -> &'static str {
    if index + 1 == len {
        "\u{2514}\u{2500}"
    } else {
        "\u{251C}\u{2500}"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appbuild_core::{ArtifactKey, BuildFlavor};

    fn summary(success: bool) -> OutcomeSummary {
        let mut info = ComponentInfo::new();
        info.add_permission("Web", "android.permission.INTERNET");
        info.ensure_type("Label");

        OutcomeSummary {
            project: "p-1".to_string(),
            flavor: BuildFlavor::Package,
            platform: "android",
            success,
            error_message: (!success).then(|| "Signing key is empty".to_string()),
            failed_task: (!success).then(|| "ComputeFingerprint".to_string()),
            executed_tasks: vec!["ReadBuildInfo".to_string(), "LoadComponentInfo".to_string()],
            component_info: Some(info),
            fingerprint: None,
            artifact: success.then(|| ArtifactKey::new("local", "p-1", "App.apk")),
            artifact_sha256: success.then(|| "ab12".to_string()),
            manifest: None,
            completed_at: Default::default(),
        }
    }

    #[test]
    fn test_human_success() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_outcome(&summary(true))
            .unwrap();

        assert!(output.contains("Build Succeeded"));
        assert!(output.contains("Target:    package (android)"));
        assert!(output.contains("Package:     local/p-1/App.apk"));
        assert!(output.contains("Web: 1 permissions"));
        assert!(output.contains("Label: 0 permissions"));
        assert!(output.contains("  android.permission.INTERNET"));
    }

    #[test]
    fn test_human_failure() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_outcome(&summary(false))
            .unwrap();

        assert!(output.contains("Build Failed"));
        assert!(output.contains("Failed:    ComputeFingerprint"));
        assert!(output.contains("Error:     Signing key is empty"));
        assert!(!output.contains("Artifacts:"));
    }

    #[test]
    fn test_artifacts_tree_closes_on_last_entry() {
        let mut only_fingerprint = summary(false);
        only_fingerprint.fingerprint = Some("AB:CD".to_string());

        let output = OutputFormatter::new(OutputFormat::Human)
            .format_outcome(&only_fingerprint)
            .unwrap();
        assert!(output.contains("\u{2514}\u{2500} Fingerprint: AB:CD"));
        assert!(!output.contains("\u{251C}\u{2500} Fingerprint"));

        let full = OutputFormatter::new(OutputFormat::Human)
            .format_outcome(&summary(true))
            .unwrap();
        assert!(full.contains("\u{251C}\u{2500} Package:     local/p-1/App.apk"));
        assert!(full.contains("\u{2514}\u{2500} SHA-256:     ab12"));
    }

    #[test]
    fn test_json_outcome() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_outcome(&summary(true))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["artifact"]["filename"], "App.apk");
        assert!(value.get("error_message").is_none());
    }

    #[test]
    fn test_catalogue_formats() {
        let database = ComponentDatabase::builtin().unwrap();

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_catalogue(&database)
            .unwrap();
        assert!(human.starts_with(&format!("Component Catalogue ({} types)", database.len())));
        assert!(human.contains("LocationSensor"));

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_catalogue(&database)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), database.len());
    }
}
