use super::xml::escape;
use crate::pipeline::context::{BuildConfig, CompilerContext};
use crate::pipeline::platform::Android;
use crate::pipeline::task_trait::{Task, TaskResult};
use anyhow::Result;
use appbuild_components::ComponentInfo;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt::Write;
use tracing::debug;

pub const DEFAULT_MIN_SDK: u32 = 19;
pub const TARGET_SDK: u32 = 34;
/// Budgets above this request a large heap.
pub const LARGE_HEAP_THRESHOLD_MB: u32 = 2048;

/// Renders AndroidManifest.xml from the build configuration and the resolved
/// component info.
pub struct CreateManifest;

#[async_trait]
impl Task<Android> for CreateManifest {
    fn name(&self) -> &'static str {
        "CreateManifest"
    }

    async fn execute(&self, context: &mut CompilerContext<Android>) -> Result<TaskResult> {
        let info = match context.require_component_info() {
            Ok(info) => info,
            Err(err) => return Ok(err.into()),
        };

        let manifest = render_manifest(context.config(), info)?;
        if let Err(err) = roxmltree::Document::parse(&manifest) {
            return Ok(TaskResult::failure(format!(
                "Generated manifest is not well-formed XML: {}",
                err
            )));
        }

        debug!(bytes = manifest.len(), "Rendered Android manifest");
        context.aggregation_mut().platform.manifest = Some(manifest);
        Ok(TaskResult::success())
    }
}

/// Fragments of every type for one category, in type order, each emitted once.
fn unique_fragments<'a>(
    by_type: impl IntoIterator<Item = &'a BTreeSet<String>>,
) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for fragments in by_type {
        for fragment in fragments {
            if seen.insert(fragment.as_str()) {
                out.push(fragment.as_str());
            }
        }
    }
    out
}

fn render_manifest(config: &BuildConfig, info: &ComponentInfo) -> Result<String> {
    let project = &config.project;
    let min_sdk = info.max_min_sdk().map_or(DEFAULT_MIN_SDK, |sdk| sdk.max(DEFAULT_MIN_SDK));

    let mut out = String::new();
    writeln!(out, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(
        out,
        r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="{}" android:versionCode="{}" android:versionName="{}">"#,
        escape(&project.package_name),
        project.version_code,
        escape(&project.version_name)
    )?;
    writeln!(
        out,
        r#"  <uses-sdk android:minSdkVersion="{}" android:targetSdkVersion="{}" />"#,
        min_sdk, TARGET_SDK
    )?;

    for permission in info.all_permissions() {
        writeln!(
            out,
            r#"  <uses-permission android:name="{}" />"#,
            escape(permission)
        )?;
    }

    let mut application = format!(
        r#"  <application android:label="{}""#,
        escape(&project.name)
    );
    if config.companion {
        application.push_str(r#" android:debuggable="true""#);
    }
    if config.ram_limit_mb > LARGE_HEAP_THRESHOLD_MB {
        application.push_str(r#" android:largeHeap="true""#);
    }
    writeln!(out, "{}>", application)?;

    for (index, screen) in project.screens.iter().enumerate() {
        writeln!(
            out,
            r#"    <activity android:name=".{}" android:screenOrientation="{}" android:configChanges="orientation|keyboardHidden">"#,
            escape(&screen.name),
            screen.orientation.name()
        )?;
        if index == 0 {
            writeln!(out, "      <intent-filter>")?;
            writeln!(out, r#"        <action android:name="android.intent.action.MAIN" />"#)?;
            writeln!(out, r#"        <category android:name="android.intent.category.LAUNCHER" />"#)?;
            writeln!(out, "      </intent-filter>")?;
        }
        writeln!(out, "    </activity>")?;
    }

    for fragment in unique_fragments(info.activities.values())
        .into_iter()
        .chain(unique_fragments(info.receivers.values()))
        .chain(unique_fragments(info.services.values()))
    {
        writeln!(out, "    {}", fragment)?;
    }

    writeln!(out, "  </application>")?;
    writeln!(out, "</manifest>")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use appbuild_core::{BuildFlavor, Orientation, Project, Screen};

    fn context(companion: bool, ram: u32, info: ComponentInfo) -> CompilerContext<Android> {
        let mut project = Project::new("p-1", "HelloPurr")
            .with_screen(Screen::new("Screen1").with_orientation(Orientation::Portrait))
            .with_screen(Screen::new("Settings"));
        project.version_code = 3;
        project.version_name = "1.2".to_string();

        let mut context = CompilerContext::builder()
            .project(project)
            .flavor(BuildFlavor::Package)
            .companion(companion)
            .ram_limit_mb(ram)
            .build()
            .unwrap();
        context.aggregation_mut().component_info = Some(info);
        context
    }

    fn info() -> ComponentInfo {
        let mut info = ComponentInfo::new();
        info.add_permission("Web", "android.permission.INTERNET");
        info.add_permission("Sound", "android.permission.INTERNET");
        info.add_permission("Sound", "android.permission.VIBRATE");
        info.add_activity("ListPicker", r#"<activity android:name="ListPickerActivity" />"#);
        info.add_activity("Twitter", r#"<activity android:name="ListPickerActivity" />"#);
        info.add_receiver("Texting", r#"<receiver android:name="SmsReceiver" />"#);
        info.set_min_sdk("NearField", 10);
        info
    }

    #[tokio::test]
    async fn test_renders_well_formed_manifest() {
        let mut context = context(false, 2048, info());

        let result = CreateManifest.execute(&mut context).await.unwrap();
        assert!(result.is_success(), "{:?}", result.error_message);

        let manifest = context.manifest().unwrap();
        let doc = roxmltree::Document::parse(manifest).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("package"), Some("appinventor.ai_user.HelloPurr"));

        assert_eq!(manifest.matches("android.permission.INTERNET").count(), 1);
        assert_eq!(manifest.matches("ListPickerActivity").count(), 1);
        assert!(manifest.contains(r#"android:minSdkVersion="19""#));
        assert!(manifest.contains(r#"android:versionCode="3""#));
        assert!(manifest.contains(r#"android:name=".Screen1" android:screenOrientation="portrait""#));
        assert!(manifest.contains(r#"android:name=".Settings" android:screenOrientation="unspecified""#));
        assert_eq!(manifest.matches("android.intent.category.LAUNCHER").count(), 1);
        assert!(!manifest.contains("debuggable"));
        assert!(!manifest.contains("largeHeap"));
    }

    #[tokio::test]
    async fn test_companion_and_large_heap_flags() {
        let mut info = info();
        info.set_min_sdk("BluetoothLE", 21);
        let mut context = context(true, 4096, info);

        CreateManifest.execute(&mut context).await.unwrap();

        let manifest = context.manifest().unwrap();
        assert!(manifest.contains(r#"android:debuggable="true""#));
        assert!(manifest.contains(r#"android:largeHeap="true""#));
        assert!(manifest.contains(r#"android:minSdkVersion="21""#));
    }

    #[tokio::test]
    async fn test_malformed_fragment_fails() {
        let mut info = ComponentInfo::new();
        info.add_activity("Broken", "<activity android:name=\"Broken\">");
        let mut context = context(false, 2048, info);

        let result = CreateManifest.execute(&mut context).await.unwrap();

        assert!(!result.is_success());
        assert!(result
            .error_message
            .unwrap()
            .starts_with("Generated manifest is not well-formed XML"));
        assert!(context.manifest().is_none());
    }

    #[tokio::test]
    async fn test_requires_component_info() {
        let mut context = CompilerContext::<Android>::builder()
            .project(Project::new("p-1", "NoInfo").with_screen(Screen::new("Screen1")))
            .flavor(BuildFlavor::Package)
            .build()
            .unwrap();

        let result = CreateManifest.execute(&mut context).await.unwrap();
        assert!(result.error_message.unwrap().contains("component_info"));
    }
}
