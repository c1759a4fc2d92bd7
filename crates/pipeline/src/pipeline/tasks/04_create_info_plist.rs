use super::xml::escape;
use crate::pipeline::context::{BuildConfig, CompilerContext};
use crate::pipeline::platform::Ios;
use crate::pipeline::task_trait::{Task, TaskResult};
use anyhow::Result;
use appbuild_components::ComponentInfo;
use appbuild_core::Orientation;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::debug;

/// Usage-description keys implied by resolved permissions, matched on the
/// permission name suffix.
const USAGE_DESCRIPTIONS: &[(&str, &str, &str)] = &[
    (
        "LOCATION",
        "NSLocationWhenInUseUsageDescription",
        "This app uses your location.",
    ),
    ("CAMERA", "NSCameraUsageDescription", "This app uses the camera."),
    (
        "RECORD_AUDIO",
        "NSMicrophoneUsageDescription",
        "This app records audio.",
    ),
    (
        "READ_CONTACTS",
        "NSContactsUsageDescription",
        "This app reads your contacts.",
    ),
    (
        "READ_EXTERNAL_STORAGE",
        "NSPhotoLibraryUsageDescription",
        "This app picks images from your library.",
    ),
];

/// Renders Info.plist for iOS builds.
pub struct CreateInfoPlist;

#[async_trait]
impl Task<Ios> for CreateInfoPlist {
    fn name(&self) -> &'static str {
        "CreateInfoPlist"
    }

    async fn execute(&self, context: &mut CompilerContext<Ios>) -> Result<TaskResult> {
        let info = match context.require_component_info() {
            Ok(info) => info,
            Err(err) => return Ok(err.into()),
        };

        let plist = render_plist(context.config(), info)?;
        debug!(bytes = plist.len(), "Rendered Info.plist");
        context.aggregation_mut().platform.info_plist = Some(plist);
        Ok(TaskResult::success())
    }
}

fn orientation_values(orientation: Orientation) -> &'static [&'static str] {
    match orientation {
        Orientation::Portrait => &["UIInterfaceOrientationPortrait"],
        Orientation::Landscape => &[
            "UIInterfaceOrientationLandscapeLeft",
            "UIInterfaceOrientationLandscapeRight",
        ],
        Orientation::Unspecified | Orientation::Sensor | Orientation::User => &[
            "UIInterfaceOrientationPortrait",
            "UIInterfaceOrientationLandscapeLeft",
            "UIInterfaceOrientationLandscapeRight",
        ],
    }
}

fn render_plist(config: &BuildConfig, info: &ComponentInfo) -> Result<String> {
    let project = &config.project;

    let mut orientations = Vec::new();
    for screen in &project.screens {
        for value in orientation_values(screen.orientation) {
            if !orientations.contains(value) {
                orientations.push(*value);
            }
        }
    }

    let permissions = info.all_permissions();
    let mut usage_keys = BTreeMap::new();
    for (marker, key, description) in USAGE_DESCRIPTIONS {
        if permissions.iter().any(|permission| permission.ends_with(marker)) {
            usage_keys.insert(*key, *description);
        }
    }

    let mut out = String::new();
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#
    )?;
    writeln!(out, r#"<plist version="1.0">"#)?;
    writeln!(out, "<dict>")?;

    let strings = [
        ("CFBundleIdentifier", project.package_name.as_str()),
        ("CFBundleName", project.name.as_str()),
        ("CFBundleShortVersionString", project.version_name.as_str()),
    ];
    for (key, value) in strings {
        writeln!(out, "  <key>{}</key>", key)?;
        writeln!(out, "  <string>{}</string>", escape(value))?;
    }
    writeln!(out, "  <key>CFBundleVersion</key>")?;
    writeln!(out, "  <string>{}</string>", project.version_code)?;

    writeln!(out, "  <key>UISupportedInterfaceOrientations</key>")?;
    writeln!(out, "  <array>")?;
    for orientation in orientations {
        writeln!(out, "    <string>{}</string>", orientation)?;
    }
    writeln!(out, "  </array>")?;

    for (key, description) in usage_keys {
        writeln!(out, "  <key>{}</key>", key)?;
        writeln!(out, "  <string>{}</string>", escape(description))?;
    }

    writeln!(out, "</dict>")?;
    writeln!(out, "</plist>")?;
    Ok(out)
}
