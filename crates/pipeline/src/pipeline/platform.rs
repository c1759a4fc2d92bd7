//! Target platform capability tags.
//!
//! A [`CompilerContext`](super::CompilerContext) and every [`Task`](super::Task)
//! are parameterized by one of these tags, so a task written for one platform
//! family cannot be registered against another's pipeline:
//!
//! ```compile_fail
//! use appbuild_pipeline::pipeline::tasks::VerifyPermissions;
//! use appbuild_pipeline::{Ios, TaskRegistry};
//!
//! // VerifyPermissions only implements Task<Android>.
//! let registry = TaskRegistry::<Ios>::new().with(VerifyPermissions, &[]);
//! ```

use appbuild_core::BuildFlavor;
use std::fmt;

pub trait Platform: fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;

    /// Flavors a context of this platform may be built for.
    const FLAVORS: &'static [BuildFlavor];

    /// File name the platform manifest is staged under for packaging.
    const MANIFEST_FILE: &'static str;

    /// Platform-specific part of the aggregation area.
    type Artifacts: fmt::Debug + Default + Send + Sync;

    /// Rendered platform manifest, once a task has produced it.
    fn manifest(artifacts: &Self::Artifacts) -> Option<&str>;

    fn supports(flavor: BuildFlavor) -> bool {
        Self::FLAVORS.contains(&flavor)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Android;

#[derive(Debug, Clone, Default)]
pub struct AndroidArtifacts {
    pub manifest: Option<String>,
}

impl Platform for Android {
    const NAME: &'static str = "android";
    const FLAVORS: &'static [BuildFlavor] = &[BuildFlavor::Package, BuildFlavor::Bundle];
    const MANIFEST_FILE: &'static str = "AndroidManifest.xml";

    type Artifacts = AndroidArtifacts;

    fn manifest(artifacts: &Self::Artifacts) -> Option<&str> {
        artifacts.manifest.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ios;

#[derive(Debug, Clone, Default)]
pub struct IosArtifacts {
    pub info_plist: Option<String>,
}

impl Platform for Ios {
    const NAME: &'static str = "ios";
    const FLAVORS: &'static [BuildFlavor] = &[BuildFlavor::IosPackage, BuildFlavor::StoreSubmission];
    const MANIFEST_FILE: &'static str = "Info.plist";

    type Artifacts = IosArtifacts;

    fn manifest(artifacts: &Self::Artifacts) -> Option<&str> {
        artifacts.info_plist.as_deref()
    }
}
