// Concrete pipeline tasks
//
// File prefixes follow the position of each task in the master order. The
// Android manifest and the iOS Info.plist share a slot since a registry only
// ever holds one of them.

#[path = "01_read_build_info.rs"]
pub mod read_build_info;
#[path = "02_load_component_info.rs"]
pub mod load_component_info;
#[path = "03_verify_permissions.rs"]
pub mod verify_permissions;
#[path = "04_create_manifest.rs"]
pub mod create_manifest;
#[path = "04_create_info_plist.rs"]
pub mod create_info_plist;
#[path = "05_compute_fingerprint.rs"]
pub mod compute_fingerprint;
#[path = "06_package_app.rs"]
pub mod package_app;

mod xml;

pub use compute_fingerprint::ComputeFingerprint;
pub use create_info_plist::CreateInfoPlist;
pub use create_manifest::CreateManifest;
pub use load_component_info::LoadComponentInfo;
pub use package_app::PackageApp;
pub use read_build_info::ReadBuildInfo;
pub use verify_permissions::VerifyPermissions;
