use appbuild_components::ComponentDescriptor;
use appbuild_core::{BuildFlavor, Project};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_owner() -> String {
    "local".to_string()
}

/// Wire form of a build request. Required fields are optional here so that a
/// missing one surfaces as a named configuration error from the context
/// builder rather than as a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildRequest {
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(default)]
    pub flavor: Option<BuildFlavor>,
    #[serde(default)]
    pub ram_limit_mb: Option<u32>,
    #[serde(default)]
    pub signing_key: Option<String>,
    #[serde(default)]
    pub companion: bool,
    #[serde(default)]
    pub emulator: bool,
    #[serde(default)]
    pub allow_dangerous_permissions: bool,
    /// Extension components not present in the static database.
    #[serde(default)]
    pub extensions: BTreeMap<String, ComponentDescriptor>,
}

impl BuildRequest {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request() {
        let request = BuildRequest::from_json(
            r#"{"project": {"id": "1", "name": "A", "package_name": "a.b"}, "flavor": "bundle"}"#,
        )
        .unwrap();

        assert_eq!(request.owner, "local");
        assert_eq!(request.flavor, Some(BuildFlavor::Bundle));
        assert!(!request.companion);
        assert!(request.extensions.is_empty());
    }

    #[test]
    fn test_request_with_extension() {
        let request = BuildRequest::from_json(
            r#"{
                "owner": "alice",
                "flavor": "package",
                "signing_key": "android.keystore",
                "extensions": {
                    "edu.mit.BluetoothLE": {"permissions": ["android.permission.BLUETOOTH_SCAN"], "min_sdk": 21}
                }
            }"#,
        )
        .unwrap();

        assert!(request.project.is_none());
        assert_eq!(request.signing_key.as_deref(), Some("android.keystore"));
        assert_eq!(
            request.extensions["edu.mit.BluetoothLE"].min_sdk,
            Some(21)
        );
    }

    #[test]
    fn test_unknown_flavor_is_rejected() {
        assert!(BuildRequest::from_json(r#"{"flavor": "apk"}"#).is_err());
    }
}
