use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Resolved manifest requirements of one build, keyed by component type.
///
/// Sets are deduplicated per type only. The same permission contributed by two
/// types appears under both; collapsing them is left to manifest rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub permissions: BTreeMap<String, BTreeSet<String>>,
    pub receivers: BTreeMap<String, BTreeSet<String>>,
    pub activities: BTreeMap<String, BTreeSet<String>>,
    pub services: BTreeMap<String, BTreeSet<String>>,
    pub min_sdks: BTreeMap<String, u32>,
}

impl ComponentInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `component_type` present in every mapping, with empty sets if it
    /// contributes nothing.
    pub fn ensure_type(&mut self, component_type: &str) {
        for map in [
            &mut self.permissions,
            &mut self.receivers,
            &mut self.activities,
            &mut self.services,
        ] {
            map.entry(component_type.to_string()).or_default();
        }
    }

    pub fn add_permission(&mut self, component_type: &str, permission: impl Into<String>) {
        self.permissions
            .entry(component_type.to_string())
            .or_default()
            .insert(permission.into());
    }

    pub fn add_receiver(&mut self, component_type: &str, fragment: impl Into<String>) {
        self.receivers
            .entry(component_type.to_string())
            .or_default()
            .insert(fragment.into());
    }

    pub fn add_activity(&mut self, component_type: &str, fragment: impl Into<String>) {
        self.activities
            .entry(component_type.to_string())
            .or_default()
            .insert(fragment.into());
    }

    pub fn add_service(&mut self, component_type: &str, fragment: impl Into<String>) {
        self.services
            .entry(component_type.to_string())
            .or_default()
            .insert(fragment.into());
    }

    pub fn set_min_sdk(&mut self, component_type: &str, min_sdk: u32) {
        self.min_sdks.insert(component_type.to_string(), min_sdk);
    }

    pub fn permissions_for(&self, component_type: &str) -> Option<&BTreeSet<String>> {
        self.permissions.get(component_type)
    }

    pub fn receivers_for(&self, component_type: &str) -> Option<&BTreeSet<String>> {
        self.receivers.get(component_type)
    }

    pub fn activities_for(&self, component_type: &str) -> Option<&BTreeSet<String>> {
        self.activities.get(component_type)
    }

    pub fn services_for(&self, component_type: &str) -> Option<&BTreeSet<String>> {
        self.services.get(component_type)
    }

    pub fn component_types(&self) -> impl Iterator<Item = &str> {
        self.permissions.keys().map(String::as_str)
    }

    /// Union of all permissions across types.
    pub fn all_permissions(&self) -> BTreeSet<&str> {
        self.permissions
            .values()
            .flat_map(|set| set.iter().map(String::as_str))
            .collect()
    }

    /// Types that resolved `permission`.
    pub fn types_requiring(&self, permission: &str) -> Vec<&str> {
        self.permissions
            .iter()
            .filter(|(_, set)| set.contains(permission))
            .map(|(component_type, _)| component_type.as_str())
            .collect()
    }

    pub fn max_min_sdk(&self) -> Option<u32> {
        self.min_sdks.values().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_type_records_empty_sets() {
        let mut info = ComponentInfo::new();
        info.ensure_type("Label");

        assert!(info.permissions_for("Label").unwrap().is_empty());
        assert!(info.receivers_for("Label").unwrap().is_empty());
        assert!(info.activities_for("Label").unwrap().is_empty());
        assert!(info.services_for("Label").unwrap().is_empty());
        assert!(info.permissions_for("Button").is_none());
    }

    #[test]
    fn test_sets_dedup_per_type_but_not_across_types() {
        let mut info = ComponentInfo::new();
        info.add_permission("Web", "android.permission.INTERNET");
        info.add_permission("Web", "android.permission.INTERNET");
        info.add_permission("Sound", "android.permission.INTERNET");

        assert_eq!(info.permissions_for("Web").unwrap().len(), 1);
        assert_eq!(info.permissions_for("Sound").unwrap().len(), 1);
        assert_eq!(info.all_permissions().len(), 1);
        assert_eq!(
            info.types_requiring("android.permission.INTERNET"),
            vec!["Sound", "Web"]
        );
    }

    #[test]
    fn test_max_min_sdk() {
        let mut info = ComponentInfo::new();
        assert_eq!(info.max_min_sdk(), None);

        info.set_min_sdk("NearField", 10);
        info.set_min_sdk("BluetoothLE", 21);
        assert_eq!(info.max_min_sdk(), Some(21));
    }
}
