use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A manifest fragment that applies only when the project uses one of its
/// trigger blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalFragment {
    #[serde(default)]
    pub triggers: BTreeSet<String>,
    pub fragment: String,
}

impl ConditionalFragment {
    pub fn new<I, S>(triggers: I, fragment: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            triggers: triggers.into_iter().map(Into::into).collect(),
            fragment: fragment.into(),
        }
    }

    /// Fragment with no triggers, included whenever its component is used.
    pub fn always(fragment: impl Into<String>) -> Self {
        Self {
            triggers: BTreeSet::new(),
            fragment: fragment.into(),
        }
    }

    pub fn is_unconditional(&self) -> bool {
        self.triggers.is_empty()
    }

    /// True when at least one trigger block is among `used`.
    pub fn triggered_by(&self, used: &BTreeSet<String>) -> bool {
        !self.triggers.is_disjoint(used)
    }
}

/// Static manifest requirements of one component type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default)]
    pub conditional_permissions: Vec<ConditionalFragment>,
    #[serde(default)]
    pub receivers: Vec<ConditionalFragment>,
    #[serde(default)]
    pub activities: Vec<ConditionalFragment>,
    #[serde(default)]
    pub services: Vec<ConditionalFragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_sdk: Option<u32>,
}

impl ComponentDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn with_conditional_permission(mut self, fragment: ConditionalFragment) -> Self {
        self.conditional_permissions.push(fragment);
        self
    }

    pub fn with_receiver(mut self, fragment: ConditionalFragment) -> Self {
        self.receivers.push(fragment);
        self
    }

    pub fn with_activity(mut self, fragment: ConditionalFragment) -> Self {
        self.activities.push(fragment);
        self
    }

    pub fn with_service(mut self, fragment: ConditionalFragment) -> Self {
        self.services.push(fragment);
        self
    }

    pub fn with_min_sdk(mut self, min_sdk: u32) -> Self {
        self.min_sdk = Some(min_sdk);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
            && self.conditional_permissions.is_empty()
            && self.receivers.is_empty()
            && self.activities.is_empty()
            && self.services.is_empty()
            && self.min_sdk.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(blocks: &[&str]) -> BTreeSet<String> {
        blocks.iter().map(|b| b.to_string()).collect()
    }

    #[test]
    fn test_triggered_by_requires_intersection() {
        let fragment = ConditionalFragment::new(["A", "B"], "<receiver/>");
        assert!(fragment.triggered_by(&used(&["B", "Z"])));
        assert!(!fragment.triggered_by(&used(&["Z"])));
        assert!(!fragment.triggered_by(&used(&[])));
    }

    #[test]
    fn test_unconditional_fragment_is_never_triggered_by_blocks() {
        let fragment = ConditionalFragment::always("<activity/>");
        assert!(fragment.is_unconditional());
        assert!(!fragment.triggered_by(&used(&["A"])));
    }

    #[test]
    fn test_descriptor_deserializes_with_defaults() {
        let descriptor: ComponentDescriptor =
            serde_json::from_str(r#"{"permissions": ["android.permission.INTERNET"]}"#).unwrap();
        assert_eq!(descriptor.permissions.len(), 1);
        assert!(descriptor.receivers.is_empty());
        assert!(descriptor.min_sdk.is_none());
        assert!(!descriptor.is_empty());
        assert!(ComponentDescriptor::new().is_empty());
    }
}
