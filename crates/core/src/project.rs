//! Build request input model: the project tree and the requested flavor.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Packaging kind requested by a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildFlavor {
    /// Installable Android package.
    Package,
    /// Android distribution bundle for store upload.
    Bundle,
    /// Installable iOS package.
    IosPackage,
    /// iOS store submission archive.
    StoreSubmission,
}

impl BuildFlavor {
    pub const ALL: [BuildFlavor; 4] = [
        BuildFlavor::Package,
        BuildFlavor::Bundle,
        BuildFlavor::IosPackage,
        BuildFlavor::StoreSubmission,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuildFlavor::Package => "package",
            BuildFlavor::Bundle => "bundle",
            BuildFlavor::IosPackage => "ios-package",
            BuildFlavor::StoreSubmission => "store-submission",
        }
    }

    /// File extension of the packaged output.
    pub fn output_extension(&self) -> &'static str {
        match self {
            BuildFlavor::Package => "apk",
            BuildFlavor::Bundle => "aab",
            BuildFlavor::IosPackage | BuildFlavor::StoreSubmission => "ipa",
        }
    }

    /// Flavors that end up in a store and therefore must be signed with a real key.
    pub fn is_store_distribution(&self) -> bool {
        matches!(self, BuildFlavor::Bundle | BuildFlavor::StoreSubmission)
    }
}

impl fmt::Display for BuildFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildFlavor::ALL
            .into_iter()
            .find(|flavor| flavor.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid build flavor: {}. Valid options: package, bundle, ios-package, store-submission",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Unspecified,
    Portrait,
    Landscape,
    Sensor,
    User,
}

impl Orientation {
    pub fn name(&self) -> &'static str {
        match self {
            Orientation::Unspecified => "unspecified",
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
            Orientation::Sensor => "sensor",
            Orientation::User => "user",
        }
    }
}

/// One placed component. Arrangements carry their nested components in `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: String,
    /// Block and property names exercised on this instance.
    #[serde(default)]
    pub blocks: BTreeSet<String>,
    #[serde(default)]
    pub children: Vec<ComponentInstance>,
}

impl ComponentInstance {
    pub fn new(name: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component_type: component_type.into(),
            blocks: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn with_blocks<I, S>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocks.extend(blocks.into_iter().map(Into::into));
        self
    }

    pub fn with_child(mut self, child: ComponentInstance) -> Self {
        self.children.push(child);
        self
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ComponentInstance)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub name: String,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub components: Vec<ComponentInstance>,
}

impl Screen {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            orientation: Orientation::Unspecified,
            components: Vec::new(),
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_component(mut self, component: ComponentInstance) -> Self {
        self.components.push(component);
        self
    }
}

fn default_version_code() -> u32 {
    1
}

fn default_version_name() -> String {
    "1.0".to_string()
}

/// The app description submitted for building. Read-only for the whole build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub package_name: String,
    #[serde(default = "default_version_code")]
    pub version_code: u32,
    #[serde(default = "default_version_name")]
    pub version_name: String,
    #[serde(default)]
    pub screens: Vec<Screen>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            package_name: format!("appinventor.ai_user.{}", name),
            name,
            version_code: default_version_code(),
            version_name: default_version_name(),
            screens: Vec::new(),
        }
    }

    pub fn with_screen(mut self, screen: Screen) -> Self {
        self.screens.push(screen);
        self
    }

    /// Every component instance of every screen, depth first in declaration order.
    pub fn instances(&self) -> Vec<&ComponentInstance> {
        let mut out = Vec::new();
        for screen in &self.screens {
            for component in &screen.components {
                component.walk(&mut |instance| out.push(instance));
            }
        }
        out
    }

    /// Aggregates used types and used blocks per type across all instances.
    pub fn component_usage(&self) -> ComponentUsage {
        let mut usage = ComponentUsage::default();
        for instance in self.instances() {
            usage.record(&instance.component_type, instance.blocks.iter().cloned());
        }
        usage
    }
}

/// Which component types a project uses and, per type, the union of blocks
/// used by all of that type's instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentUsage {
    pub types: BTreeSet<String>,
    pub blocks_by_type: BTreeMap<String, BTreeSet<String>>,
}

impl ComponentUsage {
    pub fn record<I>(&mut self, component_type: &str, blocks: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.types.insert(component_type.to_string());
        self.blocks_by_type
            .entry(component_type.to_string())
            .or_default()
            .extend(blocks);
    }

    pub fn blocks_for(&self, component_type: &str) -> Option<&BTreeSet<String>> {
        self.blocks_by_type.get(component_type)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
