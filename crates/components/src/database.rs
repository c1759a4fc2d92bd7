//! Process-wide table of component descriptors

use crate::descriptor::ComponentDescriptor;
use crate::error::DatabaseError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const BUILTIN_CATALOGUE: &str = include_str!("../catalogue/components.json");

#[derive(Deserialize)]
struct Catalogue {
    components: Vec<CatalogueEntry>,
}

#[derive(Deserialize)]
struct CatalogueEntry {
    #[serde(rename = "type")]
    component_type: String,
    #[serde(flatten)]
    descriptor: ComponentDescriptor,
}

/// Immutable mapping from component type to descriptor.
///
/// Loaded once and shared read-only by every concurrent build, typically
/// behind an `Arc`. Lookups of unknown types return `None`; callers treat that
/// as "contributes nothing".
#[derive(Debug, Clone, Default)]
pub struct ComponentDatabase {
    descriptors: BTreeMap<String, ComponentDescriptor>,
}

impl ComponentDatabase {
    /// Database with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalogue compiled into the binary.
    pub fn builtin() -> Result<Self, DatabaseError> {
        Self::from_json(BUILTIN_CATALOGUE)
    }

    pub fn load(path: &Path) -> Result<Self, DatabaseError> {
        let content = std::fs::read_to_string(path).map_err(|source| DatabaseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let database = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            components = database.len(),
            "Loaded component catalogue"
        );
        Ok(database)
    }

    pub fn from_json(content: &str) -> Result<Self, DatabaseError> {
        let catalogue: Catalogue = serde_json::from_str(content)?;
        Self::from_entries(
            catalogue
                .components
                .into_iter()
                .map(|entry| (entry.component_type, entry.descriptor)),
        )
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, DatabaseError>
    where
        I: IntoIterator<Item = (String, ComponentDescriptor)>,
    {
        let mut descriptors = BTreeMap::new();
        for (component_type, descriptor) in entries {
            if component_type.trim().is_empty() {
                return Err(DatabaseError::EmptyTypeName);
            }
            if descriptors.contains_key(&component_type) {
                return Err(DatabaseError::DuplicateType(component_type));
            }
            descriptors.insert(component_type, descriptor);
        }
        Ok(Self { descriptors })
    }

    pub fn get(&self, component_type: &str) -> Option<&ComponentDescriptor> {
        self.descriptors.get(component_type)
    }

    pub fn contains(&self, component_type: &str) -> bool {
        self.descriptors.contains_key(component_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentDescriptor)> {
        self.descriptors
            .iter()
            .map(|(component_type, descriptor)| (component_type.as_str(), descriptor))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
