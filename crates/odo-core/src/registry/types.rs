//! Registry, stack and catalog types

use super::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A configured devfile registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub name: String,
    pub url: String,
    pub secure: bool,

    /// Position of the registry in the configured list (lower wins on ties)
    #[serde(skip)]
    pub priority: usize,
}

impl Registry {
    pub fn new(name: String, url: String, secure: bool) -> Self {
        Self {
            name,
            url,
            secure,
            priority: 0,
        }
    }
}

/// One published version of a stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevfileStackVersion {
    pub version: String,
    #[serde(default)]
    pub schema_version: String,
    #[serde(default, rename = "default")]
    pub is_default: bool,
    #[serde(default)]
    pub starter_projects: Vec<String>,
}

/// A selectable devfile stack, as advertised by a registry index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevfileStack {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub registry: Registry,
    pub language: String,
    pub project_type: String,
    pub tags: Vec<String>,
    pub default_version: String,
    pub default_starter_projects: Vec<String>,
    pub versions: Vec<DevfileStackVersion>,
    pub architectures: Vec<String>,
}

/// Entry of a registry `index` / `v2index` document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IndexEntry {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub starter_projects: Vec<String>,
    #[serde(default)]
    pub versions: Vec<DevfileStackVersion>,
    #[serde(default)]
    pub architectures: Vec<String>,
}

impl DevfileStack {
    /// Build a stack from a registry index entry
    ///
    /// The entry flagged as default provides the default version and starter
    /// projects; when several are flagged, the last one wins. Versions are
    /// sorted by semver, unparsable versions first.
    pub(crate) fn from_index(registry: &Registry, entry: IndexEntry) -> Self {
        let mut stack = DevfileStack {
            name: entry.name,
            display_name: entry.display_name,
            description: entry.description,
            registry: registry.clone(),
            language: entry.language,
            project_type: entry.project_type,
            tags: entry.tags,
            default_version: entry.version,
            default_starter_projects: entry.starter_projects,
            versions: Vec::with_capacity(entry.versions.len()),
            architectures: entry.architectures,
        };

        for version in entry.versions {
            if version.is_default {
                stack.default_version = version.version.clone();
                stack.default_starter_projects = version.starter_projects.clone();
            }
            stack.versions.push(version);
        }

        stack
            .versions
            .sort_by_key(|v| semver::Version::parse(&v.version).ok());

        stack
    }

    /// Whether the stack publishes the given version
    pub fn has_version(&self, version: &str) -> bool {
        self.default_version == version || self.versions.iter().any(|v| v.version == version)
    }
}

/// Project types of one language, grouped by display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypesWithDetails(BTreeMap<String, Vec<DevfileStack>>);

impl TypesWithDetails {
    pub fn insert(&mut self, stack: DevfileStack) {
        self.0
            .entry(stack.display_name.clone())
            .or_default()
            .push(stack);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels in presentation order
    ///
    /// A display name served by a single registry is shown as is; one served
    /// by several registries is shown once per registry, suffixed with the
    /// registry name.
    pub fn ordered_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        for (display_name, stacks) in &self.0 {
            if stacks.len() == 1 {
                labels.push(display_name.clone());
            } else {
                for stack in stacks {
                    labels.push(format!("{} ({})", display_name, stack.registry.name));
                }
            }
        }
        labels
    }

    /// The stack behind `ordered_labels()[position]`
    pub fn at_ordered_position(&self, position: usize) -> Result<&DevfileStack, RegistryError> {
        self.0
            .values()
            .flatten()
            .nth(position)
            .ok_or(RegistryError::PositionOutOfRange(position))
    }
}

impl FromIterator<DevfileStack> for TypesWithDetails {
    fn from_iter<I: IntoIterator<Item = DevfileStack>>(iter: I) -> Self {
        let mut types = TypesWithDetails::default();
        for stack in iter {
            types.insert(stack);
        }
        types
    }
}

/// Snapshot of the stacks offered by the configured registries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DevfileStackList {
    pub registries: Vec<Registry>,
    pub items: Vec<DevfileStack>,
}

impl DevfileStackList {
    /// Distinct languages of the catalog, sorted
    pub fn languages(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| !item.language.is_empty())
            .map(|item| item.language.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Stacks of one language, grouped by display name
    pub fn project_types(&self, language: &str) -> TypesWithDetails {
        self.items
            .iter()
            .filter(|item| item.language == language)
            .cloned()
            .collect()
    }
}
