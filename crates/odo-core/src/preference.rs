//! User preferences (`~/.odo/preference.yaml`)
//!
//! Only the devfile registry list is managed here. The on-disk shape matches
//! the one written by earlier odo releases so existing files keep working.

use crate::registry::{is_github_based_registry, Registry, RegistryError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the preference file location
pub const PREFERENCE_PATH_ENV: &str = "GLOBALODOCONFIG";

/// Name of the registry configured when no preference file exists
pub const DEFAULT_REGISTRY_NAME: &str = "DefaultDevfileRegistry";

/// URL of the registry configured when no preference file exists
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.devfile.io";

const PREFERENCE_KIND: &str = "Preference";
const PREFERENCE_API_VERSION: &str = "odo.dev/v1alpha1";

/// A registry entry as stored in the preference file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "URL")]
    pub url: String,

    #[serde(default)]
    pub secure: bool,
}

/// `OdoSettings` block; settings other than the registry list are kept as read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct OdoSettings {
    #[serde(rename = "RegistryList", default, skip_serializing_if = "Option::is_none")]
    registry_list: Option<Vec<RegistryEntry>>,

    #[serde(flatten)]
    other: serde_yaml::Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreferenceFile {
    kind: String,
    apiversion: String,
    #[serde(rename = "OdoSettings", default)]
    settings: OdoSettings,

    #[serde(flatten)]
    other: serde_yaml::Mapping,
}

impl Default for PreferenceFile {
    fn default() -> Self {
        Self {
            kind: PREFERENCE_KIND.to_string(),
            apiversion: PREFERENCE_API_VERSION.to_string(),
            settings: OdoSettings::default(),
            other: serde_yaml::Mapping::new(),
        }
    }
}

/// Loaded preferences together with the file they belong to
#[derive(Debug, Clone)]
pub struct Preference {
    path: PathBuf,
    registries: Vec<Registry>,
    file: PreferenceFile,
}

impl Preference {
    /// Resolve the preference file path (`$GLOBALODOCONFIG` or `~/.odo/preference.yaml`)
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(PREFERENCE_PATH_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let home = dirs::home_dir().context("Unable to determine the home directory")?;
        Ok(home.join(".odo").join("preference.yaml"))
    }

    /// Load preferences from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load preferences from a specific file
    ///
    /// A missing file, or a file without a registry list, yields the default registry.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!("preference file {} not found, using defaults", path.display());
            return Ok(Self {
                path,
                registries: vec![default_registry()],
                file: PreferenceFile::default(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: PreferenceFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let registries = match &file.settings.registry_list {
            Some(list) => list
                .iter()
                .cloned()
                .map(|entry| Registry::new(entry.name, entry.url, entry.secure))
                .collect(),
            None => vec![default_registry()],
        };

        Ok(Self {
            path,
            registries,
            file,
        })
    }

    /// Path of the preference file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured registries, in priority order
    pub fn registries(&self) -> &[Registry] {
        &self.registries
    }

    /// Add a registry at the end of the list
    pub fn add_registry(&mut self, name: &str, url: &str, secure: bool) -> Result<()> {
        if self.registries.iter().any(|r| r.name == name) {
            return Err(RegistryError::RegistryExists(name.to_string()).into());
        }
        if is_github_based_registry(url)? {
            return Err(RegistryError::GithubRegistryNotSupported.into());
        }
        self.registries
            .push(Registry::new(name.to_string(), url.to_string(), secure));
        Ok(())
    }

    /// Remove a registry by name
    pub fn remove_registry(&mut self, name: &str) -> Result<Registry> {
        let position = self
            .registries
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| RegistryError::RegistryNotFound(name.to_string()))?;
        Ok(self.registries.remove(position))
    }

    /// Write the preferences back, creating parent directories as needed
    ///
    /// Only the registry list is replaced; every other setting of the loaded
    /// file is written back unchanged.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let mut file = self.file.clone();
        file.settings.registry_list = Some(
            self.registries
                .iter()
                .map(|r| RegistryEntry {
                    name: r.name.clone(),
                    url: r.url.clone(),
                    secure: r.secure,
                })
                .collect(),
        );

        let content =
            serde_yaml::to_string(&file).context("Failed to serialize preferences")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

fn default_registry() -> Registry {
    Registry::new(
        DEFAULT_REGISTRY_NAME.to_string(),
        DEFAULT_REGISTRY_URL.to_string(),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_default_registry() {
        let dir = tempfile::tempdir().unwrap();
        let preference = Preference::load_from(dir.path().join("preference.yaml")).unwrap();

        assert_eq!(preference.registries().len(), 1);
        assert_eq!(preference.registries()[0].name, DEFAULT_REGISTRY_NAME);
        assert_eq!(preference.registries()[0].url, DEFAULT_REGISTRY_URL);
    }

    #[test]
    fn test_reads_existing_odo_preference_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preference.yaml");
        std::fs::write(
            &path,
            "kind: Preference\n\
             apiversion: odo.dev/v1alpha1\n\
             OdoSettings:\n  \
               RegistryList:\n  \
               - Name: Staging\n    \
                 URL: https://registry.stage.devfile.io\n  \
               - Name: Private\n    \
                 URL: https://registry.example.com\n    \
                 secure: true\n",
        )
        .unwrap();

        let preference = Preference::load_from(&path).unwrap();
        let names: Vec<&str> = preference.registries().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Staging", "Private"]);
        assert!(preference.registries()[1].secure);
    }

    #[test]
    fn test_add_remove_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preference.yaml");

        let mut preference = Preference::load_from(&path).unwrap();
        preference
            .add_registry("Local", "http://localhost:8080", false)
            .unwrap();
        preference.save().unwrap();

        let mut reloaded = Preference::load_from(&path).unwrap();
        assert_eq!(reloaded.registries().len(), 2);
        assert_eq!(reloaded.registries()[1].name, "Local");

        let removed = reloaded.remove_registry(DEFAULT_REGISTRY_NAME).unwrap();
        assert_eq!(removed.url, DEFAULT_REGISTRY_URL);
        reloaded.save().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("kind: Preference"));
        assert!(!content.contains(DEFAULT_REGISTRY_NAME));
    }

    #[test]
    fn test_save_keeps_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preference.yaml");
        std::fs::write(
            &path,
            "kind: Preference\n\
             apiversion: odo.dev/v1alpha1\n\
             OdoSettings:\n  \
               Timeout: 5\n  \
               ConsentTelemetry: false\n  \
               RegistryList:\n  \
               - Name: Staging\n    \
                 URL: https://registry.stage.devfile.io\n",
        )
        .unwrap();

        let mut preference = Preference::load_from(&path).unwrap();
        preference
            .add_registry("Local", "http://localhost:8080", false)
            .unwrap();
        preference.save().unwrap();

        let saved: serde_yaml::Value =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let settings = &saved["OdoSettings"];
        assert_eq!(settings["Timeout"].as_i64(), Some(5));
        assert_eq!(settings["ConsentTelemetry"].as_bool(), Some(false));
        assert_eq!(saved["kind"].as_str(), Some("Preference"));

        let reloaded = Preference::load_from(&path).unwrap();
        let names: Vec<&str> = reloaded.registries().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Staging", "Local"]);
    }

    #[test]
    fn test_add_duplicate_registry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut preference = Preference::load_from(dir.path().join("p.yaml")).unwrap();

        let err = preference
            .add_registry(DEFAULT_REGISTRY_NAME, "https://other.example.com", false)
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_add_github_registry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut preference = Preference::load_from(dir.path().join("p.yaml")).unwrap();

        let err = preference
            .add_registry("gh", "https://github.com/devfile/registry", false)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::GithubRegistryNotSupported)
        ));
    }

    #[test]
    fn test_remove_unknown_registry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut preference = Preference::load_from(dir.path().join("p.yaml")).unwrap();

        assert!(preference.remove_registry("nope").is_err());
    }
}
