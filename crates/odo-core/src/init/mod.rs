//! `odo init` workflow
//!
//! [`InitClient`] picks a backend from the flags it is given: without any
//! init flag the user is asked interactively, otherwise the flags are used
//! as is. It also downloads the selected devfile and starter project.

pub mod asker;
pub mod backend;
mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use asker::{Asker, ConfigOperation, PromptAsker, Prompter, TypeAnswer};
pub use backend::{DevfileLocation, FlagsBackend, InitBackend, InteractiveBackend};
pub use error::SelectionError;

use crate::devfile::{DevfileObj, StarterProject, DEVFILE_NAME};
use crate::registry::{
    extract_starter_project, Registry, RegistryClient, RegistryError, StarterFiles,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Flags accepted by `odo init`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitFlags {
    pub name: Option<String>,
    pub devfile: Option<String>,
    pub devfile_registry: Option<String>,
    pub devfile_version: Option<String>,
    pub starter: Option<String>,
    pub devfile_path: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl InitFlags {
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn devfile(&self) -> Option<&str> {
        non_empty(&self.devfile)
    }

    pub fn devfile_registry(&self) -> Option<&str> {
        non_empty(&self.devfile_registry)
    }

    pub fn devfile_version(&self) -> Option<&str> {
        non_empty(&self.devfile_version)
    }

    pub fn starter(&self) -> Option<&str> {
        non_empty(&self.starter)
    }

    pub fn devfile_path(&self) -> Option<&str> {
        non_empty(&self.devfile_path)
    }

    /// Whether no init flag was given at all
    pub fn is_empty(&self) -> bool {
        self.name().is_none()
            && self.devfile().is_none()
            && self.devfile_registry().is_none()
            && self.devfile_version().is_none()
            && self.starter().is_none()
            && self.devfile_path().is_none()
    }
}

/// Entry point of the init workflow
pub struct InitClient<A, R> {
    registry: Arc<R>,
    interactive: InteractiveBackend<A, R>,
    flags: FlagsBackend<R>,
}

impl<A: Asker, R: RegistryClient> InitClient<A, R> {
    pub fn new(asker: A, registry: R) -> Self {
        let registry = Arc::new(registry);
        Self {
            interactive: InteractiveBackend::new(asker, Arc::clone(&registry)),
            flags: FlagsBackend::new(Arc::clone(&registry)),
            registry,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn validate(&self, flags: &InitFlags, dir: &Path) -> Result<()> {
        if flags.is_empty() {
            self.interactive.validate(flags, dir)
        } else {
            self.flags.validate(flags, dir)
        }
    }

    /// Decide which devfile to use
    pub async fn select_devfile(&mut self, flags: &InitFlags) -> Result<DevfileLocation> {
        let location = if flags.is_empty() {
            self.interactive.select_devfile(flags).await?
        } else {
            self.flags.select_devfile(flags).await?
        };
        location.ok_or_else(|| SelectionError::NoDevfileLocation.into())
    }

    pub fn select_starter_project(
        &mut self,
        devfile: &DevfileObj,
        flags: &InitFlags,
    ) -> Result<Option<StarterProject>> {
        if flags.is_empty() {
            self.interactive.select_starter_project(devfile, flags)
        } else {
            self.flags.select_starter_project(devfile, flags)
        }
    }

    pub fn personalize_name(&mut self, devfile: &mut DevfileObj, flags: &InitFlags) -> Result<()> {
        if flags.is_empty() {
            self.interactive.personalize_name(devfile, flags)
        } else {
            self.flags.personalize_name(devfile, flags)
        }
    }

    pub fn personalize_devfile_config(
        &mut self,
        devfile: &mut DevfileObj,
        flags: &InitFlags,
    ) -> Result<()> {
        if flags.is_empty() {
            self.interactive.personalize_devfile_config(devfile)
        } else {
            self.flags.personalize_devfile_config(devfile)
        }
    }

    /// Fetch the devfile into `<dir>/devfile.yaml` and return that path
    pub async fn download_devfile(&self, location: &DevfileLocation, dir: &Path) -> Result<PathBuf> {
        let content = if let Some(path) = location.devfile_path.as_deref() {
            if path.starts_with("http") {
                self.registry
                    .download_file(path)
                    .await
                    .with_context(|| format!("Failed to download devfile from {}", path))?
            } else {
                let source = dir.join(path);
                std::fs::read(&source)
                    .with_context(|| format!("Failed to read devfile {}", source.display()))?
            }
        } else if let Some(stack) = location.devfile.as_deref() {
            self.pull_devfile(
                stack,
                location.devfile_registry.as_deref(),
                location.devfile_version.as_deref(),
            )
            .await?
        } else {
            return Err(SelectionError::NoDevfileLocation.into());
        };

        let dest = dir.join(DEVFILE_NAME);
        std::fs::write(&dest, content)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        tracing::info!("devfile written to {}", dest.display());
        Ok(dest)
    }

    /// Registries to try for a stack, the named one only when given
    fn candidate_registries(&self, registry: Option<&str>) -> Result<Vec<Registry>> {
        let registries = self.registry.get_devfile_registries(registry);
        match (registry, registries.is_empty()) {
            (Some(name), true) => Err(RegistryError::UnknownRegistry(name.to_string()).into()),
            (None, true) => Err(RegistryError::NoRegistry.into()),
            _ => Ok(registries),
        }
    }

    async fn pull_devfile(
        &self,
        stack: &str,
        registry: Option<&str>,
        version: Option<&str>,
    ) -> Result<Vec<u8>> {
        let registries = self.candidate_registries(registry)?;
        if registry.is_some() {
            return self.registry.pull_stack(&registries[0], stack, version).await;
        }

        for candidate in &registries {
            match self.registry.pull_stack(candidate, stack, version).await {
                Ok(content) => return Ok(content),
                Err(e) => tracing::debug!(
                    "devfile {} not available from registry {}: {:#}",
                    stack,
                    candidate.name,
                    e
                ),
            }
        }
        Err(RegistryError::DevfileNotFound(stack.to_string()).into())
    }

    /// Download a starter project and extract it into `dir`
    ///
    /// See [`extract_starter_project`] for how existing files are handled.
    pub async fn download_starter_project(
        &self,
        starter: &StarterProject,
        location: &DevfileLocation,
        dir: &Path,
    ) -> Result<StarterFiles> {
        let archive = self.fetch_starter_project(starter, location).await?;
        extract_starter_project(&archive, dir, starter.sub_dir.as_deref())
    }

    /// Fetch the archive of a starter project without writing anything
    pub async fn fetch_starter_project(
        &self,
        starter: &StarterProject,
        location: &DevfileLocation,
    ) -> Result<Vec<u8>> {
        let archive = match (&starter.zip, location.devfile.as_deref()) {
            (Some(zip), _) => self
                .registry
                .download_file(&zip.location)
                .await
                .with_context(|| format!("Failed to download starter project {}", starter.name))?,
            (None, Some(stack)) => {
                self.download_registry_starter(
                    starter,
                    stack,
                    location.devfile_registry.as_deref(),
                    location.devfile_version.as_deref(),
                )
                .await?
            }
            (None, None) => anyhow::bail!(
                "starter project {:?} can only be downloaded from a devfile registry",
                starter.name
            ),
        };
        Ok(archive)
    }

    async fn download_registry_starter(
        &self,
        starter: &StarterProject,
        stack: &str,
        registry: Option<&str>,
        version: Option<&str>,
    ) -> Result<Vec<u8>> {
        let registries = self.candidate_registries(registry)?;
        let mut last_error = None;
        for candidate in &registries {
            match self
                .registry
                .download_starter_project(candidate, stack, version, &starter.name)
                .await
            {
                Ok(archive) => return Ok(archive),
                Err(e) => {
                    tracing::debug!("{:#}", e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| RegistryError::NoRegistry.into()))
    }
}
