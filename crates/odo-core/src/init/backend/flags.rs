//! Non-interactive backend driven by `odo init` flags

use super::{
    DevfileLocation, InitBackend, FLAG_DEVFILE, FLAG_DEVFILE_PATH, FLAG_DEVFILE_REGISTRY,
    FLAG_NAME, FLAG_STARTER,
};
use crate::devfile::{dir_is_empty, validate_component_name, DevfileObj, StarterProject};
use crate::init::{InitFlags, SelectionError};
use crate::registry::{is_github_based_registry, RegistryClient, RegistryError};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Backend reading every decision from the command line
pub struct FlagsBackend<R> {
    registry: Arc<R>,
}

impl<R: RegistryClient> FlagsBackend<R> {
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }
}

fn missing_name() -> anyhow::Error {
    anyhow::anyhow!(
        "missing --{0} parameter: please add --{0} <name> to specify a name for the component",
        FLAG_NAME
    )
}

impl<R: RegistryClient> InitBackend for FlagsBackend<R> {
    fn validate(&self, flags: &InitFlags, dir: &Path) -> Result<()> {
        let name = flags.name().ok_or_else(missing_name)?;

        match (flags.devfile(), flags.devfile_path()) {
            (None, None) => anyhow::bail!(
                "either --{} or --{} parameter should be specified",
                FLAG_DEVFILE,
                FLAG_DEVFILE_PATH
            ),
            (Some(_), Some(_)) => anyhow::bail!(
                "only one of --{} or --{} parameter should be specified",
                FLAG_DEVFILE,
                FLAG_DEVFILE_PATH
            ),
            _ => {}
        }

        if let Some(registry_name) = flags.devfile_registry() {
            let registry = self
                .registry
                .get_devfile_registries(Some(registry_name))
                .into_iter()
                .next()
                .ok_or_else(|| RegistryError::RegistryNotFound(registry_name.to_string()))?;
            if is_github_based_registry(&registry.url)? {
                return Err(RegistryError::GithubRegistryNotSupported.into());
            }

            if flags.devfile_path().is_some() {
                anyhow::bail!(
                    "--{} parameter cannot be used with --{}",
                    FLAG_DEVFILE_REGISTRY,
                    FLAG_DEVFILE_PATH
                );
            }
        }

        validate_component_name(name)?;

        if flags.starter().is_some() && !dir_is_empty(dir)? {
            anyhow::bail!(
                "--{} parameter cannot be used when the directory is not empty",
                FLAG_STARTER
            );
        }

        Ok(())
    }

    async fn select_devfile(&mut self, flags: &InitFlags) -> Result<Option<DevfileLocation>> {
        Ok(Some(DevfileLocation {
            devfile: flags.devfile().map(str::to_string),
            devfile_registry: flags.devfile_registry().map(str::to_string),
            devfile_version: flags.devfile_version().map(str::to_string),
            devfile_path: flags.devfile_path().map(str::to_string),
        }))
    }

    fn select_starter_project(
        &mut self,
        devfile: &DevfileObj,
        flags: &InitFlags,
    ) -> Result<Option<StarterProject>> {
        let Some(wanted) = flags.starter() else {
            return Ok(None);
        };
        devfile
            .starter_projects()?
            .into_iter()
            .find(|starter| starter.name == wanted)
            .map(Some)
            .ok_or_else(|| SelectionError::StarterProjectNotFound(wanted.to_string()).into())
    }

    fn personalize_name(&mut self, devfile: &mut DevfileObj, flags: &InitFlags) -> Result<()> {
        let name = flags.name().ok_or_else(missing_name)?;
        devfile.set_metadata_name(name)
    }

    fn personalize_devfile_config(&mut self, _devfile: &mut DevfileObj) -> Result<()> {
        Ok(())
    }
}
