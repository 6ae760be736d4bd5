//! Interactive backend

use super::{DevfileLocation, InitBackend};
use crate::devfile::{validate_component_name, DevfileObj, StarterProject};
use crate::init::asker::{Asker, ConfigOperation, TypeAnswer};
use crate::init::InitFlags;
use crate::registry::{DevfileStackList, RegistryClient, StackFilter};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Devfile selection progress
enum State {
    AskLanguage,
    AskType(String),
    End(DevfileLocation),
}

/// Backend asking the user for every decision
pub struct InteractiveBackend<A, R> {
    asker: A,
    registry: Arc<R>,
}

impl<A: Asker, R: RegistryClient> InteractiveBackend<A, R> {
    pub fn new(asker: A, registry: Arc<R>) -> Self {
        Self { asker, registry }
    }

    pub fn asker(&self) -> &A {
        &self.asker
    }

    async fn catalog(&self) -> DevfileStackList {
        match self.registry.list_devfile_stacks(&StackFilter::default()).await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::debug!("unable to list devfile stacks: {:#}", e);
                DevfileStackList::default()
            }
        }
    }
}

impl<A: Asker, R: RegistryClient> InitBackend for InteractiveBackend<A, R> {
    fn validate(&self, _flags: &InitFlags, _dir: &Path) -> Result<()> {
        Ok(())
    }

    async fn select_devfile(&mut self, _flags: &InitFlags) -> Result<Option<DevfileLocation>> {
        let catalog = self.catalog().await;
        let languages = catalog.languages();

        let mut state = State::AskLanguage;
        loop {
            state = match state {
                State::AskLanguage => State::AskType(self.asker.ask_language(&languages)?),
                State::AskType(language) => {
                    match self.asker.ask_type(&catalog.project_types(&language))? {
                        TypeAnswer::Back => State::AskLanguage,
                        TypeAnswer::Selected(stack) => State::End(DevfileLocation {
                            devfile: Some(stack.name),
                            devfile_registry: Some(stack.registry.name),
                            ..Default::default()
                        }),
                    }
                }
                State::End(location) => return Ok(Some(location)),
            };
        }
    }

    fn select_starter_project(
        &mut self,
        devfile: &DevfileObj,
        _flags: &InitFlags,
    ) -> Result<Option<StarterProject>> {
        let mut starters = devfile.starter_projects()?;
        starters.sort_by(|a, b| a.name.cmp(&b.name));
        let names: Vec<String> = starters.iter().map(|s| s.name.clone()).collect();

        let Some(position) = self.asker.ask_starter_project(&names)? else {
            return Ok(None);
        };
        if position >= starters.len() {
            anyhow::bail!("no starter project at position {}", position);
        }
        Ok(Some(starters.swap_remove(position)))
    }

    fn personalize_name(&mut self, devfile: &mut DevfileObj, _flags: &InitFlags) -> Result<()> {
        let default = format!("my-{}-app", devfile.metadata_name());
        let name = loop {
            let name = self.asker.ask_name(&default)?;
            match validate_component_name(&name) {
                Ok(()) => break name,
                Err(e) => self.asker.warn(&e.to_string())?,
            }
        };
        devfile.set_metadata_name(&name)
    }

    fn personalize_devfile_config(&mut self, devfile: &mut DevfileObj) -> Result<()> {
        loop {
            let config = devfile.container_configuration();
            self.asker.show_configuration(&config)?;

            let containers: Vec<String> = config.keys().cloned().collect();
            let Some(container) = self.asker.ask_container_name(&containers)? else {
                return Ok(());
            };

            loop {
                let current = devfile
                    .container_configuration()
                    .remove(&container)
                    .unwrap_or_default();
                match self.asker.ask_personalize_configuration(&current)? {
                    ConfigOperation::Nothing => break,
                    ConfigOperation::AddPort => {
                        let port = self.asker.ask_add_port()?;
                        devfile.add_port(&container, port)?;
                    }
                    ConfigOperation::AddEnvVar => {
                        let (name, value) = self.asker.ask_add_env_var()?;
                        devfile.add_env_var(&container, &name, &value)?;
                    }
                    ConfigOperation::DeletePort(port) => devfile.remove_port(&container, &port)?,
                    ConfigOperation::DeleteEnvVar(name) => {
                        devfile.remove_env_var(&container, &name)?
                    }
                }
            }
        }
    }
}
