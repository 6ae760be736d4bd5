//! User choices needed while initializing a component
//!
//! The [`Asker`] trait is what the interactive backend talks to. The sentinel
//! entries shown to the user ("go back", "no starter project", ...) never leave
//! this module as strings: they come back as [`TypeAnswer::Back`], `None` or
//! [`ConfigOperation::Nothing`].

mod prompt;

pub use prompt::{
    PromptAsker, Prompter, ADD_ENV_VAR, ADD_PORT, GO_BACK, NO_CONTAINER_CHANGE, NO_STARTER_PROJECT,
    NOTHING_TO_CHANGE,
};

use crate::devfile::{ContainerConfiguration, DevfileConfiguration};
use crate::registry::{DevfileStack, TypesWithDetails};
use anyhow::Result;

/// Answer to the project type question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeAnswer {
    Selected(DevfileStack),
    Back,
}

/// Change requested on a container configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOperation {
    Nothing,
    AddPort,
    AddEnvVar,
    DeletePort(String),
    DeleteEnvVar(String),
}

/// Source of user choices
pub trait Asker {
    /// Pick a language among `langs`
    fn ask_language(&mut self, langs: &[String]) -> Result<String>;

    /// Pick a project type, or go back to the language question
    fn ask_type(&mut self, types: &TypesWithDetails) -> Result<TypeAnswer>;

    /// Pick a starter project
    ///
    /// Returns the position of the choice in `names` sorted by plain string
    /// order, or `None` when no starter project is wanted.
    fn ask_starter_project(&mut self, names: &[String]) -> Result<Option<usize>>;

    /// Ask for the component name, proposing `default`
    fn ask_name(&mut self, default: &str) -> Result<String>;

    /// Pick a container to reconfigure, `None` once the configuration is correct
    fn ask_container_name(&mut self, containers: &[String]) -> Result<Option<String>>;

    fn ask_personalize_configuration(
        &mut self,
        config: &ContainerConfiguration,
    ) -> Result<ConfigOperation>;

    fn ask_add_port(&mut self) -> Result<u16>;

    /// Ask for a new environment variable, as a name and a value
    fn ask_add_env_var(&mut self) -> Result<(String, String)>;

    fn show_configuration(&mut self, config: &DevfileConfiguration) -> Result<()>;

    fn warn(&mut self, message: &str) -> Result<()>;
}
