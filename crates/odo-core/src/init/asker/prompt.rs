//! Asker built on top of a raw prompt backend

use super::{Asker, ConfigOperation, TypeAnswer};
use crate::devfile::{ContainerConfiguration, DevfileConfiguration};
use crate::registry::TypesWithDetails;
use anyhow::Result;

pub const GO_BACK: &str = "** GO BACK **";
pub const NO_STARTER_PROJECT: &str = "** NO STARTER PROJECT **";
pub const NO_CONTAINER_CHANGE: &str = "NONE - configuration is correct";
pub const NOTHING_TO_CHANGE: &str = "NOTHING - configuration is correct";
pub const ADD_PORT: &str = "Add new port";
pub const ADD_ENV_VAR: &str = "Add new environment variable";

/// Raw prompt primitives of a user interface
pub trait Prompter {
    /// Single choice among `options`, returns the chosen position
    fn select(&mut self, message: &str, options: &[String], default: Option<usize>)
        -> Result<usize>;

    /// Free text answer
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String>;

    fn warn(&mut self, message: &str) -> Result<()>;

    fn note(&mut self, title: &str, body: &str) -> Result<()>;
}

/// [`Asker`] presenting every question through a [`Prompter`]
pub struct PromptAsker<P> {
    prompter: P,
}

impl<P: Prompter> PromptAsker<P> {
    pub fn new(prompter: P) -> Self {
        Self { prompter }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    fn select_position(
        &mut self,
        message: &str,
        options: &[String],
        default: Option<usize>,
    ) -> Result<usize> {
        let position = self.prompter.select(message, options, default)?;
        if position >= options.len() {
            anyhow::bail!(
                "selected position {} is out of range ({} options)",
                position,
                options.len()
            );
        }
        Ok(position)
    }
}

impl<P: Prompter> Asker for PromptAsker<P> {
    fn ask_language(&mut self, langs: &[String]) -> Result<String> {
        let mut options = langs.to_vec();
        options.sort();
        let position = self.select_position("Select language:", &options, None)?;
        Ok(options.swap_remove(position))
    }

    fn ask_type(&mut self, types: &TypesWithDetails) -> Result<TypeAnswer> {
        let mut options = types.ordered_labels();
        let back = options.len();
        options.push(GO_BACK.to_string());

        let position = self.select_position("Select project type:", &options, None)?;
        if position == back {
            return Ok(TypeAnswer::Back);
        }
        Ok(TypeAnswer::Selected(
            types.at_ordered_position(position)?.clone(),
        ))
    }

    fn ask_starter_project(&mut self, names: &[String]) -> Result<Option<usize>> {
        let mut options = names.to_vec();
        options.sort();
        let none = options.len();
        options.push(NO_STARTER_PROJECT.to_string());

        let position = self.select_position(
            "Which starter project do you want to use?",
            &options,
            None,
        )?;
        Ok((position != none).then_some(position))
    }

    fn ask_name(&mut self, default: &str) -> Result<String> {
        let answer = self.prompter.input("Enter component name:", Some(default))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(default.to_string());
        }
        Ok(answer.to_string())
    }

    fn ask_container_name(&mut self, containers: &[String]) -> Result<Option<String>> {
        let mut options = containers.to_vec();
        let none = options.len();
        options.push(NO_CONTAINER_CHANGE.to_string());

        let position = self.select_position(
            "Select container for which you want to change configuration?",
            &options,
            Some(none),
        )?;
        if position == none {
            return Ok(None);
        }
        Ok(Some(options.swap_remove(position)))
    }

    fn ask_personalize_configuration(
        &mut self,
        config: &ContainerConfiguration,
    ) -> Result<ConfigOperation> {
        let mut operations = vec![(NOTHING_TO_CHANGE.to_string(), ConfigOperation::Nothing)];
        for port in &config.ports {
            operations.push((
                format!("Delete port {:?}", port),
                ConfigOperation::DeletePort(port.clone()),
            ));
        }
        operations.push((ADD_PORT.to_string(), ConfigOperation::AddPort));
        for name in config.envs.keys() {
            operations.push((
                format!("Delete environment variable {:?}", name),
                ConfigOperation::DeleteEnvVar(name.clone()),
            ));
        }
        operations.push((ADD_ENV_VAR.to_string(), ConfigOperation::AddEnvVar));

        let labels: Vec<String> = operations.iter().map(|(label, _)| label.clone()).collect();
        let position =
            self.select_position("What configuration do you want to change?", &labels, Some(0))?;
        Ok(operations.swap_remove(position).1)
    }

    fn ask_add_port(&mut self) -> Result<u16> {
        loop {
            let answer = self.prompter.input("Enter port number:", None)?;
            match answer.trim().parse::<u16>() {
                Ok(port) if port > 0 => return Ok(port),
                _ => self
                    .prompter
                    .warn(&format!("{:?} is not a valid port number (1-65535)", answer.trim()))?,
            }
        }
    }

    fn ask_add_env_var(&mut self) -> Result<(String, String)> {
        let name = loop {
            let answer = self
                .prompter
                .input("Enter new environment variable name:", None)?;
            let answer = answer.trim();
            if !answer.is_empty() {
                break answer.to_string();
            }
            self.prompter.warn("The environment variable name cannot be empty")?;
        };
        let value = self.prompter.input(
            &format!("Enter value for {:?} environment variable:", name),
            None,
        )?;
        Ok((name, value))
    }

    fn show_configuration(&mut self, config: &DevfileConfiguration) -> Result<()> {
        self.prompter
            .note("Current component configuration", &format_configuration(config))
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        self.prompter.warn(message)
    }
}

fn format_configuration(config: &DevfileConfiguration) -> String {
    let mut lines = Vec::new();
    for (container, settings) in config {
        lines.push(format!("Container Configuration {:?}:", container));
        lines.push("  OPEN PORTS:".to_string());
        lines.extend(settings.ports.iter().map(|port| format!("    - {}", port)));
        lines.push("  ENVIRONMENT VARIABLES:".to_string());
        lines.extend(
            settings
                .envs
                .iter()
                .map(|(name, value)| format!("    - {} = {}", name, value)),
        );
    }
    lines.join("\n")
}
