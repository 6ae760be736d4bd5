//! Scripted test doubles for the init workflow

use super::asker::{Asker, ConfigOperation, Prompter, TypeAnswer};
use crate::devfile::{ContainerConfiguration, DevfileConfiguration};
use crate::registry::{
    DevfileStack, DevfileStackList, Registry, RegistryClient, StackFilter, TypesWithDetails,
};
use anyhow::Result;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub(crate) fn stack(name: &str, display: &str, language: &str, registry: &str) -> DevfileStack {
    DevfileStack {
        name: name.to_string(),
        display_name: display.to_string(),
        language: language.to_string(),
        registry: Registry::new(registry.to_string(), format!("https://{}.test", registry), false),
        ..Default::default()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum PromptAnswer {
    Select(usize),
    Input(String),
    Fail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PromptCall {
    Select {
        message: String,
        options: Vec<String>,
        default: Option<usize>,
    },
    Input {
        message: String,
        default: Option<String>,
    },
    Warn(String),
    Note {
        title: String,
        body: String,
    },
}

/// Prompter replaying canned answers and recording every prompt
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    answers: VecDeque<PromptAnswer>,
    pub calls: Vec<PromptCall>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<PromptAnswer>) -> Self {
        Self {
            answers: answers.into(),
            calls: Vec::new(),
        }
    }

    fn next(&mut self) -> Result<PromptAnswer> {
        match self.answers.pop_front() {
            Some(PromptAnswer::Fail(message)) => Err(anyhow::anyhow!(message)),
            Some(answer) => Ok(answer),
            None => anyhow::bail!("no scripted answer left"),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(
        &mut self,
        message: &str,
        options: &[String],
        default: Option<usize>,
    ) -> Result<usize> {
        self.calls.push(PromptCall::Select {
            message: message.to_string(),
            options: options.to_vec(),
            default,
        });
        match self.next()? {
            PromptAnswer::Select(position) => Ok(position),
            other => anyhow::bail!("expected a selection answer, got {:?}", other),
        }
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        self.calls.push(PromptCall::Input {
            message: message.to_string(),
            default: default.map(str::to_string),
        });
        match self.next()? {
            PromptAnswer::Input(text) => Ok(text),
            other => anyhow::bail!("expected a text answer, got {:?}", other),
        }
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        self.calls.push(PromptCall::Warn(message.to_string()));
        Ok(())
    }

    fn note(&mut self, title: &str, body: &str) -> Result<()> {
        self.calls.push(PromptCall::Note {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) enum AskerAnswer {
    Language(String),
    Type(TypeAnswer),
    Starter(Option<usize>),
    Name(String),
    Container(Option<String>),
    Operation(ConfigOperation),
    Port(u16),
    EnvVar(String, String),
    Fail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AskerCall {
    Language(Vec<String>),
    Type(Vec<String>),
    Starter(Vec<String>),
    Name(String),
    Container(Vec<String>),
    Configuration(ContainerConfiguration),
    AddPort,
    AddEnvVar,
    Show(DevfileConfiguration),
    Warn(String),
}

/// Asker replaying canned answers and recording every question
#[derive(Debug, Default)]
pub(crate) struct ScriptedAsker {
    answers: VecDeque<AskerAnswer>,
    pub calls: Vec<AskerCall>,
}

impl ScriptedAsker {
    pub fn new(answers: Vec<AskerAnswer>) -> Self {
        Self {
            answers: answers.into(),
            calls: Vec::new(),
        }
    }

    fn next(&mut self) -> Result<AskerAnswer> {
        match self.answers.pop_front() {
            Some(AskerAnswer::Fail(message)) => Err(anyhow::anyhow!(message)),
            Some(answer) => Ok(answer),
            None => anyhow::bail!("no scripted answer left"),
        }
    }
}

impl Asker for ScriptedAsker {
    fn ask_language(&mut self, langs: &[String]) -> Result<String> {
        self.calls.push(AskerCall::Language(langs.to_vec()));
        match self.next()? {
            AskerAnswer::Language(lang) => Ok(lang),
            other => anyhow::bail!("unexpected answer {:?} to ask_language", other),
        }
    }

    fn ask_type(&mut self, types: &TypesWithDetails) -> Result<TypeAnswer> {
        self.calls.push(AskerCall::Type(types.ordered_labels()));
        match self.next()? {
            AskerAnswer::Type(answer) => Ok(answer),
            other => anyhow::bail!("unexpected answer {:?} to ask_type", other),
        }
    }

    fn ask_starter_project(&mut self, names: &[String]) -> Result<Option<usize>> {
        self.calls.push(AskerCall::Starter(names.to_vec()));
        match self.next()? {
            AskerAnswer::Starter(answer) => Ok(answer),
            other => anyhow::bail!("unexpected answer {:?} to ask_starter_project", other),
        }
    }

    fn ask_name(&mut self, default: &str) -> Result<String> {
        self.calls.push(AskerCall::Name(default.to_string()));
        match self.next()? {
            AskerAnswer::Name(name) => Ok(name),
            other => anyhow::bail!("unexpected answer {:?} to ask_name", other),
        }
    }

    fn ask_container_name(&mut self, containers: &[String]) -> Result<Option<String>> {
        self.calls.push(AskerCall::Container(containers.to_vec()));
        match self.next()? {
            AskerAnswer::Container(answer) => Ok(answer),
            other => anyhow::bail!("unexpected answer {:?} to ask_container_name", other),
        }
    }

    fn ask_personalize_configuration(
        &mut self,
        config: &ContainerConfiguration,
    ) -> Result<ConfigOperation> {
        self.calls.push(AskerCall::Configuration(config.clone()));
        match self.next()? {
            AskerAnswer::Operation(operation) => Ok(operation),
            other => anyhow::bail!("unexpected answer {:?} to ask_personalize_configuration", other),
        }
    }

    fn ask_add_port(&mut self) -> Result<u16> {
        self.calls.push(AskerCall::AddPort);
        match self.next()? {
            AskerAnswer::Port(port) => Ok(port),
            other => anyhow::bail!("unexpected answer {:?} to ask_add_port", other),
        }
    }

    fn ask_add_env_var(&mut self) -> Result<(String, String)> {
        self.calls.push(AskerCall::AddEnvVar);
        match self.next()? {
            AskerAnswer::EnvVar(name, value) => Ok((name, value)),
            other => anyhow::bail!("unexpected answer {:?} to ask_add_env_var", other),
        }
    }

    fn show_configuration(&mut self, config: &DevfileConfiguration) -> Result<()> {
        self.calls.push(AskerCall::Show(config.clone()));
        Ok(())
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        self.calls.push(AskerCall::Warn(message.to_string()));
        Ok(())
    }
}

/// In-memory registry client
///
/// Devfiles and starter archives are keyed by `<registry>/<stack>`, plain
/// files by URL.
#[derive(Debug, Default)]
pub(crate) struct FakeRegistryClient {
    pub registries: Vec<Registry>,
    pub stacks: Vec<DevfileStack>,
    pub devfiles: HashMap<String, Vec<u8>>,
    pub starters: HashMap<String, Vec<u8>>,
    pub files: HashMap<String, Vec<u8>>,
    pub fail_listing: bool,
    pub requests: Mutex<Vec<String>>,
}

impl FakeRegistryClient {
    pub fn with_registries(names: &[&str]) -> Self {
        Self {
            registries: names
                .iter()
                .map(|name| Registry::new(name.to_string(), format!("https://{}.test", name), false))
                .collect(),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, request: String) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }
}

impl RegistryClient for FakeRegistryClient {
    fn get_devfile_registries(&self, name: Option<&str>) -> Vec<Registry> {
        self.registries
            .iter()
            .filter(|r| name.map_or(true, |name| r.name == name))
            .cloned()
            .collect()
    }

    async fn list_devfile_stacks(&self, _filter: &StackFilter) -> Result<DevfileStackList> {
        self.record("list".to_string());
        if self.fail_listing {
            anyhow::bail!("registry unreachable");
        }
        Ok(DevfileStackList {
            registries: self.registries.clone(),
            items: self.stacks.clone(),
        })
    }

    async fn pull_stack(
        &self,
        registry: &Registry,
        stack: &str,
        version: Option<&str>,
    ) -> Result<Vec<u8>> {
        let key = format!("{}/{}", registry.name, stack);
        self.record(format!("pull {}@{}", key, version.unwrap_or("latest")));
        self.devfiles
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("devfile {} not found", key))
    }

    async fn download_starter_project(
        &self,
        registry: &Registry,
        stack: &str,
        _version: Option<&str>,
        starter: &str,
    ) -> Result<Vec<u8>> {
        let key = format!("{}/{}", registry.name, stack);
        self.record(format!("starter {} {}", key, starter));
        self.starters
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("starter project {} not found", starter))
    }

    async fn download_file(&self, url: &str) -> Result<Vec<u8>> {
        self.record(format!("get {}", url));
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{} not found", url))
    }
}
