//! Devfile documents
//!
//! A devfile is kept as a YAML mapping so that fields this crate does not
//! model survive a read/modify/write cycle. Typed views (starter projects,
//! container configuration) are derived on demand.

pub mod location;
pub mod name;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use location::{dir_is_empty, directory_contains_devfile, DEVFILE_NAME};
pub use name::validate_component_name;

/// Git source of a starter project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    #[serde(default)]
    pub remotes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_from: Option<CheckoutFrom>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFrom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

/// Zip source of a starter project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipSource {
    #[serde(default)]
    pub location: String,
}

/// A starter project declared by a devfile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarterProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<ZipSource>,
}

impl StarterProject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Ports and environment of one container component
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerConfiguration {
    pub ports: Vec<String>,
    pub envs: BTreeMap<String, String>,
}

/// Configuration of every container component, by component name
pub type DevfileConfiguration = BTreeMap<String, ContainerConfiguration>;

/// A parsed devfile and the file it was read from
#[derive(Debug, Clone)]
pub struct DevfileObj {
    path: PathBuf,
    data: Mapping,
}

impl DevfileObj {
    /// Read and validate a devfile from disk
    pub fn parse_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content =
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse_bytes(path, &content)
    }

    /// Validate devfile content that will live at `path`
    pub fn parse_bytes(path: impl Into<PathBuf>, content: &[u8]) -> Result<Self> {
        let path = path.into();
        let value: Value = serde_yaml::from_slice(content)
            .with_context(|| format!("Failed to parse devfile {}", path.display()))?;
        let data = match value {
            Value::Mapping(data) => data,
            _ => anyhow::bail!("devfile {} is not a YAML mapping", path.display()),
        };

        let schema_version = data
            .get("schemaVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("devfile {} has no schemaVersion", path.display()))?;
        let supported = semver::Version::parse(schema_version)
            .map(|v| v.major == 2)
            .unwrap_or(false);
        if !supported {
            anyhow::bail!("devfile schemaVersion {:?} is not supported", schema_version);
        }

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema_version(&self) -> &str {
        self.data
            .get("schemaVersion")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// `metadata.name`, empty when unset
    pub fn metadata_name(&self) -> &str {
        self.data
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Set `metadata.name`, creating the metadata section if needed
    pub fn set_metadata_name(&mut self, name: &str) -> Result<()> {
        let metadata = self
            .data
            .entry(Value::from("metadata"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        let metadata = metadata
            .as_mapping_mut()
            .ok_or_else(|| anyhow::anyhow!("devfile metadata is not a mapping"))?;
        metadata.insert(Value::from("name"), Value::from(name));
        Ok(())
    }

    /// Starter projects, in declaration order
    pub fn starter_projects(&self) -> Result<Vec<StarterProject>> {
        match self.data.get("starterProjects") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_yaml::from_value(value.clone())
                .context("Failed to read the devfile starter projects"),
        }
    }

    /// Ports and environment variables of every container component
    pub fn container_configuration(&self) -> DevfileConfiguration {
        let mut config = DevfileConfiguration::new();
        for component in self.components() {
            let (Some(name), Some(container)) = (
                component.get("name").and_then(Value::as_str),
                component.get("container"),
            ) else {
                continue;
            };

            let ports = container
                .get("endpoints")
                .and_then(Value::as_sequence)
                .map(|endpoints| {
                    endpoints
                        .iter()
                        .filter_map(|ep| ep.get("targetPort").and_then(scalar_to_string))
                        .collect()
                })
                .unwrap_or_default();

            let envs = container
                .get("env")
                .and_then(Value::as_sequence)
                .map(|envs| {
                    envs.iter()
                        .filter_map(|env| {
                            let key = env.get("name").and_then(Value::as_str)?;
                            let value = env.get("value").and_then(scalar_to_string).unwrap_or_default();
                            Some((key.to_string(), value))
                        })
                        .collect()
                })
                .unwrap_or_default();

            config.insert(name.to_string(), ContainerConfiguration { ports, envs });
        }
        config
    }

    /// Expose a port on a container, unless it already is
    pub fn add_port(&mut self, container: &str, port: u16) -> Result<()> {
        let target = port.to_string();
        let endpoints = sequence_entry(self.container_mut(container)?, "endpoints")?;
        let exists = endpoints.iter().any(|ep| {
            ep.get("targetPort").and_then(scalar_to_string).as_deref() == Some(target.as_str())
        });
        if !exists {
            let mut endpoint = Mapping::new();
            endpoint.insert(Value::from("name"), Value::from(format!("port-{}-tcp", port)));
            endpoint.insert(Value::from("targetPort"), Value::from(port));
            endpoints.push(Value::Mapping(endpoint));
        }
        Ok(())
    }

    /// Remove every endpoint of a container targeting `port`
    pub fn remove_port(&mut self, container: &str, port: &str) -> Result<()> {
        let endpoints = sequence_entry(self.container_mut(container)?, "endpoints")?;
        let before = endpoints.len();
        endpoints.retain(|ep| ep.get("targetPort").and_then(scalar_to_string).as_deref() != Some(port));
        if endpoints.len() == before {
            anyhow::bail!("unable to find port {:?} in container {:?}", port, container);
        }
        Ok(())
    }

    /// Set an environment variable on a container, replacing any previous value
    pub fn add_env_var(&mut self, container: &str, name: &str, value: &str) -> Result<()> {
        let envs = sequence_entry(self.container_mut(container)?, "env")?;
        let mut env = Mapping::new();
        env.insert(Value::from("name"), Value::from(name));
        env.insert(Value::from("value"), Value::from(value));

        match envs
            .iter_mut()
            .find(|e| e.get("name").and_then(Value::as_str) == Some(name))
        {
            Some(existing) => *existing = Value::Mapping(env),
            None => envs.push(Value::Mapping(env)),
        }
        Ok(())
    }

    /// Remove an environment variable from a container
    pub fn remove_env_var(&mut self, container: &str, name: &str) -> Result<()> {
        let envs = sequence_entry(self.container_mut(container)?, "env")?;
        let before = envs.len();
        envs.retain(|e| e.get("name").and_then(Value::as_str) != Some(name));
        if envs.len() == before {
            anyhow::bail!(
                "unable to find environment variable {:?} in container {:?}",
                name,
                container
            );
        }
        Ok(())
    }

    /// Whether a command belongs to the `deploy` group
    pub fn has_deploy_command(&self) -> bool {
        self.data
            .get("commands")
            .and_then(Value::as_sequence)
            .into_iter()
            .flatten()
            .any(|command| {
                ["exec", "apply", "composite"].iter().any(|kind| {
                    command
                        .get(*kind)
                        .and_then(|c| c.get("group"))
                        .and_then(|g| g.get("kind"))
                        .and_then(Value::as_str)
                        == Some("deploy")
                })
            })
    }

    /// Serialize the devfile back to its path
    pub fn write(&self) -> Result<()> {
        let content = serde_yaml::to_string(&self.data).context("Failed to serialize devfile")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn components(&self) -> impl Iterator<Item = &Value> {
        self.data
            .get("components")
            .and_then(Value::as_sequence)
            .into_iter()
            .flatten()
    }

    fn container_mut(&mut self, name: &str) -> Result<&mut Mapping> {
        self.data
            .get_mut("components")
            .and_then(Value::as_sequence_mut)
            .and_then(|components| {
                components
                    .iter_mut()
                    .find(|c| c.get("name").and_then(Value::as_str) == Some(name))
            })
            .and_then(|component| component.get_mut("container"))
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| anyhow::anyhow!("container component {:?} not found in devfile", name))
    }
}

fn sequence_entry<'a>(mapping: &'a mut Mapping, key: &str) -> Result<&'a mut Vec<Value>> {
    mapping
        .entry(Value::from(key))
        .or_insert_with(|| Value::Sequence(Vec::new()))
        .as_sequence_mut()
        .ok_or_else(|| anyhow::anyhow!("devfile field {:?} is not a list", key))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const NODEJS_DEVFILE: &str = r#"schemaVersion: 2.2.0
metadata:
  name: nodejs
  language: JavaScript
  projectType: Node.js
starterProjects:
  - name: nodejs-starter
    git:
      remotes:
        origin: https://github.com/odo-devfiles/nodejs-ex.git
  - name: express
    zip:
      location: https://example.com/express.zip
components:
  - name: runtime
    container:
      image: registry.access.redhat.com/ubi8/nodejs-16:latest
      endpoints:
        - name: http-node
          targetPort: 3000
      env:
        - name: NODE_ENV
          value: development
  - name: data
    volume:
      size: 1Gi
commands:
  - id: run
    exec:
      component: runtime
      commandLine: npm start
      group:
        kind: run
        isDefault: true
"#;

    pub(crate) fn nodejs_devfile() -> DevfileObj {
        DevfileObj::parse_bytes("devfile.yaml", NODEJS_DEVFILE.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_rejects_unsupported_schema() {
        assert!(DevfileObj::parse_bytes("d.yaml", b"schemaVersion: 1.0.0\n").is_err());
        assert!(DevfileObj::parse_bytes("d.yaml", b"metadata: {}\n").is_err());
        assert!(DevfileObj::parse_bytes("d.yaml", b"- a\n- b\n").is_err());
    }

    #[test]
    fn test_metadata_name() {
        let mut devfile = nodejs_devfile();
        assert_eq!(devfile.metadata_name(), "nodejs");

        devfile.set_metadata_name("my-nodejs-app").unwrap();
        assert_eq!(devfile.metadata_name(), "my-nodejs-app");
    }

    #[test]
    fn test_set_metadata_name_creates_section() {
        let mut devfile = DevfileObj::parse_bytes("d.yaml", b"schemaVersion: 2.1.0\n").unwrap();
        assert_eq!(devfile.metadata_name(), "");

        devfile.set_metadata_name("app").unwrap();
        assert_eq!(devfile.metadata_name(), "app");
    }

    #[test]
    fn test_set_metadata_name_fails_on_invalid_metadata() {
        let mut devfile =
            DevfileObj::parse_bytes("d.yaml", b"schemaVersion: 2.1.0\nmetadata: oops\n").unwrap();
        assert!(devfile.set_metadata_name("app").is_err());
    }

    #[test]
    fn test_starter_projects_in_declaration_order() {
        let starters = nodejs_devfile().starter_projects().unwrap();
        let names: Vec<&str> = starters.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["nodejs-starter", "express"]);
        assert!(starters[0].git.is_some());
        assert_eq!(
            starters[1].zip.as_ref().map(|z| z.location.as_str()),
            Some("https://example.com/express.zip")
        );
    }

    #[test]
    fn test_container_configuration() {
        let config = nodejs_devfile().container_configuration();
        assert_eq!(config.len(), 1);
        let runtime = &config["runtime"];
        assert_eq!(runtime.ports, vec!["3000"]);
        assert_eq!(runtime.envs["NODE_ENV"], "development");
    }

    #[test]
    fn test_ports_and_env_vars() {
        let mut devfile = nodejs_devfile();
        devfile.add_port("runtime", 8080).unwrap();
        devfile.add_port("runtime", 8080).unwrap();
        devfile.remove_port("runtime", "3000").unwrap();
        devfile.add_env_var("runtime", "DEBUG", "true").unwrap();
        devfile.add_env_var("runtime", "NODE_ENV", "production").unwrap();
        devfile.remove_env_var("runtime", "DEBUG").unwrap();

        let config = devfile.container_configuration();
        let runtime = &config["runtime"];
        assert_eq!(runtime.ports, vec!["8080"]);
        assert_eq!(runtime.envs.len(), 1);
        assert_eq!(runtime.envs["NODE_ENV"], "production");

        assert!(devfile.remove_port("runtime", "9999").is_err());
        assert!(devfile.remove_env_var("runtime", "MISSING").is_err());
        assert!(devfile.add_port("data", 80).is_err());
    }

    #[test]
    fn test_deploy_command_detection() {
        assert!(!nodejs_devfile().has_deploy_command());

        let with_deploy = DevfileObj::parse_bytes(
            "d.yaml",
            b"schemaVersion: 2.2.0\ncommands:\n  - id: deploy\n    composite:\n      commands: [a]\n      group:\n        kind: deploy\n",
        )
        .unwrap();
        assert!(with_deploy.has_deploy_command());
    }

    #[test]
    fn test_write_preserves_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEVFILE_NAME);
        std::fs::write(&path, NODEJS_DEVFILE).unwrap();

        let mut devfile = DevfileObj::parse_file(&path).unwrap();
        devfile.set_metadata_name("renamed").unwrap();
        devfile.write().unwrap();

        let reread = DevfileObj::parse_file(&path).unwrap();
        assert_eq!(reread.metadata_name(), "renamed");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("projectType: Node.js"));
        assert!(content.contains("npm start"));
    }
}
