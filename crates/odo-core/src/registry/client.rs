//! Devfile registry client
//!
//! Registries are OCI-based devfile registries exposing the registry REST API:
//! - `GET /v2index?type=stack` (or the older `/index`) lists the stacks
//! - `GET /devfiles/<stack>[/<version>]` serves a devfile
//! - `GET /devfiles/<stack>[/<version>]/starter-projects/<name>` serves a starter project archive

use super::error::RegistryError;
use super::types::{DevfileStack, DevfileStackList, IndexEntry, Registry};
use anyhow::{Context, Result};
use tokio::task::JoinSet;
use url::Url;

const GITHUB_HOSTS: &[&str] = &["github.com", "raw.githubusercontent.com"];

/// Restrictions applied when listing stacks
#[derive(Debug, Clone, Default)]
pub struct StackFilter {
    /// Only list stacks from this registry
    pub registry: Option<String>,

    /// Only list the stack with this exact name
    pub devfile: Option<String>,

    /// Substring searched in name, description and architectures
    pub text: Option<String>,
}

/// Access to devfile registries
#[allow(async_fn_in_trait)]
pub trait RegistryClient {
    /// Configured registries, or only the one named `name`
    fn get_devfile_registries(&self, name: Option<&str>) -> Vec<Registry>;

    /// Fetch a snapshot of the stacks served by the configured registries
    async fn list_devfile_stacks(&self, filter: &StackFilter) -> Result<DevfileStackList>;

    /// Fetch the devfile of a stack
    async fn pull_stack(
        &self,
        registry: &Registry,
        stack: &str,
        version: Option<&str>,
    ) -> Result<Vec<u8>>;

    /// Fetch the archive of one of a stack's starter projects
    async fn download_starter_project(
        &self,
        registry: &Registry,
        stack: &str,
        version: Option<&str>,
        starter: &str,
    ) -> Result<Vec<u8>>;

    /// Fetch an arbitrary file over HTTP(S)
    async fn download_file(&self, url: &str) -> Result<Vec<u8>>;
}

/// Whether a registry URL points at GitHub (no longer supported)
pub fn is_github_based_registry(url: &str) -> Result<bool> {
    let parsed = Url::parse(url).with_context(|| format!("unable to parse registry url {}", url))?;
    let host = parsed.host_str().unwrap_or_default();
    Ok(GITHUB_HOSTS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain))))
}

/// Registry client talking HTTP to the configured registries
pub struct HttpRegistryClient {
    registries: Vec<Registry>,
    client: reqwest::Client,
}

impl HttpRegistryClient {
    /// Create a new client with a custom user agent
    pub fn new(registries: Vec<Registry>, user_agent: &str) -> Self {
        let registries = registries
            .into_iter()
            .enumerate()
            .map(|(priority, mut registry)| {
                registry.priority = priority;
                registry
            })
            .collect();

        Self {
            registries,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Build a URL by appending path segments, preserving query parameters
    fn build_url(base: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(base).with_context(|| format!("Invalid registry URL: {}", base))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn stack_segments<'a>(stack: &'a str, version: Option<&'a str>) -> Vec<&'a str> {
        let mut segments = vec!["devfiles", stack];
        if let Some(version) = version {
            segments.push(version);
        }
        segments
    }

    async fn get_bytes(client: &reqwest::Client, url: Url) -> Result<Vec<u8>> {
        let response = client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch {}: HTTP {}", url, response.status());
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch_index(
        client: &reqwest::Client,
        registry: &Registry,
        endpoint: &str,
    ) -> Result<Vec<IndexEntry>> {
        let mut url = Self::build_url(&registry.url, &[endpoint])?;
        url.query_pairs_mut().append_pair("type", "stack");
        let bytes = Self::get_bytes(client, url.clone()).await?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse registry index from {}", url))
    }

    /// Retrieve the stacks of one registry, falling back to the older index endpoint
    async fn fetch_registry_stacks(
        client: &reqwest::Client,
        registry: &Registry,
    ) -> Result<Vec<DevfileStack>> {
        if is_github_based_registry(&registry.url)? {
            return Err(RegistryError::GithubRegistryNotSupported.into());
        }

        let entries = match Self::fetch_index(client, registry, "v2index").await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(
                    "error while accessing the v2index endpoint for registry {} ({}) => falling back to the old index endpoint: {:#}",
                    registry.name,
                    registry.url,
                    e
                );
                Self::fetch_index(client, registry, "index").await?
            }
        };

        Ok(entries
            .into_iter()
            .map(|mut entry| {
                if entry.display_name.is_empty() {
                    entry.display_name = entry.name.clone();
                }
                DevfileStack::from_index(registry, entry)
            })
            .collect())
    }
}

impl RegistryClient for HttpRegistryClient {
    fn get_devfile_registries(&self, name: Option<&str>) -> Vec<Registry> {
        match name {
            Some(name) => self
                .registries
                .iter()
                .filter(|r| r.name == name)
                .take(1)
                .cloned()
                .collect(),
            None => self.registries.clone(),
        }
    }

    async fn list_devfile_stacks(&self, filter: &StackFilter) -> Result<DevfileStackList> {
        let registries = self.get_devfile_registries(filter.registry.as_deref());

        // Indices are fetched concurrently, results are kept in priority order
        let mut tasks = JoinSet::new();
        for (slot, registry) in registries.iter().cloned().enumerate() {
            let client = self.client.clone();
            tasks.spawn(async move {
                let result = Self::fetch_registry_stacks(&client, &registry).await;
                (slot, registry, result)
            });
        }

        let mut per_registry: Vec<Vec<DevfileStack>> = vec![Vec::new(); registries.len()];
        while let Some(joined) = tasks.join_next().await {
            let (slot, registry, result) = joined.context("Registry index task failed")?;
            match result {
                Ok(stacks) => per_registry[slot] = stacks,
                Err(e) => tracing::warn!(
                    "Registry {} is not set up properly with error: {:#}, please check the registry URL, and credential and remove add the registry again (refer to `odo preference add registry --help`)",
                    registry.name,
                    e
                ),
            }
        }

        let mut items: Vec<DevfileStack> = per_registry
            .into_iter()
            .flatten()
            .filter(|stack| match &filter.devfile {
                Some(name) => &stack.name == name,
                None => true,
            })
            .filter(|stack| match &filter.text {
                Some(text) => {
                    stack.name.contains(text.as_str())
                        || stack.description.contains(text.as_str())
                        || stack.architectures.iter().any(|a| a.contains(text.as_str()))
                }
                None => true,
            })
            .collect();

        items.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.registry.priority.cmp(&b.registry.priority))
        });

        Ok(DevfileStackList { registries, items })
    }

    async fn pull_stack(
        &self,
        registry: &Registry,
        stack: &str,
        version: Option<&str>,
    ) -> Result<Vec<u8>> {
        let url = Self::build_url(&registry.url, &Self::stack_segments(stack, version))?;
        tracing::info!("pulling devfile {} from {}", stack, url);
        Self::get_bytes(&self.client, url)
            .await
            .with_context(|| format!("Failed to pull devfile {:?} from registry {:?}", stack, registry.name))
    }

    async fn download_starter_project(
        &self,
        registry: &Registry,
        stack: &str,
        version: Option<&str>,
        starter: &str,
    ) -> Result<Vec<u8>> {
        let mut segments = Self::stack_segments(stack, version);
        segments.extend(["starter-projects", starter]);
        let url = Self::build_url(&registry.url, &segments)?;
        tracing::info!("downloading starter project {} from {}", starter, url);
        Self::get_bytes(&self.client, url).await.with_context(|| {
            format!(
                "Failed to download starter project {:?} from registry {:?}",
                starter, registry.name
            )
        })
    }

    async fn download_file(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
        Self::get_bytes(&self.client, url).await
    }
}
