//! Registry error conditions callers may want to match on

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("github based registries are no longer supported, use OCI based registries instead, see https://github.com/devfile/registry-support")]
    GithubRegistryNotSupported,

    #[error("registry {0:?} not found in the list of devfile registries. Please use `odo preference add registry` command to configure devfile registries")]
    RegistryNotFound(String),

    #[error("registry {0:?} already exists")]
    RegistryExists(String),

    #[error("no devfile registry is configured. Please use `odo preference add registry` command to configure devfile registries")]
    NoRegistry,

    #[error("unable to find the registry with name {0:?}")]
    UnknownRegistry(String),

    #[error("no project type at position {0}")]
    PositionOutOfRange(usize),

    #[error("unable to download devfile {0:?} from any configured registry")]
    DevfileNotFound(String),
}
