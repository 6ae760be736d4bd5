//! Strategies resolving what `odo init` should create
//!
//! - [`InteractiveBackend`]: asks the user through an [`Asker`](crate::init::Asker)
//! - [`FlagsBackend`]: reads everything from command line flags

mod flags;
mod interactive;

pub use flags::FlagsBackend;
pub use interactive::InteractiveBackend;

use super::InitFlags;
use crate::devfile::{DevfileObj, StarterProject};
use anyhow::Result;
use std::path::Path;

pub const FLAG_NAME: &str = "name";
pub const FLAG_DEVFILE: &str = "devfile";
pub const FLAG_DEVFILE_REGISTRY: &str = "devfile-registry";
pub const FLAG_DEVFILE_VERSION: &str = "devfile-version";
pub const FLAG_STARTER: &str = "starter";
pub const FLAG_DEVFILE_PATH: &str = "devfile-path";

/// Where to get the devfile from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevfileLocation {
    /// Stack name in a registry
    pub devfile: Option<String>,

    /// Registry serving `devfile`; any configured registry when unset
    pub devfile_registry: Option<String>,

    /// Stack version; the default version when unset
    pub devfile_version: Option<String>,

    /// Local path or URL of a devfile, instead of a registry stack
    pub devfile_path: Option<String>,
}

/// One way of gathering the answers needed to initialize a component
#[allow(async_fn_in_trait)]
pub trait InitBackend {
    /// Check that the flags are usable for a component in `dir`
    fn validate(&self, flags: &InitFlags, dir: &Path) -> Result<()>;

    /// Decide which devfile to use
    async fn select_devfile(&mut self, flags: &InitFlags) -> Result<Option<DevfileLocation>>;

    /// Decide which starter project of `devfile` to use, if any
    fn select_starter_project(
        &mut self,
        devfile: &DevfileObj,
        flags: &InitFlags,
    ) -> Result<Option<StarterProject>>;

    /// Set the component name in the devfile metadata
    fn personalize_name(&mut self, devfile: &mut DevfileObj, flags: &InitFlags) -> Result<()>;

    /// Adjust container ports and environment variables
    fn personalize_devfile_config(&mut self, devfile: &mut DevfileObj) -> Result<()>;
}
