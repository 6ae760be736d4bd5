//! odo Core - Shared library for the `odo` developer CLI
//!
//! This library bootstraps devfile components: it lists the devfile stacks
//! published by the configured devfile registries, helps the user pick one,
//! downloads the devfile and an optional starter project, and personalizes
//! the devfile before it is written back to disk.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Preferences, registry access and devfile manipulation
//! - **Layer 2: Workflow Orchestration** - `Asker` capability, `InitBackend` strategies and `InitClient`
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based terminal prompter and the `odo init` runner
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use odo_core::{preference::Preference, registry::{HttpRegistryClient, RegistryClient, StackFilter}};
//!
//! let preference = Preference::load()?;
//! let client = HttpRegistryClient::new(preference.registries().to_vec(), odo_core::USER_AGENT);
//! let catalog = client.list_devfile_stacks(&StackFilter::default()).await?;
//! for language in catalog.languages() {
//!     println!("{language}");
//! }
//! ```

pub mod devfile;
pub mod init;
pub mod logging;
pub mod preference;
pub mod registry;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use devfile::{DevfileObj, StarterProject};
pub use init::{Asker, DevfileLocation, InitBackend, InitClient, InitFlags};
pub use preference::Preference;
pub use registry::{DevfileStack, DevfileStackList, HttpRegistryClient, Registry, RegistryClient};

#[cfg(feature = "tui")]
pub use tui::run_init;

/// User agent sent to devfile registries
pub const USER_AGENT: &str = concat!("odo/", env!("CARGO_PKG_VERSION"));
