//! Devfile registry access and the stack catalog
//!
//! This module provides:
//! - Registry and stack types (Registry, DevfileStack, DevfileStackList)
//! - Catalog grouping by language and project type (TypesWithDetails)
//! - An HTTP client for OCI-based devfile registries
//! - Starter project archive extraction

pub mod client;
pub mod error;
pub mod starter;
pub mod types;

pub use client::{is_github_based_registry, HttpRegistryClient, RegistryClient, StackFilter};
pub use error::RegistryError;
pub use starter::{extract_starter_project, StarterFiles, CONFLICT_DIR_NAME};
pub use types::{DevfileStack, DevfileStackList, DevfileStackVersion, Registry, TypesWithDetails};
