//! Error types for ripple operations.
//!
//! The propagation engine itself never fails: stale references are skipped
//! and an empty impact set is a valid answer. Errors here come from the
//! surrounding layers, such as reading configuration or loading the catalog.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for ripple operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors related to repository configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.ripple/` directory was found walking up from the working directory.
    #[error("Not a ripple repository (or any parent). Run 'ripple init' first.")]
    NotInitialized,

    /// A configuration value is out of range or malformed.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The configuration file is not valid YAML.
    #[error("Configuration YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A repository already exists where `init` was asked to create one.
    #[error("Ripple is already initialized in {}", .0.display())]
    AlreadyInitialized(PathBuf),
}

/// Errors that prevent a catalog from loading at all.
///
/// Problems with individual records are reported as
/// [`LoadWarning`](crate::catalog::jsonl::LoadWarning)s instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required catalog file does not exist.
    #[error("Catalog file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// The catalog directory does not exist.
    #[error("Catalog directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
}

/// A specialized Result type for ripple operations.
pub type Result<T> = std::result::Result<T, Error>;
