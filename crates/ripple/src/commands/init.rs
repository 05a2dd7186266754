//! Implementation of the `init` command.
//!
//! This module handles initialization of a new ripple repository, creating
//! the `.ripple/` directory with a configuration file and an empty catalog.

use crate::catalog::jsonl::CATALOG_FILE_NAMES;
use crate::config::RippleConfig;
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the ripple directory
pub const RIPPLE_DIR_NAME: &str = ".ripple";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Maximum directory depth to traverse when searching for the ripple root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created ripple directory
    pub ripple_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created catalog directory
    pub catalog_dir: PathBuf,
    /// Paths to the created (empty) catalog files
    pub catalog_files: Vec<PathBuf>,
}

/// Initialize a new ripple repository in the given directory.
///
/// # Errors
///
/// Returns an error if:
/// - The `.ripple/` directory already exists
/// - File system operations fail
pub async fn init(base_dir: &Path) -> Result<InitResult> {
    if is_initialized(base_dir) {
        return Err(ConfigError::AlreadyInitialized(base_dir.to_path_buf()).into());
    }

    let ripple_dir = base_dir.join(RIPPLE_DIR_NAME);
    fs::create_dir_all(&ripple_dir).await?;

    let config = RippleConfig::default();
    let config_file = ripple_dir.join(CONFIG_FILE_NAME);
    config.save(&config_file).await?;

    let catalog_dir = config.catalog_dir(base_dir);
    fs::create_dir_all(&catalog_dir).await?;

    let mut catalog_files = Vec::with_capacity(CATALOG_FILE_NAMES.len());
    for name in CATALOG_FILE_NAMES {
        let path = catalog_dir.join(name);
        fs::write(&path, "").await?;
        catalog_files.push(path);
    }

    tracing::debug!(dir = %ripple_dir.display(), "Initialized ripple repository");

    Ok(InitResult {
        ripple_dir,
        config_file,
        catalog_dir,
        catalog_files,
    })
}

/// Check if a directory has been initialized with ripple.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(RIPPLE_DIR_NAME).exists()
}

/// Find the ripple root directory by searching up the directory tree.
///
/// Starts from the given directory and traverses parent directories
/// until a `.ripple/` directory is found, the root is reached, or
/// the maximum traversal depth is exceeded.
pub fn find_ripple_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(RIPPLE_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
