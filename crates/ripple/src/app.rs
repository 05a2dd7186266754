//! Application context for CLI command execution.
//!
//! `App` locates the repository, reads its configuration and loads the
//! catalog snapshot once, then hands out engines over that snapshot.
//!
//! # Example
//!
//! ```no_run
//! use ripple::app::App;
//! use ripple::engine::ImpactRequest;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let analysis = app.engine(None).analyze(&ImpactRequest::new(["src/payment/fees.rs"]));
//!     println!("{} rules impacted", analysis.chain().summary.total_rules_affected);
//!     Ok(())
//! }
//! ```

use crate::catalog::jsonl::JsonlCatalogSource;
use crate::catalog::{CatalogSource, LoadWarning, RuleCatalog};
use crate::commands::init::{find_ripple_root, CONFIG_FILE_NAME, RIPPLE_DIR_NAME};
use crate::config::RippleConfig;
use crate::engine::ImpactEngine;
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
#[derive(Debug)]
pub struct App {
    /// Loaded catalog snapshot
    catalog: RuleCatalog,

    /// Problems found while loading the catalog
    warnings: Vec<LoadWarning>,

    /// Repository configuration
    config: RippleConfig,

    /// Directory containing `.ripple/`
    root_dir: PathBuf,

    /// Path to the ripple directory (.ripple)
    ripple_dir: PathBuf,
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree to find a `.ripple/` directory,
    /// loads configuration, and loads the catalog it points at.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No ripple repository is found in the directory tree
    /// - Configuration cannot be loaded or is invalid
    /// - The catalog directory or its rules file is missing
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_ripple_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let ripple_dir = root_dir.join(RIPPLE_DIR_NAME);
        let config = RippleConfig::load(&ripple_dir.join(CONFIG_FILE_NAME)).await?;

        let source = JsonlCatalogSource::new(config.catalog_dir(&root_dir));
        let loaded = source.load().await?;
        for warning in &loaded.warnings {
            tracing::warn!(%warning, "Catalog record skipped or flagged");
        }
        tracing::debug!(
            dir = %source.dir().display(),
            rules = loaded.catalog.stats().rules,
            warnings = loaded.warnings.len(),
            "Catalog loaded"
        );

        Ok(Self {
            catalog: loaded.catalog,
            warnings: loaded.warnings,
            config,
            root_dir,
            ripple_dir,
        })
    }

    /// Get the loaded catalog.
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Get the warnings produced while loading the catalog.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Get the repository configuration.
    pub fn config(&self) -> &RippleConfig {
        &self.config
    }

    /// Get the repository root (the directory containing `.ripple/`).
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the path to the ripple directory.
    pub fn ripple_dir(&self) -> &Path {
        &self.ripple_dir
    }

    /// Get the catalog directory.
    pub fn catalog_dir(&self) -> PathBuf {
        self.config.catalog_dir(&self.root_dir)
    }

    /// Build an engine over the loaded catalog.
    ///
    /// `attention_threshold` overrides the configured executive attention
    /// threshold for this engine only.
    pub fn engine(&self, attention_threshold: Option<usize>) -> ImpactEngine<'_> {
        let mut engine_config = self.config.engine_config();
        if let Some(threshold) = attention_threshold {
            engine_config.executive_attention_threshold = threshold;
        }
        ImpactEngine::new(&self.catalog, engine_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::jsonl::{MAPPINGS_FILE_NAME, RULES_FILE_NAME};
    use crate::commands::init;
    use crate::engine::ImpactRequest;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_app_from_initialized_directory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();

        let app = App::from_directory(temp_dir.path()).await.unwrap();

        assert!(app.ripple_dir().ends_with(".ripple"));
        assert_eq!(app.catalog().stats().rules, 0);
        assert!(app.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_app_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();

        let sub_dir = temp_dir.path().join("src").join("lib");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let app = App::from_directory(&sub_dir).await.unwrap();
        assert_eq!(app.root_dir(), temp_dir.path());
    }

    #[tokio::test]
    async fn test_app_from_uninitialized_directory() {
        let temp_dir = TempDir::new().unwrap();

        let err = App::from_directory(temp_dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Not a ripple repository"));
    }

    #[tokio::test]
    async fn test_app_engine_uses_loaded_catalog_and_override() {
        let temp_dir = TempDir::new().unwrap();
        let result = init::init(temp_dir.path()).await.unwrap();
        std::fs::write(
            result.catalog_dir.join(RULES_FILE_NAME),
            r#"{"id":"BR-1","name":"Fee","domain":"PAYMENT","criticality":"LOW"}
"#,
        )
        .unwrap();
        std::fs::write(
            result.catalog_dir.join(MAPPINGS_FILE_NAME),
            r#"{"file_path":"src/fee.rs","rule_id":"BR-1"}
"#,
        )
        .unwrap();

        let app = App::from_directory(temp_dir.path()).await.unwrap();
        let engine = app.engine(Some(0));
        let chain = engine
            .analyze(&ImpactRequest::new(["src/fee.rs"]))
            .chain();

        assert_eq!(engine.config().executive_attention_threshold, 0);
        assert_eq!(chain.direct_impacts.len(), 1);
        assert!(chain.summary.requires_executive_attention);
    }
}
