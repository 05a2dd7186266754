//! Repository configuration.
//!
//! Stored as YAML in `.ripple/config.yaml`:
//!
//! ```yaml
//! catalog:
//!   data-dir: .ripple/catalog
//! analysis:
//!   executive-attention-threshold: 10
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use crate::engine::{EngineConfig, DEFAULT_EXECUTIVE_ATTENTION_THRESHOLD};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default catalog directory, relative to the repository root
pub const DEFAULT_CATALOG_DIR: &str = ".ripple/catalog";

/// Configuration file structure for ripple
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct RippleConfig {
    /// Catalog location
    pub catalog: CatalogConfig,

    /// Analysis tunables
    pub analysis: AnalysisConfig,
}

/// Catalog configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CatalogConfig {
    /// Directory holding the JSONL catalog files, relative to the repository root
    pub data_dir: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_CATALOG_DIR.to_string(),
        }
    }
}

/// Analysis configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalysisConfig {
    /// Escalate when more than this many rules are impacted
    pub executive_attention_threshold: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            executive_attention_threshold: DEFAULT_EXECUTIVE_ATTENTION_THRESHOLD,
        }
    }
}

impl RippleConfig {
    /// Load and validate configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content).map_err(ConfigError::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::Yaml)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the catalog directory is empty or
    /// the attention threshold is zero.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.catalog.data_dir.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "catalog.data-dir cannot be empty".to_string(),
            ));
        }
        validate_threshold(self.analysis.executive_attention_threshold)
    }

    /// Absolute catalog directory for a repository rooted at `root_dir`
    pub fn catalog_dir(&self, root_dir: &Path) -> PathBuf {
        root_dir.join(&self.catalog.data_dir)
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            executive_attention_threshold: self.analysis.executive_attention_threshold,
        }
    }
}

/// Validate an executive attention threshold.
///
/// A threshold of zero would escalate every non-empty analysis.
pub fn validate_threshold(threshold: usize) -> std::result::Result<(), ConfigError> {
    if threshold == 0 {
        return Err(ConfigError::Invalid(
            "analysis.executive-attention-threshold must be at least 1".to_string(),
        ));
    }
    Ok(())
}
