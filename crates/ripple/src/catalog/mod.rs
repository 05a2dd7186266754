//! Read-only access to the business rule catalog.
//!
//! The propagation engine never talks to a store directly. It reads through
//! the small accessor traits defined here, so the same engine runs against
//! the in-memory [`RuleCatalog`] snapshot, a database-backed implementation,
//! or a hand-built fake in tests.
//!
//! # Ports
//!
//! | Trait | Operations |
//! | --- | --- |
//! | [`RuleRepository`] | `get_rule`, `get_ownerships` |
//! | [`FileMappingRepository`] | `lookup_direct_rules` |
//! | [`DependencyRepository`] | `outgoing_edges` |
//! | [`IncidentRepository`] | `has_incidents` |
//! | [`ProjectRepository`] | `get_project` |
//!
//! [`Catalog`] bundles the first four, which is everything a traversal needs.
//! Projects are resolved by the caller before an analysis starts.
//!
//! # Loading
//!
//! Accessors are synchronous: all data is expected to be in memory before a
//! traversal starts. Fetching that data is the job of a [`CatalogSource`],
//! which is async so implementations can hit a filesystem or a database.
//!
//! # Example
//!
//! ```no_run
//! use ripple::catalog::{CatalogSource, jsonl::JsonlCatalogSource};
//! use std::path::PathBuf;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let source = JsonlCatalogSource::new(PathBuf::from(".ripple/catalog"));
//!     let loaded = source.load().await?;
//!     for warning in &loaded.warnings {
//!         eprintln!("{warning}");
//!     }
//!     println!("{} rules loaded", loaded.catalog.stats().rules);
//!     Ok(())
//! }
//! ```

pub mod in_memory;
pub mod jsonl;

use crate::domain::{BusinessRule, DependencyEdge, Ownership, Project, ProjectId, RuleId};
use crate::error::Result;
use async_trait::async_trait;

pub use in_memory::{CatalogStats, RuleCatalog};
pub use jsonl::LoadWarning;

/// Lookup of rule records and their ownership.
pub trait RuleRepository: Send + Sync {
    /// Get a rule by ID.
    ///
    /// Returns `None` if the rule doesn't exist (deleted or never created).
    fn get_rule(&self, id: &RuleId) -> Option<BusinessRule>;

    /// Get all ownership records for a rule.
    ///
    /// Unknown rules have no owners.
    fn get_ownerships(&self, id: &RuleId) -> Vec<Ownership>;
}

/// Lookup of the rules each file directly implements.
pub trait FileMappingRepository: Send + Sync {
    /// Map changed files to the rules they implement.
    ///
    /// Returns `(file_path, rule_id)` pairs in the order of `file_paths`.
    /// Files without mappings contribute nothing.
    fn lookup_direct_rules(&self, file_paths: &[String]) -> Vec<(String, RuleId)>;
}

/// Lookup of dependency edges between rules.
pub trait DependencyRepository: Send + Sync {
    /// Get every edge whose source is `id`.
    ///
    /// Edges may point at rules that no longer exist; callers skip those.
    fn outgoing_edges(&self, id: &RuleId) -> Vec<DependencyEdge>;
}

/// Lookup of production incident history.
pub trait IncidentRepository: Send + Sync {
    /// Whether any incident has been attributed to the rule.
    fn has_incidents(&self, id: &RuleId) -> bool;
}

/// Lookup of the projects an analysis can be scoped to.
pub trait ProjectRepository: Send + Sync {
    /// Get a project by ID.
    fn get_project(&self, id: &ProjectId) -> Option<Project>;
}

/// A catalog that provides every accessor.
pub trait Catalog:
    RuleRepository + FileMappingRepository + DependencyRepository + IncidentRepository
{
}

impl<T> Catalog for T where
    T: RuleRepository + FileMappingRepository + DependencyRepository + IncidentRepository
{
}

/// A catalog snapshot together with the problems found while loading it.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    /// The loaded snapshot
    pub catalog: RuleCatalog,

    /// Non-fatal data problems encountered during loading
    pub warnings: Vec<LoadWarning>,
}

/// Source that fetches a complete catalog snapshot.
///
/// Implementations must be `Send + Sync` so a loaded snapshot can be
/// shared by concurrent analyses.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store is unreachable or a required
    /// part of the catalog is missing. Individual bad records are reported
    /// through [`LoadedCatalog::warnings`] instead.
    async fn load(&self) -> Result<LoadedCatalog>;
}
