//! JSONL catalog loading.
//!
//! A catalog directory holds one JSONL (JSON Lines) file per record kind:
//!
//! | File | Record |
//! | --- | --- |
//! | `rules.jsonl` | [`BusinessRule`] (required) |
//! | `dependencies.jsonl` | [`DependencyEdge`] |
//! | `mappings.jsonl` | [`FileRuleMapping`] |
//! | `ownerships.jsonl` | [`Ownership`] |
//! | `incidents.jsonl` | [`Incident`] |
//! | `projects.jsonl` | [`Project`] |
//!
//! Loading is resilient: a bad line or a record pointing at an unknown rule
//! is skipped and reported as a [`LoadWarning`], and the rest of the catalog
//! still loads. Only a missing directory or a missing `rules.jsonl` aborts.
//!
//! Dependency cycles are kept. The traversal is cycle safe, and a cycle
//! between business rules is a legitimate thing to record.

use super::in_memory::RuleCatalog;
use super::{CatalogSource, LoadedCatalog};
use crate::domain::{
    BusinessRule, DependencyEdge, FileRuleMapping, Incident, Ownership, OwnershipRole, Project,
    ProjectId, RuleId,
};
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Name of the rules file
pub const RULES_FILE_NAME: &str = "rules.jsonl";

/// Name of the dependency edges file
pub const DEPENDENCIES_FILE_NAME: &str = "dependencies.jsonl";

/// Name of the file mappings file
pub const MAPPINGS_FILE_NAME: &str = "mappings.jsonl";

/// Name of the ownerships file
pub const OWNERSHIPS_FILE_NAME: &str = "ownerships.jsonl";

/// Name of the incidents file
pub const INCIDENTS_FILE_NAME: &str = "incidents.jsonl";

/// Name of the projects file
pub const PROJECTS_FILE_NAME: &str = "projects.jsonl";

/// Every catalog file, in load order
pub const CATALOG_FILE_NAMES: [&str; 6] = [
    RULES_FILE_NAME,
    PROJECTS_FILE_NAME,
    DEPENDENCIES_FILE_NAME,
    MAPPINGS_FILE_NAME,
    OWNERSHIPS_FILE_NAME,
    INCIDENTS_FILE_NAME,
];

/// Warnings that can occur during catalog loading.
///
/// These are non-fatal: the offending line or record is skipped (except for
/// [`LoadWarning::MultiplePrimaryOwners`], which is kept) and loading goes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Malformed JSON line that couldn't be parsed
    ///
    /// **Effect**: Line is skipped entirely.
    MalformedJson {
        /// Catalog file name
        file: &'static str,
        /// 1-based line number
        line_number: usize,
        /// Parser error
        error: String,
    },

    /// Rule record failed validation (blank id or name)
    ///
    /// **Effect**: The rule is not loaded.
    InvalidRule {
        /// 1-based line number in `rules.jsonl`
        line_number: usize,
        /// Validation error
        error: String,
    },

    /// A second rule record reuses an id
    ///
    /// **Effect**: The first record wins; the later one is skipped.
    DuplicateRule {
        /// The repeated id
        rule_id: RuleId,
        /// 1-based line number of the skipped record
        line_number: usize,
    },

    /// Project record failed validation (blank id or name)
    ///
    /// **Effect**: The project is not loaded.
    InvalidProject {
        /// 1-based line number in `projects.jsonl`
        line_number: usize,
        /// Validation error
        error: String,
    },

    /// A second project record reuses an id
    ///
    /// **Effect**: The first record wins; the later one is skipped.
    DuplicateProject {
        /// The repeated id
        project_id: ProjectId,
        /// 1-based line number of the skipped record
        line_number: usize,
    },

    /// A record references a rule that is not in the catalog
    ///
    /// **Effect**: The record is skipped.
    OrphanedReference {
        /// Catalog file name
        file: &'static str,
        /// 1-based line number
        line_number: usize,
        /// The unknown rule id
        rule_id: RuleId,
    },

    /// A dependency edge points from a rule to itself
    ///
    /// **Effect**: The edge is skipped; it carries no impact information.
    SelfLoop {
        /// The rule on both ends
        rule_id: RuleId,
        /// 1-based line number in `dependencies.jsonl`
        line_number: usize,
    },

    /// A rule has more than one `PRIMARY_OWNER`
    ///
    /// **Effect**: All records are kept; the ownership service should fix this.
    MultiplePrimaryOwners {
        /// The rule with competing owners
        rule_id: RuleId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson {
                file,
                line_number,
                error,
            } => write!(f, "{file}:{line_number}: malformed JSON: {error}"),
            Self::InvalidRule { line_number, error } => {
                write!(f, "{RULES_FILE_NAME}:{line_number}: invalid rule: {error}")
            }
            Self::DuplicateRule {
                rule_id,
                line_number,
            } => write!(
                f,
                "{RULES_FILE_NAME}:{line_number}: duplicate rule id '{rule_id}' skipped"
            ),
            Self::InvalidProject { line_number, error } => {
                write!(f, "{PROJECTS_FILE_NAME}:{line_number}: invalid project: {error}")
            }
            Self::DuplicateProject {
                project_id,
                line_number,
            } => write!(
                f,
                "{PROJECTS_FILE_NAME}:{line_number}: duplicate project id '{project_id}' skipped"
            ),
            Self::OrphanedReference {
                file,
                line_number,
                rule_id,
            } => write!(
                f,
                "{file}:{line_number}: unknown rule '{rule_id}', record skipped"
            ),
            Self::SelfLoop {
                rule_id,
                line_number,
            } => write!(
                f,
                "{DEPENDENCIES_FILE_NAME}:{line_number}: rule '{rule_id}' depends on itself, edge skipped"
            ),
            Self::MultiplePrimaryOwners { rule_id } => {
                write!(f, "rule '{rule_id}' has more than one PRIMARY_OWNER")
            }
        }
    }
}

/// Catalog source backed by a directory of JSONL files.
#[derive(Debug, Clone)]
pub struct JsonlCatalogSource {
    dir: PathBuf,
}

impl JsonlCatalogSource {
    /// Create a source reading from `dir`
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory the catalog is read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl CatalogSource for JsonlCatalogSource {
    async fn load(&self) -> Result<LoadedCatalog> {
        load_catalog_dir(&self.dir).await
    }
}

/// Load a catalog from a directory of JSONL files.
///
/// # Algorithm
///
/// 1. Parse rules and projects, skipping malformed, invalid and duplicate
///    records
/// 2. Parse edges, mappings, ownerships and incidents, skipping any record
///    whose rule ids are not among the loaded rules
/// 3. Flag rules with competing primary owners
///
/// # Errors
///
/// - `CatalogError::MissingDirectory` if `dir` does not exist
/// - `CatalogError::MissingFile` if `rules.jsonl` does not exist
/// - `Error::Io` if a file cannot be read
pub async fn load_catalog_dir(dir: &Path) -> Result<LoadedCatalog> {
    if !tokio::fs::try_exists(dir).await? {
        return Err(CatalogError::MissingDirectory(dir.to_path_buf()).into());
    }

    let rules_path = dir.join(RULES_FILE_NAME);
    if !tokio::fs::try_exists(&rules_path).await? {
        return Err(CatalogError::MissingFile(rules_path).into());
    }

    let mut warnings = Vec::new();
    let mut catalog = RuleCatalog::new();

    // First pass: rules and projects
    let rules: Vec<(usize, BusinessRule)> =
        read_records(&rules_path, RULES_FILE_NAME, &mut warnings).await?;
    for (line_number, rule) in rules {
        if let Err(error) = rule.validate() {
            warnings.push(LoadWarning::InvalidRule { line_number, error });
            continue;
        }
        if catalog.contains_rule(&rule.id) {
            warnings.push(LoadWarning::DuplicateRule {
                rule_id: rule.id,
                line_number,
            });
            continue;
        }
        catalog.insert_rule(rule);
    }

    let projects: Vec<(usize, Project)> = read_optional_records(
        &dir.join(PROJECTS_FILE_NAME),
        PROJECTS_FILE_NAME,
        &mut warnings,
    )
    .await?;
    for (line_number, project) in projects {
        if let Err(error) = project.validate() {
            warnings.push(LoadWarning::InvalidProject { line_number, error });
            continue;
        }
        if catalog.contains_project(&project.id) {
            warnings.push(LoadWarning::DuplicateProject {
                project_id: project.id,
                line_number,
            });
            continue;
        }
        catalog.insert_project(project);
    }

    // Second pass: records that reference rules
    let edges: Vec<(usize, DependencyEdge)> = read_optional_records(
        &dir.join(DEPENDENCIES_FILE_NAME),
        DEPENDENCIES_FILE_NAME,
        &mut warnings,
    )
    .await?;
    for (line_number, edge) in edges {
        if edge.is_self_loop() {
            warnings.push(LoadWarning::SelfLoop {
                rule_id: edge.source_rule_id,
                line_number,
            });
            continue;
        }
        let orphan = [&edge.source_rule_id, &edge.target_rule_id]
            .into_iter()
            .find(|id| !catalog.contains_rule(id))
            .cloned();
        if let Some(rule_id) = orphan {
            warnings.push(LoadWarning::OrphanedReference {
                file: DEPENDENCIES_FILE_NAME,
                line_number,
                rule_id,
            });
            continue;
        }
        catalog.add_edge(edge);
    }

    let mappings: Vec<(usize, FileRuleMapping)> = read_optional_records(
        &dir.join(MAPPINGS_FILE_NAME),
        MAPPINGS_FILE_NAME,
        &mut warnings,
    )
    .await?;
    for (line_number, mapping) in mappings {
        if !catalog.contains_rule(&mapping.rule_id) {
            warnings.push(LoadWarning::OrphanedReference {
                file: MAPPINGS_FILE_NAME,
                line_number,
                rule_id: mapping.rule_id,
            });
            continue;
        }
        catalog.add_mapping(mapping);
    }

    let ownerships: Vec<(usize, Ownership)> = read_optional_records(
        &dir.join(OWNERSHIPS_FILE_NAME),
        OWNERSHIPS_FILE_NAME,
        &mut warnings,
    )
    .await?;
    let mut primary_owned = HashSet::new();
    let mut contested = Vec::new();
    for (line_number, ownership) in ownerships {
        if !catalog.contains_rule(&ownership.rule_id) {
            warnings.push(LoadWarning::OrphanedReference {
                file: OWNERSHIPS_FILE_NAME,
                line_number,
                rule_id: ownership.rule_id,
            });
            continue;
        }
        if ownership.role == OwnershipRole::PrimaryOwner
            && !primary_owned.insert(ownership.rule_id.clone())
            && !contested.contains(&ownership.rule_id)
        {
            contested.push(ownership.rule_id.clone());
        }
        catalog.add_ownership(ownership);
    }
    warnings.extend(
        contested
            .into_iter()
            .map(|rule_id| LoadWarning::MultiplePrimaryOwners { rule_id }),
    );

    let incidents: Vec<(usize, Incident)> = read_optional_records(
        &dir.join(INCIDENTS_FILE_NAME),
        INCIDENTS_FILE_NAME,
        &mut warnings,
    )
    .await?;
    for (line_number, incident) in incidents {
        if !catalog.contains_rule(&incident.rule_id) {
            warnings.push(LoadWarning::OrphanedReference {
                file: INCIDENTS_FILE_NAME,
                line_number,
                rule_id: incident.rule_id,
            });
            continue;
        }
        catalog.add_incident(incident);
    }

    let stats = catalog.stats();
    tracing::debug!(
        dir = %dir.display(),
        rules = stats.rules,
        edges = stats.edges,
        mappings = stats.mappings,
        projects = stats.projects,
        warnings = warnings.len(),
        "Catalog loaded"
    );

    Ok(LoadedCatalog { catalog, warnings })
}

/// Read a file that may legitimately be absent; absence means no records.
async fn read_optional_records<T: DeserializeOwned>(
    path: &Path,
    file: &'static str,
    warnings: &mut Vec<LoadWarning>,
) -> Result<Vec<(usize, T)>> {
    if !tokio::fs::try_exists(path).await? {
        tracing::debug!(path = %path.display(), "Optional catalog file missing, treating as empty");
        return Ok(Vec::new());
    }
    read_records(path, file, warnings).await
}

/// Parse every non-blank line of a JSONL file.
///
/// Returns the parsed records paired with their 1-based line numbers.
async fn read_records<T: DeserializeOwned>(
    path: &Path,
    file: &'static str,
    warnings: &mut Vec<LoadWarning>,
) -> Result<Vec<(usize, T)>> {
    let handle = File::open(path).await?;
    let mut lines = BufReader::new(handle).lines();
    let mut records = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => records.push((line_number, record)),
            Err(e) => warnings.push(LoadWarning::MalformedJson {
                file,
                line_number,
                error: e.to_string(),
            }),
        }
    }

    Ok(records)
}
