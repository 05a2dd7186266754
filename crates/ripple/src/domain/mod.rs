//! Domain types for business rule governance.
//!
//! This module contains the catalog records the propagation engine reads:
//! business rules, the dependency edges between them, file mappings,
//! ownership, incident history and the projects an analysis can be scoped
//! to. The output shapes produced by the engine live in [`impact`].

pub mod impact;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use impact::{
    ChainSummary, GraphEdge, GraphNode, GraphSummary, ImpactChain, ImpactGraph, ImpactLevel,
    ImpactedRule, OwnershipInfo, ProjectContext,
};

/// Unique identifier for a business rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl RuleId {
    /// Create a new rule ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RuleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RuleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A documented unit of business logic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRule {
    /// Unique identifier for the rule
    pub id: RuleId,

    /// Human readable rule name
    pub name: String,

    /// Business domain the rule belongs to
    pub domain: Domain,

    /// How much damage a defect in this rule can do
    pub criticality: Criticality,

    /// Longer explanation of the rule
    #[serde(default)]
    pub description: Option<String>,
}

impl BusinessRule {
    /// Validate the rule record.
    ///
    /// Catalog loaders call this before accepting a record.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("Rule id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Rule name cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Unique identifier for a project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Create a new project ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A project an analysis can be scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for the project
    pub id: ProjectId,

    /// Display name
    pub name: String,

    /// Longer explanation of the project
    #[serde(default)]
    pub description: Option<String>,
}

impl Project {
    /// Create a project with no description
    pub fn new(id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Validate the project record
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("Project id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Project name cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Business domain of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Domain {
    /// Payment processing
    Payment,

    /// Invoicing and billing
    Billing,

    /// Order lifecycle
    Order,

    /// User accounts and profiles
    User,

    /// Anything not covered above
    Generic,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payment => write!(f, "PAYMENT"),
            Self::Billing => write!(f, "BILLING"),
            Self::Order => write!(f, "ORDER"),
            Self::User => write!(f, "USER"),
            Self::Generic => write!(f, "GENERIC"),
        }
    }
}

/// Criticality of a business rule.
///
/// Variants are declared in ascending order so the derived `Ord`
/// gives `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criticality {
    /// Cosmetic or easily reversible
    Low,

    /// Noticeable but contained
    Medium,

    /// Customer facing or revenue affecting
    High,

    /// Regulatory, financial or safety critical
    Critical,
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Directed relationship between two rules.
///
/// `source -> target` reads "source feeds target": when the source rule
/// changes, the target rule may be affected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Rule that causes the impact
    pub source_rule_id: RuleId,

    /// Rule that receives the impact
    pub target_rule_id: RuleId,

    /// Nature of the relationship
    pub dependency_type: DependencyType,

    /// Business explanation of the relationship
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DependencyEdge {
    /// Create an edge without a description
    pub fn new(
        source: impl Into<RuleId>,
        target: impl Into<RuleId>,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            source_rule_id: source.into(),
            target_rule_id: target.into(),
            dependency_type,
            description: None,
        }
    }

    /// Whether the edge points back at its own source
    pub fn is_self_loop(&self) -> bool {
        self.source_rule_id == self.target_rule_id
    }
}

/// Type of dependency relationship between rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyType {
    /// Source needs the target to run its logic
    DependsOn,

    /// Source provides data or results to the target
    Feeds,

    /// Source checks the execution of the target
    Validates,

    /// Source consolidates results of the target
    Aggregates,

    /// Source computes its values from the target
    DerivesFrom,
}

impl DependencyType {
    /// Short human label
    pub fn label(self) -> &'static str {
        match self {
            Self::DependsOn => "depends on",
            Self::Feeds => "feeds",
            Self::Validates => "validates",
            Self::Aggregates => "aggregates",
            Self::DerivesFrom => "derives from",
        }
    }

    /// One-sentence explanation of the relationship
    pub fn description(self) -> &'static str {
        match self {
            Self::DependsOn => "This rule needs the other one to work correctly",
            Self::Feeds => "This rule provides data or results to the other one",
            Self::Validates => "This rule checks the execution of the other one",
            Self::Aggregates => "This rule consolidates results of the other one",
            Self::DerivesFrom => "This rule computes its values from the other one",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependsOn => write!(f, "DEPENDS_ON"),
            Self::Feeds => write!(f, "FEEDS"),
            Self::Validates => write!(f, "VALIDATES"),
            Self::Aggregates => write!(f, "AGGREGATES"),
            Self::DerivesFrom => write!(f, "DERIVES_FROM"),
        }
    }
}

/// Team accountable for a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    /// Rule being owned
    pub rule_id: RuleId,

    /// Team name
    pub team_name: String,

    /// Kind of team
    pub team_type: TeamType,

    /// Responsibility level
    pub role: OwnershipRole,

    /// Contact address for the team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,

    /// Whether this team must approve changes to the rule
    #[serde(default)]
    pub approval_required: bool,
}

/// Kind of team that owns a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamType {
    /// Software engineering team
    Engineering,

    /// Business or product team
    Business,

    /// Operations team
    Operations,

    /// Compliance or legal team
    Compliance,
}

impl fmt::Display for TeamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engineering => write!(f, "ENGINEERING"),
            Self::Business => write!(f, "BUSINESS"),
            Self::Operations => write!(f, "OPERATIONS"),
            Self::Compliance => write!(f, "COMPLIANCE"),
        }
    }
}

/// Responsibility level of an owning team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnershipRole {
    /// Accountable owner (at most one per rule)
    PrimaryOwner,

    /// Shares responsibility with the primary owner
    SecondaryOwner,

    /// Steps in when owners are unavailable
    Backup,
}

impl fmt::Display for OwnershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryOwner => write!(f, "PRIMARY_OWNER"),
            Self::SecondaryOwner => write!(f, "SECONDARY_OWNER"),
            Self::Backup => write!(f, "BACKUP"),
        }
    }
}

/// Maps a source file to a rule it implements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRuleMapping {
    /// Repository-relative file path
    pub file_path: String,

    /// Rule implemented by the file
    pub rule_id: RuleId,
}

/// Historical production incident attributed to a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Rule the incident was attributed to
    pub rule_id: RuleId,

    /// Short incident title
    pub title: String,

    /// Incident severity
    pub severity: IncidentSeverity,

    /// When the incident happened
    pub occurred_at: DateTime<Utc>,
}

/// Severity of a production incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentSeverity {
    /// Minor inconvenience
    Low,

    /// Degraded behaviour
    Medium,

    /// Customer facing outage
    High,

    /// Financial or regulatory damage
    Critical,
}

/// Normalize a repository-relative path for comparison.
///
/// Trims whitespace, converts `\` separators to `/` and strips any
/// leading `./` segments, so `.\src\pay.rs` and `src/pay.rs` compare equal.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized
}
