//! Output shapes of an impact analysis.
//!
//! Both report types are derived from a single traversal: the chain report
//! groups impacted rules by level, the graph report lays the same rules out
//! as nodes and edges for rendering.

use super::{
    Criticality, DependencyType, Domain, Ownership, OwnershipRole, Project, ProjectId, RuleId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deepest hop count that is still reported.
///
/// Rules further than this from every seed are not considered actionable.
pub const MAX_IMPACT_DEPTH: usize = 3;

/// How a rule was reached from the changed files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactLevel {
    /// Implemented by a changed file
    Direct,

    /// One dependency hop downstream of a direct impact
    Indirect,

    /// Two to three hops downstream of a direct impact
    Cascade,
}

impl ImpactLevel {
    /// Map a BFS depth to an impact level.
    ///
    /// Returns `None` for depths beyond [`MAX_IMPACT_DEPTH`].
    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            0 => Some(Self::Direct),
            1 => Some(Self::Indirect),
            d if d <= MAX_IMPACT_DEPTH => Some(Self::Cascade),
            _ => None,
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "DIRECT"),
            Self::Indirect => write!(f, "INDIRECT"),
            Self::Cascade => write!(f, "CASCADE"),
        }
    }
}

/// A business rule reached by the propagation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactedRule {
    /// Rule identifier
    pub rule_id: RuleId,

    /// Rule name
    pub rule_name: String,

    /// Rule domain
    pub domain: Domain,

    /// Rule criticality
    pub criticality: Criticality,

    /// Level assigned by the traversal
    pub impact_level: ImpactLevel,

    /// Rule ids from a seed to this rule, both inclusive
    pub dependency_path: Vec<RuleId>,

    /// Teams accountable for the rule
    pub ownerships: Vec<Ownership>,

    /// Changed files implementing the rule (direct impacts only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_files: Vec<String>,
}

impl ImpactedRule {
    /// Number of hops from the seed that discovered this rule
    pub fn depth(&self) -> usize {
        self.dependency_path.len().saturating_sub(1)
    }

    /// Rule this one was discovered from, if any
    pub fn parent(&self) -> Option<&RuleId> {
        let len = self.dependency_path.len();
        if len < 2 {
            return None;
        }
        self.dependency_path.get(len - 2)
    }

    /// Team holding the primary ownership role, if any
    pub fn primary_owner(&self) -> Option<&Ownership> {
        self.ownerships
            .iter()
            .find(|o| o.role == OwnershipRole::PrimaryOwner)
    }
}

/// Executive summary of a chain report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSummary {
    /// Number of distinct rules in the report
    pub total_rules_affected: usize,

    /// Highest criticality among reported rules (absent when nothing is impacted)
    pub highest_criticality: Option<Criticality>,

    /// Whether the change warrants senior review
    pub requires_executive_attention: bool,
}

/// Which project an analysis was scoped to.
///
/// The default value is the global context, used when no project was named.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Whether the analysis named a project
    pub scoped: bool,

    /// Project id when scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,

    /// Project display name when scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl ProjectContext {
    /// Context for an analysis across every project
    pub fn global() -> Self {
        Self::default()
    }

    /// Context for an analysis scoped to `project`
    pub fn scoped(project: &Project) -> Self {
        Self {
            scoped: true,
            project_id: Some(project.id.clone()),
            project_name: Some(project.name.clone()),
        }
    }
}

/// Impacted rules grouped by level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactChain {
    /// Pull request the analysis was run for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_id: Option<String>,

    /// Project the analysis was scoped to
    #[serde(default)]
    pub project_context: ProjectContext,

    /// Rules implemented by the changed files
    pub direct_impacts: Vec<ImpactedRule>,

    /// Rules one hop downstream
    pub indirect_impacts: Vec<ImpactedRule>,

    /// Rules two or three hops downstream
    pub cascade_impacts: Vec<ImpactedRule>,

    /// Executive summary
    pub summary: ChainSummary,

    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
}

impl ImpactChain {
    /// Iterate over every impacted rule, direct first
    pub fn all_impacts(&self) -> impl Iterator<Item = &ImpactedRule> {
        self.direct_impacts
            .iter()
            .chain(self.indirect_impacts.iter())
            .chain(self.cascade_impacts.iter())
    }

    /// Whether no rule was impacted at all
    pub fn is_empty(&self) -> bool {
        self.direct_impacts.is_empty()
            && self.indirect_impacts.is_empty()
            && self.cascade_impacts.is_empty()
    }
}

/// Condensed ownership shown on graph nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipInfo {
    /// Team name
    pub team_name: String,

    /// Responsibility level
    pub role: OwnershipRole,
}

impl From<&Ownership> for OwnershipInfo {
    fn from(ownership: &Ownership) -> Self {
        Self {
            team_name: ownership.team_name.clone(),
            role: ownership.role,
        }
    }
}

/// A rule rendered as a graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Rule identifier
    pub rule_id: RuleId,

    /// Rule name
    pub rule_name: String,

    /// Rule domain
    pub domain: Domain,

    /// Rule criticality
    pub criticality: Criticality,

    /// Level assigned by the traversal
    pub impact_level: ImpactLevel,

    /// Owning teams
    pub ownerships: Vec<OwnershipInfo>,

    /// Whether the rule has production incidents on record
    pub has_incidents: bool,
}

/// A dependency between two rendered nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Rule that causes the impact
    pub source_rule_id: RuleId,

    /// Rule that receives the impact
    pub target_rule_id: RuleId,

    /// Nature of the relationship
    pub dependency_type: DependencyType,
}

/// Executive summary of a graph report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Number of nodes
    pub total_rules: usize,

    /// Nodes at the direct level
    pub direct: usize,

    /// Nodes at the indirect level
    pub indirect: usize,

    /// Nodes at the cascade level
    pub cascade: usize,

    /// Nodes whose criticality is `CRITICAL`
    pub critical_rules: usize,

    /// Highest criticality among nodes (absent when the graph is empty)
    pub highest_criticality: Option<Criticality>,

    /// Whether the change warrants senior review
    pub requires_executive_attention: bool,
}

/// Impacted rules laid out for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactGraph {
    /// Pull request the analysis was run for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_id: Option<String>,

    /// Project the analysis was scoped to
    #[serde(default)]
    pub project_context: ProjectContext,

    /// One node per impacted rule
    pub nodes: Vec<GraphNode>,

    /// Dependencies whose endpoints are both nodes
    pub edges: Vec<GraphEdge>,

    /// Executive summary
    pub summary: GraphSummary,

    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
}

impl ImpactGraph {
    /// Find a node by rule id
    pub fn node(&self, rule_id: &RuleId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.rule_id == rule_id)
    }
}
