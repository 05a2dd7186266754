//! Business rule impact propagation.
//!
//! Given the files changed in a pull request, the engine finds the rules
//! those files implement and walks the dependency graph outward to find
//! every rule the change may ripple into, up to three hops away.
//!
//! # Pipeline
//!
//! 1. **Seed**: map changed files to rules through the
//!    [`FileMappingRepository`]. Files without mappings contribute nothing.
//! 2. **Traverse**: breadth-first walk of outgoing edges, see
//!    [`traversal`] for the classification rules.
//! 3. **Enrich**: attach rule details, ownership and incident flags.
//! 4. **Project**: shape the result as a chain report or a graph report,
//!    see [`projection`].
//!
//! An analysis never fails. Unknown files, dangling edges and cycles all
//! produce a smaller (possibly empty) result instead of an error.
//!
//! A request may carry a [`Project`] the caller has already looked up. It is
//! echoed into both reports as a [`ProjectContext`] and does not narrow the
//! traversal.
//!
//! # Example
//!
//! ```
//! use ripple::catalog::RuleCatalog;
//! use ripple::domain::{BusinessRule, Criticality, DependencyEdge, DependencyType, Domain, RuleId};
//! use ripple::engine::{EngineConfig, ImpactEngine};
//!
//! let rule = |id: &str| BusinessRule {
//!     id: RuleId::from(id),
//!     name: id.to_string(),
//!     domain: Domain::Payment,
//!     criticality: Criticality::Low,
//!     description: None,
//! };
//! let catalog = RuleCatalog::new()
//!     .with_rule(rule("BR-1"))
//!     .with_rule(rule("BR-2"))
//!     .with_edge(DependencyEdge::new("BR-1", "BR-2", DependencyType::Feeds))
//!     .with_mapping("src/payment/fees.rs", "BR-1");
//!
//! let engine = ImpactEngine::new(&catalog, EngineConfig::default());
//! let chain = engine.compute_impact_chain(&["src/payment/fees.rs".to_string()]);
//!
//! assert_eq!(chain.direct_impacts.len(), 1);
//! assert_eq!(chain.indirect_impacts[0].rule_id.as_str(), "BR-2");
//! ```

pub mod graph;
pub mod projection;
pub mod traversal;

use crate::catalog::{
    Catalog, DependencyRepository, FileMappingRepository, IncidentRepository, RuleRepository,
};
use crate::domain::{ImpactChain, ImpactGraph, Project, ProjectContext, ProjectId, RuleId};
use chrono::Utc;
use std::collections::{HashMap, HashSet};

pub use graph::RuleGraph;
pub use projection::{highest_criticality, requires_executive_attention, ImpactAnalysis};
pub use traversal::{traverse, Traversal, TraversalEntry};

/// Default number of impacted rules above which an analysis is escalated
pub const DEFAULT_EXECUTIVE_ATTENTION_THRESHOLD: usize = 10;

/// Tunables for an [`ImpactEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Escalate when more than this many rules are impacted
    pub executive_attention_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executive_attention_threshold: DEFAULT_EXECUTIVE_ATTENTION_THRESHOLD,
        }
    }
}

/// Input to an analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactRequest {
    /// Paths of the files changed by the pull request
    pub changed_files: Vec<String>,

    /// Identifier of the pull request, echoed into the reports
    pub pull_request_id: Option<String>,

    /// Project the analysis is scoped to, `None` for a global analysis
    pub project: Option<Project>,
}

impl ImpactRequest {
    /// Create a request for a set of changed files
    pub fn new<I, S>(changed_files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            changed_files: changed_files.into_iter().map(Into::into).collect(),
            pull_request_id: None,
            project: None,
        }
    }

    /// Attach a pull request id
    #[must_use]
    pub fn with_pull_request(mut self, id: impl Into<String>) -> Self {
        self.pull_request_id = Some(id.into());
        self
    }

    /// Scope the analysis to a project
    #[must_use]
    pub fn with_project(mut self, project: Project) -> Self {
        self.project = Some(project);
        self
    }

    /// The context echoed into the reports
    pub fn project_context(&self) -> ProjectContext {
        self.project
            .as_ref()
            .map_or_else(ProjectContext::global, ProjectContext::scoped)
    }
}

/// Impact propagation engine over a read-only catalog.
///
/// The engine holds only borrowed accessors and never mutates them, so any
/// number of analyses can run against the same catalog concurrently.
pub struct ImpactEngine<'a> {
    rules: &'a dyn RuleRepository,
    mappings: &'a dyn FileMappingRepository,
    dependencies: &'a dyn DependencyRepository,
    incidents: &'a dyn IncidentRepository,
    config: EngineConfig,
}

impl std::fmt::Debug for ImpactEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> ImpactEngine<'a> {
    /// Create an engine over a catalog that provides every accessor
    pub fn new<C: Catalog>(catalog: &'a C, config: EngineConfig) -> Self {
        Self {
            rules: catalog,
            mappings: catalog,
            dependencies: catalog,
            incidents: catalog,
            config,
        }
    }

    /// Create an engine from individually supplied accessors
    pub fn from_parts(
        rules: &'a dyn RuleRepository,
        mappings: &'a dyn FileMappingRepository,
        dependencies: &'a dyn DependencyRepository,
        incidents: &'a dyn IncidentRepository,
        config: EngineConfig,
    ) -> Self {
        Self {
            rules,
            mappings,
            dependencies,
            incidents,
            config,
        }
    }

    /// The engine's configuration
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Run one traversal and enrich the result.
    ///
    /// Both report shapes can be projected from the returned analysis
    /// without walking the graph again.
    pub fn analyze(&self, request: &ImpactRequest) -> ImpactAnalysis {
        let matches = self.mappings.lookup_direct_rules(&request.changed_files);

        let mut seed_ids = Vec::new();
        let mut seen_seeds = HashSet::new();
        let mut matched_files: HashMap<RuleId, Vec<String>> = HashMap::new();
        for (file, rule_id) in matches {
            let files = matched_files.entry(rule_id.clone()).or_default();
            if !files.contains(&file) {
                files.push(file);
            }
            if seen_seeds.insert(rule_id.clone()) {
                seed_ids.push(rule_id);
            }
        }

        let mut graph = RuleGraph::new(self.rules, self.dependencies);
        let seeds = graph.seed(seed_ids);
        let traversal = traverse(&seeds, |id| graph.neighbors(id));

        let reached = traversal.rule_ids();
        let edges = graph.edges_among(&reached);

        let mut rules = HashMap::with_capacity(reached.len());
        let mut ownerships = HashMap::with_capacity(reached.len());
        let mut incidents = HashSet::new();
        for id in &reached {
            if let Some(rule) = graph.resolve(id) {
                rules.insert(id.clone(), rule.clone());
            }
            let owners = self.rules.get_ownerships(id);
            if !owners.is_empty() {
                ownerships.insert(id.clone(), owners);
            }
            if self.incidents.has_incidents(id) {
                incidents.insert(id.clone());
            }
        }
        matched_files.retain(|id, _| traversal.contains(id));

        let project_context = request.project_context();

        tracing::info!(
            project = project_context.project_id.as_ref().map_or("global", ProjectId::as_str),
            changed_files = request.changed_files.len(),
            seeds = seeds.len(),
            impacted = traversal.len(),
            edges = edges.len(),
            graph_nodes = graph.node_count(),
            graph_edges = graph.edge_count(),
            "Impact analysis complete"
        );

        ImpactAnalysis {
            pull_request_id: request.pull_request_id.clone(),
            project_context,
            analyzed_at: Utc::now(),
            traversal,
            rules,
            ownerships,
            incidents,
            matched_files,
            edges,
            attention_threshold: self.config.executive_attention_threshold,
        }
    }

    /// Compute the chain report for a set of changed files
    pub fn compute_impact_chain(&self, changed_files: &[String]) -> ImpactChain {
        self.analyze(&ImpactRequest::new(changed_files.iter().cloned()))
            .chain()
    }

    /// Compute the graph report for a set of changed files
    pub fn compute_impact_graph(&self, changed_files: &[String]) -> ImpactGraph {
        self.analyze(&ImpactRequest::new(changed_files.iter().cloned()))
            .graph()
    }
}
