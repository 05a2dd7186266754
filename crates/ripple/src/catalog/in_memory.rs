//! In-memory catalog snapshot.
//!
//! `RuleCatalog` indexes every record by rule id (and mappings by normalized
//! file path) for O(1) lookups. It is immutable once handed to the engine, so
//! one snapshot can serve any number of concurrent analyses.
//!
//! The insert methods do not check referential integrity. A mapping, edge or
//! ownership may name a rule that is absent from the catalog; the engine
//! treats those as stale references and skips them.

use super::{
    DependencyRepository, FileMappingRepository, IncidentRepository, ProjectRepository,
    RuleRepository,
};
use crate::domain::{
    normalize_path, BusinessRule, DependencyEdge, FileRuleMapping, Incident, Ownership, Project,
    ProjectId, RuleId,
};
use serde::Serialize;
use std::collections::HashMap;

/// Record counts of a catalog snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// Number of rules
    pub rules: usize,
    /// Number of dependency edges
    pub edges: usize,
    /// Number of file mappings
    pub mappings: usize,
    /// Number of ownership records
    pub ownerships: usize,
    /// Number of incidents
    pub incidents: usize,
    /// Number of projects
    pub projects: usize,
}

/// Indexed, read-only business rule catalog.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    /// Rules indexed by ID
    rules: HashMap<RuleId, BusinessRule>,

    /// Outgoing edges per source rule, in insertion order
    edges: HashMap<RuleId, Vec<DependencyEdge>>,

    /// Rules per normalized file path, in insertion order
    mappings: HashMap<String, Vec<RuleId>>,

    /// Ownership records per rule
    ownerships: HashMap<RuleId, Vec<Ownership>>,

    /// Incidents per rule
    incidents: HashMap<RuleId, Vec<Incident>>,

    /// Projects indexed by ID
    projects: HashMap<ProjectId, Project>,
}

impl RuleCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a rule.
    ///
    /// Returns the previous record with the same id, if any.
    pub fn insert_rule(&mut self, rule: BusinessRule) -> Option<BusinessRule> {
        self.rules.insert(rule.id.clone(), rule)
    }

    /// Add a dependency edge.
    ///
    /// Parallel edges between the same pair are kept when their types differ;
    /// an exact duplicate is ignored.
    pub fn add_edge(&mut self, edge: DependencyEdge) {
        let outgoing = self.edges.entry(edge.source_rule_id.clone()).or_default();
        let duplicate = outgoing.iter().any(|e| {
            e.target_rule_id == edge.target_rule_id && e.dependency_type == edge.dependency_type
        });
        if !duplicate {
            outgoing.push(edge);
        }
    }

    /// Map a file to a rule it implements
    pub fn add_mapping(&mut self, mapping: FileRuleMapping) {
        let rules = self
            .mappings
            .entry(normalize_path(&mapping.file_path))
            .or_default();
        if !rules.contains(&mapping.rule_id) {
            rules.push(mapping.rule_id);
        }
    }

    /// Add an ownership record
    pub fn add_ownership(&mut self, ownership: Ownership) {
        self.ownerships
            .entry(ownership.rule_id.clone())
            .or_default()
            .push(ownership);
    }

    /// Add an incident record
    pub fn add_incident(&mut self, incident: Incident) {
        self.incidents
            .entry(incident.rule_id.clone())
            .or_default()
            .push(incident);
    }

    /// Insert or replace a project.
    ///
    /// Returns the previous record with the same id, if any.
    pub fn insert_project(&mut self, project: Project) -> Option<Project> {
        self.projects.insert(project.id.clone(), project)
    }

    /// Builder-style [`insert_rule`](Self::insert_rule)
    #[must_use]
    pub fn with_rule(mut self, rule: BusinessRule) -> Self {
        self.insert_rule(rule);
        self
    }

    /// Builder-style [`add_edge`](Self::add_edge)
    #[must_use]
    pub fn with_edge(mut self, edge: DependencyEdge) -> Self {
        self.add_edge(edge);
        self
    }

    /// Builder-style [`add_mapping`](Self::add_mapping)
    #[must_use]
    pub fn with_mapping(mut self, file_path: impl Into<String>, rule_id: impl Into<RuleId>) -> Self {
        self.add_mapping(FileRuleMapping {
            file_path: file_path.into(),
            rule_id: rule_id.into(),
        });
        self
    }

    /// Builder-style [`add_ownership`](Self::add_ownership)
    #[must_use]
    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.add_ownership(ownership);
        self
    }

    /// Builder-style [`add_incident`](Self::add_incident)
    #[must_use]
    pub fn with_incident(mut self, incident: Incident) -> Self {
        self.add_incident(incident);
        self
    }

    /// Builder-style [`insert_project`](Self::insert_project)
    #[must_use]
    pub fn with_project(mut self, project: Project) -> Self {
        self.insert_project(project);
        self
    }

    /// Whether a project with this id exists
    pub fn contains_project(&self, id: &ProjectId) -> bool {
        self.projects.contains_key(id)
    }

    /// Whether a rule with this id exists
    pub fn contains_rule(&self, id: &RuleId) -> bool {
        self.rules.contains_key(id)
    }

    /// Record counts
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            rules: self.rules.len(),
            edges: self.edges.values().map(Vec::len).sum(),
            mappings: self.mappings.values().map(Vec::len).sum(),
            ownerships: self.ownerships.values().map(Vec::len).sum(),
            incidents: self.incidents.values().map(Vec::len).sum(),
            projects: self.projects.len(),
        }
    }
}

impl RuleRepository for RuleCatalog {
    fn get_rule(&self, id: &RuleId) -> Option<BusinessRule> {
        self.rules.get(id).cloned()
    }

    fn get_ownerships(&self, id: &RuleId) -> Vec<Ownership> {
        self.ownerships.get(id).cloned().unwrap_or_default()
    }
}

impl FileMappingRepository for RuleCatalog {
    fn lookup_direct_rules(&self, file_paths: &[String]) -> Vec<(String, RuleId)> {
        let mut matches = Vec::new();
        for path in file_paths {
            let normalized = normalize_path(path);
            if let Some(rule_ids) = self.mappings.get(&normalized) {
                for rule_id in rule_ids {
                    matches.push((normalized.clone(), rule_id.clone()));
                }
            }
        }
        matches
    }
}

impl DependencyRepository for RuleCatalog {
    fn outgoing_edges(&self, id: &RuleId) -> Vec<DependencyEdge> {
        self.edges.get(id).cloned().unwrap_or_default()
    }
}

impl IncidentRepository for RuleCatalog {
    fn has_incidents(&self, id: &RuleId) -> bool {
        self.incidents.get(id).is_some_and(|v| !v.is_empty())
    }
}

impl ProjectRepository for RuleCatalog {
    fn get_project(&self, id: &ProjectId) -> Option<Project> {
        self.projects.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Criticality, DependencyType, Domain, IncidentSeverity};
    use chrono::{TimeZone, Utc};

    fn rule(id: &str) -> BusinessRule {
        BusinessRule {
            id: RuleId::from(id),
            name: format!("Rule {id}"),
            domain: Domain::Payment,
            criticality: Criticality::Medium,
            description: None,
        }
    }

    #[test]
    fn lookup_matches_normalized_paths_in_request_order() {
        let catalog = RuleCatalog::new()
            .with_rule(rule("A"))
            .with_rule(rule("B"))
            .with_mapping("src/billing/invoice.rs", "B")
            .with_mapping("./src/payment/charge.rs", "A")
            .with_mapping("src/payment/charge.rs", "B");

        let matches = catalog.lookup_direct_rules(&[
            "src\\payment\\charge.rs".to_string(),
            "README.md".to_string(),
            "src/billing/invoice.rs".to_string(),
        ]);

        assert_eq!(
            matches,
            vec![
                ("src/payment/charge.rs".to_string(), RuleId::from("A")),
                ("src/payment/charge.rs".to_string(), RuleId::from("B")),
                ("src/billing/invoice.rs".to_string(), RuleId::from("B")),
            ]
        );
    }

    #[test]
    fn duplicate_mapping_is_recorded_once() {
        let catalog = RuleCatalog::new()
            .with_mapping("src/a.rs", "A")
            .with_mapping("./src/a.rs", "A");
        assert_eq!(catalog.stats().mappings, 1);
    }

    #[test]
    fn parallel_edges_with_different_types_are_kept() {
        let catalog = RuleCatalog::new()
            .with_edge(DependencyEdge::new("A", "B", DependencyType::Feeds))
            .with_edge(DependencyEdge::new("A", "B", DependencyType::Validates))
            .with_edge(DependencyEdge::new("A", "B", DependencyType::Feeds));

        let edges = catalog.outgoing_edges(&RuleId::from("A"));
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].dependency_type, DependencyType::Feeds);
        assert_eq!(edges[1].dependency_type, DependencyType::Validates);
    }

    #[test]
    fn unknown_ids_yield_empty_answers() {
        let catalog = RuleCatalog::new();
        let missing = RuleId::from("missing");
        assert!(catalog.get_rule(&missing).is_none());
        assert!(catalog.get_ownerships(&missing).is_empty());
        assert!(catalog.outgoing_edges(&missing).is_empty());
        assert!(!catalog.has_incidents(&missing));
    }

    #[test]
    fn incidents_are_tracked_per_rule() {
        let catalog = RuleCatalog::new().with_rule(rule("A")).with_incident(Incident {
            rule_id: RuleId::from("A"),
            title: "Double charge".to_string(),
            severity: IncidentSeverity::Critical,
            occurred_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        });

        assert!(catalog.has_incidents(&RuleId::from("A")));
        assert_eq!(catalog.stats().incidents, 1);
    }

    #[test]
    fn projects_are_looked_up_by_id() {
        let catalog = RuleCatalog::new().with_project(Project::new("PRJ-1", "Checkout"));

        let project = catalog.get_project(&ProjectId::from("PRJ-1")).unwrap();
        assert_eq!(project.name, "Checkout");
        assert!(catalog.get_project(&ProjectId::from("PRJ-2")).is_none());
        assert_eq!(catalog.stats().projects, 1);
    }
}
