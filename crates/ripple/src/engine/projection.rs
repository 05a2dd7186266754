//! Chain and graph projections of a single traversal.
//!
//! [`ImpactAnalysis`] is the canonical, enriched result of one traversal.
//! The chain report and the graph report are pure functions of it, so a
//! caller that needs both never walks the dependency graph twice.

use super::traversal::{Traversal, TraversalEntry};
use crate::domain::{
    BusinessRule, ChainSummary, Criticality, GraphEdge, GraphNode, GraphSummary, ImpactChain,
    ImpactGraph, ImpactLevel, ImpactedRule, Ownership, OwnershipInfo, ProjectContext, RuleId,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Enriched result of one impact traversal.
#[derive(Debug, Clone)]
pub struct ImpactAnalysis {
    pub(super) pull_request_id: Option<String>,
    pub(super) project_context: ProjectContext,
    pub(super) analyzed_at: DateTime<Utc>,
    pub(super) traversal: Traversal,
    pub(super) rules: HashMap<RuleId, BusinessRule>,
    pub(super) ownerships: HashMap<RuleId, Vec<Ownership>>,
    pub(super) incidents: HashSet<RuleId>,
    pub(super) matched_files: HashMap<RuleId, Vec<String>>,
    pub(super) edges: Vec<GraphEdge>,
    pub(super) attention_threshold: usize,
}

impl ImpactAnalysis {
    /// Project the analysis into the chain report.
    pub fn chain(&self) -> ImpactChain {
        let mut direct_impacts = Vec::new();
        let mut indirect_impacts = Vec::new();
        let mut cascade_impacts = Vec::new();

        for impacted in self.impacted_rules() {
            match impacted.impact_level {
                ImpactLevel::Direct => direct_impacts.push(impacted),
                ImpactLevel::Indirect => indirect_impacts.push(impacted),
                ImpactLevel::Cascade => cascade_impacts.push(impacted),
            }
        }

        let total = direct_impacts.len() + indirect_impacts.len() + cascade_impacts.len();
        let highest = highest_criticality(
            direct_impacts
                .iter()
                .chain(&indirect_impacts)
                .chain(&cascade_impacts)
                .map(|r| r.criticality),
        );

        ImpactChain {
            pull_request_id: self.pull_request_id.clone(),
            project_context: self.project_context.clone(),
            direct_impacts,
            indirect_impacts,
            cascade_impacts,
            summary: ChainSummary {
                total_rules_affected: total,
                highest_criticality: highest,
                requires_executive_attention: requires_executive_attention(
                    highest,
                    total,
                    self.attention_threshold,
                ),
            },
            analyzed_at: self.analyzed_at,
        }
    }

    /// Project the analysis into the graph report.
    pub fn graph(&self) -> ImpactGraph {
        let nodes: Vec<GraphNode> = self
            .resolved_entries()
            .map(|(entry, rule)| GraphNode {
                rule_id: entry.rule_id.clone(),
                rule_name: rule.name.clone(),
                domain: rule.domain,
                criticality: rule.criticality,
                impact_level: entry.level,
                ownerships: self
                    .ownerships_of(&entry.rule_id)
                    .iter()
                    .map(OwnershipInfo::from)
                    .collect(),
                has_incidents: self.incidents.contains(&entry.rule_id),
            })
            .collect();

        let node_ids: HashSet<&RuleId> = nodes.iter().map(|n| &n.rule_id).collect();
        let edges: Vec<GraphEdge> = self
            .edges
            .iter()
            .filter(|e| node_ids.contains(&e.source_rule_id) && node_ids.contains(&e.target_rule_id))
            .cloned()
            .collect();

        let count = |level: ImpactLevel| nodes.iter().filter(|n| n.impact_level == level).count();
        let highest = highest_criticality(nodes.iter().map(|n| n.criticality));
        let summary = GraphSummary {
            total_rules: nodes.len(),
            direct: count(ImpactLevel::Direct),
            indirect: count(ImpactLevel::Indirect),
            cascade: count(ImpactLevel::Cascade),
            critical_rules: nodes
                .iter()
                .filter(|n| n.criticality == Criticality::Critical)
                .count(),
            highest_criticality: highest,
            requires_executive_attention: requires_executive_attention(
                highest,
                nodes.len(),
                self.attention_threshold,
            ),
        };

        ImpactGraph {
            pull_request_id: self.pull_request_id.clone(),
            project_context: self.project_context.clone(),
            nodes,
            edges,
            summary,
            analyzed_at: self.analyzed_at,
        }
    }

    /// Traversal entries whose rule still resolves, in BFS order.
    ///
    /// A rule that vanished from the catalog is dropped from every
    /// projection rather than failing the analysis.
    fn resolved_entries(&self) -> impl Iterator<Item = (&TraversalEntry, &BusinessRule)> {
        self.traversal.entries().iter().filter_map(|entry| {
            let rule = self.rules.get(&entry.rule_id);
            if rule.is_none() {
                tracing::warn!(rule_id = %entry.rule_id, "Impacted rule no longer resolves, dropping");
            }
            rule.map(|r| (entry, r))
        })
    }

    fn impacted_rules(&self) -> impl Iterator<Item = ImpactedRule> + '_ {
        self.resolved_entries().map(|(entry, rule)| ImpactedRule {
            rule_id: entry.rule_id.clone(),
            rule_name: rule.name.clone(),
            domain: rule.domain,
            criticality: rule.criticality,
            impact_level: entry.level,
            dependency_path: entry.path.clone(),
            ownerships: self.ownerships_of(&entry.rule_id).to_vec(),
            matched_files: if entry.level == ImpactLevel::Direct {
                self.matched_files
                    .get(&entry.rule_id)
                    .cloned()
                    .unwrap_or_default()
            } else {
                Vec::new()
            },
        })
    }

    fn ownerships_of(&self, rule_id: &RuleId) -> &[Ownership] {
        self.ownerships.get(rule_id).map_or(&[], Vec::as_slice)
    }
}

/// Highest criticality in `levels`, or `None` when empty.
pub fn highest_criticality<I>(levels: I) -> Option<Criticality>
where
    I: IntoIterator<Item = Criticality>,
{
    levels.into_iter().max()
}

/// Whether an impact set warrants senior review.
///
/// Either condition is enough: a `HIGH` or `CRITICAL` rule anywhere in the
/// set, or more rules than `threshold`.
pub fn requires_executive_attention(
    highest: Option<Criticality>,
    total_rules: usize,
    threshold: usize,
) -> bool {
    highest.is_some_and(|c| c >= Criticality::High) || total_rules > threshold
}
