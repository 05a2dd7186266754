//! Rule dependency graph built on demand from the catalog.
//!
//! `RuleGraph` decouples catalog access from traversal. It starts with the
//! seed rules and pulls a rule's outgoing edges from the
//! [`DependencyRepository`] the first time the traversal asks for that rule's
//! neighbors, so only the part of the catalog reachable from the seeds is
//! ever indexed.
//!
//! # Edge Direction
//!
//! Edges point from **source to target** (source feeds target). A change to
//! the source may affect the target, so traversal follows outgoing edges.
//!
//! # Stale References
//!
//! Seeds and edge targets are resolved through the [`RuleRepository`] before
//! they become nodes. Anything that doesn't resolve is skipped with a
//! warning, which keeps every node in the graph backed by a real rule.

use crate::catalog::{DependencyRepository, RuleRepository};
use crate::domain::{BusinessRule, DependencyType, GraphEdge, RuleId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Lazily expanded, cycle tolerant rule graph.
pub struct RuleGraph<'a> {
    /// Rule lookup used to resolve nodes
    rules: &'a dyn RuleRepository,

    /// Edge lookup used to expand nodes
    dependencies: &'a dyn DependencyRepository,

    /// Nodes contain `RuleId` values, edges contain `DependencyType`.
    /// Parallel edges with different types are allowed.
    graph: DiGraph<RuleId, DependencyType>,

    /// Mapping from `RuleId` to graph `NodeIndex`
    node_map: HashMap<RuleId, NodeIndex>,

    /// Resolved rule records, one per node
    resolved: HashMap<RuleId, BusinessRule>,

    /// Nodes whose outgoing edges have been fetched
    expanded: HashSet<NodeIndex>,

    /// Ids that failed to resolve, so each is looked up and logged once
    unresolved: HashSet<RuleId>,
}

impl std::fmt::Debug for RuleGraph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleGraph")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("expanded", &self.expanded.len())
            .finish_non_exhaustive()
    }
}

impl<'a> RuleGraph<'a> {
    /// Create an empty graph over the given accessors
    pub fn new(rules: &'a dyn RuleRepository, dependencies: &'a dyn DependencyRepository) -> Self {
        Self {
            rules,
            dependencies,
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            resolved: HashMap::new(),
            expanded: HashSet::new(),
            unresolved: HashSet::new(),
        }
    }

    /// Add seed rules to the graph.
    ///
    /// Returns the seeds that resolved, deduplicated, in their original
    /// order. Unknown ids are dropped.
    pub fn seed<I>(&mut self, ids: I) -> Vec<RuleId>
    where
        I: IntoIterator<Item = RuleId>,
    {
        let mut seeds = Vec::new();
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id.clone()) {
                continue;
            }
            if self.ensure_node(&id).is_some() {
                seeds.push(id);
            } else {
                tracing::debug!(rule_id = %id, "Seed rule does not resolve, skipping");
            }
        }
        seeds
    }

    /// Distinct targets of `id`'s outgoing edges, in catalog order.
    ///
    /// Fetches the edges on first call. Targets that don't resolve are
    /// skipped. A self-loop yields `id` itself; the traversal's visited
    /// set takes care of it.
    pub fn neighbors(&mut self, id: &RuleId) -> Vec<RuleId> {
        let Some(node) = self.expand(id) else {
            return Vec::new();
        };

        let mut targets = Vec::new();
        for edge in self.sorted_edges(node) {
            let target = &self.graph[edge.1];
            if !targets.contains(target) {
                targets.push(target.clone());
            }
        }
        targets
    }

    /// Look up a resolved rule
    pub fn resolve(&self, id: &RuleId) -> Option<&BusinessRule> {
        self.resolved.get(id)
    }

    /// Every edge whose endpoints are both in `ids`.
    ///
    /// Members the traversal never expanded (those at the depth cap) have
    /// their edges read straight from the repository and filtered to
    /// `ids`, so targets outside the result are never resolved.
    /// Edges are returned grouped by source in the order of `ids`.
    pub fn edges_among(&self, ids: &[RuleId]) -> Vec<GraphEdge> {
        let members: HashSet<&RuleId> = ids.iter().collect();
        let mut seen = HashSet::new();
        let mut edges = Vec::new();

        for id in ids {
            let Some(&node) = self.node_map.get(id) else {
                continue;
            };
            let outgoing: Vec<(RuleId, DependencyType)> = if self.expanded.contains(&node) {
                self.sorted_edges(node)
                    .into_iter()
                    .map(|(_, target, dependency_type)| (self.graph[target].clone(), dependency_type))
                    .collect()
            } else {
                self.dependencies
                    .outgoing_edges(id)
                    .into_iter()
                    .filter(|edge| edge.source_rule_id == *id)
                    .map(|edge| (edge.target_rule_id, edge.dependency_type))
                    .collect()
            };

            for (target, dependency_type) in outgoing {
                if !members.contains(&target) {
                    continue;
                }
                let edge = GraphEdge {
                    source_rule_id: id.clone(),
                    target_rule_id: target,
                    dependency_type,
                };
                if seen.insert(edge.clone()) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Number of nodes indexed so far
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges indexed so far
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Resolve `id` and add it as a node if it isn't one already.
    fn ensure_node(&mut self, id: &RuleId) -> Option<NodeIndex> {
        if let Some(&node) = self.node_map.get(id) {
            return Some(node);
        }
        if self.unresolved.contains(id) {
            return None;
        }

        match self.rules.get_rule(id) {
            Some(rule) => {
                let node = self.graph.add_node(id.clone());
                self.node_map.insert(id.clone(), node);
                self.resolved.insert(id.clone(), rule);
                Some(node)
            }
            None => {
                self.unresolved.insert(id.clone());
                None
            }
        }
    }

    /// Fetch and index `id`'s outgoing edges once.
    fn expand(&mut self, id: &RuleId) -> Option<NodeIndex> {
        let node = *self.node_map.get(id)?;
        if !self.expanded.insert(node) {
            return Some(node);
        }

        for edge in self.dependencies.outgoing_edges(id) {
            if edge.source_rule_id != *id {
                tracing::warn!(
                    rule_id = %id,
                    source = %edge.source_rule_id,
                    "Repository returned an edge with a different source, skipping"
                );
                continue;
            }
            match self.ensure_node(&edge.target_rule_id) {
                Some(target) => {
                    self.graph.add_edge(node, target, edge.dependency_type);
                }
                None => {
                    tracing::warn!(
                        source = %id,
                        target = %edge.target_rule_id,
                        "Dependency points at an unknown rule, skipping edge"
                    );
                }
            }
        }
        Some(node)
    }

    /// Outgoing edges of `node` in insertion order.
    ///
    /// petgraph walks a node's adjacency list newest first; sorting by
    /// edge index restores catalog order and keeps traversal deterministic.
    fn sorted_edges(&self, node: NodeIndex) -> Vec<(NodeIndex, NodeIndex, DependencyType)> {
        let mut edges: Vec<_> = self.graph.edges(node).collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| (e.source(), e.target(), *e.weight()))
            .collect()
    }
}
