//! Impact tree rendering for `ripple analyze` output.
//!
//! Each direct impact is the root of a tree whose branches follow the
//! dependency paths recorded by the traversal. Every impacted rule appears
//! exactly once, under the parent that discovered it.

use std::collections::HashMap;
use std::io::{self, Write};

use colored::Colorize;

use super::color::{colorize_criticality, colorize_id, dimmed, incident_marker, level_icon};
use super::OutputConfig;
use crate::domain::{
    Criticality, DependencyType, GraphEdge, ImpactChain, ImpactLevel, ImpactedRule, RuleId,
};

/// A node in an impact tree for rendering purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactTreeNode {
    /// Rule ID of this node.
    pub rule_id: RuleId,
    /// Rule name.
    pub rule_name: String,
    /// Rule criticality.
    pub criticality: Criticality,
    /// Level assigned by the traversal.
    pub level: ImpactLevel,
    /// Relationship from the parent to this node (absent for roots).
    pub dependency_type: Option<DependencyType>,
    /// Whether the rule has incident history.
    pub has_incidents: bool,
    /// Rules this node's rule propagated impact to.
    pub children: Vec<ImpactTreeNode>,
}

/// Build one tree per direct impact from a chain report.
///
/// `edges` supplies the dependency type annotating each branch; when a
/// parent reaches a child through several edge types the first one wins.
/// `incidents` lists rules with incident history.
pub fn build_impact_forest(
    chain: &ImpactChain,
    edges: &[GraphEdge],
    incidents: &[RuleId],
) -> Vec<ImpactTreeNode> {
    let mut children: HashMap<&RuleId, Vec<&ImpactedRule>> = HashMap::new();
    for impacted in chain.all_impacts() {
        if let Some(parent) = impacted.parent() {
            children.entry(parent).or_default().push(impacted);
        }
    }

    let mut edge_types: HashMap<(&RuleId, &RuleId), DependencyType> = HashMap::new();
    for edge in edges {
        edge_types
            .entry((&edge.source_rule_id, &edge.target_rule_id))
            .or_insert(edge.dependency_type);
    }

    let ctx = ForestContext {
        children: &children,
        edge_types: &edge_types,
        incidents,
    };
    chain
        .direct_impacts
        .iter()
        .map(|root| ctx.build(root, None))
        .collect()
}

struct ForestContext<'a> {
    children: &'a HashMap<&'a RuleId, Vec<&'a ImpactedRule>>,
    edge_types: &'a HashMap<(&'a RuleId, &'a RuleId), DependencyType>,
    incidents: &'a [RuleId],
}

impl ForestContext<'_> {
    fn build(&self, rule: &ImpactedRule, dependency_type: Option<DependencyType>) -> ImpactTreeNode {
        let children = self
            .children
            .get(&rule.rule_id)
            .map(|kids| {
                kids.iter()
                    .map(|child| {
                        let edge_type = self
                            .edge_types
                            .get(&(&rule.rule_id, &child.rule_id))
                            .copied();
                        self.build(child, edge_type)
                    })
                    .collect()
            })
            .unwrap_or_default();

        ImpactTreeNode {
            rule_id: rule.rule_id.clone(),
            rule_name: rule.rule_name.clone(),
            criticality: rule.criticality,
            level: rule.impact_level,
            dependency_type,
            has_incidents: self.incidents.contains(&rule.rule_id),
            children,
        }
    }
}

/// Render a forest of impact trees with ASCII/Unicode connectors.
///
/// Renders trees like:
/// ```text
/// ● BR-001 [CRITICAL] Payment fee calculation
/// ├── BR-002 (feeds) [HIGH] Invoice totals
/// │   └── BR-004 (aggregates) [LOW] Monthly revenue report
/// └── BR-003 (validates) [MEDIUM] Refund eligibility
/// ```
pub fn print_impact_forest<W: Write>(
    w: &mut W,
    forest: &[ImpactTreeNode],
    config: &OutputConfig,
) -> io::Result<()> {
    for root in forest {
        writeln!(
            w,
            "{} {}",
            level_icon(root.level, config),
            node_label(root, config)
        )?;
        print_tree_children(w, &root.children, &[], config)?;
    }
    Ok(())
}

/// Recursively render tree children with proper connector lines.
///
/// `prefix_segments` tracks which ancestor levels still have siblings below,
/// used to draw the vertical continuation lines (`│`).
fn print_tree_children<W: Write>(
    w: &mut W,
    children: &[ImpactTreeNode],
    prefix_segments: &[bool],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;

        let mut prefix = String::new();
        for &has_more in prefix_segments {
            prefix.push_str(&dimmed(if has_more { pipe } else { space }, config));
        }
        let connector = dimmed(if is_last { corner } else { branch }, config);

        writeln!(w, "{prefix}{connector}{}", node_label(child, config))?;

        if !child.children.is_empty() {
            let mut next_segments = prefix_segments.to_vec();
            next_segments.push(!is_last);
            print_tree_children(w, &child.children, &next_segments, config)?;
        }
    }

    Ok(())
}

fn node_label(node: &ImpactTreeNode, config: &OutputConfig) -> String {
    let dependency = node
        .dependency_type
        .map(|dt| format!(" {}", dimmed(&format!("({})", dt.label()), config)))
        .unwrap_or_default();
    let incidents = if node.has_incidents {
        format!(" {}", incident_marker(config))
    } else {
        String::new()
    };
    let id = if config.use_colors && node.level == ImpactLevel::Direct {
        node.rule_id.as_str().cyan().bold().to_string()
    } else {
        colorize_id(node.rule_id.as_str(), config)
    };
    format!(
        "{id}{dependency} [{}] {}{incidents}",
        colorize_criticality(node.criticality, config),
        node.rule_name
    )
}

/// Convert an impact tree to a JSON value for programmatic output.
pub fn impact_tree_to_json(node: &ImpactTreeNode) -> serde_json::Value {
    let mut obj = serde_json::json!({
        "rule_id": node.rule_id,
        "rule_name": node.rule_name,
        "criticality": node.criticality,
        "impact_level": node.level,
        "has_incidents": node.has_incidents,
    });
    if let Some(dt) = node.dependency_type {
        obj["dependency_type"] = serde_json::json!(dt);
    }
    obj["children"] = serde_json::json!(node
        .children
        .iter()
        .map(impact_tree_to_json)
        .collect::<Vec<_>>());
    obj
}
