//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)
//! - [`tree`]: Impact tree rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::domain::{
    Criticality, DependencyType, GraphSummary, ImpactChain, ImpactGraph, ImpactLevel,
    ImpactedRule, ProjectContext, RuleId,
};
use crate::engine::ImpactAnalysis;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};
pub use tree::{build_impact_forest, impact_tree_to_json, print_impact_forest, ImpactTreeNode};

use color::{bold, colorize_criticality, colorize_id, colorize_level, dimmed, incident_marker, level_icon, magenta};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
///
/// This struct holds settings that control how output is formatted,
/// including terminal width limits, ASCII fallback mode, and color output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `RIPPLE_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `RIPPLE_ASCII`: Set to "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `RIPPLE_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_width = match lookup("RIPPLE_MAX_WIDTH") {
            Some(s) if !s.is_empty() => match s.parse() {
                Ok(width) => width,
                Err(_) => {
                    tracing::warn!(
                        env_var = "RIPPLE_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("RIPPLE_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "RIPPLE_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("RIPPLE_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Terminal Width Detection
// ============================================================================

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| usize::from(w.0))
        .unwrap_or(usize::from(DEFAULT_TERMINAL_WIDTH))
}

fn content_width(config: &OutputConfig) -> usize {
    get_terminal_width().min(config.max_width)
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    textwrap::wrap(text, max_width.max(1))
        .into_iter()
        .map(|s| s.into_owned())
        .collect()
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a chain report in the specified format
pub fn print_chain(chain: &ImpactChain, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_chain_text(&mut handle, chain, content_width(&config), &config),
        OutputMode::Json => write_json(&mut handle, chain),
    }
}

/// Print a graph report in the specified format
pub fn print_graph(graph: &ImpactGraph, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_graph_text(&mut handle, graph, &config),
        OutputMode::Json => write_json(&mut handle, graph),
    }
}

/// Print both reports of one analysis in the specified format.
///
/// Text output renders the impact tree followed by the summary; JSON output
/// contains the chain, the graph and the tree.
pub fn print_analysis(analysis: &ImpactAnalysis, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    let chain = analysis.chain();
    let graph = analysis.graph();
    let incidents: Vec<RuleId> = graph
        .nodes
        .iter()
        .filter(|n| n.has_incidents)
        .map(|n| n.rule_id.clone())
        .collect();
    let forest = build_impact_forest(&chain, &graph.edges, &incidents);

    match mode {
        OutputMode::Text => print_analysis_text(&mut handle, &chain, &graph, &forest, &config),
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({
                "chain": chain,
                "graph": graph,
                "tree": forest.iter().map(impact_tree_to_json).collect::<Vec<_>>(),
            }),
        ),
    }
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{}", json)
}

// ============================================================================
// Text Formatting
// ============================================================================

fn print_header<W: Write>(
    w: &mut W,
    title: &str,
    pull_request_id: Option<&str>,
    project: &ProjectContext,
    config: &OutputConfig,
) -> io::Result<()> {
    let heading = match pull_request_id {
        Some(pr) => format!("{title} for {pr}"),
        None => title.to_string(),
    };
    writeln!(w, "{}", bold(&heading, config))?;
    writeln!(w, "{}", dimmed(&"=".repeat(heading.chars().count()), config))?;
    if let (Some(id), Some(name)) = (&project.project_id, &project.project_name) {
        writeln!(w, "{} {name} ({id})", dimmed("Project:", config))?;
    }
    Ok(())
}

fn print_no_impact<W: Write>(w: &mut W, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{}",
        success("No business rules are impacted by these files.", config)
    )
}

fn print_chain_text<W: Write>(
    w: &mut W,
    chain: &ImpactChain,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    print_header(
        w,
        "Impact chain",
        chain.pull_request_id.as_deref(),
        &chain.project_context,
        config,
    )?;

    if chain.is_empty() {
        return print_no_impact(w, config);
    }

    for (level, rules) in [
        (ImpactLevel::Direct, &chain.direct_impacts),
        (ImpactLevel::Indirect, &chain.indirect_impacts),
        (ImpactLevel::Cascade, &chain.cascade_impacts),
    ] {
        if rules.is_empty() {
            continue;
        }
        writeln!(w)?;
        writeln!(w, "{} ({}):", colorize_level(level, config), rules.len())?;
        for rule in rules {
            print_impacted_rule(w, rule, width, config)?;
        }
    }

    writeln!(w)?;
    print_summary_lines(
        w,
        chain.summary.total_rules_affected,
        chain.summary.highest_criticality,
        chain.summary.requires_executive_attention,
        config,
    )
}

fn print_impacted_rule<W: Write>(
    w: &mut W,
    rule: &ImpactedRule,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "  {} {} [{}] {}",
        level_icon(rule.impact_level, config),
        colorize_id(rule.rule_id.as_str(), config),
        colorize_criticality(rule.criticality, config),
        rule.rule_name
    )?;
    writeln!(w, "      {} {}", dimmed("Domain:", config), rule.domain)?;

    if !rule.matched_files.is_empty() {
        let files = rule.matched_files.join(", ");
        for (i, line) in wrap_text(&files, width.saturating_sub(13)).iter().enumerate() {
            let label = if i == 0 { "Files:" } else { "      " };
            writeln!(w, "      {} {line}", dimmed(label, config))?;
        }
    }

    if rule.dependency_path.len() > 1 {
        let arrow = if config.use_ascii { " -> " } else { " → " };
        let path = rule
            .dependency_path
            .iter()
            .map(RuleId::as_str)
            .collect::<Vec<_>>()
            .join(arrow);
        for (i, line) in wrap_text(&path, width.saturating_sub(12)).iter().enumerate() {
            let label = if i == 0 { "Path:" } else { "     " };
            writeln!(w, "      {} {line}", dimmed(label, config))?;
        }
    }

    let primary = rule.primary_owner();
    let others = rule
        .ownerships
        .iter()
        .filter(|owner| !primary.is_some_and(|p| std::ptr::eq(*owner, p)));
    let owners = primary
        .map(|owner| ("Primary owner:", owner))
        .into_iter()
        .chain(others.map(|owner| ("Owner:", owner)));
    for (label, owner) in owners {
        let approval = if owner.approval_required {
            format!(" {}", warning("approval required", config))
        } else {
            String::new()
        };
        let contact = owner
            .contact_email
            .as_deref()
            .map(|email| format!(" <{email}>"))
            .unwrap_or_default();
        writeln!(
            w,
            "      {} {} ({}, {}){contact}{approval}",
            dimmed(label, config),
            magenta(&owner.team_name, config),
            owner.role,
            owner.team_type
        )?;
    }

    Ok(())
}

fn print_graph_text<W: Write>(
    w: &mut W,
    graph: &ImpactGraph,
    config: &OutputConfig,
) -> io::Result<()> {
    print_header(
        w,
        "Impact graph",
        graph.pull_request_id.as_deref(),
        &graph.project_context,
        config,
    )?;

    if graph.nodes.is_empty() {
        return print_no_impact(w, config);
    }

    writeln!(w)?;
    writeln!(w, "{} ({}):", bold("Nodes", config), graph.nodes.len())?;
    for node in &graph.nodes {
        let incidents = if node.has_incidents {
            format!(" {}", incident_marker(config))
        } else {
            String::new()
        };
        writeln!(
            w,
            "  {} {} [{}] {} {}{incidents}",
            level_icon(node.impact_level, config),
            colorize_id(node.rule_id.as_str(), config),
            colorize_criticality(node.criticality, config),
            colorize_level(node.impact_level, config),
            node.rule_name
        )?;
        if !node.ownerships.is_empty() {
            let teams = node
                .ownerships
                .iter()
                .map(|o| format!("{} ({})", magenta(&o.team_name, config), o.role))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(w, "      {} {teams}", dimmed("Teams:", config))?;
        }
    }

    if !graph.edges.is_empty() {
        let arrow = if config.use_ascii { "->" } else { "→" };
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold("Edges", config), graph.edges.len())?;
        for edge in &graph.edges {
            writeln!(
                w,
                "  {} {} {} {}",
                colorize_id(edge.source_rule_id.as_str(), config),
                dimmed(arrow, config),
                colorize_id(edge.target_rule_id.as_str(), config),
                dimmed(&format!("({})", edge.dependency_type.label()), config)
            )?;
        }

        let mut legend: Vec<DependencyType> = Vec::new();
        for edge in &graph.edges {
            if !legend.contains(&edge.dependency_type) {
                legend.push(edge.dependency_type);
            }
        }
        writeln!(w)?;
        for dependency_type in legend {
            writeln!(
                w,
                "  {} {}",
                dimmed(&format!("{}:", dependency_type.label()), config),
                dependency_type.description()
            )?;
        }
    }

    writeln!(w)?;
    print_graph_summary(w, &graph.summary, config)
}

fn print_graph_summary<W: Write>(
    w: &mut W,
    summary: &GraphSummary,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} direct, {} indirect, {} cascade, {} critical",
        dimmed("Levels:", config),
        summary.direct,
        summary.indirect,
        summary.cascade,
        summary.critical_rules
    )?;
    print_summary_lines(
        w,
        summary.total_rules,
        summary.highest_criticality,
        summary.requires_executive_attention,
        config,
    )
}

fn print_analysis_text<W: Write>(
    w: &mut W,
    chain: &ImpactChain,
    graph: &ImpactGraph,
    forest: &[ImpactTreeNode],
    config: &OutputConfig,
) -> io::Result<()> {
    print_header(
        w,
        "Impact analysis",
        chain.pull_request_id.as_deref(),
        &chain.project_context,
        config,
    )?;

    if forest.is_empty() {
        return print_no_impact(w, config);
    }

    writeln!(w)?;
    print_impact_forest(w, forest, config)?;
    writeln!(w)?;
    print_graph_summary(w, &graph.summary, config)
}

fn print_summary_lines<W: Write>(
    w: &mut W,
    total: usize,
    highest: Option<Criticality>,
    requires_executive_attention: bool,
    config: &OutputConfig,
) -> io::Result<()> {
    let highest = highest
        .map(|c| colorize_criticality(c, config))
        .unwrap_or_else(|| "none".to_string());
    writeln!(
        w,
        "{} {total}    {} {highest}",
        dimmed("Rules affected:", config),
        dimmed("Highest criticality:", config),
    )?;
    if requires_executive_attention {
        writeln!(
            w,
            "{} {}",
            incident_marker(config),
            error("Requires executive attention", config)
        )?;
    }
    Ok(())
}
