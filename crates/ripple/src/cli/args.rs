//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;
use std::path::PathBuf;

use super::validators::{validate_project_id, validate_pull_request_id, validate_threshold};
use crate::domain::ProjectId;

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {}

/// Arguments shared by `chain`, `graph` and `analyze`
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Changed file paths, relative to the repository root
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Read additional changed file paths from a file, one per line
    ///
    /// Use `-` to read from standard input, e.g.
    /// `git diff --name-only main | ripple chain --files-from -`.
    #[arg(long, value_name = "PATH")]
    pub files_from: Option<PathBuf>,

    /// Pull request identifier to include in the report
    #[arg(long = "pr", value_name = "ID", value_parser = validate_pull_request_id)]
    pub pull_request: Option<String>,

    /// Scope the report to a project from `projects.jsonl`
    ///
    /// Unknown project IDs are rejected. Without this flag the analysis is
    /// global.
    #[arg(long, value_name = "ID", value_parser = validate_project_id)]
    pub project: Option<ProjectId>,

    /// Escalate when more than this many rules are impacted
    ///
    /// Overrides `analysis.executive-attention-threshold` from the config.
    #[arg(long, value_name = "N", value_parser = validate_threshold)]
    pub attention_threshold: Option<usize>,
}
