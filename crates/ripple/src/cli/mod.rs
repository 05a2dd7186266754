//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for ripple using clap's derive API.
//!
//! # Commands
//!
//! - `init`: Initialize a new ripple repository
//! - `info`: Show repository and catalog information
//! - `chain`: Impacted rules grouped by level
//! - `graph`: Impacted rules as nodes and edges
//! - `analyze`: Impact tree plus summary from a single traversal
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! ripple chain src/payment/fees.rs --pr PR-42
//! git diff --name-only main | ripple --json graph --files-from -
//! ripple analyze src/billing/invoice.rs --attention-threshold 5
//! ```

mod args;
mod execute;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{AnalyzeArgs, InfoArgs, InitArgs};
pub use validators::{validate_pull_request_id, validate_threshold};

/// Ripple - business rule impact propagation
///
/// Maps the files changed by a pull request to the business rules they
/// implement and follows rule dependencies to show what else may break.
#[derive(Parser, Debug)]
#[command(name = "ripple")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new ripple repository
    ///
    /// Creates `.ripple/config.yaml` and an empty JSONL catalog.
    /// Run this once in your project root.
    Init(InitArgs),

    /// Show repository information
    ///
    /// Displays the catalog location, record counts and any problems found
    /// while loading the catalog.
    Info(InfoArgs),

    /// Show impacted rules grouped by impact level
    ///
    /// Lists DIRECT, INDIRECT and CASCADE impacts with their dependency
    /// paths, owners and the files that triggered them.
    Chain(AnalyzeArgs),

    /// Show impacted rules as a graph
    ///
    /// Lists impacted rules as nodes and the dependencies between them as
    /// edges, with summary counts per level.
    Graph(AnalyzeArgs),

    /// Show the impact tree and summary
    ///
    /// Runs one traversal and renders it as a tree rooted at each directly
    /// impacted rule. JSON output contains both the chain and the graph.
    Analyze(AnalyzeArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Info(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_info(&app, args, output_mode).await
            }
            Some(Commands::Chain(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_chain(&app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_graph(&app, args, output_mode).await
            }
            Some(Commands::Analyze(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_analyze(&app, args, output_mode).await
            }
            None => {
                println!("Ripple business rule impact propagation");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
