//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::AsyncReadExt;

use super::args::{AnalyzeArgs, InfoArgs, InitArgs};
use crate::app::App;
use crate::catalog::ProjectRepository;
use crate::engine::ImpactRequest;
use crate::output::{self, OutputConfig, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!("Initializing ripple repository...");
    }

    let result = init::init(&current_dir).await?;

    if !args.quiet {
        let config = OutputConfig::from_env();
        println!(
            "{}",
            output::success(
                &format!("Initialized ripple in {}", result.ripple_dir.display()),
                &config
            )
        );
        println!("  Config:  {}", result.config_file.display());
        println!("  Catalog: {}", result.catalog_dir.display());
    }

    Ok(())
}

/// Execute the info command
pub async fn execute_info(app: &App, _args: &InfoArgs, output_mode: OutputMode) -> Result<()> {
    let stats = app.catalog().stats();
    let catalog_dir = app.catalog_dir();
    let threshold = app.config().analysis.executive_attention_threshold;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "ripple_dir": app.ripple_dir().display().to_string(),
                "catalog_dir": catalog_dir.display().to_string(),
                "executive_attention_threshold": threshold,
                "catalog": stats,
                "warnings": app.warnings().iter().map(ToString::to_string).collect::<Vec<_>>(),
            }))?;
        }
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!("Ripple Repository Information");
            println!("============================");
            println!();
            println!("Catalog:             {}", catalog_dir.display());
            println!("Attention threshold: {}", threshold);
            println!();
            println!(
                "Rules: {}  Dependencies: {}  Mappings: {}  Ownerships: {}  Incidents: {}  Projects: {}",
                stats.rules,
                stats.edges,
                stats.mappings,
                stats.ownerships,
                stats.incidents,
                stats.projects
            );
            if !app.warnings().is_empty() {
                println!();
                println!(
                    "{}",
                    output::warning(
                        &format!("{} catalog warning(s):", app.warnings().len()),
                        &config
                    )
                );
                for warning in app.warnings() {
                    println!("  {}", warning);
                }
            }
        }
    }

    Ok(())
}

/// Execute the chain command
pub async fn execute_chain(app: &App, args: &AnalyzeArgs, output_mode: OutputMode) -> Result<()> {
    let request = build_request(args, app.catalog()).await?;
    let chain = app
        .engine(args.attention_threshold)
        .analyze(&request)
        .chain();
    output::print_chain(&chain, output_mode)?;
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &AnalyzeArgs, output_mode: OutputMode) -> Result<()> {
    let request = build_request(args, app.catalog()).await?;
    let graph = app
        .engine(args.attention_threshold)
        .analyze(&request)
        .graph();
    output::print_graph(&graph, output_mode)?;
    Ok(())
}

/// Execute the analyze command
pub async fn execute_analyze(
    app: &App,
    args: &AnalyzeArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let request = build_request(args, app.catalog()).await?;
    let analysis = app.engine(args.attention_threshold).analyze(&request);
    output::print_analysis(&analysis, output_mode)?;
    Ok(())
}

/// Collect the changed files from positional arguments and `--files-from`,
/// and resolve `--project` against the catalog.
///
/// # Errors
///
/// Fails when the list file cannot be read, when no file was given at all,
/// or when the project is not in the catalog.
async fn build_request(
    args: &AnalyzeArgs,
    projects: &dyn ProjectRepository,
) -> Result<ImpactRequest> {
    let mut files: Vec<String> = args
        .files
        .iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    if let Some(path) = &args.files_from {
        let content = read_file_list(path).await?;
        files.extend(parse_file_list(&content));
    }

    if files.is_empty() {
        anyhow::bail!(
            "No changed files given. Pass file paths as arguments or use --files-from <PATH>."
        );
    }

    let mut request = ImpactRequest::new(files);
    request.pull_request_id = args.pull_request.clone();

    if let Some(id) = &args.project {
        let Some(project) = projects.get_project(id) else {
            anyhow::bail!("Unknown project '{id}'. Add it to projects.jsonl or omit --project.");
        };
        request = request.with_project(project);
    }

    Ok(request)
}

async fn read_file_list(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("Failed to read changed files from stdin")?;
        return Ok(content);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read changed files from {}", path.display()))
}

/// Split a file list into paths, one per line.
///
/// Blank lines and lines starting with `#` are ignored.
fn parse_file_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RuleCatalog;
    use crate::domain::{Project, ProjectId};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(files: &[&str], files_from: Option<PathBuf>) -> AnalyzeArgs {
        AnalyzeArgs {
            files: files.iter().map(|f| (*f).to_string()).collect(),
            files_from,
            pull_request: Some("PR-9".to_string()),
            project: None,
            attention_threshold: None,
        }
    }

    #[test]
    fn test_parse_file_list_skips_blanks_and_comments() {
        let files = parse_file_list("src/a.rs\n\n  # generated\n  src/b.rs  \r\n");
        assert_eq!(files, vec!["src/a.rs", "src/b.rs"]);
    }

    #[tokio::test]
    async fn test_build_request_merges_args_and_file_list() {
        let temp_dir = TempDir::new().unwrap();
        let list = temp_dir.path().join("changed.txt");
        std::fs::write(&list, "src/b.rs\nsrc/c.rs\n").unwrap();

        let request = build_request(&args(&["src/a.rs"], Some(list)), &RuleCatalog::new())
            .await
            .unwrap();

        assert_eq!(request.changed_files, vec!["src/a.rs", "src/b.rs", "src/c.rs"]);
        assert_eq!(request.pull_request_id.as_deref(), Some("PR-9"));
        assert!(request.project.is_none());
    }

    #[tokio::test]
    async fn test_build_request_resolves_known_project() {
        let catalog = RuleCatalog::new().with_project(Project::new("PRJ-1", "Checkout"));
        let mut args = args(&["src/a.rs"], None);
        args.project = Some(ProjectId::from("PRJ-1"));

        let request = build_request(&args, &catalog).await.unwrap();

        assert_eq!(request.project, Some(Project::new("PRJ-1", "Checkout")));
    }

    #[tokio::test]
    async fn test_build_request_rejects_unknown_project() {
        let catalog = RuleCatalog::new().with_project(Project::new("PRJ-1", "Checkout"));
        let mut args = args(&["src/a.rs"], None);
        args.project = Some(ProjectId::from("PRJ-404"));

        let err = build_request(&args, &catalog).await.unwrap_err();

        assert!(err.to_string().contains("Unknown project 'PRJ-404'"));
    }

    #[tokio::test]
    async fn test_build_request_rejects_empty_input() {
        let err = build_request(&args(&["  "], None), &RuleCatalog::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No changed files given"));
    }

    #[tokio::test]
    async fn test_build_request_reports_missing_list_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.txt");

        let err = build_request(&args(&[], Some(missing)), &RuleCatalog::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read changed files"));
    }
}
