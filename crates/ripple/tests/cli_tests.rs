//! Integration tests for the ripple CLI.
//!
//! These tests run the built binary against temporary repositories.

use rstest::{fixture, rstest};
use tempfile::TempDir;

mod common;
use common::{
    init_with_catalog, run_ripple_in_dir, run_ripple_with_stdin, sample_catalog, stdout_json,
};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Provides a repository loaded with the sample catalog
#[fixture]
fn sample_repo() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    init_with_catalog(temp.path(), &sample_catalog());
    temp
}

fn ids(values: &serde_json::Value) -> Vec<String> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["rule_id"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[rstest]
fn test_cli_help_shows_all_commands(temp_dir: TempDir) {
    let output = run_ripple_in_dir(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    for command in ["init", "info", "chain", "graph", "analyze"] {
        assert!(stdout.contains(command), "help should list '{command}'");
    }
}

#[rstest]
fn test_cli_version(temp_dir: TempDir) {
    let output = run_ripple_in_dir(temp_dir.path(), &["--version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("0.1.0"));
}

#[rstest]
fn test_cli_no_args(temp_dir: TempDir) {
    let output = run_ripple_in_dir(temp_dir.path(), &[]);
    assert!(output.status.success());
}

// ============================================================================
// Repository Discovery
// ============================================================================

#[rstest]
#[case::info(&["info"])]
#[case::chain(&["chain", "src/a.rs"])]
#[case::graph(&["graph", "src/a.rs"])]
#[case::analyze(&["analyze", "src/a.rs"])]
fn test_commands_require_initialized_repo(temp_dir: TempDir, #[case] args: &[&str]) {
    let output = run_ripple_in_dir(temp_dir.path(), args);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not a ripple repository"), "stderr: {stderr}");
}

#[rstest]
fn test_commands_work_from_subdirectory(sample_repo: TempDir) {
    let sub_dir = sample_repo.path().join("src").join("payment");
    std::fs::create_dir_all(&sub_dir).unwrap();

    let json = stdout_json(&run_ripple_in_dir(
        &sub_dir,
        &["--json", "chain", "src/payment/fees.rs"],
    ));

    assert_eq!(json["summary"]["total_rules_affected"], 5);
}

// ============================================================================
// Info Command
// ============================================================================

#[rstest]
fn test_info_json_reports_catalog_counts(sample_repo: TempDir) {
    let json = stdout_json(&run_ripple_in_dir(sample_repo.path(), &["--json", "info"]));

    assert_eq!(json["catalog"]["rules"], 6);
    assert_eq!(json["catalog"]["edges"], 6);
    assert_eq!(json["catalog"]["mappings"], 2);
    assert_eq!(json["catalog"]["ownerships"], 2);
    assert_eq!(json["catalog"]["incidents"], 1);
    assert_eq!(json["catalog"]["projects"], 1);
    assert_eq!(json["executive_attention_threshold"], 10);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 0);
}

#[rstest]
fn test_info_lists_load_warnings(temp_dir: TempDir) {
    let mut catalog = sample_catalog();
    catalog.mappings.push_str("\n{\"file_path\":\"src/ghost.rs\",\"rule_id\":\"BR-404\"}\nnot json");
    init_with_catalog(temp_dir.path(), &catalog);

    let output = run_ripple_in_dir(temp_dir.path(), &["info"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 catalog warning(s)"), "stdout: {stdout}");
    assert!(stdout.contains("BR-404"));
}

// ============================================================================
// Chain Command
// ============================================================================

#[rstest]
fn test_chain_json_classifies_by_depth(sample_repo: TempDir) {
    let json = stdout_json(&run_ripple_in_dir(
        sample_repo.path(),
        &["--json", "chain", "src/payment/fees.rs", "--pr", "PR-42"],
    ));

    assert_eq!(json["pull_request_id"], "PR-42");
    assert_eq!(ids(&json["direct_impacts"]), vec!["BR-001"]);
    assert_eq!(ids(&json["indirect_impacts"]), vec!["BR-002", "BR-003"]);
    assert_eq!(ids(&json["cascade_impacts"]), vec!["BR-004", "BR-005"]);
    assert_eq!(
        json["cascade_impacts"][1]["dependency_path"],
        serde_json::json!(["BR-001", "BR-002", "BR-004", "BR-005"])
    );
    assert_eq!(
        json["direct_impacts"][0]["matched_files"],
        serde_json::json!(["src/payment/fees.rs"])
    );
    assert_eq!(json["summary"]["highest_criticality"], "CRITICAL");
    assert_eq!(json["summary"]["requires_executive_attention"], true);
}

#[rstest]
fn test_chain_text_output(sample_repo: TempDir) {
    let output = run_ripple_in_dir(sample_repo.path(), &["chain", "./src/payment/fees.rs"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DIRECT (1):"));
    assert!(stdout.contains("INDIRECT (2):"));
    assert!(stdout.contains("CASCADE (2):"));
    assert!(stdout.contains("Payments Core"));
    assert!(stdout.contains("Requires executive attention"));
    assert!(!stdout.contains("BR-006"));
}

#[rstest]
fn test_chain_unmapped_file_is_empty_not_an_error(sample_repo: TempDir) {
    let json = stdout_json(&run_ripple_in_dir(
        sample_repo.path(),
        &["--json", "chain", "README.md"],
    ));

    assert_eq!(json["summary"]["total_rules_affected"], 0);
    assert!(json["summary"]["highest_criticality"].is_null());
    assert_eq!(json["summary"]["requires_executive_attention"], false);
}

#[rstest]
fn test_chain_without_files_fails(sample_repo: TempDir) {
    let output = run_ripple_in_dir(sample_repo.path(), &["chain"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No changed files given"), "stderr: {stderr}");
}

#[rstest]
fn test_chain_project_scope_is_echoed(sample_repo: TempDir) {
    let json = stdout_json(&run_ripple_in_dir(
        sample_repo.path(),
        &["--json", "chain", "src/payment/fees.rs", "--project", "PRJ-CHECKOUT"],
    ));

    assert_eq!(
        json["project_context"],
        serde_json::json!({
            "scoped": true,
            "project_id": "PRJ-CHECKOUT",
            "project_name": "Checkout"
        })
    );
    assert_eq!(json["summary"]["total_rules_affected"], 5);
}

#[rstest]
fn test_chain_without_project_is_global(sample_repo: TempDir) {
    let json = stdout_json(&run_ripple_in_dir(
        sample_repo.path(),
        &["--json", "chain", "src/payment/fees.rs"],
    ));

    assert_eq!(json["project_context"], serde_json::json!({ "scoped": false }));
}

#[rstest]
fn test_chain_unknown_project_fails(sample_repo: TempDir) {
    let output = run_ripple_in_dir(
        sample_repo.path(),
        &["chain", "src/payment/fees.rs", "--project", "PRJ-NOPE"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown project 'PRJ-NOPE'"), "stderr: {stderr}");
}

#[rstest]
fn test_chain_attention_threshold_override(temp_dir: TempDir) {
    let mut catalog = sample_catalog();
    catalog.rules = catalog.rules.replace("CRITICAL", "LOW").replace("HIGH", "LOW");
    catalog.rules = catalog.rules.replace("MEDIUM", "LOW");
    init_with_catalog(temp_dir.path(), &catalog);

    let default = stdout_json(&run_ripple_in_dir(
        temp_dir.path(),
        &["--json", "chain", "src/payment/fees.rs"],
    ));
    let lowered = stdout_json(&run_ripple_in_dir(
        temp_dir.path(),
        &["--json", "chain", "src/payment/fees.rs", "--attention-threshold", "4"],
    ));

    assert_eq!(default["summary"]["requires_executive_attention"], false);
    assert_eq!(lowered["summary"]["requires_executive_attention"], true);
}

// ============================================================================
// Graph Command
// ============================================================================

#[rstest]
fn test_graph_json_nodes_edges_and_summary(sample_repo: TempDir) {
    let json = stdout_json(&run_ripple_in_dir(
        sample_repo.path(),
        &["--json", "graph", "src/payment/fees.rs"],
    ));

    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 5);
    let br002 = nodes.iter().find(|n| n["rule_id"] == "BR-002").unwrap();
    assert_eq!(br002["has_incidents"], true);
    assert_eq!(br002["ownerships"][0]["team_name"], "Billing Ops");

    let edges = json["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 5);
    assert!(edges.iter().any(|e| e["source_rule_id"] == "BR-004"
        && e["target_rule_id"] == "BR-001"
        && e["dependency_type"] == "DERIVES_FROM"));
    assert!(!edges.iter().any(|e| e["target_rule_id"] == "BR-006"));

    assert_eq!(json["summary"]["total_rules"], 5);
    assert_eq!(json["summary"]["direct"], 1);
    assert_eq!(json["summary"]["indirect"], 2);
    assert_eq!(json["summary"]["cascade"], 2);
    assert_eq!(json["summary"]["critical_rules"], 1);
}

#[rstest]
fn test_graph_files_from_stdin(sample_repo: TempDir) {
    let output = run_ripple_with_stdin(
        sample_repo.path(),
        &["--json", "graph", "--files-from", "-"],
        "src/reports/revenue.rs\n\nREADME.md\n",
    );
    let json = stdout_json(&output);

    let nodes = json["nodes"].as_array().unwrap();
    let level_of = |id: &str| {
        nodes
            .iter()
            .find(|n| n["rule_id"] == id)
            .map(|n| n["impact_level"].as_str().unwrap().to_string())
    };
    assert_eq!(level_of("BR-004").as_deref(), Some("DIRECT"));
    assert_eq!(level_of("BR-001").as_deref(), Some("INDIRECT"));
    assert_eq!(level_of("BR-006").as_deref(), Some("CASCADE"));
    assert_eq!(nodes.len(), 6);
}

// ============================================================================
// Analyze Command
// ============================================================================

#[rstest]
fn test_analyze_text_renders_tree(sample_repo: TempDir) {
    let output = run_ripple_in_dir(sample_repo.path(), &["analyze", "src/payment/fees.rs"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("BR-001 [CRITICAL] Payment fee calculation"));
    assert!(stdout.contains("BR-002 (feeds) [HIGH] Invoice totals"));
    assert!(stdout.contains("BR-004 (aggregates)"));
    assert!(stdout.contains("Levels: 1 direct, 2 indirect, 2 cascade, 1 critical"));
}

#[rstest]
fn test_analyze_json_contains_both_views(sample_repo: TempDir) {
    let json = stdout_json(&run_ripple_in_dir(
        sample_repo.path(),
        &["--json", "analyze", "src/payment/fees.rs", "--pr", "PR-7"],
    ));

    assert_eq!(json["chain"]["summary"]["total_rules_affected"], 5);
    assert_eq!(json["graph"]["summary"]["total_rules"], 5);
    assert_eq!(json["chain"]["pull_request_id"], "PR-7");
    assert_eq!(json["graph"]["project_context"]["scoped"], false);
    assert_eq!(json["tree"][0]["rule_id"], "BR-001");
    assert_eq!(json["tree"][0]["children"].as_array().unwrap().len(), 2);
}
