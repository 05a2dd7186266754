//! Integration tests for the `init` command.
//!
//! These tests verify the end-to-end behavior of the init command,
//! including the CLI interface and file system operations.

use tempfile::TempDir;

mod common;
use common::{run_ripple_in_dir, stdout_json};

#[test]
fn test_init_creates_ripple_directory() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_ripple_in_dir(temp_dir.path(), &["init", "--quiet"]);

    assert!(output.status.success(), "Init command should succeed");
    assert!(temp_dir.path().join(".ripple").is_dir());
    assert!(output.stdout.is_empty(), "--quiet should suppress output");
}

#[test]
fn test_init_creates_config_file() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_ripple_in_dir(temp_dir.path(), &["init", "--quiet"]);
    assert!(output.status.success());

    let content = std::fs::read_to_string(temp_dir.path().join(".ripple/config.yaml")).unwrap();
    assert!(content.contains("data-dir: .ripple/catalog"));
    assert!(content.contains("executive-attention-threshold: 10"));
}

#[test]
fn test_init_creates_empty_catalog_files() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_ripple_in_dir(temp_dir.path(), &["init", "--quiet"]);
    assert!(output.status.success());

    let catalog_dir = temp_dir.path().join(".ripple/catalog");
    for name in [
        "rules.jsonl",
        "dependencies.jsonl",
        "mappings.jsonl",
        "ownerships.jsonl",
        "incidents.jsonl",
        "projects.jsonl",
    ] {
        let content = std::fs::read_to_string(catalog_dir.join(name)).unwrap();
        assert!(content.is_empty(), "{name} should be empty");
    }
}

#[test]
fn test_init_output_message() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_ripple_in_dir(temp_dir.path(), &["init"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Initialized ripple"));
    assert!(stdout.contains("Catalog:"));
}

#[test]
fn test_init_twice_fails() {
    let temp_dir = TempDir::new().unwrap();

    assert!(run_ripple_in_dir(temp_dir.path(), &["init", "--quiet"])
        .status
        .success());
    let output = run_ripple_in_dir(temp_dir.path(), &["init", "--quiet"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
    assert!(stderr.contains("already initialized"));
}

#[test]
fn test_fresh_repository_analyzes_to_nothing() {
    let temp_dir = TempDir::new().unwrap();
    assert!(run_ripple_in_dir(temp_dir.path(), &["init", "--quiet"])
        .status
        .success());

    let json = stdout_json(&run_ripple_in_dir(
        temp_dir.path(),
        &["--json", "graph", "src/main.rs"],
    ));

    assert!(json["nodes"].as_array().unwrap().is_empty());
    assert!(json["edges"].as_array().unwrap().is_empty());
    assert_eq!(json["summary"]["total_rules"], 0);
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    assert!(run_ripple_in_dir(temp_dir.path(), &["init", "--quiet"])
        .status
        .success());
    std::fs::write(
        temp_dir.path().join(".ripple/config.yaml"),
        "analysis:\n  executive-attention-threshold: 0\n",
    )
    .unwrap();

    let output = run_ripple_in_dir(temp_dir.path(), &["info"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("at least 1"));
}

#[test]
fn test_missing_rules_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    assert!(run_ripple_in_dir(temp_dir.path(), &["init", "--quiet"])
        .status
        .success());
    std::fs::remove_file(temp_dir.path().join(".ripple/catalog/rules.jsonl")).unwrap();

    let output = run_ripple_in_dir(temp_dir.path(), &["info"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("rules.jsonl"));
}
