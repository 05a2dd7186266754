//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Path to the ripple binary built by cargo for this test run
pub fn ripple_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ripple"))
}

/// Run the ripple binary in the specified directory
pub fn run_ripple_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(ripple_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute ripple binary")
}

/// Run the ripple binary with `stdin` piped in
pub fn run_ripple_with_stdin(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(ripple_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn ripple binary");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for ripple")
}

/// Parse stdout of a successful run as JSON
pub fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "ripple failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

/// Catalog file contents, one JSONL string per file
#[derive(Debug, Default, Clone)]
pub struct CatalogFiles {
    pub rules: String,
    pub dependencies: String,
    pub mappings: String,
    pub ownerships: String,
    pub incidents: String,
    pub projects: String,
}

impl CatalogFiles {
    /// Write the files into `dir`, creating it if needed
    pub fn write_to(&self, dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        for (name, content) in [
            ("rules.jsonl", &self.rules),
            ("dependencies.jsonl", &self.dependencies),
            ("mappings.jsonl", &self.mappings),
            ("ownerships.jsonl", &self.ownerships),
            ("incidents.jsonl", &self.incidents),
            ("projects.jsonl", &self.projects),
        ] {
            std::fs::write(dir.join(name), content).unwrap();
        }
    }
}

/// A small payments/billing catalog.
///
/// ```text
/// BR-001 (CRITICAL) --feeds--> BR-002 (HIGH) --aggregates--> BR-004 (LOW) --feeds--> BR-005 (LOW) --feeds--> BR-006
///        \--validates--> BR-003 (MEDIUM)                      BR-004 --derives_from--> BR-001 (cycle)
/// ```
///
/// `src/payment/fees.rs` maps to BR-001, `src/reports/revenue.rs` to BR-004.
/// One project, `PRJ-CHECKOUT`, is defined.
pub fn sample_catalog() -> CatalogFiles {
    CatalogFiles {
        rules: [
            r#"{"id":"BR-001","name":"Payment fee calculation","domain":"PAYMENT","criticality":"CRITICAL"}"#,
            r#"{"id":"BR-002","name":"Invoice totals","domain":"BILLING","criticality":"HIGH"}"#,
            r#"{"id":"BR-003","name":"Refund eligibility","domain":"PAYMENT","criticality":"MEDIUM"}"#,
            r#"{"id":"BR-004","name":"Monthly revenue report","domain":"BILLING","criticality":"LOW"}"#,
            r#"{"id":"BR-005","name":"Revenue forecast","domain":"GENERIC","criticality":"LOW"}"#,
            r#"{"id":"BR-006","name":"Customer tier","domain":"USER","criticality":"MEDIUM"}"#,
        ]
        .join("\n"),
        dependencies: [
            r#"{"source_rule_id":"BR-001","target_rule_id":"BR-002","dependency_type":"FEEDS"}"#,
            r#"{"source_rule_id":"BR-001","target_rule_id":"BR-003","dependency_type":"VALIDATES"}"#,
            r#"{"source_rule_id":"BR-002","target_rule_id":"BR-004","dependency_type":"AGGREGATES"}"#,
            r#"{"source_rule_id":"BR-004","target_rule_id":"BR-005","dependency_type":"FEEDS"}"#,
            r#"{"source_rule_id":"BR-004","target_rule_id":"BR-001","dependency_type":"DERIVES_FROM"}"#,
            r#"{"source_rule_id":"BR-005","target_rule_id":"BR-006","dependency_type":"FEEDS"}"#,
        ]
        .join("\n"),
        mappings: [
            r#"{"file_path":"src/payment/fees.rs","rule_id":"BR-001"}"#,
            r#"{"file_path":"src/reports/revenue.rs","rule_id":"BR-004"}"#,
        ]
        .join("\n"),
        ownerships: [
            r#"{"rule_id":"BR-001","team_name":"Payments Core","team_type":"ENGINEERING","role":"PRIMARY_OWNER","contact_email":"payments@example.com","approval_required":true}"#,
            r#"{"rule_id":"BR-002","team_name":"Billing Ops","team_type":"OPERATIONS","role":"SECONDARY_OWNER","approval_required":false}"#,
        ]
        .join("\n"),
        incidents: r#"{"rule_id":"BR-002","title":"Invoices rounded twice","severity":"HIGH","occurred_at":"2025-01-15T09:30:00Z"}"#
            .to_string(),
        projects: r#"{"id":"PRJ-CHECKOUT","name":"Checkout","description":"Cart to payment flow"}"#
            .to_string(),
    }
}

/// Initialize a repository in `dir` and replace its catalog with `catalog`
pub fn init_with_catalog(dir: &Path, catalog: &CatalogFiles) {
    let output = run_ripple_in_dir(dir, &["init", "--quiet"]);
    assert!(
        output.status.success(),
        "Failed to initialize ripple: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    catalog.write_to(&dir.join(".ripple/catalog"));
}
