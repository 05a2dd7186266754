//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::ProjectId;

/// Maximum length of a pull request identifier
pub const MAX_PULL_REQUEST_ID_LENGTH: usize = 100;

/// Validate an executive attention threshold.
///
/// Delegates to the config validator to keep a single source of truth.
pub fn validate_threshold(s: &str) -> Result<usize, String> {
    let threshold: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid threshold '{}': expected a positive integer", s.trim()))?;
    crate::config::validate_threshold(threshold).map_err(|e| e.to_string())?;
    Ok(threshold)
}

/// Validate a pull request identifier.
///
/// Any single-line, non-empty label is accepted (`PR-123`, `#123`, `!45`).
pub fn validate_pull_request_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Pull request ID cannot be empty".to_string());
    }

    if s.len() > MAX_PULL_REQUEST_ID_LENGTH {
        return Err(format!(
            "Pull request ID cannot exceed {} characters, got {} characters",
            MAX_PULL_REQUEST_ID_LENGTH,
            s.len()
        ));
    }

    if s.chars().any(char::is_control) {
        return Err("Pull request ID cannot contain control characters".to_string());
    }

    Ok(s.to_string())
}

/// Validate a project identifier.
///
/// Only the shape is checked here; whether the project exists is decided
/// against the loaded catalog.
pub fn validate_project_id(s: &str) -> Result<ProjectId, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Project ID cannot be empty".to_string());
    }

    if s.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(format!("Project ID '{s}' cannot contain whitespace"));
    }

    Ok(ProjectId::from(s))
}
