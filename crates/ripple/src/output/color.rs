//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Critical:       red bold (CRITICAL rules, executive attention)
//!   - High/Direct:    red      (HIGH rules, direct impacts)
//!   - Medium/Indirect: yellow  (MEDIUM rules, indirect impacts)
//!   - Info/Reference: cyan     (rule IDs, root tree nodes)
//!   - Accent:         magenta  (cascade impacts, teams)
//!   - Muted:          dimmed   (field labels, connectors, LOW rules)
//!   - Success:        green    (no impact found)

use crate::domain::{Criticality, ImpactLevel};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply color to criticality text.
pub(crate) fn colorize_criticality(criticality: Criticality, config: &OutputConfig) -> String {
    let text = criticality.to_string();
    if !config.use_colors {
        return text;
    }
    match criticality {
        Criticality::Critical => text.red().bold().to_string(),
        Criticality::High => text.red().to_string(),
        Criticality::Medium => text.yellow().to_string(),
        Criticality::Low => text.dimmed().to_string(),
    }
}

/// Apply color to impact level text.
pub(crate) fn colorize_level(level: ImpactLevel, config: &OutputConfig) -> String {
    let text = level.to_string();
    if !config.use_colors {
        return text;
    }
    match level {
        ImpactLevel::Direct => text.red().to_string(),
        ImpactLevel::Indirect => text.yellow().to_string(),
        ImpactLevel::Cascade => text.magenta().to_string(),
    }
}

/// Colorize a rule ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Get an icon for an impact level, with ASCII fallback support.
pub(crate) fn level_icon(level: ImpactLevel, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match level {
            ImpactLevel::Direct => "*",
            ImpactLevel::Indirect => ">",
            ImpactLevel::Cascade => "~",
        }
    } else {
        match level {
            ImpactLevel::Direct => "●",
            ImpactLevel::Indirect => "◐",
            ImpactLevel::Cascade => "○",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }
    match level {
        ImpactLevel::Direct => icon.red().to_string(),
        ImpactLevel::Indirect => icon.yellow().to_string(),
        ImpactLevel::Cascade => icon.magenta().to_string(),
    }
}

/// Marker printed next to rules with incident history.
pub(crate) fn incident_marker(config: &OutputConfig) -> String {
    let marker = if config.use_ascii { "!" } else { "⚠" };
    if !config.use_colors {
        return marker.to_string();
    }
    marker.red().bold().to_string()
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Apply magenta color to text (for team names).
pub(crate) fn magenta(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.magenta().to_string()
}
