//! Shared utilities for CLI commands

use tabled::{Table, settings::Style};

use crate::cli::error::{CliError, CliResult};
use crate::serialize::ExclusionRules;

/// Truncate a string with ellipsis if it exceeds max length
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional comment for display
pub fn format_comment(comment: Option<&str>) -> String {
    match comment {
        Some(c) if !c.is_empty() => truncate_with_ellipsis(c, 50),
        _ => "-".to_string(),
    }
}

/// Format a price with two decimals
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Parse `--exclude` values into serialization rules.
///
/// The leading `-` is optional on the command line.
pub fn parse_excludes(excludes: &[String]) -> CliResult<ExclusionRules> {
    let rules: Vec<String> = excludes
        .iter()
        .map(|e| {
            let e = e.trim();
            if e.starts_with('-') {
                e.to_string()
            } else {
                format!("-{}", e)
            }
        })
        .collect();
    Ok(ExclusionRules::parse(rules)?)
}

/// Reject output formats other than table and json
pub fn check_format(format: &str) -> CliResult<()> {
    match format {
        "table" | "json" => Ok(()),
        other => Err(CliError::InvalidArgument {
            message: format!("unknown format '{}', expected 'table' or 'json'", other),
        }),
    }
}

/// Apply consistent table styling
pub fn apply_table_style(table: &mut Table) {
    table.with(Style::rounded());
}
