//! Generated unit presentation: text listing and JSON report.

use super::{format_notices, to_pretty_json};
use crate::error::SequenceError;
use crate::export::format_weeks;
use crate::provider::TokenUsage;
use crate::units::{GeneratedUnit, UnitIssue};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Machine-readable result of `generate --format json`.
#[derive(Debug, Serialize)]
pub struct UnitsReport<'a> {
    pub generated_at: String,
    pub model: &'a str,
    pub usage: &'a TokenUsage,
    pub units: &'a [GeneratedUnit],
    pub issues: &'a [UnitIssue],
    pub notices: &'a [String],
}

impl<'a> UnitsReport<'a> {
    pub fn new(
        model: &'a str,
        usage: &'a TokenUsage,
        units: &'a [GeneratedUnit],
        issues: &'a [UnitIssue],
        notices: &'a [String],
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            model,
            usage,
            units,
            issues,
            notices,
        }
    }
}

pub fn format_units_text(
    units: &[GeneratedUnit],
    issues: &[UnitIssue],
    notices: &[String],
) -> String {
    let mut out = if units.is_empty() {
        "The model returned no units.".to_string()
    } else {
        units
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                format!(
                    "Unit {}: {}\n  Duration: {} weeks\n  Description: {}\n  Standards: {}",
                    i + 1,
                    unit.unit_title,
                    format_weeks(unit.duration_weeks),
                    unit.description,
                    unit.standards.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    if !issues.is_empty() {
        out.push_str(&format!("\n\nWarnings ({}):", issues.len()));
        for issue in issues {
            out.push_str(&format!("\n  - {}", issue));
        }
    }

    out.push_str(&format_notices(notices));
    out
}

pub fn format_units_json(report: &UnitsReport<'_>) -> Result<String, SequenceError> {
    to_pretty_json(report)
}
