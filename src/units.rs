//! Response parsing: the model's text decoded into typed unit records.
//!
//! Decoding is strict: the response must be a JSON array of objects carrying
//! `unit_title`, `standards`, `description` and `duration_weeks` with the
//! right JSON types. Anything else is returned as a [`ParseFailure`] holding
//! the raw text so a person can look at it. Cross-checks against the
//! submitted standards live in [`validate_units`] and only produce warnings.

use crate::standards::StandardsTable;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One instructional unit proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedUnit {
    pub unit_title: String,
    #[serde(deserialize_with = "deserialize_ids")]
    pub standards: Vec<String>,
    pub description: String,
    pub duration_weeks: f64,
}

/// Ids may come back as JSON numbers when the source ids were numeric.
fn deserialize_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    let ids = Vec::<RawId>::deserialize(deserializer)?;
    Ok(ids
        .into_iter()
        .map(|id| match id {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        })
        .collect())
}

/// Response text that could not be decoded, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub reason: String,
    pub raw: String,
}

/// Tagged result of decoding a model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Vec<GeneratedUnit>),
    Failed(ParseFailure),
}

impl ParseOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }

    pub fn units(&self) -> Option<&[GeneratedUnit]> {
        match self {
            ParseOutcome::Parsed(units) => Some(units),
            ParseOutcome::Failed(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Vec<GeneratedUnit>, ParseFailure> {
        match self {
            ParseOutcome::Parsed(units) => Ok(units),
            ParseOutcome::Failed(failure) => Err(failure),
        }
    }
}

/// Decode `raw_text` as a JSON array of units. Never panics and never errors out.
pub fn parse_units(raw_text: &str) -> ParseOutcome {
    match serde_json::from_str::<Vec<GeneratedUnit>>(raw_text) {
        Ok(units) => ParseOutcome::Parsed(units),
        Err(e) => ParseOutcome::Failed(ParseFailure {
            reason: e.to_string(),
            raw: raw_text.to_string(),
        }),
    }
}

/// A non-fatal finding about generated units relative to the submitted standards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitIssue {
    EmptyTitle { position: usize },
    EmptyUnit { unit_title: String },
    NonPositiveDuration { unit_title: String, duration_weeks: f64 },
    UnknownStandard { unit_title: String, id: String },
    RepeatedStandard { id: String, units: Vec<String> },
    UnassignedStandard { id: String },
}

impl std::fmt::Display for UnitIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitIssue::EmptyTitle { position } => write!(f, "Unit {} has an empty title", position),
            UnitIssue::EmptyUnit { unit_title } => {
                write!(f, "Unit '{}' lists no standards", unit_title)
            }
            UnitIssue::NonPositiveDuration {
                unit_title,
                duration_weeks,
            } => write!(
                f,
                "Unit '{}' has a non-positive duration ({} weeks)",
                unit_title, duration_weeks
            ),
            UnitIssue::UnknownStandard { unit_title, id } => write!(
                f,
                "Unit '{}' references standard '{}' which is not in the standards file",
                unit_title, id
            ),
            UnitIssue::RepeatedStandard { id, units } => write!(
                f,
                "Standard '{}' is assigned to several units: {}",
                id,
                units.join(", ")
            ),
            UnitIssue::UnassignedStandard { id } => {
                write!(f, "Standard '{}' is not assigned to any unit", id)
            }
        }
    }
}

/// Cross-check parsed units against the standards that were submitted.
///
/// Issues are listed per unit in response order, then repeated standards by
/// id, then unassigned standards in table order.
pub fn validate_units(units: &[GeneratedUnit], standards: &StandardsTable) -> Vec<UnitIssue> {
    let mut issues = Vec::new();
    let mut assigned: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for (idx, unit) in units.iter().enumerate() {
        if unit.unit_title.trim().is_empty() {
            issues.push(UnitIssue::EmptyTitle { position: idx + 1 });
        }
        if unit.standards.is_empty() {
            issues.push(UnitIssue::EmptyUnit {
                unit_title: unit.unit_title.clone(),
            });
        }
        if unit.duration_weeks <= 0.0 {
            issues.push(UnitIssue::NonPositiveDuration {
                unit_title: unit.unit_title.clone(),
                duration_weeks: unit.duration_weeks,
            });
        }
        for id in &unit.standards {
            if !standards.contains_id(id) {
                issues.push(UnitIssue::UnknownStandard {
                    unit_title: unit.unit_title.clone(),
                    id: id.clone(),
                });
            }
            let titles = assigned.entry(id.as_str()).or_default();
            if !titles.contains(&unit.unit_title) {
                titles.push(unit.unit_title.clone());
            }
        }
    }

    for (id, titles) in &assigned {
        if titles.len() > 1 {
            issues.push(UnitIssue::RepeatedStandard {
                id: id.to_string(),
                units: titles.clone(),
            });
        }
    }

    let mut reported = HashSet::new();
    for standard in standards {
        if !assigned.contains_key(standard.id.as_str()) && reported.insert(standard.id.as_str()) {
            issues.push(UnitIssue::UnassignedStandard {
                id: standard.id.clone(),
            });
        }
    }

    issues
}
