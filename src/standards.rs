//! Standards table and sample assignments.
//!
//! Both are loaded from uploaded files, validated once and then treated as
//! immutable for the rest of the run.

use crate::error::{InputError, TableKind};
use crate::table::{load_table, RecordTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

pub const STANDARDS_COLUMNS: [&str; 2] = ["id", "description"];
pub const SAMPLE_COLUMNS: [&str; 2] = ["id", "unit_title"];

/// A single curriculum requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standard {
    pub id: String,
    pub description: String,
}

impl Standard {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// Ordered standards, every row with a non-empty id and description.
///
/// Ids are expected to be unique but this is not enforced; duplicates make
/// the generated grouping ambiguous and are reported by [`duplicate_ids`].
///
/// [`duplicate_ids`]: StandardsTable::duplicate_ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandardsTable {
    rows: Vec<Standard>,
}

impl StandardsTable {
    pub fn new(rows: Vec<Standard>) -> Result<Self, InputError> {
        for (idx, row) in rows.iter().enumerate() {
            if row.id.trim().is_empty() {
                return Err(InputError::EmptyValue {
                    kind: TableKind::Standards,
                    row: idx + 1,
                    column: "id",
                });
            }
            if row.description.trim().is_empty() {
                return Err(InputError::EmptyValue {
                    kind: TableKind::Standards,
                    row: idx + 1,
                    column: "description",
                });
            }
        }
        Ok(Self { rows })
    }

    /// Load and validate a standards file (`id`, `description` columns required).
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let table = Self::from_records(&load_table(path)?)?;
        info!(path = %path.display(), standards = table.len(), "Loaded standards");
        let duplicates = table.duplicate_ids();
        if !duplicates.is_empty() {
            warn!(
                duplicates = %duplicates.join(", "),
                "Standards file contains duplicate ids; grouping may be ambiguous"
            );
        }
        Ok(table)
    }

    pub fn from_records(records: &RecordTable) -> Result<Self, InputError> {
        let indices = records.require_columns(TableKind::Standards, &STANDARDS_COLUMNS)?;
        if records.is_empty() {
            return Err(InputError::NoRows {
                kind: TableKind::Standards,
            });
        }
        let rows = (0..records.len())
            .map(|row| Standard::new(records.cell(row, indices[0]), records.cell(row, indices[1])))
            .collect();
        Self::new(rows)
    }

    pub fn rows(&self) -> &[Standard] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Standard> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.rows.iter().any(|s| s.id == id)
    }

    /// All rows carrying `id`, in table order.
    pub fn matching<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Standard> + 'a {
        self.rows.iter().filter(move |s| s.id == id)
    }

    /// Ids that occur more than once, sorted.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.id.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

impl<'a> IntoIterator for &'a StandardsTable {
    type Item = &'a Standard;
    type IntoIter = std::slice::Iter<'a, Standard>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// One row of a sample sequence: standard id mapped to a unit title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleAssignment {
    pub id: String,
    pub unit_title: String,
}

impl SampleAssignment {
    pub fn new(id: impl Into<String>, unit_title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unit_title: unit_title.into(),
        }
    }
}

/// Load a sample sequence file (`id`, `unit_title` columns required).
pub fn load_sample_assignments(path: &Path) -> Result<Vec<SampleAssignment>, InputError> {
    let assignments = sample_assignments_from_records(&load_table(path)?)?;
    info!(path = %path.display(), assignments = assignments.len(), "Loaded sample map");
    Ok(assignments)
}

pub fn sample_assignments_from_records(
    records: &RecordTable,
) -> Result<Vec<SampleAssignment>, InputError> {
    let indices = records.require_columns(TableKind::SampleMap, &SAMPLE_COLUMNS)?;
    let mut assignments = Vec::with_capacity(records.len());
    for row in 0..records.len() {
        let id = records.cell(row, indices[0]);
        let unit_title = records.cell(row, indices[1]);
        for (column, value) in SAMPLE_COLUMNS.iter().zip([id, unit_title]) {
            if value.is_empty() {
                return Err(InputError::EmptyValue {
                    kind: TableKind::SampleMap,
                    row: row + 1,
                    column: *column,
                });
            }
        }
        assignments.push(SampleAssignment::new(id, unit_title));
    }
    Ok(assignments)
}
