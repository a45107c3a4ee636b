//! Preview presentation: standards table, sample map, derived sample units.

use super::{format_notices, to_pretty_json};
use crate::error::SequenceError;
use crate::prompt::render_sample_units;
use crate::sample::SampleUnit;
use crate::standards::{SampleAssignment, StandardsTable};
use comfy_table::Table;
use serde_json::json;

fn standards_table(standards: &StandardsTable) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["ID", "Description"]);
    for standard in standards {
        table.add_row(vec![&standard.id, &standard.description]);
    }
    table
}

fn assignments_table(assignments: &[SampleAssignment]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["ID", "Unit Title"]);
    for assignment in assignments {
        table.add_row(vec![&assignment.id, &assignment.unit_title]);
    }
    table
}

pub fn format_preview_text(
    standards: &StandardsTable,
    sample: Option<(&[SampleAssignment], &[SampleUnit])>,
    notices: &[String],
) -> String {
    let mut out = format!(
        "Standards ({}):\n{}",
        standards.len(),
        standards_table(standards)
    );

    let duplicates = standards.duplicate_ids();
    if !duplicates.is_empty() {
        out.push_str(&format!(
            "\n\nDuplicate ids ({}): {}",
            duplicates.len(),
            duplicates.join(", ")
        ));
    }

    if let Some((assignments, units)) = sample {
        out.push_str(&format!(
            "\n\nSample map ({}):\n{}",
            assignments.len(),
            assignments_table(assignments)
        ));
        out.push_str(&format!(
            "\n\nSample units ({}):\n{}",
            units.len(),
            render_sample_units(units)
        ));
    }

    out.push_str(&format_notices(notices));
    out
}

pub fn format_preview_json(
    standards: &StandardsTable,
    sample: Option<(&[SampleAssignment], &[SampleUnit])>,
    notices: &[String],
) -> Result<String, SequenceError> {
    let (assignments, units) = sample.unwrap_or((&[][..], &[][..]));
    to_pretty_json(&json!({
        "standards": standards.rows(),
        "duplicate_ids": standards.duplicate_ids(),
        "sample_assignments": assignments,
        "sample_units": units,
        "notices": notices,
    }))
}
