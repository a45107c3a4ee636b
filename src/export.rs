//! CSV export of generated units.

use crate::error::SequenceError;
use crate::units::GeneratedUnit;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const EXPORT_HEADER: [&str; 4] = ["unit_title", "standards", "description", "duration_weeks"];

/// Whole numbers print without a fractional part.
pub fn format_weeks(weeks: f64) -> String {
    if weeks.fract() == 0.0 && weeks.abs() < 1e15 {
        format!("{}", weeks as i64)
    } else {
        weeks.to_string()
    }
}

/// Write `units` as CSV with one row per unit.
pub fn write_units_csv<W: Write>(units: &[GeneratedUnit], writer: W) -> Result<(), SequenceError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADER).map_err(export_error)?;
    for unit in units {
        csv_writer
            .write_record([
                unit.unit_title.as_str(),
                unit.standards.join(", ").as_str(),
                unit.description.as_str(),
                format_weeks(unit.duration_weeks).as_str(),
            ])
            .map_err(export_error)?;
    }
    csv_writer
        .flush()
        .map_err(|e| SequenceError::ExportError(e.to_string()))
}

/// Write `units` to a CSV file at `path`, replacing it.
pub fn export_units_csv(units: &[GeneratedUnit], path: &Path) -> Result<(), SequenceError> {
    let file = std::fs::File::create(path).map_err(|e| {
        SequenceError::ExportError(format!("Failed to create {}: {}", path.display(), e))
    })?;
    write_units_csv(units, file)?;
    info!(path = %path.display(), units = units.len(), "Units exported");
    Ok(())
}

fn export_error(e: csv::Error) -> SequenceError {
    SequenceError::ExportError(e.to_string())
}
