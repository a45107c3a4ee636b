//! CLI presentation: text and json formatters per command.

mod standards;
mod status;
mod units;

pub use standards::{format_preview_json, format_preview_text};
pub use status::{format_status_json, format_status_text, StatusReport};
pub use units::{format_units_json, format_units_text, UnitsReport};

use crate::error::SequenceError;
use serde::Serialize;

pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, SequenceError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SequenceError::ExportError(format!("Failed to serialize output: {}", e)))
}

/// `Notices (n):` block for problems that did not stop the command.
pub(crate) fn format_notices(notices: &[String]) -> String {
    if notices.is_empty() {
        return String::new();
    }
    let mut out = format!("\n\nNotices ({}):", notices.len());
    for notice in notices {
        out.push_str(&format!("\n  - {}", notice));
    }
    out
}
