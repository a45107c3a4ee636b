//! Unit generation request builder.
//!
//! Renders the single user message sent to the model. The standards list in
//! this text is the only thing the model sees, so it is emitted verbatim and
//! in table order.

use crate::error::SequenceError;
use crate::sample::SampleUnit;
use crate::standards::StandardsTable;
use serde::{Deserialize, Serialize};

pub const ROLE_FRAMING: &str = "You are a curriculum designer.";
pub const GROUPING_TASK: &str = "Group the following standards into instructional units.";
pub const SAMPLE_FRAMING: &str = "Use the sample sequence to inspire the new grouping of standards.";
pub const THEME_DIRECTIVE: &str =
    "Group standards by similar instructional topics or learning themes.";

const OUTPUT_FORMAT_DIRECTIVE: &str = "Return JSON output only: a JSON array with no surrounding text. \
Each element must be an object with exactly these keys: \
\"unit_title\" (string), \"standards\" (array of standard ids from the list above), \
\"description\" (string) and \"duration_weeks\" (number).";

const OUTPUT_EXAMPLE: &str = r#"[
  {
    "unit_title": "Name",
    "standards": ["ID1", "ID2"],
    "description": "Text...",
    "duration_weeks": 2
  }
]"#;

/// Options that shape the grouping request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Exact number of units to ask for; `None` leaves it to the model.
    pub unit_count: Option<u32>,
    pub group_by_theme: bool,
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.unit_count == Some(0) {
            return Err(SequenceError::InvalidOption(
                "unit_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Directive lines implied by the options, in a fixed order.
    pub fn directives(&self) -> Vec<String> {
        let mut directives = Vec::new();
        if let Some(count) = self.unit_count {
            directives.push(unit_count_directive(count));
        }
        if self.group_by_theme {
            directives.push(THEME_DIRECTIVE.to_string());
        }
        directives
    }
}

pub fn unit_count_directive(count: u32) -> String {
    format!("Create exactly {} instructional units.", count)
}

/// `"{id}: {description}"` per standard, newline-joined.
pub fn render_standards(standards: &StandardsTable) -> String {
    standards
        .iter()
        .map(|s| format!("{}: {}", s.id, s.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sample units separated by a blank line.
pub fn render_sample_units(units: &[SampleUnit]) -> String {
    units
        .iter()
        .map(|unit| {
            format!(
                "Unit: {}\nStandards: {}\nDescriptions: {}",
                unit.unit_title,
                unit.standards.join(", "),
                unit.descriptions.join("; ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the full request text. Deterministic for identical inputs.
pub fn build_prompt(
    standards: &StandardsTable,
    sample_units: Option<&[SampleUnit]>,
    config: &GenerationConfig,
) -> String {
    let sample_units = sample_units.filter(|units| !units.is_empty());
    let mut sections: Vec<String> = Vec::new();

    match sample_units {
        Some(units) => {
            sections.push(format!("{} {}", ROLE_FRAMING, SAMPLE_FRAMING));
            sections.push(format!("Sample:\n{}", render_sample_units(units)));
        }
        None => sections.push(format!("{} {}", ROLE_FRAMING, GROUPING_TASK)),
    }

    let directives = config.directives();
    if !directives.is_empty() {
        sections.push(format!("Instructions:\n{}", directives.join("\n")));
    }

    sections.push(format!("Group these standards:\n{}", render_standards(standards)));
    sections.push(format!("{}\n{}", OUTPUT_FORMAT_DIRECTIVE, OUTPUT_EXAMPLE));

    let mut prompt = sections.join("\n\n");
    prompt.push('\n');
    prompt
}
