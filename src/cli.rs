//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, GenerationArgs, InputArgs};
pub use presentation::{
    format_preview_json, format_preview_text, format_status_json, format_status_text,
    format_units_json, format_units_text, StatusReport, UnitsReport,
};
pub use route::{GenerateOutput, RunContext};
