//! Status presentation: resolved settings and credential state.

use super::to_pretty_json;
use crate::config::GenerationDefaults;
use crate::error::SequenceError;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub workspace: PathBuf,
    /// Explicit `--config` file, if any
    pub config_file: Option<PathBuf>,
    pub global_config: Option<PathBuf>,
    pub model: String,
    pub endpoint: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub api_key_env: String,
    /// Where the key was found; `None` when it is missing
    pub credential_source: Option<String>,
    pub generation: GenerationDefaults,
}

pub fn format_status_text(report: &StatusReport) -> String {
    let mut out = format!("Workspace: {}\n", report.workspace.display());
    match (&report.config_file, &report.global_config) {
        (Some(file), _) => out.push_str(&format!("Config: {}\n", file.display())),
        (None, Some(global)) => out.push_str(&format!(
            "Config: layered (global {}, workspace config/)\n",
            global.display()
        )),
        (None, None) => out.push_str("Config: layered (workspace config/)\n"),
    }

    out.push_str("\nProvider:\n");
    out.push_str(&format!("  Model: {}\n", report.model));
    out.push_str(&format!("  Endpoint: {}\n", report.endpoint));
    out.push_str(&format!("  max_tokens: {}\n", report.max_tokens));
    out.push_str(&format!("  temperature: {}\n", report.temperature));
    match &report.credential_source {
        Some(source) => out.push_str(&format!("  API Key: found ({})\n", source)),
        None => out.push_str(&format!(
            "  API Key: missing (set {}; generate will refuse to start)\n",
            report.api_key_env
        )),
    }

    out.push_str("\nGeneration defaults:\n");
    if report.generation.unit_count == 0 {
        out.push_str("  Units: model decides\n");
    } else {
        out.push_str(&format!("  Units: {}\n", report.generation.unit_count));
    }
    out.push_str(&format!(
        "  Group by theme: {}",
        if report.generation.group_by_theme { "yes" } else { "no" }
    ));
    out
}

pub fn format_status_json(report: &StatusReport) -> Result<String, SequenceError> {
    to_pretty_json(report)
}
