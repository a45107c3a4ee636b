//! Error types for the scope & sequence builder.

use std::path::PathBuf;
use thiserror::Error;

/// Which uploaded table a loading error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Standards,
    SampleMap,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Standards => write!(f, "Standards file"),
            TableKind::SampleMap => write!(f, "Sample map"),
        }
    }
}

/// Input-file errors. Each one halts processing of that file only.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type for {0} (expected .csv, .tsv or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected JSON layout in {path}: {detail}")]
    UnexpectedShape { path: PathBuf, detail: String },

    #[error("{kind} must have {} columns (missing: {})", quote_all(.required), .missing.join(", "))]
    MissingColumns {
        kind: TableKind,
        required: Vec<&'static str>,
        missing: Vec<String>,
    },

    #[error("{kind} row {row} has an empty '{column}' value")]
    EmptyValue {
        kind: TableKind,
        row: usize,
        column: &'static str,
    },

    #[error("{kind} contains no rows")]
    NoRows { kind: TableKind },
}

fn quote_all(columns: &[&'static str]) -> String {
    columns
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Errors surfaced by the generation pipeline and the CLI.
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Anthropic API key not found. Set {env_var} in your environment or in a secrets file ({})", display_paths(.searched))]
    MissingCredential {
        env_var: String,
        searched: Vec<PathBuf>,
    },

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Could not parse the model's JSON output ({reason}). Raw content:\n{raw}")]
    UnparsedResponse { reason: String, raw: String },

    #[error("Export failed: {0}")]
    ExportError(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "none searched".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<config::ConfigError> for SequenceError {
    fn from(err: config::ConfigError) -> Self {
        SequenceError::ConfigError(err.to_string())
    }
}
