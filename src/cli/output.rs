//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::SequenceError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &SequenceError) -> String {
    match e {
        SequenceError::UnparsedResponse { .. } => e.to_string(),
        SequenceError::MissingCredential { env_var, .. } => format!(
            "Error: {}\nExport {} or add it to .scopeseq/secrets.toml in the workspace.",
            e, env_var
        ),
        _ => format!("Error: {}", e),
    }
}
