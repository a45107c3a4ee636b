//! API credential lookup.
//!
//! The key is read from the environment first, then from local secrets files
//! (`<workspace>/.scopeseq/secrets.toml`, then the user config directory).
//! Each secrets file is a TOML table keyed by the same variable name:
//!
//! ```toml
//! KIDDOM_ANTHROPIC_API_KEY = "sk-ant-..."
//! ```

use crate::config::paths;
use crate::error::SequenceError;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SECRETS_FILE_NAME: &str = "secrets.toml";

/// Where a credential was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Environment(String),
    SecretsFile(PathBuf),
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Environment(var) => write!(f, "environment variable {}", var),
            CredentialSource::SecretsFile(path) => write!(f, "secrets file {}", path.display()),
        }
    }
}

/// A resolved API key. Never printed.
#[derive(Clone)]
pub struct ApiCredential {
    key: String,
    source: CredentialSource,
}

impl ApiCredential {
    pub fn new(key: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            key: key.into(),
            source,
        }
    }

    pub fn expose(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }
}

impl std::fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredential")
            .field("key", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Secrets files consulted after the environment, in lookup order.
pub fn secrets_paths(workspace_root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![paths::workspace_state_dir(workspace_root).join(SECRETS_FILE_NAME)];
    if let Some(dir) = paths::app_config_dir() {
        paths.push(dir.join(SECRETS_FILE_NAME));
    }
    paths
}

/// Resolve the credential named `env_var`, failing when no source provides it.
pub fn resolve_credential(env_var: &str, workspace_root: &Path) -> Result<ApiCredential, SequenceError> {
    if let Some(key) = std::env::var(env_var).ok().filter(|v| !v.trim().is_empty()) {
        debug!(env_var, "API key found in environment");
        return Ok(ApiCredential::new(
            key.trim(),
            CredentialSource::Environment(env_var.to_string()),
        ));
    }

    let searched = secrets_paths(workspace_root);
    for path in &searched {
        if let Some(key) = read_secret(path, env_var)? {
            debug!(path = %path.display(), "API key found in secrets file");
            return Ok(ApiCredential::new(
                key,
                CredentialSource::SecretsFile(path.clone()),
            ));
        }
    }

    Err(SequenceError::MissingCredential {
        env_var: env_var.to_string(),
        searched,
    })
}

fn read_secret(path: &Path, key: &str) -> Result<Option<String>, SequenceError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|e| {
        SequenceError::ConfigError(format!("Failed to read secrets file {}: {}", path.display(), e))
    })?;
    let table: toml::Table = content.parse().map_err(|e| {
        SequenceError::ConfigError(format!("Invalid secrets file {}: {}", path.display(), e))
    })?;
    Ok(table
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string))
}
