//! Configuration System
//!
//! Layered configuration: built-in defaults, a user-level file, workspace
//! files and environment overrides, deserialized once at startup into a
//! read-only [`ScopeSeqConfig`].

use crate::logging::LoggingConfig;
use crate::prompt::GenerationConfig;
use serde::{Deserialize, Serialize};

pub use crate::provider::ProviderConfig;

mod facade;
mod merge;
pub mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use merge::merge_policy::{DEFAULT_GROUP_BY_THEME, DEFAULT_UNIT_COUNT};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeSeqConfig {
    /// Remote call settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Default generation options, overridable per command
    #[serde(default)]
    pub generation: GenerationDefaults,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default generation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationDefaults {
    /// Number of units to request; 0 means no count directive.
    #[serde(default = "default_unit_count")]
    pub unit_count: u32,

    #[serde(default = "default_group_by_theme")]
    pub group_by_theme: bool,
}

fn default_unit_count() -> u32 {
    DEFAULT_UNIT_COUNT
}

fn default_group_by_theme() -> bool {
    DEFAULT_GROUP_BY_THEME
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            unit_count: default_unit_count(),
            group_by_theme: default_group_by_theme(),
        }
    }
}

impl GenerationDefaults {
    pub fn to_generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            unit_count: (self.unit_count > 0).then_some(self.unit_count),
            group_by_theme: self.group_by_theme,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Provider(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ScopeSeqConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(provider_errors) = self.provider.validate() {
            errors.extend(provider_errors.into_iter().map(ValidationError::Provider));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
