//! Merge rules: defaults, override order, conflict handling.
//!
//! Sources are added lowest precedence first: defaults, global file,
//! workspace files, environment. Later sources replace individual keys, not
//! whole sections.

use crate::provider::{
    DEFAULT_API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TEMPERATURE,
};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

pub const DEFAULT_UNIT_COUNT: u32 = 6;
pub const DEFAULT_GROUP_BY_THEME: bool = true;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("provider.model", DEFAULT_MODEL)?
        .set_default("provider.endpoint", DEFAULT_ENDPOINT)?
        .set_default("provider.api_key_env", DEFAULT_API_KEY_ENV)?
        .set_default("provider.max_tokens", DEFAULT_MAX_TOKENS as i64)?
        .set_default("provider.temperature", DEFAULT_TEMPERATURE as f64)?
        .set_default("provider.system_prompt", DEFAULT_SYSTEM_PROMPT)?
        .set_default("generation.unit_count", DEFAULT_UNIT_COUNT as i64)?
        .set_default("generation.group_by_theme", DEFAULT_GROUP_BY_THEME)
}
