//! CLI parse: clap types for scopeseq. Definitions plus flag folding only.

use crate::config::GenerationDefaults;
use crate::prompt::GenerationConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// scopeseq - group curriculum standards into instructional units
#[derive(Parser, Debug)]
#[command(name = "scopeseq")]
#[command(about = "Build a scope & sequence of instructional units from curriculum standards")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/ and .scopeseq/ live here)
    #[arg(long, default_value = ".", global = true)]
    pub workspace: PathBuf,

    /// Configuration file path (replaces global and workspace config files)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the loaded standards, the sample map and the derived sample units
    ///
    /// Runs without an API key.
    Preview {
        #[command(flatten)]
        input: InputArgs,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Print the request that would be sent, without calling the model
    ///
    /// Runs without an API key.
    Prompt {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// Generate units with the model
    ///
    /// Stops before reading any file when no API key is found.
    Generate {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        generation: GenerationArgs,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
        /// Also write the units to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Skip cross-checking units against the standards file
        #[arg(long)]
        no_validate: bool,
    },
    /// Show resolved provider settings and credential status
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

impl Commands {
    /// Whether the command needs an API key before doing anything else.
    pub fn requires_credential(&self) -> bool {
        matches!(self, Commands::Generate { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Commands::Preview { .. } => "preview",
            Commands::Prompt { .. } => "prompt",
            Commands::Generate { .. } => "generate",
            Commands::Status { .. } => "status",
        }
    }
}

/// Uploaded files.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Standards file (.csv, .tsv or .json) with 'id' and 'description' columns
    #[arg(long)]
    pub standards: PathBuf,

    /// Optional sample map with 'id' and 'unit_title' columns
    #[arg(long)]
    pub sample: Option<PathBuf>,
}

/// Per-run overrides of the configured generation defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Ask for exactly N units
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..), conflicts_with = "any_count")]
    pub units: Option<u32>,

    /// Let the model choose the number of units
    #[arg(long)]
    pub any_count: bool,

    /// Ask for units grouped by theme
    #[arg(long, conflicts_with = "no_theme")]
    pub theme: bool,

    /// Do not ask for thematic grouping
    #[arg(long)]
    pub no_theme: bool,
}

impl GenerationArgs {
    /// Fold flags over the configured defaults.
    pub fn resolve(&self, defaults: &GenerationDefaults) -> GenerationConfig {
        let mut config = defaults.to_generation_config();
        if self.any_count {
            config.unit_count = None;
        } else if let Some(units) = self.units {
            config.unit_count = Some(units);
        }
        if self.theme {
            config.group_by_theme = true;
        } else if self.no_theme {
            config.group_by_theme = false;
        }
        config
    }
}
