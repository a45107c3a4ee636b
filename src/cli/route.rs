//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::{Commands, GenerationArgs, InputArgs};
use crate::cli::presentation::{
    format_preview_json, format_preview_text, format_status_json, format_status_text,
    format_units_json, format_units_text, StatusReport, UnitsReport,
};
use crate::config::{ConfigLoader, ScopeSeqConfig};
use crate::credentials::resolve_credential;
use crate::error::SequenceError;
use crate::export::export_units_csv;
use crate::prompt::build_prompt;
use crate::sample::{map_sample, SampleUnit};
use crate::sequencer::Sequencer;
use crate::standards::{load_sample_assignments, SampleAssignment, StandardsTable};
use crate::units::{validate_units, ParseOutcome};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Files loaded for one command.
struct LoadedInputs {
    standards: StandardsTable,
    sample: Option<(Vec<SampleAssignment>, Vec<SampleUnit>)>,
    /// Problems with optional inputs that were skipped.
    notices: Vec<String>,
}

impl LoadedInputs {
    fn sample_units(&self) -> Option<&[SampleUnit]> {
        self.sample.as_ref().map(|(_, units)| units.as_slice())
    }

    fn sample_view(&self) -> Option<(&[SampleAssignment], &[SampleUnit])> {
        self.sample
            .as_ref()
            .map(|(assignments, units)| (assignments.as_slice(), units.as_slice()))
    }
}

/// How `generate` should present and persist its result.
#[derive(Debug, Clone, Default)]
pub struct GenerateOutput {
    pub format: String,
    pub export: Option<PathBuf>,
    pub validate: bool,
}

/// Runtime context for CLI execution: workspace and resolved configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: ScopeSeqConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, SequenceError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        config.validate().map_err(|errors| {
            SequenceError::ConfigError(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        Ok(Self {
            workspace_root,
            config_path,
            config,
        })
    }

    pub fn config(&self) -> &ScopeSeqConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, SequenceError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        debug!(
            command = command.name(),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, SequenceError> {
        match command {
            Commands::Preview { input, format } => self.handle_preview(input, format),
            Commands::Prompt { input, generation } => self.handle_prompt(input, generation),
            Commands::Generate {
                input,
                generation,
                format,
                export,
                no_validate,
            } => {
                let output = GenerateOutput {
                    format: format.clone(),
                    export: export.clone(),
                    validate: !*no_validate,
                };
                self.handle_generate(input, generation, &output)
            }
            Commands::Status { format } => self.handle_status(format),
        }
    }

    /// The standards file is required; a sample map that fails to load is
    /// dropped with a notice and the command continues without it.
    fn load_inputs(&self, input: &InputArgs) -> Result<LoadedInputs, SequenceError> {
        let standards = StandardsTable::load(&input.standards)?;
        let mut notices = Vec::new();
        let sample = match &input.sample {
            Some(path) => match load_sample_assignments(path) {
                Ok(assignments) => {
                    let units = map_sample(&standards, &assignments);
                    debug!(
                        assignments = assignments.len(),
                        units = units.len(),
                        "Sample sequence mapped"
                    );
                    Some((assignments, units))
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Sample map skipped");
                    notices.push(format!("{} ignored: {}", path.display(), e));
                    None
                }
            },
            None => None,
        };
        Ok(LoadedInputs {
            standards,
            sample,
            notices,
        })
    }

    fn handle_preview(&self, input: &InputArgs, format: &str) -> Result<String, SequenceError> {
        let inputs = self.load_inputs(input)?;
        if format == "json" {
            format_preview_json(&inputs.standards, inputs.sample_view(), &inputs.notices)
        } else {
            Ok(format_preview_text(
                &inputs.standards,
                inputs.sample_view(),
                &inputs.notices,
            ))
        }
    }

    fn handle_prompt(
        &self,
        input: &InputArgs,
        generation: &GenerationArgs,
    ) -> Result<String, SequenceError> {
        let config = generation.resolve(&self.config.generation);
        config.validate()?;
        let inputs = self.load_inputs(input)?;
        // stdout carries only the prompt text.
        for notice in &inputs.notices {
            eprintln!("Warning: {}", notice);
        }
        Ok(build_prompt(&inputs.standards, inputs.sample_units(), &config))
    }

    fn handle_generate(
        &self,
        input: &InputArgs,
        generation: &GenerationArgs,
        output: &GenerateOutput,
    ) -> Result<String, SequenceError> {
        // The key is checked before any file is read.
        let credential = resolve_credential(&self.config.provider.api_key_env, &self.workspace_root)?;
        info!(source = %credential.source(), "API key resolved");
        let sequencer = Sequencer::from_config(&self.config.provider, credential)?;
        self.run_generation(&sequencer, input, generation, output)
    }

    /// Run the pipeline with an already-built sequencer and render the result.
    pub fn run_generation(
        &self,
        sequencer: &Sequencer,
        input: &InputArgs,
        generation: &GenerationArgs,
        output: &GenerateOutput,
    ) -> Result<String, SequenceError> {
        let config = generation.resolve(&self.config.generation);
        config.validate()?;
        let mut inputs = self.load_inputs(input)?;

        let runtime = tokio::runtime::Runtime::new().map_err(|e| {
            SequenceError::ProviderError(format!("Failed to create runtime: {}", e))
        })?;
        let result = runtime.block_on(sequencer.generate(
            &inputs.standards,
            inputs.sample_units(),
            &config,
        ))?;

        let units = match result.outcome {
            ParseOutcome::Parsed(units) => units,
            ParseOutcome::Failed(failure) => {
                return Err(SequenceError::UnparsedResponse {
                    reason: failure.reason,
                    raw: failure.raw,
                })
            }
        };

        let issues = if output.validate {
            validate_units(&units, &inputs.standards)
        } else {
            Vec::new()
        };
        for issue in &issues {
            warn!(%issue, "Generated units check");
        }

        // Export errors become notices; the units are still rendered.
        let exported = match &output.export {
            Some(path) => match export_units_csv(&units, path) {
                Ok(()) => Some(path),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Export failed");
                    inputs.notices.push(e.to_string());
                    None
                }
            },
            None => None,
        };

        if output.format == "json" {
            let report = UnitsReport::new(
                &result.model,
                &result.usage,
                &units,
                &issues,
                &inputs.notices,
            );
            format_units_json(&report)
        } else {
            let mut text = format_units_text(&units, &issues, &inputs.notices);
            if let Some(path) = exported {
                text.push_str(&format!("\n\nExported {} units to {}", units.len(), path.display()));
            }
            Ok(text)
        }
    }

    fn handle_status(&self, format: &str) -> Result<String, SequenceError> {
        let provider = &self.config.provider;
        let credential_source = match resolve_credential(&provider.api_key_env, &self.workspace_root) {
            Ok(credential) => Some(credential.source().to_string()),
            Err(SequenceError::MissingCredential { .. }) => None,
            Err(e) => return Err(e),
        };

        let report = StatusReport {
            workspace: self.workspace_root.clone(),
            config_file: self.config_path.clone(),
            global_config: ConfigLoader::global_config_path(),
            model: provider.model.clone(),
            endpoint: provider.endpoint.clone(),
            max_tokens: provider.max_tokens,
            temperature: provider.temperature,
            api_key_env: provider.api_key_env.clone(),
            credential_source,
            generation: self.config.generation.clone(),
        };

        if format == "json" {
            format_status_json(&report)
        } else {
            Ok(format_status_text(&report))
        }
    }
}
