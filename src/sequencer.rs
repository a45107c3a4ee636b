//! Pipeline: build the request, make the one remote call, decode the reply.
//!
//! A [`Sequencer`] owns the provider client and the request settings. It is
//! built once from configuration and never mutated afterwards.

use crate::credentials::ApiCredential;
use crate::error::SequenceError;
use crate::prompt::{build_prompt, GenerationConfig};
use crate::provider::{
    AnthropicClient, ChatMessage, CompletionOptions, ModelProviderClient, ProviderConfig,
    TokenUsage,
};
use crate::sample::SampleUnit;
use crate::standards::StandardsTable;
use crate::units::{parse_units, ParseOutcome};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fixed parts of every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSettings {
    pub system_prompt: String,
    pub options: CompletionOptions,
}

impl RequestSettings {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            system_prompt: config.system_prompt.clone(),
            options: config.completion_options(),
        }
    }
}

/// Everything one generation produced.
#[derive(Debug, Clone)]
pub struct Generation {
    pub prompt: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
    pub outcome: ParseOutcome,
}

pub struct Sequencer {
    client: Box<dyn ModelProviderClient>,
    settings: RequestSettings,
}

impl Sequencer {
    pub fn new(client: Box<dyn ModelProviderClient>, settings: RequestSettings) -> Self {
        Self { client, settings }
    }

    /// Build the Anthropic-backed pipeline.
    pub fn from_config(
        config: &ProviderConfig,
        credential: ApiCredential,
    ) -> Result<Self, SequenceError> {
        let client = AnthropicClient::new(
            config.model.clone(),
            credential.expose().to_string(),
            Some(config.endpoint.clone()),
        )?;
        Ok(Self::new(Box::new(client), RequestSettings::from_config(config)))
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Group `standards` into units.
    ///
    /// Remote failures are errors. A reply that does not decode is not: it
    /// comes back as [`ParseOutcome::Failed`] inside the [`Generation`].
    pub async fn generate(
        &self,
        standards: &StandardsTable,
        sample_units: Option<&[SampleUnit]>,
        config: &GenerationConfig,
    ) -> Result<Generation, SequenceError> {
        config.validate()?;

        let prompt = build_prompt(standards, sample_units, config);
        debug!(
            standards = standards.len(),
            sample_units = sample_units.map_or(0, |units| units.len()),
            prompt_chars = prompt.len(),
            "Request built"
        );

        let messages = vec![
            ChatMessage::system(self.settings.system_prompt.clone()),
            ChatMessage::user(prompt.clone()),
        ];

        let started = Instant::now();
        let response = self
            .client
            .complete(messages, self.settings.options.clone())
            .await?;
        info!(
            provider = self.client.provider_name(),
            model = %response.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            completion_tokens = response.usage.completion_tokens,
            "Remote call completed"
        );

        if response.finish_reason.as_deref() == Some("max_tokens") {
            warn!("Response hit the max_tokens limit and is probably truncated");
        }

        let outcome = parse_units(&response.content);
        match &outcome {
            ParseOutcome::Parsed(units) => debug!(units = units.len(), "Response parsed"),
            ParseOutcome::Failed(failure) => {
                warn!(reason = %failure.reason, "Response could not be parsed")
            }
        }

        Ok(Generation {
            prompt,
            model: response.model,
            usage: response.usage,
            finish_reason: response.finish_reason,
            outcome,
        })
    }
}
