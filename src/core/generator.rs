//! Content generation from transcripts.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, instrument};

use crate::adapters::{GenerationSettings, GenerativeModel};
use crate::domain::{ContentKind, GeneratedArtifact};

use super::limits::{LimitViolation, PipelineLimits};
use super::retry::RetryPolicy;

/// Why generation failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("Generation failed: {0}")]
    Model(String),

    #[error("Model returned an empty response")]
    Empty,

    #[error("{0}")]
    PromptTooLarge(LimitViolation),

    #[error("{0}")]
    OutputTooLarge(LimitViolation),
}

/// Builds kind-specific prompts and calls the model
pub struct ContentGenerator {
    model: Arc<dyn GenerativeModel>,
    settings: GenerationSettings,
    limits: PipelineLimits,
    retry: RetryPolicy,
}

impl ContentGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        let limits = PipelineLimits::default();
        Self {
            model,
            settings: GenerationSettings {
                timeout: limits.generation_timeout(),
                ..Default::default()
            },
            limits,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.settings.temperature = temperature;
        self
    }

    pub fn with_limits(mut self, limits: PipelineLimits) -> Self {
        self.settings.timeout = limits.generation_timeout();
        self.limits = limits;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Generate study material of the given kind from transcript text
    #[instrument(skip(self, transcript), fields(model = %self.model.name(), transcript_bytes = transcript.len()))]
    pub async fn generate(
        &self,
        transcript: &str,
        kind: ContentKind,
    ) -> Result<GeneratedArtifact, GenerationFailure> {
        let prompt = kind.prompt(transcript);
        self.limits
            .validate_prompt(&prompt)
            .map_err(GenerationFailure::PromptTooLarge)?;

        let started = Instant::now();
        let output = self
            .retry
            .run("generate", || self.model.generate(&prompt, &self.settings))
            .await
            .map_err(|e| GenerationFailure::Model(e.to_string()))?;

        let content = output.content.trim();
        if content.is_empty() {
            return Err(GenerationFailure::Empty);
        }
        self.limits
            .validate_output(content)
            .map_err(GenerationFailure::OutputTooLarge)?;

        info!(
            %kind,
            duration_ms = started.elapsed().as_millis() as u64,
            output_bytes = content.len(),
            "Content generated"
        );

        Ok(GeneratedArtifact::new(kind, content.to_string()).with_tokens(output.tokens_used))
    }
}
