//! Pipeline orchestrator.
//!
//! Runs extract -> resolve -> generate in sequence and stops at the first
//! failure, returning it unchanged.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{ContentKind, PipelineOutcome, TranscriptFailure, VideoId, VideoReference};

use super::extractor::matching_rule;
use super::generator::{ContentGenerator, GenerationFailure};
use super::resolver::{ResolvedTranscript, TranscriptResolver};

/// Uniform pipeline failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Invalid URL: no video id found in '{0}'")]
    InvalidUrl(String),

    #[error(transparent)]
    Transcript(#[from] TranscriptFailure),

    #[error("Transcript is empty; nothing to generate from")]
    EmptyTranscript,

    #[error(transparent)]
    Generation(#[from] GenerationFailure),
}

/// Main pipeline orchestrator
pub struct Orchestrator {
    resolver: TranscriptResolver,
    generator: ContentGenerator,
}

impl Orchestrator {
    /// Create an orchestrator from configured stages
    pub fn new(resolver: TranscriptResolver, generator: ContentGenerator) -> Self {
        Self {
            resolver,
            generator,
        }
    }

    /// Run the full pipeline for a URL
    #[instrument(skip(self), fields(run_id = %Uuid::new_v4()))]
    pub async fn run(&self, url: &str, kind: ContentKind) -> Result<PipelineOutcome, PipelineError> {
        let started = Instant::now();
        info!("Starting pipeline");

        let video_id = self.extract(url)?;
        let resolved = self.resolve(&video_id).await?;

        if resolved.transcript.is_blank() {
            warn!(%video_id, "Transcript is empty, skipping generation");
            return Err(PipelineError::EmptyTranscript);
        }

        let artifact = self
            .generator
            .generate(&resolved.transcript.text, kind)
            .await
            .map_err(|e| {
                error!(%video_id, error = %e, "Generation failed");
                PipelineError::from(e)
            })?;

        info!(
            %video_id,
            duration_ms = started.elapsed().as_millis() as u64,
            "Pipeline completed"
        );

        Ok(PipelineOutcome {
            video_id,
            title: resolved.title,
            transcript: resolved.transcript,
            artifact,
        })
    }

    fn extract(&self, url: &str) -> Result<VideoId, PipelineError> {
        let video_id = VideoReference::parse(url).id.ok_or_else(|| {
            warn!("No video id in URL");
            PipelineError::InvalidUrl(url.trim().to_string())
        })?;
        debug!(%video_id, rule = matching_rule(url).unwrap_or("unknown"), "Extracted video id");
        Ok(video_id)
    }

    async fn resolve(&self, video_id: &VideoId) -> Result<ResolvedTranscript, PipelineError> {
        self.resolver
            .resolve_with_title(video_id)
            .await
            .map_err(|e| {
                error!(%video_id, error = %e, "Transcript resolution failed");
                PipelineError::from(e)
            })
    }
}
