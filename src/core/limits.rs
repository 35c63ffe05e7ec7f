//! Size and time limits for pipeline execution.
//!
//! Bounds what is sent to and accepted from the generative model, and how
//! long each collaborator call may take.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits applied to each pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineLimits {
    /// Maximum prompt size in bytes (default: 1MB)
    #[serde(default = "default_max_prompt_bytes")]
    pub max_prompt_bytes: u64,

    /// Maximum model output size in bytes (default: 1MB)
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: u64,

    /// Per-request timeout for the transcript service (default: 30s)
    #[serde(default = "default_transcript_timeout")]
    pub transcript_timeout_seconds: u64,

    /// Timeout for one model call (default: 120s)
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_seconds: u64,
}

fn default_max_prompt_bytes() -> u64 {
    1024 * 1024
}
fn default_max_output_bytes() -> u64 {
    1024 * 1024
}
fn default_transcript_timeout() -> u64 {
    30
}
fn default_generation_timeout() -> u64 {
    120
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            max_prompt_bytes: default_max_prompt_bytes(),
            max_output_bytes: default_max_output_bytes(),
            transcript_timeout_seconds: default_transcript_timeout(),
            generation_timeout_seconds: default_generation_timeout(),
        }
    }
}

impl PipelineLimits {
    pub fn transcript_timeout(&self) -> Duration {
        Duration::from_secs(self.transcript_timeout_seconds)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_seconds)
    }

    /// Validate a prompt against the size limit
    pub fn validate_prompt(&self, prompt: &str) -> Result<(), LimitViolation> {
        let size = prompt.len() as u64;
        if size > self.max_prompt_bytes {
            return Err(LimitViolation::MaxPromptBytes {
                actual: size,
                limit: self.max_prompt_bytes,
            });
        }
        Ok(())
    }

    /// Validate model output against the size limit
    pub fn validate_output(&self, output: &str) -> Result<(), LimitViolation> {
        let size = output.len() as u64;
        if size > self.max_output_bytes {
            return Err(LimitViolation::MaxOutputBytes {
                actual: size,
                limit: self.max_output_bytes,
            });
        }
        Ok(())
    }
}

/// Limit violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitViolation {
    #[error("Prompt too large: {actual} > {limit} bytes")]
    MaxPromptBytes { actual: u64, limit: u64 },

    #[error("Model output too large: {actual} > {limit} bytes")]
    MaxOutputBytes { actual: u64, limit: u64 },
}
