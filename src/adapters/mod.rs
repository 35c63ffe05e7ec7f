//! Adapter interfaces for external systems.
//!
//! The pipeline talks to two network services: a transcript service that
//! lists and fetches caption tracks, and a generative model. Both sit behind
//! traits so the core can be driven by in-memory fakes in tests.

pub mod gemini;
pub mod youtube;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CaptionTrack, Segment, TrackListing, VideoId};

pub use gemini::GeminiClient;
pub use youtube::YouTubeTranscripts;

/// Output from a generative model call
#[derive(Debug, Clone)]
pub struct AdapterOutput {
    /// The content returned by the adapter
    pub content: String,

    /// Tokens used (if available)
    pub tokens_used: Option<u64>,
}

impl AdapterOutput {
    /// Create a new adapter output with just content
    pub fn new(content: String) -> Self {
        Self {
            content,
            tokens_used: None,
        }
    }
}

/// Settings for a single generation call
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Errors raised by external collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },
}

impl AdapterError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Timeout(_) | AdapterError::Connection(_) => true,
            AdapterError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Classify a reqwest failure
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout(timeout)
        } else if err.is_decode() {
            AdapterError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            AdapterError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            AdapterError::Connection(err.to_string())
        }
    }
}

/// Transcript-listing collaborator
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// List the caption tracks available for a video
    async fn list_tracks(&self, video_id: &VideoId) -> Result<TrackListing, AdapterError>;

    /// Fetch a track's segments, optionally machine-translated
    async fn fetch(
        &self,
        video_id: &VideoId,
        track: &CaptionTrack,
        translate_to: Option<&str>,
    ) -> Result<Vec<Segment>, AdapterError>;
}

/// Generative-model collaborator
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Generate text for a prompt
    async fn generate(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<AdapterOutput, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(AdapterError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(AdapterError::Connection("reset".into()).is_transient());
        assert!(AdapterError::Http {
            status: 503,
            body: String::new()
        }
        .is_transient());

        assert!(!AdapterError::Http {
            status: 429,
            body: "quota".into()
        }
        .is_transient());
        assert!(!AdapterError::TranscriptsDisabled("x".into()).is_transient());
        assert!(!AdapterError::Malformed("bad".into()).is_transient());
    }

    #[test]
    fn test_default_generation_settings() {
        let settings = GenerationSettings::default();
        assert!((settings.temperature - 0.7).abs() < f32::EPSILON);
    }
}
