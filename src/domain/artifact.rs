//! Artifacts produced by the content generator.
//!
//! A `GeneratedArtifact` is transient and lives with the caller until it is
//! either dropped or saved into the library as a `SavedArtifact`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::ContentKind;
use super::transcript::Transcript;
use super::video::VideoId;

/// Text generated for a content request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Kind of material requested
    pub kind: ContentKind,

    /// Model output, trimmed
    pub content: String,

    /// When the artifact was created
    pub created_at: DateTime<Utc>,

    /// Size in bytes (for tracking)
    pub size_bytes: u64,

    /// Tokens used (if the model reported it)
    pub tokens_used: Option<u64>,
}

impl GeneratedArtifact {
    /// Create a new artifact
    pub fn new(kind: ContentKind, content: String) -> Self {
        let size_bytes = content.len() as u64;
        Self {
            kind,
            content,
            created_at: Utc::now(),
            size_bytes,
            tokens_used: None,
        }
    }

    pub fn with_tokens(mut self, tokens_used: Option<u64>) -> Self {
        self.tokens_used = tokens_used;
        self
    }
}

/// An artifact persisted in a user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedArtifact {
    pub id: i64,
    pub user_id: i64,
    pub video_id: String,
    pub title: String,
    pub kind: ContentKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Successful pipeline result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub video_id: VideoId,

    /// Video title when the transcript service knows it
    pub title: Option<String>,

    pub transcript: Transcript,

    pub artifact: GeneratedArtifact,
}

impl PipelineOutcome {
    /// Title to show or save, falling back to the video id
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.video_id.to_string())
    }
}
