//! Transcript tracks, segments and resolution outcomes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single spoken segment of a caption track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// One language-specific caption stream for a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Language code, e.g. "en" or "hi"
    pub language_code: String,

    /// Human-readable language name
    pub language_name: String,

    /// Whether the track was produced by speech recognition
    pub is_generated: bool,

    /// Whether the collaborator can machine-translate this track
    pub is_translatable: bool,

    /// Opaque location the collaborator fetches the track from
    pub location: String,
}

/// Tracks available for a video, in the order the collaborator returned them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackListing {
    pub title: Option<String>,
    pub tracks: Vec<CaptionTrack>,
}

/// A resolved transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Segment texts joined by single spaces
    pub text: String,

    /// Language the text is in
    pub language_code: String,

    /// Number of segments fetched (including empty ones)
    pub segment_count: usize,

    /// Whether the text came from machine translation
    pub translated: bool,
}

impl Transcript {
    /// Build a transcript from ordered segments
    pub fn from_segments(segments: &[Segment], language_code: &str, translated: bool) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            text,
            language_code: language_code.to_string(),
            segment_count: segments.len(),
            translated,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Why a transcript could not be obtained
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptFailure {
    #[error("Invalid video reference")]
    InvalidReference,

    #[error("Transcripts are disabled for this video")]
    TranscriptsDisabled,

    #[error("No transcript in a usable language")]
    NoUsableTranscript,

    #[error("Transcript service error: {0}")]
    Upstream(String),
}

/// Outcome of transcript resolution
pub type TranscriptResult = Result<Transcript, TranscriptFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_joins_segments_in_order() {
        let segments = vec![
            Segment::new("hello", 0.0, 1.0),
            Segment::new(" world ", 1.0, 1.0),
        ];
        let transcript = Transcript::from_segments(&segments, "en", false);

        assert_eq!(transcript.text, "hello world");
        assert_eq!(transcript.segment_count, 2);
        assert!(!transcript.translated);
    }

    #[test]
    fn test_transcript_skips_empty_segments() {
        let segments = vec![
            Segment::new("a", 0.0, 1.0),
            Segment::new("", 1.0, 1.0),
            Segment::new("b", 2.0, 1.0),
        ];
        let transcript = Transcript::from_segments(&segments, "en", false);
        assert_eq!(transcript.text, "a b");
    }

    #[test]
    fn test_empty_transcript_is_blank() {
        let transcript = Transcript::from_segments(&[], "en", false);
        assert!(transcript.is_blank());
        assert_eq!(transcript.segment_count, 0);
    }
}
