//! Domain types for vidstudy.
//!
//! This module contains the core data structures:
//! - Video: identifiers and user-supplied references
//! - Transcript: caption tracks, segments and resolution outcomes
//! - Content: the closed set of content kinds and their templates
//! - Artifact: generated and saved study material

pub mod artifact;
pub mod content;
pub mod transcript;
pub mod video;

// Re-export commonly used types
pub use artifact::{GeneratedArtifact, PipelineOutcome, SavedArtifact};
pub use content::ContentKind;
pub use transcript::{
    CaptionTrack, Segment, TrackListing, Transcript, TranscriptFailure, TranscriptResult,
};
pub use video::{VideoId, VideoReference};
