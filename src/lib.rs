//! vidstudy - Study material from video transcripts
//!
//! Takes a video link, fetches its transcript, and asks a generative model
//! for a summary, a set of exercises, or a quiz. Results can be saved to a
//! per-user library.
//!
//! # Architecture
//!
//! The pipeline has three sequential stages, each with a typed failure:
//! - Extract: URL to an 11-character video id
//! - Resolve: video id to transcript text, preferring configured languages
//!   and falling back to a translated track
//! - Generate: transcript to study material via the model
//!
//! The first failing stage ends the run. External services sit behind the
//! [`adapters::TranscriptSource`] and [`adapters::GenerativeModel`] traits.
//!
//! # Modules
//!
//! - `adapters`: External system integrations (YouTube captions, Gemini)
//! - `core`: Pipeline logic (Extractor, Resolver, Generator, Orchestrator)
//! - `domain`: Data structures (VideoId, Transcript, ContentKind, Artifact)
//! - `library`: Users, sessions and saved artifacts (SQLite)
//! - `config`: YAML + environment configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Print a transcript
//! vidstudy transcript https://youtu.be/dQw4w9WgXcQ
//!
//! # Generate a quiz and save it
//! vidstudy generate https://youtu.be/dQw4w9WgXcQ --kind quiz --save -u alice
//!
//! # Browse saved items
//! vidstudy library -u alice
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use config::ResolvedConfig;
pub use core::{Orchestrator, PipelineError};
pub use domain::{ContentKind, GeneratedArtifact, PipelineOutcome, SavedArtifact, Transcript, VideoId};
pub use library::{Library, Session, User};
