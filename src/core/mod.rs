//! Core pipeline logic.
//!
//! This module contains:
//! - Extractor: URL to video identifier
//! - Resolver: identifier to transcript, with language fallback
//! - Generator: transcript to study material
//! - Orchestrator: the three stages in sequence
//! - Retry / Limits: shared execution policy

pub mod extractor;
pub mod generator;
pub mod limits;
pub mod orchestrator;
pub mod resolver;
pub mod retry;

// Re-export commonly used types
pub use extractor::extract;
pub use generator::{ContentGenerator, GenerationFailure};
pub use limits::{LimitViolation, PipelineLimits};
pub use orchestrator::{Orchestrator, PipelineError};
pub use resolver::{ResolvedTranscript, TranscriptResolver, DEFAULT_LANGUAGES};
pub use retry::RetryPolicy;
