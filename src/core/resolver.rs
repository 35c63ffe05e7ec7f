//! Transcript resolution with language fallback.
//!
//! Selection order:
//! 1. a track in one of the preferred languages (manual before generated)
//! 2. the first translatable track, in the collaborator's listing order,
//!    translated to the primary language
//! 3. otherwise `NoUsableTranscript`

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::adapters::{AdapterError, TranscriptSource};
use crate::domain::{
    CaptionTrack, TrackListing, Transcript, TranscriptFailure, TranscriptResult, VideoId,
};

use super::retry::RetryPolicy;

/// Default preferred languages, primary first
pub const DEFAULT_LANGUAGES: [&str; 2] = ["en", "en-US"];

/// Resolved transcript together with the title the listing reported
#[derive(Debug, Clone)]
pub struct ResolvedTranscript {
    pub title: Option<String>,
    pub transcript: Transcript,
}

/// How a track was chosen
#[derive(Debug, Clone, Copy)]
enum Selection<'a> {
    Preferred(&'a CaptionTrack),
    Translated(&'a CaptionTrack),
}

/// Resolves a video id into transcript text
pub struct TranscriptResolver {
    source: Arc<dyn TranscriptSource>,
    languages: Vec<String>,
    retry: RetryPolicy,
}

impl TranscriptResolver {
    /// Create a resolver with the default language preferences
    pub fn new(source: Arc<dyn TranscriptSource>) -> Self {
        Self {
            source,
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the preferred languages (the first one is the translation target)
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        if !languages.is_empty() {
            self.languages = languages;
        }
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Language that translations target
    pub fn primary_language(&self) -> &str {
        self.languages
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_LANGUAGES[0])
    }

    /// Resolve transcript text for a video
    pub async fn resolve(&self, video_id: &VideoId) -> TranscriptResult {
        self.resolve_with_title(video_id)
            .await
            .map(|resolved| resolved.transcript)
    }

    /// Resolve transcript text, keeping the title the listing reported
    #[instrument(skip(self), fields(source = %self.source.name()))]
    pub async fn resolve_with_title(
        &self,
        video_id: &VideoId,
    ) -> Result<ResolvedTranscript, TranscriptFailure> {
        let listing = self
            .retry
            .run("list_tracks", || self.source.list_tracks(video_id))
            .await
            .map_err(|e| match e {
                AdapterError::TranscriptsDisabled(_) => TranscriptFailure::TranscriptsDisabled,
                other => TranscriptFailure::Upstream(other.to_string()),
            })?;

        debug!(tracks = listing.tracks.len(), "Listed caption tracks");

        let selection = self.select(&listing).ok_or_else(|| {
            warn!(
                available = ?listing.tracks.iter().map(|t| t.language_code.as_str()).collect::<Vec<_>>(),
                "No usable transcript track"
            );
            TranscriptFailure::NoUsableTranscript
        })?;

        let (track, translate_to) = match selection {
            Selection::Preferred(track) => (track, None),
            Selection::Translated(track) => (track, Some(self.primary_language())),
        };

        let segments = self
            .retry
            .run("fetch_transcript", || {
                self.source.fetch(video_id, track, translate_to)
            })
            .await
            .map_err(|e| TranscriptFailure::Upstream(e.to_string()))?;

        let language = translate_to.unwrap_or(track.language_code.as_str());
        let transcript = Transcript::from_segments(&segments, language, translate_to.is_some());

        info!(
            language = %transcript.language_code,
            from = %track.language_code,
            translated = transcript.translated,
            segments = transcript.segment_count,
            "Transcript resolved"
        );

        Ok(ResolvedTranscript {
            title: listing.title.clone(),
            transcript,
        })
    }

    fn select<'a>(&self, listing: &'a TrackListing) -> Option<Selection<'a>> {
        find_preferred(&listing.tracks, &self.languages)
            .map(Selection::Preferred)
            .or_else(|| {
                listing
                    .tracks
                    .iter()
                    .find(|t| t.is_translatable)
                    .map(Selection::Translated)
            })
    }
}

/// First track matching the preferred languages in order; for each
/// language a manually created track wins over a generated one
fn find_preferred<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut candidates = tracks.iter().filter(|t| &t.language_code == lang);
        let manual = candidates.clone().find(|t| !t.is_generated);
        manual.or_else(|| candidates.next())
    })
}
