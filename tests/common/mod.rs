//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use vidstudy::adapters::{
    AdapterError, AdapterOutput, GenerationSettings, GenerativeModel, TranscriptSource,
};
use vidstudy::core::RetryPolicy;
use vidstudy::domain::{CaptionTrack, Segment, TrackListing, VideoId};

pub fn track(lang: &str, generated: bool, translatable: bool) -> CaptionTrack {
    CaptionTrack {
        language_code: lang.to_string(),
        language_name: lang.to_string(),
        is_generated: generated,
        is_translatable: translatable,
        location: format!("mem://{}/{}", lang, if generated { "asr" } else { "manual" }),
    }
}

pub fn segments(texts: &[&str]) -> Vec<Segment> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Segment::new(*t, i as f64, 1.0))
        .collect()
}

/// Retry policy with millisecond delays
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        backoff_multiplier: 2.0,
    }
}

/// A fetch the source was asked to perform
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub language: String,
    pub generated: bool,
    pub translate_to: Option<String>,
}

/// Transcript source serving a fixed listing
pub struct FakeSource {
    listing: TrackListing,
    /// Segments keyed by track language (translations get the translated text)
    segments: HashMap<String, Vec<Segment>>,
    translated: Vec<Segment>,
    list_failures: Mutex<VecDeque<AdapterError>>,
    fetch_failures: Mutex<VecDeque<AdapterError>>,
    list_calls: AtomicUsize,
    fetches: Mutex<Vec<FetchCall>>,
}

impl FakeSource {
    pub fn new(tracks: Vec<CaptionTrack>) -> Self {
        Self {
            listing: TrackListing {
                title: Some("Test Video".to_string()),
                tracks,
            },
            segments: HashMap::new(),
            translated: Vec::new(),
            list_failures: Mutex::new(VecDeque::new()),
            fetch_failures: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            fetches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_segments(mut self, lang: &str, texts: &[&str]) -> Self {
        self.segments.insert(lang.to_string(), segments(texts));
        self
    }

    pub fn with_translation(mut self, texts: &[&str]) -> Self {
        self.translated = segments(texts);
        self
    }

    pub fn with_title(mut self, title: Option<&str>) -> Self {
        self.listing.title = title.map(str::to_string);
        self
    }

    /// Queue errors returned by the next `list_tracks` calls
    pub fn failing_first(self, errors: Vec<AdapterError>) -> Self {
        *self.list_failures.lock().unwrap() = errors.into();
        self
    }

    /// Queue errors returned by the next `fetch` calls
    pub fn failing_fetches(self, errors: Vec<AdapterError>) -> Self {
        *self.fetch_failures.lock().unwrap() = errors.into();
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> Vec<FetchCall> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.fetches().len()
    }
}

#[async_trait]
impl TranscriptSource for FakeSource {
    fn name(&self) -> &str {
        "fake-source"
    }

    async fn list_tracks(&self, _video_id: &VideoId) -> Result<TrackListing, AdapterError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.list_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(self.listing.clone())
    }

    async fn fetch(
        &self,
        _video_id: &VideoId,
        track: &CaptionTrack,
        translate_to: Option<&str>,
    ) -> Result<Vec<Segment>, AdapterError> {
        self.fetches.lock().unwrap().push(FetchCall {
            language: track.language_code.clone(),
            generated: track.is_generated,
            translate_to: translate_to.map(str::to_string),
        });

        if let Some(err) = self.fetch_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        if translate_to.is_some() {
            return Ok(self.translated.clone());
        }
        Ok(self
            .segments
            .get(&track.language_code)
            .cloned()
            .unwrap_or_default())
    }
}

/// Model that records prompts and replays scripted responses
pub struct FakeModel {
    responses: Mutex<VecDeque<Result<String, AdapterError>>>,
    fallback: String,
    prompts: Mutex<Vec<String>>,
    temperatures: Mutex<Vec<f32>>,
}

impl FakeModel {
    /// Always answers with `reply`
    pub fn replying(reply: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
            temperatures: Mutex::new(Vec::new()),
        }
    }

    /// Answers from `script` in order, then with `reply`
    pub fn scripted(script: Vec<Result<String, AdapterError>>, reply: &str) -> Self {
        let model = Self::replying(reply);
        *model.responses.lock().unwrap() = script.into();
        model
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn temperatures(&self) -> Vec<f32> {
        self.temperatures.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    fn name(&self) -> &str {
        "fake-model"
    }

    async fn generate(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<AdapterOutput, AdapterError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.temperatures.lock().unwrap().push(settings.temperature);

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(AdapterOutput::new(content)),
            Some(Err(err)) => Err(err),
            None => Ok(AdapterOutput::new(self.fallback.clone())),
        }
    }
}
