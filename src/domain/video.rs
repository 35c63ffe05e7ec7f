//! Video identifiers and references.

use serde::{Deserialize, Serialize};

use super::transcript::TranscriptFailure;

/// Length of a canonical video identifier
pub const VIDEO_ID_LEN: usize = 11;

/// Canonical 11-character video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Build an identifier, returning `None` unless the token is exactly
    /// 11 characters of `[A-Za-z0-9_-]`.
    pub fn new(token: &str) -> Option<Self> {
        let valid = token.len() == VIDEO_ID_LEN
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        valid.then(|| Self(token.to_string()))
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for VideoId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("Invalid video id: {}", value))
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

/// A user-supplied URL together with the identifier extracted from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    /// The URL as the user typed it
    pub url: String,

    /// Present only if extraction succeeded
    pub id: Option<VideoId>,
}

impl VideoReference {
    /// Parse a raw URL into a reference
    pub fn parse(url: impl Into<String>) -> Self {
        let url = url.into();
        let id = crate::core::extractor::extract(&url);
        Self { url, id }
    }

    /// Whether an identifier could be extracted
    pub fn is_valid(&self) -> bool {
        self.id.is_some()
    }

    /// The identifier, or `InvalidReference` when extraction failed
    pub fn require_id(&self) -> Result<&VideoId, TranscriptFailure> {
        self.id.as_ref().ok_or(TranscriptFailure::InvalidReference)
    }
}
