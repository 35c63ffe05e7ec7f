//! Video identifier extraction.
//!
//! Applies an ordered list of URL rules and returns the token captured by
//! the first rule that matches. Total: malformed input yields `None`.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::VideoId;

/// Recognized URL shapes, in match order
const RULES: [(&str, &str); 4] = [
    (
        "watch",
        r"(?i)(?:^|[/.])youtube\.com/watch\?(?:[^#\s]*&)?v=([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    ),
    (
        "short",
        r"(?i)(?:^|[/.])youtu\.be/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    ),
    (
        "shorts",
        r"(?i)(?:^|[/.])youtube\.com/shorts/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    ),
    (
        "embed",
        r"(?i)(?:^|[/.])youtube\.com/embed/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    ),
];

fn rules() -> &'static [(&'static str, Regex)] {
    static COMPILED: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .map(|(name, pattern)| (*name, Regex::new(pattern).expect("valid extractor regex")))
            .collect()
    })
}

/// Extract the canonical identifier from a video URL
pub fn extract(url: &str) -> Option<VideoId> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    rules().iter().find_map(|(_, pattern)| {
        pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .and_then(|m| VideoId::new(m.as_str()))
    })
}

/// Name of the rule that recognizes this URL (for diagnostics)
pub fn matching_rule(url: &str) -> Option<&'static str> {
    let url = url.trim();
    rules()
        .iter()
        .find(|(_, pattern)| pattern.is_match(url))
        .map(|(name, _)| *name)
}
