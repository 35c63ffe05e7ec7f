//! Content kinds and their instruction templates.

use serde::{Deserialize, Serialize};

const SUMMARY_TEMPLATE: &str = "You are a study assistant. Summarize the following video \
transcript for a student. Start with a short overview paragraph, then list the key ideas \
as bullet points, then list any important terms with one-line definitions.\n\nTranscript:\n";

const EXERCISES_TEMPLATE: &str = "You are a teacher preparing practice material. Based on the \
following video transcript, write 5 exercises that check understanding of the material. \
Mix short-answer and applied problems, number them, and give a worked solution after each \
one.\n\nTranscript:\n";

const QUIZ_TEMPLATE: &str = "You are a teacher writing a quiz. Based on the following video \
transcript, write 10 multiple-choice questions with four options (A-D) each. Mark the \
correct option after every question and add a one-sentence explanation.\n\nTranscript:\n";

/// Kind of study material to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Summary,
    Exercises,
    Quiz,
}

impl ContentKind {
    /// Every kind, in display order
    pub const ALL: [ContentKind; 3] = [ContentKind::Summary, ContentKind::Exercises, ContentKind::Quiz];

    /// Instruction template placed before the transcript
    pub fn template(&self) -> &'static str {
        match self {
            ContentKind::Summary => SUMMARY_TEMPLATE,
            ContentKind::Exercises => EXERCISES_TEMPLATE,
            ContentKind::Quiz => QUIZ_TEMPLATE,
        }
    }

    /// Build the model prompt: template first, transcript appended
    pub fn prompt(&self, transcript: &str) -> String {
        let template = self.template();
        let mut prompt = String::with_capacity(template.len() + transcript.len());
        prompt.push_str(template);
        prompt.push_str(transcript);
        prompt
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Summary => "summary",
            ContentKind::Exercises => "exercises",
            ContentKind::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "summary" | "summarize" => Ok(ContentKind::Summary),
            "exercises" | "exercise" => Ok(ContentKind::Exercises),
            "quiz" => Ok(ContentKind::Quiz),
            _ => anyhow::bail!("Unknown content kind: {}", s),
        }
    }
}
