//! Saved artifacts, owned by users.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{ContentKind, PipelineOutcome, SavedArtifact};

use super::{parse_timestamp, stored_precision, timestamp, StoreError};

/// Artifact fields supplied by the caller when saving
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtifact {
    pub video_id: String,
    pub title: String,
    pub kind: ContentKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewArtifact {
    /// Build from a pipeline result; a blank `title` falls back to the
    /// video title, then the video id
    pub fn from_outcome(outcome: &PipelineOutcome, title: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| outcome.display_title());

        Self {
            video_id: outcome.video_id.to_string(),
            title,
            kind: outcome.artifact.kind,
            content: outcome.artifact.content.clone(),
            created_at: outcome.artifact.created_at,
        }
    }
}

const COLUMNS: &str = "id, user_id, video_id, title, kind, content, created_at";

/// Raw row before kind/timestamp parsing
struct ArtifactRow {
    id: i64,
    user_id: i64,
    video_id: String,
    title: String,
    kind: String,
    content: String,
    created_at: String,
}

impl ArtifactRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            video_id: row.get(2)?,
            title: row.get(3)?,
            kind: row.get(4)?,
            content: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_artifact(self) -> Result<SavedArtifact, StoreError> {
        let kind = self
            .kind
            .parse::<ContentKind>()
            .map_err(|e| StoreError::Corrupt(format!("artifact {}: {}", self.id, e)))?;

        Ok(SavedArtifact {
            id: self.id,
            user_id: self.user_id,
            video_id: self.video_id,
            title: self.title,
            kind,
            content: self.content,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Insert an artifact for `user_id`
pub fn insert(
    conn: &Connection,
    user_id: i64,
    artifact: &NewArtifact,
) -> Result<SavedArtifact, StoreError> {
    let created_at = stored_precision(artifact.created_at);
    conn.execute(
        "INSERT INTO artifacts (user_id, video_id, title, kind, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            artifact.video_id,
            artifact.title,
            artifact.kind.as_str(),
            artifact.content,
            timestamp(&created_at),
        ],
    )?;

    Ok(SavedArtifact {
        id: conn.last_insert_rowid(),
        user_id,
        video_id: artifact.video_id.clone(),
        title: artifact.title.clone(),
        kind: artifact.kind,
        content: artifact.content.clone(),
        created_at,
    })
}

/// A user's artifacts, newest first
pub fn list_for_user(
    conn: &Connection,
    user_id: i64,
    limit: Option<usize>,
) -> Result<Vec<SavedArtifact>, StoreError> {
    // SQLite treats a negative LIMIT as unbounded
    let limit = limit.map(|n| n as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM artifacts WHERE user_id = ?1
         ORDER BY created_at DESC, id DESC LIMIT ?2",
        COLUMNS
    ))?;

    let rows = stmt
        .query_map(params![user_id, limit], ArtifactRow::read)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(ArtifactRow::into_artifact).collect()
}

/// One artifact, only if `user_id` owns it
pub fn get_for_user(
    conn: &Connection,
    user_id: i64,
    id: i64,
) -> Result<Option<SavedArtifact>, StoreError> {
    conn.query_row(
        &format!(
            "SELECT {} FROM artifacts WHERE id = ?1 AND user_id = ?2",
            COLUMNS
        ),
        params![id, user_id],
        ArtifactRow::read,
    )
    .optional()?
    .map(ArtifactRow::into_artifact)
    .transpose()
}

/// Delete an artifact if `user_id` owns it; returns whether a row was removed
pub fn delete_for_user(conn: &Connection, user_id: i64, id: i64) -> Result<bool, StoreError> {
    let removed = conn.execute(
        "DELETE FROM artifacts WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(removed > 0)
}
