//! Per-user library of saved study material.
//!
//! Users register with a username and password, log in to obtain a
//! [`Session`], and save, list, show and delete artifacts they own.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.vidstudy/
//! └── vidstudy.db            # SQLite
//!     ├── users              # id, username (unique), password_hash, created_at
//!     └── artifacts          # id, user_id, video_id, title, kind, content, created_at
//! ```
//!
//! Every operation borrows one connection from a bounded pool and returns
//! it when done.

pub mod accounts;
pub mod artifacts;
pub mod password;
pub mod pool;
pub mod session;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::{PipelineOutcome, SavedArtifact};

pub use accounts::User;
pub use artifacts::NewArtifact;
pub use pool::ConnectionPool;
pub use session::Session;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection pool is closed")]
    PoolClosed,

    #[error("Database task failed: {0}")]
    Task(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Registration and login failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Timestamps are stored as fixed-width RFC 3339 UTC so text order is time order
pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Truncate to the precision `timestamp` keeps
pub(crate) fn stored_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{}': {}", raw, e)))
}

/// Library facade over the connection pool
#[derive(Clone)]
pub struct Library {
    pool: Arc<ConnectionPool>,
    password_iterations: u32,
}

impl Library {
    /// Open (or create) the library database
    pub fn open(
        path: impl AsRef<Path>,
        pool_size: usize,
        password_iterations: u32,
    ) -> Result<Self, StoreError> {
        let pool = ConnectionPool::open(path.as_ref(), pool_size)?;
        Ok(Self {
            pool: Arc::new(pool),
            password_iterations: password_iterations.max(1),
        })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Create an account; the password is stored salted and hashed
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = accounts::validate_username(username)?;
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password must not be empty".into()));
        }

        let password = password.to_string();
        let iterations = self.password_iterations;
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&password, iterations))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?;

        let user = self
            .pool
            .with_conn(move |conn| {
                Ok(accounts::insert_user(conn, &username, &hash))
            })
            .await??;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and start a session
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let username = username.trim().to_string();
        let credentials = self
            .pool
            .with_conn(move |conn| accounts::find_credentials(conn, &username))
            .await?;

        // Unknown users still run one verification at the configured cost
        let password = password.to_string();
        let placeholder = password::placeholder_hash(self.password_iterations);
        let user = tokio::task::spawn_blocking(move || match credentials {
            Some((user, hash)) => password::verify_password(&password, &hash).then_some(user),
            None => {
                password::verify_password(&password, &placeholder);
                None
            }
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?;

        match user {
            Some(user) => {
                info!(user_id = user.id, "User logged in");
                Ok(Session::new(user))
            }
            None => {
                warn!("Login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Persist an artifact for the session's user
    pub async fn insert(
        &self,
        session: &Session,
        artifact: NewArtifact,
    ) -> Result<SavedArtifact, StoreError> {
        let user_id = session.user_id();
        self.pool
            .with_conn(move |conn| artifacts::insert(conn, user_id, &artifact))
            .await
    }

    /// Save a pipeline result; failures are logged and reported as `false`
    #[instrument(skip(self, session, outcome), fields(user_id = session.user_id(), video_id = %outcome.video_id))]
    pub async fn save(&self, session: &Session, outcome: &PipelineOutcome, title: Option<&str>) -> bool {
        match self.insert(session, NewArtifact::from_outcome(outcome, title)).await {
            Ok(saved) => {
                info!(artifact_id = saved.id, kind = %saved.kind, "Artifact saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to save artifact");
                false
            }
        }
    }

    /// The session user's artifacts, newest first
    pub async fn list(
        &self,
        session: &Session,
        limit: Option<usize>,
    ) -> Result<Vec<SavedArtifact>, StoreError> {
        let user_id = session.user_id();
        self.pool
            .with_conn(move |conn| artifacts::list_for_user(conn, user_id, limit))
            .await
    }

    /// One artifact, if the session user owns it
    pub async fn get(&self, session: &Session, id: i64) -> Result<Option<SavedArtifact>, StoreError> {
        let user_id = session.user_id();
        self.pool
            .with_conn(move |conn| artifacts::get_for_user(conn, user_id, id))
            .await
    }

    /// Delete an artifact; `false` when it does not exist or belongs to
    /// someone else
    #[instrument(skip(self, session), fields(user_id = session.user_id()))]
    pub async fn delete(&self, session: &Session, id: i64) -> Result<bool, StoreError> {
        let user_id = session.user_id();
        let removed = self
            .pool
            .with_conn(move |conn| artifacts::delete_for_user(conn, user_id, id))
            .await?;

        if removed {
            info!(artifact_id = id, "Artifact deleted");
        } else {
            warn!(artifact_id = id, "Nothing deleted: not found or not owned");
        }
        Ok(removed)
    }
}
