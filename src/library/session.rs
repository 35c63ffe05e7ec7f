//! Logged-in user context.

use chrono::{DateTime, Utc};

use super::accounts::User;

/// Proof of a successful login, passed to every per-user library operation
///
/// Only [`Library::login`](super::Library::login) creates one.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
    started_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(user: User) -> Self {
        Self {
            user,
            started_at: Utc::now(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
