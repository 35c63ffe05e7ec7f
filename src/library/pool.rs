//! Bounded SQLite connection pool.
//!
//! Connections are acquired per operation and returned right after it. At
//! most `size` operations hold a connection at once; the rest wait on the
//! semaphore. SQLite work runs on the blocking thread pool.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use tokio::sync::Semaphore;
use tracing::debug;

use super::StoreError;

/// Default number of pooled connections
pub const DEFAULT_POOL_SIZE: usize = 3;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS artifacts (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    video_id   TEXT NOT NULL,
    title      TEXT NOT NULL,
    kind       TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_artifacts_user_created
    ON artifacts(user_id, created_at DESC);
"#;

/// Pool of SQLite connections to one database file
pub struct ConnectionPool {
    path: PathBuf,
    size: usize,
    idle: Mutex<Vec<Connection>>,
    permits: Semaphore,
}

impl ConnectionPool {
    /// Open the database, creating it and its schema if needed
    pub fn open(path: impl Into<PathBuf>, size: usize) -> Result<Self, StoreError> {
        let path = path.into();
        let size = size.max(1);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = connect(&path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), size, "Opened database");

        Ok(Self {
            path,
            size,
            idle: Mutex::new(vec![conn]),
            permits: Semaphore::new(size),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of connections currently idle in the pool
    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    /// Run `op` with a pooled connection
    pub async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| StoreError::PoolClosed)?;

        let conn = match self.take_idle() {
            Some(conn) => conn,
            None => connect(&self.path)?,
        };

        let (conn, result) = tokio::task::spawn_blocking(move || {
            let mut conn = conn;
            let result = op(&mut conn);
            (conn, result)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?;

        self.return_idle(conn);
        result
    }

    fn take_idle(&self) -> Option<Connection> {
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
    }

    fn return_idle(&self, conn: Connection) {
        let mut idle = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if idle.len() < self.size {
            idle.push(conn);
        }
    }
}

fn connect(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(conn)
}

/// Create the schema on an existing connection (used by in-memory tests)
pub fn migrate(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
