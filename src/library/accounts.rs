//! User accounts.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{parse_timestamp, stored_precision, timestamp, AuthError, StoreError};

/// Maximum username length in characters
pub const MAX_USERNAME_LEN: usize = 64;

/// A registered user (the password hash never leaves this module)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Normalize and check a username
pub fn validate_username(username: &str) -> Result<String, AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::InvalidInput("username must not be empty".into()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AuthError::InvalidInput(format!(
            "username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidInput(
            "username must not contain whitespace".into(),
        ));
    }
    Ok(username.to_string())
}

/// Insert a new user with an already hashed password
pub fn insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
) -> Result<User, AuthError> {
    let created_at = stored_precision(Utc::now());
    let inserted = conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, timestamp(&created_at)],
    );

    match inserted {
        Ok(_) => Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            created_at,
        }),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(AuthError::DuplicateUsername(username.to_string()))
        }
        Err(e) => Err(StoreError::from(e).into()),
    }
}

/// Look up a user and their stored password hash
pub fn find_credentials(
    conn: &Connection,
    username: &str,
) -> Result<Option<(User, String)>, StoreError> {
    let row = conn
        .query_row(
            "SELECT id, username, created_at, password_hash FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, username, created_at, hash)| {
        Ok((
            User {
                id,
                username,
                created_at: parse_timestamp(&created_at)?,
            },
            hash,
        ))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::pool::migrate;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("  alice ").unwrap(), "alice");
        assert!(matches!(validate_username("   "), Err(AuthError::InvalidInput(_))));
        assert!(matches!(validate_username("a b"), Err(AuthError::InvalidInput(_))));
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LEN)).is_ok());
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_insert_and_find() {
        let conn = conn();
        let user = insert_user(&conn, "alice", "hash-a").unwrap();
        assert!(user.id > 0);

        let (found, hash) = find_credentials(&conn, "alice").unwrap().unwrap();
        assert_eq!(found, user);
        assert_eq!(hash, "hash-a");
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let conn = conn();
        insert_user(&conn, "alice", "h1").unwrap();
        let err = insert_user(&conn, "alice", "h2").unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername(ref name) if name == "alice"));
    }

    #[test]
    fn test_unknown_user() {
        let conn = conn();
        assert!(find_credentials(&conn, "nobody").unwrap().is_none());
    }
}
