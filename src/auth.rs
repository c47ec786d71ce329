//! Sign-in sessions.
//!
//! Accounts are email + password (argon2 hash). A session is the explicit
//! user context handed to every data-access call; clients present it as
//! `Authorization: Bearer <token>`.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SwarmError};
use crate::store::db::SwarmDb;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub token: String,
}

pub const MIN_PASSWORD_LEN: usize = 8;

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(SwarmError::Validation("A valid email is required".to_string()));
    }
    Ok(email)
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| SwarmError::Other(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Unreadable password hash: {}", e);
            false
        }
    }
}

fn issue_token(conn: &Connection, user_id: &str) -> Result<String> {
    let token = uuid::Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![token, user_id, Utc::now().to_rfc3339()],
    )?;
    Ok(token)
}

/// Register a new account and sign it in.
pub fn sign_up(db: &SwarmDb, email: &str, password: &str) -> Result<Session> {
    let email = normalize_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SwarmError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    // Hash before taking the connection lock
    let password_hash = hash_password(password)?;

    let conn = db.conn();
    let user_id = uuid::Uuid::new_v4().to_string();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, email, password_hash, Utc::now().to_rfc3339()],
    )?;
    if inserted == 0 {
        return Err(SwarmError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let token = issue_token(&conn, &user_id)?;
    info!("User {} signed up", user_id);

    Ok(Session {
        user_id,
        email,
        token,
    })
}

/// Sign in with email and password. Every call issues a new token; earlier
/// tokens stay valid until signed out.
pub fn sign_in(db: &SwarmDb, email: &str, password: &str) -> Result<Session> {
    let email = normalize_email(email)?;

    let user: Option<(String, String)> = db
        .conn()
        .query_row(
            "SELECT id, password_hash FROM users WHERE email=?1",
            params![email],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    // Unknown email and wrong password are indistinguishable to the caller
    let user_id = match user {
        Some((id, stored)) if verify_password(password, &stored) => id,
        _ => {
            warn!("Rejected sign-in for {}", email);
            return Err(SwarmError::InvalidCredentials);
        }
    };

    let token = issue_token(&db.conn(), &user_id)?;
    info!("User {} signed in", user_id);

    Ok(Session {
        user_id,
        email,
        token,
    })
}

/// Returns false if the token was not a live session.
pub fn sign_out(db: &SwarmDb, token: &str) -> Result<bool> {
    let conn = db.conn();
    let deleted = conn.execute("DELETE FROM sessions WHERE token=?1", params![token])?;
    Ok(deleted > 0)
}

pub fn current_user(db: &SwarmDb, token: &str) -> Result<Option<Session>> {
    let conn = db.conn();
    let session = conn
        .query_row(
            "SELECT u.id, u.email, s.token FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token=?1",
            params![token],
            |row| {
                Ok(Session {
                    user_id: row.get(0)?,
                    email: row.get(1)?,
                    token: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(session)
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the request's session, if any. A missing or stale token is not an
/// error here; callers decide whether they need a user.
pub fn session_from_headers(db: &SwarmDb, headers: &HeaderMap) -> Result<Option<Session>> {
    match bearer_token(headers) {
        Some(token) => current_user(db, token),
        None => Ok(None),
    }
}

/// Like [`session_from_headers`], but a missing user is `AuthRequired`.
pub fn require_session(
    db: &SwarmDb,
    headers: &HeaderMap,
    action: &'static str,
) -> Result<Session> {
    session_from_headers(db, headers)?.ok_or(SwarmError::AuthRequired(action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_password_hash_verifies_only_the_same_password() {
        let stored = hash_password("correct horse").unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("Correct horse", &stored));
        assert!(!verify_password("correct horse", "not a hash"));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc-123"));
        assert_eq!(bearer_token(&headers), Some("abc-123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_none());
    }
}
