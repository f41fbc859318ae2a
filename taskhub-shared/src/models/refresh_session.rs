/// Refresh session store
///
/// A refresh session is a long-lived, revocable capability to mint new
/// access tokens without re-authenticating. Sessions are keyed by an
/// opaque token string generated from a cryptographically strong random
/// source; a unique constraint at the storage layer backs the
/// no-collision invariant.
///
/// A session is usable only while `revoked == false AND now < expires_at`.
/// The revoked flag is monotonic: it flips false→true exactly once and
/// never back. Revoking an unknown or already-revoked token is a no-op,
/// not an error, so logout never leaks whether a token existed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE refresh_sessions (
///     token VARCHAR(64) PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id),
///     expires_at TIMESTAMPTZ NOT NULL,
///     revoked BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Token Format
///
/// `thr_{40_chars}` — prefix plus 40 random base62 chars, key space
/// 62^40 ≈ 2^238. Tokens are opaque: nothing is derivable from them.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Length of the random part of a refresh token (characters)
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Refresh token prefix
const TOKEN_PREFIX: &str = "thr_";

/// Total length of a refresh token (prefix + random)
pub const REFRESH_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Refresh session model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshSession {
    /// Opaque unique token string (primary key)
    pub token: String,

    /// Owning user — the session's lifetime is bounded by the user's
    pub user_id: Uuid,

    /// Absolute expiry; checked at use time, never actively swept
    pub expires_at: DateTime<Utc>,

    /// Monotonic revocation flag
    pub revoked: bool,

    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl RefreshSession {
    /// Checks whether the session can still mint access tokens
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }

    /// Creates a new refresh session for a user
    ///
    /// Generates a fresh unpredictable token, sets expiry = now + `ttl`,
    /// and persists the row. Every call produces a distinct session —
    /// login never reuses or revokes prior sessions, so a user may hold
    /// several concurrent valid sessions (e.g. one per device).
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unavailable, or on the
    /// astronomically unlikely token collision (unique violation).
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<Self, sqlx::Error> {
        let token = generate_refresh_token();
        let expires_at = Utc::now() + ttl;

        let session = sqlx::query_as::<_, RefreshSession>(
            r#"
            INSERT INTO refresh_sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, expires_at, revoked, created_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Looks up a session by its token string
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, RefreshSession>(
            r#"
            SELECT token, user_id, expires_at, revoked, created_at
            FROM refresh_sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Revokes a session by token
    ///
    /// Idempotent: revoking an already-revoked or nonexistent session is
    /// a no-op. Returns whether a live session was actually revoked,
    /// which callers must not surface to clients.
    pub async fn revoke(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET revoked = TRUE
            WHERE token = $1 AND revoked = FALSE
            "#,
        )
        .bind(token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every session owned by a user
    ///
    /// Takes a generic executor so user deletion can run it inside its
    /// transaction. Returns the number of sessions removed.
    pub async fn delete_all_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes sessions that expired before `now`
    ///
    /// Maintenance sweep; expiry itself is passive and checked at use
    /// time, so running this is optional.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE expires_at < NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Generates a new opaque refresh token
///
/// Uses `rand::thread_rng()` (a CSPRNG) over a base62 alphabet so the
/// token is unpredictable and URL-safe. Never derived from user data or
/// a sequence.
pub fn generate_refresh_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let random_part: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    format!("{}{}", TOKEN_PREFIX, random_part)
}

/// Validates refresh token format
///
/// Cheap shape check before hitting the store: correct prefix, correct
/// length, alphanumeric random part.
pub fn validate_refresh_token_format(token: &str) -> bool {
    if token.len() != REFRESH_TOKEN_LENGTH {
        return false;
    }

    if !token.starts_with(TOKEN_PREFIX) {
        return false;
    }

    token[TOKEN_PREFIX.len()..].chars().all(|c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_refresh_token() {
        let t1 = generate_refresh_token();
        let t2 = generate_refresh_token();

        assert!(t1.starts_with("thr_"));
        assert_eq!(t1.len(), REFRESH_TOKEN_LENGTH);
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_generated_tokens_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_refresh_token()));
        }
    }

    #[test]
    fn test_validate_refresh_token_format() {
        assert!(validate_refresh_token_format(&generate_refresh_token()));

        // Wrong prefix
        assert!(!validate_refresh_token_format(
            "xxx_0123456789012345678901234567890123456789"
        ));

        // Too short
        assert!(!validate_refresh_token_format("thr_short"));

        // Special characters
        assert!(!validate_refresh_token_format(
            "thr_!@#$%^&*()!@#$%^&*()!@#$%^&*()!@#$%^&"
        ));

        assert!(!validate_refresh_token_format(""));
    }

    #[test]
    fn test_is_usable() {
        let now = Utc::now();
        let mut session = RefreshSession {
            token: generate_refresh_token(),
            user_id: Uuid::new_v4(),
            expires_at: now + Duration::days(7),
            revoked: false,
            created_at: now,
        };

        assert!(session.is_usable(now));

        // Expired
        assert!(!session.is_usable(now + Duration::days(8)));

        // Exactly at expiry is not usable
        assert!(!session.is_usable(session.expires_at));

        // Revoked
        session.revoked = true;
        assert!(!session.is_usable(now));
    }
}
