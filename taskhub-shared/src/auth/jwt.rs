/// Access-token creation and validation
///
/// Access tokens are compact signed JWTs (HS256) carrying the user's
/// identity and role plus an absolute expiry. They are stateless: validity
/// is purely a function of signature and expiry, and a valid token is
/// usable any number of times until it expires. Revocation happens at the
/// refresh-session level, not here.
///
/// The signing secret is an explicit parameter on every call — it is
/// configuration injected at process start, never ambient global state.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskhub_shared::models::user::Role;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, "alice", Role::User, Duration::hours(1));
/// let token = create_token(&claims, "test-secret-key-at-least-32-bytes!!")?;
///
/// let validated = validate_token(&token, "test-secret-key-at-least-32-bytes!!")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// Token issuer claim, checked on validation
const ISSUER: &str = "taskhub";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token failed validation (bad signature, malformed, wrong issuer)
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Access-token claims
///
/// # Standard claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskhub")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
///
/// # Custom claims
///
/// - `username`: Unique username of the subject
/// - `role`: Role the subject held when the token was issued
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - always "taskhub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Username of the subject
    pub username: String,

    /// Role carried by this token
    pub role: Role,
}

impl Claims {
    /// Creates claims expiring `ttl` from now
    pub fn new(user_id: Uuid, username: &str, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            username: username.to_string(),
            role,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed token from claims
///
/// Signs with HS256 using the provided secret. The secret should be at
/// least 32 bytes; the API config enforces this at startup.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, the expiry, and the issuer. All failures are
/// explicit `Err` results, never panics: a tampered, malformed, or expired
/// token is an expected negative outcome.
///
/// # Errors
///
/// - `JwtError::Expired` when `now >= exp`
/// - `JwtError::ValidationError` for any other failure
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    // Expiry is strict: no grace window past `exp`, matching is_expired()
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "alice", Role::Manager, Duration::hours(1));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.iss, "taskhub");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "alice", Role::User, Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.username, "alice");
        assert_eq!(validated.role, Role::User);
        assert_eq!(validated.iss, "taskhub");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), "bob", Role::User, Duration::hours(1));
        let token = create_token(&claims, "secret-one-that-is-32-bytes-long!!").unwrap();

        assert!(validate_token(&token, "secret-two-that-is-32-bytes-long!!").is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        // Expired an hour ago
        let claims = Claims::new(Uuid::new_v4(), "bob", Role::User, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_rejects_just_expired_token() {
        // A few seconds past exp must already be rejected; validation
        // carries no leeway window
        let claims = Claims::new(Uuid::new_v4(), "bob", Role::User, Duration::seconds(-5));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_malformed_token() {
        assert!(validate_token("not-a-jwt", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
        assert!(validate_token("a.b.c", SECRET).is_err());
    }

    #[test]
    fn test_tampered_token_fails() {
        let claims = Claims::new(Uuid::new_v4(), "mallory", Role::User, Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut payload: Vec<u8> = parts[1].clone().into_bytes();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        assert!(validate_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_role_claim_roundtrip() {
        for role in [Role::User, Role::Manager, Role::Admin] {
            let claims = Claims::new(Uuid::new_v4(), "carol", role, Duration::minutes(15));
            let token = create_token(&claims, SECRET).unwrap();
            let validated = validate_token(&token, SECRET).unwrap();
            assert_eq!(validated.role, role);
        }
    }
}
