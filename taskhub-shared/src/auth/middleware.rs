/// Authentication middleware for Axum
///
/// Validates Bearer access tokens from the Authorization header and adds
/// an `AuthContext` to request extensions on success. Authorization
/// decisions (role checks) happen after this layer, in
/// [`crate::auth::authorization`] — this middleware only establishes WHO
/// the caller is.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware, Extension};
/// use taskhub_shared::auth::middleware::{create_auth_middleware, AuthContext};
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
///
/// let app: Router = Router::new()
///     .route("/api/users", get(handler))
///     .layer(middleware::from_fn(create_auth_middleware("your-signing-secret")));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::Role;

/// Authentication context added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor. The role comes
/// from the validated token claims, so role checks don't need a database
/// round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Username at token issuance time
    pub username: String,

    /// Role at token issuance time
    pub role: Role,
}

impl AuthContext {
    /// Creates auth context from validated token claims
    pub fn new(user_id: Uuid, username: String, role: Role) -> Self {
        Self {
            user_id,
            username,
            role,
        }
    }
}

/// Error type for authentication middleware
///
/// Every failure to establish identity maps to 401 — a caller probing
/// the API cannot distinguish a missing header from a forged token.
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Authorization header is not a Bearer token
    InvalidFormat,

    /// Token validation failed (bad signature, expired, malformed)
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat => {
                (StatusCode::UNAUTHORIZED, "Expected Bearer token").into_response()
            }
            AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
            }
        }
    }
}

/// Bearer token authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing
/// - Header is not `Bearer <token>`
/// - Token signature, issuer, or shape is invalid
/// - Token has expired
pub async fn auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    let claims = validate_token(token, &secret).map_err(|e| {
        match e {
            JwtError::Expired => {
                tracing::debug!("rejected expired access token");
            }
            _ => {
                tracing::debug!("rejected invalid access token: {}", e);
            }
        }
        AuthError::InvalidToken
    })?;

    let auth_context = AuthContext::new(claims.sub, claims.username, claims.role);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Creates an authentication middleware closure
///
/// Captures the signing secret and returns a function usable with
/// `axum::middleware::from_fn`.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use taskhub_shared::auth::middleware::create_auth_middleware;
///
/// let app: Router = Router::new()
///     .route("/api/tasks", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_auth_middleware("secret")));
/// ```
pub fn create_auth_middleware(
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(auth_middleware(secret, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_new() {
        let user_id = Uuid::new_v4();
        let context = AuthContext::new(user_id, "alice".to_string(), Role::Manager);

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.username, "alice");
        assert_eq!(context.role, Role::Manager);
    }

    #[test]
    fn test_auth_error_all_unauthorized() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
