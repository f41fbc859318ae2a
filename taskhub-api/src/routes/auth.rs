/// Authentication endpoints
///
/// The access token is a short-lived signed credential carrying identity
/// and role; the refresh token is an opaque handle to a server-side
/// session. Refreshing does not rotate the session, so a refresh token
/// stays usable for its whole lifetime until logout or expiry.
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get tokens
/// - `POST /api/auth/refresh` - Exchange refresh token for access token
/// - `POST /api/auth/logout` - Revoke a refresh session

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::{jwt, password},
    models::{
        refresh_session::{validate_refresh_token_format, RefreshSession},
        user::{CreateUser, Role, User},
    },
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username (unique)
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional first name
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    /// Optional last name
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Response for register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPairResponse {
    /// User ID
    pub user_id: String,

    /// Short-lived access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,
}

/// Logout request
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token to revoke
    pub refresh_token: String,
}

/// Logout response
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Always "logged_out"
    pub status: String,
}

/// Register a new user
///
/// Creates the account with the default USER role, opens a refresh
/// session, and returns both tokens so the client is immediately
/// authenticated.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "SecureP@ss123",
///   "first_name": "Alice",
///   "last_name": "Smith"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate().map_err(validation_error)?;

    if User::username_exists(&state.db, &req.username).await? {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            role: Role::User,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Registered new user");

    issue_token_pair(&state, &user).await
}

/// Login endpoint
///
/// Authenticates by username and password. Unknown username and wrong
/// password produce the same 401 body, so responses never confirm
/// whether an account exists.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials (merged)
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate().map_err(validation_error)?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized);
    }

    tracing::debug!(user_id = %user.id, "Login succeeded");

    issue_token_pair(&state, &user).await
}

/// Token refresh endpoint
///
/// Exchanges a live refresh session for a new access token. The session
/// itself is untouched: no rotation, no expiry extension. The user row is
/// re-read so the new token carries the current role, not the role at
/// login time.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/refresh
/// Content-Type: application/json
///
/// {
///   "refresh_token": "thr_..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown, expired, or revoked session
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    // A token that doesn't even have the right shape can't be in the store
    if !validate_refresh_token_format(&req.refresh_token) {
        return Err(ApiError::Unauthorized);
    }

    let session = RefreshSession::find_by_token(&state.db, &req.refresh_token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !session.is_usable(chrono::Utc::now()) {
        return Err(ApiError::Unauthorized);
    }

    // Session may outlive the account only transiently; the cascade
    // deletes sessions with the user, so a missing row here is a 401.
    let user = User::find_by_id(&state.db, session.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let claims = jwt::Claims::new(user.id, &user.username, user.role, state.config.access_token_ttl());
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Logout endpoint
///
/// Revokes the named refresh session. Always returns 200: revoking an
/// unknown or already-revoked token acknowledges identically, so the
/// endpoint leaks nothing about which tokens exist.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/logout
/// Content-Type: application/json
///
/// {
///   "refresh_token": "thr_..."
/// }
/// ```
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> ApiResult<Json<LogoutResponse>> {
    // Malformed tokens can't be in the store; skip the round trip but
    // acknowledge the same way. The bool result stays server-side.
    if validate_refresh_token_format(&req.refresh_token) {
        let revoked = RefreshSession::revoke(&state.db, &req.refresh_token).await?;
        tracing::debug!(revoked, "Logout processed");
    }

    Ok(Json(LogoutResponse {
        status: "logged_out".to_string(),
    }))
}

/// Issues an access token and opens a fresh refresh session
async fn issue_token_pair(state: &AppState, user: &User) -> ApiResult<Json<TokenPairResponse>> {
    let claims = jwt::Claims::new(user.id, &user.username, user.role, state.config.access_token_ttl());
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    let session =
        RefreshSession::create(&state.db, user.id, state.config.refresh_session_ttl()).await?;

    Ok(Json(TokenPairResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token: session.token,
    }))
}
