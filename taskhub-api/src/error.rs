/// Error handling for the API server
///
/// A unified error type that maps onto HTTP responses. Handlers return
/// `Result<T, ApiError>` which converts automatically.
///
/// Two deliberate asymmetries in the mapping:
/// - every authentication failure collapses into a single 401 body, so
///   responses never reveal whether a username exists or which check
///   rejected a token
/// - internal errors log their detail via tracing but respond with a
///   generic message

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401) - any authentication failure
    Unauthorized,

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate username
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "conflict", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid credentials".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log the detail, respond generically
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    return conflict_for_constraint(constraint);
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Maps a violated constraint to a 409
///
/// Constraint names are internal schema detail; they are logged but never
/// echoed back to the client.
fn conflict_for_constraint(constraint: &str) -> ApiError {
    if constraint.contains("username") {
        return ApiError::Conflict("Username already exists".to_string());
    }

    tracing::warn!(constraint, "Constraint violation");
    ApiError::Conflict("Resource conflicts with existing data".to_string())
}

/// Convert authentication errors to API errors
impl From<taskhub_shared::auth::middleware::AuthError> for ApiError {
    fn from(_err: taskhub_shared::auth::middleware::AuthError) -> Self {
        ApiError::Unauthorized
    }
}

/// Convert authorization errors to API errors
impl From<taskhub_shared::auth::authorization::AuthzError> for ApiError {
    fn from(err: taskhub_shared::auth::authorization::AuthzError) -> Self {
        match err {
            taskhub_shared::auth::authorization::AuthzError::InsufficientRole { .. } => {
                ApiError::Forbidden("Insufficient permissions".to_string())
            }
            taskhub_shared::auth::authorization::AuthzError::NotAuthorized => {
                ApiError::Forbidden("Not authorized to access this resource".to_string())
            }
        }
    }
}

/// Convert password errors to API errors
///
/// Only infrastructure failures reach this conversion; a wrong password
/// is an `Ok(false)` from verification, not an error.
impl From<taskhub_shared::auth::password::PasswordError> for ApiError {
    fn from(err: taskhub_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert token errors to API errors
impl From<taskhub_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: taskhub_shared::auth::jwt::JwtError) -> Self {
        match err {
            taskhub_shared::auth::jwt::JwtError::CreateError(e) => {
                ApiError::InternalError(format!("Token creation failed: {}", e))
            }
            _ => ApiError::Unauthorized,
        }
    }
}

/// Convert cascade errors to API errors
impl From<taskhub_shared::cascade::CascadeError> for ApiError {
    fn from(err: taskhub_shared::cascade::CascadeError) -> Self {
        match err {
            taskhub_shared::cascade::CascadeError::UserNotFound(_) => {
                ApiError::NotFound("User not found".to_string())
            }
            taskhub_shared::cascade::CascadeError::DatabaseError(e) => {
                ApiError::InternalError(format!("Database error: {}", e))
            }
        }
    }
}

/// Converts validator errors into a 422 with per-field details
pub fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    let details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    ApiError::ValidationError(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskhub_shared::auth::authorization::AuthzError;
    use taskhub_shared::auth::jwt::JwtError;
    use taskhub_shared::auth::middleware::AuthError;
    use taskhub_shared::cascade::CascadeError;
    use taskhub_shared::models::user::Role;

    #[test]
    fn test_error_display() {
        let err = ApiError::Conflict("Username already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: Username already exists");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_unauthorized_has_no_detail() {
        // Merged 401: the message never distinguishes the failure mode
        let from_auth: ApiError = AuthError::InvalidToken.into();
        let from_jwt: ApiError = JwtError::Expired.into();

        assert_eq!(from_auth.to_string(), "Unauthorized");
        assert_eq!(from_jwt.to_string(), "Unauthorized");
    }

    #[test]
    fn test_authz_error_maps_to_forbidden() {
        let err: ApiError = AuthzError::InsufficientRole {
            required: Role::Admin,
            actual: Role::User,
        }
        .into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_cascade_not_found_maps_to_404() {
        let err: ApiError = CascadeError::UserNotFound(uuid::Uuid::new_v4()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_constraint_names_stay_server_side() {
        let err = conflict_for_constraint("tasks_assigned_to_fkey");
        match err {
            ApiError::Conflict(msg) => {
                assert!(!msg.contains("tasks_assigned_to_fkey"));
                assert!(!msg.contains("fkey"));
            }
            other => panic!("Expected Conflict, got {:?}", other),
        }

        // The username constraint still maps to its dedicated message
        let err = conflict_for_constraint("users_username_key");
        match err {
            ApiError::Conflict(msg) => assert_eq!(msg, "Username already exists"),
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_count() {
        let errors = vec![
            ValidationErrorDetail {
                field: "username".to_string(),
                message: "Username too short".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
