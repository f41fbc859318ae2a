/// User management endpoints
///
/// # Endpoints
///
/// - `GET /api/users` - List users (MANAGER+)
/// - `GET /api/users/:id` - Get a user (self or MANAGER+)
/// - `PUT /api/users/:id` - Update a user (self or MANAGER+)
/// - `DELETE /api/users/:id` - Delete a user and cascade (ADMIN)

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::{
        authorization::{require_role, require_self_or_role},
        middleware::AuthContext,
    },
    cascade,
    models::user::{Role, UpdateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct Pagination {
    /// Maximum rows to return (default 50, capped at 200)
    pub limit: Option<i64>,

    /// Rows to skip
    pub offset: Option<i64>,
}

impl Pagination {
    /// Clamped (limit, offset) pair
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(50).clamp(1, 200);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Update user request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New username
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: Option<String>,

    /// New email
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New first name
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    /// New last name
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
}

/// User list response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    /// Users on this page
    pub users: Vec<User>,

    /// Total user count
    pub total: i64,
}

/// Deletion response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    /// Tasks whose assignee was cleared
    pub tasks_unassigned: u64,

    /// Team memberships removed
    pub memberships_removed: u64,

    /// Refresh sessions deleted
    pub sessions_deleted: u64,
}

/// Lists users with pagination (MANAGER+)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<UserListResponse>> {
    require_role(&auth, Role::Manager)?;

    let (limit, offset) = pagination.resolve();
    let users = User::list(&state.db, limit, offset).await?;
    let total = User::count(&state.db).await?;

    Ok(Json(UserListResponse { users, total }))
}

/// Gets a single user (self or MANAGER+)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    require_self_or_role(&auth, id, Role::Manager)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Updates a user profile (self or MANAGER+)
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    require_self_or_role(&auth, id, Role::Manager)?;
    req.validate().map_err(validation_error)?;

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Deletes a user and everything referencing them (ADMIN)
///
/// Runs the full cascade in one transaction: task assignments cleared,
/// team memberships pruned, refresh sessions deleted, then the user row.
/// A missing user returns 404 with nothing mutated.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteUserResponse>> {
    require_role(&auth, Role::Admin)?;

    let report = cascade::delete_user(&state.db, id).await?;

    Ok(Json(DeleteUserResponse {
        tasks_unassigned: report.tasks_unassigned,
        memberships_removed: report.memberships_removed,
        sessions_deleted: report.sessions_deleted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination {
            limit: None,
            offset: None,
        };
        assert_eq!(p.resolve(), (50, 0));
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(p.resolve(), (200, 0));

        let p = Pagination {
            limit: Some(0),
            offset: Some(30),
        };
        assert_eq!(p.resolve(), (1, 30));
    }
}
