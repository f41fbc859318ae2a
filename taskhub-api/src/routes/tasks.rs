/// Task management endpoints
///
/// All routes require authentication; the creator of a new task always
/// comes from the auth context, never from the request body.
///
/// # Endpoints
///
/// - `POST /api/tasks` - Create a task
/// - `GET /api/tasks` - List tasks with filters and pagination
/// - `GET /api/tasks/:id` - Get a task
/// - `PUT /api/tasks/:id` - Update a task
/// - `DELETE /api/tasks/:id` - Delete a task (creator or MANAGER+)
/// - `PATCH /api/tasks/:id/status` - Set workflow status
/// - `PATCH /api/tasks/:id/assign` - Assign to a user (MANAGER+)

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::{authorization::require_role, middleware::AuthContext},
    models::{
        task::{CreateTask, Task, TaskFilter, TaskStatus, UpdateTask},
        user::{Role, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (default: todo)
    pub status: Option<TaskStatus>,

    /// Priority (default: 0)
    pub priority: Option<i32>,

    /// Category label
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,

    /// Optional assignee
    pub assigned_to: Option<Uuid>,

    /// Optional owning team
    pub team_id: Option<Uuid>,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Update task request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<i32>,

    /// New category
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,

    /// New assignee
    pub assigned_to: Option<Uuid>,

    /// New team
    pub team_id: Option<Uuid>,

    /// New deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// New workflow status
    pub status: TaskStatus,
}

/// Assignment request
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// User to assign the task to
    pub user_id: Uuid,
}

/// Task list query parameters (filters + pagination)
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    /// Filter by status
    pub status: Option<TaskStatus>,

    /// Filter by category
    pub category: Option<String>,

    /// Filter by priority
    pub priority: Option<i32>,

    /// Filter by assignee
    pub assigned_to: Option<Uuid>,

    /// Filter by creator
    pub created_by: Option<Uuid>,

    /// Filter by team
    pub team_id: Option<Uuid>,

    /// Maximum rows to return
    pub limit: Option<i64>,

    /// Rows to skip
    pub offset: Option<i64>,
}

/// Task list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// Tasks on this page
    pub tasks: Vec<Task>,
}

/// Creates a task owned by the authenticated user
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(validation_error)?;

    if let Some(assignee) = req.assigned_to {
        ensure_user_exists(&state, assignee).await?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::Todo),
            priority: req.priority.unwrap_or(0),
            category: req.category,
            created_by: auth.user_id,
            assigned_to: req.assigned_to,
            team_id: req.team_id,
            deadline: req.deadline,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, created_by = %auth.user_id, "Created task");

    Ok(Json(task))
}

/// Lists tasks matching the query filters
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let filter = TaskFilter {
        status: query.status,
        category: query.category,
        priority: query.priority,
        assigned_to: query.assigned_to,
        created_by: query.created_by,
        team_id: query.team_id,
    };

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let tasks = Task::list(&state.db, &filter, limit, offset).await?;

    Ok(Json(TaskListResponse { tasks }))
}

/// Gets a single task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Updates a task (creator or MANAGER+)
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(validation_error)?;

    let existing = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    ensure_creator_or_role(&auth, &existing, Role::Manager)?;

    if let Some(assignee) = req.assigned_to {
        ensure_user_exists(&state, assignee).await?;
    }

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            category: req.category,
            assigned_to: req.assigned_to,
            team_id: req.team_id,
            deadline: req.deadline,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes a task (creator or MANAGER+)
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let existing = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    ensure_creator_or_role(&auth, &existing, Role::Manager)?;

    Task::delete(&state.db, id).await?;

    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

/// Sets a task's workflow status
pub async fn set_task_status(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::set_status(&state.db, id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Assigns a task to a user (MANAGER+)
///
/// The assignee is resolved first, so a missing user is a 404 rather
/// than a surfaced constraint error.
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<Task>> {
    require_role(&auth, Role::Manager)?;

    ensure_user_exists(&state, req.user_id).await?;

    let task = Task::assign(&state.db, id, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// 404 unless the user exists
async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> ApiResult<()> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(())
}

/// Creator may always act on their task; others need the role
fn ensure_creator_or_role(auth: &AuthContext, task: &Task, role: Role) -> Result<(), ApiError> {
    if task.created_by == Some(auth.user_id) {
        return Ok(());
    }

    require_role(auth, role)
        .map_err(|_| ApiError::Forbidden("Not authorized to modify this task".to_string()))
}
