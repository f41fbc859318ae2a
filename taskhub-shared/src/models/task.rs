/// Task model and database operations
///
/// Tasks hold weak references to users (creator, assignee) and teams:
/// deleting a user or team detaches the reference, it never deletes the
/// task. The assignee, if present, must reference an existing user at
/// assignment time — the foreign key enforces this, and the cascade on
/// user deletion clears it so the reference is never left dangling.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority INTEGER NOT NULL DEFAULT 0,
///     category VARCHAR(100),
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     assigned_to UUID REFERENCES users(id),
///     team_id UUID REFERENCES teams(id) ON DELETE SET NULL,
///     deadline TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Current workflow status
    pub status: TaskStatus,

    /// Priority (higher = more urgent)
    pub priority: i32,

    /// Free-form category label
    pub category: Option<String>,

    /// User who created the task (nullable if that user was deleted)
    pub created_by: Option<Uuid>,

    /// Assigned user (cleared, never dangling, when that user is deleted)
    pub assigned_to: Option<Uuid>,

    /// Team this task belongs to
    pub team_id: Option<Uuid>,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Short title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status
    pub status: TaskStatus,

    /// Priority
    pub priority: i32,

    /// Category label
    pub category: Option<String>,

    /// Creating user (from the authenticated context)
    pub created_by: Uuid,

    /// Optional assignee (must exist)
    pub assigned_to: Option<Uuid>,

    /// Optional owning team
    pub team_id: Option<Uuid>,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Input for updating a task
///
/// Only non-None fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<i32>,

    /// New category
    pub category: Option<String>,

    /// New assignee
    pub assigned_to: Option<Uuid>,

    /// New team
    pub team_id: Option<Uuid>,

    /// New deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Filters for listing tasks
///
/// All fields are optional; None means "don't filter on this".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
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
}

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the assignee or team references don't exist
    /// (foreign key violation) or the database is unavailable.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, priority, category,
                               created_by, assigned_to, team_id, deadline)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, description, status, priority, category,
                      created_by, assigned_to, team_id, deadline, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.category)
        .bind(data.created_by)
        .bind(data.assigned_to)
        .bind(data.team_id)
        .bind(data.deadline)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, category,
                   created_by, assigned_to, team_id, deadline, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates a task's fields
    ///
    /// Only non-None fields are changed; `updated_at` is bumped.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET updated_at  = NOW(),
                title       = COALESCE($2, title),
                description = COALESCE($3, description),
                status      = COALESCE($4, status),
                priority    = COALESCE($5, priority),
                category    = COALESCE($6, category),
                assigned_to = COALESCE($7, assigned_to),
                team_id     = COALESCE($8, team_id),
                deadline    = COALESCE($9, deadline)
            WHERE id = $1
            RETURNING id, title, description, status, priority, category,
                      created_by, assigned_to, team_id, deadline, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.category)
        .bind(data.assigned_to)
        .bind(data.team_id)
        .bind(data.deadline)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// # Returns
    ///
    /// True if a task was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks matching the filter, with pagination, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, category,
                   created_by, assigned_to, team_id, deadline, created_at, updated_at
            FROM tasks
            WHERE ($1::task_status IS NULL OR status = $1)
              AND ($2::varchar IS NULL OR category = $2)
              AND ($3::integer IS NULL OR priority = $3)
              AND ($4::uuid IS NULL OR assigned_to = $4)
              AND ($5::uuid IS NULL OR created_by = $5)
              AND ($6::uuid IS NULL OR team_id = $6)
            ORDER BY created_at DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(filter.status)
        .bind(filter.category.as_deref())
        .bind(filter.priority)
        .bind(filter.assigned_to)
        .bind(filter.created_by)
        .bind(filter.team_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Sets a task's workflow status
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, status, priority, category,
                      created_by, assigned_to, team_id, deadline, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Assigns a task to a user
    ///
    /// The caller must have resolved the user first so a missing assignee
    /// surfaces as NotFound, not as a constraint error.
    pub async fn assign(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET assigned_to = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, status, priority, category,
                      created_by, assigned_to, team_id, deadline, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_task_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );

        let status: TaskStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(status, TaskStatus::Done);
    }

    #[test]
    fn test_task_filter_default_is_unfiltered() {
        let filter = TaskFilter::default();
        assert!(filter.status.is_none());
        assert!(filter.category.is_none());
        assert!(filter.priority.is_none());
        assert!(filter.assigned_to.is_none());
        assert!(filter.created_by.is_none());
        assert!(filter.team_id.is_none());
    }
}
