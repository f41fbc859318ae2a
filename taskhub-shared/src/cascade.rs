/// Cascade coordinator for user deletion
///
/// A user row is referenced from three places: task assignments, team
/// memberships, and refresh sessions. Deleting the row without clearing
/// those first would either fail on a constraint or leave dangling
/// references, so deletion runs as a fixed sequence inside one
/// transaction:
///
/// 1. Detach the user from every task they are assigned to
/// 2. Remove the user from every team
/// 3. Delete the user's refresh sessions (revoking all of them)
/// 4. Delete the user row
///
/// Either all four steps commit or none do. Tasks and teams themselves
/// are never deleted, only the references to the user.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::refresh_session::RefreshSession;

/// Error type for cascade operations
#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    /// Target user does not exist
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    /// Database error (transaction rolled back)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Summary of what a user deletion touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionReport {
    /// Tasks whose assignee was cleared
    pub tasks_unassigned: u64,

    /// Team memberships removed
    pub memberships_removed: u64,

    /// Refresh sessions deleted
    pub sessions_deleted: u64,
}

/// Deletes a user and everything that references them, atomically
///
/// Checks existence before mutating anything: a missing user aborts with
/// `UserNotFound` and the database is untouched.
///
/// # Errors
///
/// Returns `CascadeError::UserNotFound` if no such user exists, or
/// `CascadeError::DatabaseError` if any step fails (in which case the
/// whole transaction rolls back).
pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<DeletionReport, CascadeError> {
    let mut tx = pool.begin().await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

    if !exists {
        return Err(CascadeError::UserNotFound(user_id));
    }

    let tasks_unassigned = sqlx::query(
        "UPDATE tasks SET assigned_to = NULL, updated_at = NOW() WHERE assigned_to = $1",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let memberships_removed = sqlx::query("DELETE FROM team_members WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let sessions_deleted = RefreshSession::delete_all_for_user(&mut *tx, user_id).await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = %user_id,
        tasks_unassigned,
        memberships_removed,
        sessions_deleted,
        "Deleted user and cleared references"
    );

    Ok(DeletionReport {
        tasks_unassigned,
        memberships_removed,
        sessions_deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_error_display() {
        let user_id = Uuid::new_v4();
        let err = CascadeError::UserNotFound(user_id);
        assert!(err.to_string().contains(&user_id.to_string()));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_deletion_report_equality() {
        let report = DeletionReport {
            tasks_unassigned: 3,
            memberships_removed: 1,
            sessions_deleted: 2,
        };
        assert_eq!(report, report);
    }

    // Transactional behavior is exercised by the end-to-end tests in the
    // api crate (tests/auth_flow_test.rs).
}
