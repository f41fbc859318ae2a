/// Database models for taskhub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, roles, and profile data
/// - `refresh_session`: Revocable refresh sessions backing token renewal
/// - `task`: Tasks with workflow status, assignee, and team references
/// - `team`: Teams and their member sets
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::user::{User, CreateUser, Role};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: Some("Alice".to_string()),
///     last_name: None,
///     role: Role::User,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod refresh_session;
pub mod task;
pub mod team;
pub mod user;
