/// User model and database operations
///
/// Users are the root entity of the system: tasks and teams hold weak
/// references to them, and refresh sessions are owned by them. Username
/// uniqueness is enforced at creation by a unique constraint.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('user', 'manager', 'admin');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(100) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(100),
///     last_name VARCHAR(100),
///     role user_role NOT NULL DEFAULT 'user',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role held by a user account
///
/// Serialized as `USER`/`MANAGER`/`ADMIN` on the wire, stored lowercase
/// in the `user_role` postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular account: manages own tasks
    User,

    /// Can manage users, teams, and all tasks
    Manager,

    /// Full control, including user deletion and team removal
    Admin,
}

impl Role {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }

    /// Checks if this role meets or exceeds the required role
    ///
    /// Hierarchy: Admin > Manager > User
    pub fn has_permission(&self, required: &Role) -> bool {
        self.permission_level() >= required.permission_level()
    }

    /// Returns numeric permission level for comparison
    fn permission_level(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Manager => 2,
            Role::User => 1,
        }
    }
}

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Unique username
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,

    /// Role governing what this user may do
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Unique username
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,

    /// Role to assign (registration defaults this to `Role::User`)
    pub role: Role,
}

/// Input for updating a user profile
///
/// Only non-None fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New username
    pub username: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New first name
    pub first_name: Option<String>,

    /// New last name
    pub last_name: Option<String>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the username already exists (unique constraint
    /// violation) or the database is unavailable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password_hash, first_name, last_name, role,
                      created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name, role,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username (exact match)
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name, role,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether a username is already taken
    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Updates a user's profile fields
    ///
    /// Only non-None fields are changed; `updated_at` is bumped.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET updated_at = NOW(),
                username   = COALESCE($2, username),
                email      = COALESCE($3, email),
                first_name = COALESCE($4, first_name),
                last_name  = COALESCE($5, last_name)
            WHERE id = $1
            RETURNING id, username, email, password_hash, first_name, last_name, role,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.username)
        .bind(data.email)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users with pagination, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name, role,
                   created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::Admin.has_permission(&Role::Manager));
        assert!(Role::Admin.has_permission(&Role::User));
        assert!(Role::Manager.has_permission(&Role::User));

        assert!(!Role::User.has_permission(&Role::Manager));
        assert!(!Role::User.has_permission(&Role::Admin));
        assert!(!Role::Manager.has_permission(&Role::Admin));

        // A role always meets itself
        for role in [Role::User, Role::Manager, Role::Admin] {
            assert!(role.has_permission(&role));
        }
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
        assert_eq!(
            serde_json::to_string(&Role::Manager).unwrap(),
            "\"MANAGER\""
        );
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");

        let role: Role = serde_json::from_str("\"MANAGER\"").unwrap();
        assert_eq!(role, Role::Manager);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: None,
            last_name: None,
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.username.is_none());
        assert!(update.email.is_none());
        assert!(update.first_name.is_none());
        assert!(update.last_name.is_none());
    }

    // Database-backed behavior is exercised by the end-to-end tests in
    // the api crate (tests/auth_flow_test.rs).
}
