/// Team model and membership operations
///
/// Membership is a plain set relation in `team_members`: adding a user
/// who is already a member is a no-op, and the composite primary key
/// means a user appears at most once per team. Deleting a user prunes
/// their memberships without touching the teams themselves.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE team_members (
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id),
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (team_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;

/// Team model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// User who created the team; cleared when that user is deleted
    pub created_by: Option<Uuid>,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Team name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// User creating the team
    pub created_by: Uuid,

    /// Initial members (may be empty)
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

/// Input for updating a team
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeam {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

impl Team {
    /// Creates a team and adds the initial members in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if any member ID does not reference an existing
    /// user, or the database is unavailable. On error nothing is created.
    pub async fn create(pool: &PgPool, data: CreateTeam) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in data.member_ids {
            sqlx::query(
                r#"
                INSERT INTO team_members (team_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT (team_id, user_id) DO NOTHING
                "#,
            )
            .bind(team.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(team)
    }

    /// Finds a team by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Lists all teams, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by, created_at, updated_at
            FROM teams
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    /// Updates a team's fields
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTeam,
    ) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET updated_at  = NOW(),
                name        = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Deletes a team
    ///
    /// Memberships go with it (ON DELETE CASCADE); tasks pointing at the
    /// team are detached, not deleted.
    ///
    /// # Returns
    ///
    /// True if the team existed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds users to a team, skipping users who are already members
    pub async fn add_members(
        pool: &PgPool,
        team_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for user_id in user_ids {
            sqlx::query(
                r#"
                INSERT INTO team_members (team_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT (team_id, user_id) DO NOTHING
                "#,
            )
            .bind(team_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Removes a user from a team
    ///
    /// # Returns
    ///
    /// True if the user was a member
    pub async fn remove_member(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM team_members WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the members of a team
    pub async fn list_members(pool: &PgPool, team_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.first_name,
                   u.last_name, u.role, u.created_at, u.updated_at
            FROM users u
            JOIN team_members tm ON tm.user_id = u.id
            WHERE tm.team_id = $1
            ORDER BY tm.added_at
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team_member_ids_default_empty() {
        let creator = Uuid::new_v4();
        let data: CreateTeam = serde_json::from_str(&format!(
            r#"{{"name": "backend", "description": null, "created_by": "{}"}}"#,
            creator
        ))
        .unwrap();
        assert_eq!(data.name, "backend");
        assert_eq!(data.created_by, creator);
        assert!(data.member_ids.is_empty());
    }

    #[test]
    fn test_team_serializes_creator() {
        let creator = Uuid::new_v4();
        let team = Team {
            id: Uuid::new_v4(),
            name: "backend".to_string(),
            description: None,
            created_by: Some(creator),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&team).unwrap();
        assert_eq!(json["created_by"], serde_json::json!(creator));
    }

    #[test]
    fn test_update_team_default() {
        let data = UpdateTeam::default();
        assert!(data.name.is_none());
        assert!(data.description.is_none());
    }
}
