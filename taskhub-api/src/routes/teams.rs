/// Team management endpoints
///
/// Membership changes use set semantics: adding an existing member is a
/// no-op, and removing a non-member simply reports so.
///
/// # Endpoints
///
/// - `POST /api/teams` - Create a team (MANAGER+)
/// - `GET /api/teams` - List teams
/// - `GET /api/teams/:id` - Get a team
/// - `PUT /api/teams/:id` - Update a team (MANAGER+)
/// - `DELETE /api/teams/:id` - Delete a team (ADMIN)
/// - `GET /api/teams/:id/members` - List members
/// - `POST /api/teams/:id/members` - Add members (MANAGER+)
/// - `DELETE /api/teams/:id/members/:user_id` - Remove a member (MANAGER+)

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
    auth::{authorization::require_role, middleware::AuthContext},
    models::{
        team::{CreateTeam, Team, UpdateTeam},
        user::{Role, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial members
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

/// Update team request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Add members request
#[derive(Debug, Deserialize)]
pub struct AddMembersRequest {
    /// Users to add (duplicates are no-ops)
    pub member_ids: Vec<Uuid>,
}

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct TeamListQuery {
    /// Maximum rows to return
    pub limit: Option<i64>,

    /// Rows to skip
    pub offset: Option<i64>,
}

/// Team list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamListResponse {
    /// Teams on this page
    pub teams: Vec<Team>,
}

/// Member list response
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberListResponse {
    /// Team members, oldest first
    pub members: Vec<User>,
}

/// Creates a team with optional initial members (MANAGER+)
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<Json<Team>> {
    require_role(&auth, Role::Manager)?;
    req.validate().map_err(validation_error)?;

    for user_id in &req.member_ids {
        ensure_user_exists(&state, *user_id).await?;
    }

    let team = Team::create(
        &state.db,
        CreateTeam {
            name: req.name,
            description: req.description,
            created_by: auth.user_id,
            member_ids: req.member_ids,
        },
    )
    .await?;

    tracing::info!(team_id = %team.id, created_by = %auth.user_id, "Created team");

    Ok(Json(team))
}

/// Lists teams with pagination
pub async fn list_teams(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(query): Query<TeamListQuery>,
) -> ApiResult<Json<TeamListResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let teams = Team::list(&state.db, limit, offset).await?;

    Ok(Json(TeamListResponse { teams }))
}

/// Gets a single team
pub async fn get_team(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Team>> {
    let team = Team::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(Json(team))
}

/// Updates a team (MANAGER+)
pub async fn update_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> ApiResult<Json<Team>> {
    require_role(&auth, Role::Manager)?;
    req.validate().map_err(validation_error)?;

    let team = Team::update(
        &state.db,
        id,
        UpdateTeam {
            name: req.name,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(Json(team))
}

/// Deletes a team (ADMIN)
///
/// Memberships go with the team; tasks pointing at it are detached.
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_role(&auth, Role::Admin)?;

    let deleted = Team::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Team not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

/// Lists a team's members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MemberListResponse>> {
    ensure_team_exists(&state, id).await?;

    let members = Team::list_members(&state.db, id).await?;

    Ok(Json(MemberListResponse { members }))
}

/// Adds members to a team (MANAGER+; duplicates are no-ops)
pub async fn add_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMembersRequest>,
) -> ApiResult<Json<MemberListResponse>> {
    require_role(&auth, Role::Manager)?;

    ensure_team_exists(&state, id).await?;
    for user_id in &req.member_ids {
        ensure_user_exists(&state, *user_id).await?;
    }

    Team::add_members(&state.db, id, &req.member_ids).await?;

    let members = Team::list_members(&state.db, id).await?;

    Ok(Json(MemberListResponse { members }))
}

/// Removes a member from a team (MANAGER+)
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    require_role(&auth, Role::Manager)?;

    ensure_team_exists(&state, id).await?;

    let removed = Team::remove_member(&state.db, id, user_id).await?;

    Ok(Json(serde_json::json!({ "removed": removed })))
}

/// 404 unless the team exists
async fn ensure_team_exists(state: &AppState, team_id: Uuid) -> ApiResult<()> {
    Team::find_by_id(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(())
}

/// 404 unless the user exists
async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> ApiResult<()> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(())
}
