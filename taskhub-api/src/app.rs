/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskhub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::auth::{jwt, middleware::AuthContext};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses
/// Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the signing secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── /auth/                       # Authentication (public)
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /refresh
///     │   └── POST /logout
///     ├── /users/                      # User management (authenticated)
///     ├── /tasks/                      # Task management (authenticated)
///     └── /teams/                      # Team management (authenticated)
/// ```
///
/// The auth layer wraps only the protected groups: it validates the
/// bearer token and injects `AuthContext` before any handler runs, so an
/// invalid token is rejected before role checks and role checks before
/// business logic.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout));

    // User routes (authenticated; role checks in handlers)
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", put(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user));

    // Task routes (authenticated)
    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/", get(routes::tasks::list_tasks))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/status", patch(routes::tasks::set_task_status))
        .route("/:id/assign", patch(routes::tasks::assign_task));

    // Team routes (authenticated)
    let team_routes = Router::new()
        .route("/", post(routes::teams::create_team))
        .route("/", get(routes::teams::list_teams))
        .route("/:id", get(routes::teams::get_team))
        .route("/:id", put(routes::teams::update_team))
        .route("/:id", delete(routes::teams::delete_team))
        .route("/:id/members", get(routes::teams::list_members))
        .route("/:id/members", post(routes::teams::add_members))
        .route(
            "/:id/members/:user_id",
            delete(routes::teams::remove_member),
        );

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/teams", team_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bearer token authentication middleware layer
///
/// Validates the access token from the Authorization header and injects
/// `AuthContext` into request extensions. All failures collapse into the
/// unified 401.
async fn auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(crate::error::ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(crate::error::ApiError::Unauthorized)?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::new(claims.sub, claims.username, claims.role);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
