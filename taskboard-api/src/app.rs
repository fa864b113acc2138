/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::{
    jwt,
    middleware::{AuthContext, AuthError},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
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

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                                  # Health check (public)
/// ├── /v1/
/// │   ├── /auth/                               # Public
/// │   │   ├── POST /register
/// │   │   ├── POST /login
/// │   │   └── POST /refresh
/// │   ├── /users/                              # Authenticated
/// │   │   ├── GET    /
/// │   │   ├── PUT    /me
/// │   │   └── DELETE /:user_id
/// │   └── /projects/                           # Authenticated
/// │       ├── POST   /
/// │       ├── GET    /
/// │       ├── GET    /:project_id
/// │       ├── PUT    /:project_id
/// │       ├── DELETE /:project_id
/// │       ├── /:project_id/members/
/// │       │   ├── POST   /
/// │       │   ├── GET    /
/// │       │   └── DELETE /
/// │       └── /:project_id/tasks/
/// │           ├── POST   /
/// │           ├── GET    /
/// │           ├── GET    /:task_id
/// │           ├── PUT    /:task_id
/// │           ├── DELETE /:task_id
/// │           └── /:task_id/tags/
/// │               ├── POST   /
/// │               ├── GET    /
/// │               ├── PUT    /:tag_id
/// │               └── DELETE /:tag_id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route-group basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Tag routes, nested under a task
    let tag_routes = Router::new()
        .route("/", post(routes::tags::create_tag))
        .route("/", get(routes::tags::list_tags))
        .route("/:tag_id", put(routes::tags::update_tag))
        .route("/:tag_id", delete(routes::tags::delete_tag));

    // Task routes, nested under a project
    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/", get(routes::tasks::list_tasks))
        .route("/:task_id", get(routes::tasks::get_task))
        .route("/:task_id", put(routes::tasks::update_task))
        .route("/:task_id", delete(routes::tasks::delete_task))
        .nest("/:task_id/tags", tag_routes);

    // Member routes, nested under a project
    let member_routes = Router::new()
        .route("/", post(routes::members::add_member))
        .route("/", get(routes::members::list_members))
        .route("/", delete(routes::members::remove_member));

    // Project routes (require JWT authentication)
    let project_routes = Router::new()
        .route("/", post(routes::projects::create_project))
        .route("/", get(routes::projects::list_projects))
        .route("/:project_id", get(routes::projects::get_project))
        .route("/:project_id", put(routes::projects::update_project))
        .route("/:project_id", delete(routes::projects::delete_project))
        .nest("/:project_id/members", member_routes)
        .nest("/:project_id/tasks", task_routes);

    // User routes (require JWT authentication)
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/me", put(routes::users::update_me))
        .route("/:user_id", delete(routes::users::delete_user));

    // Everything except /auth sits behind the JWT layer
    let authenticated_routes = Router::new()
        .nest("/projects", project_routes)
        .nest("/users", user_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(authenticated_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer access token from the Authorization
/// header, then injects an [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let auth_context = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
