/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation
/// - JWT token generation
/// - API client helpers

use axum::body::Body;
use axum::http::Request;
use sqlx::PgPool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims, TokenType};
use taskboard_shared::auth::password;
use taskboard_shared::models::project::{CreateProject, Project};
use taskboard_shared::models::user::{CreateUser, User};
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh primary user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = create_test_user(&db, "primary").await?;

        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Creates an additional user with their own access token
    pub async fn other_user(&self) -> anyhow::Result<(User, String)> {
        let user = create_test_user(&self.db, "other").await?;

        let claims = Claims::new(user.id, TokenType::Access);
        let token = create_token(&claims, &self.config.jwt.secret)?;

        Ok((user, token))
    }

    /// Cleans up test data
    ///
    /// Deleting the primary user cascades to owned projects, memberships,
    /// tasks, and tag links.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Creates a user with a unique email and a real password hash
pub async fn create_test_user(db: &PgPool, label: &str) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            name: format!("Test {}", label),
            email: format!("test-{}-{}@example.com", label, Uuid::new_v4()),
            password_hash: password::hash_password("correct horse battery")?,
        },
    )
    .await?;

    Ok(user)
}

/// Creates a project owned by the context's primary user
pub async fn create_test_project(ctx: &TestContext, name: &str) -> anyhow::Result<Project> {
    let project = Project::create(
        &ctx.db,
        CreateProject {
            name: name.to_string(),
            description: None,
            owner_id: ctx.user.id,
        },
    )
    .await?;

    Ok(project)
}

/// Builds a JSON request with the given bearer token
pub fn json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a bodyless request with the given bearer token
pub fn empty_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Reads a response body as JSON
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
