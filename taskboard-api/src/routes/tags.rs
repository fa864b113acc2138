/// Tag endpoints
///
/// Tags are reached only through a task: every route re-checks that the task
/// exists in the claimed project and is not `done` before any mutation, and
/// that the tag is actually linked to that task. A tag ID that exists but is
/// linked to a different task is a plain 404.
///
/// # Endpoints
///
/// - `POST   /v1/projects/:project_id/tasks/:task_id/tags` - Create and link tag
/// - `GET    /v1/projects/:project_id/tasks/:task_id/tags` - List a task's tags
/// - `PUT    /v1/projects/:project_id/tasks/:task_id/tags/:tag_id` - Rename tag
/// - `DELETE /v1/projects/:project_id/tasks/:task_id/tags/:tag_id` - Delete tag

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{tag::Tag, task::Task},
};
use uuid::Uuid;
use validator::Validate;

/// Create or rename tag request
#[derive(Debug, Deserialize, Validate)]
pub struct TagRequest {
    /// Tag title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
}

/// Create a tag and link it to a task
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<TagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let task = load_task(&state, project_id, task_id, auth).await?;
    task.ensure_editable()?;
    req.validate()?;

    let tag = Tag::create_for_task(&state.db, task.id, req.title).await?;

    Ok((StatusCode::CREATED, Json(tag)))
}

/// List a task's tags
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<Tag>>> {
    let task = load_task(&state, project_id, task_id, auth).await?;

    let tags = Tag::list_for_task(&state.db, task.id).await?;

    Ok(Json(tags))
}

/// Rename a tag linked to a task
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id, tag_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(req): Json<TagRequest>,
) -> ApiResult<Json<Tag>> {
    let task = load_task(&state, project_id, task_id, auth).await?;
    task.ensure_editable()?;
    req.validate()?;

    if !Tag::is_linked(&state.db, task.id, tag_id).await? {
        return Err(ApiError::NotFound("Tag not found".to_string()));
    }

    let tag = Tag::update(&state.db, tag_id, req.title)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(Json(tag))
}

/// Delete a tag linked to a task
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id, tag_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let task = load_task(&state, project_id, task_id, auth).await?;
    task.ensure_editable()?;

    if !Tag::is_linked(&state.db, task.id, tag_id).await? {
        return Err(ApiError::NotFound("Tag not found".to_string()));
    }

    Tag::delete(&state.db, tag_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Authorizes the caller and loads the task scoped to the project
async fn load_task(
    state: &AppState,
    project_id: Uuid,
    task_id: Uuid,
    auth: AuthContext,
) -> Result<Task, ApiError> {
    authorization::require_owner_or_member(&state.db, project_id, auth.user_id).await?;

    let task = Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(task)
}
