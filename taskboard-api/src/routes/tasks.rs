/// Task endpoints
///
/// Tasks live strictly inside a project: every route is project-scoped,
/// opens with the owner-or-member gate, and loads the task through the
/// project-scoped lookup so a task ID from another project is a plain 404.
///
/// A `done` task is terminal: update and delete are refused with 403, as is
/// any tag mutation through it (see `routes::tags`).
///
/// # Endpoints
///
/// - `POST   /v1/projects/:project_id/tasks` - Create task
/// - `GET    /v1/projects/:project_id/tasks` - List with optional filters
/// - `GET    /v1/projects/:project_id/tasks/:task_id` - Task detail with tags
/// - `PUT    /v1/projects/:project_id/tasks/:task_id` - Partial update
/// - `DELETE /v1/projects/:project_id/tasks/:task_id` - Delete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        tag::Tag,
        task::{CreateTask, Task, TaskFilter, TaskStatus, UpdateTask},
        user::PublicUser,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional assignee; must be owner-or-member of the project
    pub assigned_member_id: Option<Uuid>,

    /// Tag titles to create and link
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update task request
///
/// The nullable fields are presence-tagged: omitting `description` keeps
/// it, sending `"description": null` clears it, and the same for
/// `assigned_member_id` (null un-assigns the task).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description; null clears it
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,

    /// New assignee; null un-assigns, a user must be owner-or-member
    #[serde(default, deserialize_with = "super::double_option")]
    pub assigned_member_id: Option<Option<Uuid>>,

    /// New status
    pub status: Option<TaskStatus>,
}

/// Query parameters for listing tasks
///
/// Each parameter accepts a single value or a comma-separated set
/// (`?status=pending,ongoing&tag=ui`). Values within a dimension are OR-ed,
/// dimensions are AND-ed.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Status filter
    pub status: Option<String>,

    /// Tag title substring filter
    pub tag: Option<String>,
}

impl ListTasksQuery {
    /// Parses the raw query strings into a [`TaskFilter`]
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for an unknown status value.
    pub fn into_filter(self) -> Result<TaskFilter, ApiError> {
        let statuses = self
            .status
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        TaskStatus::from_str(s)
                            .map_err(|e| ApiError::BadRequest(e.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .filter(|v| !v.is_empty());

        let tags = self
            .tag
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty());

        Ok(TaskFilter { statuses, tags })
    }
}

/// Task detail view with assignee and tags
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    /// The task itself
    #[serde(flatten)]
    pub task: Task,

    /// Assignee's public view, if assigned
    pub assignee: Option<PublicUser>,

    /// Tags linked to the task
    pub tags: Vec<Tag>,
}

/// Create a task in a project
///
/// The initial status is always `pending`. An assignee, when given, must
/// independently pass the owner-or-member gate.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    authorization::require_owner_or_member(&state.db, project_id, auth.user_id).await?;
    req.validate()?;

    if let Some(assignee) = req.assigned_member_id {
        ensure_assignable(&state, project_id, assignee).await?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id,
            title: req.title,
            description: req.description,
            assigned_member_id: req.assigned_member_id,
            tags: req.tags,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List a project's tasks with optional status and tag filters
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    authorization::require_owner_or_member(&state.db, project_id, auth.user_id).await?;

    let filter = query.into_filter()?;
    let tasks = Task::list(&state.db, project_id, &filter).await?;

    Ok(Json(tasks))
}

/// Get a task's detail view, including assignee and tags
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<TaskDetail>> {
    authorization::require_owner_or_member(&state.db, project_id, auth.user_id).await?;

    let task = Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let assignee = match task.assigned_member_id {
        Some(user_id) => taskboard_shared::models::user::User::find_by_id(&state.db, user_id)
            .await?
            .map(PublicUser::from),
        None => None,
    };
    let tags = Tag::list_for_task(&state.db, task.id).await?;

    Ok(Json(TaskDetail {
        task,
        assignee,
        tags,
    }))
}

/// Update a task
///
/// Status transitions are free among pending/ongoing/done, except that a
/// task already `done` cannot be modified at all (403). Reassignment
/// re-validates the new assignee against the gate.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    authorization::require_owner_or_member(&state.db, project_id, auth.user_id).await?;
    req.validate()?;

    let task = Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    task.ensure_editable()?;

    let update = UpdateTask {
        title: req.title,
        description: req.description,
        assigned_member_id: req.assigned_member_id,
        status: req.status,
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one field must be supplied".to_string(),
        ));
    }

    // Un-assigning (present-but-null) needs no gate; a new assignee does
    if let Some(Some(assignee)) = update.assigned_member_id {
        ensure_assignable(&state, project_id, assignee).await?;
    }

    let task = Task::update(&state.db, task.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete a task
///
/// A `done` task cannot be deleted.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    authorization::require_owner_or_member(&state.db, project_id, auth.user_id).await?;

    let task = Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    task.ensure_editable()?;

    Task::delete(&state.db, task.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Verifies that a prospective assignee is owner-or-member of the project
async fn ensure_assignable(
    state: &AppState,
    project_id: Uuid,
    assignee: Uuid,
) -> Result<(), ApiError> {
    let allowed = authorization::is_owner_or_member(&state.db, project_id, assignee)
        .await
        .map_err(|e| ApiError::InternalError(format!("Database error: {}", e)))?;

    if !allowed {
        return Err(ApiError::Forbidden(
            "Assignee is not a member of this project".to_string(),
        ));
    }

    Ok(())
}
