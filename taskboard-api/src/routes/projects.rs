/// Project endpoints
///
/// Project creation, listing, detail, update, and deletion. Update and
/// delete are owner-only and enforce ownership inside the SQL statement's
/// WHERE clause, so a non-owner (or a request for a missing project) gets a
/// plain 404 and never learns whether the project exists.
///
/// # Endpoints
///
/// - `POST   /v1/projects` - Create project
/// - `GET    /v1/projects` - List visible projects (owner or member)
/// - `GET    /v1/projects/:project_id` - Project detail with members and tasks
/// - `PUT    /v1/projects/:project_id` - Partial update (owner only)
/// - `DELETE /v1/projects/:project_id` - Delete (owner only)

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
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        membership::{CreateMembership, Membership},
        project::{CreateProject, Project, UpdateProject},
        task::{Task, TaskFilter},
        user::{PublicUser, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional initial members (duplicates ignored)
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

/// Update project request
///
/// The description is presence-tagged: omitting it keeps the current value,
/// sending `"description": null` clears it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description; null clears it
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,
}

/// Query parameters for listing projects
#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    /// Case-insensitive substring filter on the project name
    pub name: Option<String>,
}

/// Project detail view with owner, members, and tasks
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    /// The project itself
    #[serde(flatten)]
    pub project: Project,

    /// Owner's public view
    pub owner: Option<PublicUser>,

    /// Member users (public view)
    pub members: Vec<PublicUser>,

    /// The project's tasks
    pub tasks: Vec<Task>,
}

/// Create a new project
///
/// The caller becomes the owner. Optional `member_ids` are attached as
/// initial members; unknown or duplicate IDs are skipped.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            owner_id: auth.user_id,
        },
    )
    .await?;

    for member_id in req.member_ids {
        // The owner needs no membership row
        if member_id == auth.user_id {
            continue;
        }
        // Unknown IDs are skipped, not rejected
        if User::find_by_id(&state.db, member_id).await?.is_none() {
            continue;
        }
        if Membership::exists(&state.db, project.id, member_id).await? {
            continue;
        }

        Membership::create(
            &state.db,
            CreateMembership {
                project_id: project.id,
                user_id: member_id,
            },
        )
        .await?;
    }

    Ok((StatusCode::CREATED, Json(project)))
}

/// List the projects the caller can see (owned or member of)
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects =
        Project::list_for_user(&state.db, auth.user_id, query.name.as_deref()).await?;

    Ok(Json(projects))
}

/// Get a project's detail view, including owner, members, and tasks
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    authorization::require_owner_or_member(&state.db, project_id, auth.user_id).await?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let owner = User::find_by_id(&state.db, project.owner_id)
        .await?
        .map(PublicUser::from);
    let members = Membership::list_members(&state.db, project_id).await?;
    let tasks = Task::list(&state.db, project_id, &TaskFilter::default()).await?;

    Ok(Json(ProjectDetail {
        project,
        owner,
        members,
        tasks,
    }))
}

/// Update a project (owner only)
///
/// Returns 404 when the project is missing OR owned by someone else.
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let update = UpdateProject {
        name: req.name,
        description: req.description,
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one field must be supplied".to_string(),
        ));
    }

    let project = Project::update_owned(&state.db, project_id, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Delete a project (owner only)
///
/// Tasks, memberships, and tag links cascade. Same 404 semantics as update.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Project::delete_owned(&state.db, project_id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
