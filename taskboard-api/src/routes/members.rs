/// Project membership endpoints
///
/// Adding and removing members is owner-only; listing them is open to any
/// owner-or-member. Members are addressed by email in both directions, the
/// public way users identify each other; the email resolves to a user (404
/// if absent) before the membership row is touched.
///
/// Removing a member also clears that member's task assignments in the
/// project, so no task keeps an assignee who can no longer see it.
///
/// # Endpoints
///
/// - `POST   /v1/projects/:project_id/members` - Add member by email (owner only)
/// - `GET    /v1/projects/:project_id/members` - List members
/// - `DELETE /v1/projects/:project_id/members` - Remove member (owner only)

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
    models::{
        membership::{CreateMembership, Membership},
        task::Task,
        user::{PublicUser, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Add member request
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Email of the user to add
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Remove member request
#[derive(Debug, Deserialize, Validate)]
pub struct RemoveMemberRequest {
    /// Email of the user to remove
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Add a user to a project by email (owner only)
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: No user with that email
/// - `400 Bad Request`: User is already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    authorization::require_owner(&state.db, project_id, auth.user_id).await?;
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if Membership::exists(&state.db, project_id, user.id).await? {
        return Err(ApiError::Conflict(
            "User is already a member of this project".to_string(),
        ));
    }

    Membership::create(
        &state.db,
        CreateMembership {
            project_id,
            user_id: user.id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

/// List a project's members (public view)
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    authorization::require_owner_or_member(&state.db, project_id, auth.user_id).await?;

    let members = Membership::list_members(&state.db, project_id).await?;

    Ok(Json(members))
}

/// Remove a member from a project by email (owner only)
///
/// The email resolves to a user first, then the membership row is removed,
/// so an unknown email and a known non-member produce distinct 404 messages.
/// The removed member's task assignments in the project are cleared in the
/// same request.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: No user with that email, or no membership row
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<RemoveMemberRequest>,
) -> ApiResult<StatusCode> {
    authorization::require_owner(&state.db, project_id, auth.user_id).await?;
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let removed = Membership::delete(&state.db, project_id, user.id).await?;
    if !removed {
        return Err(ApiError::NotFound("Membership not found".to_string()));
    }

    Task::unassign_member(&state.db, project_id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
