/// User account endpoints
///
/// Listing returns the public view only; the credential hash never leaves
/// the store. Self-service updates go through `/me` so a caller can only
/// modify their own account. A password change requires the old password
/// alongside the new one, verified before the new hash is written.
///
/// # Endpoints
///
/// - `GET    /v1/users` - List users (public view)
/// - `PUT    /v1/users/me` - Update own account
/// - `DELETE /v1/users/:user_id` - Delete an account

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
    auth::{middleware::AuthContext, password},
    models::user::{PublicUser, UpdateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Update own account request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    /// New display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Current password; required together with `new_password`
    pub old_password: Option<String>,

    /// New password; required together with `old_password`
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: Option<String>,
}

/// List all users (public view)
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list(&state.db).await?;
    let users = users.into_iter().map(PublicUser::from).collect();

    Ok(Json(users))
}

/// Update the caller's own account
///
/// # Errors
///
/// - `400 Bad Request`: Empty update, only one password field supplied, or
///   email already registered
/// - `401 Unauthorized`: Old password does not match
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<PublicUser>> {
    req.validate()?;

    let password_hash = match (&req.old_password, &req.new_password) {
        (Some(old), Some(new)) => {
            let user = User::find_by_id(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

            let valid = password::verify_password(old, &user.password_hash)?;
            if !valid {
                return Err(ApiError::Unauthorized(
                    "Old password is incorrect".to_string(),
                ));
            }

            Some(password::hash_password(new)?)
        }
        (None, None) => None,
        _ => {
            return Err(ApiError::BadRequest(
                "Changing the password requires both old_password and new_password".to_string(),
            ));
        }
    };

    let update = UpdateUser {
        name: req.name,
        email: req.email,
        password_hash,
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one field must be supplied".to_string(),
        ));
    }

    let user = User::update(&state.db, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(PublicUser::from(user)))
}

/// Delete a user account
///
/// Owned projects cascade; task assignments elsewhere are cleared by the
/// store (ON DELETE SET NULL).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = User::delete(&state.db, user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
