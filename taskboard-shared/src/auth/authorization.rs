/// Project authorization predicates
///
/// The single access-control gate for everything project-scoped. A caller is
/// allowed to touch a project's resources iff they are the project's owner
/// or hold a membership row for it; owner-only operations (delete project,
/// manage members) use the narrower owner predicate.
///
/// The predicates are pure read-only queries, evaluated fresh on every call:
/// membership can change between requests, so no result is ever memoized.
/// The canonical argument order is `(pool, project_id, user_id)` everywhere.
///
/// Splitting the owner and member checks keeps owner-only operations
/// distinguishable from owner-or-member operations without duplicating
/// query logic.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::require_owner_or_member;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid)
/// # -> Result<(), Box<dyn std::error::Error>> {
/// require_owner_or_member(&pool, project_id, user_id).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User is not the owner of the project
    #[error("Not the owner of project {0}")]
    NotOwner(Uuid),

    /// User is neither owner nor member of the project
    #[error("Not owner or member of project {0}")]
    NotOwnerOrMember(Uuid),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks whether a user owns a project
///
/// True iff a project row exists with that id and owner.
pub async fn is_owner(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM projects
            WHERE id = $1 AND owner_id = $2
        )
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Checks whether a user holds a membership row for a project
pub async fn is_member(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM memberships
            WHERE project_id = $1 AND user_id = $2
        )
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Checks whether a user is the owner OR a member of a project
///
/// Logical OR of [`is_owner`] and [`is_member`], evaluated in a single
/// query.
pub async fn is_owner_or_member(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM projects p
            WHERE p.id = $1
              AND (p.owner_id = $2
                   OR EXISTS (
                       SELECT 1 FROM memberships m
                       WHERE m.project_id = p.id AND m.user_id = $2
                   ))
        )
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Requires that the user owns the project
///
/// # Errors
///
/// Returns `AuthzError::NotOwner` when the project does not exist or is
/// owned by someone else.
pub async fn require_owner(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    if !is_owner(pool, project_id, user_id).await? {
        return Err(AuthzError::NotOwner(project_id));
    }

    Ok(())
}

/// Requires that the user is the owner or a member of the project
///
/// This is the gate every project-scoped resource operation opens with.
///
/// # Errors
///
/// Returns `AuthzError::NotOwnerOrMember` when neither predicate holds.
pub async fn require_owner_or_member(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    if !is_owner_or_member(pool, project_id, user_id).await? {
        return Err(AuthzError::NotOwnerOrMember(project_id));
    }

    Ok(())
}
