/// Project model and database operations
///
/// A project has exactly one owning user, fixed at creation (no ownership
/// transfer exists). Other users gain access via Membership rows; "owner or
/// member" is the access gate for everything project-scoped.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Owning user, immutable after creation
    pub owner_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Owning user (the creator)
    pub owner_id: Uuid,
}

/// Input for a partial project update
///
/// Only `Some` fields are written. The description is nullable, so it uses
/// a second `Option` layer: outer `None` means "not supplied", `Some(None)`
/// clears the column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description; `Some(None)` clears it
    pub description: Option<Option<String>>,
}

impl UpdateProject {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

impl Project {
    /// Creates a new project owned by `data.owner_id`
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Applies a partial update, gated on ownership
    ///
    /// The ownership check is part of the UPDATE's WHERE clause, so there is
    /// no gap between "check owner" and "mutate". Returns `None` when the
    /// project does not exist or the caller is not its owner; the two cases
    /// are intentionally indistinguishable.
    pub async fn update_owned(
        pool: &PgPool,
        project_id: Uuid,
        owner_id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($3, name),
                description = CASE WHEN $4 THEN $5 ELSE description END
            WHERE id = $1 AND owner_id = $2
            RETURNING id, name, description, owner_id, created_at
            "#,
        )
        .bind(project_id)
        .bind(owner_id)
        .bind(data.name)
        .bind(data.description.is_some())
        .bind(data.description.flatten())
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project, gated on ownership in the WHERE clause
    ///
    /// Tasks, memberships, and tag links cascade via foreign keys.
    /// Returns true if a row was deleted.
    pub async fn delete_owned(
        pool: &PgPool,
        project_id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(project_id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the projects a user can see: owned OR member of
    ///
    /// `name_filter`, when supplied, is a case-insensitive substring match
    /// on the project name.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        name_filter: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = name_filter.map(|f| format!("%{}%", f));

        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.owner_id, p.created_at
            FROM projects p
            WHERE (p.owner_id = $1
                   OR EXISTS (
                       SELECT 1 FROM memberships m
                       WHERE m.project_id = p.id AND m.user_id = $1
                   ))
              AND ($2::text IS NULL OR p.name ILIKE $2)
            ORDER BY p.created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_project_is_empty() {
        assert!(UpdateProject::default().is_empty());

        let update = UpdateProject {
            description: Some(Some("roadmap for q3".to_string())),
            ..Default::default()
        };
        assert!(!update.is_empty());

        // Clearing the description is still a non-empty update
        let update = UpdateProject {
            description: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
