/// Tag model and database operations
///
/// Tags attach to tasks through the `task_tags` join table and are only
/// reachable through a task; there is no standalone tag surface. Tag
/// creation never deduplicates by title, so two tasks tagged "urgent" hold
/// two distinct tag rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Tag model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Unique tag ID
    pub id: Uuid,

    /// Tag title
    pub title: String,

    /// When the tag was created
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Creates a tag and links it to a task, in one transaction
    pub async fn create_for_task(
        pool: &PgPool,
        task_id: Uuid,
        title: String,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (title) VALUES ($1) RETURNING id, title, created_at",
        )
        .bind(title)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO task_tags (task_id, tag_id) VALUES ($1, $2)")
            .bind(task_id)
            .bind(tag.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(tag)
    }

    /// Renames a tag
    ///
    /// Returns `None` if the tag does not exist.
    pub async fn update(
        pool: &PgPool,
        tag_id: Uuid,
        title: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            "UPDATE tags SET title = $2 WHERE id = $1 RETURNING id, title, created_at",
        )
        .bind(tag_id)
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Deletes a tag; its task links cascade
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, tag_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(tag_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the tags linked to a task
    pub async fn list_for_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.title, t.created_at
            FROM tags t
            JOIN task_tags tt ON tt.tag_id = t.id
            WHERE tt.task_id = $1
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Checks whether a tag is linked to a task
    pub async fn is_linked(
        pool: &PgPool,
        task_id: Uuid,
        tag_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM task_tags
                WHERE task_id = $1 AND tag_id = $2
            )
            "#,
        )
        .bind(task_id)
        .bind(tag_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}
