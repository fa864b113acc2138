/// Task model and database operations
///
/// Tasks belong to a project and move through a small status machine:
/// `pending` (initial) ↔ `ongoing` → `done`. `done` is terminal: once a task
/// reaches it, no update or delete succeeds. The terminal check is
/// centralized in [`Task::ensure_editable`] and invoked by every
/// task-mutating and tag-mutating operation.
///
/// A task may be assigned to a user; the assignee must be the owner or a
/// member of the task's project. That rule is enforced by the callers via
/// the authorization predicates, and re-checked on reassignment.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'ongoing', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     assigned_member_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     status task_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

/// Task status enumeration
///
/// Transitions between `Pending` and `Ongoing` are unrestricted in either
/// direction; `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Initial status of every new task
    Pending,

    /// Work in progress
    Ongoing,

    /// Terminal: no further mutation permitted
    Done,
}

impl sqlx::postgres::PgHasArrayType for TaskStatus {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_task_status")
    }
}

impl TaskStatus {
    /// Status as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Ongoing => "ongoing",
            TaskStatus::Done => "done",
        }
    }

    /// True for statuses that freeze the task
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "ongoing" => Ok(TaskStatus::Ongoing),
            "done" => Ok(TaskStatus::Done),
            other => Err(UnknownStatusError(other.to_string())),
        }
    }
}

/// Error for status strings outside the closed enumeration
#[derive(Debug, thiserror::Error)]
#[error("Unknown task status: {0}")]
pub struct UnknownStatusError(pub String);

/// Error raised when a mutation reaches a task in the terminal status
#[derive(Debug, thiserror::Error)]
#[error("Task {0} is done and can no longer be modified")]
pub struct DoneTaskError(pub Uuid);

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Assigned user, if any; must be owner-or-member of the project
    pub assigned_member_id: Option<Uuid>,

    /// Current status
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// Tags are created fresh and linked to the task; titles are not
/// deduplicated against existing tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning project
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional assignee (validated as owner-or-member by the caller)
    pub assigned_member_id: Option<Uuid>,

    /// Tag titles to create and link
    pub tags: Vec<String>,
}

/// Input for a partial task update
///
/// Only `Some` fields are written. The nullable columns use a second
/// `Option` layer so "not supplied" (outer `None`) stays distinguishable
/// from "supplied as null" (`Some(None)`), which clears the column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description; `Some(None)` clears it
    pub description: Option<Option<String>>,

    /// New assignee (validated as owner-or-member by the caller);
    /// `Some(None)` un-assigns the task
    pub assigned_member_id: Option<Option<Uuid>>,

    /// New status
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assigned_member_id.is_none()
            && self.status.is_none()
    }
}

/// Filter for listing tasks within a project
///
/// Within each dimension the values are OR-ed; when both dimensions are
/// present they are AND-ed. Tag values match by case-insensitive substring
/// on the tag title.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Statuses to include (any match)
    pub statuses: Option<Vec<TaskStatus>>,

    /// Tag title substrings (any match)
    pub tags: Option<Vec<String>>,
}

impl Task {
    /// Creates a task, along with its fresh tags, in one transaction
    ///
    /// The initial status is always `pending`.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, description, assigned_member_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, title, description, assigned_member_id, status, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.assigned_member_id)
        .fetch_one(&mut *tx)
        .await?;

        for title in data.tags {
            let (tag_id,): (Uuid,) =
                sqlx::query_as("INSERT INTO tags (title) VALUES ($1) RETURNING id")
                    .bind(title)
                    .fetch_one(&mut *tx)
                    .await?;

            sqlx::query("INSERT INTO task_tags (task_id, tag_id) VALUES ($1, $2)")
                .bind(task.id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, assigned_member_id, status, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID scoped to a project
    ///
    /// Returns `None` when the task does not exist or belongs to a different
    /// project; callers treat both as not found.
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, assigned_member_id, status, created_at
            FROM tasks
            WHERE id = $1 AND project_id = $2
            "#,
        )
        .bind(task_id)
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update
    ///
    /// Callers must run [`Task::ensure_editable`] and re-validate any new
    /// assignee first. The nullable columns bind a presence flag alongside
    /// the value, so a present-but-null field writes NULL instead of keeping
    /// the old value. Returns `None` if the task no longer exists.
    pub async fn update(
        pool: &PgPool,
        task_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                assigned_member_id = CASE WHEN $5 THEN $6 ELSE assigned_member_id END,
                status = COALESCE($7, status)
            WHERE id = $1
            RETURNING id, project_id, title, description, assigned_member_id, status, created_at
            "#,
        )
        .bind(task_id)
        .bind(data.title)
        .bind(data.description.is_some())
        .bind(data.description.flatten())
        .bind(data.assigned_member_id.is_some())
        .bind(data.assigned_member_id.flatten())
        .bind(data.status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task; linked tag rows cascade
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, task_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the tasks of a project, optionally filtered
    ///
    /// The filter dimensions compile into a single statement: a NULL array
    /// disables its branch, otherwise statuses match with `= ANY` and tag
    /// substrings with `ILIKE ANY` over the task's linked tags.
    pub async fn list(
        pool: &PgPool,
        project_id: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tag_patterns: Option<Vec<String>> = filter
            .tags
            .as_ref()
            .map(|tags| tags.iter().map(|t| format!("%{}%", t)).collect());

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, assigned_member_id, status, created_at
            FROM tasks
            WHERE project_id = $1
              AND ($2::task_status[] IS NULL OR status = ANY($2))
              AND ($3::text[] IS NULL OR EXISTS (
                  SELECT 1
                  FROM task_tags tt
                  JOIN tags g ON g.id = tt.tag_id
                  WHERE tt.task_id = tasks.id AND g.title ILIKE ANY($3)
              ))
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .bind(filter.statuses.clone())
        .bind(tag_patterns)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Clears a user's task assignments within a project
    ///
    /// Used when a member is removed, so no task keeps an assignee who is no
    /// longer owner-or-member.
    pub async fn unassign_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET assigned_member_id = NULL
            WHERE project_id = $1 AND assigned_member_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// The single terminal-state guard
    ///
    /// Every mutation of a task, or of a tag through a task, calls this
    /// before touching the store.
    pub fn ensure_editable(&self) -> Result<(), DoneTaskError> {
        if self.status.is_terminal() {
            return Err(DoneTaskError(self.id));
        }

        Ok(())
    }
}
