/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `users`: User account endpoints
/// - `projects`: Project CRUD
/// - `members`: Project membership management
/// - `tasks`: Tasks within a project
/// - `tags`: Tags attached to a task

use serde::{Deserialize, Deserializer};

pub mod auth;
pub mod health;
pub mod members;
pub mod projects;
pub mod tags;
pub mod tasks;
pub mod users;

/// Deserializes a presence-tagged nullable field
///
/// Plain serde collapses a JSON `null` and a missing key into the same
/// `None` for `Option<Option<T>>`. This helper only runs when the key is
/// present (pair it with `#[serde(default)]`), so a missing key stays
/// `None` while `null` becomes `Some(None)` and a value `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
