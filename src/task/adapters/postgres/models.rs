//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Task description.
    pub description: String,
    /// Normalized creator identity.
    pub creator: String,
    /// Normalized assignee identities.
    pub assignees: Vec<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional notes.
    pub notes: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Task description.
    pub description: String,
    /// Normalized creator identity.
    pub creator: String,
    /// Normalized assignee identities.
    pub assignees: Vec<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional notes.
    pub notes: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for full-record updates. `None` writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task description.
    pub description: String,
    /// Normalized assignee identities.
    pub assignees: Vec<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional notes.
    pub notes: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
