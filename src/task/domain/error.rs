//! Error types for task domain validation and parsing.

use super::{Identity, TaskId};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The task has no assignees.
    #[error("task must have at least one assignee")]
    NoAssignees,

    /// The identity has no digits left after normalization.
    #[error("invalid identity '{0}', expected a phone-style address")]
    InvalidIdentity(String),

    /// The task identifier is not a valid UUID.
    #[error("invalid task identifier '{0}'")]
    InvalidTaskId(String),
}

/// Error returned when an actor is neither the creator nor an assignee.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{actor} is not a participant of task {task_id}")]
pub struct AccessDenied {
    /// Task the actor tried to act on.
    pub task_id: TaskId,
    /// Normalized actor identity.
    pub actor: Identity,
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
