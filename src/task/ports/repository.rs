//! Repository port for task persistence and lookup.

use crate::task::domain::{Identity, Task, TaskId, TaskStatus};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// The store is the source of truth for every component. Writes are full
/// replacements keyed by task identifier with last-writer-wins semantics.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task matching `filter`, ordered by
    /// [`TaskFilter::ordering`].
    async fn find(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>>;

    /// Removes a task. Returns `false` when nothing was removed.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool>;
}

/// Query criteria for [`TaskRepository::find`]. Empty criteria match all
/// tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Match tasks where this identity is the creator or an assignee.
    pub participant: Option<Identity>,
    /// Match tasks assigned to at least one of these identities.
    pub any_assignee: Vec<Identity>,
    /// Match tasks in this status.
    pub status: Option<TaskStatus>,
    /// Match tasks with (`true`) or without (`false`) a due date.
    pub has_due_date: Option<bool>,
}

impl TaskFilter {
    /// Creates a filter that matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to tasks the identity created or is assigned to.
    #[must_use]
    pub fn with_participant(mut self, participant: Identity) -> Self {
        self.participant = Some(participant);
        self
    }

    /// Restricts results to tasks assigned to any of the identities.
    #[must_use]
    pub fn with_any_assignee(mut self, assignees: impl IntoIterator<Item = Identity>) -> Self {
        self.any_assignee = assignees.into_iter().collect();
        self
    }

    /// Restricts results to a status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts results to tasks with or without a due date.
    #[must_use]
    pub const fn with_due_date_present(mut self, present: bool) -> Self {
        self.has_due_date = Some(present);
        self
    }

    /// Open tasks that carry a due date: the reminder recovery set.
    #[must_use]
    pub fn open_with_due_date() -> Self {
        Self::new()
            .with_status(TaskStatus::Open)
            .with_due_date_present(true)
    }

    /// Returns `true` when `task` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let participant_matches = self
            .participant
            .as_ref()
            .is_none_or(|identity| task.is_participant(identity));
        let assignee_matches = self.any_assignee.is_empty()
            || task
                .assignees()
                .iter()
                .any(|assignee| self.any_assignee.contains(assignee));
        let status_matches = self.status.is_none_or(|status| task.status() == status);
        let due_date_matches = self
            .has_due_date
            .is_none_or(|present| task.due_date().is_some() == present);

        participant_matches && assignee_matches && status_matches && due_date_matches
    }

    /// Result ordering shared by all adapters: due date ascending with
    /// undated tasks last, then newest first.
    #[must_use]
    pub fn ordering(left: &Task, right: &Task) -> Ordering {
        let by_due_date = match (left.due_date(), right.due_date()) {
            (Some(left_due), Some(right_due)) => left_due.cmp(&right_due),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_due_date.then_with(|| right.created_at().cmp(&left.created_at()))
    }
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
