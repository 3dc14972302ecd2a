//! Service layer for task creation, state transitions and queries.

use crate::task::{
    domain::{
        AccessDenied, Identity, NewTask, Task, TaskDomainError, TaskId, TaskPatch, TaskStatus,
        authorize_participant, parse_identities,
    },
    ports::{
        Notifier, ReminderScheduling, TaskFilter, TaskRepository, TaskRepositoryError,
    },
    services::{locks::TaskLocks, notifications::TaskNotifications},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    description: String,
    creator: String,
    assignees: Vec<String>,
    due_date: Option<DateTime<Utc>>,
    notes: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields. Identities are raw and
    /// are normalized by the service.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        creator: impl Into<String>,
        assignees: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            description: description.into(),
            creator: creator.into(),
            assignees: assignees.into_iter().collect(),
            due_date: None,
            notes: None,
        }
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the initial notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns the raw creator identity.
    #[must_use]
    pub fn creator(&self) -> &str {
        &self.creator
    }

    fn into_new_task(self) -> Result<NewTask, TaskDomainError> {
        let mut new_task = NewTask::new(self.description, &self.creator, self.assignees)?;
        if let Some(due_date) = self.due_date {
            new_task = new_task.with_due_date(due_date);
        }
        if let Some(notes) = self.notes {
            new_task = new_task.with_notes(notes);
        }
        Ok(new_task)
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),
    /// No task exists for the identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// The actor may not change this task.
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::NotFound(task_id),
            other => Self::Repository(other),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every mutation is a read-modify-write against the repository performed
/// under a per-task lock, followed by reminder bookkeeping and a
/// best-effort notification fan-out.
#[derive(Clone)]
pub struct TaskLifecycleService<R, S, N, C>
where
    R: TaskRepository,
    S: ReminderScheduling,
    N: Notifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    reminders: Arc<S>,
    notifications: TaskNotifications<N>,
    clock: Arc<C>,
    locks: TaskLocks,
}

impl<R, S, N, C> TaskLifecycleService<R, S, N, C>
where
    R: TaskRepository,
    S: ReminderScheduling,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        reminders: Arc<S>,
        notifications: TaskNotifications<N>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            reminders,
            notifications,
            clock,
            locks: TaskLocks::new(),
        }
    }

    /// Returns the notification fan-out used by this service.
    #[must_use]
    pub const fn notifications(&self) -> &TaskNotifications<N> {
        &self.notifications
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Creates a task, arms its reminder and notifies the participants.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] when the description or
    /// assignee list is empty or an identity is malformed, and repository
    /// errors when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let new_task = request.into_new_task()?;
        let task = Task::create(new_task, &*self.clock);
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), creator = %task.creator(), "task created");

        if task.due_date().is_some() {
            let outcome = self.reminders.schedule(&task);
            debug!(task_id = %task.id(), ?outcome, "reminder requested for new task");
        }
        self.notifications.task_created(&task).await;
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Loads a task and checks that `actor` is its creator or an assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// and [`TaskLifecycleError::Forbidden`] when the actor is not a
    /// participant.
    pub async fn authorize(&self, task_id: TaskId, actor: &str) -> TaskLifecycleResult<Task> {
        let task = self.find_task_or_error(task_id).await?;
        authorize_participant(&task, actor)?;
        Ok(task)
    }

    /// Applies a generic field edit. Privileged: no participant check.
    ///
    /// The reminder is rescheduled only when the due date changes value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// and [`TaskLifecycleError::Validation`] when the patch is invalid.
    pub async fn edit(&self, task_id: TaskId, patch: TaskPatch) -> TaskLifecycleResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.find_task_or_error(task_id).await?;
        let outcome = task.apply_patch(patch, &*self.clock)?;
        self.repository.update(&task).await?;

        if outcome.due_date_changed {
            let schedule = self.reminders.schedule(&task);
            info!(task_id = %task_id, ?schedule, "due date changed, reminder rescheduled");
        }
        Ok(task)
    }

    /// Applies a participant's field edit and optional notes replacement
    /// under one lock and one write. `notes` of `None` leaves the notes
    /// untouched; a rejected patch changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] or
    /// [`TaskLifecycleError::Forbidden`] from the authorization check,
    /// [`TaskLifecycleError::Validation`] when the patch is invalid, and
    /// repository errors when persistence fails.
    pub async fn revise(
        &self,
        task_id: TaskId,
        patch: TaskPatch,
        notes: Option<String>,
        actor: &str,
    ) -> TaskLifecycleResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.find_task_or_error(task_id).await?;
        let actor_identity = authorize_participant(&task, actor)?;
        let outcome = task.apply_patch(patch, &*self.clock)?;
        let notes_replaced = notes.is_some();
        if notes_replaced {
            task.replace_notes(notes, &*self.clock);
        }
        self.repository.update(&task).await?;
        info!(task_id = %task_id, actor = %actor_identity, "task revised");

        if outcome.due_date_changed {
            let schedule = self.reminders.schedule(&task);
            info!(task_id = %task_id, ?schedule, "due date changed, reminder rescheduled");
        }
        if notes_replaced {
            self.notifications
                .notes_updated(&task, &actor_identity)
                .await;
        }
        Ok(task)
    }

    /// Marks a task completed on behalf of a participant.
    ///
    /// Completing an already completed task returns it unchanged and sends
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] or
    /// [`TaskLifecycleError::Forbidden`] from the authorization check, and
    /// repository errors when persistence fails.
    pub async fn complete(&self, task_id: TaskId, actor: &str) -> TaskLifecycleResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.find_task_or_error(task_id).await?;
        let actor_identity = authorize_participant(&task, actor)?;
        if !task.complete(&*self.clock) {
            debug!(task_id = %task_id, "task already completed");
            return Ok(task);
        }
        self.repository.update(&task).await?;
        self.reminders.cancel(task_id);
        info!(task_id = %task_id, actor = %actor_identity, "task completed");

        self.notifications
            .task_completed(&task, &actor_identity)
            .await;
        Ok(task)
    }

    /// Reopens a completed task on behalf of a participant and re-arms its
    /// reminder when the reminder window is still ahead.
    ///
    /// Reopening an open task returns it unchanged and sends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] or
    /// [`TaskLifecycleError::Forbidden`] from the authorization check, and
    /// repository errors when persistence fails.
    pub async fn reopen(&self, task_id: TaskId, actor: &str) -> TaskLifecycleResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.find_task_or_error(task_id).await?;
        let actor_identity = authorize_participant(&task, actor)?;
        if !task.reopen(&*self.clock) {
            debug!(task_id = %task_id, "task already open");
            return Ok(task);
        }
        self.repository.update(&task).await?;
        if task.due_date().is_some() {
            let outcome = self.reminders.schedule(&task);
            debug!(task_id = %task_id, ?outcome, "reminder requested for reopened task");
        }
        info!(task_id = %task_id, actor = %actor_identity, "task reopened");

        self.notifications
            .task_reopened(&task, &actor_identity)
            .await;
        Ok(task)
    }

    /// Replaces a task's notes on behalf of a participant. `None` or blank
    /// notes clear them.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] or
    /// [`TaskLifecycleError::Forbidden`] from the authorization check, and
    /// repository errors when persistence fails.
    pub async fn update_notes(
        &self,
        task_id: TaskId,
        notes: Option<String>,
        actor: &str,
    ) -> TaskLifecycleResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.find_task_or_error(task_id).await?;
        let actor_identity = authorize_participant(&task, actor)?;
        task.replace_notes(notes, &*self.clock);
        self.repository.update(&task).await?;
        info!(task_id = %task_id, actor = %actor_identity, "task notes updated");

        self.notifications
            .notes_updated(&task, &actor_identity)
            .await;
        Ok(task)
    }

    /// Deletes a task, retracting its reminder first. Privileged: no
    /// participant check. `actor` is only used in the notification text.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// and repository errors when persistence fails.
    pub async fn delete(&self, task_id: TaskId, actor: Option<&str>) -> TaskLifecycleResult<()> {
        let _guard = self.locks.acquire(task_id).await;
        let task = self.find_task_or_error(task_id).await?;
        self.reminders.cancel(task_id);
        match self.repository.delete(task_id).await {
            Ok(true) => {}
            Ok(false) => return Err(TaskLifecycleError::NotFound(task_id)),
            Err(err) => {
                warn!(
                    task_id = %task_id,
                    error = %err,
                    "task delete failed, restoring reminder"
                );
                self.reminders.schedule(&task);
                return Err(err.into());
            }
        }
        info!(task_id = %task_id, "task deleted");

        let actor_identity = actor
            .map(Identity::normalize)
            .filter(|identity| !identity.is_empty());
        self.notifications
            .task_deleted(&task, actor_identity.as_ref(), self.clock.utc())
            .await;
        Ok(())
    }

    /// Lists tasks the identity created or is assigned to.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the query fails.
    pub async fn list_for_participant(
        &self,
        identity: &str,
        open_only: bool,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let mut filter = TaskFilter::new().with_participant(Identity::normalize(identity));
        if open_only {
            filter = filter.with_status(TaskStatus::Open);
        }
        Ok(self.repository.find(&filter).await?)
    }

    /// Lists open tasks assigned to any of the identities.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] when an identity is
    /// malformed and [`TaskLifecycleError::Repository`] when the query fails.
    pub async fn list_for_assignees<I, T>(&self, assignees: I) -> TaskLifecycleResult<Vec<Task>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let identities = parse_identities(assignees)?;
        let filter = TaskFilter::new()
            .with_any_assignee(identities)
            .with_status(TaskStatus::Open);
        Ok(self.repository.find(&filter).await?)
    }

    /// Lists every open task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the query fails.
    pub async fn list_active(&self) -> TaskLifecycleResult<Vec<Task>> {
        let filter = TaskFilter::new().with_status(TaskStatus::Open);
        Ok(self.repository.find(&filter).await?)
    }
}
