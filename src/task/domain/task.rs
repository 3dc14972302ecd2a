//! Task aggregate root and related lifecycle types.

use super::{Identity, ParseTaskStatusError, TaskDomainError, TaskId, identity::parse_identities};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is awaiting completion.
    Open,
    /// Task has been marked done.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Completed => "COMPLETED",
        }
    }

    /// Returns `true` for [`TaskStatus::Completed`].
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "OPEN" => Ok(Self::Open),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    description: String,
    creator: Identity,
    assignees: Vec<Identity>,
    due_date: Option<DateTime<Utc>>,
    notes: Option<String>,
}

impl NewTask {
    /// Validates and normalizes the required creation fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] for a blank description,
    /// [`TaskDomainError::NoAssignees`] for an empty assignee list, and
    /// [`TaskDomainError::InvalidIdentity`] when the creator or an assignee
    /// has no digits.
    pub fn new<I, S>(
        description: impl Into<String>,
        creator: &str,
        assignees: I,
    ) -> Result<Self, TaskDomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let validated_description = validate_description(description.into())?;
        let validated_assignees = validate_assignees(assignees)?;
        Ok(Self {
            description: validated_description,
            creator: Identity::parse(creator)?,
            assignees: validated_assignees,
            due_date: None,
            notes: None,
        })
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the initial notes. Blank notes are ignored.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = normalize_notes(Some(notes.into()));
        self
    }
}

/// Field changes accepted by the generic edit operation.
///
/// Status and notes are deliberately absent; they have dedicated operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement assignee list, as raw identities.
    pub assignees: Option<Vec<String>>,
    /// Replacement due date; `Some(None)` clears it.
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a replacement description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a replacement assignee list.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = String>) -> Self {
        self.assignees = Some(assignees.into_iter().collect());
        self
    }

    /// Sets a replacement due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    /// Clears the due date.
    #[must_use]
    pub const fn clearing_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }
}

/// What an applied patch actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchOutcome {
    /// The due date differs from its previous value.
    pub due_date_changed: bool,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    description: String,
    creator: Identity,
    assignees: Vec<Identity>,
    due_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted description.
    pub description: String,
    /// Persisted creator identity.
    pub creator: Identity,
    /// Persisted assignees in display order.
    pub assignees: Vec<Identity>,
    /// Persisted due date, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted notes, if any.
    pub notes: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new open task.
    #[must_use]
    pub fn create(new_task: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            description: new_task.description,
            creator: new_task.creator,
            assignees: new_task.assignees,
            due_date: new_task.due_date,
            notes: new_task.notes,
            status: TaskStatus::Open,
            created_at: timestamp,
            completed_at: None,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// The completion timestamp is reconciled with the status so that
    /// `status == Completed` holds exactly when `completed_at` is set.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        let completed_at = match data.status {
            TaskStatus::Open => None,
            TaskStatus::Completed => Some(data.completed_at.unwrap_or(data.updated_at)),
        };
        Self {
            id: data.id,
            description: data.description,
            creator: data.creator,
            assignees: data.assignees,
            due_date: data.due_date,
            notes: data.notes,
            status: data.status,
            created_at: data.created_at,
            completed_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the creator identity.
    #[must_use]
    pub const fn creator(&self) -> &Identity {
        &self.creator
    }

    /// Returns the assignees in display order.
    #[must_use]
    pub fn assignees(&self) -> &[Identity] {
        &self.assignees
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the completion timestamp while the task is completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the identity is the creator or an assignee.
    #[must_use]
    pub fn is_participant(&self, identity: &Identity) -> bool {
        !identity.is_empty() && (self.creator == *identity || self.assignees.contains(identity))
    }

    /// Returns the creator followed by every assignee, without repeats.
    #[must_use]
    pub fn participants(&self) -> Vec<Identity> {
        let mut participants = vec![self.creator.clone()];
        for assignee in &self.assignees {
            if !participants.contains(assignee) {
                participants.push(assignee.clone());
            }
        }
        participants
    }

    /// Marks the task completed.
    ///
    /// Returns `false` without touching the task when it is already
    /// completed.
    pub fn complete(&mut self, clock: &impl Clock) -> bool {
        if self.status.is_completed() {
            return false;
        }
        let timestamp = clock.utc();
        self.status = TaskStatus::Completed;
        self.completed_at = Some(timestamp);
        self.updated_at = timestamp;
        true
    }

    /// Reopens a completed task.
    ///
    /// Returns `false` without touching the task when it is already open.
    pub fn reopen(&mut self, clock: &impl Clock) -> bool {
        if !self.status.is_completed() {
            return false;
        }
        self.status = TaskStatus::Open;
        self.completed_at = None;
        self.touch(clock);
        true
    }

    /// Replaces the notes. Blank or absent notes clear them.
    pub fn replace_notes(&mut self, notes: Option<String>, clock: &impl Clock) {
        self.notes = normalize_notes(notes);
        self.touch(clock);
    }

    /// Applies a generic field edit.
    ///
    /// Validation happens before any field is written, so a rejected patch
    /// leaves the task unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the replacement description is blank
    /// or the replacement assignee list is empty or malformed.
    pub fn apply_patch(
        &mut self,
        patch: TaskPatch,
        clock: &impl Clock,
    ) -> Result<PatchOutcome, TaskDomainError> {
        let description = patch.description.map(validate_description).transpose()?;
        let assignees = patch.assignees.map(validate_assignees).transpose()?;

        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = assignees {
            self.assignees = value;
        }
        let mut outcome = PatchOutcome::default();
        if let Some(value) = patch.due_date {
            outcome.due_date_changed = value != self.due_date;
            self.due_date = value;
        }
        self.touch(clock);
        Ok(outcome)
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn validate_description(description: String) -> Result<String, TaskDomainError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyDescription);
    }
    Ok(trimmed.to_owned())
}

fn validate_assignees<I, S>(assignees: I) -> Result<Vec<Identity>, TaskDomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parsed = parse_identities(assignees)?;
    if parsed.is_empty() {
        return Err(TaskDomainError::NoAssignees);
    }
    Ok(parsed)
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
