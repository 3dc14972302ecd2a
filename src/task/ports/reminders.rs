//! Port through which lifecycle operations arm and retract reminders.

use crate::task::domain::{Task, TaskId};
use chrono::{DateTime, Utc};

/// Why a schedule request did not arm a timer. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingSkip {
    /// The task has no due date.
    NoDueDate,
    /// The task is already completed.
    TaskCompleted,
    /// The reminder instant is not in the future.
    WindowElapsed,
    /// The scheduler has been shut down.
    SchedulerStopped,
}

/// Result of a schedule request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A one-shot timer is armed for the given instant.
    Armed {
        /// When the reminder fires.
        fires_at: DateTime<Utc>,
    },
    /// No timer is armed.
    Skipped(SchedulingSkip),
}

impl ScheduleOutcome {
    /// Returns `true` when a timer was armed.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        matches!(self, Self::Armed { .. })
    }
}

/// Reminder scheduling contract.
///
/// Both calls return once the timer table reflects the request; neither
/// waits for I/O.
#[cfg_attr(test, mockall::automock)]
pub trait ReminderScheduling: Send + Sync {
    /// Replaces any live reminder for the task with one derived from its
    /// current due date and status.
    fn schedule(&self, task: &Task) -> ScheduleOutcome;

    /// Retracts the live reminder for the task. Returns `false` when none
    /// was armed.
    fn cancel(&self, task_id: TaskId) -> bool;
}
