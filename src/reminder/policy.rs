//! When a reminder fires relative to a task's due date.

use crate::task::{domain::Task, ports::SchedulingSkip};
use chrono::{DateTime, TimeDelta, Utc};

/// Default lead time between the reminder and the due date, in minutes.
pub const DEFAULT_LEAD_TIME_MINUTES: u32 = 360;

/// Reminder timing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPolicy {
    lead_time: TimeDelta,
}

impl ReminderPolicy {
    /// Creates a policy that reminds `lead_time` before the due date.
    #[must_use]
    pub const fn new(lead_time: TimeDelta) -> Self {
        Self { lead_time }
    }

    /// Creates a policy from a lead time in minutes.
    #[must_use]
    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(TimeDelta::minutes(i64::from(minutes)))
    }

    /// Returns the lead time.
    #[must_use]
    pub const fn lead_time(&self) -> TimeDelta {
        self.lead_time
    }

    /// Returns the reminder instant for a due date.
    #[must_use]
    pub fn reminder_time(&self, due_date: DateTime<Utc>) -> DateTime<Utc> {
        due_date
            .checked_sub_signed(self.lead_time)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Decides whether a reminder should be armed for `task` at `now`.
    ///
    /// # Errors
    ///
    /// Returns the [`SchedulingSkip`] reason when no reminder is due: the
    /// task has no due date, is completed, or its reminder instant is not
    /// after `now`.
    pub fn decide(&self, task: &Task, now: DateTime<Utc>) -> Result<DateTime<Utc>, SchedulingSkip> {
        let due_date = task.due_date().ok_or(SchedulingSkip::NoDueDate)?;
        if task.status().is_completed() {
            return Err(SchedulingSkip::TaskCompleted);
        }
        let fires_at = self.reminder_time(due_date);
        if fires_at <= now {
            return Err(SchedulingSkip::WindowElapsed);
        }
        Ok(fires_at)
    }
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_LEAD_TIME_MINUTES)
    }
}
