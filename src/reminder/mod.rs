//! Reminder scheduling for tasks with due dates.
//!
//! [`ReminderScheduler`] keeps exactly one pending timer per open task whose
//! reminder instant lies in the future. Timers re-read the task from the
//! store when they fire, so edits, completions and deletions made after the
//! timer was armed are always honoured. [`ReminderPolicy`] decides when a
//! reminder fires relative to the due date.

mod policy;
mod scheduler;

pub use policy::{DEFAULT_LEAD_TIME_MINUTES, ReminderPolicy};
pub use scheduler::ReminderScheduler;

#[cfg(test)]
mod tests;
