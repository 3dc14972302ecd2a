//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod notifier;
pub mod reminders;
pub mod repository;

pub use notifier::{Notification, NotificationAction, Notifier, NotifierError, NotifierResult};
pub use reminders::{ReminderScheduling, ScheduleOutcome, SchedulingSkip};
pub use repository::{TaskFilter, TaskRepository, TaskRepositoryError, TaskRepositoryResult};
