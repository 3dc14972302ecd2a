//! Taskpulse: chat-driven task tracking with due-date reminders.
//!
//! People create, assign, complete and discuss short-lived tasks entirely
//! through chat commands. The crate enforces the task lifecycle with
//! participant-based authorization and keeps exactly one pending reminder
//! per open task with a due date, across edits, completions, deletions and
//! restarts.
//!
//! # Architecture
//!
//! Taskpulse follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, chat, etc.)
//!
//! # Modules
//!
//! - [`task`]: Task model, lifecycle service, storage and notifications
//! - [`reminder`]: One-shot reminder timers reconciled from the store
//! - [`command`]: Chat command parsing and dispatch
//! - [`config`]: TOML configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod command;
pub mod config;
pub mod reminder;
pub mod task;
pub mod telemetry;
