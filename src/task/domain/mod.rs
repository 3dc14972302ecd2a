//! Domain model for task lifecycle management.
//!
//! The task domain models creation, the open/completed state machine,
//! participant identities and authorization while keeping persistence and
//! messaging outside of the domain boundary.

mod access;
mod error;
mod identity;
mod ids;
mod task;

pub use access::authorize_participant;
pub use error::{AccessDenied, ParseTaskStatusError, TaskDomainError};
pub use identity::{Identity, parse_identities};
pub use ids::TaskId;
pub use task::{NewTask, PatchOutcome, PersistedTaskData, Task, TaskPatch, TaskStatus};
