//! Participant-based authorization for per-user task mutations.

use super::{AccessDenied, Identity, Task};

/// Checks whether `actor` may change the status or notes of `task`.
///
/// The actor is normalized before comparison, so gateway suffixes and
/// formatting characters never affect the decision.
///
/// # Errors
///
/// Returns [`AccessDenied`] when the actor is neither the creator nor an
/// assignee.
pub fn authorize_participant(task: &Task, actor: &str) -> Result<Identity, AccessDenied> {
    let identity = Identity::normalize(actor);
    if task.is_participant(&identity) {
        Ok(identity)
    } else {
        Err(AccessDenied {
            task_id: task.id(),
            actor: identity,
        })
    }
}
