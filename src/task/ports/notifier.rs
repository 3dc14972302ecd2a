//! Outbound messaging port.

use crate::task::domain::{Identity, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Delivery contract for the chat gateway.
///
/// Delivery is best effort. Callers log failures and carry on; a failed
/// message never rolls back the task change that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempts to deliver one message.
    async fn notify(&self, notification: &Notification) -> NotifierResult<()>;
}

/// Reply button attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Identifier echoed back by the gateway when the button is pressed.
    pub id: String,
    /// Button caption.
    pub label: String,
}

impl NotificationAction {
    /// Prefix of the button id that completes a task.
    pub const COMPLETE_PREFIX: &'static str = "complete_";

    /// Builds the "Mark as Done" button for a task.
    #[must_use]
    pub fn complete(task_id: TaskId) -> Self {
        Self {
            id: format!("{}{task_id}", Self::COMPLETE_PREFIX),
            label: "Mark as Done".to_owned(),
        }
    }
}

/// One outbound message addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Normalized recipient identity.
    pub recipient: Identity,
    /// Rendered message body.
    pub body: String,
    /// Optional reply buttons.
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Creates a plain text notification.
    #[must_use]
    pub fn text(recipient: Identity, body: impl Into<String>) -> Self {
        Self {
            recipient,
            body: body.into(),
            actions: Vec::new(),
        }
    }

    /// Attaches a reply button.
    #[must_use]
    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// Errors returned by notifier adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifierError {
    /// The gateway did not accept the message.
    #[error("delivery to {recipient} failed: {reason}")]
    DeliveryFailure {
        /// Intended recipient.
        recipient: Identity,
        /// Gateway-supplied or adapter-supplied reason.
        reason: String,
    },
}
