//! Message composition and fan-out for task events.
//!
//! Every method renders one message per recipient, hands each to the
//! [`Notifier`] and reports how many went through. Failures are logged and
//! counted; they never surface as errors.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use minijinja::Environment;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::task::{
    domain::{Identity, Task},
    ports::{Notification, NotificationAction, Notifier},
};

const CREATED_TEMPLATE: &str = "✅ Task created successfully!\n\n\
*{{ description }}*\n\
Assigned to: {{ assignees }}\n\
{% if due_on %}Due on: {{ due_on }}{% else %}No due date{% endif %}\n\
ID: {{ task_id }}";

const ASSIGNED_TEMPLATE: &str = "📋 You have been assigned a new task!\n\n\
*{{ description }}*\n\
From: {{ creator }}\n\
{% if due_on %}Due on: {{ due_on }}{% else %}No due date{% endif %}\n\
{% if notes %}Notes: {{ notes }}\n{% endif %}\
ID: {{ task_id }}";

const COMPLETED_TEMPLATE: &str = "✅ Task completed!\n\n\
*{{ description }}*\n\
Completed by: {{ actor }}\n\
Completed on: {{ event_on }}\n\
ID: {{ task_id }}";

const COMPLETION_CONFIRMATION_TEMPLATE: &str = "✅ Task marked as completed successfully!\n\n\
*{{ description }}*";

const REOPENED_TEMPLATE: &str = "🔄 Task reopened: \"{{ description }}\" by {{ actor }}\n\
ID: {{ task_id }}";

const NOTES_UPDATED_TEMPLATE: &str = "📝 Notes updated for task \"{{ description }}\" by {{ actor }}:\n\
{% if notes %}New notes: {{ notes }}{% else %}Notes cleared{% endif %}";

const DELETED_TEMPLATE: &str = "🗑️ Task deleted!\n\n\
*{{ description }}*\n\
Deleted by: {{ actor }}\n\
Deleted on: {{ event_on }}\n\
Task ID: {{ task_id }}";

const REMINDER_TEMPLATE: &str = "🔔 Reminder: Task \"{{ description }}\" is due on {{ due_on }}.\n\
ID: {{ task_id }}";

/// Actor shown when a privileged caller deletes a task.
const PRIVILEGED_ACTOR: &str = "admin";

/// Outcome of one notification fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    /// Messages the notifier accepted.
    pub delivered: usize,
    /// Messages the notifier rejected.
    pub failed: usize,
}

impl DeliveryReport {
    /// Total number of attempted messages.
    #[must_use]
    pub const fn attempted(self) -> usize {
        self.delivered + self.failed
    }
}

/// Formats instants in the single configured display zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone {
    offset: FixedOffset,
}

impl DisplayZone {
    /// Creates a zone from a fixed UTC offset.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates a zone `minutes` east of UTC. Returns `None` when the offset
    /// is a day or more.
    #[must_use]
    pub fn east_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    /// Formats an instant as `July 20, 2024 at 05:30 PM`.
    #[must_use]
    pub fn long(self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format("%B %-d, %Y at %I:%M %p")
            .to_string()
    }

    /// Formats an instant as `2024-07-20`.
    #[must_use]
    pub fn short_date(self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format("%Y-%m-%d")
            .to_string()
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

/// Template context shared by every task message.
#[derive(Debug, Serialize)]
struct MessageContext<'task> {
    task_id: String,
    description: &'task str,
    creator: &'task str,
    assignees: String,
    due_on: Option<String>,
    notes: Option<&'task str>,
    actor: Option<String>,
    event_on: Option<String>,
}

/// Composes and sends task event messages.
#[derive(Debug)]
pub struct TaskNotifications<N>
where
    N: Notifier,
{
    notifier: Arc<N>,
    zone: DisplayZone,
}

impl<N> Clone for TaskNotifications<N>
where
    N: Notifier,
{
    fn clone(&self) -> Self {
        Self {
            notifier: Arc::clone(&self.notifier),
            zone: self.zone,
        }
    }
}

impl<N> TaskNotifications<N>
where
    N: Notifier,
{
    /// Creates a fan-out helper over a notifier.
    #[must_use]
    pub const fn new(notifier: Arc<N>, zone: DisplayZone) -> Self {
        Self { notifier, zone }
    }

    /// Returns the display zone used for dates.
    #[must_use]
    pub const fn zone(&self) -> DisplayZone {
        self.zone
    }

    /// Returns the underlying notifier.
    #[must_use]
    pub const fn notifier(&self) -> &Arc<N> {
        &self.notifier
    }

    /// Confirms creation to the creator and informs every other assignee.
    pub async fn task_created(&self, task: &Task) -> DeliveryReport {
        let context = self.context(task, None, None);
        let confirmation = render(CREATED_TEMPLATE, &context, task);
        let assignment = render(ASSIGNED_TEMPLATE, &context, task);

        let mut outbox = vec![Notification::text(task.creator().clone(), confirmation)];
        outbox.extend(
            task.assignees()
                .iter()
                .filter(|assignee| *assignee != task.creator())
                .map(|assignee| {
                    Notification::text(assignee.clone(), assignment.clone())
                        .with_action(NotificationAction::complete(task.id()))
                }),
        );
        self.dispatch("task_created", task, outbox).await
    }

    /// Informs the creator and the other assignees, then confirms to the
    /// actor.
    pub async fn task_completed(&self, task: &Task, actor: &Identity) -> DeliveryReport {
        let context = self.context(task, Some(actor.as_str()), task.completed_at());
        let update = render(COMPLETED_TEMPLATE, &context, task);
        let confirmation = render(COMPLETION_CONFIRMATION_TEMPLATE, &context, task);

        let mut outbox: Vec<Notification> = task
            .participants()
            .into_iter()
            .filter(|participant| participant != actor)
            .map(|participant| Notification::text(participant, update.clone()))
            .collect();
        outbox.push(Notification::text(actor.clone(), confirmation));
        self.dispatch("task_completed", task, outbox).await
    }

    /// Informs every participant except the actor.
    pub async fn task_reopened(&self, task: &Task, actor: &Identity) -> DeliveryReport {
        let context = self.context(task, Some(actor.as_str()), None);
        let body = render(REOPENED_TEMPLATE, &context, task);
        let outbox = others(task, actor, &body);
        self.dispatch("task_reopened", task, outbox).await
    }

    /// Informs every participant except the actor.
    pub async fn notes_updated(&self, task: &Task, actor: &Identity) -> DeliveryReport {
        let context = self.context(task, Some(actor.as_str()), None);
        let body = render(NOTES_UPDATED_TEMPLATE, &context, task);
        let outbox = others(task, actor, &body);
        self.dispatch("notes_updated", task, outbox).await
    }

    /// Informs every participant once.
    pub async fn task_deleted(
        &self,
        task: &Task,
        actor: Option<&Identity>,
        deleted_at: DateTime<Utc>,
    ) -> DeliveryReport {
        let actor_label = actor.map_or(PRIVILEGED_ACTOR, Identity::as_str);
        let context = self.context(task, Some(actor_label), Some(deleted_at));
        let body = render(DELETED_TEMPLATE, &context, task);
        let outbox = task
            .participants()
            .into_iter()
            .map(|participant| Notification::text(participant, body.clone()))
            .collect();
        self.dispatch("task_deleted", task, outbox).await
    }

    /// Sends the due-date reminder to every participant once.
    pub async fn reminder(&self, task: &Task) -> DeliveryReport {
        let context = self.context(task, None, None);
        let body = render(REMINDER_TEMPLATE, &context, task);
        let outbox = task
            .participants()
            .into_iter()
            .map(|participant| {
                Notification::text(participant, body.clone())
                    .with_action(NotificationAction::complete(task.id()))
            })
            .collect();
        self.dispatch("reminder", task, outbox).await
    }

    /// Sends a free-form reply, logging any failure.
    pub async fn reply(&self, recipient: &Identity, body: impl Into<String>) -> DeliveryReport {
        let notification = Notification::text(recipient.clone(), body);
        let mut report = DeliveryReport::default();
        self.send_one(&notification, &mut report, "reply").await;
        report
    }

    fn context<'task>(
        &self,
        task: &'task Task,
        actor: Option<&str>,
        event_at: Option<DateTime<Utc>>,
    ) -> MessageContext<'task> {
        let assignees = task
            .assignees()
            .iter()
            .map(Identity::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        MessageContext {
            task_id: task.id().to_string(),
            description: task.description(),
            creator: task.creator().as_str(),
            assignees,
            due_on: task.due_date().map(|due| self.zone.long(due)),
            notes: task.notes(),
            actor: actor.map(str::to_owned),
            event_on: event_at.map(|instant| self.zone.long(instant)),
        }
    }

    async fn dispatch(
        &self,
        event: &'static str,
        task: &Task,
        outbox: Vec<Notification>,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for notification in &outbox {
            self.send_one(notification, &mut report, event).await;
        }
        debug!(
            task_id = %task.id(),
            event,
            delivered = report.delivered,
            failed = report.failed,
            "notification fan-out finished"
        );
        report
    }

    async fn send_one(
        &self,
        notification: &Notification,
        report: &mut DeliveryReport,
        event: &'static str,
    ) {
        match self.notifier.notify(notification).await {
            Ok(()) => report.delivered += 1,
            Err(err) => {
                report.failed += 1;
                warn!(
                    recipient = %notification.recipient,
                    event,
                    error = %err,
                    "notification delivery failed"
                );
            }
        }
    }
}

fn others(task: &Task, actor: &Identity, body: &str) -> Vec<Notification> {
    task.participants()
        .into_iter()
        .filter(|participant| participant != actor)
        .map(|participant| Notification::text(participant, body))
        .collect()
}

fn render(template: &str, context: &MessageContext<'_>, task: &Task) -> String {
    let environment = Environment::new();
    environment
        .render_str(template, context)
        .unwrap_or_else(|err| {
            warn!(task_id = %task.id(), error = %err, "message template failed to render");
            format!("Task update: {}\nID: {}", task.description(), task.id())
        })
}
