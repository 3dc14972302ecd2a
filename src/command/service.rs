//! Dispatches parsed chat commands to the task lifecycle service.

use crate::command::parser::ChatCommand;
use crate::task::{
    domain::{Identity, Task, TaskId, TaskStatus},
    ports::{Notifier, ReminderScheduling, TaskRepository},
    services::{TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, warn};

const HELP_TEXT: &str = "Available commands:\n\
/create <TASK>, <ASSIGNEE(S)>, <[Optional] DATE>, <[Optional] NOTES> - Create a new task\n\
/update <ID>, [TASK], [@ASSIGNEES], [DATE], [NOTES] - Change a task\n\
/done <ID> - Mark a task as completed\n\
/reopen <ID> - Reopen a completed task\n\
/notes <ID> <TEXT> - Replace the notes of a task\n\
/delete <ID> - Delete a task\n\
/tasks - List all your active tasks\n\
/tasks/assignee - List tasks assigned to a specific person\n\
/tasks/assignee1:assignee2 - List tasks for multiple assignees\n\
/help - Show this help message";

const UNPARSED_TEXT: &str = "Could not understand your command.\n\
Format: /create Description, @assignee1 @assignee2, YYYY-MM-DD, notes\n\
Type /help for available commands.";

const UNKNOWN_TEXT: &str = "Unknown command. Type /help for available commands.";

const FAILURE_TEXT: &str =
    "There was an error processing your request. Please try again or contact support.";

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The message was not a command.
    Ignored,
    /// The sender received an informational reply.
    Answered,
    /// A task operation succeeded.
    Applied(TaskId),
    /// A task operation failed and the sender was told why.
    Rejected,
}

/// Routes chat messages to lifecycle operations and replies to senders.
pub struct ChatCommandService<R, S, N, C>
where
    R: TaskRepository,
    S: ReminderScheduling,
    N: Notifier,
    C: Clock + Send + Sync,
{
    lifecycle: TaskLifecycleService<R, S, N, C>,
    clock: Arc<C>,
}

impl<R, S, N, C> ChatCommandService<R, S, N, C>
where
    R: TaskRepository,
    S: ReminderScheduling,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a dispatcher over a lifecycle service.
    #[must_use]
    pub const fn new(lifecycle: TaskLifecycleService<R, S, N, C>, clock: Arc<C>) -> Self {
        Self { lifecycle, clock }
    }

    /// Returns the underlying lifecycle service.
    #[must_use]
    pub const fn lifecycle(&self) -> &TaskLifecycleService<R, S, N, C> {
        &self.lifecycle
    }

    /// Handles one message from `sender`.
    pub async fn handle(&self, sender: &str, text: &str) -> CommandOutcome {
        let reply_to = Identity::normalize(sender);
        if reply_to.is_empty() {
            debug!("message without a usable sender ignored");
            return CommandOutcome::Ignored;
        }
        let Some(command) = ChatCommand::parse(text, sender, self.clock.utc()) else {
            if text.trim_start().starts_with('/') {
                self.reply(&reply_to, UNPARSED_TEXT).await;
                return CommandOutcome::Answered;
            }
            return CommandOutcome::Ignored;
        };

        match command {
            ChatCommand::Help => self.answer(&reply_to, HELP_TEXT).await,
            ChatCommand::Unknown(name) => {
                debug!(command = %name, "unknown command");
                self.answer(&reply_to, UNKNOWN_TEXT).await
            }
            ChatCommand::ListMine => {
                let listing = self.lifecycle.list_for_participant(sender, true).await;
                self.answer_listing(&reply_to, "Your Active Tasks", listing)
                    .await
            }
            ChatCommand::ListAssigned(assignees) => {
                let title = format!("Tasks for {}", assignees.join(", "));
                let listing = self.lifecycle.list_for_assignees(&assignees).await;
                self.answer_listing(&reply_to, &title, listing).await
            }
            ChatCommand::Create(request) => {
                let result = self.lifecycle.create(request).await;
                self.settle(&reply_to, result.map(|task| task.id())).await
            }
            ChatCommand::Complete { task_id } => {
                let result = self.lifecycle.complete(task_id, sender).await;
                self.settle(&reply_to, result.map(|task| task.id())).await
            }
            ChatCommand::Reopen { task_id } => {
                let result = self.lifecycle.reopen(task_id, sender).await;
                self.confirm(&reply_to, result, "🔄 Task reopened").await
            }
            ChatCommand::Notes { task_id, notes } => {
                let result = self.lifecycle.update_notes(task_id, notes, sender).await;
                self.confirm(&reply_to, result, "📝 Notes saved for task")
                    .await
            }
            ChatCommand::Delete { task_id } => {
                let result = self.delete(task_id, sender).await;
                self.settle(&reply_to, result.map(|()| task_id)).await
            }
            ChatCommand::Update {
                task_id,
                patch,
                notes,
            } => {
                let result = self.lifecycle.revise(task_id, patch, notes, sender).await;
                self.confirm(&reply_to, result, "✏️ Task updated").await
            }
        }
    }

    async fn delete(&self, task_id: TaskId, sender: &str) -> TaskLifecycleResult<()> {
        self.lifecycle.authorize(task_id, sender).await?;
        self.lifecycle.delete(task_id, Some(sender)).await
    }

    async fn answer(&self, recipient: &Identity, body: &str) -> CommandOutcome {
        self.reply(recipient, body).await;
        CommandOutcome::Answered
    }

    async fn answer_listing(
        &self,
        recipient: &Identity,
        title: &str,
        listing: TaskLifecycleResult<Vec<Task>>,
    ) -> CommandOutcome {
        match listing {
            Ok(tasks) => {
                let body = self.render_listing(title, &tasks);
                self.answer(recipient, &body).await
            }
            Err(err) => self.reject(recipient, &err).await,
        }
    }

    async fn confirm(
        &self,
        recipient: &Identity,
        result: TaskLifecycleResult<Task>,
        headline: &str,
    ) -> CommandOutcome {
        match result {
            Ok(task) => {
                let body = format!("{headline}: \"{}\"\nID: {}", task.description(), task.id());
                self.reply(recipient, &body).await;
                CommandOutcome::Applied(task.id())
            }
            Err(err) => self.reject(recipient, &err).await,
        }
    }

    async fn settle(
        &self,
        recipient: &Identity,
        result: TaskLifecycleResult<TaskId>,
    ) -> CommandOutcome {
        match result {
            Ok(task_id) => CommandOutcome::Applied(task_id),
            Err(err) => self.reject(recipient, &err).await,
        }
    }

    async fn reject(&self, recipient: &Identity, err: &TaskLifecycleError) -> CommandOutcome {
        let body = match err {
            TaskLifecycleError::NotFound(task_id) => format!("Task {task_id} not found."),
            TaskLifecycleError::Forbidden(denied) => format!(
                "You are not allowed to change task {}. Only its creator and assignees can.",
                denied.task_id
            ),
            TaskLifecycleError::Validation(reason) => {
                format!("Could not apply the change: {reason}.")
            }
            TaskLifecycleError::Repository(source) => {
                warn!(recipient = %recipient, error = %source, "command failed in the task store");
                FAILURE_TEXT.to_owned()
            }
        };
        self.reply(recipient, &body).await;
        CommandOutcome::Rejected
    }

    async fn reply(&self, recipient: &Identity, body: &str) {
        self.lifecycle
            .notifications()
            .reply(recipient, body)
            .await;
    }

    fn render_listing(&self, title: &str, tasks: &[Task]) -> String {
        if tasks.is_empty() {
            return "No tasks found. 🎉".to_owned();
        }
        let zone = self.lifecycle.notifications().zone();
        let mut body = format!("📋 *{title}*\n\n");
        for (position, task) in tasks.iter().enumerate() {
            let marker = match task.status() {
                TaskStatus::Completed => "✅",
                TaskStatus::Open => "⏳",
            };
            let due = task.due_date().map_or_else(
                || "No due date".to_owned(),
                |due_date| format!("Due: {}", zone.short_date(due_date)),
            );
            body.push_str(&format!(
                "{}. {marker} *{}*\n   {due} | ID: {}\n\n",
                position + 1,
                task.description(),
                task.id()
            ));
        }
        body.push_str("Use /done <ID> to complete a task.");
        body
    }
}
