//! Shared wiring for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskpulse::{
    command::{ChatCommandService, CommandOutcome},
    reminder::{ReminderPolicy, ReminderScheduler},
    task::{
        adapters::memory::{InMemoryTaskRepository, RecordingNotifier},
        domain::{Identity, TaskId},
        services::{DisplayZone, TaskLifecycleService, TaskNotifications},
    },
};

/// Scheduler type used by the integration engine.
pub type TestScheduler = ReminderScheduler<InMemoryTaskRepository, RecordingNotifier, DefaultClock>;

/// Chat dispatcher type used by the integration engine.
pub type TestCommands =
    ChatCommandService<InMemoryTaskRepository, TestScheduler, RecordingNotifier, DefaultClock>;

/// Creator used across chat scenarios.
pub const CREATOR: &str = "919876543210@c.us";

/// Assignee used across chat scenarios.
pub const ASSIGNEE: &str = "918888777666@c.us";

/// Sender who takes part in no task.
pub const OUTSIDER: &str = "917777000111@c.us";

/// Fully wired task engine over shared in-memory storage.
pub struct Engine {
    pub repository: Arc<InMemoryTaskRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub scheduler: Arc<TestScheduler>,
    pub commands: TestCommands,
}

impl Engine {
    /// Wires an engine over `repository` with default policy and zone.
    #[must_use]
    pub fn start(repository: Arc<InMemoryTaskRepository>) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let notifications = TaskNotifications::new(Arc::clone(&notifier), DisplayZone::default());
        let clock = Arc::new(DefaultClock);
        let scheduler = Arc::new(ReminderScheduler::new(
            Arc::clone(&repository),
            notifications.clone(),
            Arc::clone(&clock),
            ReminderPolicy::default(),
        ));
        let lifecycle = TaskLifecycleService::new(
            Arc::clone(&repository),
            Arc::clone(&scheduler),
            notifications,
            Arc::clone(&clock),
        );
        Self {
            repository,
            notifier,
            scheduler,
            commands: ChatCommandService::new(lifecycle, clock),
        }
    }

    /// Returns the bodies delivered to `sender`, oldest first.
    #[must_use]
    pub fn bodies_for(&self, sender: &str) -> Vec<String> {
        self.notifier
            .delivered_to(&Identity::normalize(sender))
            .into_iter()
            .map(|notification| notification.body)
            .collect()
    }
}

/// Provides a fresh engine for each test.
#[fixture]
pub fn engine() -> Engine {
    Engine::start(Arc::new(InMemoryTaskRepository::new()))
}

/// Extracts the task identifier from a successful command.
///
/// # Errors
///
/// Returns an error when the command did not apply to a task.
pub fn applied_task(outcome: &CommandOutcome) -> Result<TaskId, eyre::Report> {
    match outcome {
        CommandOutcome::Applied(task_id) => Ok(*task_id),
        other => Err(eyre::eyre!("expected an applied command, got {other:?}")),
    }
}

/// Lets spawned reminder tasks run after the paused clock moves.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
