//! Shared world state for reminder lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskpulse::{
    reminder::{ReminderPolicy, ReminderScheduler},
    task::{
        adapters::memory::{InMemoryTaskRepository, RecordingNotifier},
        domain::Task,
        services::{DisplayZone, TaskLifecycleService, TaskNotifications},
    },
};

/// Scheduler type used by the BDD world.
pub type TestScheduler = ReminderScheduler<InMemoryTaskRepository, RecordingNotifier, DefaultClock>;

/// Service type used by the BDD world.
pub type TestTaskService =
    TaskLifecycleService<InMemoryTaskRepository, TestScheduler, RecordingNotifier, DefaultClock>;

/// Creator of every scenario task.
pub const CREATOR: &str = "111@c.us";

/// Assignee of every scenario task.
pub const ASSIGNEE: &str = "222";

/// Scenario world for reminder behaviour tests.
pub struct ReminderWorld {
    pub service: TestTaskService,
    pub scheduler: Arc<TestScheduler>,
    pub notifier: Arc<RecordingNotifier>,
    pub task: Option<Task>,
}

impl ReminderWorld {
    /// Creates a world with an empty store and a live scheduler.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let notifications = TaskNotifications::new(Arc::clone(&notifier), DisplayZone::default());
        let clock = Arc::new(DefaultClock);
        let scheduler = Arc::new(ReminderScheduler::new(
            Arc::clone(&repository),
            notifications.clone(),
            Arc::clone(&clock),
            ReminderPolicy::default(),
        ));
        let service = TaskLifecycleService::new(
            repository,
            Arc::clone(&scheduler),
            notifications,
            clock,
        );
        Self {
            service,
            scheduler,
            notifier,
            task: None,
        }
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for ReminderWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ReminderWorld {
    ReminderWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
