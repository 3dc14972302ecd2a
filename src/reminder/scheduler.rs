//! One-shot reminder timers keyed by task identifier.
//!
//! The scheduler owns a table with at most one pending entry per task. Each
//! entry carries the abort handle of the tokio task that sleeps until the
//! reminder instant, plus a generation number. A timer only acts once it
//! has removed its own generation from the table, so a timer that loses a
//! race with `schedule` or `cancel` exits without sending anything.

use super::policy::ReminderPolicy;
use crate::task::{
    domain::{Task, TaskId, TaskStatus},
    ports::{
        Notifier, ReminderScheduling, ScheduleOutcome, SchedulingSkip, TaskFilter,
        TaskRepository, TaskRepositoryResult,
    },
    services::TaskNotifications,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct PendingReminder {
    generation: u64,
    fires_at: DateTime<Utc>,
    timer: AbortHandle,
}

struct SchedulerInner<R, N, C>
where
    N: Notifier,
{
    repository: Arc<R>,
    notifications: TaskNotifications<N>,
    clock: Arc<C>,
    policy: ReminderPolicy,
    table: Mutex<HashMap<TaskId, PendingReminder>>,
    generation: AtomicU64,
    stopped: AtomicBool,
}

impl<R, N, C> SchedulerInner<R, N, C>
where
    N: Notifier,
{
    fn table(&self) -> MutexGuard<'_, HashMap<TaskId, PendingReminder>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes the entry for `task_id` only if it still belongs to
    /// `generation`.
    fn claim(&self, task_id: TaskId, generation: u64) -> bool {
        let mut table = self.table();
        match table.get(&task_id) {
            Some(entry) if entry.generation == generation => {
                table.remove(&task_id);
                true
            }
            _ => false,
        }
    }
}

/// Reminder scheduler backed by tokio timers.
///
/// Cloning yields another handle to the same table.
pub struct ReminderScheduler<R, N, C>
where
    N: Notifier,
{
    inner: Arc<SchedulerInner<R, N, C>>,
}

impl<R, N, C> Clone for ReminderScheduler<R, N, C>
where
    N: Notifier,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, N, C> ReminderScheduler<R, N, C>
where
    R: TaskRepository + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a scheduler with an empty timer table.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        notifications: TaskNotifications<N>,
        clock: Arc<C>,
        policy: ReminderPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                repository,
                notifications,
                clock,
                policy,
                table: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
                stopped: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the timing policy.
    #[must_use]
    pub fn policy(&self) -> ReminderPolicy {
        self.inner.policy
    }

    /// Replaces any pending reminder for `task` with one derived from its
    /// current state.
    ///
    /// The existing entry is always retracted first, so a task whose
    /// reminder window has moved into the past ends up with no entry.
    pub fn schedule(&self, task: &Task) -> ScheduleOutcome {
        let task_id = task.id();
        let mut table = self.inner.table();
        if let Some(previous) = table.remove(&task_id) {
            previous.timer.abort();
            debug!(task_id = %task_id, "previous reminder retracted");
        }

        if self.inner.stopped.load(Ordering::Acquire) {
            return ScheduleOutcome::Skipped(SchedulingSkip::SchedulerStopped);
        }
        let now = self.inner.clock.utc();
        let fires_at = match self.inner.policy.decide(task, now) {
            Ok(fires_at) => fires_at,
            Err(skip) => {
                debug!(task_id = %task_id, ?skip, "reminder not armed");
                return ScheduleOutcome::Skipped(skip);
            }
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!(task_id = %task_id, "no async runtime available, reminder not armed");
            return ScheduleOutcome::Skipped(SchedulingSkip::SchedulerStopped);
        };

        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + (fires_at - now).to_std().unwrap_or(Duration::ZERO);
        let inner = Arc::clone(&self.inner);
        let timer = runtime
            .spawn(async move {
                tokio::time::sleep_until(deadline).await;
                fire(inner, task_id, generation).await;
            })
            .abort_handle();
        table.insert(
            task_id,
            PendingReminder {
                generation,
                fires_at,
                timer,
            },
        );
        info!(task_id = %task_id, %fires_at, "reminder armed");
        ScheduleOutcome::Armed { fires_at }
    }

    /// Same as [`Self::schedule`]; used after a due date edit.
    pub fn reschedule(&self, task: &Task) -> ScheduleOutcome {
        self.schedule(task)
    }

    /// Retracts the pending reminder for `task_id`. Returns `false` when
    /// nothing was pending.
    pub fn cancel(&self, task_id: TaskId) -> bool {
        let Some(entry) = self.inner.table().remove(&task_id) else {
            return false;
        };
        entry.timer.abort();
        debug!(task_id = %task_id, "reminder cancelled");
        true
    }

    /// Arms reminders for every open task with a due date in the store.
    ///
    /// Returns how many reminders were armed. Tasks whose reminder window
    /// has already elapsed are skipped.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the store query fails.
    pub async fn reconcile_from_store(&self) -> TaskRepositoryResult<usize> {
        let tasks = self
            .inner
            .repository
            .find(&TaskFilter::open_with_due_date())
            .await?;
        let scanned = tasks.len();
        let armed = tasks
            .iter()
            .filter(|task| task.status() == TaskStatus::Open)
            .map(|task| self.schedule(task))
            .filter(|outcome| outcome.is_armed())
            .count();
        info!(scanned, armed, "reminders reconciled from store");
        Ok(armed)
    }

    /// Stops accepting new reminders and aborts every pending timer.
    ///
    /// Returns how many timers were aborted.
    pub fn shutdown(&self) -> usize {
        self.inner.stopped.store(true, Ordering::Release);
        let drained: Vec<PendingReminder> = self
            .inner
            .table()
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        for entry in &drained {
            entry.timer.abort();
        }
        info!(aborted = drained.len(), "reminder scheduler shut down");
        drained.len()
    }

    /// Returns `true` once [`Self::shutdown`] has run.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Returns the number of pending reminders.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.table().len()
    }

    /// Returns `true` when a reminder is pending for `task_id`.
    #[must_use]
    pub fn is_pending(&self, task_id: TaskId) -> bool {
        self.inner.table().contains_key(&task_id)
    }

    /// Returns when the pending reminder for `task_id` fires.
    #[must_use]
    pub fn pending_at(&self, task_id: TaskId) -> Option<DateTime<Utc>> {
        self.inner.table().get(&task_id).map(|entry| entry.fires_at)
    }
}

impl<R, N, C> ReminderScheduling for ReminderScheduler<R, N, C>
where
    R: TaskRepository + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn schedule(&self, task: &Task) -> ScheduleOutcome {
        Self::schedule(self, task)
    }

    fn cancel(&self, task_id: TaskId) -> bool {
        Self::cancel(self, task_id)
    }
}

async fn fire<R, N, C>(inner: Arc<SchedulerInner<R, N, C>>, task_id: TaskId, generation: u64)
where
    R: TaskRepository,
    N: Notifier,
{
    if !inner.claim(task_id, generation) {
        debug!(task_id = %task_id, "reminder superseded before firing");
        return;
    }

    match inner.repository.find_by_id(task_id).await {
        Err(err) => {
            warn!(task_id = %task_id, error = %err, "reminder abandoned, task lookup failed");
        }
        Ok(None) => debug!(task_id = %task_id, "reminder dropped, task deleted"),
        Ok(Some(task)) if task.status().is_completed() => {
            debug!(task_id = %task_id, "reminder dropped, task completed");
        }
        Ok(Some(task)) => {
            let report = inner.notifications.reminder(&task).await;
            info!(
                task_id = %task_id,
                delivered = report.delivered,
                failed = report.failed,
                "reminder fired"
            );
        }
    }
}
