//! Reminder recovery when a new scheduler takes over an existing store.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use rstest::rstest;
use taskpulse::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::TaskId,
    ports::{ScheduleOutcome, SchedulingSkip},
    services::CreateTaskRequest,
};

use super::helpers::{ASSIGNEE, CREATOR, Engine};

async fn create_due_in(
    engine: &Engine,
    description: &str,
    due_in: Option<TimeDelta>,
) -> Result<TaskId, eyre::Report> {
    let mut request = CreateTaskRequest::new(description, CREATOR, [ASSIGNEE.to_owned()]);
    if let Some(offset) = due_in {
        request = request.with_due_date(Utc::now() + offset);
    }
    let task = engine.commands.lifecycle().create(request).await?;
    Ok(task.id())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restarted_scheduler_rearms_only_future_windows() -> Result<(), eyre::Report> {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let first = Engine::start(Arc::clone(&repository));
    let future = create_due_in(&first, "Book venue", Some(TimeDelta::hours(9))).await?;
    let elapsed = create_due_in(&first, "Call bank", Some(TimeDelta::hours(2))).await?;
    let undated = create_due_in(&first, "Read report", None).await?;
    let finished = create_due_in(&first, "Send invoice", Some(TimeDelta::hours(10))).await?;
    first
        .commands
        .lifecycle()
        .complete(finished, CREATOR)
        .await?;

    eyre::ensure!(first.scheduler.shutdown() == 1, "expected one live timer");
    let second = Engine::start(repository);
    let armed = second.scheduler.reconcile_from_store().await?;

    eyre::ensure!(armed == 1, "expected one re-armed reminder, got {armed}");
    eyre::ensure!(second.scheduler.is_pending(future), "future window not armed");
    for skipped in [elapsed, undated, finished] {
        eyre::ensure!(
            !second.scheduler.is_pending(skipped),
            "task {skipped} armed unexpectedly"
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopped_scheduler_refuses_new_timers() -> Result<(), eyre::Report> {
    let engine = Engine::start(Arc::new(InMemoryTaskRepository::new()));
    engine.scheduler.shutdown();

    let task = engine
        .commands
        .lifecycle()
        .create(
            CreateTaskRequest::new("Book venue", CREATOR, [ASSIGNEE.to_owned()])
                .with_due_date(Utc::now() + TimeDelta::days(2)),
        )
        .await?;

    eyre::ensure!(engine.scheduler.is_stopped(), "scheduler still running");
    eyre::ensure!(
        engine.scheduler.schedule(&task)
            == ScheduleOutcome::Skipped(SchedulingSkip::SchedulerStopped),
        "stopped scheduler armed a timer"
    );
    eyre::ensure!(
        engine.scheduler.pending_count() == 0,
        "timer armed after shutdown"
    );
    Ok(())
}
