//! Chat commands driving storage, notifications and reminders together.

use std::time::Duration;

use rstest::rstest;
use taskpulse::{
    command::CommandOutcome,
    task::{
        domain::{TaskId, TaskStatus},
        ports::TaskRepository,
    },
};

use super::helpers::{ASSIGNEE, CREATOR, Engine, OUTSIDER, applied_task, engine, settle};

async fn create_rent_task(engine: &Engine) -> Result<TaskId, eyre::Report> {
    let outcome = engine
        .commands
        .handle(CREATOR, "/create Pay rent, @918888777666, tomorrow, bank transfer")
        .await;
    applied_task(&outcome)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_is_stored_announced_and_armed(engine: Engine) -> Result<(), eyre::Report> {
    let task_id = create_rent_task(&engine).await?;

    let stored = engine
        .repository
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("created task missing from the store"))?;
    eyre::ensure!(stored.description() == "Pay rent", "description mismatch");
    eyre::ensure!(stored.notes() == Some("bank transfer"), "notes mismatch");
    eyre::ensure!(engine.scheduler.is_pending(task_id), "reminder not armed");

    let creator_bodies = engine.bodies_for(CREATOR);
    let assignee_bodies = engine.bodies_for(ASSIGNEE);
    eyre::ensure!(
        creator_bodies
            .iter()
            .any(|body| body.starts_with("✅ Task created successfully!")),
        "creator not confirmed: {creator_bodies:?}"
    );
    eyre::ensure!(
        assignee_bodies
            .iter()
            .any(|body| body.starts_with("📋 You have been assigned a new task!")),
        "assignee not informed: {assignee_bodies:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn button_press_completes_task_and_retracts_reminder(
    engine: Engine,
) -> Result<(), eyre::Report> {
    let task_id = create_rent_task(&engine).await?;
    engine.notifier.clear();

    let outcome = engine
        .commands
        .handle(ASSIGNEE, &format!("ButtonsV3:complete_{task_id}"))
        .await;

    eyre::ensure!(
        outcome == CommandOutcome::Applied(task_id),
        "unexpected outcome {outcome:?}"
    );
    let stored = engine
        .repository
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("completed task missing from the store"))?;
    eyre::ensure!(stored.status() == TaskStatus::Completed, "task still open");
    eyre::ensure!(!engine.scheduler.is_pending(task_id), "reminder still armed");
    eyre::ensure!(
        engine
            .bodies_for(CREATOR)
            .iter()
            .any(|body| body.starts_with("✅ Task completed!")),
        "creator not told about completion"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outsider_cannot_complete_or_delete(engine: Engine) -> Result<(), eyre::Report> {
    let task_id = create_rent_task(&engine).await?;

    let completion = engine
        .commands
        .handle(OUTSIDER, &format!("/done {task_id}"))
        .await;
    let deletion = engine
        .commands
        .handle(OUTSIDER, &format!("/delete {task_id}"))
        .await;

    eyre::ensure!(completion == CommandOutcome::Rejected, "completion allowed");
    eyre::ensure!(deletion == CommandOutcome::Rejected, "deletion allowed");
    eyre::ensure!(
        engine.repository.find_by_id(task_id).await?.is_some(),
        "task removed by an outsider"
    );
    eyre::ensure!(engine.scheduler.is_pending(task_id), "reminder retracted");
    eyre::ensure!(
        engine
            .bodies_for(OUTSIDER)
            .iter()
            .all(|body| body.starts_with("You are not allowed")),
        "outsider received something other than refusals"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creator_deletes_task_and_everyone_is_told(engine: Engine) -> Result<(), eyre::Report> {
    let task_id = create_rent_task(&engine).await?;
    engine.notifier.clear();

    let outcome = engine
        .commands
        .handle(CREATOR, &format!("/delete {task_id}"))
        .await;

    eyre::ensure!(
        outcome == CommandOutcome::Applied(task_id),
        "unexpected outcome {outcome:?}"
    );
    eyre::ensure!(
        engine.repository.find_by_id(task_id).await?.is_none(),
        "task still stored"
    );
    eyre::ensure!(engine.scheduler.pending_count() == 0, "reminder still armed");
    for participant in [CREATOR, ASSIGNEE] {
        let bodies = engine.bodies_for(participant);
        eyre::ensure!(
            bodies.len() == 1,
            "{participant} expected one message, got {bodies:?}"
        );
        eyre::ensure!(
            bodies
                .iter()
                .all(|body| body.contains("Deleted by: 919876543210")),
            "{participant} got the wrong deletion notice"
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_shows_only_the_senders_open_tasks(engine: Engine) -> Result<(), eyre::Report> {
    let rent = create_rent_task(&engine).await?;
    let done = applied_task(
        &engine
            .commands
            .handle(CREATOR, "/create File taxes, @918888777666")
            .await,
    )?;
    engine.commands.handle(CREATOR, &format!("/done {done}")).await;
    engine
        .commands
        .handle(OUTSIDER, "/create Water plants, @917777000111")
        .await;
    engine.notifier.clear();

    let outcome = engine.commands.handle(ASSIGNEE, "/tasks").await;

    eyre::ensure!(outcome == CommandOutcome::Answered, "listing not answered");
    let bodies = engine.bodies_for(ASSIGNEE);
    let listing = bodies
        .first()
        .ok_or_else(|| eyre::eyre!("no listing delivered"))?;
    eyre::ensure!(listing.contains(&rent.to_string()), "open task missing");
    eyre::ensure!(!listing.contains(&done.to_string()), "completed task listed");
    eyre::ensure!(!listing.contains("Water plants"), "foreign task listed");
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn reminder_reaches_both_participants_once(engine: Engine) -> Result<(), eyre::Report> {
    let task_id = create_rent_task(&engine).await?;
    engine.notifier.clear();

    tokio::time::advance(Duration::from_secs(18 * 3600 + 60)).await;
    settle().await;

    eyre::ensure!(!engine.scheduler.is_pending(task_id), "timer not consumed");
    for participant in [CREATOR, ASSIGNEE] {
        let bodies = engine.bodies_for(participant);
        eyre::ensure!(
            bodies.len() == 1,
            "{participant} expected one reminder, got {bodies:?}"
        );
        eyre::ensure!(
            bodies
                .iter()
                .all(|body| body.starts_with("🔔 Reminder: Task \"Pay rent\"")),
            "{participant} got the wrong reminder"
        );
    }
    Ok(())
}
