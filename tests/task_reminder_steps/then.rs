//! Then steps for reminder lifecycle BDD scenarios.

use super::world::ReminderWorld;
use chrono::TimeDelta;
use rstest_bdd_macros::then;

#[then("one reminder is pending for the task")]
fn one_reminder_pending(world: &ReminderWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    if world.scheduler.pending_count() != 1 {
        return Err(eyre::eyre!(
            "expected one pending reminder, found {}",
            world.scheduler.pending_count()
        ));
    }
    if !world.scheduler.is_pending(task_id) {
        return Err(eyre::eyre!("pending reminder belongs to another task"));
    }
    Ok(())
}

#[then("the reminder fires {hours:i64} hours before the due date")]
fn reminder_fires_before_due(world: &ReminderWorld, hours: i64) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let due_date = task
        .due_date()
        .ok_or_else(|| eyre::eyre!("scenario task has no due date"))?;
    let fires_at = world
        .scheduler
        .pending_at(task.id())
        .ok_or_else(|| eyre::eyre!("no reminder armed for the scenario task"))?;
    if due_date - fires_at != TimeDelta::hours(hours) {
        return Err(eyre::eyre!(
            "reminder fires at {fires_at}, expected {hours} hours before {due_date}"
        ));
    }
    Ok(())
}

#[then("no reminder is pending")]
fn no_reminder_pending(world: &ReminderWorld) -> Result<(), eyre::Report> {
    if world.scheduler.pending_count() != 0 {
        return Err(eyre::eyre!(
            "expected no pending reminders, found {}",
            world.scheduler.pending_count()
        ));
    }
    Ok(())
}

#[then(r#"every participant is told the task was deleted by "{actor}""#)]
fn participants_told_of_deletion(world: &ReminderWorld, actor: String) -> Result<(), eyre::Report> {
    let delivered = world.notifier.delivered();
    if delivered.len() != 2 {
        return Err(eyre::eyre!(
            "expected two deletion notices, found {}",
            delivered.len()
        ));
    }
    let expected = format!("Deleted by: {actor}");
    if !delivered
        .iter()
        .all(|notification| notification.body.contains(&expected))
    {
        return Err(eyre::eyre!("deletion notices do not name {actor}"));
    }
    Ok(())
}
