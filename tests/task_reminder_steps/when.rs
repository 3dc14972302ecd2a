//! When steps for reminder lifecycle BDD scenarios.

use super::world::{CREATOR, ReminderWorld, run_async};
use chrono::{TimeDelta, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskpulse::task::domain::TaskPatch;

#[when("the creator completes the task")]
fn creator_completes(world: &mut ReminderWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let task =
        run_async(world.service.complete(task_id, CREATOR)).wrap_err("complete scenario task")?;
    world.task = Some(task);
    Ok(())
}

#[when("the creator reopens the task")]
fn creator_reopens(world: &mut ReminderWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let task =
        run_async(world.service.reopen(task_id, CREATOR)).wrap_err("reopen scenario task")?;
    world.task = Some(task);
    Ok(())
}

#[when("the due date moves to {minutes:i64} minutes from now")]
fn due_date_moves(world: &mut ReminderWorld, minutes: i64) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let patch = TaskPatch::new().with_due_date(Utc::now() + TimeDelta::minutes(minutes));
    let task = run_async(world.service.edit(task_id, patch)).wrap_err("edit scenario task")?;
    world.task = Some(task);
    Ok(())
}

#[when("the task is deleted by an administrator")]
fn administrator_deletes(world: &mut ReminderWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    world.notifier.clear();
    run_async(world.service.delete(task_id, None)).wrap_err("delete scenario task")?;
    Ok(())
}
