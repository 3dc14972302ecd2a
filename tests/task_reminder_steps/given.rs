//! Given steps for reminder lifecycle BDD scenarios.

use super::world::{ASSIGNEE, CREATOR, ReminderWorld, run_async};
use chrono::{TimeDelta, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskpulse::task::services::CreateTaskRequest;

#[given(r#"a task "{description}" due in {hours:i64} hours"#)]
fn task_due_in_hours(
    world: &mut ReminderWorld,
    description: String,
    hours: i64,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(description, CREATOR, [ASSIGNEE.to_owned()])
        .with_due_date(Utc::now() + TimeDelta::hours(hours));
    let task = run_async(world.service.create(request)).wrap_err("create scenario task")?;
    world.task = Some(task);
    Ok(())
}

#[given("the creator has completed the task")]
fn creator_has_completed(world: &mut ReminderWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let task =
        run_async(world.service.complete(task_id, CREATOR)).wrap_err("complete scenario task")?;
    world.task = Some(task);
    Ok(())
}
