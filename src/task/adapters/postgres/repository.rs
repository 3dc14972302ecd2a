//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{Identity, PersistedTaskData, Task, TaskId, TaskStatus},
    ports::{TaskFilter, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = to_changeset(task);

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&changeset)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>> {
        let criteria = filter.clone();
        self.run_blocking(move |connection| {
            let rows = filtered_query(&criteria)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(affected > 0)
        })
        .await
    }
}

fn filtered_query(filter: &TaskFilter) -> tasks::BoxedQuery<'static, Pg> {
    let mut query = tasks::table.into_boxed();

    if let Some(participant) = &filter.participant {
        let identity = participant.as_str().to_owned();
        query = query.filter(
            tasks::creator
                .eq(identity.clone())
                .or(tasks::assignees.contains(vec![identity])),
        );
    }
    if !filter.any_assignee.is_empty() {
        let identities: Vec<String> = filter
            .any_assignee
            .iter()
            .map(|identity| identity.as_str().to_owned())
            .collect();
        query = query.filter(tasks::assignees.overlaps_with(identities));
    }
    if let Some(status) = filter.status {
        query = query.filter(tasks::status.eq(status.as_str()));
    }
    match filter.has_due_date {
        Some(true) => query = query.filter(tasks::due_date.is_not_null()),
        Some(false) => query = query.filter(tasks::due_date.is_null()),
        None => {}
    }

    query.order((tasks::due_date.asc().nulls_last(), tasks::created_at.desc()))
}

fn identity_strings(identities: &[Identity]) -> Vec<String> {
    identities
        .iter()
        .map(|identity| identity.as_str().to_owned())
        .collect()
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        description: task.description().to_owned(),
        creator: task.creator().as_str().to_owned(),
        assignees: identity_strings(task.assignees()),
        due_date: task.due_date(),
        notes: task.notes().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        created_at: task.created_at(),
        completed_at: task.completed_at(),
        updated_at: task.updated_at(),
    }
}

fn to_changeset(task: &Task) -> TaskChangeset {
    TaskChangeset {
        description: task.description().to_owned(),
        assignees: identity_strings(task.assignees()),
        due_date: task.due_date(),
        notes: task.notes().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        completed_at: task.completed_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        description,
        creator: persisted_creator,
        assignees: persisted_assignees,
        due_date,
        notes,
        status: persisted_status,
        created_at,
        completed_at,
        updated_at,
    } = row;

    let creator = Identity::parse(&persisted_creator).map_err(TaskRepositoryError::persistence)?;
    let assignees = persisted_assignees
        .iter()
        .map(|value| Identity::parse(value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(TaskRepositoryError::persistence)?;
    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        description,
        creator,
        assignees,
        due_date,
        notes,
        status,
        created_at,
        completed_at,
        updated_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::domain::NewTask;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn sample_task() -> Task {
        let new_task = NewTask::new("Ship release", "+1 (555) 010-2233", ["555 010 4455"])
            .expect("valid task input")
            .with_notes("tag the build");
        Task::create(new_task, &DefaultClock)
    }

    fn row_from(new_row: NewTaskRow) -> TaskRow {
        TaskRow {
            id: new_row.id,
            description: new_row.description,
            creator: new_row.creator,
            assignees: new_row.assignees,
            due_date: new_row.due_date,
            notes: new_row.notes,
            status: new_row.status,
            created_at: new_row.created_at,
            completed_at: new_row.completed_at,
            updated_at: new_row.updated_at,
        }
    }

    #[rstest]
    fn row_conversion_preserves_task() {
        let task = sample_task();

        let restored = row_to_task(row_from(to_new_row(&task))).expect("row should convert");

        assert_eq!(restored, task);
    }

    #[rstest]
    fn long_creator_identity_is_stored_as_unbounded_text() {
        fn text_column<C>(_column: &C)
        where
            C: diesel::expression::Expression<SqlType = diesel::sql_types::Text>,
        {
        }
        text_column(&tasks::creator);

        let creator = "9".repeat(40);
        let new_task = NewTask::new("Ship release", &creator, ["555"]).expect("valid task input");
        let task = Task::create(new_task, &DefaultClock);

        let restored = row_to_task(row_from(to_new_row(&task))).expect("row should convert");

        assert_eq!(restored.creator().as_str(), creator);
    }

    #[rstest]
    fn changeset_writes_completion_state() {
        let mut task = sample_task();
        task.complete(&DefaultClock);

        let changeset = to_changeset(&task);

        assert_eq!(changeset.status, "COMPLETED");
        assert_eq!(changeset.completed_at, task.completed_at());
    }

    #[rstest]
    fn unknown_status_is_a_persistence_error() {
        let mut row = row_from(to_new_row(&sample_task()));
        row.status = "ARCHIVED".to_owned();

        let result = row_to_task(row);

        assert!(matches!(result, Err(TaskRepositoryError::Persistence(_))));
    }

    #[rstest]
    fn blank_assignee_is_a_persistence_error() {
        let mut row = row_from(to_new_row(&sample_task()));
        row.assignees = vec!["@c.us".to_owned()];

        let result = row_to_task(row);

        assert!(matches!(result, Err(TaskRepositoryError::Persistence(_))));
    }
}
