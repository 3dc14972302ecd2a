//! Tests for the in-memory repository and notifier adapters.

use crate::task::{
    adapters::{log::TracingNotifier, memory::InMemoryTaskRepository, memory::RecordingNotifier},
    domain::{Identity, NewTask, Task, TaskStatus},
    ports::{Notification, Notifier, NotifierError, TaskFilter, TaskRepository, TaskRepositoryError},
};
use chrono::{TimeDelta, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn repository() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

fn task(description: &str, creator: &str, assignees: &[&str], due_in: Option<TimeDelta>) -> Task {
    let mut new_task =
        NewTask::new(description, creator, assignees.iter().copied()).expect("valid task input");
    if let Some(offset) = due_in {
        new_task = new_task.with_due_date(Utc::now() + offset);
    }
    Task::create(new_task, &DefaultClock)
}

fn identity(raw: &str) -> Identity {
    Identity::parse(raw).expect("valid identity")
}

#[rstest]
#[tokio::test]
async fn store_rejects_duplicate_identifier(repository: InMemoryTaskRepository) {
    let stored = task("Book venue", "111", &["222"], None);
    repository.store(&stored).await.expect("first store succeeds");

    let result = repository.store(&stored).await;

    assert!(matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == stored.id()));
    assert_eq!(repository.len().expect("length available"), 1);
}

#[rstest]
#[tokio::test]
async fn update_of_missing_task_is_not_found(repository: InMemoryTaskRepository) {
    let missing = task("Book venue", "111", &["222"], None);

    let result = repository.update(&missing).await;

    assert!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == missing.id()));
}

#[rstest]
#[tokio::test]
async fn delete_reports_whether_a_task_was_removed(repository: InMemoryTaskRepository) {
    let stored = task("Book venue", "111", &["222"], None);
    repository.store(&stored).await.expect("store succeeds");

    assert!(repository.delete(stored.id()).await.expect("delete succeeds"));
    assert!(!repository.delete(stored.id()).await.expect("delete succeeds"));
    assert!(repository.is_empty().expect("emptiness available"));
}

#[rstest]
#[tokio::test]
async fn find_orders_by_due_date_with_undated_last(repository: InMemoryTaskRepository) {
    let later = task("Later", "111", &["222"], Some(TimeDelta::days(3)));
    let undated = task("Undated", "111", &["222"], None);
    let sooner = task("Sooner", "111", &["222"], Some(TimeDelta::days(1)));
    for stored in [&later, &undated, &sooner] {
        repository.store(stored).await.expect("store succeeds");
    }

    let found = repository
        .find(&TaskFilter::new())
        .await
        .expect("find succeeds");

    let order: Vec<&str> = found.iter().map(Task::description).collect();
    assert_eq!(order, ["Sooner", "Later", "Undated"]);
}

#[rstest]
#[tokio::test]
async fn find_filters_by_participant_assignee_and_status(repository: InMemoryTaskRepository) {
    let created_by_111 = task("Created", "111", &["222"], None);
    let assigned_to_111 = task("Assigned", "333", &["111"], Some(TimeDelta::days(1)));
    let mut unrelated = task("Unrelated", "333", &["444"], None);
    unrelated.complete(&DefaultClock);
    for stored in [&created_by_111, &assigned_to_111, &unrelated] {
        repository.store(stored).await.expect("store succeeds");
    }

    let participant = repository
        .find(&TaskFilter::new().with_participant(identity("111")))
        .await
        .expect("find succeeds");
    let assigned = repository
        .find(&TaskFilter::new().with_any_assignee([identity("444"), identity("222")]))
        .await
        .expect("find succeeds");
    let completed = repository
        .find(&TaskFilter::new().with_status(TaskStatus::Completed))
        .await
        .expect("find succeeds");
    let recovery = repository
        .find(&TaskFilter::open_with_due_date())
        .await
        .expect("find succeeds");

    assert_eq!(participant.len(), 2);
    assert_eq!(assigned.len(), 2);
    assert_eq!(completed, vec![unrelated]);
    assert_eq!(recovery, vec![assigned_to_111]);
}

#[rstest]
#[tokio::test]
async fn recording_notifier_rejects_configured_recipients() {
    let notifier = RecordingNotifier::new();
    notifier.fail_for(identity("222"));

    let accepted = notifier
        .notify(&Notification::text(identity("111"), "hello"))
        .await;
    let rejected = notifier
        .notify(&Notification::text(identity("222"), "hello"))
        .await;

    assert!(accepted.is_ok());
    assert!(matches!(
        rejected,
        Err(NotifierError::DeliveryFailure { recipient, .. }) if recipient == identity("222")
    ));
    assert_eq!(notifier.delivered_count(), 1);
    assert_eq!(notifier.delivered_to(&identity("111")).len(), 1);

    notifier.clear();
    assert!(notifier.delivered().is_empty());
}

#[rstest]
#[tokio::test]
async fn tracing_notifier_always_accepts() {
    let result = TracingNotifier
        .notify(&Notification::text(identity("111"), "logged"))
        .await;

    assert!(result.is_ok());
}
