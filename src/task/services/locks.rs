//! Per-task serialization of read-modify-write cycles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::task::domain::TaskId;

type LockTable = HashMap<TaskId, Arc<AsyncMutex<()>>>;

/// Hands out one async mutex per task identifier.
///
/// Entries are created on demand and dropped once nobody holds or waits on
/// them, so the table only grows with concurrently touched tasks.
#[derive(Debug, Clone, Default)]
pub(crate) struct TaskLocks {
    table: Arc<Mutex<LockTable>>,
}

/// Exclusive access to one task until dropped.
#[derive(Debug)]
pub(crate) struct TaskGuard {
    task_id: TaskId,
    table: Arc<Mutex<LockTable>>,
    _guard: OwnedMutexGuard<()>,
}

impl TaskLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn acquire(&self, task_id: TaskId) -> TaskGuard {
        let lock = Arc::clone(lock_table(&self.table).entry(task_id).or_default());
        let guard = lock.lock_owned().await;
        TaskGuard {
            task_id,
            table: Arc::clone(&self.table),
            _guard: guard,
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        lock_table(&self.table).len()
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let mut table = lock_table(&self.table);
        // One reference lives in the table and one in this guard.
        let idle = table
            .get(&self.task_id)
            .is_some_and(|lock| Arc::strong_count(lock) <= 2);
        if idle {
            table.remove(&self.task_id);
        }
    }
}

fn lock_table(table: &Mutex<LockTable>) -> MutexGuard<'_, LockTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}
