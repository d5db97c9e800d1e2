//! Task loader - reads full task state from each store

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::domain::{CountedTask, SimpleTask, TaskSource, TodoError};
use crate::infrastructure::ethereum::{SimpleStore, TodoStore};
use crate::infrastructure::runtime::bridge::{EventSender, RuntimeEvent};

/// Loads both lists; holds the read fan-out for TodoWeb3 tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLoader {
    fetch_concurrency: usize,
}

impl Default for TaskLoader {
    fn default() -> Self {
        Self::sequential()
    }
}

impl TaskLoader {
    /// One `tasks(id)` read at a time, ascending
    pub fn sequential() -> Self {
        Self {
            fetch_concurrency: 1,
        }
    }

    /// Up to `n` reads in flight; results still come back in id order
    pub fn concurrent(n: usize) -> Self {
        Self {
            fetch_concurrency: n.max(1),
        }
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    /// Read the whole Simple list in one call
    pub async fn load_simple_tasks(
        &self,
        store: &dyn SimpleStore,
    ) -> Result<Vec<SimpleTask>, TodoError> {
        let tasks = store.get_tasks().await?;
        tracing::debug!(count = tasks.len(), "simple tasks loaded");
        Ok(tasks)
    }

    /// Read `taskCount`, then tasks `1..=count`
    ///
    /// Fails as a whole if any read fails.
    pub async fn load_tasks(
        &self,
        store: &dyn TodoStore,
    ) -> Result<(u64, Vec<CountedTask>), TodoError> {
        let count = store.task_count().await?;
        if count == 0 {
            return Ok((0, Vec::new()));
        }

        let tasks: Vec<CountedTask> = stream::iter(1..=count)
            .map(|id| store.task(id))
            .buffered(self.fetch_concurrency)
            .try_collect()
            .await?;

        tracing::debug!(count, concurrency = self.fetch_concurrency, "tasks loaded");
        Ok((count, tasks))
    }

    /// Load the Simple list and report the outcome as an event
    pub async fn reload_simple(&self, store: &dyn SimpleStore, events: &EventSender) {
        let event = match self.load_simple_tasks(store).await {
            Ok(tasks) => RuntimeEvent::SimpleTasksLoaded { tasks },
            Err(error) => {
                tracing::warn!(%error, "simple task load failed");
                RuntimeEvent::LoadFailed {
                    source: TaskSource::Simple,
                    error,
                }
            }
        };
        let _ = events.send(event);
    }

    /// Load the TodoWeb3 list and report the outcome as an event
    pub async fn reload_todo(&self, store: &dyn TodoStore, events: &EventSender) {
        let event = match self.load_tasks(store).await {
            Ok((count, tasks)) => RuntimeEvent::TasksLoaded { count, tasks },
            Err(error) => {
                tracing::warn!(%error, "task load failed");
                RuntimeEvent::LoadFailed {
                    source: TaskSource::TodoWeb3,
                    error,
                }
            }
        };
        let _ = events.send(event);
    }
}
