//! Task store capabilities
//!
//! The two contracts keep separate data shapes, so each gets its own trait on
//! top of a shared [`TaskStore`] that covers what both can do: report where
//! they live and wait for a submitted transaction to land.

use std::sync::Arc;

use alloy_primitives::{Address, TxHash};

use crate::domain::{CountedTask, SimpleTask, TodoError};

/// Capability shared by both contract bindings
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync + 'static {
    /// Contract address this binding talks to
    fn address(&self) -> Address;

    /// Suspend until `tx_hash` is mined; a failed receipt is a revert
    async fn confirm(&self, tx_hash: TxHash) -> Result<(), TodoError>;
}

/// Flat list store with one-way completion
#[async_trait::async_trait]
pub trait SimpleStore: TaskStore {
    async fn get_tasks(&self) -> Result<Vec<SimpleTask>, TodoError>;

    async fn add_task(&self, description: &str) -> Result<TxHash, TodoError>;

    async fn complete_task(&self, id: u64) -> Result<TxHash, TodoError>;
}

/// Counted store with tasks addressed by 1-based id
#[async_trait::async_trait]
pub trait TodoStore: TaskStore {
    async fn task_count(&self) -> Result<u64, TodoError>;

    async fn task(&self, id: u64) -> Result<CountedTask, TodoError>;

    async fn create_task(&self, content: &str) -> Result<TxHash, TodoError>;

    async fn toggle_completed(&self, id: u64) -> Result<TxHash, TodoError>;

    async fn clear_completed_tasks(&self) -> Result<TxHash, TodoError>;
}

/// Both bindings, created together or not at all
#[derive(Clone)]
pub struct Bindings {
    pub simple: Arc<dyn SimpleStore>,
    pub todo: Arc<dyn TodoStore>,
    /// Account that signs writes
    pub account: Address,
}

impl std::fmt::Debug for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindings")
            .field("simple", &self.simple.address())
            .field("todo", &self.todo.address())
            .field("account", &self.account)
            .finish()
    }
}
