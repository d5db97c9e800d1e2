//! Commands and events exchanged between the state container and async work
//!
//! Validated user actions become [`Mutation`]s; everything the async side
//! learns comes back as a [`RuntimeEvent`] and is applied by the app in
//! arrival order.

use alloy::primitives::TxHash;
use tokio::sync::mpsc;

use crate::domain::{CountedTask, SimpleTask, TaskSource, TodoError};

/// Ticket identifying one mutation lifecycle
pub type Ticket = u64;

/// State-changing call, already validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Simple store `addTask`
    AddSimpleTask { description: String },
    /// Simple store `completeTask`
    CompleteSimpleTask { id: u64 },
    /// TodoWeb3 `createTask`
    CreateTask { content: String },
    /// TodoWeb3 `toggleCompleted`
    ToggleTask { id: u64 },
    /// TodoWeb3 `clearCompletedTasks`
    ClearCompletedTasks,
}

impl Mutation {
    /// Store the mutation writes to (and reloads afterwards)
    pub fn target(&self) -> TaskSource {
        match self {
            Mutation::AddSimpleTask { .. } | Mutation::CompleteSimpleTask { .. } => {
                TaskSource::Simple
            }
            Mutation::CreateTask { .. }
            | Mutation::ToggleTask { .. }
            | Mutation::ClearCompletedTasks => TaskSource::TodoWeb3,
        }
    }

    /// Contract method name
    pub fn method(&self) -> &'static str {
        match self {
            Mutation::AddSimpleTask { .. } => "addTask",
            Mutation::CompleteSimpleTask { .. } => "completeTask",
            Mutation::CreateTask { .. } => "createTask",
            Mutation::ToggleTask { .. } => "toggleCompleted",
            Mutation::ClearCompletedTasks => "clearCompletedTasks",
        }
    }
}

/// Lifecycle of a single mutation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationPhase {
    #[default]
    Idle,
    Validating,
    Submitted,
    Confirmed,
    Rejected,
}

/// Events sent from async work to the state container
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    /// Transaction accepted by the node
    Submitted { ticket: Ticket, tx_hash: TxHash },
    /// Receipt received with success status
    Confirmed { ticket: Ticket, tx_hash: TxHash },
    /// Submission or confirmation failed; no reload follows
    MutationFailed { ticket: Ticket, error: TodoError },
    /// Mutation lifecycle over (reload attempted)
    Finished { ticket: Ticket },
    /// Full Simple list read
    SimpleTasksLoaded { tasks: Vec<SimpleTask> },
    /// Full TodoWeb3 list read
    TasksLoaded { count: u64, tasks: Vec<CountedTask> },
    /// A load aborted; caches keep their previous contents
    LoadFailed { source: TaskSource, error: TodoError },
}

pub type EventSender = mpsc::UnboundedSender<RuntimeEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<RuntimeEvent>;

/// Create the event channel
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
