//! Task records for both stores and the filtered view over TodoWeb3 tasks

use std::fmt;

/// A task from the Simple store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTask {
    pub id: u64,
    pub description: String,
    pub completed: bool,
}

/// A task from the TodoWeb3 store; ids run 1..=taskCount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedTask {
    pub id: u64,
    pub content: String,
    pub completed: bool,
}

/// Filter criterion for the TodoWeb3 list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Pending, TaskFilter::Completed];

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "all" | "a" => Some(TaskFilter::All),
            "pending" | "open" | "p" => Some(TaskFilter::Pending),
            "completed" | "done" | "c" => Some(TaskFilter::Completed),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TaskFilter::All => "All",
            TaskFilter::Pending => "Pending",
            TaskFilter::Completed => "Completed",
        }
    }

    pub fn matches(&self, task: &CountedTask) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Pending => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title().to_lowercase())
    }
}

/// Derive the displayed subset of `tasks`, keeping source order
pub fn apply_filter(tasks: &[CountedTask], filter: TaskFilter) -> Vec<CountedTask> {
    match filter {
        TaskFilter::All => tasks.to_vec(),
        _ => tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect(),
    }
}

/// Which store a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSource {
    Simple,
    TodoWeb3,
}

/// Render-ready row handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub source: TaskSource,
    pub id: u64,
    pub text: String,
    pub completed: bool,
    /// Whether a complete/toggle control should be offered
    pub actionable: bool,
}

impl From<&SimpleTask> for TaskRow {
    fn from(task: &SimpleTask) -> Self {
        Self {
            source: TaskSource::Simple,
            id: task.id,
            text: task.description.clone(),
            completed: task.completed,
            // completion is one-way on the Simple store
            actionable: !task.completed,
        }
    }
}

impl From<&CountedTask> for TaskRow {
    fn from(task: &CountedTask) -> Self {
        Self {
            source: TaskSource::TodoWeb3,
            id: task.id,
            text: task.content.clone(),
            completed: task.completed,
            actionable: true,
        }
    }
}
