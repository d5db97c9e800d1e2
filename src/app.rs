//! Application state container
//!
//! Owns the cached task lists, the filter view and the staged inputs. The
//! caches are only replaced by load results arriving as [`RuntimeEvent`]s;
//! state-changing calls only leave through the `on_*` callbacks, which
//! validate and hand a [`Mutation`] to the executor.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use alloy::primitives::Address;

use crate::domain::{
    apply_filter, CountedTask, NetworkConfig, SimpleTask, TaskFilter, TaskRow, TaskSource,
    TodoError,
};
use crate::infrastructure::ethereum::{Bindings, WalletProvider};
use crate::infrastructure::runtime::{
    connect, Mutation, MutationExecutor, MutationPhase, RuntimeEvent, Session, TaskLoader, Ticket,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

#[derive(Debug, Clone)]
struct InFlight {
    mutation: Mutation,
    phase: MutationPhase,
    /// Staged input the mutation was built from
    staged: Option<String>,
}

pub struct App {
    pub endpoint: String,
    pub chain_id: Option<u64>,
    /// Signing account, shown by the navigation bar
    pub account: Option<Address>,
    bindings: Option<Bindings>,
    loader: TaskLoader,
    simple_tasks: Vec<SimpleTask>,
    /// Staged input for the Simple store
    pub new_simple_task: String,
    task_count: u64,
    tasks: Vec<CountedTask>,
    active_filter: TaskFilter,
    filtered_tasks: Vec<CountedTask>,
    /// Bumped every time the filtered view is recomputed
    view_revision: u64,
    /// Staged input for the TodoWeb3 store
    pub new_task: String,
    in_flight: BTreeMap<Ticket, InFlight>,
    next_ticket: Ticket,
    status: Option<StatusMessage>,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new(TaskLoader::default())
    }
}

impl App {
    pub fn new(loader: TaskLoader) -> Self {
        Self {
            endpoint: String::new(),
            chain_id: None,
            account: None,
            bindings: None,
            loader,
            simple_tasks: Vec::new(),
            new_simple_task: String::new(),
            task_count: 0,
            tasks: Vec::new(),
            active_filter: TaskFilter::All,
            filtered_tasks: Vec::new(),
            view_revision: 0,
            new_task: String::new(),
            in_flight: BTreeMap::new(),
            next_ticket: 1,
            status: None,
            should_quit: false,
        }
    }

    // === Startup ===

    /// Resolve the network, bind both contracts and load both lists
    ///
    /// Any failure leaves the app unbound with empty caches.
    pub async fn initialize(
        &mut self,
        wallet: &dyn WalletProvider,
        networks: &NetworkConfig,
        simple_address: Address,
    ) -> Result<(), TodoError> {
        let session = match connect(wallet, networks, simple_address).await {
            Ok(session) => session,
            Err(err) => {
                let text = match err {
                    TodoError::UnsupportedNetwork { .. } => {
                        format!("{err} {}", supported_networks(networks))
                    }
                    _ => err.to_string(),
                };
                self.set_status(text, StatusLevel::Error);
                return Err(err);
            }
        };

        let loaded = async {
            let tasks = self.loader.load_tasks(session.bindings.todo.as_ref()).await?;
            let simple = self
                .loader
                .load_simple_tasks(session.bindings.simple.as_ref())
                .await?;
            Ok::<_, TodoError>((tasks, simple))
        }
        .await;

        match loaded {
            Ok(((count, tasks), simple)) => {
                self.attach(session);
                self.replace_tasks(count, tasks);
                self.replace_simple_tasks(simple);
                self.set_status(
                    format!("Connected to chain {}", self.chain_id.unwrap_or_default()),
                    StatusLevel::Info,
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "initial load failed");
                self.set_status(format!("Initial load failed: {err}"), StatusLevel::Error);
                Err(err)
            }
        }
    }

    /// Adopt an established session without loading
    pub fn attach(&mut self, session: Session) {
        self.endpoint = session.endpoint;
        self.chain_id = Some(session.network.chain_id);
        self.account = Some(session.bindings.account);
        self.bindings = Some(session.bindings);
    }

    pub fn is_connected(&self) -> bool {
        self.bindings.is_some()
    }

    /// Executor over the current bindings
    pub fn executor(&self) -> Result<MutationExecutor, TodoError> {
        self.bindings
            .clone()
            .map(|bindings| MutationExecutor::new(bindings, self.loader))
            .ok_or_else(|| TodoError::precondition("not connected to a supported network"))
    }

    // === Staged inputs ===

    pub fn set_simple_input(&mut self, text: impl Into<String>) {
        self.new_simple_task = text.into();
    }

    pub fn set_task_input(&mut self, text: impl Into<String>) {
        self.new_task = text.into();
    }

    // === Mutation callbacks ===
    //
    // A successful callback registers the returned ticket as in flight. The
    // caller must hand it to `MutationExecutor::execute` or give it back
    // through `discard`.

    /// Simple store `addTask`
    pub fn on_add_simple(&mut self, description: &str) -> Result<(Ticket, Mutation), TodoError> {
        self.set_simple_input(description);
        let description = description.trim();
        self.begin(
            Mutation::AddSimpleTask {
                description: description.to_string(),
            },
            non_empty(description, "task description"),
        )
    }

    /// Simple store `completeTask`
    pub fn on_complete_simple(&mut self, id: u64) -> Result<(Ticket, Mutation), TodoError> {
        self.begin(Mutation::CompleteSimpleTask { id }, Ok(()))
    }

    /// TodoWeb3 `createTask`
    pub fn on_create(&mut self, text: &str) -> Result<(Ticket, Mutation), TodoError> {
        self.set_task_input(text);
        let content = text.trim();
        self.begin(
            Mutation::CreateTask {
                content: content.to_string(),
            },
            non_empty(content, "task text"),
        )
    }

    /// TodoWeb3 `toggleCompleted`
    pub fn on_toggle(&mut self, id: u64) -> Result<(Ticket, Mutation), TodoError> {
        let check = if id == 0 {
            Err(TodoError::precondition("task ids start at 1"))
        } else {
            Ok(())
        };
        self.begin(Mutation::ToggleTask { id }, check)
    }

    /// TodoWeb3 `clearCompletedTasks`
    pub fn on_clear_completed(&mut self) -> Result<(Ticket, Mutation), TodoError> {
        self.begin(Mutation::ClearCompletedTasks, Ok(()))
    }

    fn begin(
        &mut self,
        mutation: Mutation,
        check: Result<(), TodoError>,
    ) -> Result<(Ticket, Mutation), TodoError> {
        let ticket = self.next_ticket;
        tracing::debug!(ticket, method = mutation.method(), phase = ?MutationPhase::Validating);

        let check = check.and_then(|()| {
            if self.bindings.is_some() {
                Ok(())
            } else {
                Err(TodoError::precondition("not connected to a supported network"))
            }
        });
        if let Err(err) = check {
            tracing::info!(ticket, method = mutation.method(), %err, "mutation rejected locally");
            self.set_status(err.to_string(), StatusLevel::Warn);
            return Err(err);
        }

        let staged = match mutation {
            Mutation::AddSimpleTask { .. } => Some(self.new_simple_task.clone()),
            Mutation::CreateTask { .. } | Mutation::ClearCompletedTasks => {
                Some(self.new_task.clone())
            }
            Mutation::CompleteSimpleTask { .. } | Mutation::ToggleTask { .. } => None,
        };

        self.next_ticket += 1;
        self.in_flight.insert(
            ticket,
            InFlight {
                mutation: mutation.clone(),
                phase: MutationPhase::Validating,
                staged,
            },
        );
        Ok((ticket, mutation))
    }

    /// Drop a ticket that will never be executed
    pub fn discard(&mut self, ticket: Ticket) -> bool {
        self.in_flight.remove(&ticket).is_some()
    }

    // === Filter view ===

    /// Switch the filter; returns whether the view was recomputed
    pub fn set_filter(&mut self, filter: TaskFilter) -> bool {
        if filter == self.active_filter {
            return false;
        }
        self.active_filter = filter;
        self.recompute_view();
        true
    }

    fn recompute_view(&mut self) {
        self.filtered_tasks = apply_filter(&self.tasks, self.active_filter);
        self.view_revision += 1;
    }

    // === Event application ===

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::Submitted { ticket, tx_hash } => {
                self.set_phase(ticket, MutationPhase::Submitted);
                self.set_status(format!("Submitted {tx_hash}"), StatusLevel::Info);
            }
            RuntimeEvent::Confirmed { ticket, tx_hash } => {
                if let Some(flight) = self.in_flight.get_mut(&ticket) {
                    flight.phase = MutationPhase::Confirmed;
                    let mutation = flight.mutation.clone();
                    let staged = flight.staged.clone();
                    self.clear_staged_input(&mutation, staged.as_deref());
                }
                self.set_status(format!("Confirmed {tx_hash}"), StatusLevel::Info);
            }
            RuntimeEvent::MutationFailed { ticket, error } => {
                self.set_phase(ticket, MutationPhase::Rejected);
                if let Some(flight) = self.in_flight.remove(&ticket) {
                    tracing::debug!(ticket, method = flight.mutation.method(), phase = ?MutationPhase::Idle);
                }
                self.set_status(format!("{} failed: {error}", error.kind()), StatusLevel::Error);
            }
            RuntimeEvent::Finished { ticket } => {
                self.in_flight.remove(&ticket);
            }
            RuntimeEvent::SimpleTasksLoaded { tasks } => self.replace_simple_tasks(tasks),
            RuntimeEvent::TasksLoaded { count, tasks } => self.replace_tasks(count, tasks),
            RuntimeEvent::LoadFailed { source, error } => {
                let which = match source {
                    TaskSource::Simple => "Simple",
                    TaskSource::TodoWeb3 => "TodoWeb3",
                };
                self.set_status(format!("{which} reload failed: {error}"), StatusLevel::Error);
            }
        }
    }

    fn set_phase(&mut self, ticket: Ticket, phase: MutationPhase) {
        if let Some(flight) = self.in_flight.get_mut(&ticket) {
            tracing::debug!(ticket, method = flight.mutation.method(), ?phase);
            flight.phase = phase;
        }
    }

    /// Clear the buffer the mutation was staged from, unless it has been
    /// edited or restaged since
    fn clear_staged_input(&mut self, mutation: &Mutation, staged: Option<&str>) {
        let buffer = match mutation {
            Mutation::AddSimpleTask { .. } => &mut self.new_simple_task,
            Mutation::CreateTask { .. } | Mutation::ClearCompletedTasks => &mut self.new_task,
            Mutation::CompleteSimpleTask { .. } | Mutation::ToggleTask { .. } => return,
        };
        if staged == Some(buffer.as_str()) {
            buffer.clear();
        }
    }

    fn replace_simple_tasks(&mut self, tasks: Vec<SimpleTask>) {
        self.simple_tasks = tasks;
    }

    fn replace_tasks(&mut self, count: u64, tasks: Vec<CountedTask>) {
        self.task_count = count;
        self.tasks = tasks;
        self.recompute_view();
    }

    // === Queries ===

    pub fn simple_tasks(&self) -> &[SimpleTask] {
        &self.simple_tasks
    }

    pub fn tasks(&self) -> &[CountedTask] {
        &self.tasks
    }

    pub fn task_count(&self) -> u64 {
        self.task_count
    }

    pub fn filtered_tasks(&self) -> &[CountedTask] {
        &self.filtered_tasks
    }

    pub fn active_filter(&self) -> TaskFilter {
        self.active_filter
    }

    pub fn view_revision(&self) -> u64 {
        self.view_revision
    }

    /// Phase of a mutation; finished or unknown tickets are idle
    pub fn mutation_phase(&self, ticket: Ticket) -> MutationPhase {
        self.in_flight
            .get(&ticket)
            .map(|flight| flight.phase)
            .unwrap_or_default()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn simple_rows(&self) -> Vec<TaskRow> {
        self.simple_tasks.iter().map(TaskRow::from).collect()
    }

    pub fn task_rows(&self) -> Vec<TaskRow> {
        self.filtered_tasks.iter().map(TaskRow::from).collect()
    }

    /// The clear-completed control is hidden on the pending view
    pub fn clear_completed_visible(&self) -> bool {
        self.active_filter != TaskFilter::Pending
    }

    // === Status line ===

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(10) {
                self.status = None;
            }
        }
    }
}

fn supported_networks(networks: &NetworkConfig) -> String {
    let chain_ids = networks.supported_chain_ids();
    if chain_ids.is_empty() {
        return "No networks are configured.".to_string();
    }
    let list: Vec<String> = chain_ids.iter().map(u64::to_string).collect();
    format!("Supported chain ids: {}.", list.join(", "))
}

fn non_empty(value: &str, what: &str) -> Result<(), TodoError> {
    if value.is_empty() {
        Err(TodoError::precondition(format!("{what} must not be empty")))
    } else {
        Ok(())
    }
}
