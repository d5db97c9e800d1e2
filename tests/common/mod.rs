//! In-memory stores and wallet with failure injection

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, TxHash};
use todo_web3::domain::{CountedTask, NetworkConfig, ResolvedNetwork, SimpleTask, TodoError};
use todo_web3::infrastructure::ethereum::{
    Bindings, SimpleStore, TaskStore, TodoStore, WalletProvider,
};
use todo_web3::infrastructure::runtime::{EventReceiver, RuntimeEvent};

pub const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const SIMPLE_ADDRESS: Address = address!("dd1E4C96faee94f34CA66A80D0c1A83879a8dE29");
pub const TODO_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const CHAIN_ID: u64 = 31_337;

pub fn networks() -> NetworkConfig {
    let mut networks = NetworkConfig::new();
    networks.insert(CHAIN_ID, TODO_ADDRESS);
    networks
}

fn tx_hash(n: usize) -> TxHash {
    TxHash::with_last_byte(n as u8)
}

/// Failure switches shared by both mock stores
#[derive(Debug, Default)]
struct Faults {
    submit: Option<TodoError>,
    confirm: Option<TodoError>,
    read: Option<TodoError>,
}

// === Simple ===

#[derive(Default)]
pub struct MockSimpleStore {
    tasks: Mutex<Vec<SimpleTask>>,
    faults: Mutex<Faults>,
    submissions: AtomicUsize,
    reads: AtomicUsize,
}

impl MockSimpleStore {
    pub fn with_tasks(descriptions: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut tasks = store.tasks.lock().unwrap();
            for (i, description) in descriptions.iter().enumerate() {
                tasks.push(SimpleTask {
                    id: i as u64,
                    description: description.to_string(),
                    completed: false,
                });
            }
        }
        store
    }

    pub fn fail_submit(&self, error: TodoError) {
        self.faults.lock().unwrap().submit = Some(error);
    }

    pub fn fail_confirm(&self, error: TodoError) {
        self.faults.lock().unwrap().confirm = Some(error);
    }

    pub fn fail_reads(&self, error: TodoError) {
        self.faults.lock().unwrap().read = Some(error);
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn submit(&self, apply: impl FnOnce(&mut Vec<SimpleTask>)) -> Result<TxHash, TodoError> {
        if let Some(err) = self.faults.lock().unwrap().submit.clone() {
            return Err(err);
        }
        apply(&mut self.tasks.lock().unwrap());
        let n = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(tx_hash(n))
    }
}

#[async_trait::async_trait]
impl TaskStore for MockSimpleStore {
    fn address(&self) -> Address {
        SIMPLE_ADDRESS
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<(), TodoError> {
        match self.faults.lock().unwrap().confirm.clone() {
            Some(TodoError::TransactionReverted { reason, .. }) => {
                Err(TodoError::TransactionReverted {
                    tx_hash: Some(tx_hash),
                    reason,
                })
            }
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl SimpleStore for MockSimpleStore {
    async fn get_tasks(&self) -> Result<Vec<SimpleTask>, TodoError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults.lock().unwrap().read.clone() {
            return Err(err);
        }
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn add_task(&self, description: &str) -> Result<TxHash, TodoError> {
        self.submit(|tasks| {
            tasks.push(SimpleTask {
                id: tasks.len() as u64,
                description: description.to_string(),
                completed: false,
            })
        })
    }

    async fn complete_task(&self, id: u64) -> Result<TxHash, TodoError> {
        self.submit(|tasks| {
            if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
                task.completed = true;
            }
        })
    }
}

// === TodoWeb3 ===

#[derive(Default)]
pub struct MockTodoStore {
    /// Slot `i` holds task id `i + 1`
    tasks: Mutex<Vec<(String, bool)>>,
    faults: Mutex<Faults>,
    fail_read_at: Mutex<Option<u64>>,
    /// Simulated latency of `tasks(id)`; lower ids answer last
    read_delay: Mutex<Option<Duration>>,
    confirm_delay: Mutex<Option<Duration>>,
    submissions: AtomicUsize,
    reads: AtomicUsize,
    reads_in_flight: AtomicUsize,
    max_reads_in_flight: AtomicUsize,
}

impl MockTodoStore {
    pub fn with_tasks(tasks: &[(&str, bool)]) -> Self {
        let store = Self::default();
        *store.tasks.lock().unwrap() = tasks
            .iter()
            .map(|(content, completed)| (content.to_string(), *completed))
            .collect();
        store
    }

    pub fn with_count(n: u64) -> Self {
        let store = Self::default();
        *store.tasks.lock().unwrap() = (1..=n).map(|id| (format!("task {id}"), false)).collect();
        store
    }

    pub fn fail_submit(&self, error: TodoError) {
        self.faults.lock().unwrap().submit = Some(error);
    }

    pub fn fail_confirm(&self, error: TodoError) {
        self.faults.lock().unwrap().confirm = Some(error);
    }

    pub fn fail_count(&self, error: TodoError) {
        self.faults.lock().unwrap().read = Some(error);
    }

    pub fn fail_read_at(&self, id: u64) {
        *self.fail_read_at.lock().unwrap() = Some(id);
    }

    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_confirm_delay(&self, delay: Duration) {
        *self.confirm_delay.lock().unwrap() = Some(delay);
    }

    /// Write a task without going through a transaction
    pub fn push_task(&self, content: &str) {
        self.tasks.lock().unwrap().push((content.to_string(), false));
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn max_reads_in_flight(&self) -> usize {
        self.max_reads_in_flight.load(Ordering::SeqCst)
    }

    fn submit(&self, apply: impl FnOnce(&mut Vec<(String, bool)>)) -> Result<TxHash, TodoError> {
        if let Some(err) = self.faults.lock().unwrap().submit.clone() {
            return Err(err);
        }
        apply(&mut self.tasks.lock().unwrap());
        let n = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(tx_hash(100 + n))
    }
}

#[async_trait::async_trait]
impl TaskStore for MockTodoStore {
    fn address(&self) -> Address {
        TODO_ADDRESS
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<(), TodoError> {
        let delay = *self.confirm_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.faults.lock().unwrap().confirm.clone() {
            Some(TodoError::TransactionReverted { reason, .. }) => {
                Err(TodoError::TransactionReverted {
                    tx_hash: Some(tx_hash),
                    reason,
                })
            }
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl TodoStore for MockTodoStore {
    async fn task_count(&self) -> Result<u64, TodoError> {
        if let Some(err) = self.faults.lock().unwrap().read.clone() {
            return Err(err);
        }
        Ok(self.tasks.lock().unwrap().len() as u64)
    }

    async fn task(&self, id: u64) -> Result<CountedTask, TodoError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let now = self.reads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_reads_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            let count = self.tasks.lock().unwrap().len() as u32;
            tokio::time::sleep(delay * (count + 1 - id as u32)).await;
        }
        self.reads_in_flight.fetch_sub(1, Ordering::SeqCst);

        if *self.fail_read_at.lock().unwrap() == Some(id) {
            return Err(TodoError::rpc(format!("tasks({id}) timed out")));
        }
        let tasks = self.tasks.lock().unwrap();
        let (content, completed) = id
            .checked_sub(1)
            .and_then(|slot| tasks.get(slot as usize).cloned())
            .unwrap_or_default();
        Ok(CountedTask {
            id,
            content,
            completed,
        })
    }

    async fn create_task(&self, content: &str) -> Result<TxHash, TodoError> {
        self.submit(|tasks| tasks.push((content.to_string(), false)))
    }

    async fn toggle_completed(&self, id: u64) -> Result<TxHash, TodoError> {
        self.submit(|tasks| {
            if let Some((_, completed)) = id
                .checked_sub(1)
                .and_then(|slot| tasks.get_mut(slot as usize))
            {
                *completed = !*completed;
            }
        })
    }

    async fn clear_completed_tasks(&self) -> Result<TxHash, TodoError> {
        self.submit(|tasks| tasks.retain(|(_, completed)| !completed))
    }
}

// === Wallet ===

pub struct MockWallet {
    chain_id: Result<u64, TodoError>,
    pub simple: Arc<MockSimpleStore>,
    pub todo: Arc<MockTodoStore>,
    bind_calls: AtomicUsize,
}

impl MockWallet {
    pub fn new(chain_id: u64, simple: MockSimpleStore, todo: MockTodoStore) -> Self {
        Self {
            chain_id: Ok(chain_id),
            simple: Arc::new(simple),
            todo: Arc::new(todo),
            bind_calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable(error: TodoError) -> Self {
        Self {
            chain_id: Err(error),
            simple: Arc::default(),
            todo: Arc::default(),
            bind_calls: AtomicUsize::new(0),
        }
    }

    pub fn bind_calls(&self) -> usize {
        self.bind_calls.load(Ordering::SeqCst)
    }

    pub fn bindings(&self) -> Bindings {
        Bindings {
            simple: self.simple.clone(),
            todo: self.todo.clone(),
            account: ACCOUNT,
        }
    }
}

#[async_trait::async_trait]
impl WalletProvider for MockWallet {
    async fn chain_id(&self) -> Result<u64, TodoError> {
        self.chain_id.clone()
    }

    async fn bind(
        &self,
        _simple_address: Address,
        _network: &ResolvedNetwork,
    ) -> Result<Bindings, TodoError> {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bindings())
    }

    fn endpoint_name(&self) -> String {
        "mock://wallet".to_string()
    }
}

/// Everything currently queued on the event channel
pub fn drain(rx: &mut EventReceiver) -> Vec<RuntimeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
