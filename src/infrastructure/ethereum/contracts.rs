//! Alloy bindings for the Simple and TodoWeb3 contracts

use std::sync::Arc;
use std::time::Duration;

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::sol;

use crate::domain::{CountedTask, SimpleTask, TodoError};
use crate::infrastructure::ethereum::provider::{SignerHandle, WalletInner};
use crate::infrastructure::ethereum::store::{SimpleStore, TaskStore, TodoStore};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract SimpleTodo {
        struct Task {
            uint256 id;
            string description;
            bool completed;
        }

        function getTasks() external view returns (Task[] memory);
        function addTask(string memory description) external;
        function completeTask(uint256 id) external;
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract TodoWeb3 {
        function taskCount() external view returns (uint256);
        function tasks(uint256 _id) external view returns (uint256 id, string content, bool completed);
        function createTask(string memory _content) external;
        function toggleCompleted(uint256 _id) external;
        function clearCompletedTasks() external;
    }
}

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll for a receipt and turn a failed status into a revert
async fn wait_for_receipt(provider: &DynProvider, tx_hash: TxHash) -> Result<(), TodoError> {
    loop {
        if let Some(receipt) = provider.get_transaction_receipt(tx_hash).await? {
            if ReceiptResponse::status(&receipt) {
                return Ok(());
            }
            return Err(TodoError::TransactionReverted {
                tx_hash: Some(tx_hash),
                reason: format!("receipt status 0 in block {:?}", receipt.block_number),
            });
        }
        tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
    }
}

fn to_u64(value: U256, what: &str) -> Result<u64, TodoError> {
    u64::try_from(value).map_err(|_| TodoError::rpc(format!("{what} {value} does not fit in u64")))
}

/// Simple store bound to a signer for both reads and writes
pub struct AlloySimpleStore {
    contract: SimpleTodo::SimpleTodoInstance<DynProvider>,
    from: Address,
}

impl AlloySimpleStore {
    pub(crate) fn new(address: Address, signer: SignerHandle) -> Self {
        Self {
            contract: SimpleTodo::new(address, signer.provider),
            from: signer.from,
        }
    }
}

#[async_trait::async_trait]
impl TaskStore for AlloySimpleStore {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<(), TodoError> {
        wait_for_receipt(self.contract.provider(), tx_hash).await
    }
}

#[async_trait::async_trait]
impl SimpleStore for AlloySimpleStore {
    async fn get_tasks(&self) -> Result<Vec<SimpleTask>, TodoError> {
        let tasks = self.contract.getTasks().from(self.from).call().await?;
        tasks
            .into_iter()
            .map(|task| {
                Ok(SimpleTask {
                    id: to_u64(task.id, "task id")?,
                    description: task.description,
                    completed: task.completed,
                })
            })
            .collect()
    }

    async fn add_task(&self, description: &str) -> Result<TxHash, TodoError> {
        let pending = self
            .contract
            .addTask(description.to_string())
            .from(self.from)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn complete_task(&self, id: u64) -> Result<TxHash, TodoError> {
        let pending = self
            .contract
            .completeTask(U256::from(id))
            .from(self.from)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }
}

/// TodoWeb3 store: reads through the plain provider, writes through a
/// signer obtained per call
pub struct AlloyTodoStore {
    address: Address,
    reader: TodoWeb3::TodoWeb3Instance<DynProvider>,
    wallet: Arc<WalletInner>,
}

impl AlloyTodoStore {
    pub(crate) fn new(address: Address, wallet: Arc<WalletInner>) -> Self {
        Self {
            address,
            reader: TodoWeb3::new(address, wallet.reader().clone()),
            wallet,
        }
    }

    async fn writer(&self) -> Result<(TodoWeb3::TodoWeb3Instance<DynProvider>, Address), TodoError> {
        let signer = self.wallet.signer().await?;
        Ok((TodoWeb3::new(self.address, signer.provider), signer.from))
    }
}

#[async_trait::async_trait]
impl TaskStore for AlloyTodoStore {
    fn address(&self) -> Address {
        self.address
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<(), TodoError> {
        wait_for_receipt(self.reader.provider(), tx_hash).await
    }
}

#[async_trait::async_trait]
impl TodoStore for AlloyTodoStore {
    async fn task_count(&self) -> Result<u64, TodoError> {
        let count = self.reader.taskCount().call().await?;
        to_u64(count, "task count")
    }

    async fn task(&self, id: u64) -> Result<CountedTask, TodoError> {
        // Keyed by the mapping slot; a cleared slot reads back with a zero id
        let task = self.reader.tasks(U256::from(id)).call().await?;
        Ok(CountedTask {
            id,
            content: task.content,
            completed: task.completed,
        })
    }

    async fn create_task(&self, content: &str) -> Result<TxHash, TodoError> {
        let (contract, from) = self.writer().await?;
        let pending = contract
            .createTask(content.to_string())
            .from(from)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn toggle_completed(&self, id: u64) -> Result<TxHash, TodoError> {
        let (contract, from) = self.writer().await?;
        let pending = contract
            .toggleCompleted(U256::from(id))
            .from(from)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn clear_completed_tasks(&self) -> Result<TxHash, TodoError> {
        let (contract, from) = self.writer().await?;
        let pending = contract.clearCompletedTasks().from(from).send().await?;
        Ok(*pending.tx_hash())
    }
}
