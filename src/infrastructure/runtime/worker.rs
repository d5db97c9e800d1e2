//! Async worker - network resolution, binding setup and mutation execution

use alloy::primitives::{Address, TxHash};

use crate::domain::{NetworkConfig, ResolvedNetwork, TaskSource, TodoError};
use crate::infrastructure::ethereum::{Bindings, WalletProvider};
use crate::infrastructure::runtime::bridge::{EventSender, Mutation, RuntimeEvent, Ticket};
use crate::infrastructure::runtime::loader::TaskLoader;

/// Result of a successful connection
#[derive(Debug, Clone)]
pub struct Session {
    pub network: ResolvedNetwork,
    pub endpoint: String,
    pub bindings: Bindings,
}

/// Query the chain, resolve its deployment and bind both contracts
///
/// An unsupported chain stops here: nothing is bound.
pub async fn connect(
    wallet: &dyn WalletProvider,
    networks: &NetworkConfig,
    simple_address: Address,
) -> Result<Session, TodoError> {
    let chain_id = wallet.chain_id().await?;
    let network = match networks.resolve(chain_id) {
        Ok(network) => network,
        Err(err) => {
            tracing::error!(chain_id, "no TodoWeb3 deployment for connected network");
            return Err(err);
        }
    };
    tracing::info!(chain_id, todo_web3 = %network.todo_web3, "network resolved");

    let bindings = wallet.bind(simple_address, &network).await?;
    Ok(Session {
        network,
        endpoint: wallet.endpoint_name(),
        bindings,
    })
}

/// Submits mutations, waits for their receipts and reloads the touched list
#[derive(Debug, Clone)]
pub struct MutationExecutor {
    bindings: Bindings,
    loader: TaskLoader,
}

impl MutationExecutor {
    pub fn new(bindings: Bindings, loader: TaskLoader) -> Self {
        Self { bindings, loader }
    }

    /// Run one mutation through submit → confirm → reload
    ///
    /// Progress is reported on `events`. A failed submission or confirmation
    /// skips the reload so the cached lists keep their last confirmed state.
    pub async fn execute(
        &self,
        ticket: Ticket,
        mutation: Mutation,
        events: &EventSender,
    ) -> Result<TxHash, TodoError> {
        let method = mutation.method();
        let outcome = self.submit_and_confirm(ticket, &mutation, events).await;

        let tx_hash = match outcome {
            Ok(tx_hash) => tx_hash,
            Err(error) => {
                tracing::warn!(ticket, method, kind = error.kind(), %error, "mutation failed");
                let _ = events.send(RuntimeEvent::MutationFailed {
                    ticket,
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        match mutation.target() {
            TaskSource::Simple => {
                self.loader
                    .reload_simple(self.bindings.simple.as_ref(), events)
                    .await
            }
            TaskSource::TodoWeb3 => {
                self.loader
                    .reload_todo(self.bindings.todo.as_ref(), events)
                    .await
            }
        }

        let _ = events.send(RuntimeEvent::Finished { ticket });
        Ok(tx_hash)
    }

    async fn submit_and_confirm(
        &self,
        ticket: Ticket,
        mutation: &Mutation,
        events: &EventSender,
    ) -> Result<TxHash, TodoError> {
        let simple = self.bindings.simple.as_ref();
        let todo = self.bindings.todo.as_ref();

        let tx_hash = match mutation {
            Mutation::AddSimpleTask { description } => simple.add_task(description).await?,
            Mutation::CompleteSimpleTask { id } => simple.complete_task(*id).await?,
            Mutation::CreateTask { content } => todo.create_task(content).await?,
            Mutation::ToggleTask { id } => todo.toggle_completed(*id).await?,
            Mutation::ClearCompletedTasks => todo.clear_completed_tasks().await?,
        };
        tracing::info!(ticket, method = mutation.method(), %tx_hash, "transaction submitted");
        let _ = events.send(RuntimeEvent::Submitted { ticket, tx_hash });

        match mutation.target() {
            TaskSource::Simple => simple.confirm(tx_hash).await?,
            TaskSource::TodoWeb3 => todo.confirm(tx_hash).await?,
        }
        tracing::info!(ticket, method = mutation.method(), %tx_hash, "transaction confirmed");
        let _ = events.send(RuntimeEvent::Confirmed { ticket, tx_hash });

        Ok(tx_hash)
    }

    /// Reload both lists, independently of any mutation
    pub async fn reload_all(&self, events: &EventSender) {
        self.loader
            .reload_todo(self.bindings.todo.as_ref(), events)
            .await;
        self.loader
            .reload_simple(self.bindings.simple.as_ref(), events)
            .await;
    }
}
