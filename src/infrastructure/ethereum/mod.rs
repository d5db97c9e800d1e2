//! Ethereum infrastructure - Alloy wallet provider and contract bindings

mod contracts;
mod provider;
mod store;

pub use contracts::{AlloySimpleStore, AlloyTodoStore};
pub use provider::{create_wallet, AlloyWallet, ProviderConfig, SignerSource, WalletProvider};
pub use store::{Bindings, SimpleStore, TaskStore, TodoStore};
