//! Wallet provider abstraction and the Alloy HTTP implementation
//!
//! The provider answers the two questions initialization needs (which chain
//! are we on, who signs) and builds the contract bindings once the network
//! has been resolved.

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use anyhow::{Context, Result};

use crate::domain::{ResolvedNetwork, TodoError};
use crate::infrastructure::ethereum::contracts::{AlloySimpleStore, AlloyTodoStore};
use crate::infrastructure::ethereum::store::Bindings;

/// Where write transactions get their signature
#[derive(Debug, Clone)]
pub enum SignerSource {
    /// Sign locally with a private key
    Local(PrivateKeySigner),
    /// Let the node sign (unlocked dev accounts); `None` picks the first account
    Unlocked(Option<Address>),
}

impl SignerSource {
    pub fn from_private_key(key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = key.trim().parse().context("Invalid private key")?;
        Ok(SignerSource::Local(signer))
    }
}

/// Provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// HTTP JSON-RPC endpoint
    pub rpc: String,
    pub signer: SignerSource,
}

/// Injected wallet capability
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Chain id of the connected network
    async fn chain_id(&self) -> Result<u64, TodoError>;

    /// Create both contract bindings for a resolved network
    async fn bind(
        &self,
        simple_address: Address,
        network: &ResolvedNetwork,
    ) -> Result<Bindings, TodoError>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

/// A provider paired with the account it sends from
#[derive(Clone)]
pub(crate) struct SignerHandle {
    pub provider: DynProvider,
    pub from: Address,
}

/// Shared by the wallet and the TodoWeb3 binding, which re-derives a signer
/// for every write
pub(crate) struct WalletInner {
    endpoint: String,
    url: Url,
    read: DynProvider,
    source: SignerSource,
}

impl WalletInner {
    pub(crate) fn new(endpoint: String, url: Url, read: DynProvider, source: SignerSource) -> Self {
        Self {
            endpoint,
            url,
            read,
            source,
        }
    }

    pub(crate) fn reader(&self) -> &DynProvider {
        &self.read
    }

    pub(crate) async fn signer(&self) -> Result<SignerHandle, TodoError> {
        match &self.source {
            SignerSource::Local(key) => {
                let from = key.address();
                let provider = ProviderBuilder::new()
                    .wallet(key.clone())
                    .connect_http(self.url.clone())
                    .erased();
                Ok(SignerHandle { provider, from })
            }
            SignerSource::Unlocked(Some(from)) => Ok(SignerHandle {
                provider: self.read.clone(),
                from: *from,
            }),
            SignerSource::Unlocked(None) => {
                let accounts = self.read.get_accounts().await?;
                let from = accounts.first().copied().ok_or_else(|| {
                    TodoError::precondition(format!("no unlocked accounts on {}", self.endpoint))
                })?;
                Ok(SignerHandle {
                    provider: self.read.clone(),
                    from,
                })
            }
        }
    }
}

/// HTTP wallet backed by Alloy
pub struct AlloyWallet {
    inner: Arc<WalletInner>,
}

/// Create a wallet provider from configuration
pub fn create_wallet(config: ProviderConfig) -> Result<Box<dyn WalletProvider>> {
    let url: Url = config.rpc.parse().context("Invalid HTTP URL")?;
    let read = ProviderBuilder::new().connect_http(url.clone()).erased();
    Ok(Box::new(AlloyWallet {
        inner: Arc::new(WalletInner::new(config.rpc, url, read, config.signer)),
    }))
}

#[async_trait::async_trait]
impl WalletProvider for AlloyWallet {
    async fn chain_id(&self) -> Result<u64, TodoError> {
        Ok(self.inner.read.get_chain_id().await?)
    }

    async fn bind(
        &self,
        simple_address: Address,
        network: &ResolvedNetwork,
    ) -> Result<Bindings, TodoError> {
        // The Simple store keeps one signer-bound handle for reads and writes
        let signer = self.inner.signer().await?;
        let account = signer.from;
        let simple = AlloySimpleStore::new(simple_address, signer);
        let todo = AlloyTodoStore::new(network.todo_web3, self.inner.clone());

        tracing::info!(
            chain_id = network.chain_id,
            simple = %simple_address,
            todo_web3 = %network.todo_web3,
            account = %account,
            "contract bindings created"
        );

        Ok(Bindings {
            simple: Arc::new(simple),
            todo: Arc::new(todo),
            account,
        })
    }

    fn endpoint_name(&self) -> String {
        self.inner.endpoint.clone()
    }
}
