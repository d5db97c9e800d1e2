//! Error taxonomy for network resolution, loading and mutations

use alloy_primitives::TxHash;
use thiserror::Error;

/// EIP-1193 "user rejected request"
const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    /// The connected chain has no usable TodoWeb3 deployment
    #[error("Unsupported network ({chain_id}). Please switch to a network with a TodoWeb3 deployment.")]
    UnsupportedNetwork { chain_id: u64 },

    /// Local input was invalid; nothing was sent
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The wallet declined to sign
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),

    /// Execution failed on-chain (or during estimation)
    #[error("transaction reverted{}: {reason}", tx_suffix(.tx_hash))]
    TransactionReverted {
        tx_hash: Option<TxHash>,
        reason: String,
    },

    /// Transport or provider failure
    #[error("rpc error: {0}")]
    Rpc(String),
}

fn tx_suffix(tx_hash: &Option<TxHash>) -> String {
    tx_hash.map(|hash| format!(" ({hash})")).unwrap_or_default()
}

impl TodoError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// Short label for status lines and logs
    pub fn kind(&self) -> &'static str {
        match self {
            TodoError::UnsupportedNetwork { .. } => "unsupported-network",
            TodoError::Precondition(_) => "precondition",
            TodoError::TransactionRejected(_) => "rejected",
            TodoError::TransactionReverted { .. } => "reverted",
            TodoError::Rpc(_) => "rpc",
        }
    }

    /// Classify a JSON-RPC error response by code and message
    pub fn from_error_response(code: i64, message: &str) -> Self {
        let lower = message.to_lowercase();
        if code == USER_REJECTED_CODE
            || lower.contains("user denied")
            || lower.contains("user rejected")
        {
            TodoError::TransactionRejected(message.to_string())
        } else if lower.contains("execution reverted") || lower.contains("revert") {
            TodoError::TransactionReverted {
                tx_hash: None,
                reason: message.to_string(),
            }
        } else {
            TodoError::Rpc(format!("{message} (code {code})"))
        }
    }
}

impl From<alloy::contract::Error> for TodoError {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(err) => err.into(),
            alloy::contract::Error::PendingTransactionError(err) => err.into(),
            other => TodoError::Rpc(other.to_string()),
        }
    }
}

impl From<alloy::transports::TransportError> for TodoError {
    fn from(err: alloy::transports::TransportError) -> Self {
        match err.as_error_resp() {
            Some(resp) => TodoError::from_error_response(resp.code, &resp.message),
            None => TodoError::Rpc(err.to_string()),
        }
    }
}

impl From<alloy::providers::PendingTransactionError> for TodoError {
    fn from(err: alloy::providers::PendingTransactionError) -> Self {
        match err {
            alloy::providers::PendingTransactionError::TransportError(err) => err.into(),
            other => TodoError::Rpc(other.to_string()),
        }
    }
}
