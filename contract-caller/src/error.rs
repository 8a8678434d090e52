// Error handling

use ethers::types::{H256, U256, U64};
use ethers::utils::format_ether;
use std::time::Duration;
use thiserror::Error;

/// Rough category of a failure reported by the RPC or signing layer.
///
/// Only used to pick a hint for the operator; every kind is handled the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainErrorKind {
    InsufficientFunds,
    Network,
    Rejected,
    Other,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ChainError {
    pub kind: ChainErrorKind,
    pub message: String,
}

impl ChainError {
    /// Classify a library error by its rendered message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        let kind = if lower.contains("insufficient funds") {
            ChainErrorKind::InsufficientFunds
        } else if lower.contains("user rejected") || lower.contains("user denied") {
            ChainErrorKind::Rejected
        } else if lower.contains("error sending request")
            || lower.contains("connection")
            || lower.contains("dns error")
            || lower.contains("timed out")
            || lower.contains("http error")
        {
            ChainErrorKind::Network
        } else {
            ChainErrorKind::Other
        };

        ChainError { kind, message }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("please switch to the {name} network (chain id {expected}), connected to chain id {actual}")]
    WrongNetwork {
        name: String,
        expected: u64,
        actual: u64,
    },

    #[error("insufficient balance: have {}, need at least {}", ether(.balance), ether(.required))]
    InsufficientFunds { balance: U256, required: U256 },

    #[error("{0}")]
    Chain(#[from] ChainError),

    #[error("no confirmation within {0:?}")]
    Timeout(Duration),

    #[error("transaction {0:?} was dropped before confirmation")]
    Dropped(H256),

    #[error("transaction {tx_hash:?} reverted in block {block_number:?}")]
    Reverted {
        tx_hash: H256,
        block_number: Option<U64>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RunnerError {
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RunnerError::InsufficientFunds { .. } => {
                Some("make sure the wallet holds enough native currency for value plus gas")
            }
            RunnerError::WrongNetwork { .. } => Some("check the RPC URL points at the expected chain"),
            RunnerError::Timeout(_) => Some("the network may be congested; check the hash on the explorer before retrying"),
            RunnerError::Chain(err) => match err.kind {
                ChainErrorKind::InsufficientFunds => {
                    Some("make sure the wallet holds enough native currency for value plus gas")
                }
                ChainErrorKind::Network => Some("check the network connection and RPC endpoint"),
                ChainErrorKind::Rejected => Some("the transaction was rejected by the signer"),
                ChainErrorKind::Other => None,
            },
            _ => None,
        }
    }
}

impl From<ethers::signers::WalletError> for RunnerError {
    fn from(err: ethers::signers::WalletError) -> Self {
        RunnerError::Config(format!("invalid private key: {}", err))
    }
}

impl From<ethers::utils::ConversionError> for RunnerError {
    fn from(err: ethers::utils::ConversionError) -> Self {
        RunnerError::Config(format!("invalid amount: {}", err))
    }
}

impl From<url::ParseError> for RunnerError {
    fn from(err: url::ParseError) -> Self {
        RunnerError::Config(format!("invalid RPC URL: {}", err))
    }
}

fn ether(wei: &U256) -> String {
    format_ether(*wei)
}

pub type Result<T> = std::result::Result<T, RunnerError>;
