use crate::{
    core::errors::{state_errors::StateError, transaction_errors::TransactionError},
    definitions::network_config::ConfigError,
    network::NetworkError,
    Felt252,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("No class declared for {0}")]
    MissingDeclaration(String),
    #[error("Declarations unavailable: {0}")]
    Declarations(String),
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
    #[error("Transaction {transaction_hash:#x} reverted: {reason}")]
    TransactionReverted {
        transaction_hash: Felt252,
        reason: String,
    },
    #[error("Transaction {0:#x} did not deploy a contract")]
    MissingDeployment(Felt252),
    #[error("Unexpected return data from {0}")]
    UnexpectedReturnData(String),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Abi(#[from] alloy_sol_types::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
