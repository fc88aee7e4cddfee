use crate::{
    core::errors::{evm_errors::EvmError, kakarot_errors::KakarotError, state_errors::StateError},
    utils::Address,
};
use alloy_primitives::{Address as EvmAddress, U256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Signer {recovered} does not own account {account} of {expected}")]
    SignerMismatch {
        account: Address,
        expected: EvmAddress,
        recovered: EvmAddress,
    },
    #[error("Invalid transaction nonce. Expected: {0} got {1}")]
    InvalidTransactionNonce(u64, u64),
    #[error("Invalid chain id. Expected: {0} got {1}")]
    InvalidChainId(u64, u64),
    #[error("Max fee ({max_fee}) and value ({value}) exceed balance ({balance})")]
    InsufficientBalance {
        max_fee: u128,
        value: U256,
        balance: U256,
    },
    #[error("Account {0} is not initialized")]
    UninitializedAccount(Address),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Kakarot(#[from] KakarotError),
    #[error(transparent)]
    Evm(#[from] EvmError),
}
