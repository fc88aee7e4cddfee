use crate::{core::errors::state_errors::StateError, utils::Address, Felt252};
use alloy_primitives::{Address as EvmAddress, U256};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum KakarotError {
    #[error("Ownable: caller is not the owner")]
    CallerIsNotOwner,
    #[error("Entry point {0} not found")]
    EntryPointNotFound(String),
    #[error("Invalid calldata for {entry_point}: expected {expected} felts, got {actual}")]
    InvalidCalldata {
        entry_point: String,
        expected: usize,
        actual: usize,
    },
    #[error("Felt {0:#x} is not an evm address")]
    InvalidEvmAddress(Felt252),
    #[error("No account deployed for evm address {0}")]
    UnknownEvmAddress(EvmAddress),
    #[error("Account {0} is already deployed for evm address {1}")]
    AccountAlreadyDeployed(Address, EvmAddress),
    #[error("Account {0} is not initialized")]
    AccountNotInitialized(Address),
    #[error("ERC20: transfer amount {amount} exceeds balance {balance} of {address}")]
    InsufficientBalance {
        address: Address,
        balance: U256,
        amount: U256,
    },
    #[error(transparent)]
    State(#[from] StateError),
}
