//! The boundary the harness talks to a Kakarot network through.

use crate::{
    core::errors::{
        evm_errors::EvmError, kakarot_errors::KakarotError, state_errors::StateError,
        transaction_errors::TransactionError,
    },
    evm::SignedTransaction,
    state::state_api::StateReader,
    utils::Address,
    Felt252,
};
use alloy_primitives::{Address as EvmAddress, Bytes};
use k256::ecdsa::SigningKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Unknown contract {0}")]
    UnknownContract(String),
    #[error("Class {0} is not declared")]
    MissingDeclaration(String),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Kakarot(#[from] KakarotError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Evm(#[from] EvmError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Succeeded,
    Reverted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: Felt252,
    pub block_number: u64,
    pub execution_status: ExecutionStatus,
    pub actual_fee: u128,
    /// Return data of a Starknet invoke.
    pub return_data: Vec<Felt252>,
    /// Output of an EVM transaction.
    pub output: Bytes,
    /// Contract created by an EVM deployment.
    pub contract_address: Option<EvmAddress>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.execution_status == ExecutionStatus::Succeeded
    }

    pub fn revert_reason(&self) -> Option<&str> {
        match &self.execution_status {
            ExecutionStatus::Reverted(reason) => Some(reason),
            ExecutionStatus::Succeeded => None,
        }
    }
}

/// A Kakarot deployment on Starknet.
///
/// Every write is durable once the method returns.
pub trait KakarotNetwork: StateReader {
    fn chain_id(&self) -> u64;

    /// Max fee used when the caller does not pick one.
    fn default_max_fee(&self) -> u128;

    /// State-mutating call to a named system contract (`kakarot`, `ETH`), sent by the Kakarot owner.
    fn invoke(
        &mut self,
        contract_name: &str,
        function_name: &str,
        calldata: &[Felt252],
    ) -> Result<TransactionReceipt, NetworkError>;

    /// Read-only call to a named system contract.
    fn call(
        &self,
        contract_name: &str,
        function_name: &str,
        calldata: &[Felt252],
    ) -> Result<Vec<Felt252>, NetworkError>;

    /// Deploys the account of `private_key` if needed and funds it with `amount`.
    fn get_eoa(&mut self, private_key: &SigningKey, amount: u128) -> Result<Address, NetworkError>;

    fn fund_address(&mut self, address: Address, amount: u128) -> Result<(), NetworkError>;

    /// EVM nonce of `address`, zero when it has no account.
    fn get_transaction_count(&self, address: &EvmAddress) -> Result<u64, NetworkError>;

    /// Sends an EVM transaction through the account proxy at `sender`.
    fn send_raw_transaction(
        &mut self,
        sender: Address,
        transaction: SignedTransaction,
    ) -> Result<TransactionReceipt, NetworkError>;

    /// Runs a call without committing anything, nor upgrading any account.
    fn eth_call(
        &self,
        from: Option<EvmAddress>,
        to: EvmAddress,
        data: &[u8],
    ) -> Result<Bytes, NetworkError>;
}
