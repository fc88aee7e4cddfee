use crate::{
    state::state_cache::StorageEntry,
    utils::{Address, ClassHash},
};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("No contract state assigned for contract address: {0}")]
    NoneContractState(Address),
    #[error("No storage value assigned for entry: {0:?}")]
    NoneStorage(StorageEntry),
    #[error("Requested contract address {0} is unavailable for deployment")]
    ContractAddressUnavailable(Address),
    #[error("Contract address {0} is out of range")]
    ContractAddressOutOfRangeAddress(Address),
    #[error("Class with hash {0} is not declared")]
    UndeclaredClass(ClassHash),
    #[error("Class with hash {0} is already declared")]
    ClassAlreadyDeclared(ClassHash),
    #[error("{0}")]
    CustomError(String),
}
