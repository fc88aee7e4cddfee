use super::{cached_state::Checkpoint, state_cache::StorageEntry};
use crate::{
    core::errors::state_errors::StateError,
    utils::{Address, ClassHash},
    Felt252,
};

/// Read access to a Starknet state, local or remote.
pub trait StateReader {
    /// Returns the class hash of the contract class at the given address.
    fn get_class_hash_at(&self, contract_address: &Address) -> Result<ClassHash, StateError>;
    /// Returns the nonce of the given contract instance.
    fn get_nonce_at(&self, contract_address: &Address) -> Result<Felt252, StateError>;
    /// Returns the storage value under the given key in the given contract instance.
    fn get_storage_at(&self, storage_entry: &StorageEntry) -> Result<Felt252, StateError>;
    /// Returns whether a class with the given hash was declared.
    fn is_class_declared(&self, class_hash: &ClassHash) -> Result<bool, StateError>;
}

pub trait State {
    fn declare_class(&mut self, class_hash: ClassHash) -> Result<(), StateError>;

    fn deploy_contract(
        &mut self,
        contract_address: Address,
        class_hash: ClassHash,
    ) -> Result<(), StateError>;

    fn increment_nonce(&mut self, contract_address: &Address) -> Result<(), StateError>;

    fn set_storage_at(&mut self, storage_entry: &StorageEntry, value: Felt252);

    /// Replaces the class of an already deployed contract.
    fn set_class_hash_at(
        &mut self,
        contract_address: Address,
        class_hash: ClassHash,
    ) -> Result<(), StateError>;
}

/// A [State] whose writes can be rolled back, what EVM frames execute on.
pub trait TransactionalState: StateReader + State {
    fn checkpoint(&self) -> Checkpoint;

    /// Drops every write made after `checkpoint` was taken.
    fn rollback(&mut self, checkpoint: Checkpoint);
}
