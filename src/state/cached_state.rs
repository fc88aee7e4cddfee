use super::{
    state_api::{State, StateReader, TransactionalState},
    state_cache::{StateCache, StorageEntry},
    StateDiff,
};
use crate::{
    core::errors::state_errors::StateError,
    utils::{Address, ClassHash},
    Felt252,
};
use getset::{Getters, MutGetters};

/// Buffers the writes of one transaction on top of a [StateReader].
///
/// Nothing reaches the underlying reader until the cache is turned into a
/// [StateDiff] and applied, so a transaction that fails halfway leaves no trace.
#[derive(Debug, Getters, MutGetters)]
pub struct CachedState<'a, T: StateReader> {
    pub(crate) state_reader: &'a T,
    #[getset(get = "pub", get_mut = "pub")]
    pub(crate) cache: StateCache,
}

/// Snapshot of the buffered writes, see [TransactionalState::checkpoint].
#[derive(Debug, Clone)]
pub struct Checkpoint(StateCache);

impl<'a, T: StateReader> CachedState<'a, T> {
    pub fn new(state_reader: &'a T) -> Self {
        Self {
            state_reader,
            cache: StateCache::default(),
        }
    }

    pub fn into_state_diff(self) -> StateDiff {
        StateDiff::from(self.cache)
    }
}

impl<'a, T: StateReader> StateReader for CachedState<'a, T> {
    fn get_class_hash_at(&self, contract_address: &Address) -> Result<ClassHash, StateError> {
        match self.cache.get_class_hash(contract_address) {
            Some(class_hash) => Ok(*class_hash),
            None => self.state_reader.get_class_hash_at(contract_address),
        }
    }

    fn get_nonce_at(&self, contract_address: &Address) -> Result<Felt252, StateError> {
        match self.cache.get_nonce(contract_address) {
            Some(nonce) => Ok(*nonce),
            None => self.state_reader.get_nonce_at(contract_address),
        }
    }

    fn get_storage_at(&self, storage_entry: &StorageEntry) -> Result<Felt252, StateError> {
        if let Some(value) = self.cache.get_storage(storage_entry) {
            return Ok(*value);
        }
        match self.state_reader.get_storage_at(storage_entry) {
            // Deployed in this transaction, nothing to read below.
            Err(StateError::NoneContractState(_))
                if self.cache.get_class_hash(&storage_entry.0).is_some() =>
            {
                Ok(Felt252::ZERO)
            }
            result => result,
        }
    }

    fn is_class_declared(&self, class_hash: &ClassHash) -> Result<bool, StateError> {
        if self.cache.declared_classes.contains(class_hash) {
            return Ok(true);
        }
        self.state_reader.is_class_declared(class_hash)
    }
}

impl<'a, T: StateReader> TransactionalState for CachedState<'a, T> {
    fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.cache.clone())
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.cache = checkpoint.0;
    }
}

impl<'a, T: StateReader> State for CachedState<'a, T> {
    fn declare_class(&mut self, class_hash: ClassHash) -> Result<(), StateError> {
        if self.is_class_declared(&class_hash)? {
            return Err(StateError::ClassAlreadyDeclared(class_hash));
        }
        self.cache.declared_classes.insert(class_hash);
        Ok(())
    }

    fn deploy_contract(
        &mut self,
        contract_address: Address,
        class_hash: ClassHash,
    ) -> Result<(), StateError> {
        if contract_address == Address(Felt252::ZERO) {
            return Err(StateError::ContractAddressOutOfRangeAddress(
                contract_address,
            ));
        }

        match self.get_class_hash_at(&contract_address) {
            Ok(current) if !current.is_zero() => {
                return Err(StateError::ContractAddressUnavailable(contract_address))
            }
            Ok(_) | Err(StateError::NoneContractState(_)) => {}
            Err(err) => return Err(err),
        }

        if !self.is_class_declared(&class_hash)? {
            return Err(StateError::UndeclaredClass(class_hash));
        }

        self.cache
            .class_hash_writes
            .insert(contract_address, class_hash);
        Ok(())
    }

    fn increment_nonce(&mut self, contract_address: &Address) -> Result<(), StateError> {
        let new_nonce = self.get_nonce_at(contract_address)? + Felt252::ONE;
        self.cache.nonce_writes.insert(*contract_address, new_nonce);
        Ok(())
    }

    fn set_storage_at(&mut self, storage_entry: &StorageEntry, value: Felt252) {
        self.cache.storage_writes.insert(*storage_entry, value);
    }

    fn set_class_hash_at(
        &mut self,
        contract_address: Address,
        class_hash: ClassHash,
    ) -> Result<(), StateError> {
        // replace_class only works on deployed contracts and declared classes.
        self.get_class_hash_at(&contract_address)?;
        if !self.is_class_declared(&class_hash)? {
            return Err(StateError::UndeclaredClass(class_hash));
        }

        self.cache
            .class_hash_writes
            .insert(contract_address, class_hash);
        Ok(())
    }
}
