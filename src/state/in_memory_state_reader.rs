use crate::{
    core::errors::state_errors::StateError,
    state::{state_api::StateReader, state_cache::StorageEntry, StateDiff},
    utils::{Address, ClassHash},
    Felt252,
};
use getset::{Getters, MutGetters};
use std::collections::{HashMap, HashSet};

/// A [StateReader] that holds all the data in memory.
///
/// This is the committed state of the devnet: transactions run against a
/// [CachedState](super::cached_state::CachedState) on top of it and only reach it
/// through [InMemoryStateReader::apply_state_diff].
#[derive(Debug, MutGetters, Getters, PartialEq, Clone, Default)]
pub struct InMemoryStateReader {
    #[getset(get = "pub", get_mut = "pub")]
    pub(crate) address_to_class_hash: HashMap<Address, ClassHash>,
    #[getset(get = "pub", get_mut = "pub")]
    pub(crate) address_to_nonce: HashMap<Address, Felt252>,
    #[getset(get = "pub", get_mut = "pub")]
    pub(crate) address_to_storage: HashMap<StorageEntry, Felt252>,
    #[getset(get = "pub", get_mut = "pub")]
    pub(crate) declared_classes: HashSet<ClassHash>,
}

impl InMemoryStateReader {
    pub fn new(
        address_to_class_hash: HashMap<Address, ClassHash>,
        address_to_nonce: HashMap<Address, Felt252>,
        address_to_storage: HashMap<StorageEntry, Felt252>,
        declared_classes: HashSet<ClassHash>,
    ) -> Self {
        Self {
            address_to_class_hash,
            address_to_nonce,
            address_to_storage,
            declared_classes,
        }
    }

    /// Writes a state diff produced by a finished transaction.
    pub fn apply_state_diff(&mut self, state_diff: StateDiff) {
        let StateDiff {
            address_to_class_hash,
            address_to_nonce,
            storage_updates,
            declared_classes,
        } = state_diff;

        self.declared_classes.extend(declared_classes);
        self.address_to_class_hash.extend(address_to_class_hash);
        self.address_to_nonce.extend(address_to_nonce);
        self.address_to_storage.extend(storage_updates);
    }
}

impl StateReader for InMemoryStateReader {
    fn get_class_hash_at(&self, contract_address: &Address) -> Result<ClassHash, StateError> {
        self.address_to_class_hash
            .get(contract_address)
            .copied()
            .ok_or(StateError::NoneContractState(*contract_address))
    }

    fn get_nonce_at(&self, contract_address: &Address) -> Result<Felt252, StateError> {
        Ok(self
            .address_to_nonce
            .get(contract_address)
            .copied()
            .unwrap_or(Felt252::ZERO))
    }

    fn get_storage_at(&self, storage_entry: &StorageEntry) -> Result<Felt252, StateError> {
        if !self.address_to_class_hash.contains_key(&storage_entry.0) {
            return Err(StateError::NoneContractState(storage_entry.0));
        }
        // Unwritten storage reads as zero, like on a node.
        Ok(self
            .address_to_storage
            .get(storage_entry)
            .copied()
            .unwrap_or(Felt252::ZERO))
    }

    fn is_class_declared(&self, class_hash: &ClassHash) -> Result<bool, StateError> {
        Ok(self.declared_classes.contains(class_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn get_contract_state_test() {
        let mut state_reader = InMemoryStateReader::default();

        let contract_address = Address(37810u64.into());
        let class_hash = ClassHash([1; 32]);
        let nonce = Felt252::from(109u64);
        let storage_entry = (contract_address, [8; 32]);
        let storage_value = Felt252::from(800u64);

        state_reader
            .address_to_class_hash_mut()
            .insert(contract_address, class_hash);
        state_reader
            .address_to_nonce_mut()
            .insert(contract_address, nonce);
        state_reader
            .address_to_storage_mut()
            .insert(storage_entry, storage_value);

        assert_eq!(
            state_reader.get_class_hash_at(&contract_address).unwrap(),
            class_hash
        );
        assert_eq!(state_reader.get_nonce_at(&contract_address).unwrap(), nonce);
        assert_eq!(
            state_reader.get_storage_at(&storage_entry).unwrap(),
            storage_value
        );
        assert_eq!(
            state_reader
                .get_storage_at(&(contract_address, [9; 32]))
                .unwrap(),
            Felt252::ZERO
        );
    }

    #[test]
    fn reading_undeployed_contract_fails() {
        let state_reader = InMemoryStateReader::default();
        let address = Address(1u64.into());

        assert_matches!(
            state_reader.get_class_hash_at(&address),
            Err(StateError::NoneContractState(a)) if a == address
        );
        assert_matches!(
            state_reader.get_storage_at(&(address, [0; 32])),
            Err(StateError::NoneContractState(_))
        );
        assert_eq!(state_reader.get_nonce_at(&address).unwrap(), Felt252::ZERO);
    }

    #[test]
    fn apply_state_diff_overwrites_entries() {
        let address = Address(5u64.into());
        let mut state_reader = InMemoryStateReader::default();
        state_reader
            .address_to_class_hash_mut()
            .insert(address, ClassHash([1; 32]));

        let state_diff = StateDiff {
            address_to_class_hash: HashMap::from([(address, ClassHash([2; 32]))]),
            address_to_nonce: HashMap::from([(address, Felt252::ONE)]),
            storage_updates: HashMap::from([((address, [3; 32]), Felt252::from(2u64))]),
            declared_classes: HashSet::from([ClassHash([2; 32])]),
        };
        state_reader.apply_state_diff(state_diff);

        assert_eq!(
            state_reader.get_class_hash_at(&address).unwrap(),
            ClassHash([2; 32])
        );
        assert_eq!(state_reader.get_nonce_at(&address).unwrap(), Felt252::ONE);
        assert_eq!(
            state_reader.get_storage_at(&(address, [3; 32])).unwrap(),
            Felt252::from(2u64)
        );
        assert!(state_reader
            .is_class_declared(&ClassHash([2; 32]))
            .unwrap());
    }
}
