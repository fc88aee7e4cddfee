use crate::{
    utils::{Address, ClassHash},
    Felt252,
};
use getset::{Getters, MutGetters};
use std::collections::{HashMap, HashSet};

/// (contract_address, key)
pub type StorageEntry = (Address, [u8; 32]);

/// Writes buffered by a [CachedState](super::cached_state::CachedState) on top of its reader.
#[derive(Default, Clone, Debug, Eq, Getters, MutGetters, PartialEq)]
pub struct StateCache {
    #[getset(get = "pub", get_mut = "pub")]
    pub(crate) class_hash_writes: HashMap<Address, ClassHash>,
    #[getset(get = "pub", get_mut = "pub")]
    pub(crate) nonce_writes: HashMap<Address, Felt252>,
    #[getset(get = "pub", get_mut = "pub")]
    pub(crate) storage_writes: HashMap<StorageEntry, Felt252>,
    #[getset(get = "pub", get_mut = "pub")]
    pub(crate) declared_classes: HashSet<ClassHash>,
}

impl StateCache {
    pub(crate) fn get_class_hash(&self, contract_address: &Address) -> Option<&ClassHash> {
        self.class_hash_writes.get(contract_address)
    }

    pub(crate) fn get_nonce(&self, contract_address: &Address) -> Option<&Felt252> {
        self.nonce_writes.get(contract_address)
    }

    pub(crate) fn get_storage(&self, storage_entry: &StorageEntry) -> Option<&Felt252> {
        self.storage_writes.get(storage_entry)
    }

    pub fn is_empty(&self) -> bool {
        self.class_hash_writes.is_empty()
            && self.nonce_writes.is_empty()
            && self.storage_writes.is_empty()
            && self.declared_classes.is_empty()
    }
}
