pub mod cached_state;
pub mod in_memory_state_reader;
pub mod state_api;
pub mod state_cache;

use crate::{
    utils::{Address, ClassHash},
    Felt252,
};
use getset::Getters;
use state_cache::{StateCache, StorageEntry};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// The sequence number of the last block created.
    pub block_number: u64,
    /// Timestamp of the beginning of the last block creation attempt.
    pub block_timestamp: u64,
    /// The sequencer address of this block.
    pub sequencer_address: Address,
}

impl BlockInfo {
    pub fn empty(sequencer_address: Address) -> Self {
        BlockInfo {
            block_number: 0,
            block_timestamp: 0,
            sequencer_address,
        }
    }

    /// Info of the block following this one.
    pub fn next(&self) -> Self {
        BlockInfo {
            block_number: self.block_number + 1,
            block_timestamp: self.block_timestamp + 1,
            sequencer_address: self.sequencer_address,
        }
    }
}

/// Every change a transaction made, ready to be applied on the committed state.
#[derive(Default, Clone, PartialEq, Debug, Getters)]
#[getset(get = "pub")]
pub struct StateDiff {
    pub(crate) address_to_class_hash: HashMap<Address, ClassHash>,
    pub(crate) address_to_nonce: HashMap<Address, Felt252>,
    pub(crate) storage_updates: HashMap<StorageEntry, Felt252>,
    pub(crate) declared_classes: HashSet<ClassHash>,
}

impl StateDiff {
    pub fn is_empty(&self) -> bool {
        self.address_to_class_hash.is_empty()
            && self.address_to_nonce.is_empty()
            && self.storage_updates.is_empty()
            && self.declared_classes.is_empty()
    }

    /// Addresses whose class changed, either by deployment or by replacement.
    pub fn replaced_classes(&self) -> impl Iterator<Item = (&Address, &ClassHash)> {
        self.address_to_class_hash.iter()
    }
}

impl From<StateCache> for StateDiff {
    fn from(cache: StateCache) -> Self {
        StateDiff {
            address_to_class_hash: cache.class_hash_writes,
            address_to_nonce: cache.nonce_writes,
            storage_updates: cache.storage_writes,
            declared_classes: cache.declared_classes,
        }
    }
}
