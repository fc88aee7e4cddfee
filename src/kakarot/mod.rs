//! The Kakarot system contracts of the devnet.
//!
//! Contracts are native implementations working directly on a Starknet
//! [State], using the same storage variables as their Cairo counterparts so
//! that storage reads from the outside resolve to the same slots.

pub mod account_contract;
pub mod fee_token;
pub mod kakarot_core;

pub use account_contract::{AccountContract, Upgrade};
pub use fee_token::FeeToken;
pub use kakarot_core::KakarotCore;

use crate::{
    core::errors::state_errors::StateError,
    state::{
        state_api::{State, StateReader},
        state_cache::StorageEntry,
    },
    utils::{compute_storage_key, felt_to_hash, join_u256, split_u256, Address},
    Felt252,
};
use alloy_primitives::U256;

pub(crate) fn storage_entry(
    contract: Address,
    var_name: &str,
    keys: &[Felt252],
) -> Result<StorageEntry, StateError> {
    let key = compute_storage_key(var_name, keys)?;
    Ok((contract, felt_to_hash(&key)))
}

pub(crate) fn read_felt<S: StateReader + ?Sized>(
    state: &S,
    contract: Address,
    var_name: &str,
    keys: &[Felt252],
) -> Result<Felt252, StateError> {
    state.get_storage_at(&storage_entry(contract, var_name, keys)?)
}

pub(crate) fn write_felt<S: State + ?Sized>(
    state: &mut S,
    contract: Address,
    var_name: &str,
    keys: &[Felt252],
    value: Felt252,
) -> Result<(), StateError> {
    state.set_storage_at(&storage_entry(contract, var_name, keys)?, value);
    Ok(())
}

/// Reads a `Uint256` variable, stored as (low, high) in two consecutive slots.
pub(crate) fn read_u256<S: StateReader + ?Sized>(
    state: &S,
    contract: Address,
    var_name: &str,
    keys: &[Felt252],
) -> Result<U256, StateError> {
    let key = compute_storage_key(var_name, keys)?;
    let low = state.get_storage_at(&(contract, felt_to_hash(&key)))?;
    let high = state.get_storage_at(&(contract, felt_to_hash(&(key + Felt252::ONE))))?;
    join_u256(&low, &high).ok_or_else(|| {
        StateError::CustomError(format!("{var_name} of {contract} is not a valid u256"))
    })
}

pub(crate) fn write_u256<S: State + ?Sized>(
    state: &mut S,
    contract: Address,
    var_name: &str,
    keys: &[Felt252],
    value: U256,
) -> Result<(), StateError> {
    let key = compute_storage_key(var_name, keys)?;
    let [low, high] = split_u256(value);
    state.set_storage_at(&(contract, felt_to_hash(&key)), low);
    state.set_storage_at(&(contract, felt_to_hash(&(key + Felt252::ONE))), high);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        state::{cached_state::CachedState, in_memory_state_reader::InMemoryStateReader},
        utils::ClassHash,
    };

    #[test]
    fn u256_uses_two_consecutive_slots() {
        let contract = Address(3u64.into());
        let mut state_reader = InMemoryStateReader::default();
        state_reader
            .address_to_class_hash_mut()
            .insert(contract, ClassHash([1; 32]));
        let mut state = CachedState::new(&state_reader);

        let value = (U256::from(2u64) << 128) | U256::from(5u64);
        write_u256(&mut state, contract, "ERC20_balances", &[Felt252::ONE], value).unwrap();

        assert_eq!(
            read_u256(&state, contract, "ERC20_balances", &[Felt252::ONE]).unwrap(),
            value
        );
        assert_eq!(
            read_felt(&state, contract, "ERC20_balances", &[Felt252::ONE]).unwrap(),
            Felt252::from(5u64)
        );
        assert_eq!(
            read_u256(&state, contract, "ERC20_balances", &[Felt252::ZERO]).unwrap(),
            U256::ZERO
        );
    }
}
