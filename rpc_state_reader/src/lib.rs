//! Read-only view of a live Kakarot deployment, for comparing it with what the
//! harness expects from the devnet.

pub mod rpc_state;
pub mod rpc_state_errors;

use kakarot_e2e::{
    core::errors::state_errors::StateError,
    definitions::constants::{
        ACCOUNT_CAIRO1_HELPERS_CLASS_HASH, ACCOUNT_EVM_ADDRESS, ACCOUNT_IMPLEMENTATION,
        ACCOUNT_NONCE, KAKAROT_ACCOUNT_CONTRACT_CLASS_HASH, KAKAROT_CAIRO1_HELPERS_CLASS_HASH,
        KAKAROT_UNINITIALIZED_ACCOUNT_CLASS_HASH, OWNABLE_OWNER,
    },
    state::state_api::StateReader,
    utils::{compute_storage_key, felt_to_hash, Address, ClassHash},
    Felt252,
};

/// Class hashes Kakarot currently hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySnapshot {
    pub owner: Address,
    pub account_contract_class_hash: ClassHash,
    pub cairo1_helpers_class_hash: ClassHash,
    pub uninitialized_account_class_hash: ClassHash,
}

/// What an account proxy currently runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub class_hash: ClassHash,
    pub implementation: ClassHash,
    pub cairo1_helpers_class_hash: ClassHash,
    pub evm_address: Felt252,
    pub nonce: Felt252,
}

impl AccountSnapshot {
    /// Whether the account already runs the classes of `registry`.
    pub fn is_up_to_date(&self, registry: &RegistrySnapshot) -> bool {
        self.class_hash == registry.account_contract_class_hash
            && self.cairo1_helpers_class_hash == registry.cairo1_helpers_class_hash
    }
}

fn read_var<S: StateReader + ?Sized>(
    state: &S,
    contract: Address,
    var_name: &str,
) -> Result<Felt252, StateError> {
    let key = compute_storage_key(var_name, &[])?;
    state.get_storage_at(&(contract, felt_to_hash(&key)))
}

pub fn registry_snapshot<S: StateReader + ?Sized>(
    state: &S,
    kakarot: Address,
) -> Result<RegistrySnapshot, StateError> {
    Ok(RegistrySnapshot {
        owner: Address(read_var(state, kakarot, OWNABLE_OWNER)?),
        account_contract_class_hash: read_var(state, kakarot, KAKAROT_ACCOUNT_CONTRACT_CLASS_HASH)?
            .into(),
        cairo1_helpers_class_hash: read_var(state, kakarot, KAKAROT_CAIRO1_HELPERS_CLASS_HASH)?
            .into(),
        uninitialized_account_class_hash: read_var(
            state,
            kakarot,
            KAKAROT_UNINITIALIZED_ACCOUNT_CLASS_HASH,
        )?
        .into(),
    })
}

pub fn account_snapshot<S: StateReader + ?Sized>(
    state: &S,
    account: Address,
) -> Result<AccountSnapshot, StateError> {
    Ok(AccountSnapshot {
        class_hash: state.get_class_hash_at(&account)?,
        implementation: read_var(state, account, ACCOUNT_IMPLEMENTATION)?.into(),
        cairo1_helpers_class_hash: read_var(state, account, ACCOUNT_CAIRO1_HELPERS_CLASS_HASH)?
            .into(),
        evm_address: read_var(state, account, ACCOUNT_EVM_ADDRESS)?,
        nonce: read_var(state, account, ACCOUNT_NONCE)?,
    })
}
