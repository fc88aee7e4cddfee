use super::{read_felt, read_u256, write_felt, write_u256, KakarotCore};
use crate::{
    core::errors::{kakarot_errors::KakarotError, state_errors::StateError},
    definitions::constants::{
        ACCOUNT_CAIRO1_HELPERS_CLASS_HASH, ACCOUNT_CODE_HASH, ACCOUNT_EVM_ADDRESS,
        ACCOUNT_IMPLEMENTATION, ACCOUNT_IS_INITIALIZED, ACCOUNT_NONCE, ACCOUNT_STORAGE,
        OWNABLE_OWNER,
    },
    state::state_api::{State, StateReader},
    utils::{evm_address_to_felt, felt_to_evm_address, felt_to_u64, split_u256, Address, ClassHash},
    Felt252,
};
use alloy_primitives::{Address as EvmAddress, B256, U256};
use tracing::info;

/// Class changes applied by [AccountContract::upgrade_if_outdated].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Upgrade {
    pub class_hash: Option<ClassHash>,
    pub cairo1_helpers_class_hash: Option<ClassHash>,
}

impl Upgrade {
    pub fn is_noop(&self) -> bool {
        self.class_hash.is_none() && self.cairo1_helpers_class_hash.is_none()
    }
}

/// A Kakarot account proxy, either an EOA or a contract account.
///
/// Accounts are deployed with the uninitialized account class, then
/// [initialized](AccountContract::initialize) to the account class the
/// registry points at. Later registry changes only reach the account through
/// [AccountContract::upgrade_if_outdated].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountContract {
    address: Address,
}

impl AccountContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn initialize<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
        kakarot: &KakarotCore,
        evm_address: EvmAddress,
    ) -> Result<(), KakarotError> {
        let class_hash = kakarot.account_contract_class_hash(state)?;
        let cairo1_helpers_class_hash = kakarot.cairo1_helpers_class_hash(state)?;

        state.set_class_hash_at(self.address, class_hash)?;
        self.write(state, OWNABLE_OWNER, kakarot.address().0)?;
        self.write(state, ACCOUNT_EVM_ADDRESS, evm_address_to_felt(&evm_address))?;
        self.write(state, ACCOUNT_IS_INITIALIZED, Felt252::ONE)?;
        self.write(state, ACCOUNT_IMPLEMENTATION, class_hash.to_felt())?;
        self.write(
            state,
            ACCOUNT_CAIRO1_HELPERS_CLASS_HASH,
            cairo1_helpers_class_hash.to_felt(),
        )?;
        Ok(())
    }

    pub fn is_initialized<S: StateReader + ?Sized>(&self, state: &S) -> Result<bool, KakarotError> {
        Ok(self.read(state, ACCOUNT_IS_INITIALIZED)? != Felt252::ZERO)
    }

    pub fn evm_address<S: StateReader + ?Sized>(
        &self,
        state: &S,
    ) -> Result<EvmAddress, KakarotError> {
        let value = self.read(state, ACCOUNT_EVM_ADDRESS)?;
        felt_to_evm_address(&value).ok_or(KakarotError::InvalidEvmAddress(value))
    }

    pub fn implementation<S: StateReader + ?Sized>(
        &self,
        state: &S,
    ) -> Result<ClassHash, KakarotError> {
        Ok(self.read(state, ACCOUNT_IMPLEMENTATION)?.into())
    }

    pub fn cairo1_helpers_class_hash<S: StateReader + ?Sized>(
        &self,
        state: &S,
    ) -> Result<ClassHash, KakarotError> {
        Ok(self.read(state, ACCOUNT_CAIRO1_HELPERS_CLASS_HASH)?.into())
    }

    pub fn nonce<S: StateReader + ?Sized>(&self, state: &S) -> Result<u64, KakarotError> {
        let nonce = self.read(state, ACCOUNT_NONCE)?;
        felt_to_u64(&nonce).ok_or_else(|| {
            StateError::CustomError(format!("nonce of {} overflows u64", self.address)).into()
        })
    }

    pub fn set_nonce<S: State + ?Sized>(&self, state: &mut S, nonce: u64) -> Result<(), KakarotError> {
        self.write(state, ACCOUNT_NONCE, Felt252::from(nonce))
    }

    /// Bumps the EVM nonce together with the Starknet protocol nonce of the proxy.
    pub fn increment_nonce<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
    ) -> Result<u64, KakarotError> {
        let nonce = self.nonce(state)? + 1;
        self.set_nonce(state, nonce)?;
        state.increment_nonce(&self.address)?;
        Ok(nonce)
    }

    /// Zero for EOAs.
    pub fn code_hash<S: StateReader + ?Sized>(&self, state: &S) -> Result<B256, KakarotError> {
        let value = read_u256(state, self.address, ACCOUNT_CODE_HASH, &[])?;
        Ok(B256::from(value.to_be_bytes::<32>()))
    }

    pub fn set_code_hash<S: State + ?Sized>(
        &self,
        state: &mut S,
        code_hash: B256,
    ) -> Result<(), KakarotError> {
        let value = U256::from_be_bytes(code_hash.0);
        Ok(write_u256(state, self.address, ACCOUNT_CODE_HASH, &[], value)?)
    }

    pub fn is_contract<S: StateReader + ?Sized>(&self, state: &S) -> Result<bool, KakarotError> {
        Ok(self.code_hash(state)? != B256::ZERO)
    }

    /// EVM storage slot `key` of the account.
    pub fn storage<S: StateReader + ?Sized>(&self, state: &S, key: U256) -> Result<U256, KakarotError> {
        Ok(read_u256(state, self.address, ACCOUNT_STORAGE, &split_u256(key))?)
    }

    pub fn set_storage<S: State + ?Sized>(
        &self,
        state: &mut S,
        key: U256,
        value: U256,
    ) -> Result<(), KakarotError> {
        Ok(write_u256(
            state,
            self.address,
            ACCOUNT_STORAGE,
            &split_u256(key),
            value,
        )?)
    }

    /// Moves the account to the account class and Cairo1Helpers class currently set in Kakarot.
    ///
    /// Both references are compared and updated independently. Fails when the
    /// registry points at a class that was never declared.
    pub fn upgrade_if_outdated<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
        kakarot: &KakarotCore,
    ) -> Result<Upgrade, KakarotError> {
        let mut upgrade = Upgrade::default();

        let current = state.get_class_hash_at(&self.address)?;
        let latest = kakarot.account_contract_class_hash(state)?;
        if current != latest {
            state.set_class_hash_at(self.address, latest)?;
            self.write(state, ACCOUNT_IMPLEMENTATION, latest.to_felt())?;
            info!(account = %self.address, from = %current, to = %latest, "account class upgraded");
            upgrade.class_hash = Some(latest);
        }

        let current_helpers = self.cairo1_helpers_class_hash(state)?;
        let latest_helpers = kakarot.cairo1_helpers_class_hash(state)?;
        if current_helpers != latest_helpers {
            self.write(
                state,
                ACCOUNT_CAIRO1_HELPERS_CLASS_HASH,
                latest_helpers.to_felt(),
            )?;
            info!(
                account = %self.address,
                from = %current_helpers,
                to = %latest_helpers,
                "cairo1 helpers class upgraded"
            );
            upgrade.cairo1_helpers_class_hash = Some(latest_helpers);
        }

        Ok(upgrade)
    }

    fn read<S: StateReader + ?Sized>(&self, state: &S, var_name: &str) -> Result<Felt252, StateError> {
        read_felt(state, self.address, var_name, &[])
    }

    fn write<S: State + ?Sized>(
        &self,
        state: &mut S,
        var_name: &str,
        value: Felt252,
    ) -> Result<(), KakarotError> {
        Ok(write_felt(state, self.address, var_name, &[], value)?)
    }
}
