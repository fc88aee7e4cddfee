use super::{
    fee_token::expect_calldata, read_felt, write_felt, AccountContract, FeeToken,
};
use crate::{
    core::errors::kakarot_errors::KakarotError,
    definitions::constants::{
        KAKAROT_ACCOUNT_CONTRACT_CLASS_HASH, KAKAROT_CAIRO1_HELPERS_CLASS_HASH, KAKAROT_CHAIN_ID,
        KAKAROT_EVM_TO_STARKNET_ADDRESS, KAKAROT_NATIVE_TOKEN_ADDRESS,
        KAKAROT_UNINITIALIZED_ACCOUNT_CLASS_HASH, OWNABLE_OWNER,
    },
    state::state_api::{State, StateReader},
    utils::{
        compute_starknet_address, evm_address_to_felt, felt_to_evm_address, Address, ClassHash,
    },
    Felt252,
};
use alloy_primitives::{Address as EvmAddress, B256};
use tracing::info;

/// Class hashes Kakarot is deployed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KakarotClasses {
    pub account_contract: ClassHash,
    pub cairo1_helpers: ClassHash,
    pub uninitialized_account: ClassHash,
}

/// The Kakarot registry.
///
/// Holds the class hashes accounts resolve to, the evm to starknet address
/// registry and deploys the account proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KakarotCore {
    address: Address,
}

impl KakarotCore {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Constructor of the registry.
    pub fn initialize<S: State + ?Sized>(
        &self,
        state: &mut S,
        owner: Address,
        native_token: Address,
        chain_id: u64,
        classes: KakarotClasses,
    ) -> Result<(), KakarotError> {
        self.write(state, OWNABLE_OWNER, owner.0)?;
        self.write(state, KAKAROT_NATIVE_TOKEN_ADDRESS, native_token.0)?;
        self.write(state, KAKAROT_CHAIN_ID, Felt252::from(chain_id))?;
        self.write(
            state,
            KAKAROT_ACCOUNT_CONTRACT_CLASS_HASH,
            classes.account_contract.to_felt(),
        )?;
        self.write(
            state,
            KAKAROT_CAIRO1_HELPERS_CLASS_HASH,
            classes.cairo1_helpers.to_felt(),
        )?;
        self.write(
            state,
            KAKAROT_UNINITIALIZED_ACCOUNT_CLASS_HASH,
            classes.uninitialized_account.to_felt(),
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn owner<S: StateReader + ?Sized>(&self, state: &S) -> Result<Address, KakarotError> {
        Ok(Address(self.read(state, OWNABLE_OWNER)?))
    }

    pub fn account_contract_class_hash<S: StateReader + ?Sized>(
        &self,
        state: &S,
    ) -> Result<ClassHash, KakarotError> {
        Ok(self.read(state, KAKAROT_ACCOUNT_CONTRACT_CLASS_HASH)?.into())
    }

    pub fn cairo1_helpers_class_hash<S: StateReader + ?Sized>(
        &self,
        state: &S,
    ) -> Result<ClassHash, KakarotError> {
        Ok(self.read(state, KAKAROT_CAIRO1_HELPERS_CLASS_HASH)?.into())
    }

    pub fn uninitialized_account_class_hash<S: StateReader + ?Sized>(
        &self,
        state: &S,
    ) -> Result<ClassHash, KakarotError> {
        Ok(self.read(state, KAKAROT_UNINITIALIZED_ACCOUNT_CLASS_HASH)?.into())
    }

    pub fn native_token<S: StateReader + ?Sized>(&self, state: &S) -> Result<FeeToken, KakarotError> {
        Ok(FeeToken::new(Address(
            self.read(state, KAKAROT_NATIVE_TOKEN_ADDRESS)?,
        )))
    }

    /// Address the account of `evm_address` is, or would be, deployed at.
    pub fn compute_starknet_address<S: StateReader + ?Sized>(
        &self,
        state: &S,
        evm_address: &EvmAddress,
    ) -> Result<Address, KakarotError> {
        let uninitialized_account = self.uninitialized_account_class_hash(state)?;
        Ok(Address(compute_starknet_address(
            &evm_address_to_felt(evm_address),
            &self.address.0,
            &uninitialized_account.to_felt(),
        )))
    }

    /// Address of the deployed account of `evm_address`, if any.
    pub fn registered_starknet_address<S: StateReader + ?Sized>(
        &self,
        state: &S,
        evm_address: &EvmAddress,
    ) -> Result<Option<Address>, KakarotError> {
        let value = read_felt(
            state,
            self.address,
            KAKAROT_EVM_TO_STARKNET_ADDRESS,
            &[evm_address_to_felt(evm_address)],
        )?;
        Ok((value != Felt252::ZERO).then_some(Address(value)))
    }

    // ------------------------------------------------------------------
    // Account deployment
    // ------------------------------------------------------------------

    pub fn deploy_externally_owned_account<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
        evm_address: EvmAddress,
    ) -> Result<Address, KakarotError> {
        let address = self.deploy_account(state, evm_address)?;
        info!(evm_address = %evm_address, starknet_address = %address, "EOA deployed");
        Ok(address)
    }

    /// Deploys the account of a contract created by the EVM. Contract accounts start at nonce 1.
    pub fn deploy_contract_account<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
        evm_address: EvmAddress,
        code_hash: B256,
    ) -> Result<Address, KakarotError> {
        let address = self.deploy_account(state, evm_address)?;
        let account = AccountContract::new(address);
        account.set_code_hash(state, code_hash)?;
        account.set_nonce(state, 1)?;
        info!(evm_address = %evm_address, starknet_address = %address, "contract account deployed");
        Ok(address)
    }

    fn deploy_account<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
        evm_address: EvmAddress,
    ) -> Result<Address, KakarotError> {
        if let Some(existing) = self.registered_starknet_address(state, &evm_address)? {
            return Err(KakarotError::AccountAlreadyDeployed(existing, evm_address));
        }

        let uninitialized_account = self.uninitialized_account_class_hash(state)?;
        let address = self.compute_starknet_address(state, &evm_address)?;
        state.deploy_contract(address, uninitialized_account)?;
        AccountContract::new(address).initialize(state, self, evm_address)?;
        write_felt(
            state,
            self.address,
            KAKAROT_EVM_TO_STARKNET_ADDRESS,
            &[evm_address_to_felt(&evm_address)],
            address.0,
        )?;
        Ok(address)
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// External entry points, as reached by an `invoke` on Kakarot.
    ///
    /// The class hash setters only write the registry: deployed accounts keep
    /// their class until a transaction touches them.
    pub fn execute<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
        caller: Address,
        entry_point: &str,
        calldata: &[Felt252],
    ) -> Result<Vec<Felt252>, KakarotError> {
        let setter = match entry_point {
            "set_account_contract_class_hash" => KAKAROT_ACCOUNT_CONTRACT_CLASS_HASH,
            "set_cairo1_helpers_class_hash" => KAKAROT_CAIRO1_HELPERS_CLASS_HASH,
            "set_uninitialized_account_class_hash" => KAKAROT_UNINITIALIZED_ACCOUNT_CLASS_HASH,
            "transfer_ownership" => {
                self.assert_only_owner(state, caller)?;
                let [new_owner] = expect_calldata(entry_point, calldata)?;
                self.write(state, OWNABLE_OWNER, new_owner)?;
                info!(previous_owner = %caller, new_owner = %Address(new_owner), "kakarot ownership transferred");
                return Ok(Vec::new());
            }
            "deploy_externally_owned_account" => {
                let [evm_address] = expect_calldata(entry_point, calldata)?;
                let evm_address = parse_evm_address(evm_address)?;
                let address = self.deploy_externally_owned_account(state, evm_address)?;
                return Ok(vec![address.0]);
            }
            _ => return self.view(state, entry_point, calldata),
        };

        self.assert_only_owner(state, caller)?;
        let [class_hash] = expect_calldata(entry_point, calldata)?;
        self.write(state, setter, class_hash)?;
        info!(var = setter, class_hash = %ClassHash::from(class_hash), "kakarot registry updated");
        Ok(Vec::new())
    }

    pub fn view<S: StateReader + ?Sized>(
        &self,
        state: &S,
        entry_point: &str,
        calldata: &[Felt252],
    ) -> Result<Vec<Felt252>, KakarotError> {
        let value = match entry_point {
            "get_starknet_address" => {
                let [evm_address] = expect_calldata(entry_point, calldata)?;
                let evm_address = parse_evm_address(evm_address)?;
                return Ok(vec![self.compute_starknet_address(state, &evm_address)?.0]);
            }
            "get_account_contract_class_hash" => self.account_contract_class_hash(state)?.to_felt(),
            "get_cairo1_helpers_class_hash" => self.cairo1_helpers_class_hash(state)?.to_felt(),
            "get_uninitialized_account_class_hash" => {
                self.uninitialized_account_class_hash(state)?.to_felt()
            }
            "get_native_token" => self.native_token(state)?.address().0,
            "owner" => self.owner(state)?.0,
            _ => return Err(KakarotError::EntryPointNotFound(entry_point.to_string())),
        };
        expect_calldata::<0>(entry_point, calldata)?;
        Ok(vec![value])
    }

    fn assert_only_owner<S: StateReader + ?Sized>(
        &self,
        state: &S,
        caller: Address,
    ) -> Result<(), KakarotError> {
        if self.owner(state)? != caller {
            return Err(KakarotError::CallerIsNotOwner);
        }
        Ok(())
    }

    fn read<S: StateReader + ?Sized>(
        &self,
        state: &S,
        var_name: &str,
    ) -> Result<Felt252, KakarotError> {
        Ok(read_felt(state, self.address, var_name, &[])?)
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

fn parse_evm_address(value: Felt252) -> Result<EvmAddress, KakarotError> {
    felt_to_evm_address(&value).ok_or(KakarotError::InvalidEvmAddress(value))
}
