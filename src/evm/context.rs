use super::{ProgramRegistry, MAX_CALL_DEPTH};
use crate::{
    core::errors::{evm_errors::EvmError, kakarot_errors::KakarotError},
    kakarot::{AccountContract, KakarotCore},
    state::state_api::TransactionalState,
    utils::Address,
};
use alloy_primitives::{keccak256, Address as EvmAddress, U256};
use tracing::debug;

/// What stays the same across the frames of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    pub kakarot: KakarotCore,
    pub origin: EvmAddress,
    /// Move every contract account the execution touches to the registry classes.
    /// Off for `eth_call`.
    pub upgrade_on_touch: bool,
}

/// One call frame.
pub struct EvmContext<'a, 's> {
    state: &'a mut (dyn TransactionalState + 's),
    programs: &'a ProgramRegistry,
    env: Environment,
    caller: EvmAddress,
    address: EvmAddress,
    value: U256,
    depth: usize,
}

impl<'a, 's> EvmContext<'a, 's> {
    /// Top level frame, running as the transaction origin.
    pub fn new(
        state: &'a mut (dyn TransactionalState + 's),
        programs: &'a ProgramRegistry,
        env: Environment,
    ) -> Self {
        Self {
            state,
            programs,
            env,
            caller: env.origin,
            address: env.origin,
            value: U256::ZERO,
            depth: 0,
        }
    }

    pub fn origin(&self) -> EvmAddress {
        self.env.origin
    }

    /// `msg.sender`
    pub fn caller(&self) -> EvmAddress {
        self.caller
    }

    /// Address of the contract being executed.
    pub fn address(&self) -> EvmAddress {
        self.address
    }

    /// `msg.value`
    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn sload(&self, key: U256) -> Result<U256, EvmError> {
        let account = self.current_account()?;
        Ok(account.storage(&*self.state, key)?)
    }

    pub fn sstore(&mut self, key: U256, value: U256) -> Result<(), EvmError> {
        let account = self.current_account()?;
        Ok(account.set_storage(&mut *self.state, key, value)?)
    }

    /// Message call from the current contract. A reverted call leaves no writes behind.
    pub fn call(
        &mut self,
        target: EvmAddress,
        value: U256,
        input: &[u8],
    ) -> Result<Vec<u8>, EvmError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EvmError::CallDepthExceeded(MAX_CALL_DEPTH));
        }
        let checkpoint = self.state.checkpoint();
        let result = self.call_inner(target, value, input);
        if matches!(&result, Err(err) if err.is_revert()) {
            self.state.rollback(checkpoint);
        }
        result
    }

    /// Deploys the program whose artifact id is `init_code`, as the current contract.
    pub fn create(&mut self, init_code: &[u8], value: U256) -> Result<EvmAddress, EvmError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EvmError::CallDepthExceeded(MAX_CALL_DEPTH));
        }
        let checkpoint = self.state.checkpoint();
        let result = self.create_inner(init_code, value);
        if matches!(&result, Err(err) if err.is_revert()) {
            self.state.rollback(checkpoint);
        }
        result
    }

    fn call_inner(
        &mut self,
        target: EvmAddress,
        value: U256,
        input: &[u8],
    ) -> Result<Vec<u8>, EvmError> {
        let kakarot = self.env.kakarot;

        let Some(target_address) = kakarot.registered_starknet_address(&*self.state, &target)?
        else {
            // No account yet, the value is credited to its future address.
            let future_address = kakarot.compute_starknet_address(&*self.state, &target)?;
            self.transfer(future_address, value)?;
            return Ok(Vec::new());
        };

        let account = AccountContract::new(target_address);
        self.transfer(target_address, value)?;
        if !account.is_contract(&*self.state)? {
            return Ok(Vec::new());
        }
        self.touch(&account)?;

        let code_hash = account.code_hash(&*self.state)?;
        let program = self
            .programs
            .get(&code_hash)
            .cloned()
            .ok_or(EvmError::MissingProgram {
                address: target,
                code_hash,
            })?;

        debug!(caller = %self.address, target = %target, depth = self.depth + 1, "call");
        let mut frame = EvmContext {
            state: &mut *self.state,
            programs: self.programs,
            env: self.env,
            caller: self.address,
            address: target,
            value,
            depth: self.depth + 1,
        };
        program.execute(&mut frame, input)
    }

    fn create_inner(&mut self, init_code: &[u8], value: U256) -> Result<EvmAddress, EvmError> {
        let deployer = self.current_account()?;
        self.touch(&deployer)?;

        let code_hash = keccak256(init_code);
        if self.programs.get(&code_hash).is_none() {
            return Err(EvmError::UnknownArtifact(
                String::from_utf8_lossy(init_code).into_owned(),
            ));
        }

        let nonce = deployer.nonce(&*self.state)?;
        let address = self.address.create(nonce);
        // The transaction pipeline bumps the nonce of EOAs.
        if deployer.is_contract(&*self.state)? {
            deployer.increment_nonce(&mut *self.state)?;
        }

        let starknet_address =
            self.env
                .kakarot
                .deploy_contract_account(&mut *self.state, address, code_hash)?;
        self.transfer(starknet_address, value)?;
        debug!(deployer = %self.address, %address, "create");
        Ok(address)
    }

    /// Runs the lazy upgrade of an account reached by the execution.
    fn touch(&mut self, account: &AccountContract) -> Result<(), EvmError> {
        if !self.env.upgrade_on_touch {
            return Ok(());
        }
        let upgrade = account.upgrade_if_outdated(&mut *self.state, &self.env.kakarot)?;
        if !upgrade.is_noop() {
            debug!(account = %account.address(), ?upgrade, "touched account upgraded");
        }
        Ok(())
    }

    /// Moves `value` from the current contract to `to`.
    fn transfer(&mut self, to: Address, value: U256) -> Result<(), EvmError> {
        if value.is_zero() {
            return Ok(());
        }
        let from = self.current_account()?.address();
        let token = self.env.kakarot.native_token(&*self.state)?;
        match token.transfer(&mut *self.state, from, to, value) {
            Err(KakarotError::InsufficientBalance { .. }) => {
                Err(EvmError::Revert("insufficient balance for transfer".to_string()))
            }
            result => Ok(result?),
        }
    }

    fn current_account(&self) -> Result<AccountContract, EvmError> {
        self.env
            .kakarot
            .registered_starknet_address(&*self.state, &self.address)?
            .map(AccountContract::new)
            .ok_or(EvmError::Kakarot(KakarotError::UnknownEvmAddress(
                self.address,
            )))
    }
}
