use super::Declarations;
use crate::{
    core::errors::{
        kakarot_errors::KakarotError, state_errors::StateError,
        transaction_errors::TransactionError,
    },
    definitions::{
        constants::{
            ACCOUNT_CONTRACT_CLASS, CAIRO1_HELPERS_CLASS, DEFAULT_TX_FEE, DEVNET_DEPLOYER_ADDRESS,
            DEVNET_KAKAROT_ADDRESS, DEFAULT_SEQUENCER_ADDRESS, ERC20_CLASS,
            FEE_TOKEN_ADDRESS, FEE_TOKEN_CONTRACT_NAME, KAKAROT_CLASS, KAKAROT_CONTRACT_NAME,
            OPENZEPPELIN_ACCOUNT_CLASS, TOTAL_SUPPLY, UNINITIALIZED_ACCOUNT_CLASS,
        },
        network_config::NetworkConfig,
    },
    evm::{Environment, EvmContext, ProgramRegistry, SignedTransaction},
    kakarot::{kakarot_core::KakarotClasses, AccountContract, FeeToken, KakarotCore},
    network::{ExecutionStatus, KakarotNetwork, NetworkError, TransactionReceipt},
    state::{
        cached_state::CachedState,
        in_memory_state_reader::InMemoryStateReader,
        state_api::{State, StateReader, TransactionalState},
        state_cache::StorageEntry,
        BlockInfo, StateDiff,
    },
    utils::{evm_address_to_felt, split_u256, starknet_selector, Address, ClassHash},
    Felt252,
};
use alloy_primitives::{Address as EvmAddress, Bytes, U256};
use k256::ecdsa::SigningKey;
use starknet_crypto::poseidon_hash_many;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SystemContract {
    Kakarot(KakarotCore),
    FeeToken(FeeToken),
}

impl SystemContract {
    fn address(&self) -> Address {
        match self {
            SystemContract::Kakarot(kakarot) => kakarot.address(),
            SystemContract::FeeToken(token) => token.address(),
        }
    }
}

/// Result of the EVM part of a transaction.
#[derive(Debug)]
struct ExecutionOutcome {
    status: ExecutionStatus,
    output: Bytes,
    contract_address: Option<EvmAddress>,
    actual_fee: u128,
}

/// In-memory Starknet network running Kakarot.
///
/// Transactions are executed on a [CachedState] over the committed state and
/// applied when they are included, one block per transaction. A transaction
/// that fails validation leaves the committed state untouched.
#[derive(Debug)]
pub struct KakarotDevnet {
    state: InMemoryStateReader,
    block_info: BlockInfo,
    config: NetworkConfig,
    kakarot: KakarotCore,
    deployer: Address,
    programs: ProgramRegistry,
    system_contracts: HashMap<String, SystemContract>,
}

impl KakarotDevnet {
    /// Declares every class of `declarations`, then deploys Kakarot, the fee token
    /// and the deployer account that owns Kakarot and the whole token supply.
    pub fn new(config: NetworkConfig, declarations: &Declarations) -> Result<Self, NetworkError> {
        let class = |role: &str| {
            declarations
                .get(role)
                .map_err(|_| NetworkError::MissingDeclaration(role.to_string()))
        };

        let kakarot = KakarotCore::new(*DEVNET_KAKAROT_ADDRESS);
        let fee_token = FeeToken::new(*FEE_TOKEN_ADDRESS);
        let deployer = *DEVNET_DEPLOYER_ADDRESS;
        let classes = KakarotClasses {
            account_contract: class(ACCOUNT_CONTRACT_CLASS)?,
            cairo1_helpers: class(CAIRO1_HELPERS_CLASS)?,
            uninitialized_account: class(UNINITIALIZED_ACCOUNT_CLASS)?,
        };

        let mut state = InMemoryStateReader::default();
        let genesis = {
            let mut genesis = CachedState::new(&state);
            for (_, class_hash) in declarations.iter() {
                if !genesis.is_class_declared(class_hash)? {
                    genesis.declare_class(*class_hash)?;
                }
            }
            genesis.deploy_contract(fee_token.address(), class(ERC20_CLASS)?)?;
            genesis.deploy_contract(deployer, class(OPENZEPPELIN_ACCOUNT_CLASS)?)?;
            genesis.deploy_contract(kakarot.address(), class(KAKAROT_CLASS)?)?;

            kakarot.initialize(
                &mut genesis,
                deployer,
                fee_token.address(),
                config.chain_id(),
                classes,
            )?;
            fee_token.mint(&mut genesis, deployer, U256::from(TOTAL_SUPPLY))?;
            genesis.into_state_diff()
        };
        state.apply_state_diff(genesis);
        info!(kakarot = %kakarot.address(), chain_id = config.chain_id(), "devnet genesis");

        let system_contracts = HashMap::from([
            (
                KAKAROT_CONTRACT_NAME.to_string(),
                SystemContract::Kakarot(kakarot),
            ),
            (
                FEE_TOKEN_CONTRACT_NAME.to_string(),
                SystemContract::FeeToken(fee_token),
            ),
        ]);

        Ok(Self {
            state,
            block_info: BlockInfo::empty(*DEFAULT_SEQUENCER_ADDRESS),
            config,
            kakarot,
            deployer,
            programs: ProgramRegistry::plain_opcodes(),
            system_contracts,
        })
    }

    pub fn state(&self) -> &InMemoryStateReader {
        &self.state
    }

    pub fn block_info(&self) -> &BlockInfo {
        &self.block_info
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn kakarot(&self) -> KakarotCore {
        self.kakarot
    }

    /// Starknet account owning Kakarot at genesis.
    pub fn deployer(&self) -> Address {
        self.deployer
    }

    pub fn programs_mut(&mut self) -> &mut ProgramRegistry {
        &mut self.programs
    }

    /// Account proxy of `evm_address`, if deployed.
    pub fn account_of(&self, evm_address: &EvmAddress) -> Result<Option<Address>, NetworkError> {
        Ok(self
            .kakarot
            .registered_starknet_address(&self.state, evm_address)?)
    }

    /// Invoke sent by an arbitrary Starknet account.
    #[tracing::instrument(level = "debug", ret, err, skip(self, caller, calldata), fields(caller = %caller))]
    pub fn invoke_as(
        &mut self,
        caller: Address,
        contract_name: &str,
        function_name: &str,
        calldata: &[Felt252],
    ) -> Result<TransactionReceipt, NetworkError> {
        let contract = self.system_contract(contract_name)?;

        let (state_diff, return_data, transaction_hash) = {
            let mut state = CachedState::new(&self.state);
            let nonce = state.get_nonce_at(&caller)?;
            let return_data = match contract {
                SystemContract::Kakarot(kakarot) => {
                    kakarot.execute(&mut state, caller, function_name, calldata)?
                }
                SystemContract::FeeToken(token) => {
                    token.execute(&mut state, caller, function_name, calldata)?
                }
            };
            state.increment_nonce(&caller)?;
            let transaction_hash =
                invoke_transaction_hash(caller, contract.address(), function_name, calldata, nonce)?;
            (state.into_state_diff(), return_data, transaction_hash)
        };

        let block_number = self.commit(state_diff);
        Ok(TransactionReceipt {
            transaction_hash,
            block_number,
            execution_status: ExecutionStatus::Succeeded,
            actual_fee: 0,
            return_data,
            output: Bytes::new(),
            contract_address: None,
        })
    }

    fn system_contract(&self, contract_name: &str) -> Result<SystemContract, NetworkError> {
        self.system_contracts
            .get(contract_name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownContract(contract_name.to_string()))
    }

    fn commit(&mut self, state_diff: StateDiff) -> u64 {
        self.state.apply_state_diff(state_diff);
        self.block_info = self.block_info.next();
        self.block_info.block_number
    }

    /// Validates and runs an EVM transaction, returning the writes to commit.
    fn execute_transaction(
        &self,
        sender: Address,
        transaction: &SignedTransaction,
    ) -> Result<(StateDiff, ExecutionOutcome), TransactionError> {
        let mut state = CachedState::new(&self.state);
        let tx = transaction.transaction();
        let account = AccountContract::new(sender);

        if !account.is_initialized(&state)? {
            return Err(TransactionError::UninitializedAccount(sender));
        }
        if tx.chain_id != self.config.chain_id() {
            return Err(TransactionError::InvalidChainId(
                self.config.chain_id(),
                tx.chain_id,
            ));
        }

        let signer = transaction.recover_signer()?;
        let owner = account.evm_address(&state)?;
        if signer != owner {
            return Err(TransactionError::SignerMismatch {
                account: sender,
                expected: owner,
                recovered: signer,
            });
        }

        let nonce = account.nonce(&state)?;
        if tx.nonce != nonce {
            return Err(TransactionError::InvalidTransactionNonce(nonce, tx.nonce));
        }

        let fee_token = self.kakarot.native_token(&state)?;
        let balance = fee_token.balance_of(&state, sender)?;
        if balance < U256::from(tx.max_fee).saturating_add(tx.value) {
            return Err(TransactionError::InsufficientBalance {
                max_fee: tx.max_fee,
                value: tx.value,
                balance,
            });
        }

        // Persists even if the execution reverts.
        account.upgrade_if_outdated(&mut state, &self.kakarot)?;
        let checkpoint = state.checkpoint();

        let env = Environment {
            kakarot: self.kakarot,
            origin: signer,
            upgrade_on_touch: true,
        };
        let result = {
            let mut ctx = EvmContext::new(&mut state, &self.programs, env);
            match tx.to {
                Some(to) => ctx
                    .call(to, tx.value, &tx.data)
                    .map(|output| (Bytes::from(output), None)),
                None => ctx
                    .create(&tx.data, tx.value)
                    .map(|address| (Bytes::new(), Some(address))),
            }
        };

        let (status, output, contract_address) = match result {
            Ok((output, contract_address)) => (ExecutionStatus::Succeeded, output, contract_address),
            Err(err) if err.is_revert() => {
                state.rollback(checkpoint);
                debug!(reason = %err, "transaction reverted");
                (ExecutionStatus::Reverted(err.revert_reason()), Bytes::new(), None)
            }
            Err(err) => return Err(err.into()),
        };

        account.increment_nonce(&mut state)?;
        let actual_fee = DEFAULT_TX_FEE.min(tx.max_fee);
        fee_token.transfer(
            &mut state,
            sender,
            self.block_info.sequencer_address,
            U256::from(actual_fee),
        )?;

        Ok((
            state.into_state_diff(),
            ExecutionOutcome {
                status,
                output,
                contract_address,
                actual_fee,
            },
        ))
    }
}

impl StateReader for KakarotDevnet {
    fn get_class_hash_at(&self, contract_address: &Address) -> Result<ClassHash, StateError> {
        self.state.get_class_hash_at(contract_address)
    }

    fn get_nonce_at(&self, contract_address: &Address) -> Result<Felt252, StateError> {
        self.state.get_nonce_at(contract_address)
    }

    fn get_storage_at(&self, storage_entry: &StorageEntry) -> Result<Felt252, StateError> {
        self.state.get_storage_at(storage_entry)
    }

    fn is_class_declared(&self, class_hash: &ClassHash) -> Result<bool, StateError> {
        self.state.is_class_declared(class_hash)
    }
}

impl KakarotNetwork for KakarotDevnet {
    fn chain_id(&self) -> u64 {
        self.config.chain_id()
    }

    fn default_max_fee(&self) -> u128 {
        self.config.max_fee()
    }

    fn invoke(
        &mut self,
        contract_name: &str,
        function_name: &str,
        calldata: &[Felt252],
    ) -> Result<TransactionReceipt, NetworkError> {
        let owner = self.kakarot.owner(&self.state)?;
        self.invoke_as(owner, contract_name, function_name, calldata)
    }

    fn call(
        &self,
        contract_name: &str,
        function_name: &str,
        calldata: &[Felt252],
    ) -> Result<Vec<Felt252>, NetworkError> {
        let return_data = match self.system_contract(contract_name)? {
            SystemContract::Kakarot(kakarot) => kakarot.view(&self.state, function_name, calldata)?,
            SystemContract::FeeToken(token) => token.view(&self.state, function_name, calldata)?,
        };
        Ok(return_data)
    }

    fn get_eoa(&mut self, private_key: &SigningKey, amount: u128) -> Result<Address, NetworkError> {
        let evm_address = EvmAddress::from_private_key(private_key);
        let address = match self.account_of(&evm_address)? {
            Some(address) => address,
            None => {
                self.invoke_as(
                    self.deployer,
                    KAKAROT_CONTRACT_NAME,
                    "deploy_externally_owned_account",
                    &[evm_address_to_felt(&evm_address)],
                )?;
                self.account_of(&evm_address)?
                    .ok_or(KakarotError::UnknownEvmAddress(evm_address))?
            }
        };
        self.fund_address(address, amount)?;
        Ok(address)
    }

    fn fund_address(&mut self, address: Address, amount: u128) -> Result<(), NetworkError> {
        let [low, high] = split_u256(U256::from(amount));
        self.invoke_as(
            self.deployer,
            FEE_TOKEN_CONTRACT_NAME,
            "transfer",
            &[address.0, low, high],
        )?;
        debug!(%address, amount, "address funded");
        Ok(())
    }

    fn get_transaction_count(&self, address: &EvmAddress) -> Result<u64, NetworkError> {
        match self.account_of(address)? {
            Some(account) => Ok(AccountContract::new(account).nonce(&self.state)?),
            None => Ok(0),
        }
    }

    #[tracing::instrument(
        level = "debug",
        ret,
        err,
        skip(self, sender, transaction),
        fields(sender = %sender, nonce = transaction.transaction().nonce)
    )]
    fn send_raw_transaction(
        &mut self,
        sender: Address,
        transaction: SignedTransaction,
    ) -> Result<TransactionReceipt, NetworkError> {
        let (state_diff, outcome) = self.execute_transaction(sender, &transaction)?;
        let block_number = self.commit(state_diff);

        let hash = U256::from_be_bytes(transaction.hash().0);
        let [low, high] = split_u256(hash);
        Ok(TransactionReceipt {
            transaction_hash: poseidon_hash_many(&[sender.0, low, high]),
            block_number,
            execution_status: outcome.status,
            actual_fee: outcome.actual_fee,
            return_data: Vec::new(),
            output: outcome.output,
            contract_address: outcome.contract_address,
        })
    }

    fn eth_call(
        &self,
        from: Option<EvmAddress>,
        to: EvmAddress,
        data: &[u8],
    ) -> Result<Bytes, NetworkError> {
        let mut state = CachedState::new(&self.state);
        let env = Environment {
            kakarot: self.kakarot,
            origin: from.unwrap_or_default(),
            upgrade_on_touch: false,
        };
        let mut ctx = EvmContext::new(&mut state, &self.programs, env);
        Ok(Bytes::from(ctx.call(to, U256::ZERO, data)?))
    }
}

fn invoke_transaction_hash(
    caller: Address,
    contract: Address,
    function_name: &str,
    calldata: &[Felt252],
    nonce: Felt252,
) -> Result<Felt252, NetworkError> {
    let selector = starknet_selector(function_name)
        .map_err(|_| KakarotError::EntryPointNotFound(function_name.to_string()))?;
    Ok(poseidon_hash_many(&[
        caller.0,
        contract.0,
        selector,
        nonce,
        poseidon_hash_many(calldata),
    ]))
}
