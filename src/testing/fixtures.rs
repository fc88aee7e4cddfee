use super::{
    class_hashes, contracts::deploy_contract, registry, Caller, Counter, Declarations,
    HarnessError, KakarotDevnet,
};
use crate::{
    definitions::{
        constants::{EOA_DEPLOYMENT_FEE_MULTIPLIER, OWNER_PRIVATE_KEY, TEST_AMOUNT},
        network_config::NetworkConfig,
    },
    evm::{EvmTransaction, SignedTransaction},
    network::{KakarotNetwork, TransactionReceipt},
    utils::Address,
};
use alloy_primitives::{hex, Address as EvmAddress, Bytes, U256};
use getset::{CopyGetters, Getters};
use k256::ecdsa::SigningKey;
use std::fmt;
use tracing::info;

/// A funded EOA: its key and the Kakarot account proxy it controls.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct Wallet {
    #[getset(get_copy = "pub")]
    address: EvmAddress,
    #[getset(get = "pub")]
    private_key: SigningKey,
    #[getset(get_copy = "pub")]
    starknet_contract: Address,
}

impl Wallet {
    pub fn new(private_key: SigningKey, starknet_contract: Address) -> Self {
        Self {
            address: EvmAddress::from_private_key(&private_key),
            private_key,
            starknet_contract,
        }
    }

    pub fn sign(&self, transaction: EvmTransaction) -> Result<SignedTransaction, HarnessError> {
        Ok(transaction.sign(&self.private_key)?)
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address.to_checksum(None))
    }
}

pub fn generate_random_private_key() -> SigningKey {
    SigningKey::random(&mut rand::thread_rng())
}

/// Fresh EOA holding enough to pay ~10 transactions, plus [TEST_AMOUNT].
pub fn new_account<N: KakarotNetwork>(network: &mut N, max_fee: u128) -> Result<Wallet, HarnessError> {
    funded_wallet(network, generate_random_private_key(), max_fee)
}

/// The deterministic EOA of the Kakarot deployer side.
pub fn owner<N: KakarotNetwork>(network: &mut N, max_fee: u128) -> Result<Wallet, HarnessError> {
    funded_wallet(network, decode_private_key(OWNER_PRIVATE_KEY)?, max_fee)
}

fn funded_wallet<N: KakarotNetwork>(
    network: &mut N,
    private_key: SigningKey,
    max_fee: u128,
) -> Result<Wallet, HarnessError> {
    let starknet_contract =
        network.get_eoa(&private_key, EOA_DEPLOYMENT_FEE_MULTIPLIER * max_fee)?;
    network.fund_address(starknet_contract, TEST_AMOUNT)?;
    let wallet = Wallet::new(private_key, starknet_contract);
    info!(evm_address = %wallet, starknet_address = %starknet_contract, "account ready");
    Ok(wallet)
}

fn decode_private_key(key: &str) -> Result<SigningKey, HarnessError> {
    let bytes = hex::decode_to_array::<_, 32>(key)
        .map_err(|err| HarnessError::InvalidPrivateKey(err.to_string()))?;
    SigningKey::from_slice(&bytes)
        .map_err(|err| HarnessError::InvalidPrivateKey(err.to_string()))
}

/// Signs and sends an EVM transaction from `wallet` at its current nonce.
///
/// The receipt is returned whatever the execution status.
pub fn send_transaction<N: KakarotNetwork>(
    network: &mut N,
    wallet: &Wallet,
    to: Option<EvmAddress>,
    value: U256,
    data: Bytes,
) -> Result<TransactionReceipt, HarnessError> {
    let transaction = EvmTransaction {
        chain_id: network.chain_id(),
        nonce: network.get_transaction_count(&wallet.address())?,
        to,
        value,
        data,
        max_fee: network.default_max_fee(),
    };
    let signed = wallet.sign(transaction)?;
    Ok(network.send_raw_transaction(wallet.starknet_contract(), signed)?)
}

/// Fails with [HarnessError::TransactionReverted] unless the transaction succeeded.
pub fn require_success(receipt: TransactionReceipt) -> Result<TransactionReceipt, HarnessError> {
    match receipt.revert_reason() {
        None => Ok(receipt),
        Some(reason) => Err(HarnessError::TransactionReverted {
            transaction_hash: receipt.transaction_hash,
            reason: reason.to_string(),
        }),
    }
}

/// A network with its fixtures.
///
/// `new_account`, `owner` and `caller` are created on first use and shared by
/// every test using the context. `counter` deploys a new contract on each call.
#[derive(Debug)]
pub struct TestContext {
    network: KakarotDevnet,
    declarations: Declarations,
    max_fee: u128,
    new_account: Option<Wallet>,
    owner: Option<Wallet>,
    caller: Option<Caller>,
}

impl TestContext {
    /// Devnet built from the environment configuration and the session declarations.
    pub fn new() -> Result<Self, HarnessError> {
        let config = NetworkConfig::from_env()?;
        Self::with_config(config, class_hashes()?.clone())
    }

    pub fn with_config(config: NetworkConfig, declarations: Declarations) -> Result<Self, HarnessError> {
        let max_fee = config.max_fee();
        let network = KakarotDevnet::new(config, &declarations)?;
        Ok(Self {
            network,
            declarations,
            max_fee,
            new_account: None,
            owner: None,
            caller: None,
        })
    }

    pub fn network(&self) -> &KakarotDevnet {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut KakarotDevnet {
        &mut self.network
    }

    pub fn class_hashes(&self) -> &Declarations {
        &self.declarations
    }

    pub fn max_fee(&self) -> u128 {
        self.max_fee
    }

    pub fn new_account(&mut self) -> Result<Wallet, HarnessError> {
        if let Some(wallet) = &self.new_account {
            return Ok(wallet.clone());
        }
        let wallet = new_account(&mut self.network, self.max_fee)?;
        self.new_account = Some(wallet.clone());
        Ok(wallet)
    }

    pub fn owner(&mut self) -> Result<Wallet, HarnessError> {
        if let Some(wallet) = &self.owner {
            return Ok(wallet.clone());
        }
        let wallet = owner(&mut self.network, self.max_fee)?;
        self.owner = Some(wallet.clone());
        Ok(wallet)
    }

    /// `PlainOpcodes/Caller`, deployed by the owner.
    pub fn caller(&mut self) -> Result<Caller, HarnessError> {
        if let Some(caller) = &self.caller {
            return Ok(caller.clone());
        }
        let owner = self.owner()?;
        let caller = Caller::from(deploy_contract(
            &mut self.network,
            "PlainOpcodes",
            "Caller",
            &owner,
        )?);
        self.caller = Some(caller.clone());
        Ok(caller)
    }

    /// A new `PlainOpcodes/Counter`, deployed by `new_account`.
    pub fn counter(&mut self) -> Result<Counter, HarnessError> {
        let account = self.new_account()?;
        Ok(Counter::from(deploy_contract(
            &mut self.network,
            "PlainOpcodes",
            "Counter",
            &account,
        )?))
    }

    /// Puts the two registry class hashes back on their declared baselines.
    pub fn reset_registry(&mut self) -> Result<(), HarnessError> {
        registry::reset_registry(&mut self.network, &self.declarations)
    }
}
