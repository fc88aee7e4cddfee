//! Handles on the EVM contracts the harness deploys.

use super::{
    fixtures::{require_success, send_transaction},
    HarnessError, Wallet,
};
use crate::{
    evm::{
        abi::{ICaller, ICounter},
        artifact_id,
    },
    network::{KakarotNetwork, TransactionReceipt},
    utils::Address,
};
use alloy_primitives::{Address as EvmAddress, Bytes, U256};
use alloy_sol_types::SolCall;
use getset::{CopyGetters, Getters};
use std::ops::Deref;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct DeployedContract {
    #[getset(get_copy = "pub")]
    address: EvmAddress,
    /// Kakarot account contract backing the EVM contract.
    #[getset(get_copy = "pub")]
    starknet_address: Address,
    #[getset(get = "pub")]
    group: String,
    #[getset(get = "pub")]
    name: String,
}

/// Deploys the `group/name` artifact from `caller_eoa`.
pub fn deploy_contract<N: KakarotNetwork>(
    network: &mut N,
    group: &str,
    name: &str,
    caller_eoa: &Wallet,
) -> Result<DeployedContract, HarnessError> {
    let init_code = Bytes::from(artifact_id(group, name).into_bytes());
    let receipt = require_success(send_transaction(
        network,
        caller_eoa,
        None,
        U256::ZERO,
        init_code,
    )?)?;

    let address = receipt
        .contract_address
        .ok_or(HarnessError::MissingDeployment(receipt.transaction_hash))?;
    let starknet_address = super::get_starknet_address(network, &address)?;
    info!(%address, %starknet_address, group, name, "contract deployed");

    Ok(DeployedContract {
        address,
        starknet_address,
        group: group.to_string(),
        name: name.to_string(),
    })
}

/// `PlainOpcodes/Counter`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter(DeployedContract);

impl From<DeployedContract> for Counter {
    fn from(contract: DeployedContract) -> Self {
        Self(contract)
    }
}

impl Deref for Counter {
    type Target = DeployedContract;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Counter {
    pub fn count<N: KakarotNetwork>(&self, network: &N) -> Result<U256, HarnessError> {
        let output = network.eth_call(None, self.address(), &ICounter::countCall {}.abi_encode())?;
        Ok(ICounter::countCall::abi_decode_returns(&output, true)?._0)
    }

    pub fn inc<N: KakarotNetwork>(
        &self,
        network: &mut N,
        caller_eoa: &Wallet,
    ) -> Result<TransactionReceipt, HarnessError> {
        self.send(network, caller_eoa, ICounter::incCall {}.abi_encode())
    }

    /// Reverts on chain when the count is zero.
    pub fn dec<N: KakarotNetwork>(
        &self,
        network: &mut N,
        caller_eoa: &Wallet,
    ) -> Result<TransactionReceipt, HarnessError> {
        self.send(network, caller_eoa, ICounter::decCall {}.abi_encode())
    }

    pub fn reset<N: KakarotNetwork>(
        &self,
        network: &mut N,
        caller_eoa: &Wallet,
    ) -> Result<TransactionReceipt, HarnessError> {
        self.send(network, caller_eoa, ICounter::resetCall {}.abi_encode())
    }

    /// Sends `data` to the counter. The receipt is returned even if it reverted.
    pub fn send<N: KakarotNetwork>(
        &self,
        network: &mut N,
        caller_eoa: &Wallet,
        data: Vec<u8>,
    ) -> Result<TransactionReceipt, HarnessError> {
        send_transaction(
            network,
            caller_eoa,
            Some(self.address()),
            U256::ZERO,
            Bytes::from(data),
        )
    }
}

/// `PlainOpcodes/Caller`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(DeployedContract);

impl From<DeployedContract> for Caller {
    fn from(contract: DeployedContract) -> Self {
        Self(contract)
    }
}

impl Deref for Caller {
    type Target = DeployedContract;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Caller {
    /// Has the caller contract forward `payload` to `target`.
    pub fn call<N: KakarotNetwork>(
        &self,
        network: &mut N,
        target: EvmAddress,
        payload: Bytes,
        caller_eoa: &Wallet,
    ) -> Result<TransactionReceipt, HarnessError> {
        let data = ICaller::callCall { target, payload }.abi_encode();
        send_transaction(
            network,
            caller_eoa,
            Some(self.address()),
            U256::ZERO,
            Bytes::from(data),
        )
    }

    /// Decodes the `(success, returnData)` pair out of a receipt of [Caller::call].
    pub fn decode_output(receipt: &TransactionReceipt) -> Result<(bool, Bytes), HarnessError> {
        let ICaller::callReturn { _0, _1 } =
            ICaller::callCall::abi_decode_returns(&receipt.output, true)?;
        Ok((_0, _1))
    }
}
