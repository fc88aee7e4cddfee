//! Before/after checks around a transaction.
//!
//! Failed checks panic, like any other test assertion.

use super::{contracts::Caller, fixtures::require_success, Counter, HarnessError, Wallet};
use crate::{
    kakarot::read_felt,
    network::{KakarotNetwork, TransactionReceipt},
    state::state_api::StateReader,
    utils::{evm_selector, Address},
    Felt252,
};
use alloy_primitives::{Bytes, U256};
use tracing::debug;

/// Sends `inc()` to `counter` and checks it went up by exactly one.
pub fn assert_counter_transaction_success<N: KakarotNetwork>(
    network: &mut N,
    counter: &Counter,
    caller_eoa: &Wallet,
) -> Result<TransactionReceipt, HarnessError> {
    let before = counter.count(network)?;
    let receipt = require_success(counter.inc(network, caller_eoa)?)?;
    let after = counter.count(network)?;
    assert_eq!(
        after,
        before + U256::from(1),
        "counter {} did not increase by one",
        counter.address()
    );
    Ok(receipt)
}

/// Has `caller` forward `inc()` to `counter` and checks the counter went up by exactly one.
pub fn assert_caller_contract_increases_counter<N: KakarotNetwork>(
    network: &mut N,
    caller: &Caller,
    counter: &Counter,
    caller_eoa: &Wallet,
) -> Result<TransactionReceipt, HarnessError> {
    let before = counter.count(network)?;
    let payload = Bytes::from(evm_selector("inc()").to_vec());
    let receipt = require_success(caller.call(network, counter.address(), payload, caller_eoa)?)?;

    let (success, _) = Caller::decode_output(&receipt)?;
    assert!(success, "forwarded inc() to {} failed", counter.address());
    let after = counter.count(network)?;
    assert_eq!(
        after,
        before + U256::from(1),
        "counter {} did not increase by one through {}",
        counter.address(),
        caller.address()
    );
    Ok(receipt)
}

/// What an upgrade is observed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeTarget {
    /// Class hash of a deployed contract.
    ClassHash(Address),
    /// A storage variable without keys, e.g. `Account_cairo1_helpers_class_hash`.
    StorageVar {
        address: Address,
        var_name: &'static str,
    },
}

impl UpgradeTarget {
    pub fn read<R: StateReader + ?Sized>(&self, reader: &R) -> Result<Felt252, HarnessError> {
        match self {
            UpgradeTarget::ClassHash(address) => Ok(reader.get_class_hash_at(address)?.to_felt()),
            UpgradeTarget::StorageVar { address, var_name } => {
                Ok(read_felt(reader, *address, var_name, &[])?)
            }
        }
    }
}

/// Value of an [UpgradeTarget] captured before the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeProbe {
    target: UpgradeTarget,
    value: Felt252,
}

impl UpgradeProbe {
    pub fn capture<R: StateReader + ?Sized>(
        reader: &R,
        target: UpgradeTarget,
    ) -> Result<Self, HarnessError> {
        let value = target.read(reader)?;
        debug!(?target, value = %format!("{value:#x}"), "upgrade probe captured");
        Ok(Self { target, value })
    }

    pub fn target(&self) -> &UpgradeTarget {
        &self.target
    }

    pub fn value(&self) -> Felt252 {
        self.value
    }

    pub fn assert_equals(&self, expected: impl Into<Felt252>) {
        let expected = expected.into();
        assert_eq!(
            self.value, expected,
            "{:?} is {:#x} instead of {:#x}",
            self.target, self.value, expected
        );
    }

    pub fn assert_differs_from(&self, other: impl Into<Felt252>) {
        let other = other.into();
        assert_ne!(
            self.value, other,
            "{:?} is already {:#x}",
            self.target, other
        );
    }

    /// The value has not moved since the capture.
    pub fn assert_unchanged<R: StateReader + ?Sized>(&self, reader: &R) -> Result<(), HarnessError> {
        let current = self.target.read(reader)?;
        assert_eq!(
            current, self.value,
            "{:?} moved from {:#x} to {:#x} without a transaction",
            self.target, self.value, current
        );
        Ok(())
    }

    pub fn assert_upgraded_to<R: StateReader + ?Sized>(
        &self,
        reader: &R,
        expected: impl Into<Felt252>,
    ) -> Result<(), HarnessError> {
        let expected = expected.into();
        let current = self.target.read(reader)?;
        assert_eq!(
            current, expected,
            "{:?} was not upgraded from {:#x} to {:#x}, found {:#x}",
            self.target, self.value, expected, current
        );
        Ok(())
    }
}

/// Checks that `target` moves from `baseline` to `new_value` on the transaction
/// sent by `trigger`, and not before.
///
/// `change_registry` points Kakarot at the new class. The value must still be
/// on `baseline` after it runs.
pub fn expect_lazy_upgrade<N, C, T>(
    network: &mut N,
    target: UpgradeTarget,
    baseline: impl Into<Felt252>,
    new_value: impl Into<Felt252>,
    change_registry: C,
    trigger: T,
) -> Result<(), HarnessError>
where
    N: KakarotNetwork,
    C: FnOnce(&mut N) -> Result<(), HarnessError>,
    T: FnOnce(&mut N) -> Result<(), HarnessError>,
{
    let new_value = new_value.into();
    let probe = UpgradeProbe::capture(&*network, target)?;
    probe.assert_equals(baseline);
    probe.assert_differs_from(new_value);

    change_registry(network)?;
    probe.assert_unchanged(&*network)?;

    trigger(network)?;
    probe.assert_upgraded_to(&*network, new_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        definitions::{
            constants::{
                ACCOUNT_CAIRO1_HELPERS_CLASS_HASH, ACCOUNT_CONTRACT_CLASS,
                ACCOUNT_CONTRACT_FIXTURE_CLASS, CAIRO1_HELPERS_CLASS,
            },
            network_config::NetworkConfig,
        },
        testing::{registry::set_account_contract_class_hash, Declarations, TestContext},
    };
    use pretty_assertions_sorted::assert_eq;

    fn context() -> TestContext {
        TestContext::with_config(NetworkConfig::default(), Declarations::devnet()).unwrap()
    }

    #[test]
    fn probe_reads_class_and_storage() {
        let mut context = context();
        let wallet = context.new_account().unwrap();
        let declarations = context.class_hashes().clone();
        let network = context.network();

        let class = UpgradeProbe::capture(
            network,
            UpgradeTarget::ClassHash(wallet.starknet_contract()),
        )
        .unwrap();
        class.assert_equals(declarations.get(ACCOUNT_CONTRACT_CLASS).unwrap());

        let helpers = UpgradeProbe::capture(
            network,
            UpgradeTarget::StorageVar {
                address: wallet.starknet_contract(),
                var_name: ACCOUNT_CAIRO1_HELPERS_CLASS_HASH,
            },
        )
        .unwrap();
        assert_eq!(
            helpers.value(),
            declarations.get(CAIRO1_HELPERS_CLASS).unwrap().to_felt()
        );
    }

    #[test]
    fn counter_assertions_hold() {
        let mut context = context();
        let account = context.new_account().unwrap();
        let owner = context.owner().unwrap();
        let counter = context.counter().unwrap();
        let caller = context.caller().unwrap();
        let network = context.network_mut();

        assert_counter_transaction_success(network, &counter, &account).unwrap();
        assert_caller_contract_increases_counter(network, &caller, &counter, &owner).unwrap();
        assert_eq!(counter.count(network).unwrap(), U256::from(2));
    }

    #[test]
    #[should_panic(expected = "without a transaction")]
    fn eager_upgrade_is_caught() {
        let mut context = context();
        let wallet = context.new_account().unwrap();
        let declarations = context.class_hashes().clone();
        let fixture = declarations.get(ACCOUNT_CONTRACT_FIXTURE_CLASS).unwrap();

        // A registry change that also moves the account is not lazy.
        expect_lazy_upgrade(
            context.network_mut(),
            UpgradeTarget::ClassHash(wallet.starknet_contract()),
            declarations.get(ACCOUNT_CONTRACT_CLASS).unwrap(),
            fixture,
            |network| {
                set_account_contract_class_hash(network, fixture)?;
                crate::testing::fixtures::send_transaction(
                    network,
                    &wallet,
                    Some(wallet.address()),
                    U256::ZERO,
                    Bytes::new(),
                )?;
                Ok(())
            },
            |_| Ok(()),
        )
        .unwrap();
    }
}
