//! Owner-only helpers on Kakarot's class hash registry.

use super::{Declarations, HarnessError, TestContext};
use crate::{
    definitions::constants::{ACCOUNT_CONTRACT_CLASS, CAIRO1_HELPERS_CLASS, KAKAROT_CONTRACT_NAME},
    network::{KakarotNetwork, TransactionReceipt},
    utils::{evm_address_to_felt, Address, ClassHash},
};
use alloy_primitives::Address as EvmAddress;
use std::ops::{Deref, DerefMut};
use tracing::{error, info};

pub fn set_account_contract_class_hash<N: KakarotNetwork>(
    network: &mut N,
    class_hash: ClassHash,
) -> Result<TransactionReceipt, HarnessError> {
    Ok(network.invoke(
        KAKAROT_CONTRACT_NAME,
        "set_account_contract_class_hash",
        &[class_hash.to_felt()],
    )?)
}

pub fn set_cairo1_helpers_class_hash<N: KakarotNetwork>(
    network: &mut N,
    class_hash: ClassHash,
) -> Result<TransactionReceipt, HarnessError> {
    Ok(network.invoke(
        KAKAROT_CONTRACT_NAME,
        "set_cairo1_helpers_class_hash",
        &[class_hash.to_felt()],
    )?)
}

pub fn account_contract_class_hash<N: KakarotNetwork>(network: &N) -> Result<ClassHash, HarnessError> {
    single_value(network, "get_account_contract_class_hash", &[]).map(ClassHash::from)
}

pub fn cairo1_helpers_class_hash<N: KakarotNetwork>(network: &N) -> Result<ClassHash, HarnessError> {
    single_value(network, "get_cairo1_helpers_class_hash", &[]).map(ClassHash::from)
}

/// Starknet address Kakarot derives for `evm_address`, deployed or not.
pub fn get_starknet_address<N: KakarotNetwork>(
    network: &N,
    evm_address: &EvmAddress,
) -> Result<Address, HarnessError> {
    single_value(
        network,
        "get_starknet_address",
        &[evm_address_to_felt(evm_address)],
    )
    .map(Address)
}

fn single_value<N: KakarotNetwork>(
    network: &N,
    function_name: &str,
    calldata: &[crate::Felt252],
) -> Result<crate::Felt252, HarnessError> {
    match network.call(KAKAROT_CONTRACT_NAME, function_name, calldata)?[..] {
        [value] => Ok(value),
        _ => Err(HarnessError::UnexpectedReturnData(function_name.to_string())),
    }
}

/// Points the registry back at the declared `account_contract` and `Cairo1Helpers` classes.
///
/// Safe to run any number of times, whatever the registry currently holds.
pub fn reset_registry<N: KakarotNetwork>(
    network: &mut N,
    declarations: &Declarations,
) -> Result<(), HarnessError> {
    let account_contract = declarations.get(ACCOUNT_CONTRACT_CLASS)?;
    let cairo1_helpers = declarations.get(CAIRO1_HELPERS_CLASS)?;

    set_account_contract_class_hash(network, account_contract)?;
    set_cairo1_helpers_class_hash(network, cairo1_helpers)?;
    info!(%account_contract, %cairo1_helpers, "registry reset");
    Ok(())
}

/// Borrows a [TestContext] and resets its registry when dropped, including
/// when the test panics.
pub struct RegistryCleanup<'a> {
    context: &'a mut TestContext,
}

impl<'a> RegistryCleanup<'a> {
    pub fn new(context: &'a mut TestContext) -> Self {
        Self { context }
    }
}

impl Deref for RegistryCleanup<'_> {
    type Target = TestContext;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for RegistryCleanup<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for RegistryCleanup<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.context.reset_registry() {
            if std::thread::panicking() {
                error!(%err, "registry cleanup failed");
            } else {
                panic!("registry cleanup failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        definitions::{
            constants::{ACCOUNT_CONTRACT_FIXTURE_CLASS, CAIRO1_HELPERS_FIXTURE_CLASS},
            network_config::NetworkConfig,
        },
        network::NetworkError,
        core::errors::kakarot_errors::KakarotError,
    };
    use assert_matches::assert_matches;
    use pretty_assertions_sorted::assert_eq;
    use std::panic::{self, AssertUnwindSafe};

    fn context() -> TestContext {
        TestContext::with_config(NetworkConfig::default(), Declarations::devnet()).unwrap()
    }

    #[test]
    fn setters_update_registry() {
        let mut context = context();
        let fixture = context.class_hashes().get(ACCOUNT_CONTRACT_FIXTURE_CLASS).unwrap();
        let helpers = context.class_hashes().get(CAIRO1_HELPERS_FIXTURE_CLASS).unwrap();
        let network = context.network_mut();

        set_account_contract_class_hash(network, fixture).unwrap();
        set_cairo1_helpers_class_hash(network, helpers).unwrap();

        assert_eq!(account_contract_class_hash(network).unwrap(), fixture);
        assert_eq!(cairo1_helpers_class_hash(network).unwrap(), helpers);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut context = context();
        let declarations = context.class_hashes().clone();
        let baseline = declarations.get(ACCOUNT_CONTRACT_CLASS).unwrap();
        let baseline_helpers = declarations.get(CAIRO1_HELPERS_CLASS).unwrap();

        reset_registry(context.network_mut(), &declarations).unwrap();
        set_account_contract_class_hash(
            context.network_mut(),
            declarations.get(ACCOUNT_CONTRACT_FIXTURE_CLASS).unwrap(),
        )
        .unwrap();
        reset_registry(context.network_mut(), &declarations).unwrap();
        reset_registry(context.network_mut(), &declarations).unwrap();

        assert_eq!(account_contract_class_hash(context.network()).unwrap(), baseline);
        assert_eq!(
            cairo1_helpers_class_hash(context.network()).unwrap(),
            baseline_helpers
        );
    }

    #[test]
    fn cleanup_runs_on_drop() {
        let mut context = context();
        let baseline = context.class_hashes().get(CAIRO1_HELPERS_CLASS).unwrap();
        let fixture = context.class_hashes().get(CAIRO1_HELPERS_FIXTURE_CLASS).unwrap();
        {
            let mut guarded = RegistryCleanup::new(&mut context);
            set_cairo1_helpers_class_hash(guarded.network_mut(), fixture).unwrap();
            assert_eq!(cairo1_helpers_class_hash(guarded.network()).unwrap(), fixture);
        }
        assert_eq!(cairo1_helpers_class_hash(context.network()).unwrap(), baseline);
    }

    #[test]
    fn cleanup_runs_when_the_test_panics() {
        let mut context = context();
        let baseline = context.class_hashes().get(ACCOUNT_CONTRACT_CLASS).unwrap();
        let baseline_helpers = context.class_hashes().get(CAIRO1_HELPERS_CLASS).unwrap();
        let fixture = context.class_hashes().get(ACCOUNT_CONTRACT_FIXTURE_CLASS).unwrap();
        let helpers = context.class_hashes().get(CAIRO1_HELPERS_FIXTURE_CLASS).unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut guarded = RegistryCleanup::new(&mut context);
            set_account_contract_class_hash(guarded.network_mut(), fixture).unwrap();
            set_cairo1_helpers_class_hash(guarded.network_mut(), helpers).unwrap();
            panic!("failing test");
        }));

        assert!(result.is_err());
        assert_eq!(account_contract_class_hash(context.network()).unwrap(), baseline);
        assert_eq!(
            cairo1_helpers_class_hash(context.network()).unwrap(),
            baseline_helpers
        );
    }

    #[test]
    fn setters_are_owner_only() {
        let mut context = context();
        let stranger = context.new_account().unwrap().starknet_contract();
        let fixture = context.class_hashes().get(ACCOUNT_CONTRACT_FIXTURE_CLASS).unwrap();

        assert_matches!(
            context.network_mut().invoke_as(
                stranger,
                KAKAROT_CONTRACT_NAME,
                "set_account_contract_class_hash",
                &[fixture.to_felt()],
            ),
            Err(NetworkError::Kakarot(KakarotError::CallerIsNotOwner))
        );
    }

    #[test]
    fn starknet_address_matches_deployed_account() {
        let mut context = context();
        let wallet = context.new_account().unwrap();
        assert_eq!(
            get_starknet_address(context.network(), &wallet.address()).unwrap(),
            wallet.starknet_contract()
        );
    }
}
