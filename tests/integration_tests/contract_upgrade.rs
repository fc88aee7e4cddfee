use crate::lock;
use kakarot_e2e::{
    definitions::constants::{ACCOUNT_CONTRACT_CLASS, ACCOUNT_CONTRACT_FIXTURE_CLASS},
    testing::{
        assert_caller_contract_increases_counter, assert_counter_transaction_success,
        expect_lazy_upgrade, registry::set_account_contract_class_hash, RegistryCleanup,
        TestContext, UpgradeTarget,
    },
};
use lazy_static::lazy_static;
use std::sync::Mutex;

lazy_static! {
    // The account, the owner and the caller contract are shared by the tests
    // below. Each test gets a counter of its own.
    static ref MODULE_CONTEXT: Mutex<TestContext> = Mutex::new(crate::fresh_context());
}

#[test]
fn contract_class_is_upgraded_when_called_directly() {
    let mut context = lock(&MODULE_CONTEXT);
    let mut context = RegistryCleanup::new(&mut context);
    let account = context.new_account().unwrap();
    let counter = context.counter().unwrap();
    let baseline = context.class_hashes().get(ACCOUNT_CONTRACT_CLASS).unwrap();
    let target = context
        .class_hashes()
        .get(ACCOUNT_CONTRACT_FIXTURE_CLASS)
        .unwrap();

    expect_lazy_upgrade(
        context.network_mut(),
        UpgradeTarget::ClassHash(counter.starknet_address()),
        baseline,
        target,
        |network| set_account_contract_class_hash(network, target).map(|_| ()),
        |network| assert_counter_transaction_success(network, &counter, &account).map(|_| ()),
    )
    .unwrap();
}

#[test]
fn contract_class_is_upgraded_when_called_through_another_contract() {
    let mut context = lock(&MODULE_CONTEXT);
    let mut context = RegistryCleanup::new(&mut context);
    let account = context.new_account().unwrap();
    // Deployed by the owner, driven by the module account.
    let caller = context.caller().unwrap();
    let counter = context.counter().unwrap();
    let baseline = context.class_hashes().get(ACCOUNT_CONTRACT_CLASS).unwrap();
    let target = context
        .class_hashes()
        .get(ACCOUNT_CONTRACT_FIXTURE_CLASS)
        .unwrap();

    expect_lazy_upgrade(
        context.network_mut(),
        UpgradeTarget::ClassHash(counter.starknet_address()),
        baseline,
        target,
        |network| set_account_contract_class_hash(network, target).map(|_| ()),
        |network| {
            assert_caller_contract_increases_counter(network, &caller, &counter, &account)
                .map(|_| ())
        },
    )
    .unwrap();
}

#[test]
fn shared_counter_fixtures_count_exactly() {
    let mut context = lock(&MODULE_CONTEXT);
    let account = context.new_account().unwrap();
    let caller = context.caller().unwrap();
    let counter = context.counter().unwrap();
    let network = context.network_mut();

    for _ in 0..3 {
        assert_counter_transaction_success(network, &counter, &account).unwrap();
        assert_caller_contract_increases_counter(network, &caller, &counter, &account).unwrap();
    }
    assert_eq!(counter.count(network).unwrap(), alloy_primitives::U256::from(6));
}
