use crate::fresh_context;
use kakarot_e2e::{
    definitions::constants::{
        ACCOUNT_CAIRO1_HELPERS_CLASS_HASH, ACCOUNT_CONTRACT_CLASS, ACCOUNT_CONTRACT_FIXTURE_CLASS,
        CAIRO1_HELPERS_CLASS, CAIRO1_HELPERS_FIXTURE_CLASS,
    },
    testing::{
        assert_counter_transaction_success, expect_lazy_upgrade,
        registry::{set_account_contract_class_hash, set_cairo1_helpers_class_hash},
        RegistryCleanup, UpgradeProbe, UpgradeTarget,
    },
};

#[test]
fn account_class_is_upgraded_on_transaction() {
    let mut context = fresh_context();
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
        UpgradeTarget::ClassHash(account.starknet_contract()),
        baseline,
        target,
        |network| set_account_contract_class_hash(network, target).map(|_| ()),
        |network| assert_counter_transaction_success(network, &counter, &account).map(|_| ()),
    )
    .unwrap();
}

#[test]
fn account_cairo1_helpers_are_upgraded_on_transaction() {
    let mut context = fresh_context();
    let mut context = RegistryCleanup::new(&mut context);
    let account = context.new_account().unwrap();
    let counter = context.counter().unwrap();
    let baseline = context.class_hashes().get(CAIRO1_HELPERS_CLASS).unwrap();
    let target = context
        .class_hashes()
        .get(CAIRO1_HELPERS_FIXTURE_CLASS)
        .unwrap();

    expect_lazy_upgrade(
        context.network_mut(),
        UpgradeTarget::StorageVar {
            address: account.starknet_contract(),
            var_name: ACCOUNT_CAIRO1_HELPERS_CLASS_HASH,
        },
        baseline,
        target,
        |network| set_cairo1_helpers_class_hash(network, target).map(|_| ()),
        |network| assert_counter_transaction_success(network, &counter, &account).map(|_| ()),
    )
    .unwrap();

    // Only the helpers reference moved.
    let class = UpgradeProbe::capture(
        context.network(),
        UpgradeTarget::ClassHash(account.starknet_contract()),
    )
    .unwrap();
    class.assert_equals(context.class_hashes().get(ACCOUNT_CONTRACT_CLASS).unwrap());
}

#[test]
fn registry_change_alone_upgrades_nothing() {
    let mut context = fresh_context();
    let mut context = RegistryCleanup::new(&mut context);
    let account = context.new_account().unwrap();
    let counter = context.counter().unwrap();
    let declarations = context.class_hashes().clone();

    let probes = [
        UpgradeTarget::ClassHash(account.starknet_contract()),
        UpgradeTarget::ClassHash(counter.starknet_address()),
        UpgradeTarget::StorageVar {
            address: account.starknet_contract(),
            var_name: ACCOUNT_CAIRO1_HELPERS_CLASS_HASH,
        },
    ]
    .map(|target| UpgradeProbe::capture(context.network(), target).unwrap());

    let network = context.network_mut();
    set_account_contract_class_hash(
        network,
        declarations.get(ACCOUNT_CONTRACT_FIXTURE_CLASS).unwrap(),
    )
    .unwrap();
    set_cairo1_helpers_class_hash(
        network,
        declarations.get(CAIRO1_HELPERS_FIXTURE_CLASS).unwrap(),
    )
    .unwrap();
    // Reads go through eth_call and do not count as a transaction.
    counter.count(network).unwrap();

    for probe in &probes {
        probe.assert_unchanged(&*network).unwrap();
    }
}

#[test]
fn cleanup_restores_baselines_and_next_transaction_downgrades() {
    let mut context = fresh_context();
    let account = context.new_account().unwrap();
    let counter = context.counter().unwrap();
    let baseline = context.class_hashes().get(ACCOUNT_CONTRACT_CLASS).unwrap();
    let target = context
        .class_hashes()
        .get(ACCOUNT_CONTRACT_FIXTURE_CLASS)
        .unwrap();

    {
        let mut guarded = RegistryCleanup::new(&mut context);
        set_account_contract_class_hash(guarded.network_mut(), target).unwrap();
        assert_counter_transaction_success(guarded.network_mut(), &counter, &account).unwrap();
    }
    context.reset_registry().unwrap();

    let probe = UpgradeProbe::capture(
        context.network(),
        UpgradeTarget::ClassHash(account.starknet_contract()),
    )
    .unwrap();
    probe.assert_equals(target);

    assert_counter_transaction_success(context.network_mut(), &counter, &account).unwrap();
    probe
        .assert_upgraded_to(context.network(), baseline)
        .unwrap();
}
