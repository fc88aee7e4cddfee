use crate::fresh_context;
use alloy_primitives::{Bytes, U256};
use assert_matches::assert_matches;
use kakarot_e2e::{
    core::errors::{
        kakarot_errors::KakarotError, state_errors::StateError,
        transaction_errors::TransactionError,
    },
    definitions::constants::{ACCOUNT_CONTRACT_CLASS, ACCOUNT_CONTRACT_FIXTURE_CLASS},
    evm::{abi::ICounter, EvmTransaction},
    network::{ExecutionStatus, KakarotNetwork, NetworkError},
    state::state_api::StateReader,
    testing::{
        generate_random_private_key, registry::set_account_contract_class_hash, HarnessError,
        RegistryCleanup, UpgradeProbe, UpgradeTarget,
    },
    utils::ClassHash,
    Felt252,
};
use alloy_sol_types::SolCall;
use pretty_assertions_sorted::assert_eq;

#[test]
fn reverted_transaction_still_upgrades_sender() {
    let mut context = fresh_context();
    let mut context = RegistryCleanup::new(&mut context);
    let account = context.new_account().unwrap();
    let counter = context.counter().unwrap();
    let baseline = context.class_hashes().get(ACCOUNT_CONTRACT_CLASS).unwrap();
    let target = context
        .class_hashes()
        .get(ACCOUNT_CONTRACT_FIXTURE_CLASS)
        .unwrap();
    let network = context.network_mut();
    let nonce = network.get_transaction_count(&account.address()).unwrap();

    set_account_contract_class_hash(network, target).unwrap();
    let receipt = counter.dec(network, &account).unwrap();

    assert_eq!(
        receipt.execution_status,
        ExecutionStatus::Reverted("count should be strictly greater than 0".to_string())
    );
    assert_eq!(
        network.get_transaction_count(&account.address()).unwrap(),
        nonce + 1
    );
    assert_eq!(
        network.get_class_hash_at(&account.starknet_contract()).unwrap(),
        target
    );
    // The counter was only touched inside the reverted call.
    assert_eq!(
        network.get_class_hash_at(&counter.starknet_address()).unwrap(),
        baseline
    );
}

#[test]
fn undeclared_class_fails_transaction_and_commits_nothing() {
    let mut context = fresh_context();
    let mut context = RegistryCleanup::new(&mut context);
    let account = context.new_account().unwrap();
    let counter = context.counter().unwrap();
    let undeclared = ClassHash::from(Felt252::from(0xdead_u64));
    let network = context.network_mut();

    let class = UpgradeProbe::capture(
        &*network,
        UpgradeTarget::ClassHash(account.starknet_contract()),
    )
    .unwrap();
    let nonce = network.get_transaction_count(&account.address()).unwrap();
    let block_number = network.block_info().block_number;

    set_account_contract_class_hash(network, undeclared).unwrap();
    let block_number = block_number + 1;
    assert_eq!(network.block_info().block_number, block_number);

    assert_matches!(
        counter.inc(network, &account),
        Err(HarnessError::Network(NetworkError::Transaction(
            TransactionError::Kakarot(KakarotError::State(StateError::UndeclaredClass(hash)))
        ))) if hash == undeclared
    );

    class.assert_unchanged(&*network).unwrap();
    assert_eq!(network.block_info().block_number, block_number);
    assert_eq!(
        network.get_transaction_count(&account.address()).unwrap(),
        nonce
    );
    assert_eq!(counter.count(network).unwrap(), U256::ZERO);
}

#[test]
fn wrong_nonce_is_rejected() {
    let mut context = fresh_context();
    let account = context.new_account().unwrap();
    let counter = context.counter().unwrap();
    let network = context.network_mut();
    let nonce = network.get_transaction_count(&account.address()).unwrap();

    let transaction = EvmTransaction {
        chain_id: network.chain_id(),
        nonce: nonce + 1,
        to: Some(counter.address()),
        value: U256::ZERO,
        data: Bytes::from(ICounter::incCall {}.abi_encode()),
        max_fee: network.default_max_fee(),
    };
    let signed = account.sign(transaction).unwrap();

    assert_matches!(
        network.send_raw_transaction(account.starknet_contract(), signed),
        Err(NetworkError::Transaction(TransactionError::InvalidTransactionNonce(expected, got)))
            if expected == nonce && got == nonce + 1
    );
    assert_eq!(counter.count(network).unwrap(), U256::ZERO);
}

#[test]
fn wrong_signer_is_rejected() {
    let mut context = fresh_context();
    let account = context.new_account().unwrap();
    let counter = context.counter().unwrap();
    let network = context.network_mut();

    let transaction = EvmTransaction {
        chain_id: network.chain_id(),
        nonce: network.get_transaction_count(&account.address()).unwrap(),
        to: Some(counter.address()),
        value: U256::ZERO,
        data: Bytes::from(ICounter::incCall {}.abi_encode()),
        max_fee: network.default_max_fee(),
    };
    let signed = transaction.sign(&generate_random_private_key()).unwrap();

    assert_matches!(
        network.send_raw_transaction(account.starknet_contract(), signed),
        Err(NetworkError::Transaction(TransactionError::SignerMismatch { expected, .. }))
            if expected == account.address()
    );
}

#[test]
fn wrong_chain_id_is_rejected() {
    let mut context = fresh_context();
    let account = context.new_account().unwrap();
    let network = context.network_mut();

    let transaction = EvmTransaction {
        chain_id: network.chain_id() + 1,
        nonce: network.get_transaction_count(&account.address()).unwrap(),
        to: Some(account.address()),
        value: U256::ZERO,
        data: Bytes::new(),
        max_fee: network.default_max_fee(),
    };
    let signed = account.sign(transaction).unwrap();

    assert_matches!(
        network.send_raw_transaction(account.starknet_contract(), signed),
        Err(NetworkError::Transaction(TransactionError::InvalidChainId(..)))
    );
}

#[test]
fn non_owner_cannot_change_registry() {
    let mut context = fresh_context();
    let stranger = context.new_account().unwrap();
    let target = context
        .class_hashes()
        .get(ACCOUNT_CONTRACT_FIXTURE_CLASS)
        .unwrap();
    let network = context.network_mut();

    let err = network
        .invoke_as(
            stranger.starknet_contract(),
            "kakarot",
            "set_account_contract_class_hash",
            &[target.to_felt()],
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Ownable: caller is not the owner");
    assert_eq!(
        network
            .kakarot()
            .account_contract_class_hash(network.state())
            .unwrap(),
        context.class_hashes().get(ACCOUNT_CONTRACT_CLASS).unwrap()
    );
}
