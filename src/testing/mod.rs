//! End-to-end harness for Kakarot's auto-upgrade on transaction.
//!
//! [devnet::KakarotDevnet] is the network the harness runs against by default.
//! Fixtures, contract handles, registry helpers and upgrade assertions only
//! rely on [KakarotNetwork](crate::network::KakarotNetwork).

pub mod assertions;
pub mod contracts;
pub mod declarations;
pub mod devnet;
pub mod fixtures;
pub mod harness_error;
pub mod registry;

pub use assertions::{
    assert_caller_contract_increases_counter, assert_counter_transaction_success,
    expect_lazy_upgrade, UpgradeProbe, UpgradeTarget,
};
pub use contracts::{deploy_contract, Caller, Counter, DeployedContract};
pub use declarations::{class_hashes, Declarations};
pub use devnet::KakarotDevnet;
pub use fixtures::{
    generate_random_private_key, new_account, owner, require_success, send_transaction, TestContext,
    Wallet,
};
pub use harness_error::HarnessError;
pub use registry::{get_starknet_address, reset_registry, RegistryCleanup};

/// Sends harness logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
