use crate::{utils::Address, Felt252};
use lazy_static::lazy_static;

// Amounts are in wei of the native (fee) token.
pub const TOTAL_SUPPLY: u128 = 10_000 * 10u128.pow(18);
pub const TEST_AMOUNT: u128 = 10 * 10u128.pow(18);
pub const DEFAULT_MAX_FEE: u128 = 10u128.pow(16);
/// Fee the devnet charges per account transaction, capped by the declared max fee.
pub const DEFAULT_TX_FEE: u128 = 10u128.pow(15);
/// Enough for ~10 transactions at the default max fee.
pub const EOA_DEPLOYMENT_FEE_MULTIPLIER: u128 = 100;

/// "KKRT"
pub const DEFAULT_CHAIN_ID: u64 = 0x4B4B_5254;

/// Key of the deployer-side EOA used by the `owner` fixture.
pub const OWNER_PRIVATE_KEY: &str =
    "0x6ae82d865482a203603ecbf25c865e082396d7705a6bbce92c1ff1d6ab9b503c";

// Declared classes, by role.
pub const KAKAROT_CLASS: &str = "kakarot";
pub const ACCOUNT_CONTRACT_CLASS: &str = "account_contract";
pub const ACCOUNT_CONTRACT_FIXTURE_CLASS: &str = "account_contract_fixture";
pub const UNINITIALIZED_ACCOUNT_CLASS: &str = "uninitialized_account";
pub const CAIRO1_HELPERS_CLASS: &str = "Cairo1Helpers";
pub const CAIRO1_HELPERS_FIXTURE_CLASS: &str = "Cairo1HelpersFixture";
pub const ERC20_CLASS: &str = "ERC20";
pub const OPENZEPPELIN_ACCOUNT_CLASS: &str = "OpenzeppelinAccount";

pub const DEVNET_DECLARED_CLASSES: [&str; 8] = [
    KAKAROT_CLASS,
    ACCOUNT_CONTRACT_CLASS,
    ACCOUNT_CONTRACT_FIXTURE_CLASS,
    UNINITIALIZED_ACCOUNT_CLASS,
    CAIRO1_HELPERS_CLASS,
    CAIRO1_HELPERS_FIXTURE_CLASS,
    ERC20_CLASS,
    OPENZEPPELIN_ACCOUNT_CLASS,
];

// System contracts reachable by name through `invoke` and `call`.
pub const KAKAROT_CONTRACT_NAME: &str = "kakarot";
pub const FEE_TOKEN_CONTRACT_NAME: &str = "ETH";

// Kakarot storage.
pub const OWNABLE_OWNER: &str = "Ownable_owner";
pub const KAKAROT_ACCOUNT_CONTRACT_CLASS_HASH: &str = "Kakarot_account_contract_class_hash";
pub const KAKAROT_CAIRO1_HELPERS_CLASS_HASH: &str = "Kakarot_cairo1_helpers_class_hash";
pub const KAKAROT_UNINITIALIZED_ACCOUNT_CLASS_HASH: &str =
    "Kakarot_uninitialized_account_class_hash";
pub const KAKAROT_NATIVE_TOKEN_ADDRESS: &str = "Kakarot_native_token_address";
pub const KAKAROT_CHAIN_ID: &str = "Kakarot_chain_id";
pub const KAKAROT_EVM_TO_STARKNET_ADDRESS: &str = "Kakarot_evm_to_starknet_address";

// Account proxy storage.
pub const ACCOUNT_EVM_ADDRESS: &str = "Account_evm_address";
pub const ACCOUNT_IS_INITIALIZED: &str = "Account_is_initialized";
pub const ACCOUNT_NONCE: &str = "Account_nonce";
pub const ACCOUNT_IMPLEMENTATION: &str = "Account_implementation";
pub const ACCOUNT_CAIRO1_HELPERS_CLASS_HASH: &str = "Account_cairo1_helpers_class_hash";
pub const ACCOUNT_CODE_HASH: &str = "Account_code_hash";
pub const ACCOUNT_STORAGE: &str = "Account_storage";

// Fee token storage.
pub const ERC20_BALANCES: &str = "ERC20_balances";
pub const ERC20_TOTAL_SUPPLY: &str = "ERC20_total_supply";

lazy_static! {
    pub static ref DEFAULT_SEQUENCER_ADDRESS: Address = Address(Felt252::from_hex(
        "0x3711666a3506c99c9d78c4d4013409a87a962b7a0880a1c24af9fe193dafc01"
    ).unwrap());
    pub static ref FEE_TOKEN_ADDRESS: Address = Address(Felt252::from_hex(
        "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7"
    ).unwrap());
    pub static ref DEVNET_KAKAROT_ADDRESS: Address = Address(Felt252::from_hex(
        "0x7ea5bbee48a1cc43eaa3aa2ae9db7da6d1c7e4fea70cc3f4ccd5a5ee9c6a78b"
    ).unwrap());
    /// Starknet account the registry owner signs administrative invokes with.
    pub static ref DEVNET_DEPLOYER_ADDRESS: Address = Address(Felt252::from_hex(
        "0x64b48806902a367c8598f4f95c305e8c1a1acba5f082d294a43793113115691"
    ).unwrap());
}
