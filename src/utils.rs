use crate::{core::errors::state_errors::StateError, Felt252};
use alloy_primitives::{keccak256, Address as EvmAddress, U256};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use starknet::core::utils::{get_contract_address, get_selector_from_name, get_storage_var_address};
use std::fmt;

//* -------------------
//*      Address
//* -------------------

#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq, Default, PartialOrd, Ord)]
pub struct Address(pub Felt252);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

//* -------------------
//*     Class hash
//* -------------------

#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassHash(pub [u8; 32]);

impl ClassHash {
    pub fn to_felt(&self) -> Felt252 {
        Felt252::from_bytes_be(&self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }
}

impl From<Felt252> for ClassHash {
    fn from(value: Felt252) -> Self {
        ClassHash(value.to_bytes_be())
    }
}

impl From<ClassHash> for Felt252 {
    fn from(value: ClassHash) -> Self {
        value.to_felt()
    }
}

impl fmt::Display for ClassHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.to_felt())
    }
}

//* -------------------
//*  Helper Functions
//* -------------------

pub fn felt_to_hash(value: &Felt252) -> [u8; 32] {
    value.to_bytes_be()
}

/// Parses a felt written either as `0x`-prefixed hex or as a decimal string.
pub fn string_to_felt(value: &str) -> Result<Felt252, StateError> {
    let parsed = match value.strip_prefix("0x") {
        Some(_) => Felt252::from_hex(value),
        None => Felt252::from_dec_str(value),
    };
    parsed.map_err(|_| StateError::CustomError(format!("invalid felt: {value}")))
}

pub fn felt_to_u128(value: &Felt252) -> Option<u128> {
    let bytes = value.to_bytes_be();
    if bytes[..16].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&bytes[16..]);
    Some(u128::from_be_bytes(low))
}

pub fn felt_to_u64(value: &Felt252) -> Option<u64> {
    felt_to_u128(value).and_then(|v| u64::try_from(v).ok())
}

pub fn evm_address_to_felt(address: &EvmAddress) -> Felt252 {
    Felt252::from_bytes_be_slice(address.as_slice())
}

/// Returns `None` when the felt does not fit in 160 bits.
pub fn felt_to_evm_address(value: &Felt252) -> Option<EvmAddress> {
    let bytes = value.to_bytes_be();
    if bytes[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(EvmAddress::from_slice(&bytes[12..]))
}

/// Splits a u256 into its (low, high) 128-bit felts, the layout Cairo uses for `Uint256`.
pub fn split_u256(value: U256) -> [Felt252; 2] {
    let bytes = value.to_be_bytes::<32>();
    [
        Felt252::from_bytes_be_slice(&bytes[16..]),
        Felt252::from_bytes_be_slice(&bytes[..16]),
    ]
}

pub fn join_u256(low: &Felt252, high: &Felt252) -> Option<U256> {
    let low = felt_to_u128(low)?;
    let high = felt_to_u128(high)?;
    Some((U256::from(high) << 128) | U256::from(low))
}

// -------------------
//    HASHING
// -------------------

pub fn calculate_sn_keccak(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::default();
    hasher.update(data);
    let mut result: [u8; 32] = hasher.finalize().into();
    // Only the first 250 bits from the hash are used.
    result[0] &= 0b0000_0011;
    result
}

/// Dispatch selector of a Solidity function signature, e.g. `evm_selector("inc()")`.
pub fn evm_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Entry point selector of a Starknet function name.
pub fn starknet_selector(function_name: &str) -> Result<Felt252, StateError> {
    get_selector_from_name(function_name)
        .map_err(|_| StateError::CustomError(format!("non ascii function name: {function_name}")))
}

/// Address of a Cairo 0 storage variable, optionally indexed by `keys`.
pub fn compute_storage_key(var_name: &str, keys: &[Felt252]) -> Result<Felt252, StateError> {
    get_storage_var_address(var_name, keys)
        .map_err(|_| StateError::CustomError(format!("non ascii storage var name: {var_name}")))
}

/// Starknet address Kakarot deploys the account of `evm_address` to.
///
/// The account is deployed by Kakarot with the uninitialized account class and
/// `[kakarot_address, evm_address]` as constructor calldata, salted with the evm address.
pub fn compute_starknet_address(
    evm_address: &Felt252,
    kakarot_address: &Felt252,
    uninitialized_account_class_hash: &Felt252,
) -> Felt252 {
    let constructor_args = [*kakarot_address, *evm_address];
    get_contract_address(
        *evm_address,
        *uninitialized_account_class_hash,
        &constructor_args,
        *kakarot_address,
    )
}
