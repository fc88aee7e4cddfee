use crate::rpc_state_errors::{RpcStateError, CLASS_HASH_NOT_FOUND, CONTRACT_NOT_FOUND};
use core::fmt;
use dotenv::dotenv;
use kakarot_e2e::{
    core::errors::state_errors::StateError,
    definitions::network_config::{NetworkConfig, RPC_URL_ENV},
    state::{state_api::StateReader, state_cache::StorageEntry},
    utils::{string_to_felt, Address, ClassHash},
    Felt252,
};
use serde::Deserialize;
use serde_json::json;
use std::{env, fmt::Display};
use tracing::debug;

/// A [StateReader] backed by a Starknet JSON-RPC endpoint.
///
/// Every read is a request against the configured block. Nothing is cached.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RpcState {
    /// RPC Endpoint URL.
    rpc_endpoint: String,
    /// Block the state is read at.
    pub block: BlockValue,
}

/// Represents the tag of a block value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum BlockTag {
    Latest,
    Pending,
}

impl Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            BlockTag::Latest => "latest",
            BlockTag::Pending => "pending",
        };
        write!(f, "{}", string)
    }
}

/// [`BlockValue`] is an Enum that represent which block we are going to use to retrieve information.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BlockValue {
    /// String one of: ["latest", "pending"]
    Tag(BlockTag),
    /// Integer
    Number(u64),
    /// String with format: 0x{felt252}
    Hash(Felt252),
}

impl From<BlockTag> for BlockValue {
    fn from(value: BlockTag) -> Self {
        BlockValue::Tag(value)
    }
}

impl From<u64> for BlockValue {
    fn from(value: u64) -> Self {
        BlockValue::Number(value)
    }
}

impl From<Felt252> for BlockValue {
    fn from(value: Felt252) -> Self {
        BlockValue::Hash(value)
    }
}

impl BlockValue {
    pub fn to_value(self) -> serde_json::Value {
        match self {
            BlockValue::Tag(block_tag) => block_tag.to_string().into(),
            BlockValue::Number(block_number) => json!({ "block_number": block_number }),
            BlockValue::Hash(block_hash) => json!({ "block_hash": format!("{block_hash:#x}") }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// A RPC response.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

impl RpcState {
    pub fn new(rpc_endpoint: &str, block: BlockValue) -> Self {
        Self {
            rpc_endpoint: rpc_endpoint.to_string(),
            block,
        }
    }

    /// Endpoint from `KAKAROT_RPC_URL`, loading `.env` when the variable is not set.
    pub fn new_rpc(block: BlockValue) -> Result<Self, RpcStateError> {
        if env::var(RPC_URL_ENV).is_err() {
            dotenv().map_err(|_| RpcStateError::MissingEnvFile)?;
        }
        let rpc_endpoint = env::var(RPC_URL_ENV).map_err(|_| RpcStateError::MissingRpcEndpoint)?;
        Ok(Self::new(&rpc_endpoint, block))
    }

    pub fn from_config(config: &NetworkConfig, block: BlockValue) -> Result<Self, RpcStateError> {
        let rpc_endpoint = config
            .require_rpc_url()
            .map_err(|_| RpcStateError::MissingRpcEndpoint)?;
        Ok(Self::new(rpc_endpoint, block))
    }

    pub fn rpc_endpoint(&self) -> &str {
        &self.rpc_endpoint
    }

    fn rpc_call_result<T: for<'a> Deserialize<'a>>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, RpcStateError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        debug!(method, %params, "rpc call");
        let response = self.rpc_call_no_deserialize(&payload)?.into_json()?;
        parse_response(response)
    }

    fn rpc_call_no_deserialize(
        &self,
        params: &serde_json::Value,
    ) -> Result<ureq::Response, RpcStateError> {
        ureq::post(&self.rpc_endpoint)
            .set("Content-Type", "application/json")
            .set("accept", "application/json")
            .send_json(params)
            .map_err(|err| match err {
                ureq::Error::Transport(_) => RpcStateError::RpcConnectionNotAvailable,
                err => RpcStateError::Request(err.to_string()),
            })
    }

    fn felt_result(&self, method: &str, params: &serde_json::Value) -> Result<Felt252, RpcStateError> {
        let value: String = self.rpc_call_result(method, params)?;
        parse_felt(&value)
    }

    pub fn get_class_hash_at(&self, contract_address: &Address) -> Result<ClassHash, RpcStateError> {
        self.felt_result(
            "starknet_getClassHashAt",
            &json!([self.block.to_value(), format!("{:#x}", contract_address.0)]),
        )
        .map(ClassHash::from)
    }

    pub fn get_nonce_at(&self, contract_address: &Address) -> Result<Felt252, RpcStateError> {
        self.felt_result(
            "starknet_getNonce",
            &json!([self.block.to_value(), format!("{:#x}", contract_address.0)]),
        )
    }

    pub fn get_storage_at(
        &self,
        contract_address: &Address,
        key: &Felt252,
    ) -> Result<Felt252, RpcStateError> {
        self.felt_result(
            "starknet_getStorageAt",
            &json!([
                format!("{:#x}", contract_address.0),
                format!("{key:#x}"),
                self.block.to_value()
            ]),
        )
    }

    /// Whether `class_hash` can be fetched at the configured block.
    pub fn is_class_declared(&self, class_hash: &ClassHash) -> Result<bool, RpcStateError> {
        let result = self.rpc_call_result::<serde_json::Value>(
            "starknet_getClass",
            &json!([self.block.to_value(), format!("{:#x}", class_hash.to_felt())]),
        );
        match result {
            Ok(_) => Ok(true),
            Err(err) if err.is_rpc_error(CLASS_HASH_NOT_FOUND) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Read-only call of `entry_point_selector` on `contract_address`.
    pub fn call(
        &self,
        contract_address: &Address,
        entry_point_selector: Felt252,
        calldata: &[Felt252],
    ) -> Result<Vec<Felt252>, RpcStateError> {
        let request = json!({
            "contract_address": format!("{:#x}", contract_address.0),
            "entry_point_selector": format!("{entry_point_selector:#x}"),
            "calldata": calldata.iter().map(|felt| format!("{felt:#x}")).collect::<Vec<_>>(),
        });
        let result: Vec<String> =
            self.rpc_call_result("starknet_call", &json!([request, self.block.to_value()]))?;
        result.iter().map(|value| parse_felt(value)).collect()
    }

    pub fn block_number(&self) -> Result<u64, RpcStateError> {
        self.rpc_call_result("starknet_blockNumber", &json!([]))
    }
}

fn parse_response<T: for<'a> Deserialize<'a>>(
    response: serde_json::Value,
) -> Result<T, RpcStateError> {
    let response: RpcResponse<T> =
        serde_json::from_value(response).map_err(|err| RpcStateError::RpcCall(err.to_string()))?;
    match (response.result, response.error) {
        (_, Some(RpcErrorObject { code, message })) => Err(RpcStateError::Rpc { code, message }),
        (Some(result), None) => Ok(result),
        (None, None) => Err(RpcStateError::MissingRpcResponseField("result".into())),
    }
}

fn parse_felt(value: &str) -> Result<Felt252, RpcStateError> {
    string_to_felt(value).map_err(|_| RpcStateError::RpcResponseWrongType(value.to_string()))
}

impl StateReader for RpcState {
    fn get_class_hash_at(&self, contract_address: &Address) -> Result<ClassHash, StateError> {
        match RpcState::get_class_hash_at(self, contract_address) {
            Err(err) if err.is_rpc_error(CONTRACT_NOT_FOUND) => {
                Err(StateError::NoneContractState(*contract_address))
            }
            result => Ok(result?),
        }
    }

    fn get_nonce_at(&self, contract_address: &Address) -> Result<Felt252, StateError> {
        match RpcState::get_nonce_at(self, contract_address) {
            // Not deployed yet.
            Err(err) if err.is_rpc_error(CONTRACT_NOT_FOUND) => Ok(Felt252::ZERO),
            result => Ok(result?),
        }
    }

    fn get_storage_at(&self, storage_entry: &StorageEntry) -> Result<Felt252, StateError> {
        let (contract_address, key) = storage_entry;
        match RpcState::get_storage_at(self, contract_address, &Felt252::from_bytes_be(key)) {
            Err(err) if err.is_rpc_error(CONTRACT_NOT_FOUND) => {
                Err(StateError::NoneContractState(*contract_address))
            }
            result => Ok(result?),
        }
    }

    fn is_class_declared(&self, class_hash: &ClassHash) -> Result<bool, StateError> {
        Ok(RpcState::is_class_declared(self, class_hash)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;
    use test_case::test_case;

    #[test_case(BlockTag::Latest.into(), json!("latest"))]
    #[test_case(BlockTag::Pending.into(), json!("pending"))]
    #[test_case(42u64.into(), json!({ "block_number": 42 }))]
    #[test_case(Felt252::from(0xabcu64).into(), json!({ "block_hash": "0xabc" }))]
    fn block_value_to_json(block: BlockValue, expected: serde_json::Value) {
        assert_eq!(block.to_value(), expected);
    }

    #[test]
    fn parses_result() {
        let felt: String = parse_response(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x1234"
        }))
        .unwrap();
        assert_eq!(parse_felt(&felt).unwrap(), Felt252::from(0x1234u64));
    }

    #[test]
    fn parses_rpc_error() {
        let err = parse_response::<String>(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 20, "message": "Contract not found" }
        }))
        .unwrap_err();

        assert!(err.is_rpc_error(CONTRACT_NOT_FOUND));
        assert!(!err.is_rpc_error(CLASS_HASH_NOT_FOUND));
        assert_eq!(err.to_string(), "RPC error 20: Contract not found");
    }

    #[test]
    fn rejects_response_without_result() {
        assert!(matches!(
            parse_response::<String>(json!({ "jsonrpc": "2.0", "id": 1 })),
            Err(RpcStateError::MissingRpcResponseField(field)) if field == "result"
        ));
    }

    #[test]
    fn rejects_non_felt_values() {
        assert!(matches!(
            parse_felt("not a felt"),
            Err(RpcStateError::RpcResponseWrongType(_))
        ));
    }

    #[test]
    fn unreachable_endpoint_is_reported() {
        let state = RpcState::new("http://127.0.0.1:1", BlockTag::Latest.into());
        assert!(matches!(
            state.get_nonce_at(&Address(Felt252::ONE)),
            Err(RpcStateError::RpcConnectionNotAvailable)
        ));
    }
}
