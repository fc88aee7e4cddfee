use kakarot_e2e::core::errors::state_errors::StateError;
use thiserror::Error;

/// JSON-RPC error code for an unknown contract address.
pub const CONTRACT_NOT_FOUND: i64 = 20;
/// JSON-RPC error code for an unknown class hash.
pub const CLASS_HASH_NOT_FOUND: i64 = 28;

#[derive(Debug, Error)]
pub enum RpcStateError {
    #[error("Missing .env file")]
    MissingEnvFile,
    #[error("Missing rpc endpoint")]
    MissingRpcEndpoint,
    #[error("RPC connection not available")]
    RpcConnectionNotAvailable,
    #[error("Request failed with error: {0}")]
    Request(String),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("RPC call failed with error: {0}")]
    RpcCall(String),
    #[error("Missing field {0} in rpc response")]
    MissingRpcResponseField(String),
    #[error("Wrong type for {0} in rpc response")]
    RpcResponseWrongType(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RpcStateError {
    pub fn is_rpc_error(&self, expected: i64) -> bool {
        matches!(self, RpcStateError::Rpc { code, .. } if *code == expected)
    }
}

impl From<RpcStateError> for StateError {
    fn from(err: RpcStateError) -> Self {
        StateError::CustomError(err.to_string())
    }
}
