use crate::core::errors::{kakarot_errors::KakarotError, state_errors::StateError};
use alloy_primitives::{Address as EvmAddress, B256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvmError {
    #[error("execution reverted: {0}")]
    Revert(String),
    #[error("execution reverted: unable to decode calldata: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    #[error("execution reverted: no program for init code {0:?}")]
    UnknownArtifact(String),
    #[error("No program registered for code hash {code_hash} at {address}")]
    MissingProgram { address: EvmAddress, code_hash: B256 },
    #[error("Max call depth {0} exceeded")]
    CallDepthExceeded(usize),
    #[error(transparent)]
    Kakarot(#[from] KakarotError),
}

impl EvmError {
    /// Whether the failure only reverts the current frame instead of aborting the transaction.
    pub fn is_revert(&self) -> bool {
        matches!(
            self,
            EvmError::Revert(_)
                | EvmError::Abi(_)
                | EvmError::UnknownArtifact(_)
                | EvmError::CallDepthExceeded(_)
        )
    }

    /// Reason reported in a reverted receipt.
    pub fn revert_reason(&self) -> String {
        match self {
            EvmError::Revert(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl From<StateError> for EvmError {
    fn from(err: StateError) -> Self {
        EvmError::Kakarot(KakarotError::State(err))
    }
}
