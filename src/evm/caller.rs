use super::{abi::ICaller, EvmContext, EvmProgram};
use crate::core::errors::evm_errors::EvmError;
use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolCall;
use tracing::debug;

/// `PlainOpcodes/Caller`: forwards `payload` to `target` and reports the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerProgram;

impl EvmProgram for CallerProgram {
    fn group(&self) -> &'static str {
        "PlainOpcodes"
    }

    fn name(&self) -> &'static str {
        "Caller"
    }

    fn execute(&self, ctx: &mut EvmContext<'_, '_>, input: &[u8]) -> Result<Vec<u8>, EvmError> {
        let ICaller::callCall { target, payload } = ICaller::callCall::abi_decode(input, true)?;

        let (success, return_data) = match ctx.call(target, U256::ZERO, &payload) {
            Ok(output) => (true, output),
            Err(err) if err.is_revert() => {
                debug!(%target, reason = %err, "forwarded call reverted");
                (false, err.revert_reason().into_bytes())
            }
            Err(err) => return Err(err),
        };

        Ok(ICaller::callCall::abi_encode_returns(&(
            success,
            Bytes::from(return_data),
        )))
    }
}
