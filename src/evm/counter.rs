use super::{abi::ICounter, EvmContext, EvmProgram};
use crate::core::errors::evm_errors::EvmError;
use alloy_primitives::U256;
use alloy_sol_types::{SolCall, SolInterface};

const COUNT_SLOT: U256 = U256::ZERO;

/// `PlainOpcodes/Counter`: a single counter in slot 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterProgram;

impl EvmProgram for CounterProgram {
    fn group(&self) -> &'static str {
        "PlainOpcodes"
    }

    fn name(&self) -> &'static str {
        "Counter"
    }

    fn execute(&self, ctx: &mut EvmContext<'_, '_>, input: &[u8]) -> Result<Vec<u8>, EvmError> {
        let count = ctx.sload(COUNT_SLOT)?;

        match ICounter::ICounterCalls::abi_decode(input, true)? {
            ICounter::ICounterCalls::count(_) => {
                Ok(ICounter::countCall::abi_encode_returns(&(count,)))
            }
            ICounter::ICounterCalls::inc(_) => {
                ctx.sstore(COUNT_SLOT, count.saturating_add(U256::from(1u64)))?;
                Ok(Vec::new())
            }
            ICounter::ICounterCalls::dec(_) => {
                if count.is_zero() {
                    return Err(EvmError::Revert(
                        "count should be strictly greater than 0".to_string(),
                    ));
                }
                ctx.sstore(COUNT_SLOT, count - U256::from(1u64))?;
                Ok(Vec::new())
            }
            ICounter::ICounterCalls::reset(_) => {
                ctx.sstore(COUNT_SLOT, U256::ZERO)?;
                Ok(Vec::new())
            }
        }
    }
}
