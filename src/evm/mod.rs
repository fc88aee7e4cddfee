//! EVM execution on top of Kakarot accounts.
//!
//! The devnet does not interpret bytecode: every contract account points, via
//! its code hash, to an [EvmProgram] implemented natively. The code hash of a
//! program is the keccak of its artifact id (`group/name`), which is also the
//! init code a deployment transaction carries.

pub mod abi;
pub mod caller;
pub mod context;
pub mod counter;
pub mod transaction;

pub use caller::CallerProgram;
pub use context::{Environment, EvmContext};
pub use counter::CounterProgram;
pub use transaction::{EvmTransaction, SignedTransaction};

use crate::core::errors::evm_errors::EvmError;
use alloy_primitives::{keccak256, B256};
use std::{collections::HashMap, fmt, sync::Arc};

pub const MAX_CALL_DEPTH: usize = 1024;

/// A contract the devnet can run.
pub trait EvmProgram: fmt::Debug + Send + Sync {
    /// Group of the artifact, e.g. `PlainOpcodes`.
    fn group(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Runs the program on `input`, the calldata of the current frame.
    fn execute(&self, ctx: &mut EvmContext<'_, '_>, input: &[u8]) -> Result<Vec<u8>, EvmError>;
}

pub fn artifact_id(group: &str, name: &str) -> String {
    format!("{group}/{name}")
}

pub fn code_hash(group: &str, name: &str) -> B256 {
    keccak256(artifact_id(group, name))
}

/// Programs available to deploy, by code hash.
#[derive(Debug, Clone, Default)]
pub struct ProgramRegistry {
    programs: HashMap<B256, Arc<dyn EvmProgram>>,
}

impl ProgramRegistry {
    /// Registry with every `PlainOpcodes` program the harness deploys.
    pub fn plain_opcodes() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(CounterProgram));
        registry.register(Arc::new(CallerProgram));
        registry
    }

    pub fn register(&mut self, program: Arc<dyn EvmProgram>) -> B256 {
        let code_hash = code_hash(program.group(), program.name());
        self.programs.insert(code_hash, program);
        code_hash
    }

    pub fn get(&self, code_hash: &B256) -> Option<&Arc<dyn EvmProgram>> {
        self.programs.get(code_hash)
    }

    pub fn contains(&self, group: &str, name: &str) -> bool {
        self.programs.contains_key(&code_hash(group, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_opcodes_programs_are_registered() {
        let registry = ProgramRegistry::plain_opcodes();
        assert!(registry.contains("PlainOpcodes", "Counter"));
        assert!(registry.contains("PlainOpcodes", "Caller"));
        assert!(!registry.contains("PlainOpcodes", "PlainOpcodes"));

        let program = registry.get(&code_hash("PlainOpcodes", "Counter")).unwrap();
        assert_eq!(program.name(), "Counter");
    }
}
