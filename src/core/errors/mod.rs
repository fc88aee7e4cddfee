pub mod evm_errors;
pub mod kakarot_errors;
pub mod state_errors;
pub mod transaction_errors;
