// #![deny(warnings)]
#![forbid(unsafe_code)]

// Re-exports
pub use starknet_types_core::felt::Felt as Felt252;

pub mod core;
pub mod definitions;
pub mod evm;
pub mod kakarot;
pub mod network;
pub mod state;
pub mod testing;
pub mod utils;
