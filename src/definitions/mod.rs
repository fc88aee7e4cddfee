pub mod constants;
pub mod network_config;
