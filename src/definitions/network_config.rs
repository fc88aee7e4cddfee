//! # Network configuration
//!
//! Where the harness finds its network and declarations. Values come from the
//! environment (a `.env` file is loaded when present) and fall back to the
//! in-memory devnet defaults.

use super::constants::{DEFAULT_CHAIN_ID, DEFAULT_MAX_FEE};
use getset::{CopyGetters, Getters};
use std::{env, path::PathBuf};
use thiserror::Error;

pub const RPC_URL_ENV: &str = "KAKAROT_RPC_URL";
pub const DECLARATIONS_ENV: &str = "KAKAROT_DECLARATIONS";
pub const MAX_FEE_ENV: &str = "KAKAROT_MAX_FEE";
pub const CHAIN_ID_ENV: &str = "KAKAROT_CHAIN_ID";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
    #[error("{0} is not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint of a live node, unused by the devnet.
    #[getset(get = "pub")]
    rpc_url: Option<String>,
    /// JSON file mapping class roles to declared class hashes.
    #[getset(get = "pub")]
    declarations_path: Option<PathBuf>,
    #[getset(get_copy = "pub")]
    max_fee: u128,
    #[getset(get_copy = "pub")]
    chain_id: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            declarations_path: None,
            max_fee: DEFAULT_MAX_FEE,
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

impl NetworkConfig {
    pub fn new(
        rpc_url: Option<String>,
        declarations_path: Option<PathBuf>,
        max_fee: u128,
        chain_id: u64,
    ) -> Self {
        Self {
            rpc_url,
            declarations_path,
            max_fee,
            chain_id,
        }
    }

    /// Reads the configuration from the environment, loading `.env` first if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine, the variables may come from the shell.
        let _ = dotenv::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_fee = match lookup(MAX_FEE_ENV) {
            Some(value) => value
                .parse::<u128>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: MAX_FEE_ENV,
                    value,
                })?,
            None => defaults.max_fee,
        };
        let chain_id = match lookup(CHAIN_ID_ENV) {
            Some(value) => parse_chain_id(&value).ok_or(ConfigError::InvalidValue {
                name: CHAIN_ID_ENV,
                value,
            })?,
            None => defaults.chain_id,
        };

        Ok(Self {
            rpc_url: lookup(RPC_URL_ENV).filter(|url| !url.is_empty()),
            declarations_path: lookup(DECLARATIONS_ENV).map(PathBuf::from),
            max_fee,
            chain_id,
        })
    }

    pub fn require_rpc_url(&self) -> Result<&str, ConfigError> {
        self.rpc_url.as_deref().ok_or(ConfigError::Missing(RPC_URL_ENV))
    }
}

fn parse_chain_id(value: &str) -> Option<u64> {
    match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = NetworkConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, NetworkConfig::default());
        assert_matches!(
            config.require_rpc_url(),
            Err(ConfigError::Missing(RPC_URL_ENV))
        );
    }

    #[test]
    fn reads_every_variable() {
        let config = NetworkConfig::from_lookup(lookup_from(&[
            (RPC_URL_ENV, "http://127.0.0.1:5050/rpc"),
            (DECLARATIONS_ENV, "deployments/katana/declarations.json"),
            (MAX_FEE_ENV, "500"),
            (CHAIN_ID_ENV, "0x4b4b5254"),
        ]))
        .unwrap();

        assert_eq!(config.require_rpc_url().unwrap(), "http://127.0.0.1:5050/rpc");
        assert_eq!(
            config.declarations_path().as_deref(),
            Some(std::path::Path::new("deployments/katana/declarations.json"))
        );
        assert_eq!(config.max_fee(), 500);
        assert_eq!(config.chain_id(), DEFAULT_CHAIN_ID);
    }

    #[test]
    fn rejects_invalid_max_fee() {
        assert_matches!(
            NetworkConfig::from_lookup(lookup_from(&[(MAX_FEE_ENV, "lots")])),
            Err(ConfigError::InvalidValue { name: MAX_FEE_ENV, .. })
        );
    }

    #[test]
    fn empty_rpc_url_is_unset() {
        let config = NetworkConfig::from_lookup(lookup_from(&[(RPC_URL_ENV, "")])).unwrap();
        assert_eq!(config.rpc_url(), &None);
    }
}
