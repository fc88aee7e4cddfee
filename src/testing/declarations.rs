use super::HarnessError;
use crate::{
    definitions::{constants::DEVNET_DECLARED_CLASSES, network_config::NetworkConfig},
    utils::{calculate_sn_keccak, string_to_felt, ClassHash},
};
use lazy_static::lazy_static;
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

lazy_static! {
    static ref SESSION_DECLARATIONS: Result<Declarations, String> = NetworkConfig::from_env()
        .map_err(|err| err.to_string())
        .and_then(|config| Declarations::from_config(&config).map_err(|err| err.to_string()));
}

/// Every declared class hash, loaded once per test binary.
pub fn class_hashes() -> Result<&'static Declarations, HarnessError> {
    SESSION_DECLARATIONS
        .as_ref()
        .map_err(|err| HarnessError::Declarations(err.clone()))
}

/// Declared class hashes by role (`account_contract`, `Cairo1Helpers`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Declarations {
    class_hashes: HashMap<String, ClassHash>,
}

impl Declarations {
    /// Classes of the in-memory devnet: the class hash of a role is `sn_keccak(role)`.
    pub fn devnet() -> Self {
        let class_hashes = DEVNET_DECLARED_CLASSES
            .iter()
            .map(|role| (role.to_string(), ClassHash(calculate_sn_keccak(role.as_bytes()))))
            .collect();
        Self { class_hashes }
    }

    /// Parses `{ "role": "0x<class hash>" }`.
    pub fn from_json(json: &str) -> Result<Self, HarnessError> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let class_hashes = raw
            .into_iter()
            .map(|(role, class_hash)| -> Result<(String, ClassHash), HarnessError> {
                Ok((role, string_to_felt(&class_hash)?.into()))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { class_hashes })
    }

    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        debug!(path = %path.display(), "loading declarations");
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self, HarnessError> {
        match config.declarations_path() {
            Some(path) => Self::from_file(path),
            None => Ok(Self::devnet()),
        }
    }

    pub fn get(&self, role: &str) -> Result<ClassHash, HarnessError> {
        self.class_hashes
            .get(role)
            .copied()
            .ok_or_else(|| HarnessError::MissingDeclaration(role.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassHash)> {
        self.class_hashes
            .iter()
            .map(|(role, class_hash)| (role.as_str(), class_hash))
    }

    pub fn len(&self) -> usize {
        self.class_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class_hashes.is_empty()
    }
}
