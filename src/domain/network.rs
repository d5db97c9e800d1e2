//! Per-network contract deployments keyed by chain id

use std::collections::BTreeMap;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Deserializer};

use super::TodoError;

/// A single contract deployment entry (`{ "address": "0x…" }`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContractEntry {
    /// A blank address counts as not deployed
    #[serde(default, deserialize_with = "deserialize_optional_address")]
    pub address: Option<Address>,
}

fn deserialize_optional_address<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Address>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Contracts deployed on one chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetworkEntry {
    #[serde(rename = "TodoWeb3", default)]
    pub todo_web3: Option<ContractEntry>,
}

/// The resolved deployment for the connected chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedNetwork {
    pub chain_id: u64,
    pub todo_web3: Address,
}

/// Mapping from chain id to deployments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkConfig {
    entries: BTreeMap<u64, NetworkEntry>,
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fallback used when no networks file is configured: the first
    /// deployment address of a fresh local dev chain.
    pub fn builtin() -> Self {
        let mut config = Self::new();
        config.insert(31_337, address!("5FbDB2315678afecb367f032d93F642f64180aa3"));
        config
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, chain_id: u64, todo_web3: Address) {
        self.entries.insert(
            chain_id,
            NetworkEntry {
                todo_web3: Some(ContractEntry {
                    address: Some(todo_web3),
                }),
            },
        );
    }

    pub fn insert_entry(&mut self, chain_id: u64, entry: NetworkEntry) {
        self.entries.insert(chain_id, entry);
    }

    /// Chains with a usable TodoWeb3 deployment, ascending
    pub fn supported_chain_ids(&self) -> Vec<u64> {
        self.entries
            .keys()
            .copied()
            .filter(|chain_id| self.resolve(*chain_id).is_ok())
            .collect()
    }

    /// Look up the TodoWeb3 deployment for `chain_id`.
    ///
    /// A missing entry and an entry without a TodoWeb3 address are both
    /// unsupported.
    pub fn resolve(&self, chain_id: u64) -> Result<ResolvedNetwork, TodoError> {
        let todo_web3 = self
            .entries
            .get(&chain_id)
            .and_then(|entry| entry.todo_web3.as_ref())
            .and_then(|contract| contract.address)
            .ok_or(TodoError::UnsupportedNetwork { chain_id })?;

        Ok(ResolvedNetwork {
            chain_id,
            todo_web3,
        })
    }
}

impl<'de> Deserialize<'de> for NetworkConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, NetworkEntry>::deserialize(deserializer)?;
        let mut entries = BTreeMap::new();
        for (key, entry) in raw {
            let chain_id = parse_chain_id(&key)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid chain id key {key:?}")))?;
            entries.insert(chain_id, entry);
        }
        Ok(Self { entries })
    }
}

/// Parse a chain id written as decimal or 0x-prefixed hex
pub fn parse_chain_id(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => trimmed.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "31337": { "TodoWeb3": { "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3" } },
        "0xaa36a7": { "TodoWeb3": { "address": "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512" } },
        "5": { "Other": { "address": "0x0000000000000000000000000000000000000001" } },
        "10": { "TodoWeb3": {} }
    }"#;

    #[test]
    fn test_resolve_known_chain() {
        let config = NetworkConfig::from_json(SAMPLE).unwrap();
        let network = config.resolve(31337).unwrap();
        assert_eq!(network.chain_id, 31337);
        assert_eq!(
            network.todo_web3,
            address!("5FbDB2315678afecb367f032d93F642f64180aa3")
        );
    }

    #[test]
    fn test_hex_key() {
        let config = NetworkConfig::from_json(SAMPLE).unwrap();
        assert!(config.resolve(11_155_111).is_ok());
    }

    #[test]
    fn test_unknown_chain_is_unsupported() {
        let config = NetworkConfig::new();
        assert_eq!(
            config.resolve(999),
            Err(TodoError::UnsupportedNetwork { chain_id: 999 })
        );
    }

    #[test]
    fn test_entry_without_todo_address_is_unsupported() {
        let config = NetworkConfig::from_json(SAMPLE).unwrap();
        assert_eq!(
            config.resolve(5),
            Err(TodoError::UnsupportedNetwork { chain_id: 5 })
        );
        assert_eq!(
            config.resolve(10),
            Err(TodoError::UnsupportedNetwork { chain_id: 10 })
        );
    }

    #[test]
    fn test_blank_address_on_other_chain_is_unsupported() {
        let config = NetworkConfig::from_json(
            r#"{
                "31337": { "TodoWeb3": { "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3" } },
                "5": { "TodoWeb3": { "address": "" } }
            }"#,
        )
        .unwrap();
        assert!(config.resolve(31_337).is_ok());
        assert_eq!(
            config.resolve(5),
            Err(TodoError::UnsupportedNetwork { chain_id: 5 })
        );
        assert_eq!(config.supported_chain_ids(), vec![31_337]);
    }

    #[test]
    fn test_malformed_address_rejected() {
        assert!(NetworkConfig::from_json(r#"{ "1": { "TodoWeb3": { "address": "0x12" } } }"#).is_err());
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(NetworkConfig::from_json(r#"{ "sepolia": {} }"#).is_err());
    }

    #[test]
    fn test_parse_chain_id() {
        assert_eq!(parse_chain_id("1"), Some(1));
        assert_eq!(parse_chain_id("0x7a69"), Some(31337));
        assert_eq!(parse_chain_id("mainnet"), None);
    }

    #[test]
    fn test_builtin_covers_dev_chain() {
        let config = NetworkConfig::builtin();
        assert!(config.resolve(31_337).is_ok());
        assert!(config.resolve(11_155_111).is_err());
    }
}
