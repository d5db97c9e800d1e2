use std::fs;
use std::path::{Path, PathBuf};

use alloy::primitives::{address, Address};
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::NetworkConfig;

/// Fixed Simple store deployment; not looked up per network
pub const DEFAULT_SIMPLE_ADDRESS: Address = address!("dd1E4C96faee94f34CA66A80D0c1A83879a8dE29");

pub const DEFAULT_RPC: &str = "http://127.0.0.1:8545";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP JSON-RPC endpoint
    pub rpc: Option<String>,

    /// Hex private key used to sign writes
    pub private_key: Option<String>,

    /// Unlocked node account used when no private key is set
    pub account: Option<Address>,

    /// Path to the networks JSON (chain id -> TodoWeb3 address)
    pub networks: Option<String>,

    pub simple_address: Option<Address>,

    /// Parallel `tasks(id)` reads while loading; 1 keeps them sequential
    pub fetch_concurrency: Option<usize>,
}

impl Config {
    pub fn rpc_or_default(&self) -> String {
        self.rpc
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RPC.to_string())
    }

    pub fn simple_address_or_default(&self) -> Address {
        self.simple_address.unwrap_or(DEFAULT_SIMPLE_ADDRESS)
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), %err, "ignoring unreadable config");
        Config::default()
    })
}

pub fn parse(content: &str) -> Result<Config> {
    toml::from_str::<Config>(content).context("parse config")
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TODO_WEB3_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("todo-web3").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("todo-web3").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "todo-web3", "todo-web3")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the networks JSON, or the built-in table when no path is given
pub fn load_networks(path: Option<&Path>) -> Result<NetworkConfig> {
    let Some(path) = path else {
        return Ok(NetworkConfig::builtin());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("read networks {}", path.display()))?;
    NetworkConfig::from_json(&content)
        .with_context(|| format!("parse networks {}", path.display()))
}

/// Expand a leading `~/` against `$HOME`
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
