//! Transport configuration.

use std::path::Path;
use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the ledger node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint.
    pub url:          String,
    pub timeout_secs: u64,
    /// Sender for writes when the call's overrides carry no `from`.
    pub default_from: Option<Address>,
    pub chain_id:     Option<u64>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url:          DEFAULT_RPC_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_from: None,
            chain_id:     None,
        }
    }
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Self::default() }
    }

    /// Parse a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("invalid config: {e}")))
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::Config("rpc url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!("rpc url '{url}' must be http(s)")));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".into()));
        }
        if matches!(self.default_from, Some(from) if from.is_zero()) {
            return Err(Error::Config("default_from is the zero address".into()));
        }
        Ok(())
    }
}
