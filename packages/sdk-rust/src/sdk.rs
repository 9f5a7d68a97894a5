//! [`WellsSdk`]: the main entry point for Well integrations.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::debug;

use crate::{
    config::RpcConfig,
    error::{Error, Result},
    ledger::WellLedger,
    rpc::JsonRpcLedger,
    token::{Token, TokenRegistry},
    validate::parse_address,
    well::{PreloadOptions, Well},
};

// ─── SDK ──────────────────────────────────────────────────────────────────────

/// Shared context for every [`Well`] handed out: one ledger connection and
/// one token registry, so a token seen by one Well is never re-read by
/// another.
///
/// ```rust,no_run
/// # use wells_sdk::{RpcConfig, WellsSdk};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let sdk  = WellsSdk::connect(&RpcConfig::default()).await?;
/// let well = sdk.load_well_str("0xBEA0e11282e2bB5893bEcE110cF199501e872bAd", None).await?;
/// println!("{} holds {} tokens", well.name().await?, well.tokens().await?.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WellsSdk {
    ledger:   Arc<dyn WellLedger>,
    registry: Arc<TokenRegistry>,
    chain_id: Option<u64>,
}

impl WellsSdk {
    /// Build an SDK over any ledger implementation.
    pub fn new(ledger: Arc<dyn WellLedger>) -> Self {
        Self {
            ledger,
            registry: Arc::new(TokenRegistry::new()),
            chain_id: None,
        }
    }

    /// Build an SDK talking JSON-RPC to the node described by `config`.
    pub fn from_config(config: &RpcConfig) -> Result<Self> {
        config.validate()?;
        let ledger = JsonRpcLedger::from_config(config)?;
        Ok(Self::new(Arc::new(ledger)).with_chain_id(config.chain_id))
    }

    /// [`WellsSdk::from_config`], then [`WellsSdk::verify_chain_id`].
    pub async fn connect(config: &RpcConfig) -> Result<Self> {
        let sdk = Self::from_config(config)?;
        sdk.verify_chain_id().await?;
        Ok(sdk)
    }

    /// Fail with [`Error::Config`] when the ledger serves a chain other than
    /// the configured one. No ledger call is made when no chain id is set.
    pub async fn verify_chain_id(&self) -> Result<()> {
        let Some(expected) = self.chain_id else {
            return Ok(());
        };
        let actual = self.ledger.chain_id().await?;
        if actual != expected {
            return Err(Error::Config(format!("ledger serves chain {actual}, expected chain {expected}")));
        }
        debug!(chain_id = actual, "chain id verified");
        Ok(())
    }

    /// Seed the registry with tokens known ahead of time.
    pub fn with_tokens(self, tokens: impl IntoIterator<Item = Token>) -> Self {
        for token in tokens {
            self.registry.insert(token);
        }
        self
    }

    pub fn with_chain_id(mut self, chain_id: Option<u64>) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn ledger(&self) -> &Arc<dyn WellLedger> {
        &self.ledger
    }

    pub fn registry(&self) -> &Arc<TokenRegistry> {
        &self.registry
    }

    // ── Wells ─────────────────────────────────────────────────────────────────

    /// A Well handle with an empty cache. No ledger call is made.
    pub fn well(&self, address: Address) -> Result<Well> {
        Well::with_registry(self.ledger.clone(), address, self.registry.clone())
    }

    /// A Well handle with the fields selected by `options` already resident
    /// (`None` loads everything).
    pub async fn load_well(&self, address: Address, options: Option<PreloadOptions>) -> Result<Well> {
        let well = self.well(address)?;
        debug!(well = %address, "preloading");
        well.load_well(options).await?;
        Ok(well)
    }

    /// [`WellsSdk::load_well`] for a textual address.
    pub async fn load_well_str(&self, address: &str, options: Option<PreloadOptions>) -> Result<Well> {
        let address = parse_address(address, "address")?;
        self.load_well(address, options).await
    }

    /// Resolve a token's metadata, from the registry when already known.
    pub async fn token(&self, address: Address) -> Result<Token> {
        self.registry.load(self.ledger.as_ref(), address).await
    }
}

impl std::fmt::Debug for WellsSdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WellsSdk")
            .field("chain_id", &self.chain_id)
            .field("known_tokens", &self.registry.len())
            .finish()
    }
}
