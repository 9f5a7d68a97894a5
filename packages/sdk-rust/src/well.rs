//! [`Well`]: a lazily populated handle to one Well on the ledger.
//!
//! Static configuration is fetched on first use and kept for the lifetime
//! of the handle. Three raw reads back the six configuration getters:
//!
//! | raw read            | populates                                           |
//! |---------------------|-----------------------------------------------------|
//! | `name()`            | `name`                                              |
//! | LP token metadata   | `lp_token`                                          |
//! | `well()`            | `tokens`, `well_function`, `pumps`, `well_data`, `aquifer` |
//!
//! Each read runs at most once per handle on success. Concurrent callers
//! that miss the cache wait on a per-read gate and find the field resident
//! when they get through, so they join the in-flight fetch instead of
//! issuing their own. A failed read leaves every field absent; the next
//! caller retries.
//!
//! Reserves are the only mutable state and are re-read on every
//! [`Well::reserves`] call.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use alloy_primitives::{Address, Bytes};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    components::{Aquifer, Pump, WellFunction},
    error::{Error, Result},
    ledger::WellLedger,
    once::WriteOnce,
    token::{Token, TokenRegistry, TokenValue},
    validate::validate_address,
};

// ─── Preload selection ────────────────────────────────────────────────────────

/// Which fields [`Well::load_well`] should make resident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadOptions {
    pub name:          bool,
    pub lp_token:      bool,
    pub tokens:        bool,
    pub well_function: bool,
    pub pumps:         bool,
    pub aquifer:       bool,
    pub reserves:      bool,
}

/// An underlying ledger read performed by [`Well::load_well`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawRead {
    Name,
    LpToken,
    Definition,
    Reserves,
}

impl PreloadOptions {
    pub fn all() -> Self {
        Self {
            name:          true,
            lp_token:      true,
            tokens:        true,
            well_function: true,
            pumps:         true,
            aquifer:       true,
            reserves:      true,
        }
    }

    /// Deduplicated raw reads that satisfy this selection, in issue order.
    /// `Reserves` is always last: it runs only after the others settle.
    pub fn plan(&self) -> Vec<RawRead> {
        let mut reads = Vec::with_capacity(4);
        if self.name {
            reads.push(RawRead::Name);
        }
        if self.lp_token {
            reads.push(RawRead::LpToken);
        }
        if self.tokens || self.well_function || self.pumps || self.aquifer {
            reads.push(RawRead::Definition);
        }
        if self.reserves {
            reads.push(RawRead::Reserves);
        }
        reads
    }
}

/// Everything the combined configuration read yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellDetails {
    pub tokens:        Arc<[Token]>,
    pub well_function: WellFunction,
    pub pumps:         Arc<[Pump]>,
    pub well_data:     Bytes,
    pub aquifer:       Aquifer,
}

// ─── Well ─────────────────────────────────────────────────────────────────────

/// Shared, lazily loaded handle to a Well.
///
/// Cheap to construct (no I/O). Wrap in an `Arc` to share between tasks;
/// every holder sees the same cached fields.
pub struct Well {
    address:  Address,
    pub(crate) ledger: Arc<dyn WellLedger>,
    registry: Arc<TokenRegistry>,

    name:          WriteOnce<String>,
    lp_token:      WriteOnce<Token>,
    tokens:        WriteOnce<Arc<[Token]>>,
    well_function: WriteOnce<WellFunction>,
    pumps:         WriteOnce<Arc<[Pump]>>,
    well_data:     WriteOnce<Bytes>,
    aquifer:       WriteOnce<Aquifer>,
    reserves:      RwLock<Option<Arc<[TokenValue]>>>,

    name_gate:       Mutex<()>,
    lp_token_gate:   Mutex<()>,
    definition_gate: Mutex<()>,
}

impl Well {
    /// Bind a handle to `address`. Fails only for the zero address.
    pub fn new(ledger: Arc<dyn WellLedger>, address: Address) -> Result<Self> {
        Self::with_registry(ledger, address, Arc::new(TokenRegistry::new()))
    }

    /// Like [`Well::new`], resolving tokens through a shared registry.
    pub fn with_registry(
        ledger:   Arc<dyn WellLedger>,
        address:  Address,
        registry: Arc<TokenRegistry>,
    ) -> Result<Self> {
        validate_address(&address, "address")?;
        Ok(Self {
            address,
            ledger,
            registry,
            name:            WriteOnce::new("name"),
            lp_token:        WriteOnce::new("lpToken"),
            tokens:          WriteOnce::new("tokens"),
            well_function:   WriteOnce::new("wellFunction"),
            pumps:           WriteOnce::new("pumps"),
            well_data:       WriteOnce::new("wellData"),
            aquifer:         WriteOnce::new("aquifer"),
            reserves:        RwLock::new(None),
            name_gate:       Mutex::new(()),
            lp_token_gate:   Mutex::new(()),
            definition_gate: Mutex::new(()),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn ledger(&self) -> &Arc<dyn WellLedger> {
        &self.ledger
    }

    // ── Bulk load ─────────────────────────────────────────────────────────────

    /// Make the selected fields resident; `None` selects everything.
    ///
    /// Name, LP token and definition reads run concurrently. The reserves
    /// read is issued only after they settle, so the token list it is
    /// aligned against is never being populated at the same time.
    pub async fn load_well(&self, options: Option<PreloadOptions>) -> Result<()> {
        let plan = options.unwrap_or_else(PreloadOptions::all).plan();
        debug!(well = %self.address, ?plan, "load_well");

        tokio::try_join!(
            async {
                if plan.contains(&RawRead::Name) {
                    self.name().await?;
                }
                Ok::<_, Error>(())
            },
            async {
                if plan.contains(&RawRead::LpToken) {
                    self.lp_token().await?;
                }
                Ok::<_, Error>(())
            },
            async {
                if plan.contains(&RawRead::Definition) {
                    self.ensure_definition().await?;
                }
                Ok::<_, Error>(())
            },
        )?;

        if plan.contains(&RawRead::Reserves) {
            self.reserves().await?;
        }
        Ok(())
    }

    // ── Getters ───────────────────────────────────────────────────────────────

    pub async fn name(&self) -> Result<String> {
        if let Some(name) = self.name.get() {
            return Ok(name.clone());
        }
        let _gate = self.name_gate.lock().await;
        if let Some(name) = self.name.get() {
            return Ok(name.clone());
        }
        debug!(well = %self.address, "reading name");
        let name = self.ledger.name(self.address).await?;
        Ok(self.name.set(name)?.clone())
    }

    /// The Well's own LP token. Its decimals and symbol come from the ledger.
    pub async fn lp_token(&self) -> Result<Token> {
        if let Some(token) = self.lp_token.get() {
            return Ok(token.clone());
        }
        let _gate = self.lp_token_gate.lock().await;
        if let Some(token) = self.lp_token.get() {
            return Ok(token.clone());
        }
        debug!(well = %self.address, "reading LP token metadata");
        let token = self.registry.load(self.ledger.as_ref(), self.address).await?;
        Ok(self.lp_token.set(token)?.clone())
    }

    /// Paired tokens in ledger order. Every amount array is indexed against
    /// this order.
    pub async fn tokens(&self) -> Result<Arc<[Token]>> {
        self.ensure_definition().await?;
        resident(&self.tokens)
    }

    /// The pricing formula reference.
    pub async fn well_function(&self) -> Result<WellFunction> {
        self.ensure_definition().await?;
        resident(&self.well_function)
    }

    /// Reserve-observing contracts; possibly empty.
    pub async fn pumps(&self) -> Result<Arc<[Pump]>> {
        self.ensure_definition().await?;
        resident(&self.pumps)
    }

    /// Opaque immutable data the Well was bored with.
    pub async fn well_data(&self) -> Result<Bytes> {
        self.ensure_definition().await?;
        resident(&self.well_data)
    }

    /// The factory that created this Well.
    pub async fn aquifer(&self) -> Result<Aquifer> {
        self.ensure_definition().await?;
        resident(&self.aquifer)
    }

    /// Tokens, well function, pumps, well data and aquifer from the single
    /// combined read.
    pub async fn details(&self) -> Result<WellDetails> {
        self.ensure_definition().await?;
        Ok(WellDetails {
            tokens:        resident(&self.tokens)?,
            well_function: resident(&self.well_function)?,
            pumps:         resident(&self.pumps)?,
            well_data:     resident(&self.well_data)?,
            aquifer:       resident(&self.aquifer)?,
        })
    }

    /// Read current reserves, converted with each token's own decimals, and
    /// remember them as the latest snapshot.
    pub async fn reserves(&self) -> Result<Vec<TokenValue>> {
        let tokens = self.tokens().await?;
        debug!(well = %self.address, "reading reserves");
        let raw = self.ledger.reserves(self.address).await?;
        if raw.len() != tokens.len() {
            return Err(Error::unavailable(format!(
                "well {} returned {} reserves for {} tokens",
                self.address,
                raw.len(),
                tokens.len()
            )));
        }
        let values = tokens
            .iter()
            .zip(raw)
            .map(|(token, amount)| token.from_raw(amount))
            .collect::<Result<Vec<_>>>()?;
        *self.reserves.write().unwrap_or_else(PoisonError::into_inner) = Some(values.clone().into());
        Ok(values)
    }

    // ── Resident views (no I/O) ───────────────────────────────────────────────

    pub fn cached_name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    pub fn cached_lp_token(&self) -> Option<&Token> {
        self.lp_token.get()
    }

    pub fn cached_tokens(&self) -> Option<&[Token]> {
        self.tokens.get().map(|t| &t[..])
    }

    pub fn cached_well_function(&self) -> Option<&WellFunction> {
        self.well_function.get()
    }

    pub fn cached_pumps(&self) -> Option<&[Pump]> {
        self.pumps.get().map(|p| &p[..])
    }

    pub fn cached_aquifer(&self) -> Option<&Aquifer> {
        self.aquifer.get()
    }

    /// Last reserves snapshot taken by [`Well::reserves`].
    pub fn cached_reserves(&self) -> Option<Arc<[TokenValue]>> {
        self.reserves.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    // ── Write-once population ─────────────────────────────────────────────────

    fn definition_resident(&self) -> bool {
        self.tokens.is_set()
            && self.well_function.is_set()
            && self.pumps.is_set()
            && self.well_data.is_set()
            && self.aquifer.is_set()
    }

    async fn ensure_definition(&self) -> Result<()> {
        if self.definition_resident() {
            return Ok(());
        }
        let _gate = self.definition_gate.lock().await;
        if self.definition_resident() {
            return Ok(());
        }

        debug!(well = %self.address, "reading well definition");
        let definition = self.ledger.well(self.address).await?;
        if definition.tokens.len() < 2 {
            return Err(Error::unavailable(format!(
                "well {} reports {} tokens",
                self.address,
                definition.tokens.len()
            )));
        }

        // Resolve everything before touching a field so a failure part-way
        // leaves the aggregate absent.
        let mut tokens = Vec::with_capacity(definition.tokens.len());
        for address in &definition.tokens {
            tokens.push(self.registry.load(self.ledger.as_ref(), *address).await?);
        }
        let pumps: Vec<Pump> = definition.pumps.into_iter().map(Pump::from).collect();

        self.tokens.set(tokens.into())?;
        self.well_function.set(WellFunction::from(definition.well_function))?;
        self.pumps.set(pumps.into())?;
        self.well_data.set(definition.well_data)?;
        self.aquifer.set(Aquifer::new(definition.aquifer))?;

        info!(
            well    = %self.address,
            tokens  = self.tokens.get().map_or(0, |t| t.len()),
            pumps   = self.pumps.get().map_or(0, |p| p.len()),
            aquifer = %definition.aquifer,
            "well definition loaded"
        );
        Ok(())
    }
}

fn resident<T: Clone>(cell: &WriteOnce<T>) -> Result<T> {
    cell.get()
        .cloned()
        .ok_or_else(|| Error::unavailable(format!("`{}` is not loaded", cell.field())))
}

impl fmt::Debug for Well {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Well")
            .field("address", &self.address)
            .field("name", &self.name)
            .field("lp_token", &self.lp_token)
            .field("tokens", &self.tokens)
            .field("well_function", &self.well_function)
            .field("pumps", &self.pumps)
            .field("aquifer", &self.aquifer)
            .finish_non_exhaustive()
    }
}
