//! In-memory ledger for tests.
//!
//! [`MockLedger`] implements [`WellLedger`] over a fixed set of Wells and
//! tokens, records every raw call it receives, and can inject latency or
//! one-shot failures. Preview reads answer with configured values.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    ledger::{CallStruct, Overrides, PendingTx, WellCall, WellDefinition, WellLedger},
    token::TokenMetadata,
};

// ─── Recorded calls ───────────────────────────────────────────────────────────

/// One raw call as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    ChainId,
    Name { well: Address },
    TokenMetadata { token: Address },
    Well { well: Address },
    Reserves { well: Address },
    SwapOut { well: Address, from: Address, to: Address, amount_in: U256 },
    SwapIn { well: Address, from: Address, to: Address, amount_out: U256 },
    AddLiquidityOut { well: Address, amounts: Vec<U256> },
    RemoveLiquidityOut { well: Address, lp_amount_in: U256 },
    RemoveLiquidityOneTokenOut { well: Address, lp_amount_in: U256, token_out: Address },
    RemoveLiquidityImbalancedIn { well: Address, amounts: Vec<U256> },
    ShiftOut { well: Address, token_out: Address },
    Send { well: Address, call: WellCall, overrides: Overrides },
}

impl LedgerCall {
    /// Ledger method name, matching the keys accepted by
    /// [`MockLedger::fail_next`] and [`MockLedger::with_preview`].
    pub fn method(&self) -> &'static str {
        match self {
            LedgerCall::ChainId                            => "chainId",
            LedgerCall::Name { .. }                        => "name",
            LedgerCall::TokenMetadata { .. }               => "tokenMetadata",
            LedgerCall::Well { .. }                        => "well",
            LedgerCall::Reserves { .. }                    => "getReserves",
            LedgerCall::SwapOut { .. }                     => "getSwapOut",
            LedgerCall::SwapIn { .. }                      => "getSwapIn",
            LedgerCall::AddLiquidityOut { .. }             => "getAddLiquidityOut",
            LedgerCall::RemoveLiquidityOut { .. }          => "getRemoveLiquidityOut",
            LedgerCall::RemoveLiquidityOneTokenOut { .. }  => "getRemoveLiquidityOneTokenOut",
            LedgerCall::RemoveLiquidityImbalancedIn { .. } => "getRemoveLiquidityImbalancedIn",
            LedgerCall::ShiftOut { .. }                    => "getShiftOut",
            LedgerCall::Send { .. }                        => "send",
        }
    }
}

/// Failure to inject into the next call of a method.
#[derive(Debug, Clone)]
pub enum Failure {
    Unavailable(String),
    Revert(String),
}

impl Failure {
    fn into_error(self) -> Error {
        match self {
            Failure::Unavailable(reason) => Error::ResourceUnavailable(reason),
            Failure::Revert(reason)      => Error::Reverted { reason, data: None },
        }
    }
}

// ─── Mock Well ────────────────────────────────────────────────────────────────

/// Static description of one Well served by the mock.
#[derive(Debug, Clone)]
pub struct MockWell {
    pub address:       Address,
    pub name:          String,
    pub lp_symbol:     String,
    pub lp_decimals:   u8,
    pub tokens:        Vec<Address>,
    pub well_function: CallStruct,
    pub pumps:         Vec<CallStruct>,
    pub well_data:     Bytes,
    pub aquifer:       Address,
    pub reserves:      Vec<U256>,
}

impl MockWell {
    pub fn new(address: Address, name: impl Into<String>, tokens: Vec<Address>) -> Self {
        Self {
            address,
            name:          name.into(),
            lp_symbol:     "LP".into(),
            lp_decimals:   18,
            tokens,
            well_function: CallStruct { target: Address::repeat_byte(0xf0), data: Bytes::new() },
            pumps:         Vec::new(),
            well_data:     Bytes::new(),
            aquifer:       Address::repeat_byte(0xaf),
            reserves:      Vec::new(),
        }
    }

    pub fn reserves(mut self, reserves: Vec<U256>) -> Self {
        self.reserves = reserves;
        self
    }

    pub fn lp(mut self, symbol: impl Into<String>, decimals: u8) -> Self {
        self.lp_symbol = symbol.into();
        self.lp_decimals = decimals;
        self
    }

    pub fn pump(mut self, target: Address, data: Bytes) -> Self {
        self.pumps.push(CallStruct { target, data });
        self
    }

    pub fn well_function(mut self, target: Address, data: Bytes) -> Self {
        self.well_function = CallStruct { target, data };
        self
    }

    pub fn aquifer(mut self, aquifer: Address) -> Self {
        self.aquifer = aquifer;
        self
    }
}

// ─── MockLedger ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct MockState {
    wells:    HashMap<Address, MockWell>,
    tokens:   HashMap<Address, TokenMetadata>,
    previews: HashMap<&'static str, Vec<U256>>,
    failures: HashMap<&'static str, Failure>,
    calls:    Vec<LedgerCall>,
    tx_count: u64,
    chain_id: Option<u64>,
}

/// In-memory [`WellLedger`].
#[derive(Default)]
pub struct MockLedger {
    state:   Mutex<MockState>,
    latency: Option<Duration>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(self, address: Address, name: &str, symbol: &str, decimals: u8) -> Self {
        self.lock().tokens.insert(
            address,
            TokenMetadata { name: name.into(), symbol: symbol.into(), decimals },
        );
        self
    }

    /// Serve a Well. Its LP token metadata is registered at the Well address.
    pub fn with_well(self, well: MockWell) -> Self {
        {
            let mut state = self.lock();
            state.tokens.insert(
                well.address,
                TokenMetadata {
                    name:     format!("{} LP", well.name),
                    symbol:   well.lp_symbol.clone(),
                    decimals: well.lp_decimals,
                },
            );
            state.wells.insert(well.address, well);
        }
        self
    }

    /// Answer preview `method` (e.g. `"getSwapOut"`) with `values`.
    pub fn with_preview(self, method: &'static str, values: Vec<U256>) -> Self {
        self.lock().previews.insert(method, values);
        self
    }

    /// Report `chain_id` from [`WellLedger::chain_id`] (default 1).
    pub fn with_chain_id(self, chain_id: u64) -> Self {
        self.lock().chain_id = Some(chain_id);
        self
    }

    /// Sleep this long inside every call, so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call to `method` fail once.
    pub fn fail_next(&self, method: &'static str, failure: Failure) {
        self.lock().failures.insert(method, failure);
    }

    /// Replace a served Well's reserves.
    pub fn set_reserves(&self, well: Address, reserves: Vec<U256>) {
        if let Some(w) = self.lock().wells.get_mut(&well) {
            w.reserves = reserves;
        }
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.lock().calls.clone()
    }

    /// Number of calls received for `method`.
    pub fn count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.method() == method).count()
    }

    /// Write calls received so far.
    pub fn sent(&self) -> Vec<WellCall> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                LedgerCall::Send { call, .. } => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, wait out the latency, then apply any injected failure.
    async fn enter(&self, call: LedgerCall) -> Result<()> {
        let method = call.method();
        self.lock().calls.push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.lock().failures.remove(method) {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn with_well_state<T>(&self, well: Address, f: impl FnOnce(&MockWell) -> T) -> Result<T> {
        self.lock()
            .wells
            .get(&well)
            .map(f)
            .ok_or_else(|| Error::Reverted { reason: format!("no well at {well}"), data: None })
    }

    fn preview(&self, method: &'static str) -> Vec<U256> {
        self.lock().previews.get(method).cloned().unwrap_or_default()
    }

    fn preview_scalar(&self, method: &'static str) -> U256 {
        self.preview(method).first().copied().unwrap_or_default()
    }
}

#[async_trait]
impl WellLedger for MockLedger {
    async fn chain_id(&self) -> Result<u64> {
        self.enter(LedgerCall::ChainId).await?;
        Ok(self.lock().chain_id.unwrap_or(1))
    }

    async fn name(&self, well: Address) -> Result<String> {
        self.enter(LedgerCall::Name { well }).await?;
        self.with_well_state(well, |w| w.name.clone())
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata> {
        self.enter(LedgerCall::TokenMetadata { token }).await?;
        self.lock()
            .tokens
            .get(&token)
            .cloned()
            .ok_or_else(|| Error::ResourceUnavailable(format!("no token at {token}")))
    }

    async fn well(&self, well: Address) -> Result<WellDefinition> {
        self.enter(LedgerCall::Well { well }).await?;
        self.with_well_state(well, |w| WellDefinition {
            tokens:        w.tokens.clone(),
            well_function: w.well_function.clone(),
            pumps:         w.pumps.clone(),
            well_data:     w.well_data.clone(),
            aquifer:       w.aquifer,
        })
    }

    async fn reserves(&self, well: Address) -> Result<Vec<U256>> {
        self.enter(LedgerCall::Reserves { well }).await?;
        self.with_well_state(well, |w| w.reserves.clone())
    }

    async fn swap_out(&self, well: Address, from: Address, to: Address, amount_in: U256) -> Result<U256> {
        self.enter(LedgerCall::SwapOut { well, from, to, amount_in }).await?;
        Ok(self.preview_scalar("getSwapOut"))
    }

    async fn swap_in(&self, well: Address, from: Address, to: Address, amount_out: U256) -> Result<U256> {
        self.enter(LedgerCall::SwapIn { well, from, to, amount_out }).await?;
        Ok(self.preview_scalar("getSwapIn"))
    }

    async fn add_liquidity_out(&self, well: Address, token_amounts_in: &[U256]) -> Result<U256> {
        self.enter(LedgerCall::AddLiquidityOut { well, amounts: token_amounts_in.to_vec() }).await?;
        Ok(self.preview_scalar("getAddLiquidityOut"))
    }

    async fn remove_liquidity_out(&self, well: Address, lp_amount_in: U256) -> Result<Vec<U256>> {
        self.enter(LedgerCall::RemoveLiquidityOut { well, lp_amount_in }).await?;
        Ok(self.preview("getRemoveLiquidityOut"))
    }

    async fn remove_liquidity_one_token_out(
        &self,
        well:         Address,
        lp_amount_in: U256,
        token_out:    Address,
    ) -> Result<U256> {
        self.enter(LedgerCall::RemoveLiquidityOneTokenOut { well, lp_amount_in, token_out }).await?;
        Ok(self.preview_scalar("getRemoveLiquidityOneTokenOut"))
    }

    async fn remove_liquidity_imbalanced_in(&self, well: Address, token_amounts_out: &[U256]) -> Result<U256> {
        self.enter(LedgerCall::RemoveLiquidityImbalancedIn { well, amounts: token_amounts_out.to_vec() })
            .await?;
        Ok(self.preview_scalar("getRemoveLiquidityImbalancedIn"))
    }

    async fn shift_out(&self, well: Address, token_out: Address) -> Result<U256> {
        self.enter(LedgerCall::ShiftOut { well, token_out }).await?;
        Ok(self.preview_scalar("getShiftOut"))
    }

    async fn send(&self, well: Address, call: WellCall, overrides: &Overrides) -> Result<PendingTx> {
        let function = call.name();
        self.enter(LedgerCall::Send { well, call, overrides: overrides.clone() }).await?;
        let nonce = {
            let mut state = self.lock();
            state.tx_count += 1;
            state.tx_count
        };
        Ok(PendingTx {
            hash: B256::from(U256::from(nonce).to_be_bytes::<32>()),
            well,
            function,
        })
    }
}
