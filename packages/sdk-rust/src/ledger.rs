//! The ledger surface the facade talks to.
//!
//! [`WellLedger`] is the typed read/write RPC surface of a Well and the
//! ERC-20 tokens it holds. Transports implement it; [`crate::rpc`] ships a
//! JSON-RPC one and tests use an in-memory one. Amounts here are always raw
//! ledger units.

use std::collections::BTreeMap;
use std::fmt;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::{error::Result, token::TokenMetadata};

// ─── Call references ──────────────────────────────────────────────────────────

/// `(target, data)` pair the ledger uses to reference a well function or pump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CallStruct {
    pub target: Address,
    pub data:   Bytes,
}

/// Raw response of the combined configuration read (`well()`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellDefinition {
    pub tokens:        Vec<Address>,
    pub well_function: CallStruct,
    pub pumps:         Vec<CallStruct>,
    pub well_data:     Bytes,
    pub aquifer:       Address,
}

// ─── Deadline ─────────────────────────────────────────────────────────────────

/// Time bound after which the ledger rejects a submitted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Deadline(pub U256);

impl Deadline {
    /// No effective deadline: `2^256 - 1`.
    pub const MAX: Deadline = Deadline(U256::MAX);

    /// Explicit deadlines pass through unmodified; `None` becomes [`Deadline::MAX`].
    pub fn resolve(deadline: Option<Deadline>) -> Deadline {
        deadline.unwrap_or(Deadline::MAX)
    }

    pub fn value(&self) -> U256 {
        self.0
    }
}

impl From<u64> for Deadline {
    fn from(timestamp: u64) -> Self {
        Deadline(U256::from(timestamp))
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Deadline::MAX {
            f.write_str("none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// ─── Overrides ────────────────────────────────────────────────────────────────

/// Transport-level options for a write call. The facade never reads these;
/// they are handed to the transport as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(rename = "gasPrice", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(rename = "maxFeePerGas", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    #[serde(rename = "maxPriorityFeePerGas", skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
    /// Anything else the transport understands.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Overrides {
    pub fn from_address(from: Address) -> Self {
        Self { from: Some(from), ..Self::default() }
    }
}

// ─── Write calls ──────────────────────────────────────────────────────────────

/// One state-changing call on a Well, with raw-unit arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WellCall {
    SwapFrom {
        from_token:     Address,
        to_token:       Address,
        amount_in:      U256,
        min_amount_out: U256,
        recipient:      Address,
        deadline:       Deadline,
    },
    SwapFromFeeOnTransfer {
        from_token:     Address,
        to_token:       Address,
        amount_in:      U256,
        min_amount_out: U256,
        recipient:      Address,
        deadline:       Deadline,
    },
    SwapTo {
        from_token:    Address,
        to_token:      Address,
        max_amount_in: U256,
        amount_out:    U256,
        recipient:     Address,
        deadline:      Deadline,
    },
    AddLiquidity {
        token_amounts_in:  Vec<U256>,
        min_lp_amount_out: U256,
        recipient:         Address,
        deadline:          Deadline,
    },
    AddLiquidityFeeOnTransfer {
        token_amounts_in:  Vec<U256>,
        min_lp_amount_out: U256,
        recipient:         Address,
        deadline:          Deadline,
    },
    RemoveLiquidity {
        lp_amount_in:          U256,
        min_token_amounts_out: Vec<U256>,
        recipient:             Address,
        deadline:              Deadline,
    },
    RemoveLiquidityOneToken {
        lp_amount_in:         U256,
        token_out:            Address,
        min_token_amount_out: U256,
        recipient:            Address,
        deadline:             Deadline,
    },
    RemoveLiquidityImbalanced {
        max_lp_amount_in:  U256,
        token_amounts_out: Vec<U256>,
        recipient:         Address,
        deadline:          Deadline,
    },
    Sync,
    Skim {
        recipient: Address,
    },
    Shift {
        token_out:      Address,
        min_amount_out: U256,
        recipient:      Address,
    },
}

impl WellCall {
    /// Ledger function name of this call.
    pub fn name(&self) -> &'static str {
        match self {
            WellCall::SwapFrom { .. }                  => "swapFrom",
            WellCall::SwapFromFeeOnTransfer { .. }     => "swapFromFeeOnTransfer",
            WellCall::SwapTo { .. }                    => "swapTo",
            WellCall::AddLiquidity { .. }              => "addLiquidity",
            WellCall::AddLiquidityFeeOnTransfer { .. } => "addLiquidityFeeOnTransfer",
            WellCall::RemoveLiquidity { .. }           => "removeLiquidity",
            WellCall::RemoveLiquidityOneToken { .. }   => "removeLiquidityOneToken",
            WellCall::RemoveLiquidityImbalanced { .. } => "removeLiquidityImbalanced",
            WellCall::Sync                             => "sync",
            WellCall::Skim { .. }                      => "skim",
            WellCall::Shift { .. }                     => "shift",
        }
    }

    /// Deadline carried by the call, if the ledger function takes one.
    pub fn deadline(&self) -> Option<Deadline> {
        match self {
            WellCall::SwapFrom { deadline, .. }
            | WellCall::SwapFromFeeOnTransfer { deadline, .. }
            | WellCall::SwapTo { deadline, .. }
            | WellCall::AddLiquidity { deadline, .. }
            | WellCall::AddLiquidityFeeOnTransfer { deadline, .. }
            | WellCall::RemoveLiquidity { deadline, .. }
            | WellCall::RemoveLiquidityOneToken { deadline, .. }
            | WellCall::RemoveLiquidityImbalanced { deadline, .. } => Some(*deadline),
            WellCall::Sync | WellCall::Skim { .. } | WellCall::Shift { .. } => None,
        }
    }
}

/// Handle to a submitted, not yet final, transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTx {
    pub hash:     B256,
    pub well:     Address,
    pub function: &'static str,
}

// ─── Ledger trait ─────────────────────────────────────────────────────────────

/// Read/write RPC surface of a Well and its tokens.
///
/// Read methods never change ledger state. [`WellLedger::send`] submits a
/// transaction and returns without waiting for finality.
#[async_trait]
pub trait WellLedger: Send + Sync {
    /// Chain the ledger serves (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64>;

    /// `name()` of the Well.
    async fn name(&self, well: Address) -> Result<String>;

    /// `name()`, `symbol()` and `decimals()` of any ERC-20, the Well's own
    /// LP token included.
    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata>;

    /// Combined configuration read: tokens, well function, pumps, well data
    /// and aquifer in one response.
    async fn well(&self, well: Address) -> Result<WellDefinition>;

    /// Current reserves, index-aligned with the Well's tokens.
    async fn reserves(&self, well: Address) -> Result<Vec<U256>>;

    async fn swap_out(&self, well: Address, from: Address, to: Address, amount_in: U256) -> Result<U256>;

    async fn swap_in(&self, well: Address, from: Address, to: Address, amount_out: U256) -> Result<U256>;

    async fn add_liquidity_out(&self, well: Address, token_amounts_in: &[U256]) -> Result<U256>;

    async fn remove_liquidity_out(&self, well: Address, lp_amount_in: U256) -> Result<Vec<U256>>;

    async fn remove_liquidity_one_token_out(
        &self,
        well:         Address,
        lp_amount_in: U256,
        token_out:    Address,
    ) -> Result<U256>;

    async fn remove_liquidity_imbalanced_in(&self, well: Address, token_amounts_out: &[U256]) -> Result<U256>;

    async fn shift_out(&self, well: Address, token_out: Address) -> Result<U256>;

    /// Submit a state-changing call.
    async fn send(&self, well: Address, call: WellCall, overrides: &Overrides) -> Result<PendingTx>;
}
