//! Token descriptors and the fixed-point amount type.
//!
//! Every amount that crosses the facade is a [`TokenValue`]: an exact signed
//! integer tagged with the decimal scale of the asset it belongs to. Raw
//! ledger units are plain `U256`; conversion always goes through the
//! [`Token`] the amount is destined for, never through a fixed scale.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use alloy_primitives::{
    utils::{format_units, parse_units, ParseUnits},
    Address, I256, U256,
};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{Error, Result},
    ledger::WellLedger,
};

/// Largest decimal scale accepted. `10^36` still leaves headroom inside
/// `I256` for realistic supplies.
pub const MAX_DECIMALS: u8 = 36;

fn pow10(exp: u8) -> I256 {
    I256::from_raw(U256::from(10u8).pow(U256::from(exp)))
}

// ─── TokenValue ───────────────────────────────────────────────────────────────

/// Exact fixed-point amount: `raw / 10^decimals`.
#[derive(Debug, Clone, Copy)]
pub struct TokenValue {
    raw:      I256,
    decimals: u8,
}

impl TokenValue {
    /// Zero at the given scale.
    pub fn zero(decimals: u8) -> Result<Self> {
        check_decimals(decimals)?;
        Ok(Self { raw: I256::ZERO, decimals })
    }

    /// Wrap an already-scaled signed integer.
    pub fn from_raw_signed(raw: I256, decimals: u8) -> Result<Self> {
        check_decimals(decimals)?;
        Ok(Self { raw, decimals })
    }

    /// Parse a human decimal string (`"100"`, `"0.5"`, `"-3.25"`).
    ///
    /// Fails rather than rounding when `amount` has more significant
    /// fractional digits than `decimals`.
    pub fn from_human(amount: &str, decimals: u8) -> Result<Self> {
        check_decimals(decimals)?;
        let trimmed = amount.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid("amount", "empty amount"));
        }
        if let Some((_, frac)) = trimmed.split_once('.') {
            let significant = frac.trim_end_matches('0').len();
            if significant > decimals as usize {
                return Err(Error::invalid(
                    "amount",
                    format!("{trimmed} has more than {decimals} decimal places"),
                ));
            }
        }
        let raw = match parse_units(trimmed, decimals)
            .map_err(|e| Error::invalid("amount", format!("cannot parse '{trimmed}': {e}")))?
        {
            ParseUnits::U256(unsigned) => I256::try_from(unsigned)
                .map_err(|_| Error::invalid("amount", format!("{trimmed} is too large")))?,
            ParseUnits::I256(signed) => signed,
        };
        Ok(Self { raw, decimals })
    }

    /// Build from the ledger's raw unsigned encoding.
    pub fn from_blockchain(raw: U256, decimals: u8) -> Result<Self> {
        check_decimals(decimals)?;
        let raw = I256::try_from(raw)
            .map_err(|_| Error::unavailable(format!("ledger amount {raw} exceeds I256")))?;
        Ok(Self { raw, decimals })
    }

    /// Raw unsigned ledger encoding at this value's own scale.
    pub fn to_blockchain(&self) -> Result<U256> {
        if self.raw.is_negative() {
            return Err(Error::invalid("amount", format!("{self} is negative")));
        }
        Ok(self.raw.into_raw())
    }

    pub fn raw(&self) -> I256 {
        self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_negative(&self) -> bool {
        self.raw.is_negative()
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Re-express at another scale. Scaling down fails if any nonzero digit
    /// would be dropped.
    pub fn rescale(&self, decimals: u8) -> Result<Self> {
        check_decimals(decimals)?;
        let raw = match decimals.cmp(&self.decimals) {
            Ordering::Equal => self.raw,
            Ordering::Greater => self
                .raw
                .checked_mul(pow10(decimals - self.decimals))
                .ok_or_else(|| Error::invalid("amount", format!("{self} overflows at {decimals} decimals")))?,
            Ordering::Less => {
                let factor = pow10(self.decimals - decimals);
                let rem = self.raw.checked_rem(factor).unwrap_or(I256::ZERO);
                if !rem.is_zero() {
                    return Err(Error::invalid(
                        "amount",
                        format!("{self} is not representable with {decimals} decimals"),
                    ));
                }
                self.raw.checked_div(factor).unwrap_or(I256::ZERO)
            }
        };
        Ok(Self { raw, decimals })
    }

    pub fn checked_add(&self, other: &TokenValue) -> Result<TokenValue> {
        let (a, b, decimals) = self.aligned(other)?;
        let raw = a.checked_add(b).ok_or_else(|| Error::invalid("amount", "addition overflow"))?;
        Ok(Self { raw, decimals })
    }

    pub fn checked_sub(&self, other: &TokenValue) -> Result<TokenValue> {
        let (a, b, decimals) = self.aligned(other)?;
        let raw = a.checked_sub(b).ok_or_else(|| Error::invalid("amount", "subtraction overflow"))?;
        Ok(Self { raw, decimals })
    }

    /// `self × numerator / denominator`, truncated toward zero at the
    /// current scale. Used for slippage bounds (`mul_div(9_950, 10_000)`).
    pub fn mul_div(&self, numerator: u64, denominator: u64) -> Result<TokenValue> {
        if denominator == 0 {
            return Err(Error::invalid("denominator", "must be nonzero"));
        }
        let raw = self
            .raw
            .checked_mul(I256::from_raw(U256::from(numerator)))
            .and_then(|v| v.checked_div(I256::from_raw(U256::from(denominator))))
            .ok_or_else(|| Error::invalid("amount", "mul_div overflow"))?;
        Ok(Self { raw, decimals: self.decimals })
    }

    fn aligned(&self, other: &TokenValue) -> Result<(I256, I256, u8)> {
        let decimals = self.decimals.max(other.decimals);
        Ok((self.rescale(decimals)?.raw, other.rescale(decimals)?.raw, decimals))
    }
}

impl PartialEq for TokenValue {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.partial_cmp(other), Some(Ordering::Equal))
    }
}

impl PartialOrd for TokenValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.aligned(other).ok().map(|(a, b, _)| a.cmp(&b))
    }
}

impl fmt::Display for TokenValue {
    /// Human decimal string without trailing zeros (`100`, `0.5`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = format_units(self.raw, self.decimals).map_err(|_| fmt::Error)?;
        let shown = if full.contains('.') {
            full.trim_end_matches('0').trim_end_matches('.')
        } else {
            full.as_str()
        };
        f.write_str(shown)
    }
}

fn check_decimals(decimals: u8) -> Result<()> {
    if decimals > MAX_DECIMALS {
        return Err(Error::invalid(
            "decimals",
            format!("{decimals} exceeds the supported maximum of {MAX_DECIMALS}"),
        ));
    }
    Ok(())
}

// ─── Token ────────────────────────────────────────────────────────────────────

/// An ERC-20 token descriptor. The decimal scale is the token's own; all
/// amount conversion for this token goes through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub address:  Address,
    pub name:     String,
    pub symbol:   String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self { address, name: name.into(), symbol: symbol.into(), decimals }
    }

    /// Parse a human amount at this token's scale.
    pub fn amount(&self, human: &str) -> Result<TokenValue> {
        TokenValue::from_human(human, self.decimals)
    }

    /// Convert an amount into this token's raw units, rescaling it to the
    /// token's decimals first.
    pub fn to_raw(&self, value: &TokenValue) -> Result<U256> {
        value.rescale(self.decimals)?.to_blockchain()
    }

    /// Wrap raw ledger units returned for this token.
    pub fn from_raw(&self, raw: U256) -> Result<TokenValue> {
        TokenValue::from_blockchain(raw, self.decimals)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}

/// Token metadata as read from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name:     String,
    pub symbol:   String,
    pub decimals: u8,
}

// ─── Registry ─────────────────────────────────────────────────────────────────

/// Shared address → token map. Tokens are immutable on the ledger, so an
/// entry never needs refreshing once present.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: RwLock<HashMap<Address, Token>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry with tokens known ahead of time.
    pub fn with_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let registry = Self::new();
        for token in tokens {
            registry.insert(token);
        }
        registry
    }

    pub fn get(&self, address: &Address) -> Option<Token> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }

    pub fn insert(&self, token: Token) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.address, token);
    }

    pub fn len(&self) -> usize {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the registered token, or read its metadata from the ledger and
    /// register it.
    pub async fn load(&self, ledger: &dyn WellLedger, address: Address) -> Result<Token> {
        if let Some(token) = self.get(&address) {
            debug!(%address, "token registry hit");
            return Ok(token);
        }
        let meta = ledger.token_metadata(address).await?;
        check_decimals(meta.decimals).map_err(|_| {
            Error::unavailable(format!("token {address} reports {} decimals", meta.decimals))
        })?;
        let token = Token::new(address, meta.name, meta.symbol, meta.decimals);
        self.insert(token.clone());
        Ok(token)
    }
}
