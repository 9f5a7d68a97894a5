//! Mutating operations on a [`Well`] and their read-only quotes.
//!
//! Every family comes in pairs: a quote that previews the outcome against
//! current ledger state, and a call that submits the transaction. A quote
//! is a point-in-time estimate; derive a slippage-tolerant bound from it
//! before submitting.
//!
//! All inputs are validated before any cached field is read or any ledger
//! call is made. Amounts are converted to raw units with the decimals of
//! the token they belong to, and positional arrays keep the Well's token
//! order end to end.

use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::{
    error::{Error, Result},
    ledger::{Deadline, Overrides, PendingTx, WellCall},
    token::{Token, TokenValue},
    validate::{validate_address, validate_amount, validate_amounts, validate_token},
    well::Well,
};

// ─── Parameters ───────────────────────────────────────────────────────────────

/// Exact-input swap: spend `amount_in` of `from_token`, receive at least
/// `min_amount_out` of `to_token`.
#[derive(Debug, Clone)]
pub struct SwapFromParams {
    pub from_token:     Token,
    pub to_token:       Token,
    pub amount_in:      TokenValue,
    pub min_amount_out: TokenValue,
    pub recipient:      Address,
    /// `None` = no effective deadline.
    pub deadline:       Option<Deadline>,
    pub overrides:      Overrides,
}

/// Exact-output swap: receive `amount_out` of `to_token`, spend at most
/// `max_amount_in` of `from_token`.
#[derive(Debug, Clone)]
pub struct SwapToParams {
    pub from_token:    Token,
    pub to_token:      Token,
    pub max_amount_in: TokenValue,
    pub amount_out:    TokenValue,
    pub recipient:     Address,
    pub deadline:      Option<Deadline>,
    pub overrides:     Overrides,
}

/// Deposit tokens in any ratio. `token_amounts_in` follows the Well's
/// token order.
#[derive(Debug, Clone)]
pub struct AddLiquidityParams {
    pub token_amounts_in:  Vec<TokenValue>,
    pub min_lp_amount_out: TokenValue,
    pub recipient:         Address,
    pub deadline:          Option<Deadline>,
    pub overrides:         Overrides,
}

/// Burn LP tokens for every underlying token in the balanced ratio.
#[derive(Debug, Clone)]
pub struct RemoveLiquidityParams {
    pub lp_amount_in:          TokenValue,
    pub min_token_amounts_out: Vec<TokenValue>,
    pub recipient:             Address,
    pub deadline:              Option<Deadline>,
    pub overrides:             Overrides,
}

/// Burn LP tokens for a single underlying token.
#[derive(Debug, Clone)]
pub struct RemoveLiquidityOneTokenParams {
    pub lp_amount_in:         TokenValue,
    pub token_out:            Token,
    pub min_token_amount_out: TokenValue,
    pub recipient:            Address,
    pub deadline:             Option<Deadline>,
    pub overrides:            Overrides,
}

/// Withdraw exact amounts of each underlying token, burning at most
/// `max_lp_amount_in`.
#[derive(Debug, Clone)]
pub struct RemoveLiquidityImbalancedParams {
    pub max_lp_amount_in:  TokenValue,
    pub token_amounts_out: Vec<TokenValue>,
    pub recipient:         Address,
    pub deadline:          Option<Deadline>,
    pub overrides:         Overrides,
}

/// Convert the Well's excess balances into `token_out`.
#[derive(Debug, Clone)]
pub struct ShiftParams {
    pub token_out:      Token,
    pub min_amount_out: TokenValue,
    pub recipient:      Address,
    pub overrides:      Overrides,
}

// ─── Operations ───────────────────────────────────────────────────────────────

impl Well {
    // ── Swap from ─────────────────────────────────────────────────────────────

    /// Swap an exact amount of `from_token` for at least `min_amount_out`.
    pub async fn swap_from(&self, params: SwapFromParams) -> Result<PendingTx> {
        let (call, overrides) = swap_from_call(params, false)?;
        self.submit(call, &overrides).await
    }

    /// [`Well::swap_from`] for tokens that charge a fee on transfer.
    pub async fn swap_from_fee_on_transfer(&self, params: SwapFromParams) -> Result<PendingTx> {
        let (call, overrides) = swap_from_call(params, true)?;
        self.submit(call, &overrides).await
    }

    /// Amount of `to_token` received for spending `amount_in` of `from_token`.
    pub async fn swap_from_quote(
        &self,
        from_token: &Token,
        to_token:   &Token,
        amount_in:  &TokenValue,
    ) -> Result<TokenValue> {
        validate_token(from_token, "fromToken")?;
        validate_token(to_token, "toToken")?;
        validate_amount(amount_in, "amountIn")?;
        let amount_in = raw_for(from_token, amount_in, "amountIn")?;

        debug!(well = %self.address(), from = %from_token.symbol, to = %to_token.symbol, %amount_in, "getSwapOut");
        let out = self
            .ledger
            .swap_out(self.address(), from_token.address, to_token.address, amount_in)
            .await?;
        to_token.from_raw(out)
    }

    // ── Swap to ───────────────────────────────────────────────────────────────

    /// Swap at most `max_amount_in` of `from_token` for exactly `amount_out`.
    pub async fn swap_to(&self, params: SwapToParams) -> Result<PendingTx> {
        validate_token(&params.from_token, "fromToken")?;
        validate_token(&params.to_token, "toToken")?;
        validate_amount(&params.max_amount_in, "maxAmountIn")?;
        validate_amount(&params.amount_out, "amountOut")?;
        validate_address(&params.recipient, "recipient")?;

        let call = WellCall::SwapTo {
            from_token:    params.from_token.address,
            to_token:      params.to_token.address,
            max_amount_in: raw_for(&params.from_token, &params.max_amount_in, "maxAmountIn")?,
            amount_out:    raw_for(&params.to_token, &params.amount_out, "amountOut")?,
            recipient:     params.recipient,
            deadline:      Deadline::resolve(params.deadline),
        };
        self.submit(call, &params.overrides).await
    }

    /// Amount of `from_token` that must be spent to receive `amount_out`.
    pub async fn swap_to_quote(
        &self,
        from_token: &Token,
        to_token:   &Token,
        amount_out: &TokenValue,
    ) -> Result<TokenValue> {
        validate_token(from_token, "fromToken")?;
        validate_token(to_token, "toToken")?;
        validate_amount(amount_out, "amountOut")?;
        let amount_out = raw_for(to_token, amount_out, "amountOut")?;

        debug!(well = %self.address(), from = %from_token.symbol, to = %to_token.symbol, %amount_out, "getSwapIn");
        let amount_in = self
            .ledger
            .swap_in(self.address(), from_token.address, to_token.address, amount_out)
            .await?;
        from_token.from_raw(amount_in)
    }

    // ── Add liquidity ─────────────────────────────────────────────────────────

    /// Deposit tokens in any ratio for at least `min_lp_amount_out` LP.
    pub async fn add_liquidity(&self, params: AddLiquidityParams) -> Result<PendingTx> {
        let call = self.add_liquidity_call(params.clone(), false).await?;
        self.submit(call, &params.overrides).await
    }

    /// [`Well::add_liquidity`] for tokens that charge a fee on transfer.
    pub async fn add_liquidity_fee_on_transfer(&self, params: AddLiquidityParams) -> Result<PendingTx> {
        let call = self.add_liquidity_call(params.clone(), true).await?;
        self.submit(call, &params.overrides).await
    }

    /// LP tokens minted for depositing `token_amounts_in`, expressed with the
    /// LP token's own decimals.
    pub async fn add_liquidity_quote(&self, token_amounts_in: &[TokenValue]) -> Result<TokenValue> {
        validate_amounts(token_amounts_in, "tokenAmountsIn")?;
        let amounts = self.raw_amounts(token_amounts_in, "tokenAmountsIn").await?;
        let lp_token = self.lp_token().await?;

        debug!(well = %self.address(), ?amounts, "getAddLiquidityOut");
        let lp_out = self.ledger.add_liquidity_out(self.address(), &amounts).await?;
        lp_token.from_raw(lp_out)
    }

    // ── Remove liquidity (balanced) ───────────────────────────────────────────

    /// Burn `lp_amount_in` for every underlying token in the balanced ratio.
    pub async fn remove_liquidity(&self, params: RemoveLiquidityParams) -> Result<PendingTx> {
        validate_amount(&params.lp_amount_in, "lpAmountIn")?;
        validate_amounts(&params.min_token_amounts_out, "minTokenAmountsOut")?;
        validate_address(&params.recipient, "recipient")?;

        let lp_token = self.lp_token().await?;
        let call = WellCall::RemoveLiquidity {
            lp_amount_in:          raw_for(&lp_token, &params.lp_amount_in, "lpAmountIn")?,
            min_token_amounts_out: self.raw_amounts(&params.min_token_amounts_out, "minTokenAmountsOut").await?,
            recipient:             params.recipient,
            deadline:              Deadline::resolve(params.deadline),
        };
        self.submit(call, &params.overrides).await
    }

    /// Amounts of each underlying token received for burning `lp_amount_in`,
    /// in the Well's token order.
    pub async fn remove_liquidity_quote(&self, lp_amount_in: &TokenValue) -> Result<Vec<TokenValue>> {
        validate_amount(lp_amount_in, "lpAmountIn")?;
        let tokens = self.tokens().await?;
        let lp_token = self.lp_token().await?;
        let lp_in = raw_for(&lp_token, lp_amount_in, "lpAmountIn")?;

        debug!(well = %self.address(), %lp_in, "getRemoveLiquidityOut");
        let out = self.ledger.remove_liquidity_out(self.address(), lp_in).await?;
        if out.len() != tokens.len() {
            return Err(Error::unavailable(format!(
                "getRemoveLiquidityOut returned {} amounts for {} tokens",
                out.len(),
                tokens.len()
            )));
        }
        tokens.iter().zip(out).map(|(token, raw)| token.from_raw(raw)).collect()
    }

    // ── Remove liquidity (single token) ───────────────────────────────────────

    /// Burn `lp_amount_in` for at least `min_token_amount_out` of `token_out`.
    pub async fn remove_liquidity_one_token(&self, params: RemoveLiquidityOneTokenParams) -> Result<PendingTx> {
        validate_amount(&params.lp_amount_in, "lpAmountIn")?;
        validate_token(&params.token_out, "tokenOut")?;
        validate_amount(&params.min_token_amount_out, "minTokenAmountOut")?;
        validate_address(&params.recipient, "recipient")?;

        let lp_token = self.lp_token().await?;
        let call = WellCall::RemoveLiquidityOneToken {
            lp_amount_in:         raw_for(&lp_token, &params.lp_amount_in, "lpAmountIn")?,
            token_out:            params.token_out.address,
            min_token_amount_out: raw_for(&params.token_out, &params.min_token_amount_out, "minTokenAmountOut")?,
            recipient:            params.recipient,
            deadline:             Deadline::resolve(params.deadline),
        };
        self.submit(call, &params.overrides).await
    }

    /// Amount of `token_out` received for burning `lp_amount_in`.
    pub async fn remove_liquidity_one_token_quote(
        &self,
        lp_amount_in: &TokenValue,
        token_out:    &Token,
    ) -> Result<TokenValue> {
        validate_amount(lp_amount_in, "lpAmountIn")?;
        validate_token(token_out, "tokenOut")?;
        let lp_token = self.lp_token().await?;
        let lp_in = raw_for(&lp_token, lp_amount_in, "lpAmountIn")?;

        debug!(well = %self.address(), %lp_in, token_out = %token_out.symbol, "getRemoveLiquidityOneTokenOut");
        let out = self
            .ledger
            .remove_liquidity_one_token_out(self.address(), lp_in, token_out.address)
            .await?;
        token_out.from_raw(out)
    }

    // ── Remove liquidity (imbalanced) ─────────────────────────────────────────

    /// Withdraw exact `token_amounts_out`, burning at most `max_lp_amount_in`.
    pub async fn remove_liquidity_imbalanced(&self, params: RemoveLiquidityImbalancedParams) -> Result<PendingTx> {
        validate_amount(&params.max_lp_amount_in, "maxLpAmountIn")?;
        validate_amounts(&params.token_amounts_out, "tokenAmountsOut")?;
        validate_address(&params.recipient, "recipient")?;

        let lp_token = self.lp_token().await?;
        let call = WellCall::RemoveLiquidityImbalanced {
            max_lp_amount_in:  raw_for(&lp_token, &params.max_lp_amount_in, "maxLpAmountIn")?,
            token_amounts_out: self.raw_amounts(&params.token_amounts_out, "tokenAmountsOut").await?,
            recipient:         params.recipient,
            deadline:          Deadline::resolve(params.deadline),
        };
        self.submit(call, &params.overrides).await
    }

    /// LP tokens burned to withdraw exactly `token_amounts_out`.
    pub async fn remove_liquidity_imbalanced_quote(&self, token_amounts_out: &[TokenValue]) -> Result<TokenValue> {
        validate_amounts(token_amounts_out, "tokenAmountsOut")?;
        let amounts = self.raw_amounts(token_amounts_out, "tokenAmountsOut").await?;
        let lp_token = self.lp_token().await?;

        debug!(well = %self.address(), ?amounts, "getRemoveLiquidityImbalancedIn");
        let lp_in = self
            .ledger
            .remove_liquidity_imbalanced_in(self.address(), &amounts)
            .await?;
        lp_token.from_raw(lp_in)
    }

    // ── Maintenance ───────────────────────────────────────────────────────────

    /// Set the Well's reserves to its actual token balances.
    pub async fn sync(&self, overrides: &Overrides) -> Result<PendingTx> {
        self.submit(WellCall::Sync, overrides).await
    }

    /// Send token balances held in excess of reserves to `recipient`.
    pub async fn skim(&self, recipient: Address, overrides: &Overrides) -> Result<PendingTx> {
        validate_address(&recipient, "recipient")?;
        self.submit(WellCall::Skim { recipient }, overrides).await
    }

    /// Swap excess balances into `token_out` and deliver to `recipient`.
    pub async fn shift(&self, params: ShiftParams) -> Result<PendingTx> {
        validate_token(&params.token_out, "tokenOut")?;
        validate_amount(&params.min_amount_out, "minAmountOut")?;
        validate_address(&params.recipient, "recipient")?;

        let call = WellCall::Shift {
            token_out:      params.token_out.address,
            min_amount_out: raw_for(&params.token_out, &params.min_amount_out, "minAmountOut")?,
            recipient:      params.recipient,
        };
        self.submit(call, &params.overrides).await
    }

    /// Amount of `token_out` a shift would deliver right now.
    pub async fn shift_quote(&self, token_out: &Token) -> Result<TokenValue> {
        validate_token(token_out, "tokenOut")?;
        debug!(well = %self.address(), token_out = %token_out.symbol, "getShiftOut");
        let out = self.ledger.shift_out(self.address(), token_out.address).await?;
        token_out.from_raw(out)
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    async fn add_liquidity_call(&self, params: AddLiquidityParams, fee_on_transfer: bool) -> Result<WellCall> {
        validate_amounts(&params.token_amounts_in, "tokenAmountsIn")?;
        validate_amount(&params.min_lp_amount_out, "minLpAmountOut")?;
        validate_address(&params.recipient, "recipient")?;

        let token_amounts_in = self.raw_amounts(&params.token_amounts_in, "tokenAmountsIn").await?;
        let lp_token = self.lp_token().await?;
        let min_lp_amount_out = raw_for(&lp_token, &params.min_lp_amount_out, "minLpAmountOut")?;
        let recipient = params.recipient;
        let deadline = Deadline::resolve(params.deadline);

        Ok(if fee_on_transfer {
            WellCall::AddLiquidityFeeOnTransfer { token_amounts_in, min_lp_amount_out, recipient, deadline }
        } else {
            WellCall::AddLiquidity { token_amounts_in, min_lp_amount_out, recipient, deadline }
        })
    }

    /// Scale a positional amount array, element `i` with token `i`'s decimals.
    async fn raw_amounts(&self, values: &[TokenValue], param: &'static str) -> Result<Vec<U256>> {
        let tokens = self.tokens().await?;
        if values.len() != tokens.len() {
            return Err(Error::invalid(
                param,
                format!("expected {} amounts (one per well token), got {}", tokens.len(), values.len()),
            ));
        }
        tokens
            .iter()
            .zip(values)
            .map(|(token, value)| raw_for(token, value, param))
            .collect()
    }

    async fn submit(&self, call: WellCall, overrides: &Overrides) -> Result<PendingTx> {
        debug!(well = %self.address(), function = call.name(), deadline = ?call.deadline(), "submitting");
        let pending = self.ledger.send(self.address(), call, overrides).await?;
        debug!(well = %self.address(), hash = %pending.hash, "submitted");
        Ok(pending)
    }
}

fn swap_from_call(params: SwapFromParams, fee_on_transfer: bool) -> Result<(WellCall, Overrides)> {
    validate_token(&params.from_token, "fromToken")?;
    validate_token(&params.to_token, "toToken")?;
    validate_amount(&params.amount_in, "amountIn")?;
    validate_amount(&params.min_amount_out, "minAmountOut")?;
    validate_address(&params.recipient, "recipient")?;

    let from_token = params.from_token.address;
    let to_token = params.to_token.address;
    let amount_in = raw_for(&params.from_token, &params.amount_in, "amountIn")?;
    let min_amount_out = raw_for(&params.to_token, &params.min_amount_out, "minAmountOut")?;
    let recipient = params.recipient;
    let deadline = Deadline::resolve(params.deadline);

    let call = if fee_on_transfer {
        WellCall::SwapFromFeeOnTransfer { from_token, to_token, amount_in, min_amount_out, recipient, deadline }
    } else {
        WellCall::SwapFrom { from_token, to_token, amount_in, min_amount_out, recipient, deadline }
    };
    Ok((call, params.overrides))
}

/// Convert `value` into `token`'s raw units, attributing failures to `param`.
fn raw_for(token: &Token, value: &TokenValue, param: &'static str) -> Result<U256> {
    token.to_raw(value).map_err(|e| match e {
        Error::InvalidArgument { reason, .. } => Error::InvalidArgument {
            param,
            reason: format!("{reason} (token {})", token.symbol),
        },
        other => other,
    })
}
