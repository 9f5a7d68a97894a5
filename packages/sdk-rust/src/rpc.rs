//! JSON-RPC transport.
//!
//! [`JsonRpcLedger`] implements [`WellLedger`] over Ethereum JSON-RPC.
//! Reads are `eth_call` against `latest`. Writes are `eth_sendTransaction`
//! from a node-managed account, so no key material ever enters the SDK.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_sol_types::{decode_revert_reason, sol, Revert, SolCall, SolError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::{
    config::RpcConfig,
    error::{Error, Result},
    ledger::{CallStruct, Overrides, PendingTx, WellCall, WellDefinition, WellLedger},
    token::TokenMetadata,
};

// ─── ABI ──────────────────────────────────────────────────────────────────────

sol! {
    /// `(target, data)` reference to a well function or pump.
    #[derive(Debug)]
    struct Call {
        address target;
        bytes data;
    }

    interface IWell {
        function name() external view returns (string);

        function well() external view returns (
            address[] _tokens,
            Call _wellFunction,
            Call[] _pumps,
            bytes _wellData,
            address _aquifer
        );

        function getReserves() external view returns (uint256[] reserves);

        function getSwapOut(address fromToken, address toToken, uint256 amountIn)
            external view returns (uint256 amountOut);
        function getSwapIn(address fromToken, address toToken, uint256 amountOut)
            external view returns (uint256 amountIn);
        function getAddLiquidityOut(uint256[] tokenAmountsIn)
            external view returns (uint256 lpAmountOut);
        function getRemoveLiquidityOut(uint256 lpAmountIn)
            external view returns (uint256[] tokenAmountsOut);
        function getRemoveLiquidityOneTokenOut(uint256 lpAmountIn, address tokenOut)
            external view returns (uint256 tokenAmountOut);
        function getRemoveLiquidityImbalancedIn(uint256[] tokenAmountsOut)
            external view returns (uint256 lpAmountIn);
        function getShiftOut(address tokenOut) external view returns (uint256 amountOut);

        function swapFrom(
            address fromToken, address toToken, uint256 amountIn,
            uint256 minAmountOut, address recipient, uint256 deadline
        ) external returns (uint256 amountOut);
        function swapFromFeeOnTransfer(
            address fromToken, address toToken, uint256 amountIn,
            uint256 minAmountOut, address recipient, uint256 deadline
        ) external returns (uint256 amountOut);
        function swapTo(
            address fromToken, address toToken, uint256 maxAmountIn,
            uint256 amountOut, address recipient, uint256 deadline
        ) external returns (uint256 amountIn);
        function addLiquidity(
            uint256[] tokenAmountsIn, uint256 minLpAmountOut, address recipient, uint256 deadline
        ) external returns (uint256 lpAmountOut);
        function addLiquidityFeeOnTransfer(
            uint256[] tokenAmountsIn, uint256 minLpAmountOut, address recipient, uint256 deadline
        ) external returns (uint256 lpAmountOut);
        function removeLiquidity(
            uint256 lpAmountIn, uint256[] minTokenAmountsOut, address recipient, uint256 deadline
        ) external returns (uint256[] tokenAmountsOut);
        function removeLiquidityOneToken(
            uint256 lpAmountIn, address tokenOut, uint256 minTokenAmountOut,
            address recipient, uint256 deadline
        ) external returns (uint256 tokenAmountOut);
        function removeLiquidityImbalanced(
            uint256 maxLpAmountIn, uint256[] tokenAmountsOut, address recipient, uint256 deadline
        ) external returns (uint256 lpAmountIn);
        function sync() external;
        function skim(address recipient) external returns (uint256[] skimAmounts);
        function shift(address tokenOut, uint256 minAmountOut, address recipient)
            external returns (uint256 amountOut);
    }

    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

impl From<Call> for CallStruct {
    fn from(call: Call) -> Self {
        CallStruct { target: call.target, data: call.data }
    }
}

/// ABI-encode a write call.
pub fn encode_call(call: &WellCall) -> Bytes {
    let data = match call.clone() {
        WellCall::SwapFrom { from_token, to_token, amount_in, min_amount_out, recipient, deadline } => {
            IWell::swapFromCall {
                fromToken:    from_token,
                toToken:      to_token,
                amountIn:     amount_in,
                minAmountOut: min_amount_out,
                recipient,
                deadline:     deadline.value(),
            }
            .abi_encode()
        }
        WellCall::SwapFromFeeOnTransfer { from_token, to_token, amount_in, min_amount_out, recipient, deadline } => {
            IWell::swapFromFeeOnTransferCall {
                fromToken:    from_token,
                toToken:      to_token,
                amountIn:     amount_in,
                minAmountOut: min_amount_out,
                recipient,
                deadline:     deadline.value(),
            }
            .abi_encode()
        }
        WellCall::SwapTo { from_token, to_token, max_amount_in, amount_out, recipient, deadline } => {
            IWell::swapToCall {
                fromToken:   from_token,
                toToken:     to_token,
                maxAmountIn: max_amount_in,
                amountOut:   amount_out,
                recipient,
                deadline:    deadline.value(),
            }
            .abi_encode()
        }
        WellCall::AddLiquidity { token_amounts_in, min_lp_amount_out, recipient, deadline } => {
            IWell::addLiquidityCall {
                tokenAmountsIn: token_amounts_in,
                minLpAmountOut: min_lp_amount_out,
                recipient,
                deadline:       deadline.value(),
            }
            .abi_encode()
        }
        WellCall::AddLiquidityFeeOnTransfer { token_amounts_in, min_lp_amount_out, recipient, deadline } => {
            IWell::addLiquidityFeeOnTransferCall {
                tokenAmountsIn: token_amounts_in,
                minLpAmountOut: min_lp_amount_out,
                recipient,
                deadline:       deadline.value(),
            }
            .abi_encode()
        }
        WellCall::RemoveLiquidity { lp_amount_in, min_token_amounts_out, recipient, deadline } => {
            IWell::removeLiquidityCall {
                lpAmountIn:         lp_amount_in,
                minTokenAmountsOut: min_token_amounts_out,
                recipient,
                deadline:           deadline.value(),
            }
            .abi_encode()
        }
        WellCall::RemoveLiquidityOneToken { lp_amount_in, token_out, min_token_amount_out, recipient, deadline } => {
            IWell::removeLiquidityOneTokenCall {
                lpAmountIn:        lp_amount_in,
                tokenOut:          token_out,
                minTokenAmountOut: min_token_amount_out,
                recipient,
                deadline:          deadline.value(),
            }
            .abi_encode()
        }
        WellCall::RemoveLiquidityImbalanced { max_lp_amount_in, token_amounts_out, recipient, deadline } => {
            IWell::removeLiquidityImbalancedCall {
                maxLpAmountIn:   max_lp_amount_in,
                tokenAmountsOut: token_amounts_out,
                recipient,
                deadline:        deadline.value(),
            }
            .abi_encode()
        }
        WellCall::Sync => IWell::syncCall {}.abi_encode(),
        WellCall::Skim { recipient } => IWell::skimCall { recipient }.abi_encode(),
        WellCall::Shift { token_out, min_amount_out, recipient } => {
            IWell::shiftCall { tokenOut: token_out, minAmountOut: min_amount_out, recipient }.abi_encode()
        }
    };
    Bytes::from(data)
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error:  Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code:    i64,
    message: String,
    #[serde(default)]
    data:    Option<Value>,
}

/// Execution-revert error code used by geth and most node clients.
const EXECUTION_REVERTED: i64 = 3;

impl RpcError {
    /// Revert payload, whether sent as a bare hex string or nested as
    /// `{ "data": "0x…" }`.
    fn revert_data(&self) -> Option<Bytes> {
        let hex = match self.data.as_ref()? {
            Value::String(s) => s.as_str(),
            Value::Object(obj) => obj.get("data")?.as_str()?,
            _ => return None,
        };
        Bytes::from_str(hex).ok()
    }

    fn is_revert(&self) -> bool {
        self.code == EXECUTION_REVERTED || self.message.to_ascii_lowercase().contains("revert")
    }

    fn into_error(self, method: &str) -> Error {
        if !self.is_revert() {
            return Error::unavailable(format!("{method} failed: rpc error {}: {}", self.code, self.message));
        }
        let data = self.revert_data();
        let reason = data
            .as_ref()
            .and_then(|d| Revert::abi_decode(d, true).map(|r| r.reason).ok().or_else(|| decode_revert_reason(d)))
            .unwrap_or(self.message);
        Error::Reverted { reason, data }
    }
}

// ─── Ledger ───────────────────────────────────────────────────────────────────

/// [`WellLedger`] over an Ethereum JSON-RPC endpoint.
pub struct JsonRpcLedger {
    url:          String,
    http:         reqwest::Client,
    default_from: Option<Address>,
    next_id:      AtomicU64,
}

impl JsonRpcLedger {
    pub fn from_config(config: &RpcConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("cannot build http client: {e}")))?;
        Ok(Self {
            url: config.url.trim().to_string(),
            http,
            default_from: config.default_from,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id":      id,
            "method":  method,
            "params":  params,
        });
        debug!(id, method, "rpc request");

        let response = self.http.post(&self.url).json(&body).send().await.map_err(|e| {
            warn!(id, method, error = %e, "rpc transport failure");
            Error::unavailable(format!("{method}: {e}"))
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!(id, method, %status, "rpc http error");
            return Err(Error::unavailable(format!("{method}: http status {status}")));
        }
        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::unavailable(format!("{method}: malformed response: {e}")))?;

        if let Some(err) = envelope.error {
            debug!(id, method, code = err.code, message = %err.message, "rpc error");
            return Err(err.into_error(method));
        }
        envelope
            .result
            .ok_or_else(|| Error::unavailable(format!("{method}: response carries no result")))
    }

    async fn eth_call<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return> {
        let data = Bytes::from(call.abi_encode());
        let raw: Bytes = self
            .request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
            .map_err(|e| match e {
                Error::ResourceUnavailable(msg) => Error::ResourceUnavailable(format!("{}: {msg}", C::SIGNATURE)),
                other => other,
            })?;
        C::abi_decode_returns(&raw, true)
            .map_err(|e| Error::unavailable(format!("{}: cannot decode return data: {e}", C::SIGNATURE)))
    }

    /// Transaction object for `eth_sendTransaction`: overrides first, then
    /// target and calldata, with the configured sender as fallback.
    fn transaction(&self, well: Address, call: &WellCall, overrides: &Overrides) -> Result<Value> {
        let mut tx = match serde_json::to_value(overrides) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(Error::invalid("overrides", e.to_string())),
        };
        if !tx.contains_key("from") {
            let from = self.default_from.ok_or_else(|| {
                Error::Config("no sender: set overrides.from or default_from".into())
            })?;
            tx.insert("from".into(), json!(from));
        }
        tx.insert("to".into(), json!(well));
        tx.insert("data".into(), json!(encode_call(call)));
        Ok(Value::Object(tx))
    }
}

#[async_trait]
impl WellLedger for JsonRpcLedger {
    async fn chain_id(&self) -> Result<u64> {
        let id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(id.to::<u64>())
    }

    async fn name(&self, well: Address) -> Result<String> {
        Ok(self.eth_call(well, IWell::nameCall {}).await?._0)
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata> {
        let (name, symbol, decimals) = tokio::try_join!(
            self.eth_call(token, IERC20::nameCall {}),
            self.eth_call(token, IERC20::symbolCall {}),
            self.eth_call(token, IERC20::decimalsCall {}),
        )?;
        Ok(TokenMetadata { name: name._0, symbol: symbol._0, decimals: decimals._0 })
    }

    async fn well(&self, well: Address) -> Result<WellDefinition> {
        let def = self.eth_call(well, IWell::wellCall {}).await?;
        Ok(WellDefinition {
            tokens:        def._tokens,
            well_function: def._wellFunction.into(),
            pumps:         def._pumps.into_iter().map(CallStruct::from).collect(),
            well_data:     def._wellData,
            aquifer:       def._aquifer,
        })
    }

    async fn reserves(&self, well: Address) -> Result<Vec<U256>> {
        Ok(self.eth_call(well, IWell::getReservesCall {}).await?.reserves)
    }

    async fn swap_out(&self, well: Address, from: Address, to: Address, amount_in: U256) -> Result<U256> {
        let call = IWell::getSwapOutCall { fromToken: from, toToken: to, amountIn: amount_in };
        Ok(self.eth_call(well, call).await?.amountOut)
    }

    async fn swap_in(&self, well: Address, from: Address, to: Address, amount_out: U256) -> Result<U256> {
        let call = IWell::getSwapInCall { fromToken: from, toToken: to, amountOut: amount_out };
        Ok(self.eth_call(well, call).await?.amountIn)
    }

    async fn add_liquidity_out(&self, well: Address, token_amounts_in: &[U256]) -> Result<U256> {
        let call = IWell::getAddLiquidityOutCall { tokenAmountsIn: token_amounts_in.to_vec() };
        Ok(self.eth_call(well, call).await?.lpAmountOut)
    }

    async fn remove_liquidity_out(&self, well: Address, lp_amount_in: U256) -> Result<Vec<U256>> {
        let call = IWell::getRemoveLiquidityOutCall { lpAmountIn: lp_amount_in };
        Ok(self.eth_call(well, call).await?.tokenAmountsOut)
    }

    async fn remove_liquidity_one_token_out(
        &self,
        well:         Address,
        lp_amount_in: U256,
        token_out:    Address,
    ) -> Result<U256> {
        let call = IWell::getRemoveLiquidityOneTokenOutCall { lpAmountIn: lp_amount_in, tokenOut: token_out };
        Ok(self.eth_call(well, call).await?.tokenAmountOut)
    }

    async fn remove_liquidity_imbalanced_in(&self, well: Address, token_amounts_out: &[U256]) -> Result<U256> {
        let call = IWell::getRemoveLiquidityImbalancedInCall { tokenAmountsOut: token_amounts_out.to_vec() };
        Ok(self.eth_call(well, call).await?.lpAmountIn)
    }

    async fn shift_out(&self, well: Address, token_out: Address) -> Result<U256> {
        let call = IWell::getShiftOutCall { tokenOut: token_out };
        Ok(self.eth_call(well, call).await?.amountOut)
    }

    async fn send(&self, well: Address, call: WellCall, overrides: &Overrides) -> Result<PendingTx> {
        let tx = self.transaction(well, &call, overrides)?;
        let hash: B256 = self.request("eth_sendTransaction", json!([tx])).await?;
        debug!(%well, function = call.name(), %hash, "transaction submitted");
        Ok(PendingTx { hash, well, function: call.name() })
    }
}

impl std::fmt::Debug for JsonRpcLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcLedger")
            .field("url", &self.url)
            .field("default_from", &self.default_from)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Deadline;

    fn ledger(default_from: Option<Address>) -> JsonRpcLedger {
        JsonRpcLedger::from_config(&RpcConfig { default_from, ..RpcConfig::default() }).unwrap()
    }

    fn rpc_error(code: i64, message: &str, data: Option<Value>) -> RpcError {
        RpcError { code, message: message.into(), data }
    }

    #[test]
    fn revert_with_reason_is_decoded() {
        let payload = Bytes::from(Revert { reason: "Well: slippage".into() }.abi_encode());
        let err = rpc_error(3, "execution reverted", Some(json!(payload))).into_error("eth_call");
        match err {
            Error::Reverted { reason, data } => {
                assert_eq!(reason, "Well: slippage");
                assert_eq!(data, Some(payload));
            }
            other => panic!("expected revert, got {other:?}"),
        }
    }

    #[test]
    fn nested_revert_data_is_found() {
        let payload = Bytes::from(Revert { reason: "Expired".into() }.abi_encode());
        let err = rpc_error(-32000, "execution reverted", Some(json!({ "data": payload })))
            .into_error("eth_call");
        assert!(matches!(err, Error::Reverted { ref reason, .. } if reason == "Expired"));
    }

    #[test]
    fn panic_payload_falls_back_to_generic_decoding() {
        let payload = Bytes::from(alloy_sol_types::Panic { code: U256::from(0x11u64) }.abi_encode());
        let err = rpc_error(3, "execution reverted", Some(json!(payload))).into_error("eth_call");
        match err {
            Error::Reverted { reason, .. } => assert!(reason.contains("overflow"), "{reason}"),
            other => panic!("expected revert, got {other:?}"),
        }
    }

    #[test]
    fn revert_without_data_keeps_node_message() {
        let err = rpc_error(-32000, "execution reverted: SlippageOut", None).into_error("eth_call");
        assert!(matches!(err, Error::Reverted { ref reason, data: None } if reason.contains("SlippageOut")));
    }

    #[test]
    fn other_rpc_errors_are_unavailable() {
        let err = rpc_error(-32601, "method not found", None).into_error("eth_call");
        assert!(matches!(err, Error::ResourceUnavailable(_)));
    }

    #[test]
    fn calldata_starts_with_selector_and_carries_deadline() {
        let call = WellCall::SwapFrom {
            from_token:     Address::repeat_byte(1),
            to_token:       Address::repeat_byte(2),
            amount_in:      U256::from(100u64),
            min_amount_out: U256::from(95u64),
            recipient:      Address::repeat_byte(3),
            deadline:       Deadline::MAX,
        };
        let data = encode_call(&call);
        assert_eq!(&data[..4], IWell::swapFromCall::SELECTOR.as_slice());
        assert_eq!(data.len(), 4 + 6 * 32);
        assert!(data[data.len() - 32..].iter().all(|b| *b == 0xff));

        assert_eq!(&encode_call(&WellCall::Sync)[..], IWell::syncCall::SELECTOR.as_slice());
    }

    #[test]
    fn transaction_uses_override_sender_before_default() {
        let well = Address::repeat_byte(0xee);
        let default_from = Address::repeat_byte(0xd0);
        let explicit = Address::repeat_byte(0xe0);

        let tx = ledger(Some(default_from))
            .transaction(well, &WellCall::Sync, &Overrides::default())
            .unwrap();
        assert_eq!(tx["from"], json!(default_from));
        assert_eq!(tx["to"], json!(well));

        let tx = ledger(Some(default_from))
            .transaction(well, &WellCall::Sync, &Overrides::from_address(explicit))
            .unwrap();
        assert_eq!(tx["from"], json!(explicit));
    }

    #[test]
    fn transaction_without_any_sender_is_a_config_error() {
        let err = ledger(None)
            .transaction(Address::repeat_byte(1), &WellCall::Sync, &Overrides::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn well_return_decodes_into_definition_parts() {
        let encoded = IWell::wellCall::abi_encode_returns(&(
            vec![Address::repeat_byte(1), Address::repeat_byte(2)],
            Call { target: Address::repeat_byte(9), data: Bytes::from(vec![1, 2, 3]) },
            vec![Call { target: Address::repeat_byte(8), data: Bytes::new() }],
            Bytes::new(),
            Address::repeat_byte(7),
        ));
        let decoded = IWell::wellCall::abi_decode_returns(&encoded, true).unwrap();
        assert_eq!(decoded._tokens.len(), 2);
        assert_eq!(CallStruct::from(decoded._wellFunction).data, Bytes::from(vec![1, 2, 3]));
        assert_eq!(decoded._aquifer, Address::repeat_byte(7));
    }
}
