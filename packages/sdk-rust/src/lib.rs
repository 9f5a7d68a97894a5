//! Wells Rust SDK
//!
//! Client facade for Basin Wells, constant-function liquidity pools on EVM
//! chains. A [`Well`] handle lazily reads and caches the pool's static
//! configuration, coalesces concurrent reads, and pairs every mutating call
//! with a read-only quote.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wells_sdk::{RpcConfig, SwapFromParams, WellsSdk};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sdk  = WellsSdk::connect(&RpcConfig::new("http://localhost:8545")).await?;
//!     let well = sdk.load_well_str("0xBEA0e11282e2bB5893bEcE110cF199501e872bAd", None).await?;
//!
//!     let tokens = well.tokens().await?;
//!     let (bean, weth) = (tokens[0].clone(), tokens[1].clone());
//!
//!     // 1. Quote first
//!     let amount_in = bean.amount("100")?;
//!     let out = well.swap_from_quote(&bean, &weth, &amount_in).await?;
//!     println!("100 BEAN -> {out} WETH");
//!
//!     // 2. Submit with 0.5% slippage
//!     let tx = well.swap_from(SwapFromParams {
//!         from_token:     bean,
//!         to_token:       weth,
//!         amount_in,
//!         min_amount_out: out.mul_div(995, 1000)?,
//!         recipient:      "0x00000000000000000000000000000000000000aa".parse()?,
//!         deadline:       None,
//!         overrides:      Default::default(),
//!     }).await?;
//!     println!("Submitted: {}", tx.hash);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`Well::load_well`] | Preload any subset of the cached fields in parallel |
//! | [`Well::tokens`] / [`Well::lp_token`] | Lazy, write-once, coalesced reads |
//! | [`Well::reserves`] | Fresh reserves, aligned with the token order |
//! | [`Well::swap_from`] / [`Well::swap_to`] | Exact-in / exact-out swaps |
//! | [`Well::add_liquidity`] | Deposit in any ratio |
//! | [`Well::remove_liquidity`] | Balanced, one-token and imbalanced withdrawals |
//! | [`Well::sync`] / [`Well::skim`] / [`Well::shift`] | Maintenance calls |
//! | `*_quote` | Read-only preview for every family above |

pub mod components;
pub mod config;
pub mod error;
pub mod ledger;
pub mod once;
pub mod operations;
pub mod rpc;
pub mod sdk;
pub mod testing;
pub mod token;
pub mod validate;
pub mod well;

pub use components::{Aquifer, Pump, WellFunction};
pub use config::RpcConfig;
pub use error::{Error, Result};
pub use ledger::{Deadline, Overrides, PendingTx, WellCall, WellLedger};
pub use operations::{
    AddLiquidityParams, RemoveLiquidityImbalancedParams, RemoveLiquidityOneTokenParams,
    RemoveLiquidityParams, ShiftParams, SwapFromParams, SwapToParams,
};
pub use rpc::JsonRpcLedger;
pub use sdk::WellsSdk;
pub use token::{Token, TokenRegistry, TokenValue};
pub use validate::parse_address;
pub use well::{PreloadOptions, Well, WellDetails};
