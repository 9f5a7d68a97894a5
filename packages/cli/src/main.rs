mod config;

use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde_json::{json, Value};
use wells_sdk::{
    parse_address, AddLiquidityParams, Deadline, Overrides, PendingTx, RemoveLiquidityImbalancedParams,
    RemoveLiquidityOneTokenParams, RemoveLiquidityParams, ShiftParams, SwapFromParams, SwapToParams,
    Token, TokenValue, Well, WellsSdk,
};

use crate::config::ConfigOverrides;

const BPS_DENOMINATOR: u64 = 10_000;

// ─── Version banner ───────────────────────────────────────────────────────────

fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  Wells CLI  v{ver}  ·  Basin Well liquidity pools");
    println!("  {}", "─".repeat(62));
    println!("  Ledger    any EVM JSON-RPC node (eth_call / eth_sendTransaction)");
    println!("  Config    wells.toml  ·  WELLS_RPC_URL  ·  WELLS_FROM");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// Wells: quote and trade against Basin Wells from the command line.
///
/// Every command supports --json for machine-readable output.
/// Writes are sent with eth_sendTransaction from a node-managed account.
#[derive(Parser)]
#[command(
    name    = "wells",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Quote, swap and manage liquidity on Basin Wells.",
    after_help = "\
ENVIRONMENT:
  WELLS_RPC_URL    JSON-RPC endpoint  [default: http://localhost:8545]
  WELLS_FROM       Sender account for writes (must be unlocked on the node)
  WELLS_CHAIN_ID   Expected chain id, checked against the node's eth_chainId
  RUST_LOG         Log filter, e.g. wells_sdk=debug

QUICK START:
  wells info        --well 0xBEA0e11282e2bB5893bEcE110cF199501e872bAd
  wells quote swap-from --well <WELL> --in BEAN --out WETH --amount 100
  wells swap-from   --well <WELL> --in BEAN --out WETH --amount 100 --slippage-bps 50
  wells add-liquidity --well <WELL> --amounts 100,0.05"
)]
struct Cli {
    /// TOML config file (rpc url, timeout, default sender, chain id)
    #[arg(long, global = true, value_name = "PATH", default_value = "wells.toml", env = "WELLS_CONFIG")]
    config: PathBuf,

    /// JSON-RPC endpoint (overrides the config file)
    #[arg(long, global = true, value_name = "URL", env = "WELLS_RPC_URL")]
    rpc_url: Option<String>,

    /// Sender account for writes (overrides the config file)
    #[arg(long, global = true, value_name = "ADDRESS", env = "WELLS_FROM")]
    from: Option<String>,

    /// Refuse to run when the node serves a different chain
    #[arg(long, global = true, value_name = "ID", env = "WELLS_CHAIN_ID")]
    chain_id: Option<u64>,

    /// Log filter, e.g. `debug` or `wells_sdk=trace` (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every deadline-bearing write.
#[derive(Args)]
struct ExecArgs {
    /// Receiver of the output (default: the sender)
    #[arg(long, value_name = "ADDRESS")]
    recipient: Option<String>,

    /// Slippage used to derive the bound from a fresh quote when the bound
    /// is not given explicitly
    #[arg(long, value_name = "BPS", default_value_t = 50,
          value_parser = clap::value_parser!(u64).range(0..=10_000))]
    slippage_bps: u64,

    /// Unix timestamp after which the Well rejects the call (default: none)
    #[arg(long, value_name = "UNIX")]
    deadline: Option<u64>,

    /// Gas limit (default: node estimate)
    #[arg(long, value_name = "GAS")]
    gas: Option<u64>,
}

/// Options for `shift`, which carries no deadline.
#[derive(Args)]
struct ShiftArgs {
    /// Receiver of the output (default: the sender)
    #[arg(long, value_name = "ADDRESS")]
    recipient: Option<String>,

    #[arg(long, value_name = "BPS", default_value_t = 50,
          value_parser = clap::value_parser!(u64).range(0..=10_000))]
    slippage_bps: u64,

    #[arg(long, value_name = "GAS")]
    gas: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a Well's configuration and current reserves
    Info {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
    },

    /// Show current reserves
    Reserves {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
    },

    /// Read-only previews (no transaction is sent)
    Quote {
        #[command(subcommand)]
        quote: QuoteCommand,
    },

    /// Swap an exact amount in for at least --min-out
    #[command(
        after_help = "\
EXAMPLES:
  # 100 BEAN for WETH, bound derived from a quote at 0.5% slippage
  wells swap-from --well <WELL> --in BEAN --out WETH --amount 100

  # Explicit bound, token with transfer fee
  wells swap-from --well <WELL> --in <TOKEN> --out WETH --amount 100 --min-out 0.04 --fee-on-transfer"
    )]
    SwapFrom {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        /// Token sold (symbol or address)
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,
        /// Token bought (symbol or address)
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,
        #[arg(long, value_name = "AMOUNT")]
        amount: String,
        #[arg(long, value_name = "AMOUNT")]
        min_out: Option<String>,
        /// Use swapFromFeeOnTransfer
        #[arg(long, default_value_t = false)]
        fee_on_transfer: bool,
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Swap at most --max-in for an exact amount out
    SwapTo {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,
        /// Exact amount of the output token to receive
        #[arg(long, value_name = "AMOUNT")]
        amount_out: String,
        #[arg(long, value_name = "AMOUNT")]
        max_in: Option<String>,
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Deposit tokens in any ratio for LP tokens
    AddLiquidity {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        /// Comma-separated amounts in the Well's token order, e.g. 100,0.05
        #[arg(long, value_name = "A,B,..")]
        amounts: String,
        #[arg(long, value_name = "AMOUNT")]
        min_lp: Option<String>,
        /// Use addLiquidityFeeOnTransfer
        #[arg(long, default_value_t = false)]
        fee_on_transfer: bool,
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Burn LP tokens for every underlying token
    RemoveLiquidity {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        /// LP tokens to burn
        #[arg(long, value_name = "AMOUNT")]
        lp: String,
        /// Comma-separated minimums in the Well's token order
        #[arg(long, value_name = "A,B,..")]
        min_amounts: Option<String>,
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Burn LP tokens for a single underlying token
    RemoveOneToken {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long, value_name = "AMOUNT")]
        lp: String,
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,
        #[arg(long, value_name = "AMOUNT")]
        min_out: Option<String>,
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Withdraw exact token amounts, burning at most --max-lp
    RemoveImbalanced {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long, value_name = "A,B,..")]
        amounts: String,
        #[arg(long, value_name = "AMOUNT")]
        max_lp: Option<String>,
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Set reserves to the Well's actual balances
    Sync {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long, value_name = "GAS")]
        gas: Option<u64>,
    },

    /// Send balances in excess of reserves to a recipient
    Skim {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long, value_name = "ADDRESS")]
        recipient: Option<String>,
        #[arg(long, value_name = "GAS")]
        gas: Option<u64>,
    },

    /// Swap excess balances into one token
    Shift {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,
        #[arg(long, value_name = "AMOUNT")]
        min_out: Option<String>,
        #[command(flatten)]
        exec: ShiftArgs,
    },
}

#[derive(Subcommand)]
enum QuoteCommand {
    /// Output for an exact input
    SwapFrom {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,
        #[arg(long, value_name = "AMOUNT")]
        amount: String,
    },
    /// Input needed for an exact output
    SwapTo {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,
        #[arg(long, value_name = "AMOUNT")]
        amount_out: String,
    },
    /// LP tokens minted for a deposit
    AddLiquidity {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long, value_name = "A,B,..")]
        amounts: String,
    },
    /// Tokens received for burning LP
    RemoveLiquidity {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long, value_name = "AMOUNT")]
        lp: String,
    },
    /// One token received for burning LP
    RemoveOneToken {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long, value_name = "AMOUNT")]
        lp: String,
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,
    },
    /// LP tokens burned for an exact withdrawal
    RemoveImbalanced {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long, value_name = "A,B,..")]
        amounts: String,
    },
    /// Output of shifting excess balances into one token
    Shift {
        #[arg(long, value_name = "ADDRESS")]
        well: String,
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,
    },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    config::init_logging(cli.log_level.as_deref());

    let rpc = config::resolve(&cli.config, ConfigOverrides {
        rpc_url:  cli.rpc_url.as_deref(),
        from:     cli.from.as_deref(),
        chain_id: cli.chain_id,
    })?;
    let sdk = WellsSdk::connect(&rpc).await.context("connecting to ledger")?;
    let ctx = Ctx { sdk, sender: rpc.default_from, json: cli.json };

    match cli.command {
        Commands::Info { well } => cmd_info(&ctx, &well).await?,
        Commands::Reserves { well } => cmd_reserves(&ctx, &well).await?,
        Commands::Quote { quote } => cmd_quote(&ctx, quote).await?,
        Commands::SwapFrom { well, token_in, token_out, amount, min_out, fee_on_transfer, exec } => {
            cmd_swap_from(&ctx, &well, &token_in, &token_out, &amount, min_out.as_deref(), fee_on_transfer, &exec)
                .await?
        }
        Commands::SwapTo { well, token_in, token_out, amount_out, max_in, exec } => {
            cmd_swap_to(&ctx, &well, &token_in, &token_out, &amount_out, max_in.as_deref(), &exec).await?
        }
        Commands::AddLiquidity { well, amounts, min_lp, fee_on_transfer, exec } => {
            cmd_add_liquidity(&ctx, &well, &amounts, min_lp.as_deref(), fee_on_transfer, &exec).await?
        }
        Commands::RemoveLiquidity { well, lp, min_amounts, exec } => {
            cmd_remove_liquidity(&ctx, &well, &lp, min_amounts.as_deref(), &exec).await?
        }
        Commands::RemoveOneToken { well, lp, token_out, min_out, exec } => {
            cmd_remove_one_token(&ctx, &well, &lp, &token_out, min_out.as_deref(), &exec).await?
        }
        Commands::RemoveImbalanced { well, amounts, max_lp, exec } => {
            cmd_remove_imbalanced(&ctx, &well, &amounts, max_lp.as_deref(), &exec).await?
        }
        Commands::Sync { well, gas } => cmd_sync(&ctx, &well, gas).await?,
        Commands::Skim { well, recipient, gas } => cmd_skim(&ctx, &well, recipient.as_deref(), gas).await?,
        Commands::Shift { well, token_out, min_out, exec } => {
            cmd_shift(&ctx, &well, &token_out, min_out.as_deref(), &exec).await?
        }
    }

    Ok(())
}

// ─── Context ──────────────────────────────────────────────────────────────────

struct Ctx {
    sdk:    WellsSdk,
    sender: Option<Address>,
    json:   bool,
}

impl Ctx {
    fn well(&self, address: &str) -> Result<Well> {
        let address = parse_address(address, "well").context("--well")?;
        Ok(self.sdk.well(address)?)
    }

    fn recipient(&self, recipient: Option<&str>) -> Result<Address> {
        match recipient {
            Some(r) => Ok(parse_address(r, "recipient").context("--recipient")?),
            None => self.sender.ok_or_else(|| {
                anyhow!(
                    "No recipient.\n  \
                     Pass --recipient, or set a sender with --from / WELLS_FROM to receive the output."
                )
            }),
        }
    }

    fn overrides(&self, gas: Option<u64>) -> Overrides {
        Overrides {
            from: self.sender,
            gas:  gas.map(U256::from),
            ..Overrides::default()
        }
    }
}

// ─── info ─────────────────────────────────────────────────────────────────────

async fn cmd_info(ctx: &Ctx, address: &str) -> Result<()> {
    let well = ctx.well(address)?;
    well.load_well(None).await.context("loading well")?;

    let name = well.name().await?;
    let lp = well.lp_token().await?;
    let details = well.details().await?;
    let reserves = well.reserves().await?;

    if ctx.json {
        println!("{}", json!({
            "status":        "ok",
            "command":       "info",
            "well":          well.address(),
            "name":          name,
            "lp_token":      lp,
            "tokens":        details.tokens.iter().collect::<Vec<_>>(),
            "reserves":      amounts_json(&reserves),
            "well_function": details.well_function,
            "pumps":         details.pumps.iter().collect::<Vec<_>>(),
            "well_data":     details.well_data,
            "aquifer":       details.aquifer,
        }));
    } else {
        println!("─── Well: {name} ──────────────────────────────────────────────");
        println!("  Address          {}", well.address());
        println!("  LP token         {lp}  ({} decimals)", lp.decimals);
        println!();
        for (i, (token, reserve)) in details.tokens.iter().zip(&reserves).enumerate() {
            println!("  Token {i}          {token}");
            println!("  Reserve {i}        {:>28}", format!("{reserve} {}", token.symbol));
        }
        println!();
        println!("  Well function    {}", details.well_function);
        if details.pumps.is_empty() {
            println!("  Pumps            — (none)");
        }
        for pump in details.pumps.iter() {
            println!("  Pump             {pump}");
        }
        println!("  Well data        {} bytes", details.well_data.len());
        println!("  Aquifer          {}", details.aquifer);
    }
    Ok(())
}

// ─── reserves ─────────────────────────────────────────────────────────────────

async fn cmd_reserves(ctx: &Ctx, address: &str) -> Result<()> {
    let well = ctx.well(address)?;
    let tokens = well.tokens().await?;
    let reserves = well.reserves().await?;

    if ctx.json {
        println!("{}", json!({
            "status":   "ok",
            "command":  "reserves",
            "well":     well.address(),
            "tokens":   tokens.iter().map(|t| &t.symbol).collect::<Vec<_>>(),
            "reserves": amounts_json(&reserves),
        }));
    } else {
        println!("─── Reserves: {} ──────────────────────────", well.address());
        for (token, reserve) in tokens.iter().zip(&reserves) {
            println!("  {:<16} {:>28}", token.symbol, reserve.to_string());
        }
    }
    Ok(())
}

// ─── quote ────────────────────────────────────────────────────────────────────

async fn cmd_quote(ctx: &Ctx, quote: QuoteCommand) -> Result<()> {
    let (name, well, result): (&str, Well, Value) = match quote {
        QuoteCommand::SwapFrom { well, token_in, token_out, amount } => {
            let well = ctx.well(&well)?;
            let tokens = well.tokens().await?;
            let from = resolve_token(&tokens, &token_in).context("--in")?;
            let to = resolve_token(&tokens, &token_out).context("--out")?;
            let amount_in = from.amount(&amount).context("--amount")?;
            let out = well.swap_from_quote(&from, &to, &amount_in).await?;
            ("swap-from", well, json!({
                "amount_in":  amount_json(&from, &amount_in),
                "amount_out": amount_json(&to, &out),
            }))
        }
        QuoteCommand::SwapTo { well, token_in, token_out, amount_out } => {
            let well = ctx.well(&well)?;
            let tokens = well.tokens().await?;
            let from = resolve_token(&tokens, &token_in).context("--in")?;
            let to = resolve_token(&tokens, &token_out).context("--out")?;
            let amount_out = to.amount(&amount_out).context("--amount-out")?;
            let amount_in = well.swap_to_quote(&from, &to, &amount_out).await?;
            ("swap-to", well, json!({
                "amount_in":  amount_json(&from, &amount_in),
                "amount_out": amount_json(&to, &amount_out),
            }))
        }
        QuoteCommand::AddLiquidity { well, amounts } => {
            let well = ctx.well(&well)?;
            let tokens = well.tokens().await?;
            let amounts = parse_amounts(&tokens, &amounts).context("--amounts")?;
            let lp = well.lp_token().await?;
            let lp_out = well.add_liquidity_quote(&amounts).await?;
            ("add-liquidity", well, json!({
                "amounts_in": amounts_json(&amounts),
                "lp_out":     amount_json(&lp, &lp_out),
            }))
        }
        QuoteCommand::RemoveLiquidity { well, lp } => {
            let well = ctx.well(&well)?;
            let lp_token = well.lp_token().await?;
            let lp_in = lp_token.amount(&lp).context("--lp")?;
            let out = well.remove_liquidity_quote(&lp_in).await?;
            ("remove-liquidity", well, json!({
                "lp_in":       amount_json(&lp_token, &lp_in),
                "amounts_out": amounts_json(&out),
            }))
        }
        QuoteCommand::RemoveOneToken { well, lp, token_out } => {
            let well = ctx.well(&well)?;
            let tokens = well.tokens().await?;
            let to = resolve_token(&tokens, &token_out).context("--out")?;
            let lp_token = well.lp_token().await?;
            let lp_in = lp_token.amount(&lp).context("--lp")?;
            let out = well.remove_liquidity_one_token_quote(&lp_in, &to).await?;
            ("remove-one-token", well, json!({
                "lp_in":      amount_json(&lp_token, &lp_in),
                "amount_out": amount_json(&to, &out),
            }))
        }
        QuoteCommand::RemoveImbalanced { well, amounts } => {
            let well = ctx.well(&well)?;
            let tokens = well.tokens().await?;
            let amounts = parse_amounts(&tokens, &amounts).context("--amounts")?;
            let lp_token = well.lp_token().await?;
            let lp_in = well.remove_liquidity_imbalanced_quote(&amounts).await?;
            ("remove-imbalanced", well, json!({
                "amounts_out": amounts_json(&amounts),
                "lp_in":       amount_json(&lp_token, &lp_in),
            }))
        }
        QuoteCommand::Shift { well, token_out } => {
            let well = ctx.well(&well)?;
            let tokens = well.tokens().await?;
            let to = resolve_token(&tokens, &token_out).context("--out")?;
            let out = well.shift_quote(&to).await?;
            ("shift", well, json!({ "amount_out": amount_json(&to, &out) }))
        }
    };

    if ctx.json {
        println!("{}", json!({
            "status":  "ok",
            "command": format!("quote {name}"),
            "well":    well.address(),
            "quote":   result,
        }));
    } else {
        println!("─── Quote: {name} ──────────────────────────────────────────────");
        println!("  Well             {}", well.address());
        print_fields(&result, "  ");
        println!();
        println!("  No transaction sent. Quotes reflect current state and may move before execution.");
    }
    Ok(())
}

// ─── swap-from ────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
async fn cmd_swap_from(
    ctx:             &Ctx,
    well:            &str,
    token_in:        &str,
    token_out:       &str,
    amount:          &str,
    min_out:         Option<&str>,
    fee_on_transfer: bool,
    exec:            &ExecArgs,
) -> Result<()> {
    let well = ctx.well(well)?;
    let tokens = well.tokens().await?;
    let from = resolve_token(&tokens, token_in).context("--in")?;
    let to = resolve_token(&tokens, token_out).context("--out")?;
    if from.address == to.address {
        return Err(anyhow!("--in and --out must be different tokens."));
    }
    let amount_in = from.amount(amount).context("--amount")?;
    let min_amount_out = match min_out {
        Some(m) => to.amount(m).context("--min-out")?,
        None => lower_bound(&well.swap_from_quote(&from, &to, &amount_in).await?, exec.slippage_bps)?,
    };

    let params = SwapFromParams {
        from_token:     from.clone(),
        to_token:       to.clone(),
        amount_in,
        min_amount_out,
        recipient:      ctx.recipient(exec.recipient.as_deref())?,
        deadline:       exec.deadline.map(Deadline::from),
        overrides:      ctx.overrides(exec.gas),
    };
    let tx = if fee_on_transfer {
        well.swap_from_fee_on_transfer(params).await?
    } else {
        well.swap_from(params).await?
    };

    print_tx(ctx, "swap-from", &tx, json!({
        "amount_in":      amount_json(&from, &amount_in),
        "min_amount_out": amount_json(&to, &min_amount_out),
        "deadline":       deadline_json(exec.deadline),
    }));
    Ok(())
}

// ─── swap-to ──────────────────────────────────────────────────────────────────

async fn cmd_swap_to(
    ctx:        &Ctx,
    well:       &str,
    token_in:   &str,
    token_out:  &str,
    amount_out: &str,
    max_in:     Option<&str>,
    exec:       &ExecArgs,
) -> Result<()> {
    let well = ctx.well(well)?;
    let tokens = well.tokens().await?;
    let from = resolve_token(&tokens, token_in).context("--in")?;
    let to = resolve_token(&tokens, token_out).context("--out")?;
    if from.address == to.address {
        return Err(anyhow!("--in and --out must be different tokens."));
    }
    let amount_out = to.amount(amount_out).context("--amount-out")?;
    let max_amount_in = match max_in {
        Some(m) => from.amount(m).context("--max-in")?,
        None => upper_bound(&well.swap_to_quote(&from, &to, &amount_out).await?, exec.slippage_bps)?,
    };

    let tx = well
        .swap_to(SwapToParams {
            from_token: from.clone(),
            to_token:   to.clone(),
            max_amount_in,
            amount_out,
            recipient:  ctx.recipient(exec.recipient.as_deref())?,
            deadline:   exec.deadline.map(Deadline::from),
            overrides:  ctx.overrides(exec.gas),
        })
        .await?;

    print_tx(ctx, "swap-to", &tx, json!({
        "max_amount_in": amount_json(&from, &max_amount_in),
        "amount_out":    amount_json(&to, &amount_out),
        "deadline":      deadline_json(exec.deadline),
    }));
    Ok(())
}

// ─── add-liquidity ────────────────────────────────────────────────────────────

async fn cmd_add_liquidity(
    ctx:             &Ctx,
    well:            &str,
    amounts:         &str,
    min_lp:          Option<&str>,
    fee_on_transfer: bool,
    exec:            &ExecArgs,
) -> Result<()> {
    let well = ctx.well(well)?;
    let tokens = well.tokens().await?;
    let lp = well.lp_token().await?;
    let token_amounts_in = parse_amounts(&tokens, amounts).context("--amounts")?;
    let min_lp_amount_out = match min_lp {
        Some(m) => lp.amount(m).context("--min-lp")?,
        None => lower_bound(&well.add_liquidity_quote(&token_amounts_in).await?, exec.slippage_bps)?,
    };

    let params = AddLiquidityParams {
        token_amounts_in: token_amounts_in.clone(),
        min_lp_amount_out,
        recipient:        ctx.recipient(exec.recipient.as_deref())?,
        deadline:         exec.deadline.map(Deadline::from),
        overrides:        ctx.overrides(exec.gas),
    };
    let tx = if fee_on_transfer {
        well.add_liquidity_fee_on_transfer(params).await?
    } else {
        well.add_liquidity(params).await?
    };

    print_tx(ctx, "add-liquidity", &tx, json!({
        "amounts_in": amounts_json(&token_amounts_in),
        "min_lp_out": amount_json(&lp, &min_lp_amount_out),
        "deadline":   deadline_json(exec.deadline),
    }));
    Ok(())
}

// ─── remove-liquidity ─────────────────────────────────────────────────────────

async fn cmd_remove_liquidity(
    ctx:         &Ctx,
    well:        &str,
    lp:          &str,
    min_amounts: Option<&str>,
    exec:        &ExecArgs,
) -> Result<()> {
    let well = ctx.well(well)?;
    let tokens = well.tokens().await?;
    let lp_token = well.lp_token().await?;
    let lp_amount_in = lp_token.amount(lp).context("--lp")?;
    let min_token_amounts_out = match min_amounts {
        Some(m) => parse_amounts(&tokens, m).context("--min-amounts")?,
        None => well
            .remove_liquidity_quote(&lp_amount_in)
            .await?
            .iter()
            .map(|v| lower_bound(v, exec.slippage_bps))
            .collect::<Result<Vec<_>>>()?,
    };

    let tx = well
        .remove_liquidity(RemoveLiquidityParams {
            lp_amount_in,
            min_token_amounts_out: min_token_amounts_out.clone(),
            recipient:             ctx.recipient(exec.recipient.as_deref())?,
            deadline:              exec.deadline.map(Deadline::from),
            overrides:             ctx.overrides(exec.gas),
        })
        .await?;

    print_tx(ctx, "remove-liquidity", &tx, json!({
        "lp_in":           amount_json(&lp_token, &lp_amount_in),
        "min_amounts_out": amounts_json(&min_token_amounts_out),
        "deadline":        deadline_json(exec.deadline),
    }));
    Ok(())
}

// ─── remove-one-token ─────────────────────────────────────────────────────────

async fn cmd_remove_one_token(
    ctx:       &Ctx,
    well:      &str,
    lp:        &str,
    token_out: &str,
    min_out:   Option<&str>,
    exec:      &ExecArgs,
) -> Result<()> {
    let well = ctx.well(well)?;
    let tokens = well.tokens().await?;
    let to = resolve_token(&tokens, token_out).context("--out")?;
    let lp_token = well.lp_token().await?;
    let lp_amount_in = lp_token.amount(lp).context("--lp")?;
    let min_token_amount_out = match min_out {
        Some(m) => to.amount(m).context("--min-out")?,
        None => lower_bound(
            &well.remove_liquidity_one_token_quote(&lp_amount_in, &to).await?,
            exec.slippage_bps,
        )?,
    };

    let tx = well
        .remove_liquidity_one_token(RemoveLiquidityOneTokenParams {
            lp_amount_in,
            token_out: to.clone(),
            min_token_amount_out,
            recipient: ctx.recipient(exec.recipient.as_deref())?,
            deadline:  exec.deadline.map(Deadline::from),
            overrides: ctx.overrides(exec.gas),
        })
        .await?;

    print_tx(ctx, "remove-one-token", &tx, json!({
        "lp_in":          amount_json(&lp_token, &lp_amount_in),
        "min_amount_out": amount_json(&to, &min_token_amount_out),
        "deadline":       deadline_json(exec.deadline),
    }));
    Ok(())
}

// ─── remove-imbalanced ────────────────────────────────────────────────────────

async fn cmd_remove_imbalanced(
    ctx:     &Ctx,
    well:    &str,
    amounts: &str,
    max_lp:  Option<&str>,
    exec:    &ExecArgs,
) -> Result<()> {
    let well = ctx.well(well)?;
    let tokens = well.tokens().await?;
    let lp_token = well.lp_token().await?;
    let token_amounts_out = parse_amounts(&tokens, amounts).context("--amounts")?;
    let max_lp_amount_in = match max_lp {
        Some(m) => lp_token.amount(m).context("--max-lp")?,
        None => upper_bound(
            &well.remove_liquidity_imbalanced_quote(&token_amounts_out).await?,
            exec.slippage_bps,
        )?,
    };

    let tx = well
        .remove_liquidity_imbalanced(RemoveLiquidityImbalancedParams {
            max_lp_amount_in,
            token_amounts_out: token_amounts_out.clone(),
            recipient:         ctx.recipient(exec.recipient.as_deref())?,
            deadline:          exec.deadline.map(Deadline::from),
            overrides:         ctx.overrides(exec.gas),
        })
        .await?;

    print_tx(ctx, "remove-imbalanced", &tx, json!({
        "max_lp_in":   amount_json(&lp_token, &max_lp_amount_in),
        "amounts_out": amounts_json(&token_amounts_out),
        "deadline":    deadline_json(exec.deadline),
    }));
    Ok(())
}

// ─── sync / skim / shift ──────────────────────────────────────────────────────

async fn cmd_sync(ctx: &Ctx, well: &str, gas: Option<u64>) -> Result<()> {
    let well = ctx.well(well)?;
    let tx = well.sync(&ctx.overrides(gas)).await?;
    print_tx(ctx, "sync", &tx, json!({}));
    Ok(())
}

async fn cmd_skim(ctx: &Ctx, well: &str, recipient: Option<&str>, gas: Option<u64>) -> Result<()> {
    let well = ctx.well(well)?;
    let recipient = ctx.recipient(recipient)?;
    let tx = well.skim(recipient, &ctx.overrides(gas)).await?;
    print_tx(ctx, "skim", &tx, json!({ "recipient": recipient }));
    Ok(())
}

async fn cmd_shift(ctx: &Ctx, well: &str, token_out: &str, min_out: Option<&str>, exec: &ShiftArgs) -> Result<()> {
    let well = ctx.well(well)?;
    let tokens = well.tokens().await?;
    let to = resolve_token(&tokens, token_out).context("--out")?;
    let min_amount_out = match min_out {
        Some(m) => to.amount(m).context("--min-out")?,
        None => lower_bound(&well.shift_quote(&to).await?, exec.slippage_bps)?,
    };
    let recipient = ctx.recipient(exec.recipient.as_deref())?;

    let tx = well
        .shift(ShiftParams {
            token_out: to.clone(),
            min_amount_out,
            recipient,
            overrides: ctx.overrides(exec.gas),
        })
        .await?;

    print_tx(ctx, "shift", &tx, json!({
        "min_amount_out": amount_json(&to, &min_amount_out),
        "recipient":      recipient,
    }));
    Ok(())
}

// ─── Shared utilities ─────────────────────────────────────────────────────────

/// Match a token by symbol (case-insensitive) or address among the Well's tokens.
fn resolve_token(tokens: &[Token], symbol_or_address: &str) -> Result<Token> {
    let wanted = symbol_or_address.trim();
    if let Some(token) = tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(wanted)) {
        return Ok(token.clone());
    }
    if let Ok(address) = parse_address(wanted, "token") {
        if let Some(token) = tokens.iter().find(|t| t.address == address) {
            return Ok(token.clone());
        }
    }
    Err(anyhow!(
        "Token '{}' is not in this Well. Use one of: {}",
        wanted,
        tokens.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>().join(", ")
    ))
}

/// Parse `100,0.05` into one amount per Well token, in token order.
fn parse_amounts(tokens: &[Token], csv: &str) -> Result<Vec<TokenValue>> {
    let parts: Vec<&str> = csv.split(',').map(str::trim).collect();
    if parts.len() != tokens.len() {
        return Err(anyhow!(
            "Expected {} comma-separated amounts ({}), got {}.",
            tokens.len(),
            tokens.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>().join(", "),
            parts.len()
        ));
    }
    tokens
        .iter()
        .zip(parts)
        .map(|(token, part)| token.amount(part).with_context(|| format!("amount for {}", token.symbol)))
        .collect()
}

fn lower_bound(quote: &TokenValue, slippage_bps: u64) -> Result<TokenValue> {
    Ok(quote.mul_div(BPS_DENOMINATOR - slippage_bps, BPS_DENOMINATOR)?)
}

fn upper_bound(quote: &TokenValue, slippage_bps: u64) -> Result<TokenValue> {
    Ok(quote.mul_div(BPS_DENOMINATOR + slippage_bps, BPS_DENOMINATOR)?)
}

fn amount_json(token: &Token, value: &TokenValue) -> Value {
    json!({
        "token":  token.address,
        "symbol": token.symbol,
        "amount": value.to_string(),
        "raw":    value.raw().to_string(),
    })
}

fn amounts_json(values: &[TokenValue]) -> Value {
    Value::Array(values.iter().map(|v| json!(v.to_string())).collect())
}

fn deadline_json(deadline: Option<u64>) -> Value {
    deadline.map_or(Value::Null, |d| json!(d))
}

/// Print a JSON object as aligned `key  value` lines.
fn print_fields(value: &Value, indent: &str) {
    if let Value::Object(map) = value {
        for (key, field) in map {
            match field {
                Value::Object(inner) if inner.contains_key("amount") => {
                    let amount = inner["amount"].as_str().unwrap_or_default();
                    let symbol = inner["symbol"].as_str().unwrap_or_default();
                    println!("{indent}{key:<16} {:>28}", format!("{amount} {symbol}"));
                }
                Value::Array(items) => {
                    let joined = items.iter().map(|v| v.as_str().unwrap_or_default()).collect::<Vec<_>>();
                    println!("{indent}{key:<16} {}", joined.join(", "));
                }
                Value::Null => println!("{indent}{key:<16} —"),
                other => println!("{indent}{key:<16} {other}"),
            }
        }
    }
}

fn print_tx(ctx: &Ctx, command: &str, tx: &PendingTx, details: Value) {
    if ctx.json {
        let mut out = json!({
            "status":   "submitted",
            "command":  command,
            "well":     tx.well,
            "function": tx.function,
            "tx_hash":  tx.hash,
        });
        if let (Value::Object(out), Value::Object(details)) = (&mut out, details) {
            out.extend(details);
        }
        println!("{out}");
    } else {
        println!("─── Transaction Submitted ────────────────────────────────────────");
        println!("  Function         {}", tx.function);
        println!("  Well             {}", tx.well);
        println!("  Tx hash          {}", tx.hash);
        print_fields(&details, "  ");
        println!();
        println!("  Not yet final. Track the hash on your node or explorer.");
    }
}
