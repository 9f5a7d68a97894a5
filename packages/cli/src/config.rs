//! Config file, environment and flag layering, plus log setup.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wells_sdk::{parse_address, RpcConfig};

/// Values given on the command line or through `WELLS_*` variables.
pub struct ConfigOverrides<'a> {
    pub rpc_url:  Option<&'a str>,
    pub from:     Option<&'a str>,
    pub chain_id: Option<u64>,
}

/// Load `path` when it exists (defaults otherwise), then apply overrides.
pub fn resolve(path: &Path, overrides: ConfigOverrides<'_>) -> Result<RpcConfig> {
    let mut config = if path.exists() {
        RpcConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?
    } else {
        debug!(path = %path.display(), "no config file, using defaults");
        RpcConfig::default()
    };

    if let Some(url) = overrides.rpc_url {
        config.url = url.to_string();
    }
    if let Some(from) = overrides.from {
        config.default_from = Some(parse_address(from, "from").context("--from")?);
    }
    if overrides.chain_id.is_some() {
        config.chain_id = overrides.chain_id;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
/// `--log-level` wins over `RUST_LOG`; the fallback is `warn`.
pub fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
