//! SDK error type.

use alloy_primitives::Bytes;

/// All errors returned by the Wells SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Caller input ─────────────────────────────────────────────────────────
    /// Malformed caller input, rejected before any ledger call is made.
    #[error("Invalid argument `{param}`: {reason}")]
    InvalidArgument { param: &'static str, reason: String },

    // ── Ledger access ────────────────────────────────────────────────────────
    /// A read or write call to the ledger failed (network, node or decode failure).
    #[error("Ledger unavailable: {0}")]
    ResourceUnavailable(String),

    /// The ledger executed the call and rejected it (insufficient output,
    /// expired deadline, ...). Surfaced unchanged.
    #[error("Call reverted: {reason}")]
    Reverted { reason: String, data: Option<Bytes> },

    // ── Cache sequencing ─────────────────────────────────────────────────────
    /// A write-once field was populated a second time. Always a bug in the
    /// aggregate-load ordering; never retried.
    #[error("Write-once field `{field}` is already populated")]
    StateConflict { field: &'static str },

    // ── Configuration ────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument { param, reason: reason.into() }
    }

    pub(crate) fn unavailable(reason: impl std::fmt::Display) -> Self {
        Error::ResourceUnavailable(reason.to_string())
    }

    /// `true` when the caller can fix the problem locally (bad input or
    /// config); `false` for ledger-side failures that call for a re-quote
    /// or retry.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. } | Error::Config(_))
    }
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
