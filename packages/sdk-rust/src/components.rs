//! Handles for the on-ledger components a Well references.
//!
//! These are plain `(address, data)` references taken from the combined
//! configuration read. The Well function defines the reserve ↔ LP-supply
//! relationship, pumps observe reserves over time, and the aquifer is the
//! factory that bored the Well.

use std::fmt;

use alloy_primitives::{Address, Bytes};
use serde::Serialize;

use crate::ledger::CallStruct;

/// Pricing formula contract plus its opaque configuration bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WellFunction {
    address: Address,
    data:    Bytes,
}

impl WellFunction {
    pub fn new(address: Address, data: Bytes) -> Self {
        Self { address, data }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl From<CallStruct> for WellFunction {
    fn from(call: CallStruct) -> Self {
        Self::new(call.target, call.data)
    }
}

impl fmt::Display for WellFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (data: {} bytes)", self.address, self.data.len())
    }
}

/// Reserve-observing contract attached to a Well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pump {
    address: Address,
    data:    Bytes,
}

impl Pump {
    pub fn new(address: Address, data: Bytes) -> Self {
        Self { address, data }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl From<CallStruct> for Pump {
    fn from(call: CallStruct) -> Self {
        Self::new(call.target, call.data)
    }
}

impl fmt::Display for Pump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (data: {} bytes)", self.address, self.data.len())
    }
}

/// The Well factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Aquifer {
    address: Address,
}

impl Aquifer {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Display for Aquifer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}
