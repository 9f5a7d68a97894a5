//! Write-once cell for lazily loaded Well configuration.

use std::fmt;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// A field that moves from absent to present exactly once.
///
/// The first `set` wins. Any later `set` returns [`Error::StateConflict`]
/// and leaves the resident value untouched.
pub struct WriteOnce<T> {
    field: &'static str,
    cell:  OnceLock<T>,
}

impl<T> WriteOnce<T> {
    pub const fn new(field: &'static str) -> Self {
        Self { field, cell: OnceLock::new() }
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn set(&self, value: T) -> Result<&T> {
        self.cell
            .set(value)
            .map_err(|_| Error::StateConflict { field: self.field })?;
        self.cell.get().ok_or(Error::StateConflict { field: self.field })
    }

    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl<T: fmt::Debug> fmt::Debug for WriteOnce<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(v) => write!(f, "{}={v:?}", self.field),
            None    => write!(f, "{}=<absent>", self.field),
        }
    }
}
