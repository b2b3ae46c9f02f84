//! Store error types

use thiserror::Error;

use crate::Symbol;

/// Errors returned by store mutations and lookups.
///
/// All of them are recoverable; the store is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("symbol {0} already exists")]
    DuplicateSymbol(Symbol),

    #[error("instrument capacity of {capacity} reached")]
    CapacityExceeded { capacity: usize },

    #[error("symbol {0} not found")]
    SymbolNotFound(String),

    #[error("invalid symbol {0:?}: must be 1-{max} characters without whitespace", max = crate::MAX_SYMBOL_LEN)]
    InvalidSymbol(String),

    #[error("invalid price {price} for {symbol}: must be finite and non-negative")]
    InvalidPrice { symbol: String, price: f64 },
}

pub type TrackerResult<T> = Result<T, TrackerError>;
