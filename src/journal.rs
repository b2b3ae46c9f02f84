//! Transaction journal
//!
//! The store records every add and update through [`TransactionLog`]. The
//! default [`MemoryJournal`] keeps an append-only list in memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Init,
    Update,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub symbol: Symbol,
    pub price: f64,
    pub quantity: i64,
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, symbol: Symbol, price: f64, quantity: i64) -> Self {
        Self {
            kind,
            symbol,
            price,
            quantity,
            recorded_at: Utc::now(),
        }
    }
}

/// Append-only sink for store mutations
pub trait TransactionLog {
    fn record(&mut self, transaction: Transaction);

    /// Up to `limit` entries, newest first
    fn recent(&self, limit: usize) -> Vec<Transaction>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryJournal {
    entries: Vec<Transaction>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionLog for MemoryJournal {
    fn record(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    fn recent(&self, limit: usize) -> Vec<Transaction> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
