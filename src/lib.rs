//! Stock Tracker
//!
//! An in-memory portfolio tracker: a bounded store of instruments, each with a
//! sliding price window that answers SMA and RSI queries in logarithmic time,
//! plus gain heaps, a name-ordered index, a hashed symbol index and a prefix
//! trie kept in step with every mutation.

pub mod api;
pub mod config;
pub mod error;
pub mod fenwick;
pub mod heaps;
pub mod journal;
pub mod ordered;
pub mod risk;
pub mod store;
pub mod symbol_index;
pub mod trie;
pub mod types;
pub mod window;

pub use config::Config;
pub use error::{TrackerError, TrackerResult};
pub use heaps::{GainHeaps, HeapKind, HeapMember};
pub use journal::{MemoryJournal, Transaction, TransactionKind, TransactionLog};
pub use risk::RiskSnapshot;
pub use store::{InstrumentStore, MAX_SYMBOL_LEN};
pub use types::*;
pub use window::{EvictionMode, PriceWindow};
