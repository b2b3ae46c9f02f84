//! Symbol lookup: a fixed-bucket hash map with chaining
//!
//! Buckets are chosen by the classic multiply-by-33 string hash seeded with
//! 5381. The bucket count is fixed at construction; chains grow instead.

use crate::{InstrumentId, Symbol};

#[derive(Debug, Clone)]
pub struct SymbolIndex {
    buckets: Vec<Vec<(Symbol, InstrumentId)>>,
    len: usize,
}

/// `h = h * 33 + byte` over the symbol bytes, starting at 5381
pub fn symbol_hash(symbol: &str) -> u64 {
    symbol
        .bytes()
        .fold(5381u64, |h, b| h.wrapping_mul(33).wrapping_add(u64::from(b)))
}

impl SymbolIndex {
    /// A zero bucket count is treated as one bucket
    pub fn new(buckets: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); buckets.max(1)],
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, symbol: &str) -> usize {
        (symbol_hash(symbol) % self.buckets.len() as u64) as usize
    }

    /// Register `symbol`. Returns false, leaving the map unchanged, when the
    /// symbol is already present.
    pub fn insert(&mut self, symbol: Symbol, id: InstrumentId) -> bool {
        if self.get(symbol.as_str()).is_some() {
            return false;
        }
        let bucket = self.bucket_of(symbol.as_str());
        self.buckets[bucket].push((symbol, id));
        self.len += 1;
        true
    }

    pub fn get(&self, symbol: &str) -> Option<InstrumentId> {
        self.buckets[self.bucket_of(symbol)]
            .iter()
            .find(|(s, _)| s.as_str() == symbol)
            .map(|&(_, id)| id)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    /// Length of the longest chain
    pub fn max_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_matches_reference_values() {
        assert_eq!(symbol_hash(""), 5381);
        assert_eq!(symbol_hash("A"), 5381 * 33 + 65);
        assert_eq!(symbol_hash("AB"), (5381 * 33 + 65) * 33 + 66);
    }

    #[test]
    fn test_insert_and_get() {
        let mut index = SymbolIndex::new(50);
        assert!(index.insert(Symbol::new("RELIANCE"), InstrumentId(0)));
        assert!(index.insert(Symbol::new("TCS"), InstrumentId(1)));
        assert_eq!(index.get("TCS"), Some(InstrumentId(1)));
        assert_eq!(index.get("RELIANCE"), Some(InstrumentId(0)));
        assert_eq!(index.get("INFY"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut index = SymbolIndex::new(50);
        assert!(index.insert(Symbol::new("TCS"), InstrumentId(0)));
        assert!(!index.insert(Symbol::new("TCS"), InstrumentId(1)));
        assert_eq!(index.get("TCS"), Some(InstrumentId(0)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_collisions_chain() {
        let mut index = SymbolIndex::new(1);
        for i in 0..20 {
            index.insert(Symbol::new(format!("SYM{i}")), InstrumentId(i));
        }
        assert_eq!(index.max_chain(), 20);
        for i in 0..20 {
            assert_eq!(index.get(&format!("SYM{i}")), Some(InstrumentId(i)));
        }
    }

    #[test]
    fn test_zero_buckets_still_works() {
        let mut index = SymbolIndex::new(0);
        assert_eq!(index.bucket_count(), 1);
        index.insert(Symbol::new("X"), InstrumentId(0));
        assert!(index.contains("X"));
    }
}
