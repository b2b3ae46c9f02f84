//! Oversold correlation snapshot
//!
//! Rebuilt from scratch on every call: RSI for each instrument, then a
//! directed link from every oversold instrument to every other oversold one.
//! Nothing is kept between snapshots.

use crate::{Instrument, Symbol};

#[derive(Debug, Clone)]
pub struct RiskSnapshot {
    symbols: Vec<Symbol>,
    rsi: Vec<f64>,
    oversold: Vec<bool>,
    /// Outgoing links per instrument, in registration order
    adjacency: Vec<Vec<usize>>,
}

impl RiskSnapshot {
    /// O(n) RSI queries plus O(n²) linking
    pub fn capture(instruments: &[Instrument], rsi_period: usize, oversold_below: f64) -> Self {
        let symbols: Vec<Symbol> = instruments.iter().map(|i| i.symbol.clone()).collect();
        let rsi: Vec<f64> = instruments.iter().map(|i| i.rsi(rsi_period)).collect();
        let oversold: Vec<bool> = rsi.iter().map(|&r| r < oversold_below).collect();

        let adjacency: Vec<Vec<usize>> = (0..instruments.len())
            .map(|i| {
                if !oversold[i] {
                    return Vec::new();
                }
                (0..instruments.len())
                    .filter(|&j| j != i && oversold[j])
                    .collect()
            })
            .collect();

        Self {
            symbols,
            rsi,
            oversold,
            adjacency,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// RSI captured for the instrument at registration position `i`
    #[cfg(test)]
    pub(crate) fn rsi(&self, i: usize) -> Option<f64> {
        self.rsi.get(i).copied()
    }

    pub fn is_oversold(&self, i: usize) -> bool {
        self.oversold.get(i).copied().unwrap_or(false)
    }

    #[cfg(test)]
    pub(crate) fn is_linked(&self, from: usize, to: usize) -> bool {
        self.adjacency
            .get(from)
            .is_some_and(|links| links.contains(&to))
    }

    /// Symbols of every oversold instrument
    pub fn oversold_symbols(&self) -> Vec<Symbol> {
        self.symbols
            .iter()
            .zip(&self.oversold)
            .filter(|(_, flag)| **flag)
            .map(|(s, _)| s.clone())
            .collect()
    }

    /// Walk the links in registration order. Each unvisited oversold
    /// instrument with at least one link seeds a cluster made of itself
    /// followed by everything it links to; all of those are then visited.
    pub fn clusters(&self) -> Vec<Vec<Symbol>> {
        let mut visited = vec![false; self.symbols.len()];
        let mut clusters = Vec::new();

        for i in 0..self.symbols.len() {
            if visited[i] || !self.oversold[i] || self.adjacency[i].is_empty() {
                continue;
            }
            visited[i] = true;
            let mut cluster = vec![self.symbols[i].clone()];
            for &j in &self.adjacency[i] {
                visited[j] = true;
                cluster.push(self.symbols[j].clone());
            }
            clusters.push(cluster);
        }

        clusters
    }
}
