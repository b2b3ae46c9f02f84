//! Trailing price window with O(log n) SMA and RSI
//!
//! A fixed-capacity ring of price samples mirrored into three prefix-sum
//! trees: raw price, per-step gain and per-step loss. Any logical window
//! `[cursor - period, cursor - 1]` maps onto at most two contiguous physical
//! ranges, so both indicators cost two range queries at most.

use serde::{Deserialize, Serialize};

use crate::fenwick::PrefixSumTree;

/// Relative size below which a gain/loss window sum counts as zero
const RESIDUE_TOLERANCE: f64 = 1e-9;

/// What happens to the gain/loss trees when a full ring overwrites a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionMode {
    /// Subtract the evicted slot's gain and loss before overwriting
    #[default]
    Exact,
    /// Only the price tree is corrected. Gain and loss keep accumulating in
    /// the overwritten slots, so RSI drifts once the ring has wrapped.
    LegacyDrift,
}

#[derive(Debug, Clone)]
pub struct PriceWindow {
    prices: Vec<f64>,
    gains: Vec<f64>,
    losses: Vec<f64>,
    price_tree: PrefixSumTree,
    gain_tree: PrefixSumTree,
    loss_tree: PrefixSumTree,
    /// Next slot to write
    cursor: usize,
    filled: usize,
    eviction: EvictionMode,
}

impl PriceWindow {
    pub fn new(capacity: usize, eviction: EvictionMode) -> Self {
        Self {
            prices: vec![0.0; capacity],
            gains: vec![0.0; capacity],
            losses: vec![0.0; capacity],
            price_tree: PrefixSumTree::new(capacity),
            gain_tree: PrefixSumTree::new(capacity),
            loss_tree: PrefixSumTree::new(capacity),
            cursor: 0,
            filled: 0,
            eviction,
        }
    }

    /// A window holding a single seed sample with no recorded change
    pub fn seeded(capacity: usize, eviction: EvictionMode, price: f64) -> Self {
        let mut window = Self::new(capacity, eviction);
        window.append(price, price);
        window
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.prices.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.filled
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled == self.capacity()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Most recently recorded sample
    pub fn latest(&self) -> Option<f64> {
        if self.filled == 0 {
            return None;
        }
        let cap = self.capacity();
        Some(self.prices[(self.cursor + cap - 1) % cap])
    }

    /// Samples oldest to newest
    pub fn samples(&self) -> Vec<f64> {
        let cap = self.capacity();
        (0..self.filled)
            .map(|back| self.prices[(self.cursor + cap - self.filled + back) % cap])
            .collect()
    }

    /// Record `new_price`, evicting the oldest sample once the ring is full
    pub fn append(&mut self, previous_price: f64, new_price: f64) {
        let cap = self.capacity();
        if cap == 0 {
            return;
        }

        let delta = new_price - previous_price;
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        let slot = self.cursor;

        if self.is_full() {
            self.price_tree.add(slot, -self.prices[slot]);
            if self.eviction == EvictionMode::Exact {
                self.gain_tree.add(slot, -self.gains[slot]);
                self.loss_tree.add(slot, -self.losses[slot]);
            }
        }

        self.prices[slot] = new_price;
        self.gains[slot] = gain;
        self.losses[slot] = loss;
        self.price_tree.add(slot, new_price);
        self.gain_tree.add(slot, gain);
        self.loss_tree.add(slot, loss);

        self.cursor = (slot + 1) % cap;
        if self.filled < cap {
            self.filled += 1;
        }
    }

    /// Mean of the last `period` samples (clamped to what is filled).
    /// `None` when there is nothing to average.
    pub fn sma(&self, period: usize) -> Option<f64> {
        let period = period.min(self.filled);
        if period == 0 {
            return None;
        }
        Some(self.window_sum(&self.price_tree, period) / period as f64)
    }

    /// RSI over the last `period` price changes.
    /// `None` until the window holds `period + 1` samples.
    pub fn rsi(&self, period: usize) -> Option<f64> {
        if period == 0 || self.filled < period + 1 {
            return None;
        }

        let avg_gain = self.channel_sum(&self.gain_tree, period) / period as f64;
        let avg_loss = self.channel_sum(&self.loss_tree, period) / period as f64;

        if avg_loss == 0.0 {
            return Some(100.0);
        }
        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }

    /// Window sum of a gain or loss channel. Range subtraction and evictions
    /// leave rounding residue on either side of zero; anything within
    /// tolerance of the channel's total is treated as exactly zero.
    fn channel_sum(&self, tree: &PrefixSumTree, period: usize) -> f64 {
        let sum = self.window_sum(tree, period);
        let tolerance = RESIDUE_TOLERANCE * tree.total().abs().max(1.0);
        if sum <= tolerance {
            0.0
        } else {
            sum
        }
    }

    /// Sum of `tree` over the logical window ending just before the cursor
    fn window_sum(&self, tree: &PrefixSumTree, period: usize) -> f64 {
        let cap = self.capacity();
        let start = (self.cursor + cap - period) % cap;
        let end = (self.cursor + cap - 1) % cap;

        if start <= end {
            tree.range_sum(start, end)
        } else {
            tree.range_sum(start, cap - 1) + tree.range_sum(0, end)
        }
    }
}
