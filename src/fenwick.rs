//! Prefix-sum tree (binary indexed tree) over a fixed number of slots
//!
//! Point updates and prefix sums are both O(log n). Slot indices are 0-based at
//! the API; the tree itself is stored 1-based.

#[derive(Debug, Clone)]
pub struct PrefixSumTree {
    tree: Vec<f64>,
}

impl PrefixSumTree {
    pub fn new(slots: usize) -> Self {
        Self {
            tree: vec![0.0; slots + 1],
        }
    }

    /// Number of slots covered
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add `delta` to slot `idx`
    pub fn add(&mut self, idx: usize, delta: f64) {
        debug_assert!(idx < self.len(), "slot {idx} out of range");
        let mut i = idx + 1;
        while i < self.tree.len() {
            self.tree[i] += delta;
            i += i & i.wrapping_neg();
        }
    }

    /// Sum of slots `0..=idx`
    pub fn prefix_sum(&self, idx: usize) -> f64 {
        let mut i = (idx + 1).min(self.len());
        let mut sum = 0.0;
        while i > 0 {
            sum += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }

    /// Sum over every slot
    pub fn total(&self) -> f64 {
        match self.len() {
            0 => 0.0,
            n => self.prefix_sum(n - 1),
        }
    }

    /// Sum of slots `lo..=hi`; zero for an empty range
    pub fn range_sum(&self, lo: usize, hi: usize) -> f64 {
        if lo > hi {
            return 0.0;
        }
        let below = if lo == 0 { 0.0 } else { self.prefix_sum(lo - 1) };
        self.prefix_sum(hi) - below
    }
}
