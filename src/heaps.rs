//! Max/min heaps over a live, changing key
//!
//! Both heaps hold [`InstrumentId`]s into the store arena. Each member records
//! its own slot in each heap, so a key change can be repaired from that slot in
//! O(log n) instead of searching the heap.

use ordered_float::OrderedFloat;

use crate::InstrumentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapKind {
    Max,
    Min,
}

/// An arena element that can sit in a [`GainHeaps`] pair
pub trait HeapMember {
    /// Current ordering key; may change between calls
    fn heap_key(&self) -> f64;

    fn heap_slot(&self, kind: HeapKind) -> usize;

    fn set_heap_slot(&mut self, kind: HeapKind, slot: usize);
}

/// One binary heap of arena ids, ordered by the members' live keys
#[derive(Debug, Clone)]
pub struct IndexedHeap {
    kind: HeapKind,
    items: Vec<InstrumentId>,
}

impl IndexedHeap {
    pub fn new(kind: HeapKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn with_capacity(kind: HeapKind, capacity: usize) -> Self {
        Self {
            kind,
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn peek(&self) -> Option<InstrumentId> {
        self.items.first().copied()
    }

    pub fn as_slice(&self) -> &[InstrumentId] {
        &self.items
    }

    pub fn insert<T: HeapMember>(&mut self, id: InstrumentId, arena: &mut [T]) {
        let slot = self.items.len();
        self.items.push(id);
        arena[id.index()].set_heap_slot(self.kind, slot);
        self.sift_up(slot, arena);
    }

    /// Restore order after `id`'s key changed in either direction
    pub fn reheapify<T: HeapMember>(&mut self, id: InstrumentId, arena: &mut [T]) {
        let slot = arena[id.index()].heap_slot(self.kind);
        let slot = self.sift_up(slot, arena);
        self.sift_down(slot, arena);
    }

    /// Whether every parent is ordered before its children and every member's
    /// recorded slot points back at itself
    pub fn is_consistent<T: HeapMember>(&self, arena: &[T]) -> bool {
        let ordered = (1..self.items.len()).all(|i| {
            let parent = (i - 1) / 2;
            !self.precedes(self.key(i, arena), self.key(parent, arena))
        });
        let linked = self
            .items
            .iter()
            .enumerate()
            .all(|(slot, id)| arena[id.index()].heap_slot(self.kind) == slot);
        ordered && linked
    }

    fn key<T: HeapMember>(&self, slot: usize, arena: &[T]) -> OrderedFloat<f64> {
        OrderedFloat(arena[self.items[slot].index()].heap_key())
    }

    /// True when key `a` belongs strictly above key `b`
    fn precedes(&self, a: OrderedFloat<f64>, b: OrderedFloat<f64>) -> bool {
        match self.kind {
            HeapKind::Max => a > b,
            HeapKind::Min => a < b,
        }
    }

    fn swap<T: HeapMember>(&mut self, a: usize, b: usize, arena: &mut [T]) {
        self.items.swap(a, b);
        arena[self.items[a].index()].set_heap_slot(self.kind, a);
        arena[self.items[b].index()].set_heap_slot(self.kind, b);
    }

    fn sift_up<T: HeapMember>(&mut self, mut slot: usize, arena: &mut [T]) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.precedes(self.key(slot, arena), self.key(parent, arena)) {
                break;
            }
            self.swap(slot, parent, arena);
            slot = parent;
        }
        slot
    }

    fn sift_down<T: HeapMember>(&mut self, mut slot: usize, arena: &mut [T]) {
        let len = self.items.len();
        loop {
            let mut best = slot;
            for child in [2 * slot + 1, 2 * slot + 2] {
                if child < len && self.precedes(self.key(child, arena), self.key(best, arena)) {
                    best = child;
                }
            }
            if best == slot {
                return;
            }
            self.swap(slot, best, arena);
            slot = best;
        }
    }
}

/// Top-gainer and top-loser heaps over the same member set
#[derive(Debug, Clone)]
pub struct GainHeaps {
    max: IndexedHeap,
    min: IndexedHeap,
}

impl Default for GainHeaps {
    fn default() -> Self {
        Self::new()
    }
}

impl GainHeaps {
    pub fn new() -> Self {
        Self {
            max: IndexedHeap::new(HeapKind::Max),
            min: IndexedHeap::new(HeapKind::Min),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            max: IndexedHeap::with_capacity(HeapKind::Max, capacity),
            min: IndexedHeap::with_capacity(HeapKind::Min, capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.max.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.is_empty()
    }

    pub fn insert<T: HeapMember>(&mut self, id: InstrumentId, arena: &mut [T]) {
        self.max.insert(id, arena);
        self.min.insert(id, arena);
    }

    pub fn reheapify<T: HeapMember>(&mut self, id: InstrumentId, arena: &mut [T]) {
        self.max.reheapify(id, arena);
        self.min.reheapify(id, arena);
    }

    pub fn peek_max(&self) -> Option<InstrumentId> {
        self.max.peek()
    }

    pub fn peek_min(&self) -> Option<InstrumentId> {
        self.min.peek()
    }

    pub fn is_consistent<T: HeapMember>(&self, arena: &[T]) -> bool {
        self.max.len() == self.min.len()
            && self.max.is_consistent(arena)
            && self.min.is_consistent(arena)
    }
}
