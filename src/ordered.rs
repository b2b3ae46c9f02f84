//! Name-ordered index: an insert-only AVL tree over symbols
//!
//! Nodes live in a `Vec` and link to each other by index. Only the symbol key
//! and the arena id are stored; indicator values are computed by the caller
//! at traversal time.

use std::cmp::Ordering;

use crate::{InstrumentId, Symbol};

#[derive(Debug, Clone)]
struct Node {
    symbol: Symbol,
    id: InstrumentId,
    height: i32,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderedIndex {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl OrderedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the whole tree, zero when empty
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    /// Insert `symbol`; a symbol already present is left as is
    pub fn insert(&mut self, symbol: Symbol, id: InstrumentId) {
        let root = self.root;
        self.root = Some(self.insert_at(root, symbol, id));
    }

    pub fn get(&self, symbol: &str) -> Option<InstrumentId> {
        let mut cursor = self.root;
        while let Some(n) = cursor {
            let node = &self.nodes[n];
            cursor = match symbol.cmp(node.symbol.as_str()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(node.id),
            };
        }
        None
    }

    /// Ids in ascending symbol order
    pub fn in_order(&self) -> Vec<InstrumentId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        // explicit stack keeps traversal depth independent of the call stack
        let mut stack = Vec::new();
        let mut cursor = self.root;
        while cursor.is_some() || !stack.is_empty() {
            while let Some(n) = cursor {
                stack.push(n);
                cursor = self.nodes[n].left;
            }
            if let Some(n) = stack.pop() {
                out.push(self.nodes[n].id);
                cursor = self.nodes[n].right;
            }
        }
        out
    }

    /// Whether every node's balance factor is within -1..=1 and its cached
    /// height is correct
    pub fn is_balanced(&self) -> bool {
        self.check(self.root).is_some()
    }

    fn check(&self, node: Option<usize>) -> Option<i32> {
        let Some(n) = node else {
            return Some(0);
        };
        let left = self.check(self.nodes[n].left)?;
        let right = self.check(self.nodes[n].right)?;
        let height = 1 + left.max(right);
        if (left - right).abs() > 1 || height != self.nodes[n].height {
            return None;
        }
        Some(height)
    }

    fn insert_at(&mut self, node: Option<usize>, symbol: Symbol, id: InstrumentId) -> usize {
        let Some(n) = node else {
            self.nodes.push(Node {
                symbol,
                id,
                height: 1,
                left: None,
                right: None,
            });
            return self.nodes.len() - 1;
        };

        match symbol.as_str().cmp(self.nodes[n].symbol.as_str()) {
            Ordering::Less => {
                let left = self.nodes[n].left;
                let child = self.insert_at(left, symbol.clone(), id);
                self.nodes[n].left = Some(child);
            }
            Ordering::Greater => {
                let right = self.nodes[n].right;
                let child = self.insert_at(right, symbol.clone(), id);
                self.nodes[n].right = Some(child);
            }
            Ordering::Equal => return n,
        }

        self.update_height(n);
        let balance = self.balance(n);

        match (balance, self.nodes[n].left, self.nodes[n].right) {
            (b, Some(left), _) if b > 1 => {
                if symbol.as_str() > self.nodes[left].symbol.as_str() {
                    let rotated = self.rotate_left(left);
                    self.nodes[n].left = Some(rotated);
                }
                self.rotate_right(n)
            }
            (b, _, Some(right)) if b < -1 => {
                if symbol.as_str() < self.nodes[right].symbol.as_str() {
                    let rotated = self.rotate_right(right);
                    self.nodes[n].right = Some(rotated);
                }
                self.rotate_left(n)
            }
            _ => n,
        }
    }

    fn height_of(&self, node: Option<usize>) -> i32 {
        node.map_or(0, |n| self.nodes[n].height)
    }

    fn balance(&self, n: usize) -> i32 {
        self.height_of(self.nodes[n].left) - self.height_of(self.nodes[n].right)
    }

    fn update_height(&mut self, n: usize) {
        let height = 1 + self
            .height_of(self.nodes[n].left)
            .max(self.height_of(self.nodes[n].right));
        self.nodes[n].height = height;
    }

    fn rotate_right(&mut self, y: usize) -> usize {
        let Some(x) = self.nodes[y].left else {
            return y;
        };
        let t2 = self.nodes[x].right;
        self.nodes[x].right = Some(y);
        self.nodes[y].left = t2;
        self.update_height(y);
        self.update_height(x);
        x
    }

    fn rotate_left(&mut self, x: usize) -> usize {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        let t2 = self.nodes[y].left;
        self.nodes[y].left = Some(x);
        self.nodes[x].right = t2;
        self.update_height(x);
        self.update_height(y);
        y
    }
}
