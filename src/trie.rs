//! Prefix search over registered symbols
//!
//! Children are keyed by `char`, so any symbol alphabet works.

use std::collections::BTreeMap;

use crate::Symbol;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<char, usize>,
    terminal: Option<Symbol>,
}

#[derive(Debug, Clone)]
pub struct SymbolTrie {
    nodes: Vec<TrieNode>,
}

impl Default for SymbolTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    pub fn insert(&mut self, symbol: &Symbol) {
        let mut node = 0;
        for c in symbol.as_str().chars() {
            node = match self.nodes[node].children.get(&c) {
                Some(&next) => next,
                None => {
                    self.nodes.push(TrieNode::default());
                    let next = self.nodes.len() - 1;
                    self.nodes[node].children.insert(c, next);
                    next
                }
            };
        }
        self.nodes[node].terminal = Some(symbol.clone());
    }

    fn walk(&self, key: &str) -> Option<usize> {
        key.chars()
            .try_fold(0, |node, c| self.nodes[node].children.get(&c).copied())
    }

    /// Exact membership
    pub fn contains(&self, symbol: &str) -> bool {
        self.walk(symbol)
            .is_some_and(|node| self.nodes[node].terminal.is_some())
    }

    /// Every registered symbol starting with `prefix`, in ascending order
    pub fn with_prefix(&self, prefix: &str) -> Vec<Symbol> {
        let Some(start) = self.walk(prefix) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            let node = &self.nodes[node];
            if let Some(symbol) = &node.terminal {
                found.push(symbol.clone());
            }
            // reversed so the smallest child is visited first
            stack.extend(node.children.values().rev());
        }
        found
    }
}
