//! B+-tree node layout.
//!
//! Nodes live in an arena owned by the tree and refer to each other by
//! `NodeId`. Internal nodes hold `k` keys and `k + 1` children. Leaves hold
//! keys, one `RowSlot` per key, and an explicit link to the next leaf.

use std::slice;

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::RowId;

/// Handle of a node inside the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a handle from an arena index.
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the arena index.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Row ids stored under one leaf key.
///
/// A key seen once stores its row id inline. The first duplicate turns the
/// slot into a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSlot {
    /// Exactly one row.
    Single(RowId),
    /// Rows of a duplicated key, in insertion order.
    Many(Vec<RowId>),
}

impl RowSlot {
    /// Adds a row id to the slot.
    pub fn push(&mut self, row: RowId) -> StrataResult<()> {
        match self {
            Self::Single(first) => {
                let mut rows = Vec::new();
                rows.try_reserve_exact(2)
                    .map_err(|_| StrataError::out_of_memory("row slot", 2))?;
                rows.push(*first);
                rows.push(row);
                *self = Self::Many(rows);
            }
            Self::Many(rows) => {
                rows.try_reserve(1)
                    .map_err(|_| StrataError::out_of_memory("row slot", rows.len() + 1))?;
                rows.push(row);
            }
        }
        Ok(())
    }

    /// Makes sure the next [`push`](Self::push) does not allocate.
    ///
    /// A single row moves into a list with room for the second one.
    pub fn reserve_one(&mut self) -> StrataResult<()> {
        match self {
            Self::Single(first) => {
                let mut rows = Vec::new();
                rows.try_reserve_exact(2)
                    .map_err(|_| StrataError::out_of_memory("row slot", 2))?;
                rows.push(*first);
                *self = Self::Many(rows);
            }
            Self::Many(rows) => rows
                .try_reserve(1)
                .map_err(|_| StrataError::out_of_memory("row slot", rows.len() + 1))?,
        }
        Ok(())
    }

    /// Returns the stored row ids.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[RowId] {
        match self {
            Self::Single(row) => slice::from_ref(row),
            Self::Many(rows) => rows,
        }
    }

    /// Mutable access to the stored row ids.
    #[inline]
    pub fn rows_mut(&mut self) -> &mut [RowId] {
        match self {
            Self::Single(row) => slice::from_mut(row),
            Self::Many(rows) => rows,
        }
    }

    /// Number of stored row ids. Never zero.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    /// Always false; a slot exists only once a row has been stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// An internal node.
#[derive(Debug, Clone, Default)]
pub struct InternalNode {
    /// Separator keys, strictly increasing.
    pub keys: Vec<i32>,
    /// Children; `children.len() == keys.len() + 1`.
    pub children: Vec<NodeId>,
}

impl InternalNode {
    /// Index of the child whose subtree owns `key`.
    ///
    /// Keys equal to a separator live to its right.
    #[inline]
    #[must_use]
    pub fn child_index(&self, key: i32) -> usize {
        self.keys.partition_point(|k| *k <= key)
    }
}

/// A leaf node.
#[derive(Debug, Clone, Default)]
pub struct LeafNode {
    /// Keys, strictly increasing.
    pub keys: Vec<i32>,
    /// One slot per key.
    pub slots: Vec<RowSlot>,
    /// Next leaf in key order.
    pub next: Option<NodeId>,
}

impl LeafNode {
    /// Position of `key`, or where it would be inserted.
    #[inline]
    pub fn search(&self, key: i32) -> Result<usize, usize> {
        self.keys.binary_search(&key)
    }

    /// Increments every row id `>= threshold` in this leaf.
    pub fn shift_rows_from(&mut self, threshold: RowId) {
        for slot in &mut self.slots {
            for row in slot.rows_mut() {
                if *row >= threshold {
                    *row += 1;
                }
            }
        }
    }

    /// Increments every row id in this leaf.
    ///
    /// Callers guarantee every id is at least `threshold`.
    pub fn shift_all_rows(&mut self, threshold: RowId) {
        for slot in &mut self.slots {
            for row in slot.rows_mut() {
                assert!(
                    *row >= threshold,
                    "leading renumbering found row {} below insertion point {}",
                    row,
                    threshold
                );
                *row += 1;
            }
        }
    }
}

/// A tree node.
#[derive(Debug, Clone)]
pub enum Node {
    /// Internal routing node.
    Internal(InternalNode),
    /// Leaf holding row ids.
    Leaf(LeafNode),
}

impl Node {
    /// Number of keys in the node.
    #[must_use]
    pub fn key_count(&self) -> usize {
        match self {
            Self::Internal(node) => node.keys.len(),
            Self::Leaf(node) => node.keys.len(),
        }
    }

    /// Returns true for leaves.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}
