//! B+-tree implementation.
//!
//! Keys are `i32` column values and leaves map each distinct key to the row
//! ids holding it. Nodes are stored in an arena and never freed; the tree
//! only grows until it is dropped together with its column.
//!
//! Splits happen on the way back up from an insert into a full node:
//! - A leaf keeps the lower half of its keys and moves the upper half into
//!   a new sibling that is threaded into the leaf chain.
//! - An internal node promotes its middle key. If the pending separator then
//!   leaves the halves uneven, one key and child rotate across the pivot so
//!   both halves end with the same key count.

use strata_common::config::EngineConfig;
use strata_common::constants::MIN_BTREE_ORDER;
use strata_common::error::{StrataError, StrataResult};
use strata_common::types::RowId;
use tracing::{debug, trace};

use super::node::{InternalNode, LeafNode, Node, NodeId, RowSlot};
use crate::sort::{zip_with_index, CacheConsciousSorter};

/// Statistics about the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of indexed rows.
    pub entry_count: usize,
    /// Number of distinct keys.
    pub key_count: usize,
    /// Number of leaf nodes.
    pub leaf_count: usize,
    /// Number of internal nodes.
    pub internal_count: usize,
    /// Height of the tree (0 = single leaf).
    pub height: usize,
    /// Number of leaf splits.
    pub leaf_splits: usize,
    /// Number of internal splits.
    pub internal_splits: usize,
    /// Internal splits that needed a rotation to even out the halves.
    pub redistributions: usize,
}

/// Path from the root to a leaf: each internal node and the child index taken.
type Path = Vec<(NodeId, usize)>;

/// An in-memory B+-tree from `i32` keys to row ids.
#[derive(Debug, Clone)]
pub struct BPlusTree {
    /// A node holds at most `2 * order` keys.
    order: usize,
    /// Whether the tree indexes the table's clustered column.
    leading: bool,
    /// Node arena.
    nodes: Vec<Node>,
    /// Root node.
    root: NodeId,
    /// Edges from root to any leaf.
    height: usize,
    /// Indexed rows.
    size: usize,
    /// Distinct keys.
    key_count: usize,
    leaf_splits: usize,
    internal_splits: usize,
    redistributions: usize,
}

impl BPlusTree {
    /// Creates an empty tree.
    ///
    /// `leading` marks a tree on the clustered column, which changes how
    /// [`insert_shifting`](Self::insert_shifting) renumbers rows.
    pub fn new(order: usize, leading: bool) -> StrataResult<Self> {
        if order < MIN_BTREE_ORDER {
            return Err(StrataError::invalid_argument(format!(
                "b+tree order {order} is below the minimum of {MIN_BTREE_ORDER}"
            )));
        }

        let mut nodes = Vec::new();
        nodes
            .try_reserve(1)
            .map_err(|_| StrataError::out_of_memory("b+tree", 1))?;
        nodes.push(Node::Leaf(LeafNode::default()));

        Ok(Self {
            order,
            leading,
            nodes,
            root: NodeId::new(0),
            height: 0,
            size: 0,
            key_count: 0,
            leaf_splits: 0,
            internal_splits: 0,
            redistributions: 0,
        })
    }

    /// Creates an empty tree with the configured order.
    pub fn create(config: &EngineConfig, leading: bool) -> StrataResult<Self> {
        Self::new(config.btree_order, leading)
    }

    /// Builds a tree over a whole column.
    pub fn build(
        config: &EngineConfig,
        leading: bool,
        values: &[i32],
        sorter: &CacheConsciousSorter,
    ) -> StrataResult<Self> {
        let mut tree = Self::create(config, leading)?;
        tree.bulk_load(values, sorter)?;
        Ok(tree)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the order.
    #[inline]
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Maximum keys per node.
    #[inline]
    #[must_use]
    pub fn max_keys(&self) -> usize {
        2 * self.order
    }

    /// Returns true if the tree indexes the clustered column.
    #[inline]
    #[must_use]
    pub fn is_leading(&self) -> bool {
        self.leading
    }

    /// Number of indexed rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if no rows are indexed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of distinct keys.
    #[inline]
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of allocated nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edges from the root to any leaf.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns tree statistics.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let leaf_count = self.nodes.iter().filter(|n| n.is_leaf()).count();
        TreeStats {
            entry_count: self.size,
            key_count: self.key_count,
            leaf_count,
            internal_count: self.nodes.len() - leaf_count,
            height: self.height,
            leaf_splits: self.leaf_splits,
            internal_splits: self.internal_splits,
            redistributions: self.redistributions,
        }
    }

    /// Smallest key, if any.
    #[must_use]
    pub fn min_key(&self) -> Option<i32> {
        self.leaf(self.leftmost_leaf()).keys.first().copied()
    }

    /// Largest key, if any.
    #[must_use]
    pub fn max_key(&self) -> Option<i32> {
        self.leaf(self.rightmost_leaf()).keys.last().copied()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Returns the row ids stored under `key`.
    #[must_use]
    pub fn point_search(&self, key: i32) -> Option<&[RowId]> {
        let leaf = self.leaf(self.find_leaf(key));
        leaf.search(key).ok().map(|i| leaf.slots[i].rows())
    }

    /// Returns the row ids of every key in `[low, high)`, in key order.
    #[must_use]
    pub fn range_search(&self, low: i32, high: i32) -> Vec<RowId> {
        let mut out = Vec::new();
        if low >= high {
            return out;
        }

        let first = self.find_leaf(low);
        let mut start = self.leaf(first).keys.partition_point(|k| *k < low);
        let mut cursor = Some(first);

        while let Some(id) = cursor {
            let leaf = self.leaf(id);
            for (key, slot) in leaf.keys[start..].iter().zip(&leaf.slots[start..]) {
                if *key >= high {
                    return out;
                }
                out.extend_from_slice(slot.rows());
            }
            start = 0;
            cursor = leaf.next;
        }
        out
    }

    /// Iterates over `(key, slot)` pairs in key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            leaf: Some(self.leftmost_leaf()),
            pos: 0,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Indexes `row` under `key`.
    ///
    /// An existing key gains another row id. A new key that lands in a full
    /// leaf splits it first.
    pub fn insert(&mut self, key: i32, row: RowId) -> StrataResult<()> {
        self.reserve_for_insert()?;

        let (leaf_id, mut path) = self.find_leaf_with_path(key);
        let slot = self.leaf(leaf_id).search(key);

        let pos = match slot {
            Ok(i) => {
                self.leaf_mut(leaf_id).slots[i].push(row)?;
                self.size += 1;
                return Ok(());
            }
            Err(pos) => pos,
        };

        if self.leaf(leaf_id).keys.len() < self.max_keys() {
            let leaf = self.leaf_mut(leaf_id);
            leaf.keys.insert(pos, key);
            leaf.slots.insert(pos, RowSlot::Single(row));
        } else {
            let (sibling_id, separator) = self.split_leaf(leaf_id);
            let target = if key < separator { leaf_id } else { sibling_id };
            let leaf = self.leaf_mut(target);
            let pos = match leaf.search(key) {
                Ok(p) | Err(p) => p,
            };
            leaf.keys.insert(pos, key);
            leaf.slots.insert(pos, RowSlot::Single(row));
            self.insert_into_parent(&mut path, leaf_id, separator, sibling_id);
        }

        self.size += 1;
        self.key_count += 1;
        Ok(())
    }

    /// Indexes a row inserted at physical position `row` of a clustered
    /// table.
    ///
    /// Every stored row id `>= row` moves up by one first, since the insert
    /// shifted those rows. A leading tree starts at the leaf owning `key`
    /// and renumbers every later leaf unconditionally; a non-leading tree
    /// checks every leaf.
    ///
    /// All growth is reserved before any row id moves, so an allocation
    /// failure leaves the tree untouched.
    pub fn insert_shifting(&mut self, key: i32, row: RowId) -> StrataResult<()> {
        self.reserve(key)?;

        if self.leading {
            let owner = self.find_leaf(key);
            self.leaf_mut(owner).shift_rows_from(row);
            let mut cursor = self.leaf(owner).next;
            while let Some(id) = cursor {
                let leaf = self.leaf_mut(id);
                leaf.shift_all_rows(row);
                cursor = leaf.next;
            }
        } else {
            let mut cursor = Some(self.leftmost_leaf());
            while let Some(id) = cursor {
                let leaf = self.leaf_mut(id);
                leaf.shift_rows_from(row);
                cursor = leaf.next;
            }
        }

        self.insert(key, row)
    }

    /// Indexes a whole column, row `i` holding `values[i]`.
    ///
    /// A leading tree takes the values in row order. Other trees sort the
    /// `(value, row)` pairs first so keys arrive in ascending order.
    pub fn bulk_load(&mut self, values: &[i32], sorter: &CacheConsciousSorter) -> StrataResult<()> {
        if self.leading {
            for (row, &value) in values.iter().enumerate() {
                self.insert(value, row as RowId)?;
            }
        } else {
            for entry in sorter.sort(zip_with_index(values)?)? {
                self.insert(entry.value, entry.row)?;
            }
        }
        trace!(
            rows = values.len(),
            leading = self.leading,
            height = self.height,
            "b+tree bulk load"
        );
        Ok(())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Checks every structural invariant of the tree.
    pub fn validate(&self) -> StrataResult<()> {
        let mut leaves = Vec::new();
        let mut rows = 0usize;
        let mut keys = 0usize;
        self.validate_node(self.root, 0, None, None, &mut leaves, &mut rows, &mut keys)?;

        if rows != self.size {
            return Err(StrataError::corruption(format!(
                "b+tree holds {rows} rows but records {}",
                self.size
            )));
        }
        if keys != self.key_count {
            return Err(StrataError::corruption(format!(
                "b+tree holds {keys} keys but records {}",
                self.key_count
            )));
        }

        let mut chain = Vec::with_capacity(leaves.len());
        let mut cursor = Some(self.leftmost_leaf());
        let mut last_key: Option<i32> = None;
        while let Some(id) = cursor {
            let leaf = self.leaf(id);
            if let (Some(prev), Some(&first)) = (last_key, leaf.keys.first()) {
                if first <= prev {
                    return Err(StrataError::corruption("leaf chain keys out of order"));
                }
            }
            last_key = leaf.keys.last().copied().or(last_key);
            chain.push(id);
            cursor = leaf.next;
        }
        if chain != leaves {
            return Err(StrataError::corruption(
                "leaf chain does not visit leaves in tree order",
            ));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn validate_node(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<i32>,
        upper: Option<i32>,
        leaves: &mut Vec<NodeId>,
        rows: &mut usize,
        keys: &mut usize,
    ) -> StrataResult<()> {
        let node = &self.nodes[id.index()];
        let node_keys = match node {
            Node::Internal(n) => &n.keys,
            Node::Leaf(n) => &n.keys,
        };

        if node_keys.len() > self.max_keys() {
            return Err(StrataError::corruption(format!(
                "node {} holds {} keys, max {}",
                id.index(),
                node_keys.len(),
                self.max_keys()
            )));
        }
        if id != self.root && node_keys.len() < self.order {
            return Err(StrataError::corruption(format!(
                "node {} is underfull with {} keys",
                id.index(),
                node_keys.len()
            )));
        }
        if node_keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(StrataError::corruption(format!(
                "node {} keys are not strictly increasing",
                id.index()
            )));
        }
        let in_bounds = node_keys.iter().all(|k| {
            lower.map_or(true, |lo| *k >= lo) && upper.map_or(true, |hi| *k < hi)
        });
        if !in_bounds {
            return Err(StrataError::corruption(format!(
                "node {} has keys outside its separators",
                id.index()
            )));
        }

        match node {
            Node::Leaf(leaf) => {
                if depth != self.height {
                    return Err(StrataError::corruption(format!(
                        "leaf {} at depth {depth}, tree height {}",
                        id.index(),
                        self.height
                    )));
                }
                if leaf.slots.len() != leaf.keys.len() {
                    return Err(StrataError::corruption("leaf slot count differs from keys"));
                }
                leaves.push(id);
                *keys += leaf.keys.len();
                *rows += leaf.slots.iter().map(RowSlot::len).sum::<usize>();
            }
            Node::Internal(internal) => {
                if internal.children.len() != internal.keys.len() + 1 {
                    return Err(StrataError::corruption(format!(
                        "internal node {} has {} keys and {} children",
                        id.index(),
                        internal.keys.len(),
                        internal.children.len()
                    )));
                }
                for (i, &child) in internal.children.iter().enumerate() {
                    let lo = if i == 0 { lower } else { Some(internal.keys[i - 1]) };
                    let hi = internal.keys.get(i).copied().or(upper);
                    self.validate_node(child, depth + 1, lo, hi, leaves, rows, keys)?;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Reserves what a following insert of `key` allocates: arena room
    /// for a split cascade, and room in the slot of an existing key.
    pub fn reserve(&mut self, key: i32) -> StrataResult<()> {
        self.reserve_for_insert()?;
        let leaf_id = self.find_leaf(key);
        let leaf = self.leaf_mut(leaf_id);
        if let Ok(i) = leaf.search(key) {
            leaf.slots[i].reserve_one()?;
        }
        Ok(())
    }

    /// Makes room in the arena for the worst-case split cascade.
    fn reserve_for_insert(&mut self) -> StrataResult<()> {
        let needed = self.height + 2;
        self.nodes
            .try_reserve(needed)
            .map_err(|_| StrataError::out_of_memory("b+tree", self.nodes.len() + needed))
    }

    fn leaf(&self, id: NodeId) -> &LeafNode {
        match &self.nodes[id.index()] {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("b+tree node {} is not a leaf", id.index()),
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode {
        match &mut self.nodes[id.index()] {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("b+tree node {} is not a leaf", id.index()),
        }
    }

    fn internal(&self, id: NodeId) -> &InternalNode {
        match &self.nodes[id.index()] {
            Node::Internal(node) => node,
            Node::Leaf(_) => panic!("b+tree node {} is not internal", id.index()),
        }
    }

    fn internal_mut(&mut self, id: NodeId) -> &mut InternalNode {
        match &mut self.nodes[id.index()] {
            Node::Internal(node) => node,
            Node::Leaf(_) => panic!("b+tree node {} is not internal", id.index()),
        }
    }

    fn find_leaf(&self, key: i32) -> NodeId {
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id.index()] {
            id = node.children[node.child_index(key)];
        }
        id
    }

    fn find_leaf_with_path(&self, key: i32) -> (NodeId, Path) {
        let mut path = Vec::with_capacity(self.height);
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id.index()] {
            let idx = node.child_index(key);
            path.push((id, idx));
            id = node.children[idx];
        }
        (id, path)
    }

    fn leftmost_leaf(&self) -> NodeId {
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id.index()] {
            id = node.children[0];
        }
        id
    }

    fn rightmost_leaf(&self) -> NodeId {
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id.index()] {
            id = node.children[node.children.len() - 1];
        }
        id
    }

    /// Splits a full leaf and returns the sibling and its first key.
    fn split_leaf(&mut self, leaf_id: NodeId) -> (NodeId, i32) {
        let sibling_id = NodeId::new(self.nodes.len());

        let leaf = self.leaf_mut(leaf_id);
        let keep = leaf.keys.len() / 2;
        let keys = leaf.keys.split_off(keep);
        let slots = leaf.slots.split_off(keep);
        let next = leaf.next.replace(sibling_id);
        let separator = keys[0];

        self.nodes.push(Node::Leaf(LeafNode { keys, slots, next }));
        self.leaf_splits += 1;
        (sibling_id, separator)
    }

    /// Inserts separator `key` with right child `right` next to `left`.
    fn insert_into_parent(&mut self, path: &mut Path, left: NodeId, key: i32, right: NodeId) {
        let Some((parent_id, idx)) = path.pop() else {
            let new_root = NodeId::new(self.nodes.len());
            self.nodes.push(Node::Internal(InternalNode {
                keys: vec![key],
                children: vec![left, right],
            }));
            self.root = new_root;
            self.height += 1;
            debug!(
                height = self.height,
                nodes = self.nodes.len(),
                leading = self.leading,
                "b+tree root split"
            );
            return;
        };

        debug_assert_eq!(self.internal(parent_id).children[idx], left);

        if self.internal(parent_id).keys.len() < self.max_keys() {
            let parent = self.internal_mut(parent_id);
            parent.keys.insert(idx, key);
            parent.children.insert(idx + 1, right);
        } else {
            let (sibling_id, pivot) = self.split_internal(parent_id, idx, key, right);
            self.insert_into_parent(path, parent_id, pivot, sibling_id);
        }
    }

    /// Splits a full internal node while adding the separator `key` and
    /// child `right` at child index `idx`. Returns the sibling and the key
    /// promoted to the parent.
    fn split_internal(
        &mut self,
        node_id: NodeId,
        idx: usize,
        key: i32,
        right: NodeId,
    ) -> (NodeId, i32) {
        let order = self.order;
        let sibling_id = NodeId::new(self.nodes.len());

        let node = self.internal_mut(node_id);
        let mut sibling_keys = node.keys.split_off(order);
        let mut pivot = sibling_keys.remove(0);
        let mut sibling_children = node.children.split_off(order + 1);

        if idx <= order {
            node.keys.insert(idx, key);
            node.children.insert(idx + 1, right);
        } else {
            sibling_keys.insert(idx - order - 1, key);
            sibling_children.insert(idx - order, right);
        }

        let mut rotated = false;
        if node.keys.len() > sibling_keys.len() {
            let last = node.keys.len() - 1;
            let new_pivot = node.keys[last];
            let moved_child = node.children[last + 1];
            node.keys.truncate(last);
            node.children.truncate(last + 1);
            sibling_keys.insert(0, pivot);
            sibling_children.insert(0, moved_child);
            pivot = new_pivot;
            rotated = true;
        }

        assert_eq!(
            node.keys.len(),
            sibling_keys.len(),
            "internal split produced unequal halves"
        );
        assert_eq!(sibling_children.len(), sibling_keys.len() + 1);

        self.nodes.push(Node::Internal(InternalNode {
            keys: sibling_keys,
            children: sibling_children,
        }));
        self.internal_splits += 1;
        if rotated {
            self.redistributions += 1;
        }
        (sibling_id, pivot)
    }
}

/// Iterator over `(key, slot)` pairs following the leaf chain.
pub struct Iter<'a> {
    tree: &'a BPlusTree,
    leaf: Option<NodeId>,
    pos: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (i32, &'a RowSlot);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.tree.leaf(self.leaf?);
            if self.pos < leaf.keys.len() {
                let item = (leaf.keys[self.pos], &leaf.slots[self.pos]);
                self.pos += 1;
                return Some(item);
            }
            self.leaf = leaf.next;
            self.pos = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeMap;

    fn tree(order: usize, leading: bool) -> BPlusTree {
        BPlusTree::new(order, leading).unwrap()
    }

    #[test]
    fn test_tree_creation() {
        let t = tree(4, false);
        assert!(t.is_empty());
        assert_eq!(t.height(), 0);
        assert_eq!(t.node_count(), 1);
        assert_eq!(t.min_key(), None);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_order_below_minimum() {
        assert!(BPlusTree::new(1, false).is_err());
    }

    #[test]
    fn test_single_insert_search() {
        let mut t = tree(4, false);
        t.insert(42, 7).unwrap();
        assert_eq!(t.point_search(42), Some(&[7][..]));
        assert_eq!(t.point_search(41), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_sequential_keys_order_16() {
        let mut t = tree(16, false);
        for key in 1..=50 {
            t.insert(key, (key - 1) as RowId).unwrap();
        }
        assert_eq!(t.point_search(25), Some(&[24][..]));
        // 17^2 > 50, so two levels of fanout suffice.
        assert!(t.height() <= 2, "height {}", t.height());
        assert!(t.height() >= 1);
        t.validate().unwrap();
    }

    #[test]
    fn test_duplicate_key_collects_rows() {
        let mut t = tree(2, false);
        for row in 0..5 {
            t.insert(7, row).unwrap();
        }
        assert_eq!(t.point_search(7), Some(&[0, 1, 2, 3, 4][..]));
        assert_eq!(t.len(), 5);
        assert_eq!(t.key_count(), 1);
        assert_eq!(t.node_count(), 1);
    }

    #[test]
    fn test_duplicate_into_full_leaf_does_not_split() {
        let mut t = tree(2, false);
        for key in 0..4 {
            t.insert(key, key as RowId).unwrap();
        }
        t.insert(2, 9).unwrap();
        assert_eq!(t.stats().leaf_splits, 0);
        assert_eq!(t.point_search(2), Some(&[2, 9][..]));
    }

    #[test]
    fn test_leaf_split_halves() {
        let mut t = tree(2, false);
        for key in 0..5 {
            t.insert(key, key as RowId).unwrap();
        }
        let stats = t.stats();
        assert_eq!(stats.leaf_splits, 1);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(t.height(), 1);
        t.validate().unwrap();
    }

    #[test]
    fn test_ascending_descending_random_orders() {
        let mut keys: Vec<i32> = (0..500).collect();
        let mut rng = StdRng::seed_from_u64(42);

        let mut orders = vec![keys.clone()];
        keys.reverse();
        orders.push(keys.clone());
        keys.shuffle(&mut rng);
        orders.push(keys);

        for sequence in orders {
            let mut t = tree(2, false);
            for (row, key) in sequence.iter().enumerate() {
                t.insert(*key, row as RowId).unwrap();
                t.validate().unwrap();
            }
            let in_order: Vec<i32> = t.iter().map(|(k, _)| k).collect();
            assert_eq!(in_order, (0..500).collect::<Vec<_>>());
            assert!(t.stats().internal_splits > 0);
        }
    }

    #[test]
    fn test_redistribution_keeps_halves_equal() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut t = tree(2, false);
        for row in 0..2000 {
            t.insert(rng.gen_range(0..100_000), row).unwrap();
        }
        t.validate().unwrap();
        assert!(t.stats().redistributions > 0);
    }

    #[test]
    fn test_range_search_matches_model() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut t = tree(3, false);
        let mut model: BTreeMap<i32, Vec<RowId>> = BTreeMap::new();

        for row in 0..1500 {
            let key = rng.gen_range(-200..200);
            t.insert(key, row).unwrap();
            model.entry(key).or_default().push(row);
        }

        for _ in 0..200 {
            let low = rng.gen_range(-250..250);
            let high = rng.gen_range(-250..250);
            let expected: Vec<RowId> = if low < high {
                model.range(low..high).flat_map(|(_, rows)| rows.clone()).collect()
            } else {
                Vec::new()
            };
            assert_eq!(t.range_search(low, high), expected, "[{low}, {high})");
        }
    }

    #[test]
    fn test_range_search_edges() {
        let mut t = tree(2, false);
        for key in [10, 20, 30] {
            t.insert(key, key as RowId).unwrap();
        }
        assert_eq!(t.range_search(10, 30), vec![10, 20]);
        assert_eq!(t.range_search(30, 10), Vec::<RowId>::new());
        assert_eq!(t.range_search(31, i32::MAX), Vec::<RowId>::new());
        assert_eq!(t.range_search(i32::MIN, i32::MAX), vec![10, 20, 30]);
    }

    #[test]
    fn test_min_max_key() {
        let mut t = tree(2, false);
        for key in [5, -3, 99, 12, 40, 7, 0] {
            t.insert(key, 0).unwrap();
        }
        assert_eq!(t.min_key(), Some(-3));
        assert_eq!(t.max_key(), Some(99));
    }

    /// Simulates inserts into a clustered column, renumbering through the tree.
    #[test]
    fn test_leading_renumbering() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut column: Vec<i32> = Vec::new();
        let mut t = tree(2, true);

        for _ in 0..400 {
            let value = rng.gen_range(0..50);
            let pos = column.partition_point(|v| *v <= value);
            column.insert(pos, value);
            t.insert_shifting(value, pos as RowId).unwrap();
        }

        t.validate().unwrap();
        for (key, slot) in t.iter() {
            let mut rows = slot.rows().to_vec();
            rows.sort_unstable();
            let expected: Vec<RowId> = (0..column.len())
                .filter(|&i| column[i] == key)
                .map(|i| i as RowId)
                .collect();
            assert_eq!(rows, expected, "key {key}");
        }
    }

    /// A secondary tree on a table clustered by another column.
    #[test]
    fn test_non_leading_renumbering() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut clustered: Vec<i32> = Vec::new();
        let mut other: Vec<i32> = Vec::new();
        let mut t = tree(2, false);

        for _ in 0..300 {
            let c = rng.gen_range(0..1000);
            let o = rng.gen_range(0..40);
            let pos = clustered.partition_point(|v| *v <= c);
            clustered.insert(pos, c);
            other.insert(pos, o);
            t.insert_shifting(o, pos as RowId).unwrap();
        }

        t.validate().unwrap();
        for key in 0..40 {
            let mut rows = t.point_search(key).map(<[RowId]>::to_vec).unwrap_or_default();
            rows.sort_unstable();
            let expected: Vec<RowId> = (0..other.len())
                .filter(|&i| other[i] == key)
                .map(|i| i as RowId)
                .collect();
            assert_eq!(rows, expected, "key {key}");
        }
    }

    #[test]
    fn test_insert_shifting_increments_only_at_or_after() {
        let mut t = tree(2, true);
        for (pos, key) in [1, 2, 3, 4, 5, 6].iter().enumerate() {
            t.insert(*key, pos as RowId).unwrap();
        }
        // New key 3 goes after the existing 3 at position 3.
        t.insert_shifting(3, 3).unwrap();
        assert_eq!(t.point_search(1), Some(&[0][..]));
        assert_eq!(t.point_search(3), Some(&[2, 3][..]));
        assert_eq!(t.point_search(4), Some(&[4][..]));
        assert_eq!(t.point_search(6), Some(&[6][..]));
    }

    #[test]
    fn test_reserve_covers_duplicate_insert() {
        let mut t = tree(2, true);
        for (pos, key) in [1, 2, 3, 4].iter().enumerate() {
            t.insert(*key, pos as RowId).unwrap();
        }
        let nodes = t.node_count();
        t.reserve(3).unwrap();
        // Reserving moves nothing.
        assert_eq!(t.point_search(3), Some(&[2][..]));
        assert_eq!(t.point_search(4), Some(&[3][..]));
        assert_eq!(t.len(), 4);
        assert_eq!(t.node_count(), nodes);

        let before = t.point_search(3).unwrap().as_ptr();
        t.insert_shifting(3, 3).unwrap();
        assert_eq!(t.point_search(3), Some(&[2, 3][..]));
        assert_eq!(t.point_search(3).unwrap().as_ptr(), before);
        assert_eq!(t.point_search(4), Some(&[4][..]));
        t.validate().unwrap();
    }

    #[test]
    fn test_bulk_load_modes() {
        let values = vec![5, 1, 4, 1, 3, 5, 2];
        let sorter = CacheConsciousSorter::new(2);
        let config = EngineConfig::for_testing();

        for leading in [true, false] {
            let t = BPlusTree::build(&config, leading, &values, &sorter).unwrap();
            t.validate().unwrap();
            assert_eq!(t.len(), values.len());
            assert_eq!(t.point_search(1), Some(&[1, 3][..]));
            assert_eq!(t.point_search(5), Some(&[0, 5][..]));
            assert_eq!(t.range_search(2, 5), vec![6, 4, 2]);
        }
    }

    #[test]
    fn test_stats() {
        let mut t = tree(2, false);
        for key in 0..100 {
            t.insert(key, key as RowId).unwrap();
        }
        let stats = t.stats();
        assert_eq!(stats.entry_count, 100);
        assert_eq!(stats.key_count, 100);
        assert_eq!(stats.leaf_count + stats.internal_count, t.node_count());
        assert_eq!(stats.height, t.height());
    }
}
