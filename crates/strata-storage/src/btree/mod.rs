//! B+-tree secondary index.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!                 │ Internal [k] │
//!                 └──┬────────┬──┘
//!          k' < k    │        │   k' >= k
//!             ┌──────▼──┐  ┌──▼───────┐
//!             │  Leaf   │─▶│   Leaf   │─▶ None
//!             └─────────┘  └──────────┘
//! ```
//!
//! Nodes live in an arena and refer to each other by `NodeId`. Leaves are
//! threaded left to right for range scans. A key seen more than once keeps
//! one leaf entry whose `RowSlot` lists every row id.
//!
//! A *leading* tree indexes the table's clustered column. Inserting into a
//! clustered table shifts every later row, so the tree renumbers stored row
//! ids before adding the new one; see [`BPlusTree::insert_shifting`].

mod node;
mod tree;

pub use node::{InternalNode, LeafNode, Node, NodeId, RowSlot};
pub use tree::{BPlusTree, Iter, TreeStats};
