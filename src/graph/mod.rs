//! Generic versioned graph engine.
//!
//! This module knows nothing about geometry. It provides:
//! - a global node store with per-node property maps,
//! - named edge types with one of four [`Relationship`] kinds and an optional
//!   reverse index,
//! - snapshots of edge membership with branch-copy and per-edge-type additive
//!   merge.
//!
//! Most users go through [`Graph`]; [`SnapshotView`] answers reads against an
//! explicit snapshot.

pub mod edge_type;
pub mod ordered;
pub mod snapshot;
pub mod store;
pub mod table;
pub mod view;

/// Node key. Keys are global across snapshots.
pub type NodeId = String;

pub use edge_type::{EdgeTypeDescriptor, Relationship};
pub use ordered::{OrderedMap, OrderedSet};
pub use snapshot::{Snapshot, SnapshotId};
pub use store::{Graph, Node};
pub use table::{EdgeTable, Side};
pub use view::SnapshotView;
