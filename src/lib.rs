#![cfg_attr(docsrs, feature(doc_cfg))]
//! # sim-graph
//!
//! sim-graph is an in-memory, versioned, multi-relational graph store and the
//! topology kernel of a geometric modeler built on it.
//!
//! ## Layers
//! - [`graph`]: string-keyed nodes with property maps, named edge types with
//!   one of four cardinality kinds and optional reverse indices, and
//!   snapshots of edge membership with branch-copy and per-edge-type merge.
//! - [`topology`]: positions, vertices, edges, wires, points, polylines,
//!   polygons and collections encoded on the graph; typed attributes stored
//!   as shared value nodes; cross-level navigation and predicate queries.
//!
//! ## Usage
//! ```rust
//! use sim_graph::prelude::*;
//!
//! let mut m = Model::new()?;
//! let ps = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]
//!     .into_iter()
//!     .map(|xyz| m.add_position(xyz))
//!     .collect::<Result<Vec<_>, _>>()?;
//! let pg = m.add_polygon(&ps)?;
//!
//! m.declare_attribute(EntityType::Polygon, "material", DataType::Text)?;
//! m.set_attribute_value(&pg, "material", "steel")?;
//! let steel = Value::from("steel");
//! assert_eq!(
//!     m.query(EntityType::Polygon, "material", Comparator::Eq, Some(&steel))?,
//!     vec![pg.clone()]
//! );
//! assert_eq!(m.get_entity_positions(&pg)?, Shape::Nested(vec![ps]));
//! # Ok::<(), SimError>(())
//! ```
//!
//! ## Invariant checking
//! Every graph mutation re-validates the touched edge table under
//! `debug_assertions`, or in release builds with the `check-invariants`
//! feature. [`DebugInvariants::validate_invariants`] runs the full check on
//! demand.
//!
//! The library logs through the [`log`] facade and installs no logger.

pub mod config;
pub mod debug_invariants;
pub mod graph;
pub mod sim_error;
pub mod topology;
pub mod value;

pub use debug_invariants::DebugInvariants;
pub use sim_error::SimError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::config::ModelConfig;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::graph::{Graph, NodeId, Relationship, SnapshotId, SnapshotView};
    pub use crate::sim_error::SimError;
    pub use crate::topology::{Comparator, EntityType, Model, Shape};
    pub use crate::value::{DataType, Value};
}
