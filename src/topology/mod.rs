//! Geometric topology on top of the graph engine.
//!
//! Entities form a layered hierarchy (see [`entity`]) encoded as graph nodes
//! joined by three fixed edge-type channels (see [`registry`]). On top of that
//! encoding sit:
//! - entity construction ([`Model::add_polyline`], [`Model::add_polygon`], …),
//! - typed attributes with shared value nodes and indexed equality lookup,
//! - cross-level navigation and position unwinding.
//!
//! Most users only need [`Model`].

pub mod attribute;
mod construct;
pub mod entity;
pub mod model;
pub mod navigate;
pub mod positions;
pub mod query;
pub mod registry;

pub use entity::EntityType;
pub use model::Model;
pub use navigate::OrdinalTable;
pub use positions::Shape;
pub use query::Comparator;
pub use registry::RegistryNodes;
