//! Entity kinds of the topology hierarchy.
//!
//! ```text
//! Position ← Vertex ← Edge ← Wire ← {Polyline | Polygon} ← Collection
//!              ↑                                              |
//!              └──────────── Point ←──────────────────────────┘
//! ```
//!
//! Every entity is a graph node whose key is the type's prefix followed by a
//! per-type sequence number (`ps0`, `_v3`, `pg1`, …).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sim_error::SimError;

/// The eight entity kinds, declared in dependency order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Position,
    Vertex,
    Edge,
    Wire,
    Point,
    Polyline,
    Polygon,
    Collection,
}

impl EntityType {
    /// All kinds in dependency order (children before parents), the order an
    /// exporter must enumerate them in.
    pub const ALL: [EntityType; 8] = [
        EntityType::Position,
        EntityType::Vertex,
        EntityType::Edge,
        EntityType::Wire,
        EntityType::Point,
        EntityType::Polyline,
        EntityType::Polygon,
        EntityType::Collection,
    ];

    /// Dense index, usable for per-type arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Id prefix of entities of this kind.
    pub const fn prefix(self) -> &'static str {
        match self {
            EntityType::Position => "ps",
            EntityType::Vertex => "_v",
            EntityType::Edge => "_e",
            EntityType::Wire => "_w",
            EntityType::Point => "pt",
            EntityType::Polyline => "pl",
            EntityType::Polygon => "pg",
            EntityType::Collection => "co",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            EntityType::Position => "position",
            EntityType::Vertex => "vertex",
            EntityType::Edge => "edge",
            EntityType::Wire => "wire",
            EntityType::Point => "point",
            EntityType::Polyline => "polyline",
            EntityType::Polygon => "polygon",
            EntityType::Collection => "collection",
        }
    }

    /// Point, polyline and polygon: the kinds a user builds directly.
    #[inline]
    pub const fn is_object(self) -> bool {
        matches!(
            self,
            EntityType::Point | EntityType::Polyline | EntityType::Polygon
        )
    }

    /// Kinds that may be members of a collection.
    #[inline]
    pub const fn is_collectable(self) -> bool {
        self.is_object() || matches!(self, EntityType::Collection)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SimError::NotFound(format!("entity type `{s}`")))
    }
}
