//! Edge-type descriptors and relationship kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cardinality shape of an edge type.
///
/// The shape decides, independently for each direction, whether a key maps to
/// one node or to an ordered set of nodes:
///
/// | kind         | forward | reverse |
/// |--------------|---------|---------|
/// | `OneToOne`   | single  | single  |
/// | `OneToMany`  | set     | single  |
/// | `ManyToOne`  | single  | set     |
/// | `ManyToMany` | set     | set     |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relationship {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Relationship {
    /// Whether a source may point at several targets.
    #[inline]
    pub fn forward_is_set(self) -> bool {
        matches!(self, Relationship::OneToMany | Relationship::ManyToMany)
    }

    /// Whether a target may be pointed at by several sources.
    #[inline]
    pub fn reverse_is_set(self) -> bool {
        matches!(self, Relationship::ManyToOne | Relationship::ManyToMany)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relationship::OneToOne => "one-to-one",
            Relationship::OneToMany => "one-to-many",
            Relationship::ManyToOne => "many-to-one",
            Relationship::ManyToMany => "many-to-many",
        };
        f.write_str(s)
    }
}

/// A registered edge type. Descriptors are shared by every snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTypeDescriptor {
    pub name: String,
    pub relationship: Relationship,
    /// Build and maintain the target → source index.
    pub maintain_reverse: bool,
}

impl EdgeTypeDescriptor {
    pub fn new(name: impl Into<String>, relationship: Relationship, maintain_reverse: bool) -> Self {
        Self {
            name: name.into(),
            relationship,
            maintain_reverse,
        }
    }
}
