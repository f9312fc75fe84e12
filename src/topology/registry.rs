//! Well-known nodes and the fixed edge-type channels of the schema.
//!
//! Three channels are registered when a model is built:
//!
//! - [`STRUCTURAL`] (many-to-many): composite → structural children.
//! - [`REGISTRY`] (one-to-many): registry node → every entity of a type, and
//!   attribute-registry node → every attribute declared for a type.
//! - [`ATTRIB_LINK`] (many-to-one): shared value node → its attribute node.
//!
//! Each attribute additionally gets its own many-to-one channel (entity →
//! value node), named after the attribute node.

use crate::graph::{Graph, NodeId, Relationship};
use crate::sim_error::SimError;
use crate::topology::entity::EntityType;

pub const STRUCTURAL: &str = "_structural";
pub const REGISTRY: &str = "_registry";
pub const ATTRIB_LINK: &str = "_attrib_link";

/// Property holding an entity's [`EntityType`] name.
pub const ENTITY_TYPE_PROP: &str = "entity_type";

/// Handles to the per-type registry nodes, created once per model.
#[derive(Clone, Debug)]
pub struct RegistryNodes {
    entities: [NodeId; 8],
    attributes: [NodeId; 8],
}

impl RegistryNodes {
    /// Registers the three channels and creates the registry nodes.
    pub(crate) fn install(graph: &mut Graph) -> Result<Self, SimError> {
        graph.add_edge_type(STRUCTURAL, Relationship::ManyToMany, true)?;
        graph.add_edge_type(REGISTRY, Relationship::OneToMany, true)?;
        graph.add_edge_type(ATTRIB_LINK, Relationship::ManyToOne, true)?;

        let entities = EntityType::ALL.map(|t| format!("_ents_{}", t.prefix()));
        let attributes = EntityType::ALL.map(|t| format!("_attribs_{}", t.prefix()));
        for key in entities.iter().chain(attributes.iter()) {
            graph.add_node(key)?;
        }
        Ok(Self {
            entities,
            attributes,
        })
    }

    /// Node listing every entity of `ty`.
    #[inline]
    pub fn entities(&self, ty: EntityType) -> &str {
        &self.entities[ty.index()]
    }

    /// Node listing every attribute declared for `ty`.
    #[inline]
    pub fn attributes(&self, ty: EntityType) -> &str {
        &self.attributes[ty.index()]
    }
}

/// Node key (and channel name) of attribute `name` on `ty`.
pub fn attribute_key(ty: EntityType, name: &str) -> NodeId {
    format!("_att_{}_{name}", ty.prefix())
}

/// Node key of the shared value node for `canonical` under `attribute`.
///
/// Attribute names never contain `:`, so the first `::` splits the key
/// unambiguously.
pub fn value_key(attribute: &str, canonical: &str) -> NodeId {
    format!("{attribute}::{canonical}")
}
