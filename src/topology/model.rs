//! The topology model: entity bookkeeping on top of a [`Graph`].

use std::str::FromStr;

use crate::config::ModelConfig;
use crate::debug_invariants::DebugInvariants;
use crate::graph::{Graph, NodeId, SnapshotId};
use crate::sim_error::SimError;
use crate::topology::entity::EntityType;
use crate::topology::registry::{ENTITY_TYPE_PROP, REGISTRY, RegistryNodes, STRUCTURAL};
use crate::value::{DataType, Value};

/// A geometric model: positions, vertices, edges, wires, points, polylines,
/// polygons and collections stored as typed graph nodes, plus their
/// attributes.
///
/// All state lives in one [`Graph`]. Entity nodes, attribute nodes and value
/// nodes are global; which entities exist *in a snapshot* is decided by the
/// registry edges of that snapshot.
///
/// # Example
/// ```rust
/// use sim_graph::topology::{EntityType, Model};
/// let mut m = Model::new().unwrap();
/// let a = m.add_position([0.0, 0.0, 0.0]).unwrap();
/// let b = m.add_position([1.0, 0.0, 0.0]).unwrap();
/// let pl = m.add_polyline(&[&a, &b]).unwrap();
/// assert_eq!(m.num_entities(EntityType::Edge), 1);
/// assert_eq!(m.navigate(EntityType::Position, &pl).unwrap(), vec![a, b]);
/// ```
#[derive(Clone, Debug)]
pub struct Model {
    pub(crate) graph: Graph,
    pub(crate) registry: RegistryNodes,
    counters: [u64; 8],
    config: ModelConfig,
}

impl Model {
    /// Builds an empty model with the default configuration.
    pub fn new() -> Result<Self, SimError> {
        Self::with_config(ModelConfig::default())
    }

    pub fn with_config(config: ModelConfig) -> Result<Self, SimError> {
        let mut graph = Graph::with_capacity(config.reserve_nodes);
        let registry = RegistryNodes::install(&mut graph)?;
        let mut model = Self {
            graph,
            registry,
            counters: [0; 8],
            config,
        };
        let coords = model.config.coords_attribute.clone();
        model.declare_attribute(EntityType::Position, &coords, DataType::List)?;
        log::debug!("model ready (coords attribute `{coords}`)");
        Ok(model)
    }

    /// Read-only access to the underlying graph.
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &RegistryNodes {
        &self.registry
    }

    // === Entities ===

    /// Allocates the next id for `ty`, creates its node and lists it in the
    /// registry. Ids come from a monotonic per-type counter and are never
    /// reused, whichever snapshot is active.
    pub(crate) fn create_entity(&mut self, ty: EntityType) -> Result<NodeId, SimError> {
        let counter = &mut self.counters[ty.index()];
        let id = format!("{}{}", ty.prefix(), *counter);
        *counter += 1;
        self.graph.add_node(&id)?;
        self.graph.set_node_property(&id, ENTITY_TYPE_PROP, ty.name())?;
        self.graph.add_edge(self.registry.entities(ty), &id, REGISTRY)?;
        log::trace!("created {ty} `{id}`");
        Ok(id)
    }

    /// Structural link `parent → child`.
    pub(crate) fn link(&mut self, parent: &str, child: &str) -> Result<(), SimError> {
        self.graph.add_edge(parent, child, STRUCTURAL)
    }

    /// Type of entity `id`; `NotFound` for unknown nodes and non-entity nodes.
    pub fn entity_type(&self, id: &str) -> Result<EntityType, SimError> {
        match self.graph.get_node_property(id, ENTITY_TYPE_PROP) {
            Ok(Value::Text(name)) => EntityType::from_str(name),
            Ok(other) => Err(SimError::InvariantViolation(format!(
                "`{id}` has a non-text entity type {other:?}"
            ))),
            Err(_) => Err(SimError::NotFound(format!("entity `{id}`"))),
        }
    }

    /// Whether `id` is an entity listed in the active snapshot.
    pub fn has_entity(&self, id: &str) -> bool {
        self.entity_type(id)
            .is_ok_and(|ty| self.graph.has_edge(self.registry.entities(ty), id, REGISTRY))
    }

    /// Type of `id`, which must be listed in the active snapshot.
    pub(crate) fn live_type(&self, id: &str) -> Result<EntityType, SimError> {
        let ty = self.entity_type(id)?;
        if !self.graph.has_edge(self.registry.entities(ty), id, REGISTRY) {
            return Err(SimError::NotFound(format!(
                "{ty} `{id}` in snapshot {}",
                self.graph.active_snapshot()
            )));
        }
        Ok(ty)
    }

    /// Fails with `InvalidTopology` unless `id` is a live entity of type `ty`.
    pub(crate) fn expect_type(&self, id: &str, ty: EntityType) -> Result<(), SimError> {
        let actual = self.live_type(id)?;
        if actual != ty {
            return Err(SimError::InvalidTopology(format!(
                "`{id}` is a {actual}, expected a {ty}"
            )));
        }
        Ok(())
    }

    /// Number of entities of `ty` in the active snapshot.
    pub fn num_entities(&self, ty: EntityType) -> usize {
        self.graph
            .degree_out(self.registry.entities(ty), REGISTRY)
            .unwrap_or(0)
    }

    /// Every entity of `ty` in the active snapshot, in creation order.
    pub fn all_entities(&self, ty: EntityType) -> Result<Vec<NodeId>, SimError> {
        self.graph.successors(self.registry.entities(ty), REGISTRY)
    }

    // === Snapshots ===

    /// See [`Graph::new_snapshot`].
    pub fn new_snapshot(&mut self, source: Option<SnapshotId>) -> Result<SnapshotId, SimError> {
        self.graph.new_snapshot(source)
    }

    pub fn set_active_snapshot(&mut self, ssid: SnapshotId) -> Result<(), SimError> {
        self.graph.set_active_snapshot(ssid)
    }

    #[inline]
    pub fn active_snapshot(&self) -> SnapshotId {
        self.graph.active_snapshot()
    }

    /// See [`Graph::merge_edge_type`]. The fixed channels and every attribute
    /// channel are valid edge types here.
    pub fn merge_edge_type(&mut self, edge_type: &str, source: SnapshotId) -> Result<(), SimError> {
        self.graph.merge_edge_type(edge_type, source)
    }
}

impl DebugInvariants for Model {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "model");
    }

    /// Graph invariants, plus: every registered entity carries the type of the
    /// registry that lists it, and its id was issued by that type's counter.
    fn validate_invariants(&self) -> Result<(), SimError> {
        self.graph.validate_invariants()?;
        for ty in EntityType::ALL {
            for id in self.all_entities(ty)? {
                let actual = self.entity_type(&id)?;
                if actual != ty {
                    return Err(SimError::InvariantViolation(format!(
                        "`{id}` is listed as a {ty} but typed {actual}"
                    )));
                }
                let issued = id
                    .strip_prefix(ty.prefix())
                    .and_then(|n| n.parse::<u64>().ok())
                    .is_some_and(|n| n < self.counters[ty.index()]);
                if !issued {
                    return Err(SimError::InvariantViolation(format!(
                        "`{id}` was not issued by the {ty} counter"
                    )));
                }
            }
        }
        Ok(())
    }
}
