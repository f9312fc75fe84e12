//! The graph store: global nodes, edge-type registry and the snapshot list.

use hashbrown::HashMap;

use super::NodeId;
use super::edge_type::{EdgeTypeDescriptor, Relationship};
use super::ordered::OrderedMap;
use super::snapshot::{Snapshot, SnapshotId};
use super::view::SnapshotView;
use crate::debug_invariants::DebugInvariants;
use crate::sim_error::SimError;
use crate::value::Value;

/// A node and its properties. Nodes are shared by every snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    properties: HashMap<String, Value>,
}

impl Node {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.properties.iter()
    }
}

/// In-memory, versioned, multi-relational graph.
///
/// - Nodes are keyed by string and carry a property map.
/// - Edge types are registered once with a [`Relationship`] and an optional
///   reverse index.
/// - Edge membership is stored per snapshot. Exactly one snapshot is active;
///   the convenience methods on `Graph` read and write the active one, and
///   [`Graph::view`] / the `*_at` writers address any snapshot explicitly.
///
/// # Example
/// ```rust
/// use sim_graph::graph::{Graph, Relationship};
/// let mut g = Graph::new();
/// for n in ["a", "b", "c"] {
///     g.add_node(n).unwrap();
/// }
/// g.add_edge_type("pair", Relationship::OneToOne, true).unwrap();
/// g.add_edge("a", "b", "pair").unwrap();
/// g.add_edge("a", "c", "pair").unwrap();
/// assert!(!g.has_edge("a", "b", "pair"));
/// assert_eq!(g.successors("a", "pair").unwrap(), vec!["c".to_string()]);
/// ```
#[derive(Clone, Debug)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    edge_types: OrderedMap<String, EdgeTypeDescriptor>,
    snapshots: Vec<Snapshot>,
    active: SnapshotId,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty graph with snapshot `0` active.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Like [`Graph::new`], reserving room for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(nodes),
            edge_types: OrderedMap::new(),
            snapshots: vec![Snapshot::empty(0)],
            active: 0,
        }
    }

    // === Nodes ===

    pub fn add_node(&mut self, id: &str) -> Result<(), SimError> {
        if self.nodes.contains_key(id) {
            return Err(SimError::AlreadyExists(format!("node `{id}`")));
        }
        self.nodes.insert(id.to_string(), Node::default());
        Ok(())
    }

    #[inline]
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Result<&Node, SimError> {
        self.nodes
            .get(id)
            .ok_or_else(|| SimError::NotFound(format!("node `{id}`")))
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Sets (or overwrites) a property on an existing node.
    pub fn set_node_property(
        &mut self,
        id: &str,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), SimError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| SimError::NotFound(format!("node `{id}`")))?;
        node.properties.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn get_node_property(&self, id: &str, name: &str) -> Result<&Value, SimError> {
        self.node(id)?
            .property(name)
            .ok_or_else(|| SimError::NotFound(format!("property `{name}` on node `{id}`")))
    }

    /// Every property of `id`, in no particular order.
    pub fn node_properties(
        &self,
        id: &str,
    ) -> Result<impl Iterator<Item = (&String, &Value)> + '_, SimError> {
        Ok(self.node(id)?.properties())
    }

    pub fn has_node_property(&self, id: &str, name: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.properties.contains_key(name))
    }

    // === Edge types ===

    pub fn add_edge_type(
        &mut self,
        name: &str,
        relationship: Relationship,
        maintain_reverse: bool,
    ) -> Result<(), SimError> {
        if self.edge_types.contains_key(name) {
            return Err(SimError::AlreadyExists(format!("edge type `{name}`")));
        }
        log::debug!("registering edge type `{name}` ({relationship}, reverse={maintain_reverse})");
        self.edge_types.insert(
            name.to_string(),
            EdgeTypeDescriptor::new(name, relationship, maintain_reverse),
        );
        Ok(())
    }

    pub fn edge_type(&self, name: &str) -> Result<&EdgeTypeDescriptor, SimError> {
        self.edge_types
            .get(name)
            .ok_or_else(|| SimError::NotFound(format!("edge type `{name}`")))
    }

    /// Registered edge types, in registration order.
    pub fn edge_types(&self) -> impl Iterator<Item = &EdgeTypeDescriptor> + '_ {
        self.edge_types.iter().map(|(_, d)| d)
    }

    // === Edges (active snapshot) ===

    pub fn add_edge(&mut self, source: &str, target: &str, edge_type: &str) -> Result<(), SimError> {
        self.add_edge_at(source, target, edge_type, self.active)
    }

    pub fn delete_edge(
        &mut self,
        source: &str,
        target: &str,
        edge_type: &str,
    ) -> Result<(), SimError> {
        self.delete_edge_at(source, target, edge_type, self.active)
    }

    /// Adds `source → target` in snapshot `ssid`, applying the replace rule of
    /// the edge type's relationship.
    pub fn add_edge_at(
        &mut self,
        source: &str,
        target: &str,
        edge_type: &str,
        ssid: SnapshotId,
    ) -> Result<(), SimError> {
        for id in [source, target] {
            if !self.nodes.contains_key(id) {
                return Err(SimError::NotFound(format!("node `{id}`")));
            }
        }
        let descriptor = self
            .edge_types
            .get(edge_type)
            .ok_or_else(|| SimError::NotFound(format!("edge type `{edge_type}`")))?;
        let snapshot = self
            .snapshots
            .get_mut(ssid)
            .ok_or_else(|| SimError::NotFound(format!("snapshot {ssid}")))?;
        if source == target {
            return Err(SimError::InvalidEdge(format!(
                "self-loop on `{source}` via `{edge_type}`"
            )));
        }
        log::trace!("snapshot {ssid}: `{source}` -[{edge_type}]-> `{target}`");
        let table = snapshot.table_mut(descriptor);
        table.insert(source, target);
        crate::debug_invariants!(table.validate_invariants(), "after add_edge on `{edge_type}`");
        Ok(())
    }

    pub fn delete_edge_at(
        &mut self,
        source: &str,
        target: &str,
        edge_type: &str,
        ssid: SnapshotId,
    ) -> Result<(), SimError> {
        let descriptor = self
            .edge_types
            .get(edge_type)
            .ok_or_else(|| SimError::NotFound(format!("edge type `{edge_type}`")))?;
        let snapshot = self
            .snapshots
            .get_mut(ssid)
            .ok_or_else(|| SimError::NotFound(format!("snapshot {ssid}")))?;
        log::trace!("snapshot {ssid}: delete `{source}` -[{edge_type}]-> `{target}`");
        // Tables are created on first write only; a failed delete must not create one.
        if snapshot.table(edge_type).is_none() {
            return Err(SimError::NotFound(format!(
                "no `{edge_type}` edge leaves `{source}`"
            )));
        }
        let table = snapshot.table_mut(descriptor);
        table.remove(edge_type, source, target)?;
        crate::debug_invariants!(table.validate_invariants(), "after delete_edge on `{edge_type}`");
        Ok(())
    }

    // === Reads ===

    /// Read-only view of snapshot `ssid`.
    pub fn view(&self, ssid: SnapshotId) -> Result<SnapshotView<'_>, SimError> {
        let snapshot = self
            .snapshots
            .get(ssid)
            .ok_or_else(|| SimError::NotFound(format!("snapshot {ssid}")))?;
        Ok(SnapshotView::new(&self.edge_types, snapshot))
    }

    /// Read-only view of the active snapshot.
    pub fn active_view(&self) -> SnapshotView<'_> {
        SnapshotView::new(&self.edge_types, &self.snapshots[self.active])
    }

    pub fn has_edge(&self, source: &str, target: &str, edge_type: &str) -> bool {
        self.active_view().has_edge(source, target, edge_type)
    }

    pub fn successors(&self, source: &str, edge_type: &str) -> Result<Vec<NodeId>, SimError> {
        self.active_view().successors(source, edge_type)
    }

    pub fn predecessors(&self, target: &str, edge_type: &str) -> Result<Vec<NodeId>, SimError> {
        self.active_view().predecessors(target, edge_type)
    }

    pub fn degree_out(&self, node: &str, edge_type: &str) -> Result<usize, SimError> {
        self.active_view().degree_out(node, edge_type)
    }

    pub fn degree_in(&self, node: &str, edge_type: &str) -> Result<usize, SimError> {
        self.active_view().degree_in(node, edge_type)
    }

    pub fn degree(&self, node: &str, edge_type: &str) -> Result<usize, SimError> {
        self.active_view().degree(node, edge_type)
    }

    pub fn nodes_with_out_edge(&self, edge_type: &str) -> Result<Vec<NodeId>, SimError> {
        self.active_view().nodes_with_out_edge(edge_type)
    }

    pub fn nodes_with_in_edge(&self, edge_type: &str) -> Result<Vec<NodeId>, SimError> {
        self.active_view().nodes_with_in_edge(edge_type)
    }

    // === Snapshots ===

    /// Allocates the next snapshot id and makes it active.
    ///
    /// With `source = Some(s)` every edge table of `s` is deep-copied into the
    /// new snapshot (a branch); with `None` it starts empty.
    pub fn new_snapshot(&mut self, source: Option<SnapshotId>) -> Result<SnapshotId, SimError> {
        let id = self.snapshots.len();
        let snapshot = match source {
            Some(src) => {
                let from = self
                    .snapshots
                    .get(src)
                    .ok_or_else(|| SimError::NotFound(format!("snapshot {src}")))?;
                log::debug!(
                    "branching snapshot {id} from {src} ({} edges)",
                    from.edge_count()
                );
                Snapshot::branch_from(id, from)
            }
            None => {
                log::debug!("creating empty snapshot {id}");
                Snapshot::empty(id)
            }
        };
        self.snapshots.push(snapshot);
        self.active = id;
        Ok(id)
    }

    pub fn set_active_snapshot(&mut self, ssid: SnapshotId) -> Result<(), SimError> {
        if ssid >= self.snapshots.len() {
            return Err(SimError::NotFound(format!("snapshot {ssid}")));
        }
        log::debug!("activating snapshot {ssid}");
        self.active = ssid;
        Ok(())
    }

    #[inline]
    pub fn active_snapshot(&self) -> SnapshotId {
        self.active
    }

    #[inline]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// The snapshot `ssid` was branched from (`None` for empty snapshots).
    pub fn snapshot_parent(&self, ssid: SnapshotId) -> Result<Option<SnapshotId>, SimError> {
        self.snapshots
            .get(ssid)
            .map(Snapshot::parent)
            .ok_or_else(|| SimError::NotFound(format!("snapshot {ssid}")))
    }

    /// Additively merges one edge type's table from `source` into the active
    /// snapshot.
    ///
    /// Set-valued sides are unioned per key. A single-valued key that holds a
    /// different value in the active snapshot aborts the merge with
    /// [`SimError::MergeConflict`] before anything is written.
    pub fn merge_edge_type(&mut self, edge_type: &str, source: SnapshotId) -> Result<(), SimError> {
        let descriptor = self
            .edge_types
            .get(edge_type)
            .ok_or_else(|| SimError::NotFound(format!("edge type `{edge_type}`")))?;
        if source >= self.snapshots.len() {
            return Err(SimError::NotFound(format!("snapshot {source}")));
        }
        if source == self.active {
            return Ok(());
        }
        let Some(incoming) = self.snapshots[source].table(edge_type).map(|t| t.branch()) else {
            return Ok(());
        };
        log::debug!(
            "merging `{edge_type}` from snapshot {source} into {} ({} edges)",
            self.active,
            incoming.len()
        );
        let table = self.snapshots[self.active].table_mut(descriptor);
        if let Err(e) = table.merge_from(edge_type, &incoming) {
            log::warn!("{e}");
            return Err(e);
        }
        crate::debug_invariants!(table.validate_invariants(), "after merging `{edge_type}`");
        Ok(())
    }
}

impl DebugInvariants for Graph {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "graph");
    }

    fn validate_invariants(&self) -> Result<(), SimError> {
        if self.active >= self.snapshots.len() {
            return Err(SimError::InvariantViolation(format!(
                "active snapshot {} does not exist",
                self.active
            )));
        }
        for (i, snapshot) in self.snapshots.iter().enumerate() {
            if snapshot.id() != i {
                return Err(SimError::InvariantViolation(format!(
                    "snapshot at slot {i} carries id {}",
                    snapshot.id()
                )));
            }
            snapshot.validate_invariants()?;
        }
        Ok(())
    }
}
