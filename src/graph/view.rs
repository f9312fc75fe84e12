//! Read access to one snapshot.

use super::NodeId;
use super::edge_type::EdgeTypeDescriptor;
use super::ordered::OrderedMap;
use super::snapshot::{Snapshot, SnapshotId};
use super::table::{EdgeTable, Side};
use crate::sim_error::SimError;

/// Borrowed, read-only view of a single snapshot.
///
/// Obtained from [`Graph::view`](super::Graph::view) (explicit snapshot) or
/// [`Graph::active_view`](super::Graph::active_view). All results are fresh
/// copies; nothing returned here aliases the store.
///
/// # Example
/// ```rust
/// use sim_graph::graph::{Graph, Relationship};
/// let mut g = Graph::new();
/// g.add_node("a").unwrap();
/// g.add_node("b").unwrap();
/// g.add_edge_type("link", Relationship::ManyToMany, true).unwrap();
/// g.add_edge("a", "b", "link").unwrap();
/// let s1 = g.new_snapshot(None).unwrap();
/// assert!(g.view(0).unwrap().has_edge("a", "b", "link"));
/// assert!(!g.view(s1).unwrap().has_edge("a", "b", "link"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SnapshotView<'g> {
    edge_types: &'g OrderedMap<String, EdgeTypeDescriptor>,
    snapshot: &'g Snapshot,
}

impl<'g> SnapshotView<'g> {
    pub(crate) fn new(
        edge_types: &'g OrderedMap<String, EdgeTypeDescriptor>,
        snapshot: &'g Snapshot,
    ) -> Self {
        Self {
            edge_types,
            snapshot,
        }
    }

    #[inline]
    pub fn id(&self) -> SnapshotId {
        self.snapshot.id()
    }

    /// Table for `edge_type`, `None` if nothing was ever written to it here.
    fn table(&self, edge_type: &str) -> Result<Option<&'g EdgeTable>, SimError> {
        if !self.edge_types.contains_key(edge_type) {
            return Err(SimError::NotFound(format!("edge type `{edge_type}`")));
        }
        Ok(self.snapshot.table(edge_type))
    }

    fn reverse_side(&self, edge_type: &str) -> Result<Option<&'g Side>, SimError> {
        let descriptor = self
            .edge_types
            .get(edge_type)
            .ok_or_else(|| SimError::NotFound(format!("edge type `{edge_type}`")))?;
        if !descriptor.maintain_reverse {
            return Err(SimError::NoReverseIndex(edge_type.to_string()));
        }
        Ok(self.snapshot.table(edge_type).and_then(EdgeTable::reverse))
    }

    /// `false` for unknown edge types or missing forward entries.
    pub fn has_edge(&self, source: &str, target: &str, edge_type: &str) -> bool {
        self.snapshot
            .table(edge_type)
            .is_some_and(|t| t.contains(source, target))
    }

    pub fn successors(&self, source: &str, edge_type: &str) -> Result<Vec<NodeId>, SimError> {
        Ok(self
            .table(edge_type)?
            .map(|t| t.forward().values(source))
            .unwrap_or_default())
    }

    pub fn predecessors(&self, target: &str, edge_type: &str) -> Result<Vec<NodeId>, SimError> {
        Ok(self
            .reverse_side(edge_type)?
            .map(|side| side.values(target))
            .unwrap_or_default())
    }

    pub fn degree_out(&self, node: &str, edge_type: &str) -> Result<usize, SimError> {
        Ok(self
            .table(edge_type)?
            .map_or(0, |t| t.forward().degree(node)))
    }

    pub fn degree_in(&self, node: &str, edge_type: &str) -> Result<usize, SimError> {
        Ok(self
            .reverse_side(edge_type)?
            .map_or(0, |side| side.degree(node)))
    }

    pub fn degree(&self, node: &str, edge_type: &str) -> Result<usize, SimError> {
        Ok(self.degree_in(node, edge_type)? + self.degree_out(node, edge_type)?)
    }

    /// Nodes with at least one outgoing edge of `edge_type`, in insertion order.
    pub fn nodes_with_out_edge(&self, edge_type: &str) -> Result<Vec<NodeId>, SimError> {
        Ok(self
            .table(edge_type)?
            .map(|t| t.forward().keys())
            .unwrap_or_default())
    }

    /// Nodes with at least one incoming edge of `edge_type`, in insertion order.
    pub fn nodes_with_in_edge(&self, edge_type: &str) -> Result<Vec<NodeId>, SimError> {
        Ok(self
            .reverse_side(edge_type)?
            .map(Side::keys)
            .unwrap_or_default())
    }

    /// Number of edges of `edge_type` in this snapshot.
    pub fn edge_count(&self, edge_type: &str) -> Result<usize, SimError> {
        Ok(self.table(edge_type)?.map_or(0, EdgeTable::len))
    }
}
