//! Snapshots: versioned copies of every edge table.
//!
//! Nodes and edge-type descriptors live on the [`Graph`](super::Graph) and are
//! shared by all snapshots; a snapshot only owns edge membership. Tables are
//! created lazily on the first write, so an edge type registered late is still
//! usable in every snapshot.

use hashbrown::HashMap;

use super::edge_type::EdgeTypeDescriptor;
use super::table::EdgeTable;
use crate::debug_invariants::DebugInvariants;
use crate::sim_error::SimError;

/// Snapshot identifier. Snapshot `0` exists from construction.
pub type SnapshotId = usize;

#[derive(Clone, Debug)]
pub struct Snapshot {
    id: SnapshotId,
    parent: Option<SnapshotId>,
    tables: HashMap<String, EdgeTable>,
}

impl Snapshot {
    pub(crate) fn empty(id: SnapshotId) -> Self {
        Self {
            id,
            parent: None,
            tables: HashMap::new(),
        }
    }

    /// Copy-on-branch: every table of `source` is rebuilt for the new snapshot.
    pub(crate) fn branch_from(id: SnapshotId, source: &Snapshot) -> Self {
        let tables = source
            .tables
            .iter()
            .map(|(name, table)| (name.clone(), table.branch()))
            .collect();
        Self {
            id,
            parent: Some(source.id),
            tables,
        }
    }

    #[inline]
    pub fn id(&self) -> SnapshotId {
        self.id
    }

    /// The snapshot this one was branched from, if any.
    #[inline]
    pub fn parent(&self) -> Option<SnapshotId> {
        self.parent
    }

    #[inline]
    pub fn table(&self, edge_type: &str) -> Option<&EdgeTable> {
        self.tables.get(edge_type)
    }

    pub(crate) fn table_mut(&mut self, descriptor: &EdgeTypeDescriptor) -> &mut EdgeTable {
        self.tables
            .entry(descriptor.name.clone())
            .or_insert_with(|| EdgeTable::new(descriptor))
    }

    /// Total number of edges across all edge types.
    pub fn edge_count(&self) -> usize {
        self.tables.values().map(EdgeTable::len).sum()
    }
}

impl DebugInvariants for Snapshot {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "snapshot {}", self.id);
    }

    fn validate_invariants(&self) -> Result<(), SimError> {
        for (name, table) in &self.tables {
            table.validate_invariants().map_err(|e| {
                SimError::InvariantViolation(format!("snapshot {} / `{name}`: {e}", self.id))
            })?;
        }
        Ok(())
    }
}
