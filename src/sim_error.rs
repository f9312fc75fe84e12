//! SimError: unified error type for sim-graph public APIs
//!
//! Every fallible operation in the graph engine and the topology layer returns
//! `Result<_, SimError>`. None of these failures are transient; apart from
//! [`SimError::MergeConflict`] they all signal a violated precondition.

use thiserror::Error;

/// Unified error type for sim-graph operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A node, edge type or attribute with this key is already registered.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// A node, edge type, attribute, snapshot or property is missing.
    #[error("not found: {0}")]
    NotFound(String),
    /// Self-loops, or deleting an edge whose target is not the current one.
    #[error("invalid edge: {0}")]
    InvalidEdge(String),
    /// `predecessors`/`degree_in` on an edge type built without a reverse index.
    #[error("edge type `{0}` does not maintain a reverse index")]
    NoReverseIndex(String),
    /// Too few positions, or an entity of the wrong kind in a composite.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
    /// A value whose runtime type disagrees with the attribute declaration.
    #[error("type mismatch on attribute `{attribute}`: declared {expected}, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        found: String,
    },
    /// Re-declaring an attribute with a different data type.
    #[error("attribute `{attribute}` is declared as {existing}, cannot redeclare as {requested}")]
    TypeConflict {
        attribute: String,
        existing: String,
        requested: String,
    },
    /// Ordering comparator on a non-numeric attribute (or an unknown comparator).
    #[error("unsupported comparator: {0}")]
    UnsupportedComparator(String),
    /// Merging a snapshot found divergent single-valued edges.
    #[error(
        "merge conflict on `{edge_type}`: key `{key}` maps to `{active}` in the active snapshot but `{incoming}` in the merged one"
    )]
    MergeConflict {
        edge_type: String,
        key: String,
        active: String,
        incoming: String,
    },
    /// A value or name that cannot be encoded as a node key.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Operation exists in the API but has no defined semantics for this input.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// Forward/reverse tables (or registry bookkeeping) went out of sync.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl SimError {
    /// `true` for outcomes a caller is expected to resolve rather than treat as a bug.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimError::MergeConflict { .. })
    }
}
