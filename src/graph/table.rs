//! Per-snapshot storage for one edge type.
//!
//! An [`EdgeTable`] holds a forward side (source → target) and, when the edge
//! type maintains one, a reverse side (target → source). Each side is a
//! [`Side`]: either single-valued or set-valued, picked once from the
//! [`Relationship`] when the table is created.
//!
//! Writes use replace semantics: when a single-valued key is re-pointed, the
//! stale mirror entry of the old value is dropped before the new one lands, so
//! the two sides always describe the same set of edges.

use std::fmt::Write as _;

use super::NodeId;
use super::edge_type::{EdgeTypeDescriptor, Relationship};
use super::ordered::{OrderedMap, OrderedSet};
use crate::debug_invariants::DebugInvariants;
use crate::sim_error::SimError;

/// One direction of an edge table.
#[derive(Clone, Debug, PartialEq)]
pub enum Side {
    /// key → exactly one node
    Single(OrderedMap<NodeId, NodeId>),
    /// key → insertion-ordered set of nodes (never empty)
    Set(OrderedMap<NodeId, OrderedSet<NodeId>>),
}

impl Side {
    fn new(set_valued: bool) -> Self {
        if set_valued {
            Side::Set(OrderedMap::new())
        } else {
            Side::Single(OrderedMap::new())
        }
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        matches!(self, Side::Set(_))
    }

    #[inline]
    pub fn has_key(&self, key: &str) -> bool {
        match self {
            Side::Single(m) => m.contains_key(key),
            Side::Set(m) => m.contains_key(key),
        }
    }

    #[inline]
    pub fn contains(&self, key: &str, value: &str) -> bool {
        match self {
            Side::Single(m) => m.get(key).is_some_and(|v| v == value),
            Side::Set(m) => m.get(key).is_some_and(|s| s.contains(value)),
        }
    }

    /// Fresh copy of the nodes `key` maps to.
    pub fn values(&self, key: &str) -> Vec<NodeId> {
        match self {
            Side::Single(m) => m.get(key).cloned().into_iter().collect(),
            Side::Set(m) => m.get(key).map(OrderedSet::to_vec).unwrap_or_default(),
        }
    }

    #[inline]
    pub fn degree(&self, key: &str) -> usize {
        match self {
            Side::Single(m) => usize::from(m.contains_key(key)),
            Side::Set(m) => m.get(key).map_or(0, OrderedSet::len),
        }
    }

    /// Keys with at least one entry, in insertion order.
    pub fn keys(&self) -> Vec<NodeId> {
        match self {
            Side::Single(m) => m.keys().cloned().collect(),
            Side::Set(m) => m.keys().cloned().collect(),
        }
    }

    /// Every `(key, value)` pair on this side.
    pub fn pairs(&self) -> Box<dyn Iterator<Item = (&NodeId, &NodeId)> + '_> {
        match self {
            Side::Single(m) => Box::new(m.iter()),
            Side::Set(m) => Box::new(m.iter().flat_map(|(k, s)| s.iter().map(move |v| (k, v)))),
        }
    }

    /// Number of pairs on this side.
    pub fn pair_count(&self) -> usize {
        match self {
            Side::Single(m) => m.len(),
            Side::Set(m) => m.iter().map(|(_, s)| s.len()).sum(),
        }
    }

    /// Links `key → value`. On a single-valued side, returns the value that
    /// was displaced (only when it differs from `value`).
    fn link(&mut self, key: &str, value: &str) -> Option<NodeId> {
        match self {
            Side::Single(m) => match m.insert(key.to_owned(), value.to_owned()) {
                Some(old) if old != value => Some(old),
                _ => None,
            },
            Side::Set(m) => {
                m.get_or_insert_with(key.to_owned(), OrderedSet::new)
                    .insert(value.to_owned());
                None
            }
        }
    }

    /// Unlinks `key → value`; emptied sets are dropped. Returns whether the
    /// pair was present.
    fn unlink(&mut self, key: &str, value: &str) -> bool {
        match self {
            Side::Single(m) => {
                if m.get(key).is_some_and(|v| v == value) {
                    m.remove(key);
                    true
                } else {
                    false
                }
            }
            Side::Set(m) => {
                let Some(set) = m.get_mut(key) else {
                    return false;
                };
                let removed = set.remove(value);
                if set.is_empty() {
                    m.remove(key);
                }
                removed
            }
        }
    }

    /// First single-valued key where `incoming` disagrees with `self`.
    fn find_conflict<'a>(&'a self, incoming: &'a Side) -> Option<(&'a NodeId, &'a NodeId, &'a NodeId)> {
        match (self, incoming) {
            (Side::Single(mine), Side::Single(theirs)) => theirs.iter().find_map(|(k, v)| {
                mine.get(k.as_str())
                    .filter(|current| *current != v)
                    .map(|current| (k, current, v))
            }),
            _ => None,
        }
    }

    /// Additive copy of `incoming`: set-valued keys are unioned, absent
    /// single-valued keys are copied. Callers check conflicts first.
    fn absorb(&mut self, incoming: &Side) {
        match (self, incoming) {
            (Side::Single(mine), Side::Single(theirs)) => {
                for (k, v) in theirs.iter() {
                    if !mine.contains_key(k.as_str()) {
                        mine.insert(k.clone(), v.clone());
                    }
                }
            }
            (Side::Set(mine), Side::Set(theirs)) => {
                for (k, vs) in theirs.iter() {
                    mine.get_or_insert_with(k.clone(), OrderedSet::new)
                        .extend(vs.iter().cloned());
                }
            }
            _ => {}
        }
    }

    /// Structural copy, rebuilt variant by variant.
    fn branch(&self) -> Side {
        match self {
            Side::Single(m) => {
                let mut out = OrderedMap::with_capacity(m.len());
                for (k, v) in m.iter() {
                    out.insert(k.clone(), v.clone());
                }
                Side::Single(out)
            }
            Side::Set(m) => {
                let mut out = OrderedMap::with_capacity(m.len());
                for (k, vs) in m.iter() {
                    out.insert(k.clone(), vs.iter().cloned().collect());
                }
                Side::Set(out)
            }
        }
    }
}

/// Forward and reverse index of one edge type inside one snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeTable {
    relationship: Relationship,
    forward: Side,
    reverse: Option<Side>,
}

impl EdgeTable {
    pub fn new(descriptor: &EdgeTypeDescriptor) -> Self {
        let rel = descriptor.relationship;
        Self {
            relationship: rel,
            forward: Side::new(rel.forward_is_set()),
            reverse: descriptor
                .maintain_reverse
                .then(|| Side::new(rel.reverse_is_set())),
        }
    }

    #[inline]
    pub fn relationship(&self) -> Relationship {
        self.relationship
    }

    #[inline]
    pub fn forward(&self) -> &Side {
        &self.forward
    }

    /// `None` when the edge type was registered without a reverse index.
    #[inline]
    pub fn reverse(&self) -> Option<&Side> {
        self.reverse.as_ref()
    }

    #[inline]
    pub fn contains(&self, source: &str, target: &str) -> bool {
        self.forward.contains(source, target)
    }

    /// Number of edges stored.
    pub fn len(&self) -> usize {
        self.forward.pair_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds `source → target`, evicting whatever a single-valued side
    /// previously held for either endpoint.
    pub(crate) fn insert(&mut self, source: &str, target: &str) {
        if let Some(old_target) = self.forward.link(source, target) {
            if let Some(rev) = self.reverse.as_mut() {
                rev.unlink(&old_target, source);
            }
        }
        if let Some(rev) = self.reverse.as_mut() {
            if let Some(old_source) = rev.link(target, source) {
                self.forward.unlink(&old_source, target);
            }
        }
    }

    /// Removes `source → target` from both sides.
    pub(crate) fn remove(&mut self, name: &str, source: &str, target: &str) -> Result<(), SimError> {
        match &self.forward {
            Side::Single(m) => match m.get(source) {
                None => {
                    return Err(SimError::NotFound(format!(
                        "no `{name}` edge leaves `{source}`"
                    )));
                }
                Some(current) if current != target => {
                    return Err(SimError::InvalidEdge(format!(
                        "`{source}` points at `{current}` via `{name}`, not at `{target}`"
                    )));
                }
                Some(_) => {}
            },
            Side::Set(m) => match m.get(source) {
                None => {
                    return Err(SimError::NotFound(format!(
                        "no `{name}` edge leaves `{source}`"
                    )));
                }
                Some(set) if !set.contains(target) => {
                    return Err(SimError::NotFound(format!(
                        "no `{name}` edge `{source}` -> `{target}`"
                    )));
                }
                Some(_) => {}
            },
        }
        self.forward.unlink(source, target);
        if let Some(rev) = self.reverse.as_mut() {
            rev.unlink(target, source);
        }
        Ok(())
    }

    /// Additively merges `incoming` into `self`. Nothing is written when a
    /// single-valued key diverges.
    pub(crate) fn merge_from(&mut self, name: &str, incoming: &EdgeTable) -> Result<(), SimError> {
        let mut conflict = self.forward.find_conflict(&incoming.forward);
        if conflict.is_none() {
            if let (Some(mine), Some(theirs)) = (&self.reverse, &incoming.reverse) {
                conflict = mine.find_conflict(theirs);
            }
        }
        if let Some((key, active, theirs)) = conflict {
            return Err(SimError::MergeConflict {
                edge_type: name.to_string(),
                key: key.clone(),
                active: active.clone(),
                incoming: theirs.clone(),
            });
        }
        self.forward.absorb(&incoming.forward);
        if let (Some(mine), Some(theirs)) = (self.reverse.as_mut(), incoming.reverse.as_ref()) {
            mine.absorb(theirs);
        }
        Ok(())
    }

    /// Deep copy for snapshot branching.
    pub(crate) fn branch(&self) -> EdgeTable {
        EdgeTable {
            relationship: self.relationship,
            forward: self.forward.branch(),
            reverse: self.reverse.as_ref().map(Side::branch),
        }
    }
}

impl DebugInvariants for EdgeTable {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "edge table");
    }

    fn validate_invariants(&self) -> Result<(), SimError> {
        let mut problems = String::new();
        if self.forward.is_set() != self.relationship.forward_is_set() {
            let _ = write!(problems, "forward side has the wrong shape; ");
        }
        if let Side::Set(m) = &self.forward {
            for (k, s) in m.iter() {
                if s.is_empty() {
                    let _ = write!(problems, "empty forward set under `{k}`; ");
                }
            }
        }
        if let Some(rev) = &self.reverse {
            if rev.is_set() != self.relationship.reverse_is_set() {
                let _ = write!(problems, "reverse side has the wrong shape; ");
            }
            for (src, dst) in self.forward.pairs() {
                if !rev.contains(dst, src) {
                    let _ = write!(problems, "missing reverse mirror for `{src}` -> `{dst}`; ");
                }
            }
            for (dst, src) in rev.pairs() {
                if !self.forward.contains(src, dst) {
                    let _ = write!(problems, "missing forward mirror for `{src}` -> `{dst}`; ");
                }
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(SimError::InvariantViolation(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rel: Relationship, reverse: bool) -> EdgeTable {
        EdgeTable::new(&EdgeTypeDescriptor::new("t", rel, reverse))
    }

    #[test]
    fn one_to_one_replaces_both_directions() {
        let mut t = table(Relationship::OneToOne, true);
        t.insert("a", "b");
        t.insert("a", "c");
        assert!(!t.contains("a", "b"));
        assert!(t.contains("a", "c"));
        assert!(!t.reverse().unwrap().has_key("b"));

        // re-pointing the target side evicts the old source
        t.insert("d", "c");
        assert!(!t.contains("a", "c"));
        assert!(!t.forward().has_key("a"));
        assert_eq!(t.reverse().unwrap().values("c"), vec!["d".to_string()]);
        t.validate_invariants().unwrap();
    }

    #[test]
    fn one_to_many_moves_child_between_parents() {
        let mut t = table(Relationship::OneToMany, true);
        t.insert("p1", "c");
        t.insert("p1", "d");
        t.insert("p2", "c");
        assert_eq!(t.forward().values("p1"), vec!["d".to_string()]);
        assert_eq!(t.forward().values("p2"), vec!["c".to_string()]);
        assert_eq!(t.reverse().unwrap().values("c"), vec!["p2".to_string()]);
        t.validate_invariants().unwrap();
    }

    #[test]
    fn many_to_one_replacement_drops_stale_reverse_member() {
        let mut t = table(Relationship::ManyToOne, true);
        t.insert("e1", "v5");
        t.insert("e2", "v5");
        t.insert("e1", "v9");
        assert_eq!(t.reverse().unwrap().values("v5"), vec!["e2".to_string()]);
        assert_eq!(t.reverse().unwrap().values("v9"), vec!["e1".to_string()]);
        t.validate_invariants().unwrap();
    }

    #[test]
    fn many_to_many_accumulates_in_order() {
        let mut t = table(Relationship::ManyToMany, true);
        t.insert("a", "c");
        t.insert("a", "b");
        t.insert("a", "c");
        assert_eq!(t.forward().values("a"), vec!["c".to_string(), "b".to_string()]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn remove_reports_missing_edges() {
        let mut t = table(Relationship::ManyToOne, true);
        t.insert("a", "b");
        assert!(matches!(t.remove("t", "x", "b"), Err(SimError::NotFound(_))));
        assert!(matches!(t.remove("t", "a", "c"), Err(SimError::InvalidEdge(_))));
        t.remove("t", "a", "b").unwrap();
        assert!(t.is_empty());
        assert!(!t.reverse().unwrap().has_key("b"));

        let mut s = table(Relationship::ManyToMany, true);
        s.insert("a", "b");
        assert!(matches!(s.remove("t", "a", "c"), Err(SimError::NotFound(_))));
        s.remove("t", "a", "b").unwrap();
        assert!(!s.forward().has_key("a"));
    }

    #[test]
    fn merge_conflicts_leave_table_untouched() {
        let mut dst = table(Relationship::ManyToOne, true);
        dst.insert("a", "x");
        dst.insert("b", "y");
        let mut src = table(Relationship::ManyToOne, true);
        src.insert("c", "z");
        src.insert("a", "w");
        let before = dst.clone();
        let err = dst.merge_from("t", &src).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(dst, before);
    }

    #[test]
    fn merge_unions_sets_and_copies_absent_keys() {
        let mut dst = table(Relationship::ManyToMany, true);
        dst.insert("a", "x");
        let mut src = table(Relationship::ManyToMany, true);
        src.insert("a", "y");
        src.insert("b", "x");
        dst.merge_from("t", &src).unwrap();
        assert_eq!(dst.forward().values("a"), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(dst.reverse().unwrap().values("x"), vec!["a".to_string(), "b".to_string()]);
        dst.validate_invariants().unwrap();
    }

    #[test]
    fn branch_is_independent() {
        let mut t = table(Relationship::OneToMany, true);
        t.insert("r", "a");
        let mut b = t.branch();
        assert_eq!(b, t);
        b.insert("r", "z");
        assert!(!t.contains("r", "z"));
    }

    #[test]
    fn no_reverse_side_without_index() {
        let mut t = table(Relationship::ManyToMany, false);
        t.insert("a", "b");
        assert!(t.reverse().is_none());
        t.validate_invariants().unwrap();
    }
}
