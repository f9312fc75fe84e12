//! Cross-level navigation: which entities of type `T` are reachable from `E`.
//!
//! The hierarchy is layered but not a chain: points sit directly on
//! vertices while polylines and polygons sit on wires. Each navigation picks
//! an ordinal table according to the object kind involved and walks the
//! structural channel down (towards positions) or up (towards collections)
//! through the levels in between.

use std::collections::VecDeque;

use hashbrown::HashSet;
use itertools::Itertools;

use crate::graph::NodeId;
use crate::sim_error::SimError;
use crate::topology::entity::EntityType;
use crate::topology::model::Model;
use crate::topology::registry::STRUCTURAL;

/// Level numbering used for one navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrdinalTable {
    Point,
    Polyline,
    Polygon,
    Generic,
}

impl OrdinalTable {
    /// Table of whichever endpoint is an object kind, else the generic one.
    pub fn select(a: EntityType, b: EntityType) -> Self {
        let object = if a.is_object() { a } else { b };
        match object {
            EntityType::Point => OrdinalTable::Point,
            EntityType::Polyline => OrdinalTable::Polyline,
            EntityType::Polygon => OrdinalTable::Polygon,
            _ => OrdinalTable::Generic,
        }
    }

    /// Level of `ty` in this table; `None` if the table does not pass through it.
    pub fn ordinal(self, ty: EntityType) -> Option<u8> {
        use crate::topology::entity::EntityType as E;
        match (self, ty) {
            (_, E::Position) => Some(0),
            (_, E::Vertex) => Some(1),
            (OrdinalTable::Point, E::Point) => Some(2),
            (OrdinalTable::Point, E::Collection) => Some(3),
            (OrdinalTable::Point, _) => None,
            (_, E::Edge) => Some(2),
            (_, E::Wire) => Some(3),
            (_, E::Collection) => Some(5),
            (OrdinalTable::Polyline, E::Polyline)
            | (OrdinalTable::Polygon, E::Polygon)
            | (OrdinalTable::Generic, E::Point | E::Polyline | E::Polygon) => Some(4),
            _ => None,
        }
    }
}

impl Model {
    /// Entities of type `target` reachable from `source`, without duplicates.
    ///
    /// - Same type: `[source]`, except that a collection yields nothing.
    /// - Kinds that do not share a level chain (a point and an edge, a
    ///   polyline and a polygon, …) meet through their positions.
    /// - Otherwise the structural channel is walked level by level. Nested
    ///   collections are always expanded, in both directions.
    ///
    /// ```rust
    /// use sim_graph::topology::{EntityType, Model};
    /// let mut m = Model::new().unwrap();
    /// let p = m.add_position([0.0, 0.0, 0.0]).unwrap();
    /// let pt = m.add_point(&p).unwrap();
    /// let co = m.add_collection().unwrap();
    /// m.add_to_collection(&co, &pt).unwrap();
    /// assert_eq!(m.navigate(EntityType::Position, &co).unwrap(), vec![p]);
    /// assert_eq!(m.navigate(EntityType::Collection, &pt).unwrap(), vec![co]);
    /// ```
    pub fn navigate(&self, target: EntityType, source: &str) -> Result<Vec<NodeId>, SimError> {
        let source_ty = self.live_type(source)?;
        if source_ty == target {
            return Ok(if target == EntityType::Collection {
                Vec::new()
            } else {
                vec![source.to_string()]
            });
        }

        let table = OrdinalTable::select(source_ty, target);
        let (Some(from), Some(to)) = (table.ordinal(source_ty), table.ordinal(target)) else {
            return self.navigate_via_positions(target, source);
        };
        let downward = from > to;
        let touches_collection =
            source_ty == EntityType::Collection || target == EntityType::Collection;

        if from.abs_diff(to) == 1 && !touches_collection {
            let mut hits = Vec::new();
            for id in self.step(source, downward)? {
                if self.entity_type(&id)? == target {
                    hits.push(id);
                }
            }
            return Ok(hits);
        }

        let (lo, hi) = (from.min(to), from.max(to));
        let mut visited: HashSet<NodeId> = HashSet::new();
        visited.insert(source.to_string());
        let mut frontier = VecDeque::from([source.to_string()]);
        let mut found = Vec::new();
        while let Some(node) = frontier.pop_front() {
            for next in self.step(&node, downward)? {
                if !visited.insert(next.clone()) {
                    continue;
                }
                let ty = self.entity_type(&next)?;
                let between = table.ordinal(ty).is_some_and(|o| lo < o && o < hi);
                let expand = between || ty == EntityType::Collection;
                if ty == target {
                    found.push(next.clone());
                }
                if expand {
                    frontier.push_back(next);
                }
            }
        }
        log::trace!(
            "navigate {source_ty} `{source}` -> {target}: {} hits, {} visited",
            found.len(),
            visited.len()
        );
        Ok(found)
    }

    /// `None`: every entity of `target`. `Some(ids)`: union of
    /// [`navigate`](Model::navigate) over `ids`, in first-seen order.
    pub fn get_entities(
        &self,
        target: EntityType,
        sources: Option<&[NodeId]>,
    ) -> Result<Vec<NodeId>, SimError> {
        let Some(sources) = sources else {
            return self.all_entities(target);
        };
        let reached = sources
            .iter()
            .map(|s| self.navigate(target, s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reached.into_iter().flatten().unique().collect())
    }

    fn navigate_via_positions(
        &self,
        target: EntityType,
        source: &str,
    ) -> Result<Vec<NodeId>, SimError> {
        let positions = self.navigate(EntityType::Position, source)?;
        self.get_entities(target, Some(positions.as_slice()))
    }

    /// Structural children (`downward`) or parents of `id`.
    fn step(&self, id: &str, downward: bool) -> Result<Vec<NodeId>, SimError> {
        if downward {
            self.graph.successors(id, STRUCTURAL)
        } else {
            self.graph.predecessors(id, STRUCTURAL)
        }
    }
}
