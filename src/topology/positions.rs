//! Unwinding entities down to their positions and coordinates.

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;
use crate::sim_error::SimError;
use crate::topology::entity::EntityType;
use crate::topology::model::Model;
use crate::topology::registry::STRUCTURAL;

/// Result shape of [`Model::get_entity_positions`] and
/// [`Model::get_entity_coordinates`].
///
/// - `One`: positions, vertices and points.
/// - `Seq`: edges, wires and polylines, in wire order.
/// - `Nested`: polygons, one sequence per wire with the outer boundary first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shape<T> {
    One(T),
    Seq(Vec<T>),
    Nested(Vec<Vec<T>>),
}

impl<T> Shape<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Shape<U> {
        match self {
            Shape::One(x) => Shape::One(f(x)),
            Shape::Seq(xs) => Shape::Seq(xs.into_iter().map(f).collect()),
            Shape::Nested(rings) => Shape::Nested(
                rings
                    .into_iter()
                    .map(|ring| ring.into_iter().map(&mut f).collect())
                    .collect(),
            ),
        }
    }

    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<Shape<U>, E> {
        Ok(match self {
            Shape::One(x) => Shape::One(f(x)?),
            Shape::Seq(xs) => Shape::Seq(xs.into_iter().map(f).collect::<Result<_, _>>()?),
            Shape::Nested(rings) => Shape::Nested(
                rings
                    .into_iter()
                    .map(|ring| ring.into_iter().map(&mut f).collect::<Result<Vec<_>, _>>())
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// All elements in order, nesting dropped.
    pub fn flatten(self) -> Vec<T> {
        match self {
            Shape::One(x) => vec![x],
            Shape::Seq(xs) => xs,
            Shape::Nested(rings) => rings.into_iter().flatten().collect(),
        }
    }
}

impl Model {
    /// Positions of `entity`; see [`Shape`]. Closed wires do not repeat their
    /// first position. Collections are not supported.
    pub fn get_entity_positions(&self, entity: &str) -> Result<Shape<NodeId>, SimError> {
        match self.live_type(entity)? {
            EntityType::Position => Ok(Shape::One(entity.to_string())),
            EntityType::Vertex => self.first_child(entity).map(Shape::One),
            EntityType::Point => self.first_child(&self.first_child(entity)?).map(Shape::One),
            EntityType::Edge => {
                let (a, b) = self.edge_vertices(entity)?;
                Ok(Shape::Seq(vec![self.first_child(&a)?, self.first_child(&b)?]))
            }
            EntityType::Wire => self.wire_positions(entity).map(Shape::Seq),
            EntityType::Polyline => self
                .wire_positions(&self.first_child(entity)?)
                .map(Shape::Seq),
            EntityType::Polygon => self
                .graph
                .successors(entity, STRUCTURAL)?
                .iter()
                .map(|wire| self.wire_positions(wire))
                .collect::<Result<Vec<_>, _>>()
                .map(Shape::Nested),
            EntityType::Collection => Err(SimError::NotImplemented(format!(
                "positions of collection `{entity}`"
            ))),
        }
    }

    /// Coordinates of `entity`, shaped like [`Model::get_entity_positions`].
    pub fn get_entity_coordinates(&self, entity: &str) -> Result<Shape<[f64; 3]>, SimError> {
        self.get_entity_positions(entity)?
            .try_map(|p| self.position_coordinates(&p))
    }

    /// The coordinate triple stored on `position`.
    pub fn position_coordinates(&self, position: &str) -> Result<[f64; 3], SimError> {
        let name = &self.config().coords_attribute;
        let malformed = |found: String| SimError::TypeMismatch {
            attribute: name.clone(),
            expected: "list of 3 numbers".into(),
            found,
        };
        let value = self
            .get_attribute_value(position, name)?
            .ok_or_else(|| SimError::NotFound(format!("coordinates of `{position}`")))?;
        match value.as_list() {
            Some([x, y, z]) => match (x.as_number(), y.as_number(), z.as_number()) {
                (Some(x), Some(y), Some(z)) => Ok([x, y, z]),
                _ => Err(malformed(value.to_string())),
            },
            _ => Err(malformed(value.to_string())),
        }
    }

    /// Positions along `wire`: the first vertex of every edge, plus the end of
    /// the last edge when the wire is open.
    fn wire_positions(&self, wire: &str) -> Result<Vec<NodeId>, SimError> {
        let edges = self.graph.successors(wire, STRUCTURAL)?;
        let mut positions = Vec::with_capacity(edges.len() + 1);
        let mut last_end = None;
        for edge in &edges {
            let (start, end) = self.edge_vertices(edge)?;
            positions.push(self.first_child(&start)?);
            last_end = Some(end);
        }
        if !self.wire_is_closed(wire)? {
            if let Some(end) = last_end {
                positions.push(self.first_child(&end)?);
            }
        }
        Ok(positions)
    }
}
