//! Entity construction: positions, points, polylines, polygons, collections.
//!
//! Composite entities build their own vertex/edge/wire chain. Vertices are
//! never shared between composites; two polylines through the same position
//! meet only at that position.

use crate::graph::NodeId;
use crate::sim_error::SimError;
use crate::topology::entity::EntityType;
use crate::topology::model::Model;
use crate::topology::registry::STRUCTURAL;

/// Splits a closed ring given with a repeated terminal position.
fn strip_closing<S: AsRef<str>>(positions: &[S]) -> (&[S], bool) {
    match positions {
        [first, .., last] if first.as_ref() == last.as_ref() => {
            (&positions[..positions.len() - 1], true)
        }
        _ => (positions, false),
    }
}

impl Model {
    /// Adds a position carrying `xyz` in the coordinates attribute.
    pub fn add_position(&mut self, xyz: [f64; 3]) -> Result<NodeId, SimError> {
        let id = self.create_entity(EntityType::Position)?;
        let coords = self.config().coords_attribute.clone();
        self.set_attribute_value(&id, &coords, xyz)?;
        Ok(id)
    }

    /// Adds a point: point → vertex → `position`.
    pub fn add_point(&mut self, position: &str) -> Result<NodeId, SimError> {
        self.expect_type(position, EntityType::Position)?;
        let vertex = self.add_vertex(position)?;
        let point = self.create_entity(EntityType::Point)?;
        self.link(&point, &vertex)?;
        Ok(point)
    }

    /// Adds a polyline through `positions`.
    ///
    /// At least two positions are required. The polyline is closed when the
    /// first and last positions are the same entity; the closing edge then
    /// wraps back to the first vertex, and the ring needs two distinct
    /// positions besides the repeated one.
    pub fn add_polyline<S: AsRef<str>>(&mut self, positions: &[S]) -> Result<NodeId, SimError> {
        if positions.len() < 2 {
            return Err(SimError::InvalidTopology(format!(
                "a polyline needs at least 2 positions, got {}",
                positions.len()
            )));
        }
        let (ring, closed) = strip_closing(positions);
        if closed && ring.len() < 2 {
            return Err(SimError::InvalidTopology(
                "a closed polyline needs at least 3 positions".into(),
            ));
        }
        self.expect_positions(ring)?;
        let wire = self.add_wire(ring, closed)?;
        let polyline = self.create_entity(EntityType::Polyline)?;
        self.link(&polyline, &wire)?;
        Ok(polyline)
    }

    /// Adds a polygon whose outer boundary runs through `positions`.
    ///
    /// The boundary is always closed. A repeated terminal position is
    /// accepted and dropped; at least three positions must remain.
    pub fn add_polygon<S: AsRef<str>>(&mut self, positions: &[S]) -> Result<NodeId, SimError> {
        let ring = self.closed_ring(positions)?;
        let wire = self.add_wire(ring, true)?;
        let polygon = self.create_entity(EntityType::Polygon)?;
        self.link(&polygon, &wire)?;
        Ok(polygon)
    }

    /// Adds a hole to `polygon` and returns the new wire.
    ///
    /// Holes follow the outer boundary in the polygon's wire list, in the
    /// order they are added.
    pub fn add_polygon_hole<S: AsRef<str>>(
        &mut self,
        polygon: &str,
        positions: &[S],
    ) -> Result<NodeId, SimError> {
        self.expect_type(polygon, EntityType::Polygon)?;
        let ring = self.closed_ring(positions)?;
        let wire = self.add_wire(ring, true)?;
        self.link(polygon, &wire)?;
        Ok(wire)
    }

    /// Adds an empty collection.
    pub fn add_collection(&mut self) -> Result<NodeId, SimError> {
        self.create_entity(EntityType::Collection)
    }

    /// Adds `entity` (a point, polyline, polygon or collection) to
    /// `collection`. Adding a member twice is a no-op. Cycles between
    /// collections are not detected.
    pub fn add_to_collection(&mut self, collection: &str, entity: &str) -> Result<(), SimError> {
        self.expect_type(collection, EntityType::Collection)?;
        let ty = self.live_type(entity)?;
        if !ty.is_collectable() {
            return Err(SimError::InvalidTopology(format!(
                "a {ty} cannot be a collection member"
            )));
        }
        if collection == entity {
            return Err(SimError::InvalidTopology(format!(
                "collection `{collection}` cannot contain itself"
            )));
        }
        self.link(collection, entity)
    }

    // === Inspection ===

    /// Whether a polyline or wire closes on itself. Polygons are always closed.
    pub fn is_closed(&self, id: &str) -> Result<bool, SimError> {
        match self.live_type(id)? {
            EntityType::Polygon => Ok(true),
            EntityType::Polyline => self.wire_is_closed(&self.first_child(id)?),
            EntityType::Wire => self.wire_is_closed(id),
            other => Err(SimError::InvalidTopology(format!(
                "`{id}` is a {other}; only polylines, polygons and wires can be closed"
            ))),
        }
    }

    /// Outer boundary wire of `polygon`.
    pub fn polygon_boundary(&self, polygon: &str) -> Result<NodeId, SimError> {
        self.expect_type(polygon, EntityType::Polygon)?;
        self.first_child(polygon)
    }

    /// Hole wires of `polygon`, in the order they were added.
    pub fn polygon_holes(&self, polygon: &str) -> Result<Vec<NodeId>, SimError> {
        self.expect_type(polygon, EntityType::Polygon)?;
        let mut wires = self.graph.successors(polygon, STRUCTURAL)?;
        if wires.is_empty() {
            return Err(SimError::InvariantViolation(format!(
                "polygon `{polygon}` has no boundary"
            )));
        }
        wires.remove(0);
        Ok(wires)
    }

    // === Internals ===

    /// First structural child of `id`.
    pub(crate) fn first_child(&self, id: &str) -> Result<NodeId, SimError> {
        self.graph
            .successors(id, STRUCTURAL)?
            .into_iter()
            .next()
            .ok_or_else(|| SimError::InvariantViolation(format!("`{id}` has no children")))
    }

    /// The two vertices of a topological edge, in construction order.
    pub(crate) fn edge_vertices(&self, edge: &str) -> Result<(NodeId, NodeId), SimError> {
        let mut vertices = self.graph.successors(edge, STRUCTURAL)?.into_iter();
        match (vertices.next(), vertices.next(), vertices.next()) {
            (Some(a), Some(b), None) => Ok((a, b)),
            _ => Err(SimError::InvariantViolation(format!(
                "edge `{edge}` does not join exactly two vertices"
            ))),
        }
    }

    pub(crate) fn wire_is_closed(&self, wire: &str) -> Result<bool, SimError> {
        let edges = self.graph.successors(wire, STRUCTURAL)?;
        let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
            return Err(SimError::InvariantViolation(format!(
                "wire `{wire}` has no edges"
            )));
        };
        let (start, _) = self.edge_vertices(first)?;
        let (_, end) = self.edge_vertices(last)?;
        Ok(start == end)
    }

    fn expect_positions<S: AsRef<str>>(&self, positions: &[S]) -> Result<(), SimError> {
        positions
            .iter()
            .try_for_each(|p| self.expect_type(p.as_ref(), EntityType::Position))
    }

    /// Ring of a closed wire: repeated terminal dropped, at least 3 positions.
    fn closed_ring<'a, S: AsRef<str>>(&self, positions: &'a [S]) -> Result<&'a [S], SimError> {
        let (ring, _) = strip_closing(positions);
        if ring.len() < 3 {
            return Err(SimError::InvalidTopology(format!(
                "a polygon ring needs at least 3 distinct positions, got {}",
                ring.len()
            )));
        }
        self.expect_positions(ring)?;
        Ok(ring)
    }

    fn add_vertex(&mut self, position: &str) -> Result<NodeId, SimError> {
        let vertex = self.create_entity(EntityType::Vertex)?;
        self.link(&vertex, position)?;
        Ok(vertex)
    }

    fn add_topo_edge(&mut self, from: &str, to: &str) -> Result<NodeId, SimError> {
        let edge = self.create_entity(EntityType::Edge)?;
        self.link(&edge, from)?;
        self.link(&edge, to)?;
        Ok(edge)
    }

    /// One vertex per ring position, one edge per consecutive pair, plus the
    /// closing edge when `closed`.
    fn add_wire<S: AsRef<str>>(&mut self, ring: &[S], closed: bool) -> Result<NodeId, SimError> {
        let vertices = ring
            .iter()
            .map(|p| self.add_vertex(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let mut edges = Vec::with_capacity(vertices.len());
        for pair in vertices.windows(2) {
            edges.push(self.add_topo_edge(&pair[0], &pair[1])?);
        }
        if closed {
            if let (Some(last), Some(first)) = (vertices.last(), vertices.first()) {
                edges.push(self.add_topo_edge(last, first)?);
            }
        }
        let wire = self.create_entity(EntityType::Wire)?;
        for edge in &edges {
            self.link(&wire, edge)?;
        }
        log::trace!(
            "wire `{wire}`: {} edges, {}",
            edges.len(),
            if closed { "closed" } else { "open" }
        );
        Ok(wire)
    }
}
