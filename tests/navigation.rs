mod util;

use sim_graph::prelude::*;
use util::{assert_permutation, ids, positions};

/// Two triangles sharing the edge ps1–ps2, a polyline along the shared edge
/// and a point on ps3.
fn fixture() -> (Model, Vec<NodeId>) {
    let mut m = Model::new().unwrap();
    let ps = positions(
        &mut m,
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
    );
    m.add_polygon(&[&ps[0], &ps[1], &ps[2]]).unwrap();
    m.add_polygon(&[&ps[1], &ps[3], &ps[2]]).unwrap();
    m.add_polyline(&[&ps[1], &ps[2]]).unwrap();
    m.add_point(&ps[3]).unwrap();
    (m, ps)
}

#[test]
fn shared_positions_join_objects() {
    let (m, _) = fixture();
    assert_eq!(m.navigate(EntityType::Polygon, "ps1").unwrap(), ids(&["pg0", "pg1"]));
    assert_eq!(m.navigate(EntityType::Polygon, "ps0").unwrap(), ids(&["pg0"]));
    assert_eq!(m.navigate(EntityType::Polyline, "pg0").unwrap(), ids(&["pl0"]));
    assert_eq!(m.navigate(EntityType::Polygon, "pl0").unwrap(), ids(&["pg0", "pg1"]));
    assert_eq!(m.navigate(EntityType::Point, "pg1").unwrap(), ids(&["pt0"]));
    assert!(m.navigate(EntityType::Point, "pg0").unwrap().is_empty());
}

#[test]
fn one_level_steps_filter_by_type() {
    let (m, _) = fixture();
    // the point's vertex is a parent of ps3 alongside pg1's vertex
    let vertices = m.navigate(EntityType::Vertex, "ps3").unwrap();
    assert_eq!(vertices.len(), 2);
    let points: Vec<_> = vertices
        .iter()
        .flat_map(|v| m.navigate(EntityType::Point, v).unwrap())
        .collect();
    assert_eq!(points, ids(&["pt0"]));
    assert_eq!(m.navigate(EntityType::Wire, "pg1").unwrap().len(), 1);
}

#[test]
fn downward_positions_match_shapes() {
    let (m, _) = fixture();
    for ty in [EntityType::Polygon, EntityType::Polyline, EntityType::Point] {
        for id in m.get_entities(ty, None).unwrap() {
            let shape = m.get_entity_positions(&id).unwrap().flatten();
            let reached = m.navigate(EntityType::Position, &id).unwrap();
            assert_permutation(&reached, &shape);
        }
    }
}

#[test]
fn union_over_sources_keeps_first_seen_order() {
    let (m, _) = fixture();
    let sources = ids(&["pg1", "pt0", "pg0"]);
    assert_eq!(
        m.get_entities(EntityType::Position, Some(sources.as_slice())).unwrap(),
        ids(&["ps1", "ps3", "ps2", "ps0"])
    );
    assert_eq!(
        m.get_entities(EntityType::Polygon, Some(ids(&["ps0", "ps3"]).as_slice())).unwrap(),
        ids(&["pg0", "pg1"])
    );
}

#[test]
fn collections_gather_members_of_every_kind() {
    let (mut m, ps) = fixture();
    let co = m.add_collection().unwrap();
    m.add_to_collection(&co, "pg0").unwrap();
    m.add_to_collection(&co, "pt0").unwrap();
    let positions = m.navigate(EntityType::Position, &co).unwrap();
    assert_permutation(&positions, &ps);
    assert_eq!(m.navigate(EntityType::Collection, "ps3").unwrap(), vec![co.clone()]);
    assert_eq!(m.navigate(EntityType::Collection, "_e0").unwrap(), vec![co]);
    assert!(m.navigate(EntityType::Collection, "pl0").unwrap().is_empty());
}

#[test]
fn unknown_sources_fail() {
    let (m, _) = fixture();
    assert!(matches!(
        m.navigate(EntityType::Position, "pg9"),
        Err(SimError::NotFound(_))
    ));
    // registry nodes are not entities
    let registry = m.registry().entities(EntityType::Point).to_string();
    assert!(matches!(
        m.navigate(EntityType::Point, &registry),
        Err(SimError::NotFound(_))
    ));
}
