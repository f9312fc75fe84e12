mod util;

use sim_graph::prelude::*;
use util::{graph_with, ids};

fn seeded() -> Graph {
    let mut g = graph_with(&["a", "b", "c", "d"]);
    g.add_edge_type("owns", Relationship::OneToMany, true).unwrap();
    g.add_edge_type("link", Relationship::ManyToMany, true).unwrap();
    g.add_edge_type("pair", Relationship::OneToOne, false).unwrap();
    g.add_edge("a", "b", "owns").unwrap();
    g.add_edge("a", "c", "owns").unwrap();
    g.add_edge("b", "c", "link").unwrap();
    g.add_edge("c", "d", "pair").unwrap();
    g
}

const EDGES: [(&str, &str, &str); 4] = [
    ("a", "b", "owns"),
    ("a", "c", "owns"),
    ("b", "c", "link"),
    ("c", "d", "pair"),
];

#[test]
fn branch_copies_every_edge() {
    let mut g = seeded();
    let s1 = g.new_snapshot(Some(0)).unwrap();
    assert_eq!(g.active_snapshot(), s1);
    let (v0, v1) = (g.view(0).unwrap(), g.view(s1).unwrap());
    for (x, y, t) in EDGES {
        assert_eq!(v0.has_edge(x, y, t), v1.has_edge(x, y, t));
        assert!(v1.has_edge(x, y, t));
    }
    g.validate_invariants().unwrap();
}

#[test]
fn branch_and_source_are_isolated() {
    let mut g = seeded();
    let s1 = g.new_snapshot(Some(0)).unwrap();
    g.add_edge("d", "a", "link").unwrap();
    g.delete_edge("a", "b", "owns").unwrap();

    let v0 = g.view(0).unwrap();
    assert!(v0.has_edge("a", "b", "owns"));
    assert!(!v0.has_edge("d", "a", "link"));

    g.add_edge_at("b", "d", "link", 0).unwrap();
    let v1 = g.view(s1).unwrap();
    assert!(!v1.has_edge("b", "d", "link"));
    assert_eq!(v1.successors("a", "owns").unwrap(), ids(&["c"]));
}

#[test]
fn empty_snapshot_has_no_edges() {
    let mut g = seeded();
    let s1 = g.new_snapshot(None).unwrap();
    for (x, y, t) in EDGES {
        assert!(!g.has_edge(x, y, t));
    }
    assert_eq!(g.snapshot_parent(s1).unwrap(), None);
    // nodes are global
    assert!(g.has_node("a"));
}

#[test]
fn merge_unions_sets_and_copies_absent_keys() {
    let mut g = seeded();
    let s1 = g.new_snapshot(Some(0)).unwrap();
    g.add_edge("b", "d", "owns").unwrap();
    g.add_edge("a", "d", "link").unwrap();
    g.set_active_snapshot(0).unwrap();
    g.add_edge("a", "b", "link").unwrap();

    g.merge_edge_type("owns", s1).unwrap();
    g.merge_edge_type("link", s1).unwrap();
    assert_eq!(g.successors("b", "owns").unwrap(), ids(&["d"]));
    assert_eq!(g.successors("a", "link").unwrap(), ids(&["b", "d"]));
    // types not merged are untouched
    g.add_edge_at("a", "b", "pair", s1).unwrap();
    assert!(g.has_edge("c", "d", "pair"));
    assert!(!g.has_edge("a", "b", "pair"));
    g.validate_invariants().unwrap();
}

#[test]
fn merge_is_idempotent() {
    let mut once = seeded();
    let s1 = once.new_snapshot(Some(0)).unwrap();
    once.add_edge("d", "b", "link").unwrap();
    once.add_edge("b", "d", "owns").unwrap();
    once.set_active_snapshot(0).unwrap();
    let mut twice = once.clone();

    for t in ["owns", "link", "pair"] {
        once.merge_edge_type(t, s1).unwrap();
        twice.merge_edge_type(t, s1).unwrap();
        twice.merge_edge_type(t, s1).unwrap();
    }
    for t in ["owns", "link"] {
        for n in ["a", "b", "c", "d"] {
            assert_eq!(once.successors(n, t).unwrap(), twice.successors(n, t).unwrap());
            assert_eq!(once.predecessors(n, t).unwrap(), twice.predecessors(n, t).unwrap());
        }
    }
    assert_eq!(
        once.view(0).unwrap().edge_count("link").unwrap(),
        twice.view(0).unwrap().edge_count("link").unwrap()
    );
}

#[test]
fn diverging_single_values_conflict() {
    let mut g = seeded();
    let s1 = g.new_snapshot(Some(0)).unwrap();
    g.add_edge("c", "b", "pair").unwrap();
    g.add_edge("a", "d", "owns").unwrap();
    g.set_active_snapshot(0).unwrap();

    let err = g.merge_edge_type("pair", s1).unwrap_err();
    assert_eq!(
        err,
        SimError::MergeConflict {
            edge_type: "pair".into(),
            key: "c".into(),
            active: "d".into(),
            incoming: "b".into(),
        }
    );
    assert!(err.is_recoverable());
    assert!(g.has_edge("c", "d", "pair"));

    // OneToMany: reverse side is single-valued, `d` has no owner here yet
    g.merge_edge_type("owns", s1).unwrap();
    assert_eq!(g.predecessors("d", "owns").unwrap(), ids(&["a"]));
}

#[test]
fn unknown_snapshots_and_types() {
    let mut g = seeded();
    assert!(matches!(g.view(3), Err(SimError::NotFound(_))));
    assert!(matches!(g.merge_edge_type("owns", 3), Err(SimError::NotFound(_))));
    assert!(matches!(g.merge_edge_type("nope", 0), Err(SimError::NotFound(_))));
    assert!(matches!(g.successors("a", "nope"), Err(SimError::NotFound(_))));
}
