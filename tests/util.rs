#![allow(dead_code)]
use sim_graph::prelude::*;

/// Graph with the given nodes and no edge types.
pub fn graph_with(nodes: &[&str]) -> Graph {
    let mut g = Graph::new();
    for n in nodes {
        g.add_node(n).unwrap();
    }
    g
}

/// Owned ids, for comparing against returned vectors.
pub fn ids(raw: &[&str]) -> Vec<NodeId> {
    raw.iter().map(|s| s.to_string()).collect()
}

/// One position per coordinate triple.
pub fn positions(m: &mut Model, coords: &[[f64; 3]]) -> Vec<NodeId> {
    coords.iter().map(|&xyz| m.add_position(xyz).unwrap()).collect()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Clone + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
