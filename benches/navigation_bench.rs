use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use sim_graph::graph::NodeId;
use sim_graph::topology::{Comparator, EntityType, Model};
use sim_graph::value::{DataType, Value};

/// `n × n` grid of positions covered by quads, all gathered in one collection.
fn build_grid(n: usize) -> (Model, Vec<NodeId>, NodeId) {
    let mut m = Model::new().expect("model");
    m.declare_attribute(EntityType::Position, "row", DataType::Number)
        .expect("declare");
    let mut ps = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let p = m.add_position([i as f64, j as f64, 0.0]).expect("position");
            m.set_attribute_value(&p, "row", j as f64).expect("row");
            ps.push(p);
        }
    }
    let co = m.add_collection().expect("collection");
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let quad = [
                &ps[j * n + i],
                &ps[j * n + i + 1],
                &ps[(j + 1) * n + i + 1],
                &ps[(j + 1) * n + i],
            ];
            let pg = m.add_polygon(&quad).expect("polygon");
            m.add_to_collection(&co, &pg).expect("member");
        }
    }
    (m, ps, co)
}

fn bench_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigation");

    for &n in &[8usize, 16] {
        let (model, ps, co) = build_grid(n);
        let centre = ps[(n / 2) * n + n / 2].clone();

        group.bench_with_input(BenchmarkId::new("collection_to_positions", n), &n, |b, _| {
            b.iter(|| {
                let out = model.navigate(EntityType::Position, &co).unwrap();
                black_box(out);
            });
        });

        group.bench_with_input(BenchmarkId::new("position_to_polygons", n), &n, |b, _| {
            b.iter(|| {
                let out = model.navigate(EntityType::Polygon, &centre).unwrap();
                black_box(out);
            });
        });

        group.bench_with_input(BenchmarkId::new("branch_snapshot", n), &n, |b, _| {
            b.iter(|| {
                let mut m = model.clone();
                let s = m.new_snapshot(Some(0)).unwrap();
                black_box(s);
            });
        });

        let row = Value::from((n / 2) as f64);
        group.bench_with_input(BenchmarkId::new("query_eq", n), &n, |b, _| {
            b.iter(|| {
                let out = model
                    .query(EntityType::Position, "row", Comparator::Eq, Some(&row))
                    .unwrap();
                black_box(out);
            });
        });
        group.bench_with_input(BenchmarkId::new("query_ge", n), &n, |b, _| {
            b.iter(|| {
                let out = model
                    .query(EntityType::Position, "row", Comparator::Ge, Some(&row))
                    .unwrap();
                black_box(out);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_navigation);
criterion_main!(benches);
