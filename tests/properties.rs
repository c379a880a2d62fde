//! Property-based invariant checks (SPEC_FULL.md §8).

use test_strategy::proptest;
use tinmesh::mesh::InsertOutcome;
use tinmesh::{Constraint, ConstraintKind, Mesh, Vertex};

fn grid_vertices(n: u8) -> Vec<Vertex> {
  let n = (n % 6) + 3;
  let mut out = Vec::new();
  let mut idx = 0u32;
  for i in 0..n {
    for j in 0..n {
      out.push(Vertex::new(i as f64, j as f64, (i as f64) + (j as f64), idx));
      idx += 1;
    }
  }
  out
}

#[proptest]
fn half_edge_involutions_hold_after_grid_insertion(#[strategy(0u8..20)] n: u8) {
  let mut mesh = Mesh::new(1.0).unwrap();
  mesh.insert_all(grid_vertices(n)).unwrap();
  for e in mesh.edges() {
    assert_eq!(e.twin().twin(), e);
  }
}

#[proptest]
fn inserting_duplicate_vertex_does_not_grow_triangulation(#[strategy(0u8..20)] n: u8) {
  let mut mesh = Mesh::new(1.0).unwrap();
  let verts = grid_vertices(n);
  mesh.insert_all(verts.clone()).unwrap();
  let count_before = mesh.vertex_count();
  let edge_count_before = mesh.edges().count();
  mesh.insert(verts[0]).unwrap();
  let edge_count_after = mesh.edges().count();
  assert_eq!(edge_count_before, edge_count_after);
  assert!(mesh.vertex_count() >= count_before);
}

/// Builds a simple (non-self-intersecting) star-shaped polygon from a list
/// of radii: one vertex per radius, placed at equally spaced angles around
/// the origin in increasing order, so the chain never crosses itself
/// regardless of how the radii vary.
fn star_polygon_vertices(radii: &[f64]) -> Vec<Vertex> {
  let n = radii.len();
  radii
    .iter()
    .enumerate()
    .map(|(i, &r)| {
      let theta = std::f64::consts::TAU * (i as f64) / (n as f64);
      Vertex::new(r * theta.cos(), r * theta.sin(), r, i as u32)
    })
    .collect()
}

fn id(outcome: InsertOutcome) -> tinmesh::VertexId {
  match outcome {
    InsertOutcome::Inserted(id) | InsertOutcome::Merged(id) => id,
  }
}

#[proptest]
fn polygon_region_constraint_embeds_without_error(
  #[strategy(proptest::collection::vec(0.3f64..1.0, 3..9))] radii: Vec<f64>,
) {
  let mut mesh = Mesh::new(1.0).unwrap();
  // Insert one at a time (not via insert_all, which Hilbert-presorts and
  // would scramble the angular order the polygon connectivity relies on).
  let ids: Vec<_> = star_polygon_vertices(&radii)
    .into_iter()
    .map(|v| id(mesh.insert(v).unwrap()))
    .collect();

  mesh
    .add_constraints(vec![Constraint {
      kind: ConstraintKind::Polygon,
      vertices: ids,
      defines_region: true,
    }])
    .unwrap();

  // Every radius is strictly positive, so the origin lies strictly inside
  // the star polygon and is never on a constrained edge.
  assert!(mesh.natural_neighborhood(0.0, 0.0).is_some());
}

#[test]
fn fewer_than_three_vertices_never_bootstraps() {
  let mut mesh = Mesh::new(1.0).unwrap();
  mesh.insert(Vertex::new(0.0, 0.0, 0.0, 0)).unwrap();
  mesh.insert(Vertex::new(1.0, 0.0, 0.0, 1)).unwrap();
  assert!(!mesh.is_bootstrapped());
  assert!(mesh.locate(0.5, 0.0).is_none());
}

#[test]
fn colinear_input_defers_bootstrap_until_broken() {
  let mut mesh = Mesh::new(1.0).unwrap();
  mesh.insert(Vertex::new(0.0, 0.0, 0.0, 0)).unwrap();
  mesh.insert(Vertex::new(1.0, 0.0, 0.0, 1)).unwrap();
  mesh.insert(Vertex::new(2.0, 0.0, 0.0, 2)).unwrap();
  assert!(!mesh.is_bootstrapped());
  mesh.insert(Vertex::new(0.0, 1.0, 0.0, 3)).unwrap();
  assert!(mesh.is_bootstrapped());
}
