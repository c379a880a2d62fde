//! End-to-end scenarios (SPEC_FULL.md §8).

use tinmesh::{Constraint, ConstraintKind, Mesh, OlsRequest, SurfaceModel, Vertex};

fn unit_square() -> Mesh {
  let mut mesh = Mesh::new(1.0).unwrap();
  mesh.insert(Vertex::new(0.0, 0.0, 0.0, 0)).unwrap();
  mesh.insert(Vertex::new(1.0, 0.0, 0.0, 1)).unwrap();
  mesh.insert(Vertex::new(1.0, 1.0, 0.0, 2)).unwrap();
  mesh.insert(Vertex::new(0.0, 1.0, 0.0, 3)).unwrap();
  mesh
}

fn ols_request(x: f64, y: f64, model: SurfaceModel) -> OlsRequest {
  OlsRequest {
    x,
    y,
    model,
    model_fallback: true,
    compute_extended_stats: false,
    population_fraction: 0.95,
  }
}

#[test]
fn scenario_1_unit_square() {
  let mut mesh = unit_square();
  let nn = mesh.interpolate_natural_neighbor(0.5, 0.5).unwrap();
  assert!(nn.value.abs() < 1e-12);

  let ols = mesh.interpolate_ols(ols_request(0.5, 0.5, SurfaceModel::Planar)).unwrap();
  for &b in &ols.beta {
    assert!(b.abs() < 1e-9);
  }
}

#[test]
fn scenario_2_tilted_plane() {
  let (a, b, c) = (2.0, -3.0, 5.0);
  let z = |x: f64, y: f64| a * x + b * y + c;
  let mut mesh = Mesh::new(1.0).unwrap();
  mesh.insert(Vertex::new(0.0, 0.0, z(0.0, 0.0), 0)).unwrap();
  mesh.insert(Vertex::new(1.0, 0.0, z(1.0, 0.0), 1)).unwrap();
  mesh.insert(Vertex::new(1.0, 1.0, z(1.0, 1.0), 2)).unwrap();
  mesh.insert(Vertex::new(0.0, 1.0, z(0.0, 1.0), 3)).unwrap();

  let expected = z(0.25, 0.75);
  let nn = mesh.interpolate_natural_neighbor(0.25, 0.75).unwrap();
  assert!((nn.value - expected).abs() < 1e-8);

  let ols = mesh
    .interpolate_ols(ols_request(0.25, 0.75, SurfaceModel::Planar))
    .unwrap();
  assert!((ols.estimate - expected).abs() < 1e-8);
  assert!((ols.beta[1] - a).abs() < 1e-8);
  assert!((ols.beta[2] - b).abs() < 1e-8);
}

#[test]
fn scenario_3_vertex_coincidence() {
  let mut mesh = unit_square();
  let nn = mesh.interpolate_natural_neighbor(1.0, 0.0).unwrap();
  assert!(nn.value.abs() < 1e-12);
  assert!(nn.barycentric_deviation < 1e-9);
}

#[test]
fn scenario_4_hexagon_cavity_has_six_edges() {
  let mut mesh = Mesh::new(1.0).unwrap();
  let center = Vertex::new(0.0, 0.0, 0.0, 0);
  mesh.insert(center).unwrap();
  for i in 0..6u32 {
    let theta = std::f64::consts::PI / 3.0 * i as f64;
    mesh
      .insert(Vertex::new(theta.cos(), theta.sin(), 0.0, i + 1))
      .unwrap();
  }
  let cavity = mesh.natural_neighborhood(0.0, 0.0);
  assert!(cavity.is_some());
  let cavity = cavity.unwrap();
  assert_eq!(cavity.weights.len(), 6);
}

#[test]
fn scenario_5_constrained_edge_blocks_cavity() {
  use tinmesh::mesh::InsertOutcome;
  let id = |o: InsertOutcome| match o {
    InsertOutcome::Inserted(id) | InsertOutcome::Merged(id) => id,
  };

  let mut mesh = Mesh::new(1.0).unwrap();
  let a = id(mesh.insert(Vertex::new(0.0, 0.0, 0.0, 0)).unwrap());
  let b = id(mesh.insert(Vertex::new(1.0, 0.0, 0.0, 1)).unwrap());
  let c = id(mesh.insert(Vertex::new(1.0, 1.0, 0.0, 2)).unwrap());
  let d = id(mesh.insert(Vertex::new(0.0, 1.0, 0.0, 3)).unwrap());

  // The unit square's four corners are cocircular, so either diagonal's two
  // triangles share one circumcircle and a query near the diagonal, but
  // strictly inside it, draws its cavity from both triangles.
  let (qx, qy) = (0.8, 0.1);
  let unconstrained = mesh.natural_neighborhood(qx, qy).unwrap();
  assert_eq!(unconstrained.weights.len(), 4);

  // Force the a-c diagonal to exist (flipping the other one if that's what
  // the Delaunay triangulation picked) and constrain it. The query sits on
  // a's and b's side of that diagonal, so its cavity should no longer reach
  // across to d.
  mesh
    .add_constraints(vec![Constraint {
      kind: ConstraintKind::Linear,
      vertices: vec![a, c],
      defines_region: false,
    }])
    .unwrap();

  let constrained = mesh.natural_neighborhood(qx, qy).unwrap();
  assert_eq!(constrained.weights.len(), 3);
  assert!(constrained.weights.iter().all(|&(v, _)| v != d));
  assert!(unconstrained.weights.iter().any(|&(v, _)| v == d));
}

#[test]
fn scenario_6_quadratic_recovery_on_fifty_samples() {
  let z = |x: f64, y: f64| 0.5 + x * x + y * y;
  let mut mesh = Mesh::new(0.25).unwrap();
  let mut pts = Vec::new();
  let mut idx = 0u32;
  for i in 0..25 {
    let angle = i as f64 * 0.37;
    let radius = 0.05 + 0.9 * (i as f64 / 25.0);
    let x = radius * angle.cos();
    let y = radius * angle.sin();
    pts.push(Vertex::new(x, y, z(x, y), idx));
    idx += 1;
  }
  for i in 0..25 {
    let angle = 1.7 + i as f64 * 0.41;
    let radius = 0.1 + 0.85 * (i as f64 / 25.0);
    let x = radius * angle.cos();
    let y = radius * angle.sin();
    pts.push(Vertex::new(x, y, z(x, y), idx));
    idx += 1;
  }
  mesh.insert_all(pts).unwrap();

  let ols = mesh
    .interpolate_ols(ols_request(0.0, 0.0, SurfaceModel::Quadratic))
    .unwrap();
  assert!((ols.estimate - 0.5).abs() < 0.1);
  assert!(ols.r_squared > 0.9);
}
