//! The triangulated mesh: bootstrap, incremental insertion, constraint
//! embedding, and the navigation primitives interpolators build on.

pub mod builder;
pub mod constraints;
pub mod locator;
pub mod pool;
pub mod topology;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::TinConfig;
use crate::error::{Error, Result};
use crate::geometry::{Thresholds, Vertex, VertexId, VertexStore};

pub use builder::InsertOutcome;
pub use constraints::{Constraint, ConstraintId, ConstraintKind};
pub use pool::EdgeIndex;
pub use topology::PointLocation;

use pool::EdgePool;

/// A constrained Delaunay TIN over 2D points with scalar attributes.
pub struct Mesh {
  pub(crate) vertices: VertexStore,
  pub(crate) pool: EdgePool,
  pub(crate) thresholds: Thresholds,
  pub(crate) constraints: Vec<Constraint>,
  pub(crate) config: TinConfig,
  pub(crate) pending: Vec<VertexId>,
  pub(crate) bootstrapped: bool,
  pub(crate) hint: Option<EdgeIndex>,
  pub(crate) rng: SmallRng,
}

impl Mesh {
  /// An empty mesh configured with the given nominal point spacing.
  pub fn new(nominal_point_spacing: f64) -> Result<Mesh> {
    if nominal_point_spacing <= 0.0 {
      return Err(Error::InvalidSpacing);
    }
    Ok(Mesh::with_config(TinConfig::new(nominal_point_spacing)))
  }

  pub fn with_config(config: TinConfig) -> Mesh {
    Mesh {
      vertices: VertexStore::new(),
      pool: EdgePool::new(),
      thresholds: Thresholds::from_spacing(config.nominal_point_spacing),
      constraints: Vec::new(),
      config,
      pending: Vec::new(),
      bootstrapped: false,
      hint: None,
      rng: SmallRng::seed_from_u64(0x5151_c0de),
    }
  }

  pub fn is_bootstrapped(&self) -> bool {
    self.bootstrapped
  }

  pub fn vertex(&self, id: VertexId) -> &Vertex {
    self.vertices.get(id)
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn config(&self) -> &TinConfig {
    &self.config
  }

  pub fn thresholds(&self) -> &Thresholds {
    &self.thresholds
  }

  /// Iterator over every live base half-edge, including ghost-facing ones.
  /// Callers filtering to real edges should check
  /// `!topology(..).is_hull_edge(e)` or inspect endpoints.
  pub fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
    self.pool.base_edges()
  }

  /// Bounding box of the inserted (non-synthetic) vertices, or `None` if
  /// the mesh has no vertices yet.
  pub fn bounding_box(&self) -> Option<((f64, f64), (f64, f64))> {
    let mut iter = self.vertices.iter().filter(|(_, v)| !v.z.is_nan());
    let (_, first) = iter.next()?;
    let mut min = (first.x, first.y);
    let mut max = (first.x, first.y);
    for (_, v) in iter {
      min.0 = min.0.min(v.x);
      min.1 = min.1.min(v.y);
      max.0 = max.0.max(v.x);
      max.1 = max.1.max(v.y);
    }
    Some((min, max))
  }

  /// Locates the triangle (or hull edge) containing `(x, y)`, starting the
  /// walk from the mesh's current hint edge. Returns `None` if the mesh is
  /// not yet bootstrapped.
  pub fn locate(&mut self, x: f64, y: f64) -> Option<PointLocation> {
    let hint = self.hint?;
    Some(locator::locate(
      &self.pool,
      &self.vertices,
      &self.thresholds,
      &mut self.rng,
      hint,
      x,
      y,
    ))
  }

  pub(crate) fn topology(&self) -> topology::Topology<'_> {
    topology::Topology::new(&self.pool)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn v(x: f64, y: f64, z: f64, i: u32) -> Vertex {
    Vertex::new(x, y, z, i)
  }

  #[test]
  fn bootstrap_from_three_vertices() {
    let mut mesh = Mesh::new(1.0).unwrap();
    assert!(!mesh.is_bootstrapped());
    mesh.insert(v(0.0, 0.0, 0.0, 0)).unwrap();
    mesh.insert(v(1.0, 0.0, 0.0, 1)).unwrap();
    assert!(!mesh.is_bootstrapped());
    mesh.insert(v(0.0, 1.0, 0.0, 2)).unwrap();
    assert!(mesh.is_bootstrapped());
  }

  #[test]
  fn unit_square_has_four_vertices_after_insertion() {
    let mut mesh = Mesh::new(1.0).unwrap();
    for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
      mesh.insert(v(x, y, 0.0, mesh.vertex_count() as u32)).unwrap();
    }
    assert_eq!(mesh.vertex_count(), 4);
  }

  #[test]
  fn locate_after_bootstrap_finds_interior_point() {
    let mut mesh = Mesh::new(1.0).unwrap();
    mesh.insert(v(0.0, 0.0, 0.0, 0)).unwrap();
    mesh.insert(v(10.0, 0.0, 0.0, 1)).unwrap();
    mesh.insert(v(0.0, 10.0, 0.0, 2)).unwrap();
    let loc = mesh.locate(1.0, 1.0);
    assert!(matches!(loc, Some(PointLocation::InTriangle(_))));
  }

  #[test]
  fn invalid_spacing_is_rejected() {
    assert_eq!(Mesh::new(0.0).unwrap_err(), Error::InvalidSpacing);
    assert_eq!(Mesh::new(-1.0).unwrap_err(), Error::InvalidSpacing);
  }
}
