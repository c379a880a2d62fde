//! Sibson C0 natural-neighbor interpolation (SPEC_FULL.md §4.G).

use crate::geometry::{circumcenter, in_circle, orient2d, Orientation, Vertex, VertexId};
use crate::mesh::pool::EdgeIndex;
use crate::mesh::topology::{PointLocation, Topology};
use crate::mesh::Mesh;

/// The ordered boundary of the cavity a query point would carve via
/// Bowyer-Watson, and the per-neighbor Sibson weights derived from it.
#[derive(Debug, Clone)]
pub struct NaturalNeighborhood {
  /// Natural neighbors and their normalized Sibson weights, summing to 1.
  pub weights: Vec<(VertexId, f64)>,
  /// `|sum(w_i * p_i) - query|`; should be at or near machine epsilon.
  pub barycentric_deviation: f64,
}

/// Result of [`Mesh::interpolate_natural_neighbor`].
#[derive(Debug, Clone, Copy)]
pub struct NaturalNeighborResult {
  pub value: f64,
  pub barycentric_deviation: f64,
}

impl Mesh {
  /// Computes the Bowyer-Watson cavity for a (virtual) insertion at
  /// `(x, y)` without mutating the mesh, and converts its circumcenters
  /// into normalized Sibson weights. Returns `None` if the query is
  /// outside the hull or lies exactly on a constrained edge.
  pub fn natural_neighborhood(&mut self, x: f64, y: f64) -> Option<NaturalNeighborhood> {
    if !self.bootstrapped {
      return None;
    }
    let loc = self.locate(x, y)?;
    let seed = match loc {
      PointLocation::Outside(_) => return None,
      PointLocation::OnVertex(id) => {
        return Some(NaturalNeighborhood {
          weights: vec![(id, 1.0)],
          barycentric_deviation: 0.0,
        });
      }
      PointLocation::OnEdge(e) => {
        if self.pool.flags(e).is_constrained() {
          return None;
        }
        e
      }
      PointLocation::InTriangle(e) => e,
    };

    let query = Vertex::new(x, y, 0.0, u32::MAX);
    let cavity = self.bowyer_watson_cavity(seed, &query)?;
    Some(self.sibson_weights(&cavity, &query))
  }

  /// Returns the ordered (CCW) boundary edges of the cavity: every
  /// triangle whose circumcircle contains `query`, expanded from `seed`,
  /// bounded by constrained edges.
  fn bowyer_watson_cavity(&self, seed: EdgeIndex, query: &Vertex) -> Option<Vec<EdgeIndex>> {
    let topo = self.topology();
    let mut interior_triangles = std::collections::HashSet::new();
    let mut frontier = vec![seed];
    interior_triangles.insert(canonical_triangle(&topo, seed));

    while let Some(e) = frontier.pop() {
      let face = [e, topo.next(e), topo.prev(e)];
      for fe in face {
        if topo.is_hull_edge(fe) || self.pool.flags(fe).is_constrained() {
          continue;
        }
        let neighbor_edge = fe.twin();
        let key = canonical_triangle(&topo, neighbor_edge);
        if interior_triangles.contains(&key) {
          continue;
        }
        let (a, b) = (topo.origin(neighbor_edge)?, topo.destination(neighbor_edge)?);
        let apex = topo.apex(neighbor_edge)?;
        let (av, bv, apexv) = (self.vertices.get(a), self.vertices.get(b), self.vertices.get(apex));
        if in_circle(av, bv, apexv, query, &self.thresholds) == Orientation::CounterClockWise {
          interior_triangles.insert(key);
          frontier.push(neighbor_edge);
        }
      }
    }

    // Boundary edges: exactly one side of each interior triangle's edges
    // whose twin triangle is not itself interior.
    let mut boundary = Vec::new();
    for &(e0, _, _) in &interior_triangles {
      let e0 = EdgeIndex(e0);
      let face = [e0, topo.next(e0), topo.prev(e0)];
      for fe in face {
        let twin_key = canonical_triangle(&topo, fe.twin());
        if !interior_triangles.contains(&twin_key) {
          boundary.push(fe);
        }
      }
    }
    if boundary.is_empty() {
      return None;
    }
    Some(order_ccw_cycle(&topo, boundary))
  }

  /// Converts a cavity boundary into normalized Sibson weights using the
  /// circumcenters of the (virtual) triangles formed by `query` and each
  /// boundary edge.
  fn sibson_weights(&self, cavity: &[EdgeIndex], query: &Vertex) -> NaturalNeighborhood {
    let topo = self.topology();
    let n = cavity.len();
    let mut centers = Vec::with_capacity(n);
    for &e in cavity {
      let a = self.vertices.get(topo.origin(e).expect("cavity edge origin"));
      let b = self.vertices.get(topo.destination(e).expect("cavity edge destination"));
      centers.push(circumcenter(query, a, b));
    }

    let mut weights: Vec<(VertexId, f64)> = Vec::with_capacity(n);
    for i in 0..n {
      let prev_c = centers[(i + n - 1) % n];
      let next_c = centers[(i + 1) % n];
      let origin = topo.origin(cavity[i]).expect("cavity edge origin");
      let v = self.vertices.get(origin);
      // Voronoi-cell area "stolen" from v's cell: the polygon
      // (v, prev_circumcenter, query_center_approx, next_circumcenter)
      // approximated as the quadrilateral area via the shoelace formula
      // over the two circumcenters and v itself.
      let area = triangle_area(prev_c, next_c, (v.x, v.y)).abs();
      weights.push((origin, area));
    }

    let total: f64 = weights.iter().map(|(_, w)| *w).sum();
    if total > 0.0 {
      for w in weights.iter_mut() {
        w.1 /= total;
      }
    }

    let mut bx = 0.0;
    let mut by = 0.0;
    for &(id, w) in &weights {
      let v = self.vertices.get(id);
      bx += w * v.x;
      by += w * v.y;
    }
    let barycentric_deviation = ((bx - query.x).powi(2) + (by - query.y).powi(2)).sqrt();

    NaturalNeighborhood {
      weights,
      barycentric_deviation,
    }
  }

  /// Natural-neighbor (Sibson C0) interpolation of `valuator(vertex)` at
  /// `(x, y)`. The default valuator is the vertex's own `z`.
  pub fn interpolate_natural_neighbor(&mut self, x: f64, y: f64) -> Option<NaturalNeighborResult> {
    self.interpolate_natural_neighbor_with(x, y, |v| v.z)
  }

  pub fn interpolate_natural_neighbor_with(
    &mut self,
    x: f64,
    y: f64,
    valuator: impl Fn(&Vertex) -> f64,
  ) -> Option<NaturalNeighborResult> {
    let nn = self.natural_neighborhood(x, y)?;
    let value = nn
      .weights
      .iter()
      .map(|&(id, w)| w * valuator(self.vertices.get(id)))
      .sum();
    Some(NaturalNeighborResult {
      value,
      barycentric_deviation: nn.barycentric_deviation,
    })
  }
}

fn triangle_area(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
  0.5 * ((b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0))
}

/// A canonical key for the triangle incident to `e`, invariant to which of
/// the triangle's three edges `e` refers to.
fn canonical_triangle(topo: &Topology<'_>, e: EdgeIndex) -> (u32, u32, u32) {
  let a = topo.next(e).raw();
  let b = topo.prev(e).raw();
  let c = e.raw();
  let mut v = [a, b, c];
  v.sort_unstable();
  (v[0], v[1], v[2])
}

/// Orders a bag of cavity-boundary half-edges into a single CCW cycle by
/// chaining each edge's destination to the next edge's origin.
fn order_ccw_cycle(topo: &Topology<'_>, edges: Vec<EdgeIndex>) -> Vec<EdgeIndex> {
  if edges.is_empty() {
    return edges;
  }
  let mut remaining = edges;
  let mut ordered = vec![remaining.remove(0)];
  while !remaining.is_empty() {
    let last_dest = topo.destination(*ordered.last().unwrap());
    if let Some(pos) = remaining.iter().position(|&e| topo.origin(e) == last_dest) {
      ordered.push(remaining.remove(pos));
    } else {
      break;
    }
  }
  ordered.extend(remaining);
  ordered
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Vertex;

  #[test]
  fn unit_square_nn_interpolation_is_exact_for_flat_surface() {
    let mut mesh = Mesh::new(1.0).unwrap();
    mesh.insert(Vertex::new(0.0, 0.0, 0.0, 0)).unwrap();
    mesh.insert(Vertex::new(1.0, 0.0, 0.0, 1)).unwrap();
    mesh.insert(Vertex::new(1.0, 1.0, 0.0, 2)).unwrap();
    mesh.insert(Vertex::new(0.0, 1.0, 0.0, 3)).unwrap();
    let result = mesh.interpolate_natural_neighbor(0.5, 0.5);
    assert!(result.is_some());
    assert!((result.unwrap().value - 0.0).abs() < 1e-9);
  }

  #[test]
  fn query_outside_hull_is_undefined() {
    let mut mesh = Mesh::new(1.0).unwrap();
    mesh.insert(Vertex::new(0.0, 0.0, 0.0, 0)).unwrap();
    mesh.insert(Vertex::new(1.0, 0.0, 0.0, 1)).unwrap();
    mesh.insert(Vertex::new(0.0, 1.0, 0.0, 2)).unwrap();
    assert!(mesh.interpolate_natural_neighbor(100.0, 100.0).is_none());
  }

  #[test]
  fn vertex_coincidence_returns_exact_value() {
    let mut mesh = Mesh::new(1.0).unwrap();
    mesh.insert(Vertex::new(0.0, 0.0, 0.0, 0)).unwrap();
    mesh.insert(Vertex::new(1.0, 0.0, 7.5, 1)).unwrap();
    mesh.insert(Vertex::new(0.0, 1.0, 0.0, 2)).unwrap();
    let result = mesh.interpolate_natural_neighbor(1.0, 0.0).unwrap();
    assert!((result.value - 7.5).abs() < 1e-9);
  }
}
