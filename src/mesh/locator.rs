//! Stochastic Lawson walk (SPEC_FULL.md §4.D).

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::geometry::{orient2d, Orientation, Thresholds, Vertex, VertexStore};
use crate::mesh::pool::EdgePool;
use crate::mesh::topology::{PointLocation, Topology};

/// Starting from `hint`, walks toward `(x, y)` by crossing whichever edge
/// of the current triangle the query lies strictly to the right of. Edge
/// test order is shuffled per step (the "stochastic" part) so degenerate
/// configurations don't cycle.
pub fn locate(
  pool: &EdgePool,
  vertices: &VertexStore,
  thresholds: &Thresholds,
  rng: &mut SmallRng,
  hint: crate::mesh::pool::EdgeIndex,
  x: f64,
  y: f64,
) -> PointLocation {
  let topo = Topology::new(pool);
  let query = Vertex::new(x, y, 0.0, u32::MAX);
  let mut current = hint;
  let max_steps = pool.base_edges().count().max(8) * 4 + 16;

  for _ in 0..max_steps {
    let edges = [current, topo.next(current), topo.prev(current)];

    // Outside-the-hull case: current edge is a hull edge and the query is
    // on its outward side.
    if topo.is_hull_edge(current) {
      if let (Some(a), Some(b)) = (topo.origin(current), topo.destination(current)) {
        let av = vertices.get(a);
        let bv = vertices.get(b);
        if orient2d(av, bv, &query, thresholds) == Orientation::ClockWise {
          return PointLocation::Outside(current);
        }
      }
    }

    let mut order = [0usize, 1, 2];
    order.shuffle(rng);
    let mut crossed = None;
    for &idx in order.iter() {
      let e = edges[idx];
      if topo.is_hull_edge(e) {
        continue;
      }
      let (a, b) = match (topo.origin(e), topo.destination(e)) {
        (Some(a), Some(b)) => (a, b),
        _ => continue,
      };
      let av = vertices.get(a);
      let bv = vertices.get(b);
      match orient2d(av, bv, &query, thresholds) {
        Orientation::ClockWise => {
          crossed = Some(e.twin());
          break;
        }
        Orientation::CoLinear => {
          // Exactly on the line through a, b; check segment membership.
          let min_x = av.x.min(bv.x);
          let max_x = av.x.max(bv.x);
          let min_y = av.y.min(bv.y);
          let max_y = av.y.max(bv.y);
          if x >= min_x - thresholds.vertex_tolerance
            && x <= max_x + thresholds.vertex_tolerance
            && y >= min_y - thresholds.vertex_tolerance
            && y <= max_y + thresholds.vertex_tolerance
          {
            if av.squared_distance(&query) <= thresholds.vertex_tolerance_sq {
              return PointLocation::OnVertex(a);
            }
            if bv.squared_distance(&query) <= thresholds.vertex_tolerance_sq {
              return PointLocation::OnVertex(b);
            }
            return PointLocation::OnEdge(e);
          }
        }
        Orientation::CounterClockWise => {}
      }
    }

    match crossed {
      Some(next) => current = next,
      None => return PointLocation::InTriangle(current),
    }
  }
  PointLocation::InTriangle(current)
}
