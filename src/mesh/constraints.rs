//! Constraint embedding and region labeling (SPEC_FULL.md §4.F).

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::geometry::VertexId;
use crate::mesh::pool::EdgeIndex;
use crate::mesh::topology::Topology;
use crate::mesh::Mesh;

/// Identifies a constraint once it has been added to a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ConstraintId(pub(crate) u32);

/// A polygon (closed) or linear (open) constraint submitted by the caller.
#[derive(Debug, Clone)]
pub struct Constraint {
  pub kind: ConstraintKind,
  pub vertices: Vec<VertexId>,
  /// Whether this constraint's interior should be labeled as a region
  /// (only meaningful for `ConstraintKind::Polygon`).
  pub defines_region: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
  /// Closed, simple, counter-clockwise boundary; interior is on the left
  /// of each directed edge `vertices[i] -> vertices[i + 1]`.
  Polygon,
  /// Open chain; no interior to label.
  Linear,
}

impl Constraint {
  /// Ordered `(from, to)` pairs along the constraint, closing the loop for
  /// `Polygon` constraints.
  fn edges(&self) -> Vec<(VertexId, VertexId)> {
    let n = self.vertices.len();
    match self.kind {
      ConstraintKind::Polygon => (0..n)
        .map(|i| (self.vertices[i], self.vertices[(i + 1) % n]))
        .collect(),
      ConstraintKind::Linear => (0..n.saturating_sub(1))
        .map(|i| (self.vertices[i], self.vertices[i + 1]))
        .collect(),
    }
  }
}

impl Mesh {
  /// Embeds a batch of constraints: for each, walks every `(u, v)` edge,
  /// splitting or flipping crossed edges until `u -> v` exists directly,
  /// marks it constrained, and (for region polygons) floods the interior
  /// to label every bounded triangle.
  pub fn add_constraints(&mut self, constraints: Vec<Constraint>) -> Result<()> {
    for constraint in constraints {
      let id = ConstraintId(self.constraints.len() as u32);
      let kind = constraint.kind;
      let defines_region = constraint.defines_region;
      let edges = constraint.edges();
      let mut linking_edge = None;
      for (u, v) in edges {
        let e = self.embed_constraint_edge(u, v)?;
        match kind {
          ConstraintKind::Polygon => {
            self.pool.register_border_constraint(e, id);
            self.pool.flags_mut(e).mark_region_border(id);
            self.pool.flags_mut(e.twin()).mark_region_border(id);
          }
          ConstraintKind::Linear => {
            self.pool.register_linear_constraint(e, id);
            self.pool.flags_mut(e).mark_line_member(id);
            self.pool.flags_mut(e.twin()).mark_line_member(id);
          }
        }
        linking_edge.get_or_insert(e);
      }
      if kind == ConstraintKind::Polygon && defines_region {
        if let Some(seed) = linking_edge {
          self.label_region_interior(seed, id);
        }
      }
      self.constraints.push(constraint);
    }
    Ok(())
  }

  /// Ensures an edge directly connecting `u` and `v` exists (inserting
  /// either vertex first if necessary), flipping or splitting whatever it
  /// currently crosses, and returns the half-edge running `u -> v`.
  ///
  /// Grounded on `delaunay.rs`'s `cut`/`cut_apply*`: repeatedly find the
  /// triangle edge the segment crosses nearest `u`; if flipping it would
  /// make the diagonal lie along `u -> v` without crossing anything else,
  /// flip; otherwise split at the intersection and recurse on both halves.
  fn embed_constraint_edge(&mut self, u: VertexId, v: VertexId) -> Result<EdgeIndex> {
    if let Some(e) = self.find_edge(u, v) {
      return Ok(e);
    }

    let uv = self.vertices.get(u);
    let (ux, uy) = (uv.x, uv.y);
    let vv = self.vertices.get(v);
    let (vx, vy) = (vv.x, vv.y);

    let mut guard = 0usize;
    loop {
      guard += 1;
      if guard > self.pool_edge_budget() {
        return Err(Error::ConstraintConflict);
      }
      if let Some(e) = self.find_edge(u, v) {
        return Ok(e);
      }
      let crossing = self.find_crossing_from(u, (ux, uy), (vx, vy));
      let crossing = match crossing {
        Some(c) => c,
        None => return Err(Error::ConstraintConflict),
      };
      if self.pool.flags(crossing).is_constrained() {
        // Two constraints cross with no legal resolution at this level.
        return Err(Error::ConstraintConflict);
      }
      if self.edge_is_flippable_toward(crossing, (ux, uy), (vx, vy)) {
        crate::mesh::topology::flip(&mut self.pool, crossing);
      } else {
        let m = self.intersection_point(crossing, (ux, uy), (vx, vy));
        self.split_edge_during_constraint(crossing, m);
      }
    }
  }

  fn pool_edge_budget(&self) -> usize {
    self.vertices.len() * self.vertices.len() + 64
  }

  /// Finds the half-edge leaving the pinwheel of `u` whose opposite side
  /// the segment `u -> v` crosses, by walking triangles from `u` toward
  /// `v`.
  fn find_crossing_from(&self, u: VertexId, u_xy: (f64, f64), v_xy: (f64, f64)) -> Option<EdgeIndex> {
    let topo = Topology::new(&self.pool);
    let start = self.any_edge_from(u)?;
    for e in topo.pinwheel(start) {
      let far = topo.next(e);
      if self.segment_crosses(far, u_xy, v_xy) {
        return Some(far);
      }
    }
    None
  }

  fn segment_crosses(&self, e: EdgeIndex, u_xy: (f64, f64), v_xy: (f64, f64)) -> bool {
    let topo = Topology::new(&self.pool);
    let (a, b) = match (topo.origin(e), topo.destination(e)) {
      (Some(a), Some(b)) => (a, b),
      _ => return false,
    };
    let a = self.vertices.get(a);
    let b = self.vertices.get(b);
    let side = |p: (f64, f64), q: (f64, f64), r: (f64, f64)| {
      (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    };
    let s1 = side(u_xy, v_xy, (a.x, a.y));
    let s2 = side(u_xy, v_xy, (b.x, b.y));
    let s3 = side((a.x, a.y), (b.x, b.y), u_xy);
    let s4 = side((a.x, a.y), (b.x, b.y), v_xy);
    (s1 > 0.0) != (s2 > 0.0) && (s3 > 0.0) != (s4 > 0.0)
  }

  fn edge_is_flippable_toward(&self, e: EdgeIndex, u_xy: (f64, f64), v_xy: (f64, f64)) -> bool {
    let topo = Topology::new(&self.pool);
    let (apex1, apex2) = match (topo.apex(e), topo.apex(e.twin())) {
      (Some(a), Some(b)) => (a, b),
      _ => return false,
    };
    let a1 = self.vertices.get(apex1);
    let a2 = self.vertices.get(apex2);
    let side = |p: (f64, f64), q: (f64, f64), r: (f64, f64)| {
      (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    };
    let s1 = side(u_xy, v_xy, (a1.x, a1.y));
    let s2 = side(u_xy, v_xy, (a2.x, a2.y));
    s1 > 0.0 && s2 < 0.0 || s1 < 0.0 && s2 > 0.0
  }

  fn intersection_point(&self, e: EdgeIndex, u_xy: (f64, f64), v_xy: (f64, f64)) -> (f64, f64) {
    let topo = Topology::new(&self.pool);
    let a = self.vertices.get(topo.origin(e).expect("edge has origin"));
    let b = self.vertices.get(topo.destination(e).expect("edge has destination"));
    let (ax, ay, bx, by) = (a.x, a.y, b.x, b.y);
    let (ux, uy) = u_xy;
    let (vx, vy) = v_xy;
    let d1x = bx - ax;
    let d1y = by - ay;
    let d2x = vx - ux;
    let d2y = vy - uy;
    let denom = d1x * d2y - d1y * d2x;
    if denom.abs() < f64::EPSILON {
      return ((ax + bx) / 2.0, (ay + by) / 2.0);
    }
    let t = ((ux - ax) * d2y - (uy - ay) * d2x) / denom;
    (ax + t * d1x, ay + t * d1y)
  }

  fn split_edge_during_constraint(&mut self, e: EdgeIndex, m_xy: (f64, f64)) {
    let m = self.insert_midpoint_vertex(m_xy.0, m_xy.1);
    self.split_edge_in_place(e, m);
  }

  /// Finds a half-edge whose origin is `u`, for seeding a pinwheel walk.
  fn any_edge_from(&self, u: VertexId) -> Option<EdgeIndex> {
    self.pool.base_edges().find(|&e| {
      self.pool.origin(e) == Some(u) || self.pool.origin(e.twin()) == Some(u)
    }).map(|e| if self.pool.origin(e) == Some(u) { e } else { e.twin() })
  }

  fn find_edge(&self, u: VertexId, v: VertexId) -> Option<EdgeIndex> {
    let start = self.any_edge_from(u)?;
    let topo = Topology::new(&self.pool);
    topo.pinwheel(start).find(|&e| topo.destination(e) == Some(v))
  }

  /// Floods interior triangles starting from `seed`'s interior side,
  /// labeling every visited edge with `id` and the region-interior flag,
  /// stopping at constrained (border) edges.
  fn label_region_interior(&mut self, seed: EdgeIndex, id: ConstraintId) {
    let mut queue = VecDeque::new();
    let mut visited = std::collections::HashSet::new();
    queue.push_back(seed);
    while let Some(e) = queue.pop_front() {
      if !visited.insert(e.raw()) {
        continue;
      }
      let topo = Topology::new(&self.pool);
      let face = [e, topo.next(e), topo.prev(e)];
      for fe in face {
        self.pool.flags_mut(fe).mark_region_interior(id);
        let twin = fe.twin();
        if !self.pool.flags(fe).is_constrained() && !visited.contains(&twin.raw()) {
          queue.push_back(twin);
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Vertex;
  use crate::mesh::builder::InsertOutcome;
  use crate::mesh::Mesh;

  fn id(outcome: InsertOutcome) -> VertexId {
    match outcome {
      InsertOutcome::Inserted(id) | InsertOutcome::Merged(id) => id,
    }
  }

  #[test]
  fn single_triangle_region_marks_all_three_sides_interior() {
    let mut mesh = Mesh::new(1.0).unwrap();
    let a = id(mesh.insert(Vertex::new(0.0, 0.0, 0.0, 0)).unwrap());
    let b = id(mesh.insert(Vertex::new(1.0, 0.0, 0.0, 1)).unwrap());
    let c = id(mesh.insert(Vertex::new(0.0, 1.0, 0.0, 2)).unwrap());

    mesh
      .add_constraints(vec![Constraint {
        kind: ConstraintKind::Polygon,
        vertices: vec![a, b, c],
        defines_region: true,
      }])
      .unwrap();

    for (u, v) in [(a, b), (b, c), (c, a)] {
      let e = mesh.find_edge(u, v).expect("constrained edge exists");
      assert!(mesh.pool.flags(e).is_region_interior(), "edge {u:?}->{v:?} not flagged interior");
    }
  }
}
