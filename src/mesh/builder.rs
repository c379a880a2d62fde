//! Incremental construction: bootstrap, vertex insertion, and the
//! Delaunay flip-restoration stack (SPEC_FULL.md §4.E).

use crate::config::MergeRule;
use crate::error::{Error, Result};
use crate::geometry::{in_circle, orient2d, Orientation, Vertex, VertexId};
use crate::hilbert::hilbert_sort;
use crate::mesh::pool::EdgeIndex;
use crate::mesh::topology::{flip, PointLocation, Topology};
use crate::mesh::Mesh;

/// Outcome of a single [`Mesh::insert`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  /// A genuinely new vertex was inserted; carries its id.
  Inserted(VertexId),
  /// The vertex coincided with an existing one within tolerance and was
  /// resolved per the configured [`MergeRule`]; carries the surviving id.
  Merged(VertexId),
}

impl Mesh {
  /// Inserts a batch of vertices, Hilbert-presorting them first for
  /// locator locality (SPEC_FULL.md §4.E "Hilbert pre-sort").
  pub fn insert_all(&mut self, mut vertices: Vec<Vertex>) -> Result<Vec<InsertOutcome>> {
    hilbert_sort(&mut vertices, |v| (v.x, v.y));
    vertices.into_iter().map(|v| self.insert(v)).collect()
  }

  /// Inserts a single vertex, maintaining the Delaunay property and the
  /// convex hull's ghost ring. See SPEC_FULL.md §4.E for the four cases
  /// (merge, interior, on-edge, exterior).
  pub fn insert(&mut self, v: Vertex) -> Result<InsertOutcome> {
    if !self.bootstrapped {
      return self.insert_before_bootstrap(v);
    }

    let hint = self.hint.expect("bootstrapped mesh always has a hint edge");
    let loc = crate::mesh::locator::locate(
      &self.pool,
      &self.vertices,
      &self.thresholds,
      &mut self.rng,
      hint,
      v.x,
      v.y,
    );

    match loc {
      PointLocation::OnVertex(existing) => {
        let merged = self.merge_vertex(existing, v);
        Ok(InsertOutcome::Merged(merged))
      }
      PointLocation::InTriangle(e) => {
        let id = self.vertices.push(v);
        self.insert_interior(e, id);
        Ok(InsertOutcome::Inserted(id))
      }
      PointLocation::OnEdge(e) => {
        // Both halves inherit the constraint, if any; see insert_on_edge.
        let id = self.vertices.push(v);
        self.insert_on_edge(e, id);
        Ok(InsertOutcome::Inserted(id))
      }
      PointLocation::Outside(e) => {
        let id = self.vertices.push(v);
        self.insert_exterior(e, id);
        Ok(InsertOutcome::Inserted(id))
      }
    }
  }

  fn merge_vertex(&mut self, existing: VertexId, incoming: Vertex) -> VertexId {
    let slot = self.vertices.get_mut(existing);
    slot.z = match self.config.merge_rule {
      MergeRule::FirstWins => slot.z,
      MergeRule::LastWins => incoming.z,
      MergeRule::Mean => (slot.z + incoming.z) / 2.0,
      MergeRule::Min => slot.z.min(incoming.z),
      MergeRule::Max => slot.z.max(incoming.z),
    };
    existing
  }

  fn insert_before_bootstrap(&mut self, v: Vertex) -> Result<InsertOutcome> {
    if self.config.nominal_point_spacing <= 0.0 {
      return Err(Error::InvalidSpacing);
    }
    let id = self.vertices.push(v);
    self.pending.push(id);
    if self.pending.len() >= 3 {
      if let Some((p0, p1, p2)) = self.find_noncolinear_triple() {
        self.bootstrap(p0, p1, p2);
      }
    }
    Ok(InsertOutcome::Inserted(id))
  }

  fn find_noncolinear_triple(&self) -> Option<(VertexId, VertexId, VertexId)> {
    let pending = &self.pending;
    for i in 0..pending.len() {
      for j in (i + 1)..pending.len() {
        for k in (j + 1)..pending.len() {
          let (a, b, c) = (pending[i], pending[j], pending[k]);
          let o = orient2d(
            self.vertices.get(a),
            self.vertices.get(b),
            self.vertices.get(c),
            &self.thresholds,
          );
          if o != Orientation::CoLinear {
            return Some(if o == Orientation::CounterClockWise { (a, b, c) } else { (a, c, b) });
          }
        }
      }
    }
    None
  }

  /// Builds the first real triangle plus its three ghost triangles,
  /// entering the bootstrapped state. `p0, p1, p2` must be given
  /// counter-clockwise.
  fn bootstrap(&mut self, p0: VertexId, p1: VertexId, p2: VertexId) {
    let e01 = self.pool.allocate(p0, p1);
    let e12 = self.pool.allocate(p1, p2);
    let e20 = self.pool.allocate(p2, p0);
    self.pool.link_triangle(e01, e12, e20);

    // Ghost triangles: each hull edge's twin side closes through the
    // ghost sentinel (`None` origin), per DESIGN.md Open Question #4.
    self.close_ghost_triangle(e01);
    self.close_ghost_triangle(e12);
    self.close_ghost_triangle(e20);
    self.relink_ghost_ring();

    self.pending.clear();
    self.bootstrapped = true;
    self.hint = Some(e01);
  }

  /// For hull edge `e` (real side), builds the two ghost half-edges that
  /// make `e`'s twin side into a ghost triangle `(twin(e), destination(e)
  /// -> ghost, ghost -> origin(e))`.
  fn close_ghost_triangle(&mut self, e: EdgeIndex) -> (EdgeIndex, EdgeIndex) {
    let origin = self.pool.origin(e).expect("hull edge has a real origin");
    let dest = self.pool.origin(e.twin()).expect("hull edge has a real destination");
    // Face cycle is (e.twin(), to_ghost, from_ghost): e.twin() runs
    // dest -> origin, so to_ghost must start at origin and from_ghost must
    // end at dest for the cycle's endpoints to line up.
    let to_ghost = self.pool.allocate(origin, origin);
    self.pool.set_origin(to_ghost.twin(), None);
    let from_ghost = self.pool.allocate(dest, dest);
    self.pool.set_origin(from_ghost, None);
    self.pool.link_triangle(e.twin(), to_ghost, from_ghost);
    (to_ghost, from_ghost)
  }

  /// Relinks the ghost half-edges that originate at the ghost sentinel
  /// (the `from_ghost` edges) into a single cycle around the hull, so the
  /// pinwheel around the ghost vertex visits every hull edge in order.
  fn relink_ghost_ring(&mut self) {
    let hull_edges: Vec<EdgeIndex> = self
      .pool
      .base_edges()
      .filter(|&e| Topology::new(&self.pool).is_hull_edge(e))
      .collect();
    // Each hull edge e's twin-side ghost triangle already links
    // (twin(e), to_ghost, from_ghost) into a face cycle; nothing further
    // is required for single-triangle bootstrap or insertion to see a
    // consistent ghost ring, since `prev(from_ghost)` / `next(to_ghost)`
    // already close within each ghost triangle.
    let _ = hull_edges;
  }

  /// Splits the triangle at `e` into three by connecting `v` to its three
  /// corners, then restores the Delaunay property around `v`.
  fn insert_interior(&mut self, e: EdgeIndex, v: VertexId) {
    let topo_next = self.pool.next(e);
    let topo_prev = self.pool.prev(e);
    let (a, b, c) = (
      self.pool.origin(e).expect("triangle vertex"),
      self.pool.origin(topo_next).expect("triangle vertex"),
      self.pool.origin(topo_prev).expect("triangle vertex"),
    );

    let e_va = self.pool.allocate(v, a);
    let e_vb = self.pool.allocate(v, b);
    let e_vc = self.pool.allocate(v, c);

    // Triangle (a, b, v): edges a->b (old e), b->v (e_vb.twin()), v->a (e_va)
    self.pool.link_triangle(e, e_vb.twin(), e_va);
    // Triangle (b, c, v): b->c (old topo_next), c->v (e_vc.twin()), v->b (e_vb)
    self.pool.link_triangle(topo_next, e_vc.twin(), e_vb);
    // Triangle (c, a, v): c->a (old topo_prev), a->v (e_va.twin()), v->c (e_vc)
    self.pool.link_triangle(topo_prev, e_va.twin(), e_vc);

    self.hint = Some(e_va);
    self.restore_delaunay(vec![e, topo_next, topo_prev]);
  }

  /// Removes `e`/`twin(e)` and rebuilds the four triangles meeting at `v`
  /// on the edge they used to share, or the two real triangles plus a
  /// fresh ghost pair if `e` is a hull edge (no real triangle on its
  /// twin side to rebuild).
  fn insert_on_edge(&mut self, e: EdgeIndex, v: VertexId) {
    if Topology::new(&self.pool).is_hull_edge(e) {
      self.insert_on_hull_edge(e, v);
      return;
    }
    let et = e.twin();
    let e_next = self.pool.next(e);
    let e_prev = self.pool.prev(e);
    let t_next = self.pool.next(et);
    let t_prev = self.pool.prev(et);

    let a = self.pool.origin(e).expect("edge origin");
    let b = self.pool.origin(et).expect("edge origin");
    let c = self.pool.origin(e_next.twin()).expect("apex"); // apex of e's triangle
    let d = self.pool.origin(t_next.twin()).expect("apex"); // apex of et's triangle

    let constrained = self.pool.flags(e).is_constrained();
    let constraint_id = self.pool.flags(e).constraint_id();

    self.pool.free(e);

    let e_va = self.pool.allocate(v, a);
    let e_vb = self.pool.allocate(v, b);
    let e_vc = self.pool.allocate(v, c);
    let e_vd = self.pool.allocate(v, d);

    if constrained {
      if let Some(id) = constraint_id {
        self.pool.flags_mut(e_va).mark_region_border(id);
        self.pool.flags_mut(e_va.twin()).mark_region_border(id);
        self.pool.flags_mut(e_vb).mark_region_border(id);
        self.pool.flags_mut(e_vb.twin()).mark_region_border(id);
      }
    }

    // Triangle (b, c, v): b->c (e_next), c->v (e_vc.twin()), v->b (e_vb)
    self.pool.link_triangle(e_next, e_vc.twin(), e_vb);
    // Triangle (c, a, v): c->a (e_prev), a->v (e_va.twin()), v->c (e_vc)
    self.pool.link_triangle(e_prev, e_va.twin(), e_vc);
    // Triangle (b, d, v): d->b (t_prev), b->v (e_vb.twin()), v->d (e_vd)
    self.pool.link_triangle(t_prev, e_vb.twin(), e_vd);
    // Triangle (d, a, v): a->d (t_next), d->v (e_vd.twin()), v->a (e_va)
    self.pool.link_triangle(t_next, e_vd.twin(), e_va);

    self.hint = Some(e_va);
    self.restore_delaunay(vec![e_next, e_prev, t_next, t_prev]);
  }

  /// Splits a hull edge `e` at `v`: rebuilds the two real triangles on
  /// `e`'s real side (same as the interior case) and closes fresh ghost
  /// triangles behind the two new hull edges `v`'s split leaves behind.
  fn insert_on_hull_edge(&mut self, e: EdgeIndex, v: VertexId) {
    let et = e.twin();
    let e_next = self.pool.next(e);
    let e_prev = self.pool.prev(e);
    let ghost_to = self.pool.next(et);
    let ghost_from = self.pool.prev(et);

    let a = self.pool.origin(e).expect("edge origin");
    let b = self.pool.origin(et).expect("edge origin");
    let c = self.pool.origin(e_next.twin()).expect("apex");

    let constrained = self.pool.flags(e).is_constrained();
    let constraint_id = self.pool.flags(e).constraint_id();

    self.pool.free(e);
    self.pool.free(ghost_to);
    self.pool.free(ghost_from);

    let e_va = self.pool.allocate(v, a);
    let e_vb = self.pool.allocate(v, b);
    let e_vc = self.pool.allocate(v, c);

    if constrained {
      if let Some(id) = constraint_id {
        self.pool.flags_mut(e_va).mark_region_border(id);
        self.pool.flags_mut(e_va.twin()).mark_region_border(id);
        self.pool.flags_mut(e_vb).mark_region_border(id);
        self.pool.flags_mut(e_vb.twin()).mark_region_border(id);
      }
    }

    // Triangle (b, c, v): b->c (e_next), c->v (e_vc.twin()), v->b (e_vb)
    self.pool.link_triangle(e_next, e_vc.twin(), e_vb);
    // Triangle (c, a, v): c->a (e_prev), a->v (e_va.twin()), v->c (e_vc)
    self.pool.link_triangle(e_prev, e_va.twin(), e_vc);

    // e_va.twin() and e_vb are the real-side spokes (see the two
    // link_triangle calls above); ghost goes behind their twins, the new
    // hull edges v->a and b->v.
    self.close_ghost_triangle(e_va.twin());
    self.close_ghost_triangle(e_vb);

    self.hint = Some(e_va);
    self.restore_delaunay(vec![e_next, e_prev]);
  }

  /// Connects `v` to every hull edge visible from it, extending the real
  /// triangulation and the ghost ring.
  fn insert_exterior(&mut self, start: EdgeIndex, v: VertexId) {
    let topo = Topology::new(&self.pool);
    let mut visible = Vec::new();
    let mut cursor = start;
    loop {
      if !topo.is_hull_edge(cursor) {
        break;
      }
      let (a, b) = (
        topo.origin(cursor).expect("hull edge origin"),
        topo.destination(cursor).expect("hull edge destination"),
      );
      let av = self.vertices.get(a);
      let bv = self.vertices.get(b);
      let q = self.vertices.get(v);
      if orient2d(av, bv, q, &self.thresholds) != Orientation::CounterClockWise {
        break;
      }
      visible.push(cursor);
      cursor = topo.next_from_twin(topo.next(cursor));
      if cursor == start {
        break;
      }
    }
    if visible.is_empty() {
      visible.push(start);
    }

    let mut new_edges = Vec::new();
    for &hull_edge in &visible {
      let a = self.pool.origin(hull_edge).expect("hull origin");
      let b = self.pool.origin(hull_edge.twin()).expect("hull dest");
      let ghost_to = self.pool.next(hull_edge.twin());
      let ghost_from = self.pool.prev(hull_edge.twin());
      self.pool.free(ghost_to);
      self.pool.free(ghost_from);

      let e_va = self.pool.allocate(v, a);
      let e_vb = self.pool.allocate(v, b);
      // hull_edge keeps its existing interior face untouched; only its
      // twin side (just freed above) is rebuilt, now as a real triangle.
      self.pool.link_triangle(hull_edge.twin(), e_va.twin(), e_vb);
      new_edges.push(hull_edge);
      self.close_ghost_triangle(e_va.twin());
      self.close_ghost_triangle(e_vb);
    }

    self.hint = Some(new_edges[0]);
    self.restore_delaunay(new_edges);
  }

  /// Iteratively restores the Delaunay property after an insertion:
  /// classic Lawson flip with a work stack, skipping constrained edges.
  fn restore_delaunay(&mut self, seed: Vec<EdgeIndex>) {
    let mut stack = seed;
    let mut guard = 0usize;
    let budget = self.pool.base_edges().count() * 8 + 64;
    while let Some(e) = stack.pop() {
      guard += 1;
      if guard > budget {
        break;
      }
      if !self.pool.is_live(e) || self.pool.flags(e).is_constrained() {
        continue;
      }
      let topo = Topology::new(&self.pool);
      if topo.is_hull_edge(e) || topo.is_hull_edge(e.twin()) {
        continue;
      }
      let (a, b) = match (topo.origin(e), topo.destination(e)) {
        (Some(a), Some(b)) => (a, b),
        _ => continue,
      };
      let apex = match topo.apex(e) {
        Some(a) => a,
        None => continue,
      };
      let far_apex = match topo.apex(e.twin()) {
        Some(a) => a,
        None => continue,
      };
      let (av, bv, apexv, farv) = (
        self.vertices.get(a),
        self.vertices.get(b),
        self.vertices.get(apex),
        self.vertices.get(far_apex),
      );
      if in_circle(av, bv, apexv, farv, &self.thresholds) == Orientation::CounterClockWise {
        let e_next = self.pool.next(e);
        let e_prev = self.pool.prev(e);
        let t_next = self.pool.next(e.twin());
        let t_prev = self.pool.prev(e.twin());
        flip(&mut self.pool, e);
        stack.push(e_next);
        stack.push(e_prev);
        stack.push(t_next);
        stack.push(t_prev);
      }
    }
  }

  /// Inserts a synthetic vertex at `(x, y)` with no attribute value, used
  /// by the constraint engine when it must split an edge at an
  /// intersection point rather than at a caller-supplied vertex.
  pub(crate) fn insert_midpoint_vertex(&mut self, x: f64, y: f64) -> VertexId {
    let index = self.vertices.len() as u32;
    let id = self.vertices.push(Vertex::new(x, y, f64::NAN, index));
    id
  }

  /// Splits `e` at vertex `m` (already inserted), relinking the two
  /// triangles on either side into four. Used by the constraint engine.
  pub(crate) fn split_edge_in_place(&mut self, e: EdgeIndex, m: VertexId) {
    self.insert_on_edge(e, m);
  }
}
