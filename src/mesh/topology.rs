//! Half-edge navigation, the counter-clockwise "pinwheel" traversal, and
//! edge flipping (SPEC_FULL.md §4.C).

use crate::geometry::VertexId;
use crate::mesh::pool::{EdgeIndex, EdgePool};

/// Where a query point lies relative to the triangulation, as returned by
/// the locator (SPEC_FULL.md §4.D) and consumed by the incremental builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
  /// Strictly inside the triangle to the left of the returned edge.
  InTriangle(EdgeIndex),
  /// Coincides (within tolerance) with the returned edge's origin.
  OnVertex(VertexId),
  /// Lies on the returned edge, strictly between its endpoints.
  OnEdge(EdgeIndex),
  /// Outside the convex hull; the returned edge is the hull edge whose
  /// outward half-plane contains the query.
  Outside(EdgeIndex),
}

/// Half-edge navigation over an [`EdgePool`]. Every method here is a thin,
/// total composition of the pool's primitive fields; they exist so callers
/// never poke at `next`/`prev`/`twin` directly.
pub struct Topology<'a> {
  pub pool: &'a EdgePool,
}

impl<'a> Topology<'a> {
  pub fn new(pool: &'a EdgePool) -> Topology<'a> {
    Topology { pool }
  }

  pub fn origin(&self, e: EdgeIndex) -> Option<VertexId> {
    self.pool.origin(e)
  }

  pub fn destination(&self, e: EdgeIndex) -> Option<VertexId> {
    self.pool.origin(e.twin())
  }

  pub fn next(&self, e: EdgeIndex) -> EdgeIndex {
    self.pool.next(e)
  }

  pub fn prev(&self, e: EdgeIndex) -> EdgeIndex {
    self.pool.prev(e)
  }

  pub fn twin(&self, e: EdgeIndex) -> EdgeIndex {
    e.twin()
  }

  pub fn next_from_twin(&self, e: EdgeIndex) -> EdgeIndex {
    self.next(e.twin())
  }

  pub fn prev_from_twin(&self, e: EdgeIndex) -> EdgeIndex {
    self.prev(e.twin())
  }

  pub fn twin_from_next(&self, e: EdgeIndex) -> EdgeIndex {
    self.next(e).twin()
  }

  pub fn twin_from_prev(&self, e: EdgeIndex) -> EdgeIndex {
    self.prev(e).twin()
  }

  /// Apex of the triangle incident to `e` (the vertex opposite `e`).
  pub fn apex(&self, e: EdgeIndex) -> Option<VertexId> {
    self.destination(self.next(e))
  }

  /// Is `e` a hull edge? True when the triangle on `e`'s twin side is a
  /// ghost face, i.e. its apex is the ghost sentinel (`None`), per
  /// DESIGN.md Open Question #4.
  pub fn is_hull_edge(&self, e: EdgeIndex) -> bool {
    self.apex(e.twin()).is_none()
  }

  /// Counter-clockwise ring of edges leaving `origin(e)`, obtained by
  /// repeatedly applying `twin . prev`. Finite: stops when the start edge
  /// recurs (mirrors spade's `CircularIterator` over `out_edges`).
  pub fn pinwheel(&self, e: EdgeIndex) -> Pinwheel<'a> {
    Pinwheel {
      pool: self.pool,
      start: e,
      current: Some(e),
    }
  }
}

pub struct Pinwheel<'a> {
  pool: &'a EdgePool,
  start: EdgeIndex,
  current: Option<EdgeIndex>,
}

impl<'a> Iterator for Pinwheel<'a> {
  type Item = EdgeIndex;

  fn next(&mut self) -> Option<EdgeIndex> {
    let current = self.current?;
    let next = self.pool.prev(current).twin();
    self.current = if next == self.start { None } else { Some(next) };
    Some(current)
  }
}

/// Flips the shared diagonal of the two triangles incident to `e`: the
/// diagonal `origin(e) -> destination(e)` is replaced by the two
/// off-triangle apexes. Relinks six half-edges; never reallocates and
/// never flips a constrained edge (callers must check first).
///
/// Before the flip, `e` and its twin bound two triangles sharing the
/// diagonal `origin(e) -> destination(e)`. After, that diagonal is replaced
/// by `apex1 -> apex2`, the two triangles' other apexes.
pub fn flip(pool: &mut EdgePool, e: EdgeIndex) {
  let et = e.twin();
  let e_next = pool.next(e);
  let e_prev = pool.prev(e);
  let t_next = pool.next(et);
  let t_prev = pool.prev(et);

  let apex1 = pool.origin(e_next.twin()).expect("apex1 must exist for a real triangle");
  let apex2 = pool.origin(t_next.twin()).expect("apex2 must exist for a real triangle");

  pool.set_origin(e, Some(apex2));
  pool.set_origin(et, Some(apex1));

  pool.link_triangle(e, e_prev, t_next);
  pool.link_triangle(et, t_prev, e_next);
}
