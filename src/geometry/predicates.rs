//! Robust orientation / in-circle predicates with adaptive-precision fallback.
//!
//! Coordinates here are plain `f64`, so exact BigInt/rational arithmetic
//! isn't an option; `geometry-predicates`'s adaptive-precision determinants
//! are the floating-point equivalent.

use geometry_predicates::{incircle, orient2d as gp_orient2d, Coord};

use crate::geometry::vertex::Vertex;

/// Sign of a robust predicate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
  CounterClockWise,
  ClockWise,
  CoLinear,
}

/// Tolerances derived from the nominal spacing between input points
/// (SPEC_FULL.md §4.A). `h` should be a representative distance between
/// neighboring samples; all tolerances scale with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
  pub vertex_tolerance: f64,
  pub vertex_tolerance_sq: f64,
  pub half_plane_threshold: f64,
  pub in_circle_threshold: f64,
}

impl Thresholds {
  pub fn from_spacing(h: f64) -> Thresholds {
    let eps = f64::EPSILON;
    let vertex_tolerance = h * 1e-5;
    Thresholds {
      vertex_tolerance,
      vertex_tolerance_sq: vertex_tolerance * vertex_tolerance,
      half_plane_threshold: h * h * eps,
      in_circle_threshold: h.powi(4) * eps,
    }
  }
}

fn coord(v: &Vertex) -> Coord<f64> {
  Coord { x: v.x, y: v.y }
}

/// Sign of the signed area of triangle `abc`. Positive for counter-clockwise.
///
/// `geometry-predicates` already implements the two-tier fast/adaptive
/// scheme internally; `threshold` only decides when a near-zero result is
/// reported as exactly colinear rather than as a (numerically
/// insignificant) turn direction.
pub fn orient2d(a: &Vertex, b: &Vertex, c: &Vertex, t: &Thresholds) -> Orientation {
  let det = gp_orient2d(coord(a), coord(b), coord(c));
  classify(det, t.half_plane_threshold)
}

/// Sign of the in-circle test for `q` against the circumcircle of `abc`.
/// `abc` must be given in counter-clockwise order. `CounterClockWise` means
/// `q` lies strictly inside the circumcircle.
pub fn in_circle(a: &Vertex, b: &Vertex, c: &Vertex, q: &Vertex, t: &Thresholds) -> Orientation {
  let det = incircle(coord(a), coord(b), coord(c), coord(q));
  classify(det, t.in_circle_threshold)
}

fn classify(det: f64, threshold: f64) -> Orientation {
  if det > threshold {
    Orientation::CounterClockWise
  } else if det < -threshold {
    Orientation::ClockWise
  } else {
    Orientation::CoLinear
  }
}

/// Cartesian center of the circumcircle of triangle `abc`.
///
/// Coordinates are translated so `a` is the local origin before the
/// determinant computation, matching the cancellation-avoidance technique
/// used throughout SPEC_FULL.md §4.G.
pub fn circumcenter(a: &Vertex, b: &Vertex, c: &Vertex) -> (f64, f64) {
  let bx = b.x - a.x;
  let by = b.y - a.y;
  let cx = c.x - a.x;
  let cy = c.y - a.y;
  let d = 2.0 * (bx * cy - by * cx);
  let b_len2 = bx * bx + by * by;
  let c_len2 = cx * cx + cy * cy;
  let ux = (cy * b_len2 - by * c_len2) / d;
  let uy = (bx * c_len2 - cx * b_len2) / d;
  (a.x + ux, a.y + uy)
}
