//! Geometry kernel: vertex storage and robust predicates (SPEC_FULL.md §4.A).

pub mod predicates;
mod vertex;

pub use predicates::{in_circle, orient2d, Orientation, Thresholds};
pub use vertex::{Vertex, VertexId, VertexStore};
