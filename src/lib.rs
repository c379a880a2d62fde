pub mod config;
pub mod error;
mod hilbert;
pub mod geometry;
mod linalg;
pub mod interp;
pub mod mesh;
mod stats;

pub use config::{MergeRule, SurfaceModel, TinConfig};
pub use error::{Error, Result};
pub use geometry::{predicates, Vertex, VertexId};
pub use interp::natural_neighbor::{NaturalNeighborResult, NaturalNeighborhood};
pub use interp::ols::{OlsEstimate, OlsRequest};
pub use mesh::constraints::{Constraint, ConstraintId, ConstraintKind};
pub use mesh::pool::EdgeIndex;
pub use mesh::topology::PointLocation;
pub use mesh::Mesh;
