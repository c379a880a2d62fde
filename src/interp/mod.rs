//! Interpolators built on top of the mesh (SPEC_FULL.md §4.G, §4.H).

pub mod natural_neighbor;
pub mod ols;

pub use natural_neighbor::{NaturalNeighborResult, NaturalNeighborhood};
pub use ols::{OlsEstimate, OlsRequest, SamplePolicy};
