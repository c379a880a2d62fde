//! Crate-wide error taxonomy.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong building or querying a [`Mesh`](crate::Mesh).
///
/// Queries that may legitimately have no answer (a point outside the hull, a
/// vertex exactly on a constrained edge) do not produce an `Error`; they
/// return `Option::None`. `Error` is reserved for precondition violations,
/// an un-bootstrapped mesh, geometric degeneracies that could not be
/// resolved even with the adaptive-precision fallback, and solver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// `nominal_point_spacing` was not strictly positive.
  InvalidSpacing,
  /// Fewer than three non-colinear vertices have been inserted.
  NotBootstrapped,
  /// A half-edge invariant (`next(prev(e)) == e`, `twin(twin(e)) == e`, ...)
  /// was violated; indicates a bug in the mesh rather than bad input.
  InvariantViolation,
  /// A normal-equations matrix was singular to working precision.
  SingularSystem,
  /// A constraint could not be embedded because it conflicts with an
  /// already-embedded constraint (crossing edges with no legal resolution).
  ConstraintConflict,
  /// A constraint or edge index was out of range for this mesh.
  IndexOutOfRange,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::InvalidSpacing => write!(f, "nominal point spacing must be positive"),
      Error::NotBootstrapped => write!(f, "mesh has not accepted three non-colinear vertices yet"),
      Error::InvariantViolation => write!(f, "half-edge invariant violated"),
      Error::SingularSystem => write!(f, "normal-equations matrix is singular"),
      Error::ConstraintConflict => write!(f, "constraint conflicts with an existing constraint"),
      Error::IndexOutOfRange => write!(f, "index out of range for this mesh"),
    }
  }
}

impl std::error::Error for Error {}
