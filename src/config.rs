//! Configuration surface (SPEC_FULL.md §9).

/// What happens when a newly inserted vertex coincides with an existing one
/// within `vertex_tolerance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
  /// Keep the vertex that was inserted first; discard the new one.
  FirstWins,
  /// Replace the existing vertex's value with the new one.
  LastWins,
  /// Average the two values.
  Mean,
  /// Keep the smaller value.
  Min,
  /// Keep the larger value.
  Max,
}

/// Polynomial surface models supported by the OLS interpolator.
///
/// Ordering matches the coefficient-count table in SPEC_FULL.md §4.H.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceModel {
  Planar,
  PlanarWithCrossTerms,
  Quadratic,
  QuadraticWithCrossTerms,
  Cubic,
  CubicWithCrossTerms,
}

impl SurfaceModel {
  /// Number of coefficients (including the constant term) this model fits.
  pub fn term_count(self) -> usize {
    match self {
      SurfaceModel::Planar => 3,
      SurfaceModel::PlanarWithCrossTerms => 4,
      SurfaceModel::Quadratic => 5,
      SurfaceModel::QuadraticWithCrossTerms => 6,
      SurfaceModel::Cubic => 7,
      SurfaceModel::CubicWithCrossTerms => 10,
    }
  }

  /// Evaluate the basis functions `phi_k(x, y)` at a query-centered point.
  pub fn basis(self, x: f64, y: f64) -> Vec<f64> {
    let all = [
      1.0,
      x,
      y,
      x * y,
      x * x,
      y * y,
      x * x * x,
      y * y * y,
      x * x * y,
      x * y * y,
    ];
    match self {
      SurfaceModel::Planar => vec![all[0], all[1], all[2]],
      SurfaceModel::PlanarWithCrossTerms => vec![all[0], all[1], all[2], all[3]],
      SurfaceModel::Quadratic => vec![all[0], all[1], all[2], all[4], all[5]],
      SurfaceModel::QuadraticWithCrossTerms => {
        vec![all[0], all[1], all[2], all[4], all[5], all[3]]
      }
      SurfaceModel::Cubic => vec![all[0], all[1], all[2], all[4], all[5], all[6], all[7]],
      SurfaceModel::CubicWithCrossTerms => vec![
        all[0], all[1], all[2], all[4], all[3], all[5], all[6], all[8], all[9], all[7],
      ],
    }
  }

  /// Downgrade one step toward `Planar`, used by the model-fallback policy.
  pub fn fallback(self) -> SurfaceModel {
    SurfaceModel::Planar
  }
}

/// Tunables recognized by the core (SPEC_FULL.md §9 Configuration surface).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TinConfig {
  /// Nominal spacing between points; scales every geometric tolerance.
  pub nominal_point_spacing: f64,
  /// Resolution policy for coincident vertices.
  pub merge_rule: MergeRule,
  /// Default polynomial surface model for OLS interpolation.
  pub surface_model: SurfaceModel,
  /// Degrade to `Planar` on insufficient samples rather than failing.
  pub model_fallback: bool,
  /// Materialize the hat matrix and R-student residuals.
  pub compute_extended_stats: bool,
  /// Population fraction used for confidence/prediction interval half-widths.
  pub population_fraction: f64,
}

impl TinConfig {
  /// Construct a config from just the nominal spacing; everything else
  /// defaults per [`TinConfig::default`].
  pub fn new(nominal_point_spacing: f64) -> TinConfig {
    TinConfig {
      nominal_point_spacing,
      ..TinConfig::default()
    }
  }
}

impl Default for TinConfig {
  fn default() -> TinConfig {
    TinConfig {
      nominal_point_spacing: 1.0,
      merge_rule: MergeRule::FirstWins,
      surface_model: SurfaceModel::Quadratic,
      model_fallback: true,
      compute_extended_stats: false,
      population_fraction: 0.95,
    }
  }
}
