//! Ordinary-least-squares polynomial regression interpolation
//! (SPEC_FULL.md §4.H).

use crate::config::SurfaceModel;
use crate::geometry::{Vertex, VertexId};
use crate::linalg::{qr_inverse, qr_solve, Matrix};
use crate::mesh::pool::EdgeIndex;
use crate::mesh::topology::PointLocation;
use crate::mesh::Mesh;
use crate::stats::{ApproximateTDistribution, TDistribution};

/// How neighborhood samples are selected around the query (SPEC_FULL.md
/// §4.H "Sample selection").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplePolicy {
  /// Query does not coincide with a vertex: natural neighbors plus their
  /// natural neighbors (the "second ring").
  NaturalNeighborhood,
  /// Query coincides with a vertex: its pinwheel ring plus the exterior
  /// ring, optionally excluding the vertex itself.
  CoincidentVertex { exclude_self: bool },
}

/// A fully specified OLS query.
#[derive(Debug, Clone, Copy)]
pub struct OlsRequest {
  pub x: f64,
  pub y: f64,
  pub model: SurfaceModel,
  pub model_fallback: bool,
  pub compute_extended_stats: bool,
  pub population_fraction: f64,
}

/// Result of an OLS regression interpolation.
#[derive(Debug, Clone)]
pub struct OlsEstimate {
  /// Estimated surface value at the query point (`beta[0]` after adding
  /// back the sample-z mean).
  pub estimate: f64,
  /// Regression coefficients in the query-centered frame.
  pub beta: Vec<f64>,
  pub model: SurfaceModel,
  pub r_squared: f64,
  pub residual_variance: f64,
  pub standard_errors: Vec<f64>,
  pub confidence_half_width: f64,
  pub prediction_half_width: f64,
  /// Hat-matrix diagonal and R-student residuals, present only when
  /// `compute_extended_stats` was requested.
  pub hat_diagonal: Option<Vec<f64>>,
  pub r_student: Option<Vec<f64>>,
}

impl Mesh {
  /// Runs the OLS regression interpolator described in SPEC_FULL.md §4.H.
  /// Returns `None` when the query is outside the hull, there are too few
  /// samples even after model fallback, or the normal-equations matrix is
  /// singular.
  pub fn interpolate_ols(&mut self, req: OlsRequest) -> Option<OlsEstimate> {
    if !self.bootstrapped {
      return None;
    }
    let loc = self.locate(req.x, req.y)?;
    if matches!(loc, PointLocation::Outside(_)) {
      return None;
    }

    let (policy, coincident) = match loc {
      PointLocation::OnVertex(id) => (SamplePolicy::CoincidentVertex { exclude_self: false }, Some(id)),
      _ => (SamplePolicy::NaturalNeighborhood, None),
    };

    let samples = self.collect_neighborhood_samples(req.x, req.y, loc, policy, coincident)?;

    let mut model = req.model;
    loop {
      let k = model.term_count();
      if samples.len() > k {
        break;
      }
      if req.model_fallback && model != SurfaceModel::Planar {
        model = model.fallback();
        continue;
      }
      return None;
    }

    self.fit_ols(&samples, req.x, req.y, model, req.compute_extended_stats, req.population_fraction)
  }

  /// Gathers the neighborhood sample set per SPEC_FULL.md §4.H: natural
  /// neighbors plus their natural neighbors ("second ring") for a generic
  /// query, or the pinwheel-plus-exterior ring for a vertex-coincident
  /// query.
  fn collect_neighborhood_samples(
    &mut self,
    x: f64,
    y: f64,
    loc: PointLocation,
    policy: SamplePolicy,
    coincident: Option<VertexId>,
  ) -> Option<Vec<VertexId>> {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    match policy {
      SamplePolicy::NaturalNeighborhood => {
        let first_ring = self.natural_neighborhood(x, y)?;
        for &(id, _) in &first_ring.weights {
          if seen.insert(id) {
            out.push(id);
          }
        }
        let first_ids: Vec<VertexId> = first_ring.weights.iter().map(|&(id, _)| id).collect();
        for id in first_ids {
          let v = *self.vertices.get(id);
          if let Some(second) = self.natural_neighborhood(v.x, v.y) {
            for &(nid, _) in &second.weights {
              if seen.insert(nid) {
                out.push(nid);
              }
            }
          }
        }
      }
      SamplePolicy::CoincidentVertex { exclude_self } => {
        let center = coincident?;
        let topo = self.topology();
        let start = self
          .pool
          .base_edges()
          .find(|&e| topo.origin(e) == Some(center) || topo.origin(e.twin()) == Some(center))
          .map(|e| if topo.origin(e) == Some(center) { e } else { e.twin() })?;
        let ring: Vec<EdgeIndex> = topo.pinwheel(start).collect();
        if !exclude_self {
          seen.insert(center);
          out.push(center);
        }
        for e in &ring {
          if let Some(dest) = topo.destination(*e) {
            if seen.insert(dest) {
              out.push(dest);
            }
          }
        }
        let ring_dests: Vec<VertexId> = ring.iter().filter_map(|&e| topo.destination(e)).collect();
        for dest in ring_dests {
          let v = *self.vertices.get(dest);
          if let Some(second) = self.natural_neighborhood(v.x, v.y) {
            for &(nid, _) in &second.weights {
              if seen.insert(nid) {
                out.push(nid);
              }
            }
          }
        }
      }
    }

    Some(out)
  }

  /// Assembles and solves the normal equations for `model` over `samples`
  /// in a frame centered at `(x, y)`, then computes the statistics suite.
  fn fit_ols(
    &self,
    samples: &[VertexId],
    x: f64,
    y: f64,
    model: SurfaceModel,
    extended: bool,
    population_fraction: f64,
  ) -> Option<OlsEstimate> {
    let n = samples.len();
    let k = model.term_count();
    let verts: Vec<&Vertex> = samples.iter().map(|&id| self.vertices.get(id)).collect();
    let z_mean: f64 = verts.iter().map(|v| v.z).sum::<f64>() / n as f64;

    let rows: Vec<Vec<f64>> = verts
      .iter()
      .map(|v| model.basis(v.x - x, v.y - y))
      .collect();
    let zs: Vec<f64> = verts.iter().map(|v| v.z - z_mean).collect();

    let mut ata = Matrix::zeros(k, k);
    let mut atz = vec![0.0; k];
    for (row, &z) in rows.iter().zip(zs.iter()) {
      for i in 0..k {
        atz[i] += row[i] * z;
        for j in i..k {
          ata[(i, j)] += row[i] * row[j];
        }
      }
    }
    for i in 0..k {
      for j in 0..i {
        ata[(i, j)] = ata[(j, i)];
      }
    }

    let beta = qr_solve(&ata, &atz)?;

    let fitted: Vec<f64> = rows.iter().map(|row| dot(row, &beta)).collect();
    let residuals: Vec<f64> = zs.iter().zip(fitted.iter()).map(|(z, f)| z - f).collect();
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let sst: f64 = zs.iter().map(|z| z * z).sum();
    let dof = (n - k) as f64;
    let residual_variance = if dof > 0.0 { sse / dof } else { 0.0 };
    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 1.0 };

    let ata_inv = qr_inverse(&ata)?;
    let standard_errors: Vec<f64> = ata_inv
      .diagonal()
      .iter()
      .map(|d| (residual_variance * d.max(0.0)).sqrt())
      .collect();

    let t_dist = ApproximateTDistribution;
    let t_crit = t_dist.critical_value(dof.max(1.0), population_fraction);
    let se0 = standard_errors.first().copied().unwrap_or(0.0);
    let confidence_half_width = t_crit * se0;
    let prediction_half_width = t_crit * (residual_variance + se0 * se0).sqrt();

    let (hat_diagonal, r_student) = if extended {
      let design = {
        let mut m = Matrix::zeros(n, k);
        for (r, row) in rows.iter().enumerate() {
          for c in 0..k {
            m[(r, c)] = row[c];
          }
        }
        m
      };
      let design_t = design.transpose();
      let h = &(&design * &ata_inv) * &design_t;
      let hat_diag: Vec<f64> = (0..n).map(|i| h[(i, i)]).collect();
      let r_stud: Vec<f64> = residuals
        .iter()
        .zip(hat_diag.iter())
        .map(|(r, h_ii)| {
          let denom_var = residual_variance * (1.0 - h_ii).max(1e-12);
          r / denom_var.sqrt()
        })
        .collect();
      (Some(hat_diag), Some(r_stud))
    } else {
      (None, None)
    };

    Some(OlsEstimate {
      estimate: beta[0] + z_mean,
      beta,
      model,
      r_squared,
      residual_variance,
      standard_errors,
      confidence_half_width,
      prediction_half_width,
      hat_diagonal,
      r_student,
    })
  }

  /// Cross-validated OLS estimate at an existing vertex: fits the
  /// regression over its neighborhood excluding the vertex itself.
  pub fn cross_validate(&mut self, id: VertexId, model: SurfaceModel) -> Option<OlsEstimate> {
    let v = *self.vertices.get(id);
    let samples =
      self.collect_neighborhood_samples(v.x, v.y, PointLocation::OnVertex(id), SamplePolicy::CoincidentVertex { exclude_self: true }, Some(id))?;
    self.fit_ols(&samples, v.x, v.y, model, false, 0.95)
  }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
