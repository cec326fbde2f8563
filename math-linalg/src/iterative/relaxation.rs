//! Optimal SOR relaxation parameter
//!
//! For consistently ordered matrices the optimal ω is
//! 2 / (1 + sqrt(1 - ρ²)), where ρ is the spectral radius of the Jacobi
//! iteration matrix. ρ is estimated by power iteration on H².

use super::splitting::Splitting;
use crate::dense_helpers::{check_square, check_tolerance, vector_norm};
use crate::error::{LinalgError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Spectral radius estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralRadiusConfig {
    /// Maximum number of power iteration steps
    pub max_iterations: usize,
    /// Stop when successive estimates differ by less than this (relative)
    pub tolerance: f64,
}

impl Default for SpectralRadiusConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-12,
        }
    }
}

/// Outcome of a spectral radius estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralRadiusEstimate {
    /// Last estimate of ρ
    pub radius: f64,
    /// Power iteration steps taken
    pub iterations: usize,
    /// Whether successive estimates settled within the tolerance
    pub converged: bool,
}

/// Estimate the spectral radius of `h`
///
/// Uses the two-step ratio sqrt(||H² y|| / ||y||), which also converges when
/// the dominant eigenvalues come in ±ρ pairs (as for Jacobi iteration
/// matrices of consistently ordered systems). A dominant complex pair makes
/// the ratio oscillate around ρ; the last value is then returned with
/// `converged == false`.
pub fn spectral_radius(
    h: &Array2<f64>,
    config: &SpectralRadiusConfig,
) -> Result<SpectralRadiusEstimate> {
    let n = check_square(h)?;
    check_tolerance(config.tolerance)?;

    // Non-symmetric start avoids being orthogonal to the dominant eigenvector
    // for the usual symmetric patterns.
    let mut y: Array1<f64> = (0..n).map(|i| 1.0 + 0.1 * i as f64).collect();
    let norm = vector_norm(&y);
    y.mapv_inplace(|v| v / norm);

    let mut estimate = 0.0;
    let mut iterations = 0;
    while iterations < config.max_iterations {
        let w = h.dot(&h.dot(&y));
        let w_norm = vector_norm(&w);
        iterations += 1;
        if !w_norm.is_finite() {
            return Err(LinalgError::NonFinite {
                context: "spectral radius power iteration",
            });
        }
        if w_norm == 0.0 {
            // H² annihilates y: nilpotent on this subspace
            return Ok(SpectralRadiusEstimate {
                radius: 0.0,
                iterations,
                converged: true,
            });
        }

        let next = w_norm.sqrt();
        y = w / w_norm;

        if iterations > 1 && (next - estimate).abs() <= config.tolerance * next.max(1.0) {
            return Ok(SpectralRadiusEstimate {
                radius: next,
                iterations,
                converged: true,
            });
        }
        estimate = next;
    }

    log::warn!("spectral radius estimate did not settle after {iterations} iterations: {estimate}");
    Ok(SpectralRadiusEstimate {
        radius: estimate,
        iterations,
        converged: false,
    })
}

/// Optimal SOR parameter from the Jacobi spectral radius `rho`
pub fn optimal_omega_from_radius(rho: f64) -> Result<f64> {
    if !(rho.abs() < 1.0) {
        return Err(LinalgError::SpectralRadiusTooLarge { radius: rho });
    }
    let radicand = 1.0 - rho * rho;
    if radicand < 0.0 {
        return Err(LinalgError::NegativeRadicand {
            context: "optimal SOR relaxation",
            value: radicand,
        });
    }
    Ok(2.0 / (1.0 + radicand.sqrt()))
}

/// Optimal SOR parameter for the system matrix `a`
///
/// If the spectral radius estimate did not settle, ω is computed from the
/// last estimate and may be off the optimum; a warning is logged. Use
/// [`spectral_radius`] directly to inspect the estimate.
pub fn sor_optimal_omega(a: &Array2<f64>, config: &SpectralRadiusConfig) -> Result<f64> {
    let h = Splitting::jacobi_matrix(a)?;
    let estimate = spectral_radius(&h, config)?;
    if estimate.converged {
        log::debug!("Jacobi spectral radius estimate: {}", estimate.radius);
    } else {
        log::warn!(
            "optimal SOR omega uses an unsettled spectral radius estimate {}",
            estimate.radius
        );
    }
    optimal_omega_from_radius(estimate.radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_spectral_radius_plus_minus_pair() {
        // eigenvalues ±sqrt(0.02)
        let h = array![[0.0, -0.1], [-0.2, 0.0]];
        let est = spectral_radius(&h, &SpectralRadiusConfig::default()).unwrap();
        assert!(est.converged);
        assert_relative_eq!(est.radius, 0.02_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_spectral_radius_diagonal() {
        let h = array![[0.5, 0.0, 0.0], [0.0, -0.8, 0.0], [0.0, 0.0, 0.1]];
        let est = spectral_radius(&h, &SpectralRadiusConfig::default()).unwrap();
        assert!(est.converged);
        assert_relative_eq!(est.radius, 0.8, epsilon = 1e-8);
    }

    #[test]
    fn test_spectral_radius_nilpotent() {
        let h = array![[0.0, 1.0], [0.0, 0.0]];
        let est = spectral_radius(&h, &SpectralRadiusConfig::default()).unwrap();
        assert_eq!(est.radius, 0.0);
        assert!(est.converged);
    }

    #[test]
    fn test_spectral_radius_complex_pair_reports_unsettled() {
        // eigenvalues 0.5 ± 0.4i; H² is non-normal so the two-step ratio keeps oscillating
        let h = array![[0.5, 0.8], [-0.2, 0.5]];
        let config = SpectralRadiusConfig {
            max_iterations: 50,
            tolerance: 1e-12,
        };
        let est = spectral_radius(&h, &config).unwrap();
        assert!(!est.converged);
        assert_eq!(est.iterations, 50);
        assert!(est.radius.is_finite() && est.radius > 0.0);
    }

    #[test]
    fn test_optimal_omega_formula() {
        assert_relative_eq!(optimal_omega_from_radius(0.0).unwrap(), 1.0);
        let omega = optimal_omega_from_radius(0.5).unwrap();
        assert_relative_eq!(omega, 2.0 / (1.0 + 0.75_f64.sqrt()));
        assert!(omega > 1.0 && omega < 2.0);

        let err = optimal_omega_from_radius(1.0).unwrap_err();
        assert!(err.is_numerical_error());
        assert!(optimal_omega_from_radius(f64::NAN).is_err());
    }

    #[test]
    fn test_sor_optimal_omega_tridiagonal() {
        let a = array![[4.0, -1.0, 0.0], [-1.0, 4.0, -1.0], [0.0, -1.0, 4.0]];
        let omega = sor_optimal_omega(&a, &SpectralRadiusConfig::default()).unwrap();
        // rho = sqrt(2)/4
        let expected = 2.0 / (1.0 + (1.0 - 0.125_f64).sqrt());
        assert_relative_eq!(omega, expected, epsilon = 1e-8);
    }

    #[test]
    fn test_sor_optimal_omega_divergent_jacobi() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        let err = sor_optimal_omega(&a, &SpectralRadiusConfig::default()).unwrap_err();
        assert!(matches!(err, LinalgError::SpectralRadiusTooLarge { .. }));
    }
}
