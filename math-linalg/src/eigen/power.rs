//! Power iteration with Rayleigh quotient estimates
//!
//! Repeatedly applies A to a start vector and estimates the dominant
//! eigenvalue of a symmetric matrix as (y^T A y) / (y^T y).

use crate::dense_helpers::{check_len, check_symmetric, check_tolerance, inner_product, vector_norm};
use crate::error::{LinalgError, Result};
use crate::trace::IterationTrace;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Power iteration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerIterationConfig {
    /// Maximum number of matrix-vector products
    pub max_iterations: usize,
    /// Stop once successive eigenvalue estimates differ by less than this
    pub tolerance: f64,
    /// Rescale the iterate to unit length after every product
    pub normalize: bool,
    /// Largest ||A - A^T|| accepted as symmetric
    pub symmetry_tolerance: f64,
    /// Record every estimate
    pub trace: bool,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for PowerIterationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
            normalize: true,
            symmetry_tolerance: 1e-5,
            trace: true,
            print_interval: 0,
        }
    }
}

/// Eigenvalue estimate and the iterate it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayleighEstimate {
    /// Rayleigh quotient
    pub eigenvalue: f64,
    /// Iterate after the step (unit length when normalizing)
    pub vector: Array1<f64>,
}

/// Result of the power iteration
#[derive(Debug, Clone)]
pub struct PowerIterationSolution {
    /// Final eigenvalue estimate
    pub eigenvalue: f64,
    /// Final iterate, an approximate eigenvector
    pub eigenvector: Array1<f64>,
    /// Number of matrix-vector products
    pub iterations: usize,
    /// Difference between the last two estimates (infinite after a single step)
    pub error: f64,
    /// Whether the estimates settled within tolerance
    pub converged: bool,
    /// Estimate after every step
    pub trace: IterationTrace<RayleighEstimate>,
}

/// Dominant eigenvalue of a symmetric matrix by power iteration
///
/// Each step computes z = A y, the estimate (y^T z) / (y^T y) and the next
/// iterate y <- z (optionally normalized). A zero product means y lies in the
/// null space; the eigenvalue 0 is then returned as converged. With
/// `max_iterations == 0` the Rayleigh quotient of `y0` is returned unconverged.
///
/// # Errors
///
/// - [`LinalgError::NotSymmetric`] for non-symmetric input
/// - [`LinalgError::ZeroVector`] if `y0` is zero
/// - [`LinalgError::NonFinite`] if the iterate overflows
pub fn rayleigh_quotient_iteration(
    a: &Array2<f64>,
    y0: &Array1<f64>,
    config: &PowerIterationConfig,
) -> Result<PowerIterationSolution> {
    let n = check_symmetric(a, config.symmetry_tolerance)?;
    check_len(n, y0)?;
    check_tolerance(config.tolerance)?;

    let norm0 = vector_norm(y0);
    if norm0 == 0.0 {
        return Err(LinalgError::ZeroVector);
    }

    let mut y = if config.normalize {
        y0 / norm0
    } else {
        y0.clone()
    };
    let mut trace = IterationTrace::new(config.trace);
    // Rayleigh quotient of the start vector; returned as is when no step runs
    let mut eigenvalue = inner_product(&y, &a.dot(&y)) / inner_product(&y, &y);
    if !eigenvalue.is_finite() {
        return Err(LinalgError::NonFinite {
            context: "Rayleigh quotient",
        });
    }
    let mut error = f64::INFINITY;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let z = a.dot(&y);
        let z_norm = vector_norm(&z);
        iterations += 1;

        if z_norm == 0.0 {
            eigenvalue = 0.0;
            error = 0.0;
            converged = true;
            trace.record_with(iterations, Some(error), || RayleighEstimate {
                eigenvalue,
                vector: y.clone(),
            });
            break;
        }

        let estimate = inner_product(&y, &z) / inner_product(&y, &y);
        if !estimate.is_finite() || !z_norm.is_finite() {
            return Err(LinalgError::NonFinite {
                context: "Rayleigh quotient",
            });
        }

        let step_error = (iterations > 1).then(|| (estimate - eigenvalue).abs());
        eigenvalue = estimate;
        y = if config.normalize { z / z_norm } else { z };
        trace.record_with(iterations, step_error, || RayleighEstimate {
            eigenvalue,
            vector: y.clone(),
        });

        if config.print_interval > 0 && iterations % config.print_interval == 0 {
            log::info!("Power iteration {iterations}: eigenvalue = {eigenvalue:.10e}");
        }

        if let Some(e) = step_error {
            error = e;
            if e < config.tolerance {
                converged = true;
                break;
            }
        }
    }

    if !converged {
        log::warn!(
            "Power iteration did not converge after {iterations} iterations (last change {error:.3e})"
        );
    }

    Ok(PowerIterationSolution {
        eigenvalue,
        eigenvector: y,
        iterations,
        error,
        converged,
        trace,
    })
}
