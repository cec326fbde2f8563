//! LR and QR transforms
//!
//! Both transforms factor the current matrix and multiply the factors back in
//! reverse order, which is a similarity transform. Iterating drives the
//! matrix toward upper-triangular form with the eigenvalues on the diagonal.

use super::{EigenConfig, EigenSolution, max_subdiagonal};
use crate::dense_helpers::{check_square, check_tolerance};
use crate::direct::lu_decompose;
use crate::error::Result;
use crate::trace::IterationTrace;
use crate::traits::{HouseholderQr, QrFactorizer};
use ndarray::Array2;

/// One LR step: A = L U, return U L
pub fn lr_step(a: &Array2<f64>) -> Result<Array2<f64>> {
    let factors = lu_decompose(a)?;
    Ok(factors.u.dot(&factors.l))
}

/// One QR step: A = Q R, return R Q
pub fn qr_step<Q: QrFactorizer + ?Sized>(a: &Array2<f64>, qr: &Q) -> Result<Array2<f64>> {
    let (q, r) = qr.qr_factorize(a)?;
    Ok(r.dot(&q))
}

/// Repeat `step` until the subdiagonal vanishes or the cap is reached.
///
/// Triangularity is checked before every step, so an already triangular
/// input returns after zero iterations.
fn iterate_to_triangular<F>(
    a: &Array2<f64>,
    config: &EigenConfig,
    name: &str,
    mut step: F,
) -> Result<EigenSolution>
where
    F: FnMut(&Array2<f64>) -> Result<Array2<f64>>,
{
    check_square(a)?;
    check_tolerance(config.tolerance)?;

    let mut current = a.clone();
    let mut error = max_subdiagonal(&current);
    let mut trace = IterationTrace::new(config.trace);
    trace.record(0, Some(error), current.clone());

    let mut iterations = 0;
    while error > config.tolerance && iterations < config.max_iterations {
        current = step(&current)?;
        iterations += 1;
        error = max_subdiagonal(&current);
        trace.record_with(iterations, Some(error), || current.clone());

        if config.print_interval > 0 && iterations % config.print_interval == 0 {
            log::info!("{name} iteration {iterations}: max |subdiagonal| = {error:.6e}");
        }
    }

    let converged = error <= config.tolerance;
    log::debug!("{name} finished after {iterations} iterations (converged = {converged})");

    Ok(EigenSolution::from_matrix(
        current, iterations, error, converged, trace,
    ))
}

/// Eigenvalues by the LR transform
///
/// Fails with a numerical error if a zero pivot appears in any of the
/// non-pivoted LU factorizations.
pub fn lr_transform(a: &Array2<f64>, config: &EigenConfig) -> Result<EigenSolution> {
    iterate_to_triangular(a, config, "LR transform", lr_step)
}

/// Eigenvalues by the QR transform using Householder QR
pub fn qr_transform(a: &Array2<f64>, config: &EigenConfig) -> Result<EigenSolution> {
    qr_transform_with(a, config, &HouseholderQr)
}

/// Eigenvalues by the QR transform with a caller-supplied QR factorization
pub fn qr_transform_with<Q: QrFactorizer + ?Sized>(
    a: &Array2<f64>,
    config: &EigenConfig,
    qr: &Q,
) -> Result<EigenSolution> {
    iterate_to_triangular(a, config, "QR transform", |m| qr_step(m, qr))
}
