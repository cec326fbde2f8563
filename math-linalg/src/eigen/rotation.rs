//! Jacobi rotation diagonalization
//!
//! Each step applies a plane rotation in the (p, q) plane that zeroes the
//! symmetric pair A[p, q] = A[q, p]. The position is chosen either by a
//! cyclic sweep over the upper triangle or as the largest off-diagonal entry.
//! Rotations are similarity transforms, so trace, determinant and the
//! eigenvalues are preserved while the off-diagonal mass shrinks.

use super::EigenSolution;
use crate::dense_helpers::{check_symmetric, check_tolerance, strict_lower_frobenius};
use crate::error::{LinalgError, Result};
use crate::trace::IterationTrace;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the next rotation position is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationStrategy {
    /// Sweep (0,1), (0,2), ..., (n-2,n-1) and start over
    #[default]
    Cyclic,
    /// Rotate at the largest-magnitude off-diagonal entry
    MaxPivot,
}

impl FromStr for RotationStrategy {
    type Err = LinalgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cyclic" | "sequential" => Ok(RotationStrategy::Cyclic),
            "max" | "max-pivot" | "max_pivot" => Ok(RotationStrategy::MaxPivot),
            _ => Err(LinalgError::UnknownMethod {
                tag: s.to_string(),
                expected: "cyclic, max-pivot",
            }),
        }
    }
}

impl fmt::Display for RotationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationStrategy::Cyclic => write!(f, "cyclic"),
            RotationStrategy::MaxPivot => write!(f, "max-pivot"),
        }
    }
}

/// Jacobi rotation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Pivot selection
    pub strategy: RotationStrategy,
    /// Maximum number of rotations
    pub max_iterations: usize,
    /// Absolute tolerance on the Frobenius norm of the strict lower triangle
    pub tolerance: f64,
    /// Largest ||A - A^T|| accepted as symmetric
    pub symmetry_tolerance: f64,
    /// Record the matrix after every rotation
    pub trace: bool,
    /// Print progress every N rotations (0 = no output)
    pub print_interval: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::Cyclic,
            max_iterations: 25,
            tolerance: 1e-5,
            symmetry_tolerance: 1e-5,
            trace: true,
            print_interval: 0,
        }
    }
}

/// sqrt that tolerates round-off just below zero.
fn checked_sqrt(value: f64, context: &'static str) -> Result<f64> {
    if value < -1e-12 || value.is_nan() {
        return Err(LinalgError::NegativeRadicand { context, value });
    }
    Ok(value.max(0.0).sqrt())
}

/// Zero A[p, q] and A[q, p] of a symmetric matrix with one plane rotation
///
/// Returns a new matrix; `a` is not modified. If A[p, q] is already zero and
/// A[p, p] == A[q, q] the rotation is the identity and a copy is returned.
pub fn rotate(a: &Array2<f64>, p: usize, q: usize) -> Result<Array2<f64>> {
    let n = a.nrows();
    if p >= n || q >= n || p == q {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: p.max(q),
        });
    }

    let app = a[[p, p]];
    let aqq = a[[q, q]];
    let apq = a[[p, q]];

    let r = ((app - aqq).powi(2) + 4.0 * apq * apq).sqrt();
    if r == 0.0 {
        return Ok(a.clone());
    }

    let sign = if apq < 0.0 { -1.0 } else { 1.0 };
    let c = checked_sqrt(0.5 + (app - aqq) / (2.0 * r), "Jacobi rotation cosine")?;
    let s = sign * checked_sqrt(0.5 - (app - aqq) / (2.0 * r), "Jacobi rotation sine")?;

    // The eigenvalue whose formula adds same-signed terms comes from the trace;
    // the other one from the determinant. r > 0, so the divisor is never zero.
    let sum = app + aqq;
    let det = app * aqq - apq * apq;
    let (bpp, bqq) = if sum >= 0.0 {
        let bpp = (sum + r) / 2.0;
        (bpp, det / bpp)
    } else {
        let bqq = (sum - r) / 2.0;
        (det / bqq, bqq)
    };

    let mut b = a.clone();
    for i in 0..n {
        if i != p && i != q {
            let aip = a[[i, p]];
            let aiq = a[[i, q]];
            let bip = aip * c + aiq * s;
            let biq = -aip * s + aiq * c;
            b[[i, p]] = bip;
            b[[p, i]] = bip;
            b[[i, q]] = biq;
            b[[q, i]] = biq;
        }
    }
    b[[p, p]] = bpp;
    b[[q, q]] = bqq;
    b[[p, q]] = 0.0;
    b[[q, p]] = 0.0;

    Ok(b)
}

/// Position (p, q), p < q, of the largest-magnitude entry above the diagonal
///
/// Entries are scanned row by row; ties go to the first one found.
pub fn max_off_diagonal(a: &Array2<f64>) -> Option<(usize, usize)> {
    let n = a.nrows();
    let mut best: Option<((usize, usize), f64)> = None;
    for i in 0..n {
        for j in (i + 1)..n {
            let mag = a[[i, j]].abs();
            match best {
                Some((_, m)) if mag <= m => {}
                _ => best = Some(((i, j), mag)),
            }
        }
    }
    best.map(|(pos, _)| pos)
}

/// Cyclic sweep over the upper triangle.
struct CyclicPivots {
    n: usize,
    p: usize,
    q: usize,
}

impl CyclicPivots {
    fn new(n: usize) -> Self {
        Self { n, p: 0, q: 1 }
    }
}

impl Iterator for CyclicPivots {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.n < 2 {
            return None;
        }
        let current = (self.p, self.q);
        self.q += 1;
        if self.q >= self.n {
            self.p += 1;
            self.q = self.p + 1;
            if self.p >= self.n - 1 {
                self.p = 0;
                self.q = 1;
            }
        }
        Some(current)
    }
}

/// Eigenvalues of a symmetric matrix by Jacobi rotations
///
/// Non-symmetric input (||A - A^T|| >= `symmetry_tolerance`) is rejected.
/// Iteration stops once the strict lower triangle's Frobenius norm is at
/// most `tolerance`, or after `max_iterations` rotations.
pub fn jacobi_rotation(a: &Array2<f64>, config: &RotationConfig) -> Result<EigenSolution> {
    let n = check_symmetric(a, config.symmetry_tolerance)?;
    check_tolerance(config.tolerance)?;

    let mut current = a.clone();
    let mut error = strict_lower_frobenius(&current);
    let mut trace = IterationTrace::new(config.trace);
    trace.record(0, Some(error), current.clone());

    let mut cyclic = CyclicPivots::new(n);
    let mut iterations = 0;

    while error > config.tolerance && iterations < config.max_iterations {
        let pivot = match config.strategy {
            RotationStrategy::Cyclic => cyclic.next(),
            RotationStrategy::MaxPivot => max_off_diagonal(&current),
        };
        let Some((p, q)) = pivot else {
            break;
        };

        current = rotate(&current, p, q)?;
        iterations += 1;
        error = strict_lower_frobenius(&current);
        trace.record_with(iterations, Some(error), || current.clone());

        if config.print_interval > 0 && iterations % config.print_interval == 0 {
            log::info!(
                "Jacobi rotation ({}) {iterations}: (p, q) = ({p}, {q}), off-diagonal norm = {error:.6e}",
                config.strategy
            );
        }
    }

    let converged = error <= config.tolerance;
    log::debug!(
        "Jacobi rotation ({}) finished after {iterations} rotations (converged = {converged})",
        config.strategy
    );

    Ok(EigenSolution::from_matrix(
        current, iterations, error, converged, trace,
    ))
}

/// Jacobi diagonalization with a cyclic sweep
pub fn jacobi_eigen_cyclic(a: &Array2<f64>, config: &RotationConfig) -> Result<EigenSolution> {
    jacobi_rotation(
        a,
        &RotationConfig {
            strategy: RotationStrategy::Cyclic,
            ..config.clone()
        },
    )
}

/// Jacobi diagonalization zeroing the largest off-diagonal entry each step
pub fn jacobi_eigen_max(a: &Array2<f64>, config: &RotationConfig) -> Result<EigenSolution> {
    jacobi_rotation(
        a,
        &RotationConfig {
            strategy: RotationStrategy::MaxPivot,
            ..config.clone()
        },
    )
}
