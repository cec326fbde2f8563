//! Eigenvalue iterations
//!
//! This module provides iterative eigenvalue methods for dense matrices:
//! - [`lr_transform`]: repeated A = LU, A <- UL
//! - [`qr_transform`]: repeated A = QR, A <- RQ (QR delegated to a [`QrFactorizer`](crate::traits::QrFactorizer))
//! - [`jacobi_rotation`]: Jacobi diagonalization of symmetric matrices (cyclic or max-pivot)
//! - [`rayleigh_quotient_iteration`]: dominant eigenvalue of a symmetric matrix

mod power;
mod rotation;
mod transform;

pub use power::{
    PowerIterationConfig, PowerIterationSolution, RayleighEstimate, rayleigh_quotient_iteration,
};
pub use rotation::{
    RotationConfig, RotationStrategy, jacobi_eigen_cyclic, jacobi_eigen_max, jacobi_rotation,
    max_off_diagonal, rotate,
};
pub use transform::{lr_step, lr_transform, qr_step, qr_transform, qr_transform_with};

use crate::trace::IterationTrace;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// LR/QR transform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EigenConfig {
    /// Maximum number of transform steps
    pub max_iterations: usize,
    /// Largest subdiagonal magnitude still considered zero
    pub tolerance: f64,
    /// Record the matrix after every step
    pub trace: bool,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for EigenConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-15,
            trace: true,
            print_interval: 0,
        }
    }
}

/// Result of an iteration converging to triangular or diagonal form
#[derive(Debug, Clone)]
pub struct EigenSolution {
    /// Diagonal of the final matrix
    pub eigenvalues: Array1<f64>,
    /// Final (near-triangular or near-diagonal) matrix
    pub matrix: Array2<f64>,
    /// Number of steps performed
    pub iterations: usize,
    /// Final value of the termination measure
    pub error: f64,
    /// Whether the termination measure reached the tolerance
    pub converged: bool,
    /// Matrix after every step, starting with the input at iteration 0
    pub trace: IterationTrace<Array2<f64>>,
}

impl EigenSolution {
    pub(crate) fn from_matrix(
        matrix: Array2<f64>,
        iterations: usize,
        error: f64,
        converged: bool,
        trace: IterationTrace<Array2<f64>>,
    ) -> Self {
        Self {
            eigenvalues: matrix.diag().to_owned(),
            matrix,
            iterations,
            error,
            converged,
            trace,
        }
    }
}

/// Largest magnitude below the diagonal (0 for a 1x1 matrix).
pub(crate) fn max_subdiagonal(a: &Array2<f64>) -> f64 {
    a.indexed_iter()
        .filter(|((i, j), _)| j < i)
        .fold(0.0_f64, |acc, (_, v)| acc.max(v.abs()))
}
