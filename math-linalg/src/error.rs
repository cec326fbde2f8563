//! Error types for dense linear algebra operations.
//!
//! Errors fall into two families: input-contract failures (wrong shapes,
//! parameters outside their domain, non-symmetric input to symmetric-only
//! algorithms) and numerical failures (zero pivots, singular splittings,
//! undefined square roots). Running out of iterations is not an error; it
//! is reported through the `converged` flag of each solution type.

use thiserror::Error;

/// Errors that can occur during factorization, solving, or eigenvalue iteration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinalgError {
    /// Matrix is not square.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Matrix has no rows.
    #[error("matrix must have at least one row")]
    EmptyMatrix,

    /// Vector or matrix dimension does not match the system size.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length provided
        got: usize,
    },

    /// Right-hand side was given as a matrix with more than one column.
    #[error("right-hand side must be a single column, got {cols} columns")]
    NotColumnVector {
        /// Number of columns of the supplied right-hand side
        cols: usize,
    },

    /// SOR relaxation parameter outside (0, 2).
    #[error("invalid relaxation parameter: {omega} (must be in (0, 2))")]
    InvalidRelaxation {
        /// The rejected omega
        omega: f64,
    },

    /// Tolerance is negative or not finite.
    #[error("invalid tolerance: {tolerance} (must be finite and >= 0)")]
    InvalidTolerance {
        /// The rejected tolerance
        tolerance: f64,
    },

    /// Algorithm requires a symmetric matrix.
    #[error("matrix is not symmetric: ||A - A^T|| = {asymmetry:e}")]
    NotSymmetric {
        /// Frobenius norm of A - A^T
        asymmetry: f64,
    },

    /// Start vector is identically zero.
    #[error("start vector must be non-zero")]
    ZeroVector,

    /// Bracketing interval is empty or reversed.
    #[error("invalid interval [{a}, {b}]")]
    InvalidInterval {
        /// Left end
        a: f64,
        /// Right end
        b: f64,
    },

    /// Function values at both bracket ends have the same sign.
    #[error("no sign change on [{a}, {b}]: f(a) = {fa}, f(b) = {fb}")]
    NoSignChange {
        /// Left end
        a: f64,
        /// Right end
        b: f64,
        /// f(a)
        fa: f64,
        /// f(b)
        fb: f64,
    },

    /// Unrecognized textual method tag.
    #[error("unknown method '{tag}' (expected one of: {expected})")]
    UnknownMethod {
        /// The rejected tag
        tag: String,
        /// Comma-separated list of accepted tags
        expected: &'static str,
    },

    /// Pivot or diagonal entry is zero (or too small to divide by).
    #[error("zero pivot at index {index}: {value:e}")]
    ZeroPivot {
        /// Row/column of the offending pivot
        index: usize,
        /// The pivot value
        value: f64,
    },

    /// The whole remaining pivot column is zero.
    #[error("matrix is singular (no usable pivot in column {column})")]
    SingularMatrix {
        /// Column where elimination stalled
        column: usize,
    },

    /// Square root of a negative number inside a closed formula.
    #[error("negative radicand in {context}: {value:e}")]
    NegativeRadicand {
        /// Which formula failed
        context: &'static str,
        /// The radicand
        value: f64,
    },

    /// SOR optimum is undefined for a divergent Jacobi iteration.
    #[error("spectral radius {radius} >= 1, optimal relaxation is undefined")]
    SpectralRadiusTooLarge {
        /// Estimated spectral radius of the Jacobi iteration matrix
        radius: f64,
    },

    /// A division produced a non-finite value (zero derivative, flat secant, ...).
    #[error("non-finite value in {context}")]
    NonFinite {
        /// Which step produced the value
        context: &'static str,
    },
}

/// A specialized `Result` type for linear algebra operations.
pub type Result<T> = std::result::Result<T, LinalgError>;

impl LinalgError {
    /// Returns `true` if the caller violated an input contract.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LinalgError::NotSquare { .. }
                | LinalgError::EmptyMatrix
                | LinalgError::DimensionMismatch { .. }
                | LinalgError::NotColumnVector { .. }
                | LinalgError::InvalidRelaxation { .. }
                | LinalgError::InvalidTolerance { .. }
                | LinalgError::NotSymmetric { .. }
                | LinalgError::ZeroVector
                | LinalgError::InvalidInterval { .. }
                | LinalgError::NoSignChange { .. }
                | LinalgError::UnknownMethod { .. }
        )
    }

    /// Returns `true` if the computation itself broke down.
    pub fn is_numerical_error(&self) -> bool {
        !self.is_input_error()
    }

    /// Returns `true` if this error reports a zero pivot or singular matrix.
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            LinalgError::ZeroPivot { .. } | LinalgError::SingularMatrix { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LinalgError::NotSquare { rows: 2, cols: 3 };
        assert_eq!(err.to_string(), "matrix must be square, got 2x3");

        let err = LinalgError::InvalidRelaxation { omega: 2.5 };
        assert_eq!(
            err.to_string(),
            "invalid relaxation parameter: 2.5 (must be in (0, 2))"
        );
    }

    #[test]
    fn test_error_categories() {
        let input = LinalgError::DimensionMismatch {
            expected: 3,
            got: 2,
        };
        let numeric = LinalgError::ZeroPivot {
            index: 0,
            value: 0.0,
        };

        assert!(input.is_input_error());
        assert!(!input.is_numerical_error());
        assert!(numeric.is_numerical_error());
        assert!(numeric.is_singular());
        assert!(!input.is_singular());
    }

    #[test]
    fn test_unknown_method_lists_choices() {
        let err = LinalgError::UnknownMethod {
            tag: "xyz".to_string(),
            expected: "jacobi, gauss-seidel, sor",
        };
        assert!(err.to_string().contains("xyz"));
        assert!(err.to_string().contains("gauss-seidel"));
        assert!(err.is_input_error());
    }
}
