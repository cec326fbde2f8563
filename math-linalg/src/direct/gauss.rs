//! Gaussian elimination solver
//!
//! Reduces the augmented system [A | b] to upper-triangular form and
//! back-substitutes. Partial pivoting selects the largest remaining entry of
//! the active column and records each row exchange.

use super::lu::{back_substitution, eliminate_column, select_pivot_row, swap_rows};
use crate::dense_helpers::{check_len, check_square, column_to_vector, pivot_threshold};
use crate::error::{LinalgError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pivot selection used during elimination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotStrategy {
    /// Use the diagonal entry as-is
    None,
    /// Swap in the row with the largest magnitude entry of the active column
    #[default]
    Partial,
}

impl FromStr for PivotStrategy {
    type Err = LinalgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "no" => Ok(PivotStrategy::None),
            "partial" => Ok(PivotStrategy::Partial),
            _ => Err(LinalgError::UnknownMethod {
                tag: s.to_string(),
                expected: "none, partial",
            }),
        }
    }
}

impl fmt::Display for PivotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotStrategy::None => write!(f, "none"),
            PivotStrategy::Partial => write!(f, "partial"),
        }
    }
}

/// Gaussian elimination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussConfig {
    /// Pivot selection
    pub pivoting: PivotStrategy,
    /// Record the row exchanges performed
    pub trace: bool,
}

impl Default for GaussConfig {
    fn default() -> Self {
        Self {
            pivoting: PivotStrategy::Partial,
            trace: false,
        }
    }
}

/// A row exchange performed while eliminating column `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSwap {
    /// Elimination step (active column)
    pub step: usize,
    /// Row moved into the pivot position
    pub from: usize,
    /// Pivot row
    pub to: usize,
}

impl fmt::Display for RowSwap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} <-> row {}", self.from, self.to)
    }
}

/// Gaussian elimination result
#[derive(Debug, Clone)]
pub struct GaussSolution {
    /// Solution vector
    pub x: Array1<f64>,
    /// Row exchanges in order (empty unless tracing was enabled)
    pub swaps: Vec<RowSwap>,
}

/// Solve Ax = b by Gaussian elimination
///
/// Works on private copies of `a` and `b`.
pub fn gauss_solve(a: &Array2<f64>, b: &Array1<f64>, config: &GaussConfig) -> Result<GaussSolution> {
    let n = check_square(a)?;
    check_len(n, b)?;

    let threshold = pivot_threshold(a);
    let mut a = a.clone();
    let mut b = b.clone();
    let mut swaps = Vec::new();

    for k in 0..n.saturating_sub(1) {
        if config.pivoting == PivotStrategy::Partial {
            let idx = select_pivot_row(&a, k, threshold)?;
            if idx != k {
                swap_rows(&mut a, k, idx);
                b.swap(k, idx);
                if config.trace {
                    let swap = RowSwap {
                        step: k,
                        from: idx,
                        to: k,
                    };
                    log::debug!("Gaussian elimination: {swap}");
                    swaps.push(swap);
                }
            }
        }

        // Multipliers land below the diagonal; back substitution reads only the upper part.
        eliminate_column(&mut a, k, threshold)?;
        let bk = b[k];
        for i in (k + 1)..n {
            b[i] -= a[[i, k]] * bk;
        }
    }

    let x = back_substitution(&a, &b)?;
    Ok(GaussSolution { x, swaps })
}

/// Solve Ax = b where the right-hand side is given as an `n x 1` matrix
pub fn gauss_solve_column(
    a: &Array2<f64>,
    b: &Array2<f64>,
    config: &GaussConfig,
) -> Result<GaussSolution> {
    let n = check_square(a)?;
    let b = column_to_vector(n, b)?;
    gauss_solve(a, &b, config)
}

/// Gaussian elimination without pivoting
pub fn gaussian_elimination(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let config = GaussConfig {
        pivoting: PivotStrategy::None,
        trace: false,
    };
    gauss_solve(a, b, &config).map(|sol| sol.x)
}

/// Gaussian elimination with partial pivoting, recording row exchanges
pub fn gaussian_elimination_pivoting(a: &Array2<f64>, b: &Array1<f64>) -> Result<GaussSolution> {
    let config = GaussConfig {
        pivoting: PivotStrategy::Partial,
        trace: true,
    };
    gauss_solve(a, b, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_gauss_example_system() {
        let a = array![[4.0, 1.0], [2.0, 3.0]];
        let b = array![1.0, 2.0];

        let x = gaussian_elimination(&a, &b).unwrap();
        assert_relative_eq!(x[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(x[1], 0.6, epsilon = 1e-12);

        let sol = gaussian_elimination_pivoting(&a, &b).unwrap();
        assert_relative_eq!(sol.x[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(sol.x[1], 0.6, epsilon = 1e-12);
        assert!(sol.swaps.is_empty());
    }

    #[test]
    fn test_gauss_inputs_untouched() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![5.0, 6.0];
        let (a0, b0) = (a.clone(), b.clone());
        let _ = gaussian_elimination_pivoting(&a, &b).unwrap();
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn test_pivoting_records_swaps() {
        let a = array![[1.0, 2.0, 1.0], [4.0, 1.0, 0.0], [2.0, 7.0, 3.0]];
        let b = array![4.0, 5.0, 12.0];

        let sol = gaussian_elimination_pivoting(&a, &b).unwrap();
        assert_eq!(
            sol.swaps[0],
            RowSwap {
                step: 0,
                from: 1,
                to: 0
            }
        );
        assert_eq!(sol.swaps[0].to_string(), "row 1 <-> row 0");

        let ax = a.dot(&sol.x);
        for i in 0..3 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_swaps_not_recorded_without_trace() {
        let a = array![[1.0, 2.0], [4.0, 1.0]];
        let b = array![3.0, 5.0];
        let config = GaussConfig {
            pivoting: PivotStrategy::Partial,
            trace: false,
        };
        let sol = gauss_solve(&a, &b, &config).unwrap();
        assert!(sol.swaps.is_empty());
        let traced = gaussian_elimination_pivoting(&a, &b).unwrap();
        assert_eq!(traced.swaps.len(), 1);
        assert_eq!(sol.x, traced.x);
    }

    #[test]
    fn test_zero_pivot_without_pivoting() {
        let a = array![[0.0, 1.0], [1.0, 1.0]];
        let b = array![1.0, 2.0];
        let err = gaussian_elimination(&a, &b).unwrap_err();
        assert!(err.is_singular());

        let sol = gaussian_elimination_pivoting(&a, &b).unwrap();
        assert_relative_eq!(sol.x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(sol.x[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tiny_scale_system_and_singular_column() {
        let a = array![[1.0, 2.0, 1.0], [4.0, 1.0, 0.0], [2.0, 7.0, 3.0]].mapv(|v| v * 1e-36);
        let x_true = array![1.0, -1.0, 2.0];
        let b = a.dot(&x_true);
        let unpivoted = GaussConfig {
            pivoting: PivotStrategy::None,
            trace: false,
        };
        for config in [GaussConfig::default(), unpivoted] {
            let sol = gauss_solve(&a, &b, &config).unwrap();
            for i in 0..3 {
                assert_relative_eq!(sol.x[i], x_true[i], epsilon = 1e-10);
            }
        }

        let singular = array![[0.0, 1.0], [0.0, 2.0]];
        assert_eq!(
            gaussian_elimination_pivoting(&singular, &array![1.0, 2.0]).unwrap_err(),
            LinalgError::SingularMatrix { column: 0 }
        );
    }

    #[test]
    fn test_input_contract() {
        let rect = Array2::<f64>::zeros((2, 3));
        let b = array![1.0, 2.0];
        assert!(gaussian_elimination(&rect, &b).unwrap_err().is_input_error());

        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let short = array![1.0];
        assert!(gaussian_elimination(&a, &short).unwrap_err().is_input_error());

        let wide_rhs = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(
            gauss_solve_column(&a, &wide_rhs, &GaussConfig::default()).unwrap_err(),
            LinalgError::NotColumnVector { cols: 2 }
        );
    }

    #[test]
    fn test_column_rhs() {
        let a = array![[4.0, 1.0], [2.0, 3.0]];
        let b = array![[1.0], [2.0]];
        let sol = gauss_solve_column(&a, &b, &GaussConfig::default()).unwrap();
        assert_relative_eq!(sol.x[1], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_pivot_strategy_parse() {
        assert_eq!("partial".parse::<PivotStrategy>().unwrap(), PivotStrategy::Partial);
        assert_eq!("None".parse::<PivotStrategy>().unwrap(), PivotStrategy::None);
        assert!("full".parse::<PivotStrategy>().unwrap_err().is_input_error());
    }
}
