//! Dense matrix and vector helpers
//!
//! Shape validation, norms, structural predicates, the D/L/U splitting and
//! triangular solves shared by the factorization, stationary and eigenvalue
//! modules.

use crate::error::{LinalgError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Pivot magnitude, relative to the largest entry of the matrix, below which
/// a pivot or diagonal entry is treated as zero.
pub const PIVOT_EPSILON: f64 = 1e-30;

/// Absolute pivot threshold for `a`: [`PIVOT_EPSILON`] times its largest magnitude entry.
///
/// Scaling a matrix scales the threshold with it; the zero matrix gets 0.
pub fn pivot_threshold(a: &Array2<f64>) -> f64 {
    a.iter().fold(0.0_f64, |m, v| m.max(v.abs())) * PIVOT_EPSILON
}

/// Check that `a` is a non-empty square matrix and return its dimension.
pub fn check_square(a: &Array2<f64>) -> Result<usize> {
    let (rows, cols) = a.dim();
    if rows == 0 {
        return Err(LinalgError::EmptyMatrix);
    }
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    Ok(rows)
}

/// Check that a vector has length `n`.
pub fn check_len(n: usize, v: &Array1<f64>) -> Result<()> {
    if v.len() != n {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: v.len(),
        });
    }
    Ok(())
}

/// Check that a tolerance is usable.
pub fn check_tolerance(tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(LinalgError::InvalidTolerance { tolerance });
    }
    Ok(())
}

/// Convert an `n x 1` matrix into a vector of length `n`.
pub fn column_to_vector(n: usize, b: &Array2<f64>) -> Result<Array1<f64>> {
    let (rows, cols) = b.dim();
    if cols != 1 {
        return Err(LinalgError::NotColumnVector { cols });
    }
    if rows != n {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: rows,
        });
    }
    Ok(b.column(0).to_owned())
}

/// Return an error if `value` cannot be used as a divisor.
///
/// `threshold` comes from [`pivot_threshold`] of the matrix being factored.
#[inline]
pub fn check_pivot(index: usize, value: f64, threshold: f64) -> Result<()> {
    if !value.is_finite() || !(value.abs() > threshold) {
        return Err(LinalgError::ZeroPivot { index, value });
    }
    Ok(())
}

/// Compute inner product (x, y) = Σ x_i * y_i
#[inline]
pub fn inner_product(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    assert_eq!(
        x.len(),
        y.len(),
        "Vector lengths must match for inner product"
    );
    x.iter().zip(y.iter()).map(|(xi, yi)| xi * yi).sum()
}

/// Compute vector 2-norm: ||x||_2 = sqrt(Σ x_i^2)
#[inline]
pub fn vector_norm(x: &Array1<f64>) -> f64 {
    x.iter().map(|xi| xi * xi).sum::<f64>().sqrt()
}

/// Frobenius norm of a matrix view.
pub fn frobenius_norm(a: ArrayView2<'_, f64>) -> f64 {
    a.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Frobenius norm of the strictly lower triangle (entries with j < i).
pub fn strict_lower_frobenius(a: &Array2<f64>) -> f64 {
    let mut sum = 0.0_f64;
    for ((i, j), v) in a.indexed_iter() {
        if j < i {
            sum += v * v;
        }
    }
    sum.sqrt()
}

/// `true` if every entry below the diagonal has magnitude at most `tol`.
pub fn is_upper_triangular(a: &Array2<f64>, tol: f64) -> bool {
    a.indexed_iter()
        .filter(|((i, j), _)| j < i)
        .all(|(_, v)| v.abs() <= tol)
}

/// `true` if every entry above the diagonal has magnitude at most `tol`.
pub fn is_lower_triangular(a: &Array2<f64>, tol: f64) -> bool {
    a.indexed_iter()
        .filter(|((i, j), _)| j > i)
        .all(|(_, v)| v.abs() <= tol)
}

/// Frobenius norm of A - A^T.
pub fn asymmetry(a: &Array2<f64>) -> f64 {
    let diff = a - &a.t();
    frobenius_norm(diff.view())
}

/// Check symmetry within `tol`; non-square input is rejected first.
pub fn check_symmetric(a: &Array2<f64>, tol: f64) -> Result<usize> {
    let n = check_square(a)?;
    let asym = asymmetry(a);
    if !(asym < tol) {
        return Err(LinalgError::NotSymmetric { asymmetry: asym });
    }
    Ok(n)
}

/// Strict lower triangle of `a` (diagonal and above zeroed).
pub fn strict_lower(a: &Array2<f64>) -> Array2<f64> {
    let mut l = a.clone();
    for ((i, j), v) in l.indexed_iter_mut() {
        if j >= i {
            *v = 0.0;
        }
    }
    l
}

/// Strict upper triangle of `a` (diagonal and below zeroed).
pub fn strict_upper(a: &Array2<f64>) -> Array2<f64> {
    let mut u = a.clone();
    for ((i, j), v) in u.indexed_iter_mut() {
        if j <= i {
            *v = 0.0;
        }
    }
    u
}

/// Split `a` into its diagonal, strict lower and strict upper parts.
pub fn split_dlu(a: &Array2<f64>) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
    let d = Array2::from_diag(&a.diag());
    (d, strict_lower(a), strict_upper(a))
}

/// Solve T * X = B for lower-triangular `t` with a general diagonal.
///
/// Every column of `rhs` is solved by forward substitution.
pub fn solve_lower_triangular(t: &Array2<f64>, rhs: &Array2<f64>) -> Result<Array2<f64>> {
    let n = check_square(t)?;
    if rhs.nrows() != n {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: rhs.nrows(),
        });
    }
    let threshold = pivot_threshold(t);
    for i in 0..n {
        check_pivot(i, t[[i, i]], threshold)?;
    }

    let mut x = rhs.clone();
    for mut col in x.axis_iter_mut(Axis(1)) {
        for i in 0..n {
            let mut acc = col[i];
            for j in 0..i {
                acc -= t[[i, j]] * col[j];
            }
            col[i] = acc / t[[i, i]];
        }
    }
    Ok(x)
}

/// Solve T * x = b for lower-triangular `t` with a general diagonal.
pub fn solve_lower_triangular_vec(t: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let rhs = b.clone().insert_axis(Axis(1));
    let x = solve_lower_triangular(t, &rhs)?;
    Ok(x.column(0).to_owned())
}

/// Row-permute `a` so that row `i` of the result is row `perm[i]` of `a`.
pub fn apply_row_permutation(a: &Array2<f64>, perm: &[usize]) -> Array2<f64> {
    a.select(Axis(0), perm)
}

/// Permutation matrix P with P * A = `apply_row_permutation(A, perm)`.
pub fn permutation_matrix(perm: &[usize]) -> Array2<f64> {
    let n = perm.len();
    let mut p = Array2::zeros((n, n));
    for (i, &src) in perm.iter().enumerate() {
        p[[i, src]] = 1.0;
    }
    p
}

/// Index of the first entry with the largest magnitude.
pub fn argmax_abs(values: impl IntoIterator<Item = f64>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, v) in values.into_iter().enumerate() {
        let mag = v.abs();
        match best {
            Some((_, m)) if mag <= m => {}
            _ => best = Some((idx, mag)),
        }
    }
    best
}
