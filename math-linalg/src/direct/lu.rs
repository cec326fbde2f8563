//! LU decomposition solver
//!
//! Outer-product LU factorization with and without partial pivoting, and the
//! forward/back substitution solve built on the non-pivoted factors.

use crate::dense_helpers::{
    PIVOT_EPSILON, apply_row_permutation, argmax_abs, check_len, check_pivot, check_square,
    permutation_matrix, pivot_threshold,
};
use crate::error::{LinalgError, Result};
use ndarray::{Array1, Array2, s};

/// LU factorization result: A = L * U
#[derive(Debug, Clone)]
pub struct LuFactors {
    /// Unit lower-triangular factor
    pub l: Array2<f64>,
    /// Upper-triangular factor
    pub u: Array2<f64>,
}

/// LU factorization with partial pivoting: P * A = L * U
#[derive(Debug, Clone)]
pub struct PivotedLuFactors {
    /// Unit lower-triangular factor
    pub l: Array2<f64>,
    /// Upper-triangular factor
    pub u: Array2<f64>,
    /// Row `i` of P * A is row `permutation[i]` of A
    pub permutation: Vec<usize>,
    /// Number of row swaps performed
    pub swaps: usize,
}

impl LuFactors {
    /// Matrix dimension
    pub fn n(&self) -> usize {
        self.l.nrows()
    }

    /// Compute L * U
    pub fn reconstruct(&self) -> Array2<f64> {
        self.l.dot(&self.u)
    }

    /// Solve Ax = b using the pre-computed factors
    pub fn solve(&self, b: &Array1<f64>) -> Result<Array1<f64>> {
        check_len(self.n(), b)?;
        let y = forward_substitution(&self.l, b);
        back_substitution(&self.u, &y)
    }

    /// Product of the diagonal of U
    pub fn determinant(&self) -> f64 {
        self.u.diag().iter().product()
    }
}

impl PivotedLuFactors {
    /// Matrix dimension
    pub fn n(&self) -> usize {
        self.l.nrows()
    }

    /// Compute L * U (equals P * A)
    pub fn reconstruct(&self) -> Array2<f64> {
        self.l.dot(&self.u)
    }

    /// Permutation matrix P
    pub fn permutation_matrix(&self) -> Array2<f64> {
        permutation_matrix(&self.permutation)
    }

    /// Apply the recorded row permutation to `a`
    pub fn permute_rows(&self, a: &Array2<f64>) -> Array2<f64> {
        apply_row_permutation(a, &self.permutation)
    }

    /// Solve Ax = b using the pre-computed factors
    pub fn solve(&self, b: &Array1<f64>) -> Result<Array1<f64>> {
        check_len(self.n(), b)?;
        let pb: Array1<f64> = self.permutation.iter().map(|&src| b[src]).collect();
        let y = forward_substitution(&self.l, &pb);
        back_substitution(&self.u, &y)
    }

    /// Determinant of A, accounting for the permutation sign
    pub fn determinant(&self) -> f64 {
        let sign = if self.swaps % 2 == 0 { 1.0 } else { -1.0 };
        sign * self.u.diag().iter().product::<f64>()
    }
}

/// One outer-product elimination step on column `k`.
///
/// Multipliers are stored in place below the pivot; the trailing
/// submatrix is updated.
pub(crate) fn eliminate_column(work: &mut Array2<f64>, k: usize, threshold: f64) -> Result<()> {
    let n = work.nrows();
    let pivot = work[[k, k]];
    check_pivot(k, pivot, threshold)?;

    for i in (k + 1)..n {
        let mult = work[[i, k]] / pivot;
        work[[i, k]] = mult;
        for j in (k + 1)..n {
            let update = mult * work[[k, j]];
            work[[i, j]] -= update;
        }
    }
    Ok(())
}

/// Separate packed storage into unit-lower L and upper U.
fn unpack(work: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
    let n = work.nrows();
    let mut l = Array2::<f64>::eye(n);
    let mut u = Array2::<f64>::zeros((n, n));
    for ((i, j), &v) in work.indexed_iter() {
        if j < i {
            l[[i, j]] = v;
        } else {
            u[[i, j]] = v;
        }
    }
    (l, u)
}

/// LU factorization without pivoting
///
/// Fails with [`LinalgError::ZeroPivot`] when a pivot used as a divisor is
/// (numerically) zero. The last diagonal entry of U is never a divisor here,
/// so a singular matrix may still factor; [`LuFactors::solve`] reports it.
pub fn lu_decompose(a: &Array2<f64>) -> Result<LuFactors> {
    let n = check_square(a)?;
    let threshold = pivot_threshold(a);
    let mut work = a.clone();

    for k in 0..n.saturating_sub(1) {
        eliminate_column(&mut work, k, threshold)?;
    }

    let (l, u) = unpack(&work);
    Ok(LuFactors { l, u })
}

/// LU factorization with partial pivoting
///
/// At each column the remaining row with the largest magnitude entry is
/// swapped into the pivot position; ties go to the first such row.
pub fn lu_decompose_pivoting(a: &Array2<f64>) -> Result<PivotedLuFactors> {
    let n = check_square(a)?;
    let threshold = pivot_threshold(a);
    let mut work = a.clone();
    let mut permutation: Vec<usize> = (0..n).collect();
    let mut swaps = 0;

    for k in 0..n.saturating_sub(1) {
        let max_row = select_pivot_row(&work, k, threshold)?;
        if max_row != k {
            swap_rows(&mut work, k, max_row);
            permutation.swap(k, max_row);
            swaps += 1;
            log::debug!("LU pivoting: row {max_row} <-> row {k}");
        }

        eliminate_column(&mut work, k, threshold)?;
    }

    let (l, u) = unpack(&work);
    Ok(PivotedLuFactors {
        l,
        u,
        permutation,
        swaps,
    })
}

/// Row at or below `k` holding the largest magnitude entry of column `k`.
///
/// Ties go to the first such row. Fails with [`LinalgError::SingularMatrix`]
/// when the whole active column is at or below `threshold`.
pub(crate) fn select_pivot_row(work: &Array2<f64>, k: usize, threshold: f64) -> Result<usize> {
    let (offset, max_val) = argmax_abs(work.slice(s![k.., k]).iter().copied())
        .ok_or(LinalgError::SingularMatrix { column: k })?;
    if !(max_val > threshold) {
        return Err(LinalgError::SingularMatrix { column: k });
    }
    Ok(k + offset)
}

/// Swap two rows of a matrix in place.
pub(crate) fn swap_rows(m: &mut Array2<f64>, r1: usize, r2: usize) {
    if r1 == r2 {
        return;
    }
    for j in 0..m.ncols() {
        m.swap([r1, j], [r2, j]);
    }
}

/// Solve L y = b for unit lower-triangular L.
pub fn forward_substitution(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let mut y = b.clone();
    for i in 0..n {
        for j in 0..i {
            let l_ij = l[[i, j]];
            y[i] -= l_ij * y[j];
        }
    }
    y
}

/// Pivot threshold from the upper triangle only; packed storage may hold
/// multipliers below the diagonal.
fn upper_pivot_threshold(u: &Array2<f64>) -> f64 {
    let max_abs = u
        .indexed_iter()
        .filter(|((i, j), _)| j >= i)
        .fold(0.0_f64, |m, (_, v)| m.max(v.abs()));
    max_abs * PIVOT_EPSILON
}

/// Solve U x = y for upper-triangular U.
pub fn back_substitution(u: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
    let n = y.len();
    let threshold = upper_pivot_threshold(u);
    let mut x = y.clone();
    for i in (0..n).rev() {
        for j in (i + 1)..n {
            let u_ij = u[[i, j]];
            x[i] -= u_ij * x[j];
        }
        let u_ii = u[[i, i]];
        check_pivot(i, u_ii, threshold)?;
        x[i] /= u_ii;
    }
    Ok(x)
}

/// Solve Ax = b using LU decomposition (no pivoting)
///
/// Factor A = L * U, then L y = b by forward and U x = y by back substitution.
pub fn lu_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = check_square(a)?;
    check_len(n, b)?;
    let factors = lu_decompose(a)?;
    factors.solve(b)
}

/// Determinant via pivoted LU; a singular matrix has determinant 0.
pub fn determinant(a: &Array2<f64>) -> Result<f64> {
    match lu_decompose_pivoting(a) {
        Ok(factors) => Ok(factors.determinant()),
        Err(LinalgError::SingularMatrix { .. }) => Ok(0.0),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense_helpers::{is_lower_triangular, is_upper_triangular};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn assert_matrix_eq(a: &Array2<f64>, b: &Array2<f64>) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_lu_structure_and_reconstruction() {
        let a = array![[4.0, 3.0, 2.0], [2.0, 4.0, 1.0], [1.0, 2.0, 5.0]];
        let lu = lu_decompose(&a).expect("factorization should succeed");

        assert!(is_lower_triangular(&lu.l, 0.0));
        assert!(is_upper_triangular(&lu.u, 0.0));
        for i in 0..3 {
            assert_eq!(lu.l[[i, i]], 1.0);
        }
        assert_matrix_eq(&lu.reconstruct(), &a);
    }

    #[test]
    fn test_lu_known_factors() {
        let a = array![[4.0, 1.0], [2.0, 3.0]];
        let lu = lu_decompose(&a).unwrap();
        assert_relative_eq!(lu.l[[1, 0]], 0.5);
        assert_relative_eq!(lu.u[[1, 1]], 2.5);
        assert_relative_eq!(lu.determinant(), 10.0);
    }

    #[test]
    fn test_lu_does_not_mutate_input() {
        let a = array![[4.0, 1.0], [2.0, 3.0]];
        let copy = a.clone();
        let _ = lu_decompose(&a).unwrap();
        let _ = lu_decompose_pivoting(&a).unwrap();
        assert_eq!(a, copy);
    }

    #[test]
    fn test_lu_zero_pivot_fails() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let err = lu_decompose(&a).unwrap_err();
        assert_eq!(
            err,
            LinalgError::ZeroPivot {
                index: 0,
                value: 0.0
            }
        );
        assert!(err.is_numerical_error());
    }

    #[test]
    fn test_pivoting_handles_zero_leading_entry() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let lu = lu_decompose_pivoting(&a).unwrap();
        assert_eq!(lu.permutation, vec![1, 0]);
        assert_eq!(lu.swaps, 1);
        assert_matrix_eq(&lu.reconstruct(), &lu.permute_rows(&a));
        assert_matrix_eq(&lu.permutation_matrix().dot(&a), &lu.reconstruct());
        assert_relative_eq!(lu.determinant(), -1.0);
    }

    #[test]
    fn test_pivoting_reconstruction() {
        let a = array![
            [1.0, 2.0, 3.0, 4.0],
            [4.0, 1.0, 2.0, 0.5],
            [2.0, 8.0, 1.0, 3.0],
            [3.0, 1.0, 7.0, 2.0]
        ];
        let lu = lu_decompose_pivoting(&a).unwrap();

        assert!(is_upper_triangular(&lu.u, 0.0));
        assert!(is_lower_triangular(&lu.l, 0.0));
        for v in lu.l.iter() {
            assert!(v.abs() <= 1.0 + 1e-12, "partial pivoting bounds |L| by 1");
        }
        let mut sorted = lu.permutation.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
        assert_matrix_eq(&lu.reconstruct(), &lu.permute_rows(&a));
    }

    #[test]
    fn test_pivoting_tie_break_first_index() {
        // Column 0 has |2| at rows 1 and 2; the first one must be chosen.
        let a = array![[1.0, 1.0, 1.0], [2.0, 1.0, 0.0], [-2.0, 0.0, 1.0]];
        let lu = lu_decompose_pivoting(&a).unwrap();
        assert_eq!(lu.permutation[0], 1);
    }

    #[test]
    fn test_pivoting_singular_column() {
        let a = array![[0.0, 1.0], [0.0, 2.0]];
        assert_eq!(
            lu_decompose_pivoting(&a).unwrap_err(),
            LinalgError::SingularMatrix { column: 0 }
        );
    }

    #[test]
    fn test_select_pivot_row() {
        let a = array![[1.0, 0.0, 0.0], [-3.0, 0.0, 0.0], [3.0, 0.0, 0.0]];
        assert_eq!(select_pivot_row(&a, 0, 0.0).unwrap(), 1);
        assert_eq!(select_pivot_row(&a, 2, 0.0).unwrap(), 2);
        assert_eq!(
            select_pivot_row(&a, 1, 0.0).unwrap_err(),
            LinalgError::SingularMatrix { column: 1 }
        );
        // below the threshold counts as zero
        assert!(select_pivot_row(&a, 0, 5.0).is_err());
    }

    #[test]
    fn test_tiny_scale_matrix_is_not_singular() {
        let a = array![[4.0, 1.0], [2.0, 3.0]].mapv(|v| v * 1e-35);
        let b = array![1.0, 2.0].mapv(|v| v * 1e-35);

        let x = lu_solve(&a, &b).unwrap();
        assert_relative_eq!(x[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(x[1], 0.6, epsilon = 1e-12);

        let lu = lu_decompose_pivoting(&a).unwrap();
        assert_relative_eq!(lu.determinant(), 10e-70, max_relative = 1e-12);

        let singular = array![[1.0, 2.0], [2.0, 4.0]].mapv(|v| v * 1e-35);
        assert!(lu_solve(&singular, &b).is_err());
        assert_eq!(determinant(&singular).unwrap(), 0.0);
    }

    #[test]
    fn test_lu_solve_real() {
        let a = array![[4.0_f64, 1.0], [2.0, 3.0]];
        let b = array![1.0_f64, 2.0];

        let x = lu_solve(&a, &b).expect("LU solve should succeed");
        assert_relative_eq!(x[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(x[1], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_lu_identity() {
        let n = 5;
        let a = Array2::from_diag(&Array1::from_elem(n, 1.0_f64));
        let b = Array1::from_iter((1..=n).map(|i| i as f64));

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        for i in 0..n {
            assert_relative_eq!(x[i], b[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_lu_singular() {
        let a = array![[1.0_f64, 2.0], [2.0, 4.0]];
        let b = array![1.0_f64, 2.0];

        let result = lu_solve(&a, &b);
        assert!(result.is_err());
    }

    #[test]
    fn test_lu_dimension_mismatch() {
        let a = array![[1.0_f64, 0.0], [0.0, 1.0]];
        let b = array![1.0_f64, 2.0, 3.0];
        assert_eq!(
            lu_solve(&a, &b).unwrap_err(),
            LinalgError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn test_pivoted_factors_solve_multiple_rhs() {
        let a = array![[0.0_f64, 1.0, 2.0], [1.0, 3.0, 1.0], [4.0, 1.0, 2.0]];
        let factors = lu_decompose_pivoting(&a).expect("Factorization should succeed");

        for b in [array![1.0_f64, 2.0, 3.0], array![4.0_f64, 5.0, 6.0]] {
            let x = factors.solve(&b).expect("Solve should succeed");
            let ax = a.dot(&x);
            for i in 0..3 {
                assert_relative_eq!(ax[i], b[i], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_determinant() {
        let a = array![[2.0, 1.0], [1.0, 4.0]];
        assert_relative_eq!(determinant(&a).unwrap(), 7.0, epsilon = 1e-12);

        let singular = array![[1.0, 2.0], [2.0, 4.0]];
        assert_relative_eq!(determinant(&singular).unwrap(), 0.0, epsilon = 1e-12);
    }
}
