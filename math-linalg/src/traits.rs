//! Collaborator traits
//!
//! The QR transform delegates the orthogonal factorization to a
//! [`QrFactorizer`]. Two implementations are provided:
//! - [`HouseholderQr`]: pure Rust, always available
//! - `LapackQr`: LAPACK `geqrf`/`orgqr` through `ndarray-linalg` (feature `ndarray-linalg`)

use crate::dense_helpers::{check_square, pivot_threshold, vector_norm};
use crate::error::Result;
use ndarray::{Array2, s};

/// Full QR factorization of a square matrix: A = Q * R.
///
/// `Q` must be orthogonal and `R` upper triangular.
pub trait QrFactorizer: Send + Sync {
    /// Factor `a` into `(Q, R)`.
    fn qr_factorize(&self, a: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>)>;
}

/// Householder-reflection QR factorization
#[derive(Clone, Debug, Default)]
pub struct HouseholderQr;

impl QrFactorizer for HouseholderQr {
    fn qr_factorize(&self, a: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
        let n = check_square(a)?;
        let threshold = pivot_threshold(a);
        let mut r = a.clone();
        let mut q = Array2::<f64>::eye(n);

        for k in 0..n.saturating_sub(1) {
            let x = r.slice(s![k.., k]).to_owned();
            let norm_x = vector_norm(&x);
            if !(norm_x > threshold) {
                continue;
            }

            // Reflect x onto -sign(x_0) * ||x|| * e_0 to avoid cancellation
            let alpha = if x[0] >= 0.0 { -norm_x } else { norm_x };
            let mut v = x;
            v[0] -= alpha;
            let v_norm = vector_norm(&v);
            if !(v_norm > threshold) {
                continue;
            }
            v.mapv_inplace(|vi| vi / v_norm);

            // R <- H_k R
            let mut r_sub = r.slice_mut(s![k.., ..]);
            let w = v.dot(&r_sub);
            for (i, &vi) in v.iter().enumerate() {
                for (j, &wj) in w.iter().enumerate() {
                    r_sub[[i, j]] -= 2.0 * vi * wj;
                }
            }

            // Q <- Q H_k
            let mut q_sub = q.slice_mut(s![.., k..]);
            let qv = q_sub.dot(&v);
            for (i, &qvi) in qv.iter().enumerate() {
                for (j, &vj) in v.iter().enumerate() {
                    q_sub[[i, j]] -= 2.0 * qvi * vj;
                }
            }
        }

        for ((i, j), rij) in r.indexed_iter_mut() {
            if j < i {
                *rij = 0.0;
            }
        }

        Ok((q, r))
    }
}

/// LAPACK-backed QR factorization
#[cfg(feature = "ndarray-linalg")]
#[derive(Clone, Debug, Default)]
pub struct LapackQr;

#[cfg(feature = "ndarray-linalg")]
impl QrFactorizer for LapackQr {
    fn qr_factorize(&self, a: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
        use ndarray_linalg::QR;

        check_square(a)?;
        a.qr().map_err(|e| {
            log::warn!("LAPACK QR failed: {e}");
            crate::error::LinalgError::NonFinite {
                context: "LAPACK QR factorization",
            }
        })
    }
}
