//! Matrix splittings for stationary iterations
//!
//! A = D + L + U is split into M - N with M lower triangular, giving the
//! fixed-point map x <- H x + g with H = M^(-1) N and g = M^(-1) c:
//!
//! | method       | M        | N                | c    |
//! |--------------|----------|------------------|------|
//! | Jacobi       | D        | -(L + U)         | b    |
//! | Gauss-Seidel | L + D    | -U               | b    |
//! | SOR(ω)       | ωL + D   | (1 - ω)D - ωU    | ωb   |
//!
//! M is inverted by forward substitution, never explicitly.

use crate::dense_helpers::{
    check_len, check_square, solve_lower_triangular, solve_lower_triangular_vec, split_dlu,
};
use crate::error::{LinalgError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stationary iteration scheme
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum StationaryMethod {
    /// Jacobi iteration
    Jacobi,
    /// Gauss-Seidel iteration
    GaussSeidel,
    /// Successive over-relaxation with parameter ω in (0, 2)
    Sor {
        /// Relaxation parameter
        omega: f64,
    },
}

impl StationaryMethod {
    /// Reject a relaxation parameter outside (0, 2).
    pub fn validate(&self) -> Result<()> {
        if let StationaryMethod::Sor { omega } = *self {
            if !(omega > 0.0 && omega < 2.0) {
                return Err(LinalgError::InvalidRelaxation { omega });
            }
        }
        Ok(())
    }

    /// Short name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            StationaryMethod::Jacobi => "Jacobi",
            StationaryMethod::GaussSeidel => "Gauss-Seidel",
            StationaryMethod::Sor { .. } => "SOR",
        }
    }
}

impl fmt::Display for StationaryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationaryMethod::Sor { omega } => write!(f, "sor={omega}"),
            StationaryMethod::Jacobi => write!(f, "jacobi"),
            StationaryMethod::GaussSeidel => write!(f, "gauss-seidel"),
        }
    }
}

const STATIONARY_TAGS: &str = "jacobi, gauss-seidel, sor=<omega>";

impl FromStr for StationaryMethod {
    type Err = LinalgError;

    /// Parse `jacobi`, `gauss-seidel` (or `gs`), or `sor=<omega>`.
    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase();
        let unknown = || LinalgError::UnknownMethod {
            tag: s.to_string(),
            expected: STATIONARY_TAGS,
        };

        let method = match tag.as_str() {
            "jacobi" => StationaryMethod::Jacobi,
            "gauss-seidel" | "gauss_seidel" | "gs" => StationaryMethod::GaussSeidel,
            other => {
                let omega = other
                    .strip_prefix("sor=")
                    .ok_or_else(unknown)?
                    .parse::<f64>()
                    .map_err(|_| unknown())?;
                StationaryMethod::Sor { omega }
            }
        };
        method.validate()?;
        Ok(method)
    }
}

/// Iteration matrix and vector of a stationary method
#[derive(Debug, Clone)]
pub struct Splitting {
    /// Method the splitting was built for
    pub method: StationaryMethod,
    /// Iteration matrix H
    pub h: Array2<f64>,
    /// Constant term g
    pub g: Array1<f64>,
}

impl Splitting {
    /// Build H and g for `method` from A and b
    pub fn new(a: &Array2<f64>, b: &Array1<f64>, method: StationaryMethod) -> Result<Self> {
        let n = check_square(a)?;
        check_len(n, b)?;
        method.validate()?;

        let (d, l, u) = split_dlu(a);
        let (m, nmat, c) = match method {
            StationaryMethod::Jacobi => (d, -(&l + &u), b.clone()),
            StationaryMethod::GaussSeidel => (&l + &d, -u, b.clone()),
            StationaryMethod::Sor { omega } => {
                let m = &l * omega + &d;
                let nmat = &d * (1.0 - omega) - &u * omega;
                (m, nmat, b * omega)
            }
        };

        let h = solve_lower_triangular(&m, &nmat)?;
        let g = solve_lower_triangular_vec(&m, &c)?;
        Ok(Self { method, h, g })
    }

    /// Jacobi iteration matrix -D^(-1)(L + U) alone
    pub fn jacobi_matrix(a: &Array2<f64>) -> Result<Array2<f64>> {
        let n = check_square(a)?;
        let zeros = Array1::zeros(n);
        Ok(Self::new(a, &zeros, StationaryMethod::Jacobi)?.h)
    }

    /// Apply one step of the fixed-point map: H x + g
    pub fn apply(&self, x: &Array1<f64>) -> Array1<f64> {
        self.h.dot(x) + &self.g
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_jacobi_splitting() {
        let a = array![[10.0, 1.0], [2.0, 10.0]];
        let b = array![11.0, 12.0];
        let s = Splitting::new(&a, &b, StationaryMethod::Jacobi).unwrap();

        assert_relative_eq!(s.h[[0, 0]], 0.0);
        assert_relative_eq!(s.h[[0, 1]], -0.1);
        assert_relative_eq!(s.h[[1, 0]], -0.2);
        assert_relative_eq!(s.g[0], 1.1);
        assert_relative_eq!(s.g[1], 1.2);
    }

    #[test]
    fn test_gauss_seidel_splitting() {
        let a = array![[10.0, 1.0], [2.0, 10.0]];
        let b = array![11.0, 12.0];
        let s = Splitting::new(&a, &b, StationaryMethod::GaussSeidel).unwrap();

        // H = -(L + D)^(-1) U has a zero first column
        assert_relative_eq!(s.h[[0, 0]], 0.0);
        assert_relative_eq!(s.h[[1, 0]], 0.0);
        assert_relative_eq!(s.h[[0, 1]], -0.1);
        assert_relative_eq!(s.h[[1, 1]], 0.02, epsilon = 1e-15);
        assert_relative_eq!(s.g[0], 1.1);
        assert_relative_eq!(s.g[1], 0.98, epsilon = 1e-15);
    }

    #[test]
    fn test_sor_with_unit_omega_is_gauss_seidel() {
        let a = array![[4.0, 1.0, 0.0], [1.0, 4.0, 1.0], [0.0, 1.0, 4.0]];
        let b = array![1.0, 2.0, 3.0];
        let gs = Splitting::new(&a, &b, StationaryMethod::GaussSeidel).unwrap();
        let sor = Splitting::new(&a, &b, StationaryMethod::Sor { omega: 1.0 }).unwrap();

        for (x, y) in gs.h.iter().zip(sor.h.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-15);
        }
        for (x, y) in gs.g.iter().zip(sor.g.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_fixed_point_is_solution() {
        let a = array![[4.0, 1.0], [2.0, 3.0]];
        let b = array![1.0, 2.0];
        let x = array![0.1, 0.6];
        for method in [
            StationaryMethod::Jacobi,
            StationaryMethod::GaussSeidel,
            StationaryMethod::Sor { omega: 1.3 },
        ] {
            let s = Splitting::new(&a, &b, method).unwrap();
            let hx = s.apply(&x);
            assert_relative_eq!(hx[0], x[0], epsilon = 1e-12);
            assert_relative_eq!(hx[1], x[1], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_singular_diagonal() {
        let a = array![[0.0, 1.0], [1.0, 2.0]];
        let b = array![1.0, 1.0];
        let err = Splitting::new(&a, &b, StationaryMethod::Jacobi).unwrap_err();
        assert!(err.is_numerical_error());
    }

    #[test]
    fn test_invalid_omega() {
        let a = array![[4.0, 1.0], [2.0, 3.0]];
        let b = array![1.0, 2.0];
        for omega in [0.0, 2.0, -1.0, f64::NAN] {
            let err = Splitting::new(&a, &b, StationaryMethod::Sor { omega }).unwrap_err();
            assert!(err.is_input_error());
        }
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(
            "jacobi".parse::<StationaryMethod>().unwrap(),
            StationaryMethod::Jacobi
        );
        assert_eq!(
            "GS".parse::<StationaryMethod>().unwrap(),
            StationaryMethod::GaussSeidel
        );
        assert_eq!(
            "sor=1.25".parse::<StationaryMethod>().unwrap(),
            StationaryMethod::Sor { omega: 1.25 }
        );
        assert!(matches!(
            "sor=2.5".parse::<StationaryMethod>(),
            Err(LinalgError::InvalidRelaxation { .. })
        ));
        assert!(matches!(
            "richardson".parse::<StationaryMethod>(),
            Err(LinalgError::UnknownMethod { .. })
        ));
    }
}
