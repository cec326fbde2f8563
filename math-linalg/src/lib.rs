//! Dense numerical linear algebra
//!
//! This crate provides direct and iterative solvers for small dense systems
//! together with classical eigenvalue iterations, each reporting a
//! per-iteration trace for diagnostics.
//!
//! # Features
//!
//! - **Factorization**: LU without pivoting and with partial pivoting
//! - **Direct Solvers**: Gaussian elimination (optionally pivoted, with a row-swap log), LU solve
//! - **Stationary Solvers**: Jacobi, Gauss-Seidel, SOR, optimal SOR relaxation
//! - **Eigenvalues**: LR and QR transforms, cyclic and max-pivot Jacobi rotations, power iteration
//! - **Scalar Roots**: bisection, regula falsi, secant, Newton, fixed-point iteration
//! - **Problem Files**: JSON description of a matrix, method and settings
//!
//! Non-convergence is never an error: every iterative result carries a
//! `converged` flag, the final error measure and the full trace.
//!
//! # Example
//!
//! ```
//! use math_linalg::{StationaryConfig, gauss_seidel, lu_solve};
//! use ndarray::array;
//!
//! let a = array![[4.0, 1.0], [2.0, 3.0]];
//! let b = array![1.0, 2.0];
//! let x = lu_solve(&a, &b).unwrap();
//! assert!((x[0] - 0.1).abs() < 1e-12);
//!
//! let config = StationaryConfig { tolerance: 1e-10, ..Default::default() };
//! let sol = gauss_seidel(&a, &b, &array![0.0, 0.0], &config).unwrap();
//! assert!(sol.converged);
//! ```

pub mod config;
pub mod dense_helpers;
pub mod direct;
pub mod eigen;
pub mod error;
pub mod iterative;
pub mod roots;
pub mod trace;
pub mod traits;

pub use error::{LinalgError, Result};
pub use trace::{ConvergenceState, IterationTrace, Snapshot};
pub use traits::{HouseholderQr, QrFactorizer};

#[cfg(feature = "ndarray-linalg")]
pub use traits::LapackQr;

// Re-export direct solvers
pub use direct::{
    GaussConfig, GaussSolution, LuFactors, PivotStrategy, PivotedLuFactors, RowSwap, determinant,
    gauss_solve, gaussian_elimination, gaussian_elimination_pivoting, lu_decompose,
    lu_decompose_pivoting, lu_solve,
};

// Re-export stationary solvers
pub use iterative::{
    SpectralRadiusConfig, SpectralRadiusEstimate, StationaryConfig, StationaryMethod,
    StationarySolution, gauss_seidel, jacobi, sor, sor_optimal_omega,
};

// Re-export eigenvalue iterations
pub use eigen::{
    EigenConfig, EigenSolution, PowerIterationConfig, PowerIterationSolution, RotationConfig,
    RotationStrategy, jacobi_rotation, lr_transform, qr_transform, rayleigh_quotient_iteration,
};

pub use config::{ConfigError, MethodTag, ProblemFile, RunReport};
pub use roots::{RootConfig, RootMethod, RootSolution};
