//! Direct solvers for linear systems
//!
//! This module provides direct (non-iterative) factorizations and solvers:
//! - [`lu_decompose`] / [`lu_decompose_pivoting`]: LU factorization without and with partial pivoting
//! - [`lu_solve`]: forward/back substitution on the non-pivoted LU factors
//! - [`gauss_solve`]: Gaussian elimination on the augmented system, optionally pivoted

mod gauss;
mod lu;

pub use gauss::{
    GaussConfig, GaussSolution, PivotStrategy, RowSwap, gauss_solve, gauss_solve_column,
    gaussian_elimination, gaussian_elimination_pivoting,
};
pub use lu::{
    LuFactors, PivotedLuFactors, back_substitution, determinant, forward_substitution,
    lu_decompose, lu_decompose_pivoting, lu_solve,
};
