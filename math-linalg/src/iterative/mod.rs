//! Iterative solvers for linear systems
//!
//! This module provides stationary (splitting-based) methods:
//! - [`jacobi`]: Jacobi iteration, H = -D^(-1)(L + U)
//! - [`gauss_seidel`]: Gauss-Seidel iteration, H = -(L + D)^(-1) U
//! - [`sor`]: successive over-relaxation with parameter ω in (0, 2)
//! - [`sor_optimal_omega`]: optimal ω from the Jacobi spectral radius

mod relaxation;
mod splitting;
mod stationary;

pub use relaxation::{
    SpectralRadiusConfig, SpectralRadiusEstimate, optimal_omega_from_radius, sor_optimal_omega,
    spectral_radius,
};
pub use splitting::{Splitting, StationaryMethod};
pub use stationary::{
    StationaryConfig, StationarySolution, StationarySolver, StationaryState, gauss_seidel, jacobi,
    sor, stationary_solve,
};
