//! Stationary iterative solvers (Jacobi, Gauss-Seidel, SOR)
//!
//! All three methods iterate the fixed-point map x <- H x + g of a
//! [`Splitting`]. The loop is an explicit state machine: [`StationarySolver::step`]
//! is a pure function from one [`StationaryState`] to the next, and
//! [`StationarySolver::solve`] drives it until the state is terminal.

use super::splitting::{Splitting, StationaryMethod};
use crate::dense_helpers::{check_len, check_tolerance, vector_norm};
use crate::error::Result;
use crate::trace::{ConvergenceState, IterationTrace};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Stationary solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StationaryConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Absolute tolerance on ||x_k - x_(k+1)||_2
    pub tolerance: f64,
    /// Record every approximation in the trace
    pub trace: bool,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for StationaryConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-3,
            trace: true,
            print_interval: 0,
        }
    }
}

/// Current approximation and convergence state
#[derive(Debug, Clone, PartialEq)]
pub struct StationaryState {
    /// Current approximation
    pub x: Array1<f64>,
    /// Iterations performed so far
    pub iteration: usize,
    /// Euclidean norm of the last update, `None` before the first step
    pub error: Option<f64>,
    /// Where the state machine stands
    pub status: ConvergenceState,
}

/// Stationary solver result
#[derive(Debug, Clone)]
pub struct StationarySolution {
    /// Final approximation
    pub x: Array1<f64>,
    /// Number of iterations
    pub iterations: usize,
    /// Norm of the last update (infinite if no step was taken)
    pub error: f64,
    /// Whether convergence was achieved
    pub converged: bool,
    /// Approximations per iteration, starting with x0 at iteration 0
    pub trace: IterationTrace<Array1<f64>>,
}

/// Stationary iteration bound to one system A x = b
#[derive(Debug, Clone)]
pub struct StationarySolver {
    splitting: Splitting,
    config: StationaryConfig,
}

impl StationarySolver {
    /// Build the iteration matrix for `method`.
    pub fn new(
        a: &Array2<f64>,
        b: &Array1<f64>,
        method: StationaryMethod,
        config: &StationaryConfig,
    ) -> Result<Self> {
        check_tolerance(config.tolerance)?;
        let splitting = Splitting::new(a, b, method)?;
        Ok(Self {
            splitting,
            config: config.clone(),
        })
    }

    /// The underlying splitting.
    pub fn splitting(&self) -> &Splitting {
        &self.splitting
    }

    /// Starting state for the initial approximation `x0`.
    pub fn initial_state(&self, x0: &Array1<f64>) -> Result<StationaryState> {
        check_len(self.splitting.g.len(), x0)?;
        let status = if self.config.max_iterations == 0 {
            ConvergenceState::Exhausted
        } else {
            ConvergenceState::Iterating
        };
        Ok(StationaryState {
            x: x0.clone(),
            iteration: 0,
            error: None,
            status,
        })
    }

    /// Advance one iteration. Terminal states are returned unchanged.
    pub fn step(&self, state: &StationaryState) -> StationaryState {
        if state.status.is_terminal() {
            return state.clone();
        }

        let x_new = self.splitting.apply(&state.x);
        let error = vector_norm(&(&state.x - &x_new));
        let iteration = state.iteration + 1;
        let status = ConvergenceState::after_step(
            error,
            self.config.tolerance,
            iteration,
            self.config.max_iterations,
        );

        StationaryState {
            x: x_new,
            iteration,
            error: Some(error),
            status,
        }
    }

    /// Iterate from `x0` until convergence or the iteration cap.
    pub fn solve(&self, x0: &Array1<f64>) -> Result<StationarySolution> {
        let mut state = self.initial_state(x0)?;
        let mut trace = IterationTrace::new(self.config.trace);
        trace.record(0, None, state.x.clone());

        while !state.status.is_terminal() {
            state = self.step(&state);
            trace.record_with(state.iteration, state.error, || state.x.clone());

            if self.config.print_interval > 0
                && state.iteration % self.config.print_interval == 0
            {
                log::info!(
                    "{} iteration {}: ||dx|| = {:.6e}",
                    self.splitting.method.name(),
                    state.iteration,
                    state.error.unwrap_or(f64::NAN)
                );
            }
        }

        let converged = state.status == ConvergenceState::Converged;
        log::debug!(
            "{} finished after {} iterations (converged = {})",
            self.splitting.method.name(),
            state.iteration,
            converged
        );

        Ok(StationarySolution {
            x: state.x,
            iterations: state.iteration,
            error: state.error.unwrap_or(f64::INFINITY),
            converged,
            trace,
        })
    }
}

/// Solve Ax = b with the given stationary method
pub fn stationary_solve(
    a: &Array2<f64>,
    b: &Array1<f64>,
    x0: &Array1<f64>,
    method: StationaryMethod,
    config: &StationaryConfig,
) -> Result<StationarySolution> {
    StationarySolver::new(a, b, method, config)?.solve(x0)
}

/// Solve Ax = b using the Jacobi method
pub fn jacobi(
    a: &Array2<f64>,
    b: &Array1<f64>,
    x0: &Array1<f64>,
    config: &StationaryConfig,
) -> Result<StationarySolution> {
    stationary_solve(a, b, x0, StationaryMethod::Jacobi, config)
}

/// Solve Ax = b using the Gauss-Seidel method
pub fn gauss_seidel(
    a: &Array2<f64>,
    b: &Array1<f64>,
    x0: &Array1<f64>,
    config: &StationaryConfig,
) -> Result<StationarySolution> {
    stationary_solve(a, b, x0, StationaryMethod::GaussSeidel, config)
}

/// Solve Ax = b using successive over-relaxation
///
/// `omega` must lie in (0, 2).
pub fn sor(
    a: &Array2<f64>,
    b: &Array1<f64>,
    x0: &Array1<f64>,
    omega: f64,
    config: &StationaryConfig,
) -> Result<StationarySolution> {
    stationary_solve(a, b, x0, StationaryMethod::Sor { omega }, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinalgError;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn tight() -> StationaryConfig {
        StationaryConfig {
            tolerance: 1e-6,
            ..Default::default()
        }
    }

    #[test]
    fn test_jacobi_example() {
        let a = array![[10.0, 1.0], [2.0, 10.0]];
        let b = array![11.0, 12.0];
        let x0 = array![0.0, 0.0];

        let sol = jacobi(&a, &b, &x0, &tight()).unwrap();
        assert!(sol.converged);
        assert!(sol.iterations < 15, "took {} iterations", sol.iterations);
        assert!(sol.error < 1e-6);
        // det = 98, exact solution is [1, 1]
        assert_relative_eq!(sol.x[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(sol.x[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gauss_seidel_example() {
        let a = array![[10.0, 1.0], [2.0, 10.0]];
        let b = array![11.0, 12.0];
        let x0 = array![0.0, 0.0];

        let gs = gauss_seidel(&a, &b, &x0, &tight()).unwrap();
        let jac = jacobi(&a, &b, &x0, &tight()).unwrap();
        assert!(gs.converged);
        assert!(gs.iterations <= jac.iterations);
        assert_relative_eq!(gs.x[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(gs.x[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sor_converges() {
        let a = array![[4.0, -1.0, 0.0], [-1.0, 4.0, -1.0], [0.0, -1.0, 4.0]];
        let b = array![2.0, 4.0, 10.0];
        let x0 = Array1::zeros(3);

        for omega in [0.5, 1.0, 1.1, 1.5] {
            let sol = sor(&a, &b, &x0, omega, &tight()).unwrap();
            assert!(sol.converged, "SOR({omega}) should converge");
            let r = a.dot(&sol.x) - &b;
            assert!(vector_norm(&r) < 1e-4);
        }
    }

    #[test]
    fn test_trace_layout() {
        let a = array![[10.0, 1.0], [2.0, 10.0]];
        let b = array![11.0, 12.0];
        let x0 = array![0.0, 0.0];

        let sol = jacobi(&a, &b, &x0, &tight()).unwrap();
        let snaps = sol.trace.snapshots();
        assert_eq!(snaps.len(), sol.iterations + 1);
        assert_eq!(snaps[0].value, x0);
        assert_eq!(snaps[0].error, None);
        assert_eq!(snaps.last().unwrap().value, sol.x);
        assert_eq!(snaps.last().unwrap().error, Some(sol.error));

        let errors = sol.trace.errors();
        for pair in errors.windows(2) {
            assert!(pair[1] < pair[0], "error should decrease: {:?}", errors);
        }
    }

    #[test]
    fn test_trace_does_not_change_result() {
        let a = array![[10.0, 1.0], [2.0, 10.0]];
        let b = array![11.0, 12.0];
        let x0 = array![0.0, 0.0];

        let with = jacobi(&a, &b, &x0, &tight()).unwrap();
        let without = jacobi(
            &a,
            &b,
            &x0,
            &StationaryConfig {
                trace: false,
                ..tight()
            },
        )
        .unwrap();
        assert!(without.trace.is_empty());
        assert_eq!(with.x, without.x);
        assert_eq!(with.iterations, without.iterations);
    }

    #[test]
    fn test_single_step_is_pure() {
        let a = array![[10.0, 1.0], [2.0, 10.0]];
        let b = array![11.0, 12.0];
        let solver =
            StationarySolver::new(&a, &b, StationaryMethod::Jacobi, &tight()).unwrap();
        let s0 = solver.initial_state(&array![0.0, 0.0]).unwrap();

        let s1 = solver.step(&s0);
        assert_eq!(s1, solver.step(&s0));
        assert_eq!(s1.iteration, 1);
        assert_relative_eq!(s1.x[0], 1.1);
        assert_relative_eq!(s1.x[1], 1.2);
        assert_relative_eq!(s1.error.unwrap(), (1.1_f64.powi(2) + 1.2_f64.powi(2)).sqrt());
        assert_eq!(s1.status, ConvergenceState::Iterating);
    }

    #[test]
    fn test_divergence_exhausts_cap() {
        // Not diagonally dominant: Jacobi spectral radius is 2
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        let b = array![1.0, 1.0];
        let config = StationaryConfig {
            max_iterations: 20,
            ..tight()
        };
        let sol = jacobi(&a, &b, &array![0.0, 0.0], &config).unwrap();
        assert!(!sol.converged);
        assert_eq!(sol.iterations, 20);
        assert_eq!(sol.trace.len(), 21);
    }

    #[test]
    fn test_zero_iterations() {
        let a = array![[10.0, 1.0], [2.0, 10.0]];
        let b = array![11.0, 12.0];
        let config = StationaryConfig {
            max_iterations: 0,
            ..tight()
        };
        let sol = jacobi(&a, &b, &array![0.0, 0.0], &config).unwrap();
        assert!(!sol.converged);
        assert_eq!(sol.iterations, 0);
        assert!(sol.error.is_infinite());
    }

    #[test]
    fn test_input_errors() {
        let a = array![[10.0, 1.0], [2.0, 10.0]];
        let b = array![11.0, 12.0];

        let err = jacobi(&a, &b, &array![0.0], &tight()).unwrap_err();
        assert_eq!(
            err,
            LinalgError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        );

        let err = sor(&a, &b, &array![0.0, 0.0], 2.0, &tight()).unwrap_err();
        assert!(err.is_input_error());

        let bad_tol = StationaryConfig {
            tolerance: -1.0,
            ..Default::default()
        };
        assert!(jacobi(&a, &b, &array![0.0, 0.0], &bad_tol).is_err());
    }
}
