//! JSON problem files
//!
//! A [`ProblemFile`] bundles a matrix, optional right-hand side and start
//! vector, the method to run and per-method configuration blocks. Missing
//! blocks fall back to their defaults. [`ProblemFile::run`] dispatches to the
//! library routines and collects the result into a serializable
//! [`RunReport`].

use crate::direct::{GaussConfig, RowSwap, gauss_solve, lu_decompose, lu_decompose_pivoting};
use crate::eigen::{
    EigenConfig, EigenSolution, PowerIterationConfig, RayleighEstimate, RotationConfig,
    jacobi_rotation, lr_transform, qr_transform, rayleigh_quotient_iteration,
};
use crate::error::LinalgError;
use crate::iterative::{
    SpectralRadiusConfig, StationaryConfig, StationaryMethod, sor_optimal_omega, stationary_solve,
};
use crate::trace::IterationTrace;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading or running a problem file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("failed to access {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON or wrong field types
    #[error("failed to parse problem file: {0}")]
    Json(#[from] serde_json::Error),

    /// A field required by the selected method is missing
    #[error("method '{method}' requires '{field}'")]
    MissingField {
        /// Selected method
        method: MethodTag,
        /// Name of the missing field
        field: &'static str,
    },

    /// The computation itself rejected the input or broke down
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// Method selected in a problem file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodTag {
    /// Non-pivoted LU factorization and solve
    Lu,
    /// LU factorization with partial pivoting and solve
    LuPivoting,
    /// Gaussian elimination (pivoting from the `gauss` block)
    Gauss,
    /// Jacobi iteration
    Jacobi,
    /// Gauss-Seidel iteration
    GaussSeidel,
    /// SOR; `omega` defaults to the optimum estimated from the Jacobi matrix
    Sor,
    /// LR transform
    LrTransform,
    /// QR transform
    QrTransform,
    /// Jacobi rotations (strategy from the `rotation` block)
    JacobiRotation,
    /// Power iteration with Rayleigh quotients
    PowerIteration,
}

impl MethodTag {
    /// Every accepted tag, in the order listed in error messages.
    pub const ALL: [MethodTag; 10] = [
        MethodTag::Lu,
        MethodTag::LuPivoting,
        MethodTag::Gauss,
        MethodTag::Jacobi,
        MethodTag::GaussSeidel,
        MethodTag::Sor,
        MethodTag::LrTransform,
        MethodTag::QrTransform,
        MethodTag::JacobiRotation,
        MethodTag::PowerIteration,
    ];

    /// Kebab-case name, identical to the JSON tag.
    pub fn as_str(self) -> &'static str {
        match self {
            MethodTag::Lu => "lu",
            MethodTag::LuPivoting => "lu-pivoting",
            MethodTag::Gauss => "gauss",
            MethodTag::Jacobi => "jacobi",
            MethodTag::GaussSeidel => "gauss-seidel",
            MethodTag::Sor => "sor",
            MethodTag::LrTransform => "lr-transform",
            MethodTag::QrTransform => "qr-transform",
            MethodTag::JacobiRotation => "jacobi-rotation",
            MethodTag::PowerIteration => "power-iteration",
        }
    }

    /// Whether the method solves A x = b (and so needs `rhs`).
    pub fn needs_rhs(self) -> bool {
        matches!(
            self,
            MethodTag::Lu
                | MethodTag::LuPivoting
                | MethodTag::Gauss
                | MethodTag::Jacobi
                | MethodTag::GaussSeidel
                | MethodTag::Sor
        )
    }
}

impl fmt::Display for MethodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodTag {
    type Err = LinalgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        MethodTag::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| LinalgError::UnknownMethod {
                tag: s.to_string(),
                expected: "lu, lu-pivoting, gauss, jacobi, gauss-seidel, sor, lr-transform, \
                           qr-transform, jacobi-rotation, power-iteration",
            })
    }
}

/// Complete problem description loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemFile {
    /// Matrix rows
    pub matrix: Vec<Vec<f64>>,
    /// Right-hand side for the solvers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhs: Option<Vec<f64>>,
    /// Start vector for stationary and power iterations (zeros / ones if absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x0: Option<Vec<f64>>,
    /// Method to run
    pub method: MethodTag,
    /// SOR relaxation parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omega: Option<f64>,
    /// Gaussian elimination settings
    #[serde(default)]
    pub gauss: GaussConfig,
    /// Stationary iteration settings
    #[serde(default)]
    pub stationary: StationaryConfig,
    /// Spectral radius estimate used when `omega` is absent
    #[serde(default)]
    pub spectral: SpectralRadiusConfig,
    /// LR/QR transform settings
    #[serde(default)]
    pub eigen: EigenConfig,
    /// Jacobi rotation settings
    #[serde(default)]
    pub rotation: RotationConfig,
    /// Power iteration settings
    #[serde(default)]
    pub power: PowerIterationConfig,
}

impl ProblemFile {
    /// Problem with default configuration blocks
    pub fn new(matrix: Vec<Vec<f64>>, method: MethodTag) -> Self {
        Self {
            matrix,
            rhs: None,
            x0: None,
            method,
            omega: None,
            gauss: GaussConfig::default(),
            stationary: StationaryConfig::default(),
            spectral: SpectralRadiusConfig::default(),
            eigen: EigenConfig::default(),
            rotation: RotationConfig::default(),
            power: PowerIterationConfig::default(),
        }
    }

    /// Load a problem from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse a problem from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the problem to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Matrix as a dense array; ragged rows are rejected
    pub fn matrix_array(&self) -> Result<Array2<f64>, LinalgError> {
        let rows = self.matrix.len();
        if rows == 0 {
            return Err(LinalgError::EmptyMatrix);
        }
        let cols = self.matrix[0].len();
        if let Some(bad) = self.matrix.iter().find(|row| row.len() != cols) {
            return Err(LinalgError::DimensionMismatch {
                expected: cols,
                got: bad.len(),
            });
        }
        let flat: Vec<f64> = self.matrix.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows, cols), flat).map_err(|_| LinalgError::DimensionMismatch {
            expected: rows * cols,
            got: self.matrix.iter().map(Vec::len).sum(),
        })
    }

    fn rhs_array(&self) -> Result<Array1<f64>, ConfigError> {
        self.rhs
            .as_ref()
            .map(|b| Array1::from_vec(b.clone()))
            .ok_or(ConfigError::MissingField {
                method: self.method,
                field: "rhs",
            })
    }

    fn start_vector(&self, n: usize, fill: f64) -> Array1<f64> {
        match &self.x0 {
            Some(x0) => Array1::from_vec(x0.clone()),
            None => Array1::from_elem(n, fill),
        }
    }

    /// Run the selected method
    pub fn run(&self) -> Result<RunReport, ConfigError> {
        let a = self.matrix_array()?;
        let n = a.nrows();
        log::info!("Running {} on a {}x{} matrix", self.method, n, a.ncols());

        let report = match self.method {
            MethodTag::Lu => {
                let x = lu_decompose(&a)?.solve(&self.rhs_array()?)?;
                RunReport::direct(self.method, x, Vec::new())
            }
            MethodTag::LuPivoting => {
                let x = lu_decompose_pivoting(&a)?.solve(&self.rhs_array()?)?;
                RunReport::direct(self.method, x, Vec::new())
            }
            MethodTag::Gauss => {
                let sol = gauss_solve(&a, &self.rhs_array()?, &self.gauss)?;
                RunReport::direct(self.method, sol.x, sol.swaps)
            }
            MethodTag::Jacobi | MethodTag::GaussSeidel | MethodTag::Sor => {
                let method = match self.method {
                    MethodTag::Jacobi => StationaryMethod::Jacobi,
                    MethodTag::GaussSeidel => StationaryMethod::GaussSeidel,
                    _ => {
                        let omega = match self.omega {
                            Some(omega) => omega,
                            None => {
                                let omega = sor_optimal_omega(&a, &self.spectral)?;
                                log::info!("Using estimated optimal omega = {omega:.6}");
                                omega
                            }
                        };
                        StationaryMethod::Sor { omega }
                    }
                };
                let x0 = self.start_vector(n, 0.0);
                let sol = stationary_solve(&a, &self.rhs_array()?, &x0, method, &self.stationary)?;
                RunReport {
                    method: self.method,
                    values: sol.x.to_vec(),
                    iterations: Some(sol.iterations),
                    error: Some(sol.error),
                    converged: sol.converged,
                    swaps: Vec::new(),
                    trace: RunTrace::Vectors(sol.trace),
                }
            }
            MethodTag::LrTransform => RunReport::eigen(self.method, lr_transform(&a, &self.eigen)?),
            MethodTag::QrTransform => RunReport::eigen(self.method, qr_transform(&a, &self.eigen)?),
            MethodTag::JacobiRotation => {
                RunReport::eigen(self.method, jacobi_rotation(&a, &self.rotation)?)
            }
            MethodTag::PowerIteration => {
                let y0 = self.start_vector(n, 1.0);
                let sol = rayleigh_quotient_iteration(&a, &y0, &self.power)?;
                RunReport {
                    method: self.method,
                    values: vec![sol.eigenvalue],
                    iterations: Some(sol.iterations),
                    error: Some(sol.error),
                    converged: sol.converged,
                    swaps: Vec::new(),
                    trace: RunTrace::Estimates(sol.trace),
                }
            }
        };

        if !report.converged {
            log::warn!("{} stopped without converging", self.method);
        }
        Ok(report)
    }
}

/// Trace carried by a [`RunReport`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunTrace {
    /// Direct methods keep no per-iteration trace
    None,
    /// Approximate solutions of a stationary iteration
    Vectors(IterationTrace<Array1<f64>>),
    /// Matrices of an eigenvalue iteration
    Matrices(IterationTrace<Array2<f64>>),
    /// Rayleigh quotient estimates
    Estimates(IterationTrace<RayleighEstimate>),
}

impl RunTrace {
    /// One (iteration, error, value) row per snapshot, values pre-formatted
    pub fn rows(&self) -> Vec<(usize, Option<f64>, String)> {
        fn fmt_slice<'a>(values: impl Iterator<Item = &'a f64>) -> String {
            let parts: Vec<String> = values.map(|v| format!("{v:.8}")).collect();
            format!("[{}]", parts.join(", "))
        }

        match self {
            RunTrace::None => Vec::new(),
            RunTrace::Vectors(trace) => trace
                .snapshots()
                .iter()
                .map(|s| (s.iteration, s.error, fmt_slice(s.value.iter())))
                .collect(),
            RunTrace::Matrices(trace) => trace
                .snapshots()
                .iter()
                .map(|s| (s.iteration, s.error, fmt_slice(s.value.diag().iter())))
                .collect(),
            RunTrace::Estimates(trace) => trace
                .snapshots()
                .iter()
                .map(|s| (s.iteration, s.error, format!("{:.10}", s.value.eigenvalue)))
                .collect(),
        }
    }
}

/// Outcome of [`ProblemFile::run`]
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Method that produced the report
    pub method: MethodTag,
    /// Solution vector or eigenvalue estimates
    pub values: Vec<f64>,
    /// Iterations performed (iterative methods only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    /// Final error measure (iterative methods only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<f64>,
    /// Whether the method reached its tolerance (always true for direct methods)
    pub converged: bool,
    /// Row exchanges of a traced Gaussian elimination
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub swaps: Vec<RowSwap>,
    /// Per-iteration trace
    pub trace: RunTrace,
}

impl RunReport {
    fn direct(method: MethodTag, x: Array1<f64>, swaps: Vec<RowSwap>) -> Self {
        Self {
            method,
            values: x.to_vec(),
            iterations: None,
            error: None,
            converged: true,
            swaps,
            trace: RunTrace::None,
        }
    }

    fn eigen(method: MethodTag, sol: EigenSolution) -> Self {
        Self {
            method,
            values: sol.eigenvalues.to_vec(),
            iterations: Some(sol.iterations),
            error: Some(sol.error),
            converged: sol.converged,
            swaps: Vec::new(),
            trace: RunTrace::Matrices(sol.trace),
        }
    }
}
