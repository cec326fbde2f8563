//! Scalar nonlinear equations f(x) = 0
//!
//! Bracketing methods keep an interval with a sign change:
//! - [`bisection`]: halve the interval
//! - [`regula_falsi`]: split at the secant through the end points
//!
//! Open methods iterate from one or two starting points:
//! - [`secant`], [`newton`], [`modified_newton`], [`simple_iteration`]
//!
//! All routines are generic over [`num_traits::Float`] and take the function
//! as a closure.

mod bracket;
mod open;

pub use bracket::{bisection, regula_falsi};
pub use open::{modified_newton, newton, secant, simple_iteration};

use crate::error::{LinalgError, Result};
use crate::trace::IterationTrace;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root finder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Float + Deserialize<'de>"))]
pub struct RootConfig<T> {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Stopping tolerance (interval width, |f(s)| or |dx| depending on method)
    pub tolerance: T,
    /// Record every approximation
    pub trace: bool,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl<T: Float> Default for RootConfig<T> {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            tolerance: T::from(1e-3).unwrap_or_else(T::epsilon),
            trace: true,
            print_interval: 0,
        }
    }
}

/// Root finder result
#[derive(Debug, Clone)]
pub struct RootSolution<T> {
    /// Final approximation
    pub root: T,
    /// Number of iterations
    pub iterations: usize,
    /// Last value of the stopping measure (infinite if no step was taken)
    pub error: T,
    /// Whether the stopping criterion was met
    pub converged: bool,
    /// Approximation after every iteration
    pub trace: IterationTrace<T>,
}

/// Textual method selector for the scalar root finders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootMethod {
    /// Interval halving
    Bisection,
    /// False position
    RegulaFalsi,
    /// Two-point secant
    Secant,
    /// Newton with the derivative at every step
    Newton,
    /// Newton with the derivative frozen at the start point
    ModifiedNewton,
    /// Fixed-point iteration x <- phi(x)
    SimpleIteration,
}

impl RootMethod {
    /// Whether the method needs a bracketing interval.
    pub fn is_bracketing(self) -> bool {
        matches!(self, RootMethod::Bisection | RootMethod::RegulaFalsi)
    }
}

impl FromStr for RootMethod {
    type Err = LinalgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "bisection" => Ok(RootMethod::Bisection),
            "regula-falsi" | "false-position" => Ok(RootMethod::RegulaFalsi),
            "secant" => Ok(RootMethod::Secant),
            "newton" => Ok(RootMethod::Newton),
            "modified-newton" => Ok(RootMethod::ModifiedNewton),
            "simple-iteration" | "fixed-point" => Ok(RootMethod::SimpleIteration),
            _ => Err(LinalgError::UnknownMethod {
                tag: s.to_string(),
                expected: "bisection, regula-falsi, secant, newton, modified-newton, simple-iteration",
            }),
        }
    }
}

impl fmt::Display for RootMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RootMethod::Bisection => "bisection",
            RootMethod::RegulaFalsi => "regula-falsi",
            RootMethod::Secant => "secant",
            RootMethod::Newton => "newton",
            RootMethod::ModifiedNewton => "modified-newton",
            RootMethod::SimpleIteration => "simple-iteration",
        };
        f.write_str(name)
    }
}

#[inline]
fn as_f64<T: Float>(v: T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

fn check_root_tolerance<T: Float>(tolerance: T) -> Result<()> {
    if !tolerance.is_finite() || tolerance < T::zero() {
        return Err(LinalgError::InvalidTolerance {
            tolerance: as_f64(tolerance),
        });
    }
    Ok(())
}

fn ensure_finite<T: Float>(v: T, context: &'static str) -> Result<T> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(LinalgError::NonFinite { context })
    }
}
