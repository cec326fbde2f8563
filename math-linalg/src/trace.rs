//! Per-iteration trace records
//!
//! Iterative routines append one [`Snapshot`] per step to an
//! [`IterationTrace`]. Traces are plain data: they serialize to JSON for an
//! external plotting or reporting layer and never feed back into the
//! algorithms beyond the termination checks.

use serde::{Deserialize, Serialize};

/// One recorded step of an iterative algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<S> {
    /// Iteration number (0 = initial approximation)
    pub iteration: usize,
    /// Approximation after this iteration (vector, matrix, or scalar)
    pub value: S,
    /// Error measure of this iteration; `None` for the initial approximation
    pub error: Option<f64>,
}

/// Ordered sequence of snapshots produced by one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationTrace<S> {
    enabled: bool,
    snapshots: Vec<Snapshot<S>>,
}

impl<S> Default for IterationTrace<S> {
    fn default() -> Self {
        Self::disabled()
    }
}

impl<S> IterationTrace<S> {
    /// Create a trace that records every pushed snapshot.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            snapshots: Vec::new(),
        }
    }

    /// Create a trace that drops everything pushed into it.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            snapshots: Vec::new(),
        }
    }

    /// Create an enabled or disabled trace.
    pub fn new(enabled: bool) -> Self {
        if enabled {
            Self::enabled()
        } else {
            Self::disabled()
        }
    }

    /// Whether snapshots are being kept.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a snapshot. The value is only built when recording is on.
    pub fn record_with(&mut self, iteration: usize, error: Option<f64>, value: impl FnOnce() -> S) {
        if self.enabled {
            self.snapshots.push(Snapshot {
                iteration,
                value: value(),
                error,
            });
        }
    }

    /// Record an already-built snapshot value.
    pub fn record(&mut self, iteration: usize, error: Option<f64>, value: S) {
        self.record_with(iteration, error, || value);
    }

    /// All recorded snapshots in order.
    pub fn snapshots(&self) -> &[Snapshot<S>] {
        &self.snapshots
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Most recent snapshot.
    pub fn last(&self) -> Option<&Snapshot<S>> {
        self.snapshots.last()
    }

    /// Error measures of all steps that have one, in order.
    pub fn errors(&self) -> Vec<f64> {
        self.snapshots.iter().filter_map(|s| s.error).collect()
    }

    /// Consume the trace, returning the snapshots.
    pub fn into_snapshots(self) -> Vec<Snapshot<S>> {
        self.snapshots
    }
}

impl<S: Serialize> IterationTrace<S> {
    /// Serialize the snapshots as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshots)
    }
}

/// Terminal (or current) state of an iterative computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceState {
    /// Still running
    Iterating,
    /// Error measure dropped below the tolerance
    Converged,
    /// Iteration cap reached first
    Exhausted,
}

impl ConvergenceState {
    /// `true` for `Converged` and `Exhausted`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ConvergenceState::Iterating)
    }

    /// Decide the next state after a step.
    pub fn after_step(error: f64, tolerance: f64, iteration: usize, max_iterations: usize) -> Self {
        if error < tolerance {
            ConvergenceState::Converged
        } else if iteration >= max_iterations {
            ConvergenceState::Exhausted
        } else {
            ConvergenceState::Iterating
        }
    }
}
