//! Open root finders: secant, Newton, fixed-point iteration

use super::{RootConfig, RootSolution, as_f64, check_root_tolerance, ensure_finite};
use crate::error::{LinalgError, Result};
use crate::trace::IterationTrace;
use num_traits::Float;

/// Drive x <- step(x) from `x0` until |dx| < tolerance.
fn iterate_open<T, S>(x0: T, config: &RootConfig<T>, name: &str, mut step: S) -> Result<RootSolution<T>>
where
    T: Float,
    S: FnMut(T) -> Result<T>,
{
    check_root_tolerance(config.tolerance)?;
    let mut x = ensure_finite(x0, "start point")?;
    let mut trace = IterationTrace::new(config.trace);
    trace.record(0, None, x);

    let mut error = T::infinity();
    let mut converged = false;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let x_new = ensure_finite(step(x)?, "root iteration")?;
        iterations += 1;
        error = (x_new - x).abs();
        x = x_new;
        trace.record(iterations, Some(as_f64(error)), x);

        if config.print_interval > 0 && iterations % config.print_interval == 0 {
            log::info!(
                "{name} iteration {iterations}: x = {:.10e}, |dx| = {:.3e}",
                as_f64(x),
                as_f64(error)
            );
        }

        if error < config.tolerance {
            converged = true;
            break;
        }
    }

    log::debug!("{name} finished after {iterations} iterations (converged = {converged})");
    Ok(RootSolution {
        root: x,
        iterations,
        error,
        converged,
        trace,
    })
}

/// Divide, reporting a zero or non-finite divisor as a numerical failure.
fn checked_div<T: Float>(num: T, den: T, context: &'static str) -> Result<T> {
    if den == T::zero() || !den.is_finite() {
        return Err(LinalgError::NonFinite { context });
    }
    ensure_finite(num / den, context)
}

/// Find a root of `f` by the secant method from `x0` and `x1`
///
/// The trace starts at `x1`; `x0` only seeds the first slope.
pub fn secant<T, F>(mut f: F, x0: T, x1: T, config: &RootConfig<T>) -> Result<RootSolution<T>>
where
    T: Float,
    F: FnMut(T) -> T,
{
    let mut prev = ensure_finite(x0, "start point")?;
    let mut f_prev = f(prev);
    iterate_open(x1, config, "Secant", |x| {
        let fx = f(x);
        let slope = checked_div(f_prev - fx, prev - x, "secant slope")?;
        let next = x - checked_div(fx, slope, "secant step")?;
        prev = x;
        f_prev = fx;
        Ok(next)
    })
}

/// Find a root of `f` by Newton's method with derivative `df`
pub fn newton<T, F, D>(mut f: F, mut df: D, x0: T, config: &RootConfig<T>) -> Result<RootSolution<T>>
where
    T: Float,
    F: FnMut(T) -> T,
    D: FnMut(T) -> T,
{
    iterate_open(x0, config, "Newton", |x| {
        Ok(x - checked_div(f(x), df(x), "Newton step (zero derivative)")?)
    })
}

/// Find a root of `f` by Newton's method with the derivative frozen at `x0`
///
/// `df_x0` is f'(x0); it is used unchanged in every step.
pub fn modified_newton<T, F>(mut f: F, df_x0: T, x0: T, config: &RootConfig<T>) -> Result<RootSolution<T>>
where
    T: Float,
    F: FnMut(T) -> T,
{
    if df_x0 == T::zero() || !df_x0.is_finite() {
        return Err(LinalgError::NonFinite {
            context: "modified Newton derivative",
        });
    }
    iterate_open(x0, config, "Modified Newton", |x| Ok(x - f(x) / df_x0))
}

/// Find a fixed point x = phi(x) by simple iteration
pub fn simple_iteration<T, P>(mut phi: P, x0: T, config: &RootConfig<T>) -> Result<RootSolution<T>>
where
    T: Float,
    P: FnMut(T) -> T,
{
    iterate_open(x0, config, "Simple iteration", |x| Ok(phi(x)))
}
