//! Bracketing root finders

use super::{RootConfig, RootSolution, as_f64, check_root_tolerance, ensure_finite};
use crate::error::{LinalgError, Result};
use crate::trace::IterationTrace;
use num_traits::Float;

/// Validate [a, b] and return (f(a), f(b)).
fn check_bracket<T, F>(f: &mut F, a: T, b: T) -> Result<(T, T)>
where
    T: Float,
    F: FnMut(T) -> T,
{
    if !a.is_finite() || !b.is_finite() || a >= b {
        return Err(LinalgError::InvalidInterval {
            a: as_f64(a),
            b: as_f64(b),
        });
    }
    let fa = f(a);
    let fb = f(b);
    if fa * fb > T::zero() {
        return Err(LinalgError::NoSignChange {
            a: as_f64(a),
            b: as_f64(b),
            fa: as_f64(fa),
            fb: as_f64(fb),
        });
    }
    Ok((fa, fb))
}

/// Find a root of `f` in [a, b] by bisection
///
/// Stops when the current interval is narrower than `tolerance` or the
/// midpoint value is below machine epsilon in magnitude. The reported error
/// is the width of the interval the last midpoint was taken from.
pub fn bisection<T, F>(mut f: F, a: T, b: T, config: &RootConfig<T>) -> Result<RootSolution<T>>
where
    T: Float,
    F: FnMut(T) -> T,
{
    check_root_tolerance(config.tolerance)?;
    let (mut fa, _) = check_bracket(&mut f, a, b)?;

    let two = T::one() + T::one();
    let (mut a, mut b) = (a, b);
    let mut s = (a + b) / two;
    let mut error = T::infinity();
    let mut converged = false;
    let mut iterations = 0;
    let mut trace = IterationTrace::new(config.trace);

    while iterations < config.max_iterations {
        iterations += 1;
        s = (a + b) / two;
        error = b - a;
        let fs = f(s);
        trace.record(iterations, Some(as_f64(error)), s);

        if config.print_interval > 0 && iterations % config.print_interval == 0 {
            log::info!("Bisection iteration {iterations}: s = {:.10e}", as_f64(s));
        }

        if error < config.tolerance || fs.abs() < T::epsilon() {
            converged = true;
            break;
        }
        if fa * fs < T::zero() {
            b = s;
        } else {
            a = s;
            fa = fs;
        }
    }

    log::debug!("Bisection finished after {iterations} iterations (converged = {converged})");
    Ok(RootSolution {
        root: s,
        iterations,
        error,
        converged,
        trace,
    })
}

/// Find a root of `f` in [a, b] by the false position method
///
/// The next point is where the chord through (a, f(a)) and (b, f(b))
/// crosses zero. Stops when |f(s)| < `tolerance`.
pub fn regula_falsi<T, F>(mut f: F, a: T, b: T, config: &RootConfig<T>) -> Result<RootSolution<T>>
where
    T: Float,
    F: FnMut(T) -> T,
{
    check_root_tolerance(config.tolerance)?;
    let (mut fa, mut fb) = check_bracket(&mut f, a, b)?;

    let mut trace = IterationTrace::new(config.trace);
    // an end point that is already a root makes the chord degenerate
    if fa == T::zero() || fb == T::zero() {
        let root = if fa == T::zero() { a } else { b };
        trace.record(0, Some(0.0), root);
        return Ok(RootSolution {
            root,
            iterations: 0,
            error: T::zero(),
            converged: true,
            trace,
        });
    }

    let (mut a, mut b) = (a, b);
    let mut s = a;
    let mut error = T::infinity();
    let mut converged = false;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        iterations += 1;
        s = ensure_finite(a - fa * (b - a) / (fb - fa), "regula falsi chord")?;
        let fs = f(s);
        error = fs.abs();
        trace.record(iterations, Some(as_f64(error)), s);

        if config.print_interval > 0 && iterations % config.print_interval == 0 {
            log::info!(
                "Regula falsi iteration {iterations}: s = {:.10e}, |f(s)| = {:.3e}",
                as_f64(s),
                as_f64(error)
            );
        }

        if error < config.tolerance {
            converged = true;
            break;
        }
        if fa * fs < T::zero() {
            b = s;
            fb = fs;
        } else {
            a = s;
            fa = fs;
        }
    }

    log::debug!("Regula falsi finished after {iterations} iterations (converged = {converged})");
    Ok(RootSolution {
        root: s,
        iterations,
        error,
        converged,
        trace,
    })
}
