//! Protected arithmetic kernels
//!
//! Every float that reaches the evaluation stack passes through [`scrub`],
//! so downstream fitness code never sees NaN or infinities. Division and
//! logarithm are additionally guarded at the source with the exact
//! thresholds and fallbacks the external search engine was tuned against.

/// Magnitude below which a divisor or log argument is treated as singular
pub const PROTECTED_EPS: f64 = 1e-6;

/// Value substituted for any non-finite float
pub const SCRUB_SENTINEL: f64 = 1.0;

/// Result of `logs` on a near-zero argument
pub const LOG_FALLBACK: f64 = 0.0;

/// Protected division: `x / y`, or 1.0 when the divisor is near zero
pub fn divs(x: f64, y: f64) -> f64 {
    if y.abs() >= PROTECTED_EPS {
        scrub(x / y)
    } else {
        SCRUB_SENTINEL
    }
}

/// Protected natural log of the absolute value, 0.0 near zero
pub fn logs(x: f64) -> f64 {
    if x.abs() >= PROTECTED_EPS {
        scrub(x.abs().ln())
    } else {
        LOG_FALLBACK
    }
}

/// Replace NaN and infinities with the sentinel
pub fn scrub(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        SCRUB_SENTINEL
    }
}

/// Scrub a whole column in place before it is pushed
///
/// Substitution itself is silent. If a non-finite value somehow survives it,
/// the warning names the operator symbol so a bad table rule can be traced
/// from the logs; evaluation continues either way.
pub fn scrub_column(symbol: &str, column: &mut [f64]) {
    for v in column.iter_mut() {
        *v = scrub(*v);
    }
    if column.iter().any(|v| !v.is_finite()) {
        log::warn!("problem operator {}: non-finite value survived scrub", symbol);
    }
}

/// Scalar form of [`scrub_column`] for per-step evaluation
pub fn scrub_value(symbol: &str, v: f64) -> f64 {
    let scrubbed = scrub(v);
    if !scrubbed.is_finite() {
        log::warn!("problem operator {}: non-finite value survived scrub", symbol);
    }
    scrubbed
}
