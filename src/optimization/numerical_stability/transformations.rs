//! Guarded Bernoulli log-probability helpers.
//!
//! # Provided items
//! - [`LN_2PI`]: `ln(2π)`.
//! - [`bernoulli_ln_pmf`]: log-probability of a single pixel outcome.
//! - [`bernoulli_neg_entropy`]: expected log-probability of one pixel.

/// `ln(2π)`, used by Gaussian log-density normalizers.
pub const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Log-probability of a Bernoulli outcome.
///
/// Returns `ln p` when `on` and `ln(1 − p)` otherwise. The complement goes
/// through `ln_1p(-p)` to stay accurate for small `p`.
///
/// # Parameters
/// - `p`: success probability in `[0, 1]`.
/// - `on`: observed outcome.
pub fn bernoulli_ln_pmf(p: f64, on: bool) -> f64 {
    if on { p.ln() } else { (-p).ln_1p() }
}

/// Negative entropy of a Bernoulli(`p`) variable: `p ln p + (1 − p) ln(1 − p)`.
///
/// Terms with zero weight contribute zero, so `p ∈ {0, 1}` yields `0`.
pub fn bernoulli_neg_entropy(p: f64) -> f64 {
    xlnx(p) + xlnx(1.0 - p)
}

// ---- Helper methods ----

fn xlnx(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x * x.ln() }
}
