//! numerical_stability — guarded scalar helpers for log-probabilities.
//!
//! Purpose
//! -------
//! Collect the small numerically delicate formulas shared by the prior
//! scoring and the image likelihood, so that boundary cases (`p = 0`,
//! `p = 1`, `0 · ln 0`) are handled in exactly one place.
//!
//! Key behaviors
//! -------------
//! - `bernoulli_ln_pmf(p, on)`: `ln p` for an "on" pixel, `ln(1 − p)` for an
//!   "off" pixel, using `ln_1p` for the complement.
//! - `bernoulli_neg_entropy(p)`: `p ln p + (1 − p) ln(1 − p)` with the
//!   convention `0 · ln 0 = 0`.
//! - `LN_2PI`: shared constant for Gaussian normalizers.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are probabilities in `[0, 1]`; range checks happen upstream in
//!   the rendering layer. Out-of-range inputs produce NaN, not panics.
//! - `bernoulli_ln_pmf` returns `-∞` for impossible outcomes; callers that
//!   need finite scores keep `p` strictly inside `(0, 1)` via pixel noise.
//!
//! Conventions
//! -----------
//! - Pure functions over `f64`; no logging, I/O or global state.
//!
//! Downstream usage
//! ----------------
//! - `model::image_dist` scores binary images and computes expected scores.
//! - `library::priors` uses `LN_2PI` for the multivariate normal normalizer.
//!
//! Testing notes
//! -------------
//! - Unit tests check agreement with the naïve formulas away from the
//!   boundaries and the conventions at `p ∈ {0, 1}`.

pub mod transformations;

pub mod prelude {
    pub use super::transformations::{LN_2PI, bernoulli_ln_pmf, bernoulli_neg_entropy};
}
