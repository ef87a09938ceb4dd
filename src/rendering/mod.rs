//! rendering — deterministic motor-program → pixel-probability renderer.
//!
//! Purpose
//! -------
//! Turn the motor trajectories of a character token, a global affine warp,
//! a pixel-noise level `epsilon` and a blur width `blur_sigma` into a
//! [`ProbImage`]: an `H × W` field of per-pixel "ink on" probabilities. The
//! image likelihood samples from and scores against this field.
//!
//! Key behaviors
//! -------------
//! - Warp all trajectories with the affine about their centre of mass
//!   ([`warp::apply_warp`]).
//! - Deposit ink along the warped trajectories, broaden it with a 3×3 kernel
//!   and saturate with gain `ink_b` ([`ink`]).
//! - Blur with a Gaussian of width `blur_sigma`, clamp to `[0, 1]`, then mix
//!   in pixel noise: `p ← (1 − ε)·p + ε·(1 − p)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`apply_render`] is a pure function of its inputs; calling it twice
//!   with the same arguments produces identical images.
//! - Every output pixel lies in `[0, 1]`; with `ε ∈ (0, 1)` every pixel lies
//!   strictly inside `(0, 1)`, so Bernoulli log-probabilities are finite.
//! - Points that fall off the canvas deposit nothing and raise the
//!   `ink_off_page` flag; they are not an error.
//!
//! Conventions
//! -----------
//! - Image coordinates: `x` is the column and `y` the row, in pixels.
//! - A [`Motor`] is indexed `stroke → sub-stroke → (n_points × 2)`.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover spline interpolation, warp geometry and
//!   ink mass bookkeeping; tests here cover the probability contract.
pub mod bspline;
pub mod errors;
pub mod ink;
pub mod warp;

use crate::rendering::errors::{RenderError, RenderResult};
use ndarray::Array2;

pub use self::warp::IDENTITY_AFFINE;

/// Trajectories indexed `stroke → sub-stroke → (n_points × 2)`.
pub type Motor = Vec<Vec<Array2<f64>>>;

/// Fixed rendering hyperparameters, loaded once per run.
///
/// Default:
/// - `height = width = 105`
/// - `spline_samples = 50` points per sub-stroke
/// - `ink_pp = 2.0` ink points per pixel of arc length
/// - `ink_a = 0.5` broadening mass, `ink_b = 6.0` ink gain
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub height: usize,
    pub width: usize,
    pub spline_samples: usize,
    pub ink_pp: f64,
    pub ink_a: f64,
    pub ink_b: f64,
}

impl RenderConfig {
    /// Construct a validated render configuration.
    ///
    /// # Errors
    /// - [`RenderError::InvalidImageSize`] if either side is zero.
    /// - [`RenderError::InvalidSplineSamples`] if `spline_samples < 2`.
    /// - [`RenderError::InvalidInkParam`] if `ink_pp <= 0`, `ink_a ∉ [0, 1)`
    ///   or `ink_b <= 0` (or any is non-finite).
    pub fn new(
        height: usize, width: usize, spline_samples: usize, ink_pp: f64, ink_a: f64, ink_b: f64,
    ) -> RenderResult<Self> {
        if height == 0 || width == 0 {
            return Err(RenderError::InvalidImageSize { height, width });
        }
        if spline_samples < 2 {
            return Err(RenderError::InvalidSplineSamples { samples: spline_samples });
        }
        if !ink_pp.is_finite() || ink_pp <= 0.0 {
            return Err(RenderError::InvalidInkParam {
                name: "ink_pp",
                value: ink_pp,
                reason: "must be finite and > 0",
            });
        }
        if !ink_a.is_finite() || !(0.0..1.0).contains(&ink_a) {
            return Err(RenderError::InvalidInkParam {
                name: "ink_a",
                value: ink_a,
                reason: "must lie in [0, 1)",
            });
        }
        if !ink_b.is_finite() || ink_b <= 0.0 {
            return Err(RenderError::InvalidInkParam {
                name: "ink_b",
                value: ink_b,
                reason: "must be finite and > 0",
            });
        }
        Ok(Self { height, width, spline_samples, ink_pp, ink_a, ink_b })
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { height: 105, width: 105, spline_samples: 50, ink_pp: 2.0, ink_a: 0.5, ink_b: 6.0 }
    }
}

/// Per-pixel Bernoulli probabilities produced by [`apply_render`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProbImage {
    /// `H × W` probabilities in `[0, 1]`.
    pub pixels: Array2<f64>,
    /// Some trajectory point fell outside the canvas.
    pub ink_off_page: bool,
}

impl ProbImage {
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }
}

/// Render a motor program into a probability image.
///
/// # Parameters
/// - `motor`: trajectories before the affine warp.
/// - `affine`: `[x_scale, y_scale, x_shift, y_shift]`.
/// - `epsilon`: pixel-flip noise in `[0, 1]`.
/// - `blur_sigma`: Gaussian blur width in pixels, `>= 0`.
/// - `config`: fixed rendering hyperparameters.
///
/// # Errors
/// - [`RenderError::InvalidEpsilon`] / [`RenderError::InvalidBlurSigma`] for
///   out-of-range noise parameters.
/// - [`RenderError::InvalidAffine`] for non-finite affine entries.
/// - [`RenderError::NonFiniteTrajectory`] if any point is NaN/±inf.
pub fn apply_render(
    motor: &Motor, affine: &[f64; 4], epsilon: f64, blur_sigma: f64, config: &RenderConfig,
) -> RenderResult<ProbImage> {
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(RenderError::InvalidEpsilon { value: epsilon });
    }
    if !blur_sigma.is_finite() || blur_sigma < 0.0 {
        return Err(RenderError::InvalidBlurSigma { value: blur_sigma });
    }
    for (stroke, subs) in motor.iter().enumerate() {
        for (substroke, traj) in subs.iter().enumerate() {
            if traj.iter().any(|v| !v.is_finite()) {
                return Err(RenderError::NonFiniteTrajectory { stroke, substroke });
            }
        }
    }

    let warped = warp::apply_warp(motor, affine)?;
    let (raw, ink_off_page) = ink::deposit(&warped, config);
    let mut pixels = ink::broaden(raw.view(), config.ink_a);
    pixels.mapv_inplace(|v| (config.ink_b * v).min(1.0));
    let mut pixels = ink::gaussian_blur(pixels.view(), blur_sigma);
    pixels.mapv_inplace(|p| {
        let p = p.clamp(0.0, 1.0);
        (1.0 - epsilon) * p + epsilon * (1.0 - p)
    });
    Ok(ProbImage { pixels, ink_off_page })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Range of the output probabilities and the effect of epsilon.
    // - Determinism of the render.
    // - Validation of noise parameters and config.
    //
    // They intentionally DO NOT cover:
    // - Spline, warp and ink internals (see submodules).
    // -------------------------------------------------------------------------

    fn diagonal_motor() -> Motor {
        vec![vec![array![[10.0, 10.0], [30.0, 30.0]]]]
    }

    fn config() -> RenderConfig {
        RenderConfig::new(40, 40, 10, 2.0, 0.5, 6.0).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Probabilities stay inside [ε, 1 − ε] and the stroke is inked.
    //
    // Given
    // -----
    // - A diagonal stroke, ε = 0.01, blur 0.8.
    //
    // Expect
    // ------
    // - min ≥ ε, max ≤ 1 − ε (up to rounding); a pixel on the stroke is
    //   far more likely on than a background corner.
    fn probabilities_are_bounded_by_epsilon() {
        let eps = 0.01;

        let pimg = apply_render(&diagonal_motor(), &IDENTITY_AFFINE, eps, 0.8, &config()).unwrap();

        let min = pimg.pixels.fold(f64::INFINITY, |a, &b| a.min(b));
        let max = pimg.pixels.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        assert!(min >= eps - 1e-12);
        assert!(max <= 1.0 - eps + 1e-12);
        assert!(pimg.pixels[[20, 20]] > 0.5);
        assert!((pimg.pixels[[0, 39]] - eps).abs() < 1e-9);
        assert!(!pimg.ink_off_page);
    }

    #[test]
    // Purpose
    // -------
    // Rendering is deterministic.
    //
    // Given
    // -----
    // - The same inputs rendered twice.
    //
    // Expect
    // ------
    // - Bit-identical images.
    fn render_is_deterministic() {
        let a = apply_render(&diagonal_motor(), &[1.1, 0.9, 1.0, -2.0], 0.05, 1.2, &config())
            .unwrap();
        let b = apply_render(&diagonal_motor(), &[1.1, 0.9, 1.0, -2.0], 0.05, 1.2, &config())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_noise_parameters_are_rejected() {
        let motor = diagonal_motor();
        assert_eq!(
            apply_render(&motor, &IDENTITY_AFFINE, 1.5, 1.0, &config()).unwrap_err(),
            RenderError::InvalidEpsilon { value: 1.5 }
        );
        assert_eq!(
            apply_render(&motor, &IDENTITY_AFFINE, 0.1, -1.0, &config()).unwrap_err(),
            RenderError::InvalidBlurSigma { value: -1.0 }
        );
    }

    #[test]
    fn config_rejects_bad_ink_parameters() {
        assert!(matches!(
            RenderConfig::new(10, 10, 5, 2.0, 1.0, 6.0),
            Err(RenderError::InvalidInkParam { name: "ink_a", .. })
        ));
        assert!(matches!(
            RenderConfig::new(0, 10, 5, 2.0, 0.5, 6.0),
            Err(RenderError::InvalidImageSize { .. })
        ));
    }
}
