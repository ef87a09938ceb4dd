//! Bernoulli image likelihood for character tokens.
//!
//! Purpose
//! -------
//! Turn a [`CharacterToken`] into a per-pixel Bernoulli probability field
//! and either draw a binary image from it or score an observed binary image
//! against it exactly.
//!
//! Key behaviors
//! -------------
//! - [`ImageDistribution::probability_image`] is the single rendering path;
//!   sampling and scoring both go through it.
//! - [`ImageDistribution::sample_image`] draws every pixel independently;
//!   each call consumes fresh randomness.
//! - [`ImageDistribution::score_image`] sums `ln p` over "on" pixels and
//!   `ln(1 − p)` over "off" pixels.
//! - [`neg_entropy`] is the expected score of a sample, `Σ p ln p +
//!   (1 − p) ln(1 − p)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Probabilities are in `[0, 1]` (guaranteed by the renderer). A pixel
//!   with `p = 0` that is on, or `p = 1` that is off, scores `-∞`; positive
//!   noise `ε` keeps every probability strictly inside `(0, 1)`.
//! - Observed images must match the render size exactly.
//!
//! Testing notes
//! -------------
//! - Unit tests score hand-built probability fields against closed forms
//!   and check sample frequencies; the sample/score self-consistency over a
//!   full token lives in the integration tests.
use crate::{
    model::{
        character::CharacterToken,
        errors::{ModelError, ModelResult},
    },
    optimization::numerical_stability::transformations::{bernoulli_ln_pmf, bernoulli_neg_entropy},
    rendering::{ProbImage, RenderConfig, apply_render},
};
use ndarray::{Array2, Zip};
use rand::{
    Rng,
    distributions::{Bernoulli, Distribution},
};

/// Binary image; `true` is an inked pixel.
pub type BinaryImage = Array2<bool>;

/// Image likelihood of a token.
pub trait ImageDistribution {
    /// Render the token's per-pixel "on" probabilities.
    fn probability_image(&self, token: &CharacterToken) -> ModelResult<ProbImage>;

    /// Draw a binary image from the token's probability field.
    fn sample_image<R: Rng + ?Sized>(
        &self, token: &CharacterToken, rng: &mut R,
    ) -> ModelResult<BinaryImage> {
        sample_pixels(&self.probability_image(token)?, rng)
    }

    /// Exact log-likelihood of `image` under the token.
    ///
    /// # Errors
    /// [`ModelError::ImageDimMismatch`] if `image` is not the render size.
    fn score_image(&self, token: &CharacterToken, image: &BinaryImage) -> ModelResult<f64> {
        score_pixels(&self.probability_image(token)?, image)
    }
}

/// Renderer-backed likelihood with fixed render hyperparameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharacterImageDist {
    config: RenderConfig,
}

impl CharacterImageDist {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}

impl ImageDistribution for CharacterImageDist {
    fn probability_image(&self, token: &CharacterToken) -> ModelResult<ProbImage> {
        let CharacterToken { motor, affine, epsilon, blur_sigma } = token;
        Ok(apply_render(motor, affine, *epsilon, *blur_sigma, &self.config)?)
    }
}

/// One Bernoulli draw per pixel of `pimg`.
///
/// # Errors
/// [`ModelError::Distribution`] if some probability lies outside `[0, 1]`.
pub fn sample_pixels<R: Rng + ?Sized>(pimg: &ProbImage, rng: &mut R) -> ModelResult<BinaryImage> {
    let mut image = BinaryImage::from_elem(pimg.dim(), false);
    for ((row, col), &p) in pimg.pixels.indexed_iter() {
        image[[row, col]] = Bernoulli::new(p)?.sample(rng);
    }
    Ok(image)
}

/// `Σ ln p(on) + Σ ln(1 − p)(off)` of `image` under `pimg`.
///
/// # Errors
/// [`ModelError::ImageDimMismatch`] if the sizes differ.
pub fn score_pixels(pimg: &ProbImage, image: &BinaryImage) -> ModelResult<f64> {
    if pimg.dim() != image.dim() {
        return Err(ModelError::ImageDimMismatch { expected: pimg.dim(), found: image.dim() });
    }
    let mut total = 0.0;
    Zip::from(&pimg.pixels).and(image).for_each(|&p, &on| total += bernoulli_ln_pmf(p, on));
    Ok(total)
}

/// Expected score of a sample: `Σ p ln p + (1 − p) ln(1 − p)`.
pub fn neg_entropy(pimg: &ProbImage) -> f64 {
    pimg.pixels.iter().map(|&p| bernoulli_neg_entropy(p)).sum()
}

/// Variance of the score of a sample, `Σ p(1 − p)(ln p − ln(1 − p))²`.
pub fn score_variance(pimg: &ProbImage) -> f64 {
    pimg.pixels
        .iter()
        .filter(|&&p| p > 0.0 && p < 1.0)
        .map(|&p| p * (1.0 - p) * (p.ln() - (-p).ln_1p()).powi(2))
        .sum()
}
