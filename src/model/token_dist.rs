//! Token-level variation: from a character type to renderable tokens.
//!
//! A token perturbs the type's control points, inverse scales and stroke
//! positions, then draws a global affine, a pixel-noise level and a blur
//! width. The type is only read; a token is a snapshot and is unaffected by
//! later optimizer updates.
use crate::{
    model::{
        character::{CharacterToken, CharacterType, StrokeDraw, motor_control_points, sample_motor},
        errors::{ModelError, ModelResult},
        image_dist::{BinaryImage, CharacterImageDist, ImageDistribution},
    },
    optimization::ascent::DEFAULT_SCALE_FLOOR,
    rendering::RenderConfig,
};
use ndarray::Array;
use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal};

/// Token-level noise parameters.
///
/// Default:
/// - `shape_sd = 0.05` per control-point coordinate
/// - `invscale_sd = 0.5` (inverse scales are clamped at `1e-4`)
/// - `position_sd = 0.5` pixels per stroke start
/// - `affine_scale_sd = 0.05` (log-normal x/y scale around 1)
/// - `affine_shift_sd = 2.0` pixels
/// - `epsilon ~ U[1e-4, 1e-2]`, `blur_sigma ~ U[0.5, 1.5]`
#[derive(Debug, Clone, PartialEq)]
pub struct TokenParams {
    pub shape_sd: f64,
    pub invscale_sd: f64,
    pub position_sd: f64,
    pub affine_scale_sd: f64,
    pub affine_shift_sd: f64,
    pub epsilon_range: [f64; 2],
    pub blur_range: [f64; 2],
}

impl TokenParams {
    /// # Errors
    /// [`ModelError::InvalidTokenParam`] if a standard deviation is negative
    /// or non-finite, the epsilon range leaves `[0, 1]`, the blur range is
    /// negative, or a range has `min > max`.
    pub fn new(
        shape_sd: f64, invscale_sd: f64, position_sd: f64, affine_scale_sd: f64,
        affine_shift_sd: f64, epsilon_range: [f64; 2], blur_range: [f64; 2],
    ) -> ModelResult<Self> {
        let sds = [
            ("shape_sd", shape_sd),
            ("invscale_sd", invscale_sd),
            ("position_sd", position_sd),
            ("affine_scale_sd", affine_scale_sd),
            ("affine_shift_sd", affine_shift_sd),
        ];
        for (name, value) in sds {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidTokenParam {
                    name,
                    value,
                    reason: "must be finite and >= 0",
                });
            }
        }
        check_range("epsilon_range", epsilon_range, 0.0, 1.0)?;
        check_range("blur_range", blur_range, 0.0, f64::INFINITY)?;
        Ok(Self {
            shape_sd,
            invscale_sd,
            position_sd,
            affine_scale_sd,
            affine_shift_sd,
            epsilon_range,
            blur_range,
        })
    }
}

impl Default for TokenParams {
    fn default() -> Self {
        Self {
            shape_sd: 0.05,
            invscale_sd: 0.5,
            position_sd: 0.5,
            affine_scale_sd: 0.05,
            affine_shift_sd: 2.0,
            epsilon_range: [1e-4, 1e-2],
            blur_range: [0.5, 1.5],
        }
    }
}

/// Draws tokens and binary images from a character type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenSampler {
    params: TokenParams,
    image_dist: CharacterImageDist,
}

impl TokenSampler {
    pub fn new(params: TokenParams, render: RenderConfig) -> Self {
        Self { params, image_dist: CharacterImageDist::new(render) }
    }

    pub fn image_dist(&self) -> &CharacterImageDist {
        &self.image_dist
    }

    /// Sample a token of `ctype`.
    ///
    /// # Errors
    /// - [`ModelError::Distribution`] if a noise distribution cannot be built.
    /// - Render errors from spline sampling.
    pub fn sample_token<R: Rng + ?Sized>(
        &self, ctype: &CharacterType, rng: &mut R,
    ) -> ModelResult<CharacterToken> {
        let p = &self.params;
        let shape_noise = Normal::new(0.0, p.shape_sd)?;
        let scale_noise = Normal::new(0.0, p.invscale_sd)?;
        let pos_noise = Normal::new(0.0, p.position_sd)?;

        let mut draws = Vec::with_capacity(ctype.n_strokes());
        for part in ctype.parts() {
            let base = part.params.shapes_view()?;
            let shapes =
                Array::from_shape_fn(base.raw_dim(), |idx| base[idx] + shape_noise.sample(rng));
            let invscales = part
                .params
                .invscales_view()?
                .mapv(|x| (x + scale_noise.sample(rng)).max(DEFAULT_SCALE_FLOOR));
            let offset = [pos_noise.sample(rng), pos_noise.sample(rng)];
            draws.push(StrokeDraw { shapes, invscales, offset });
        }
        let cpts = motor_control_points(ctype.parts(), &draws)?;
        let motor = sample_motor(&cpts, self.image_dist.config().spline_samples)?;

        let scale = LogNormal::new(0.0, p.affine_scale_sd)?;
        let shift = Normal::new(0.0, p.affine_shift_sd)?;
        let affine = [scale.sample(rng), scale.sample(rng), shift.sample(rng), shift.sample(rng)];
        let epsilon = rng.gen_range(p.epsilon_range[0]..=p.epsilon_range[1]);
        let blur_sigma = rng.gen_range(p.blur_range[0]..=p.blur_range[1]);
        Ok(CharacterToken { motor, affine, epsilon, blur_sigma })
    }

    /// Sample a token and one binary image of it.
    pub fn sample_image<R: Rng + ?Sized>(
        &self, ctype: &CharacterType, rng: &mut R,
    ) -> ModelResult<(CharacterToken, BinaryImage)> {
        let token = self.sample_token(ctype, rng)?;
        let image = self.image_dist.sample_image(&token, rng)?;
        Ok((token, image))
    }
}

// ---- Helper methods ----

fn check_range(name: &'static str, range: [f64; 2], lo: f64, hi: f64) -> ModelResult<()> {
    let [min, max] = range;
    for value in range {
        if !value.is_finite() || value < lo || value > hi {
            return Err(ModelError::InvalidTokenParam {
                name,
                value,
                reason: "outside the allowed range",
            });
        }
    }
    if min > max {
        return Err(ModelError::InvalidTokenParam {
            name,
            value: min,
            reason: "min must not exceed max",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{library::Library, model::type_dist::TypeDistribution};
    use rand::{SeedableRng, rngs::StdRng};

    fn sampled_type() -> CharacterType {
        let lib = Library::synthetic(8, 4).unwrap();
        TypeDistribution::new(&lib).sample_type(Some(2), &mut StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Tokens carry noise within the configured ranges and one trajectory per
    // sub-stroke.
    //
    // Given
    // -----
    // - A sampled 2-stroke type and the default token parameters.
    //
    // Expect
    // ------
    // - Motor layout mirrors the type; epsilon and blur lie in their ranges;
    //   affine scales are positive.
    fn token_matches_type_layout_and_ranges() {
        let ctype = sampled_type();
        let sampler = TokenSampler::default();
        let mut rng = StdRng::seed_from_u64(2);

        let token = sampler.sample_token(&ctype, &mut rng).unwrap();

        assert_eq!(token.motor.len(), 2);
        for (stroke, part) in token.motor.iter().zip(ctype.parts()) {
            assert_eq!(stroke.len(), part.params.nsub());
            assert!(stroke.iter().all(|t| t.dim() == (50, 2)));
        }
        assert!((1e-4..=1e-2).contains(&token.epsilon));
        assert!((0.5..=1.5).contains(&token.blur_sigma));
        assert!(token.affine[0] > 0.0 && token.affine[1] > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // A token is a snapshot: later changes to the type do not reach it.
    //
    // Given
    // -----
    // - A token drawn, then every shape of the type shifted by +100.
    //
    // Expect
    // ------
    // - The token's trajectories are unchanged.
    fn token_is_a_snapshot() {
        let mut ctype = sampled_type();
        let sampler = TokenSampler::default();
        let token = sampler.sample_token(&ctype, &mut StdRng::seed_from_u64(5)).unwrap();
        let before = token.motor.clone();

        for stroke in ctype.params_mut() {
            stroke.shapes_mut().value_mut().mapv_inplace(|v| v + 100.0);
        }

        assert_eq!(token.motor, before);
    }

    #[test]
    fn invalid_token_params_are_rejected() {
        let d = TokenParams::default();
        let bad_sd = TokenParams::new(-1.0, 0.5, 0.5, 0.05, 2.0, d.epsilon_range, d.blur_range);
        let bad_eps = TokenParams::new(0.05, 0.5, 0.5, 0.05, 2.0, [0.0, 1.5], d.blur_range);
        let flipped = TokenParams::new(0.05, 0.5, 0.5, 0.05, 2.0, d.epsilon_range, [1.5, 0.5]);

        assert!(matches!(bad_sd, Err(ModelError::InvalidTokenParam { name: "shape_sd", .. })));
        assert!(matches!(
            bad_eps,
            Err(ModelError::InvalidTokenParam { name: "epsilon_range", .. })
        ));
        assert!(matches!(flipped, Err(ModelError::InvalidTokenParam { name: "blur_range", .. })));
    }

    #[test]
    fn sample_image_has_render_size() {
        let ctype = sampled_type();
        let mut rng = StdRng::seed_from_u64(9);
        let (_, image) = TokenSampler::default().sample_image(&ctype, &mut rng).unwrap();
        assert_eq!(image.dim(), (105, 105));
    }
}
