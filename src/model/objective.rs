//! Log-probability of a character type under its prior, as an ascent
//! objective.
//!
//! `ℓ(type) = Σ_strokes [score_shapes_type + score_invscales_type]`. The
//! relation terms do not depend on any optimized tensor and are left out.
use crate::{
    model::{character::CharacterType, type_dist::TypeDistribution},
    optimization::{
        ascent::LogLikelihood,
        errors::OptResult,
    },
};

/// Prior log-probability of the continuous stroke parameters.
#[derive(Debug, Clone, Copy)]
pub struct PriorObjective<'a> {
    dist: TypeDistribution<'a>,
}

impl<'a> PriorObjective<'a> {
    pub fn new(dist: TypeDistribution<'a>) -> Self {
        Self { dist }
    }
}

impl LogLikelihood<CharacterType> for PriorObjective<'_> {
    fn value(&self, ctype: &CharacterType) -> OptResult<f64> {
        let mut total = 0.0;
        for part in ctype.parts() {
            let stroke = &part.params;
            total += self.dist.score_shapes_type(stroke.ids(), stroke.shapes_view()?)?;
            total += self.dist.score_invscales_type(stroke.ids(), stroke.invscales_view()?)?;
        }
        Ok(total)
    }

    /// Accumulates `∂ℓ/∂shapes` and `∂ℓ/∂invscales` of every stroke; tensors
    /// that are not registered ignore the contribution.
    fn backward(&self, ctype: &mut CharacterType) -> OptResult<()> {
        for stroke in ctype.params_mut() {
            let g_shapes = self.dist.shapes_grad(stroke.ids(), stroke.shapes_view()?)?;
            let g_scales = self.dist.invscales_grad(stroke.ids(), stroke.invscales_view()?)?;
            stroke.shapes_mut().accumulate_grad(g_shapes.into_dyn().view())?;
            stroke.invscales_mut().accumulate_grad(g_scales.into_dyn().view())?;
        }
        Ok(())
    }
}
